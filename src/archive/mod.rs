//! Archive mode (spec §4.8, §9 "Archive mode scaffolding"): enumerating the
//! files an archive-create run packs ([`walker`]) and the metadata stream
//! describing them ([`metadata`]), interleaved into the primary chunk-frame
//! stream via the `METADATA_INDICATOR` sentinel rather than produced by a
//! libarchive-compatible tar container (explicitly out of scope, spec §1).

pub mod metadata;
pub mod walker;

pub use metadata::MetadataEntry;
