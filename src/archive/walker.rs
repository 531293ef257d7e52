//! Archive-create file enumeration (spec §4.8, §9 "Archive mode scaffolding").
//!
//! Walks the inputs into a flat, optionally-sorted file list. Unlike the
//! original's libarchive-based tar walker (explicitly out of scope, spec §1),
//! this only needs enough structure to build the metadata stream's entry
//! list; no tar-compatible container format is produced.

use std::io;
use std::path::{Path, PathBuf};

use crate::util::create_file_list;

/// Expands `inputs` into a flat file list, sorted lexicographically by
/// default (spec §6 `-n` disables archive sort).
pub fn collect(inputs: &[&Path], sort: bool) -> io::Result<Vec<PathBuf>> {
    let mut files = create_file_list(inputs)?;
    if sort {
        files.sort();
    }
    Ok(files)
}
