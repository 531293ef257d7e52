//! Operation mode selected on the command line (spec §6 "Commands").

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpMode {
    /// Default when `-c alg` or no mode flag is given.
    Compress,
    /// `-d`.
    Decompress,
    /// `-i`: list an archive's metadata stream without extracting.
    List,
    /// `-a`: walk inputs and write a metadata-only archive (spec §4.8).
    ArchiveCreate,
}
