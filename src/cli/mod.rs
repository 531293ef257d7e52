//! Command-line surface (spec §6): hand-rolled argument parsing in the
//! donor's own style, not `clap` (DESIGN.md "CLI parsing approach").

pub mod arg_utils;
pub mod args;
pub mod constants;
pub mod help;
pub mod init;
pub mod op_mode;
