//! Command-line argument parsing (spec §6 "CLI surface").
//!
//! Hand-rolled in the donor's own style (`cli::args` there parses the LZ4
//! CLI's argv loop without `clap`): short options may be aggregated
//! (`-Lv`), options that take a value either read it inline (`-B2`) or, if
//! nothing follows on the same token, consume the next `argv` element
//! (`-B 2`). A bare `--` marks the end of options. Bad or unrecognised
//! options return an `Err` with a message beginning `"bad usage: "`,
//! exactly as the donor's `parse_args_from` does.

use anyhow::anyhow;

use crate::cli::arg_utils::read_u64_from_str;
use crate::cli::op_mode::OpMode;

/// Complete set of options and filenames produced by the argument loop.
#[derive(Debug)]
pub struct ParsedArgs {
    pub op_mode: OpMode,
    pub level: u32,
    pub chunksize: Option<u64>,
    pub nb_workers: usize,
    pub algo_name: Option<String>,
    pub cksum_name: Option<String>,
    pub cipher_name: Option<String>,
    pub key_len: usize,
    pub passfile: Option<String>,
    pub dedup: bool,
    pub global_dedup: bool,
    pub fixed_dedup: bool,
    pub delta: bool,
    pub delta_extra: bool,
    pub rab_blk_sz: u32,
    pub lzp: bool,
    pub delta2: bool,
    pub exe_preprocess: bool,
    pub media_filters: bool,
    pub no_metadata_stream: bool,
    pub no_archive_sort: bool,
    pub streaming: bool,
    pub show_mem: bool,
    pub mem_limit: Option<u64>,
    pub keep_original: bool,
    pub chained_start: bool,
    pub inputs: Vec<String>,
    pub output: Option<String>,
    pub exit_early: bool,
}

impl Default for ParsedArgs {
    fn default() -> Self {
        ParsedArgs {
            op_mode: OpMode::Compress,
            level: crate::config::LEVEL_DEFAULT,
            chunksize: None,
            nb_workers: crate::config::NB_WORKERS_DEFAULT,
            algo_name: None,
            cksum_name: None,
            cipher_name: None,
            key_len: crate::config::KEY_LEN_256,
            passfile: None,
            dedup: false,
            global_dedup: false,
            fixed_dedup: false,
            delta: false,
            delta_extra: false,
            rab_blk_sz: 2,
            lzp: false,
            delta2: false,
            exe_preprocess: false,
            media_filters: false,
            no_metadata_stream: false,
            no_archive_sort: false,
            streaming: false,
            show_mem: false,
            mem_limit: None,
            keep_original: false,
            chained_start: false,
            inputs: Vec::new(),
            output: None,
            exit_early: false,
        }
    }
}

/// Parses `std::env::args()` (skipping argv[0]).
pub fn parse_args() -> anyhow::Result<ParsedArgs> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&argv)
}

/// Parses an explicit argument list (argv[1..]); callable from tests.
pub fn parse_args_from(argv: &[String]) -> anyhow::Result<ParsedArgs> {
    let mut out = ParsedArgs::default();
    let mut all_args_are_files = false;

    // Consumes the value for a short option: either the rest of the current
    // token (starting at `char_pos`) or, if that's empty, the next argv
    // element. Returns the value and the index to resume scanning from.
    fn take_value<'a>(
        argument: &'a str,
        char_pos: usize,
        argv: &'a [String],
        arg_idx: &mut usize,
        flag: char,
    ) -> anyhow::Result<String> {
        let inline = &argument[char_pos + 1..];
        if !inline.is_empty() {
            Ok(inline.to_owned())
        } else {
            *arg_idx += 1;
            argv.get(*arg_idx)
                .cloned()
                .ok_or_else(|| anyhow!("bad usage: -{flag} requires an argument"))
        }
    }

    let mut arg_idx = 0usize;
    while arg_idx < argv.len() {
        let argument = &argv[arg_idx];

        if argument.is_empty() {
            arg_idx += 1;
            continue;
        }

        if all_args_are_files || !argument.starts_with('-') || argument == "-" {
            out.inputs.push(argument.clone());
            arg_idx += 1;
            continue;
        }

        if argument == "--" {
            all_args_are_files = true;
            arg_idx += 1;
            continue;
        }

        if argument == "--output" {
            arg_idx += 1;
            let val = argv
                .get(arg_idx)
                .ok_or_else(|| anyhow!("bad usage: --output requires a path"))?;
            out.output = Some(val.clone());
            arg_idx += 1;
            continue;
        }
        if argument == "--help" {
            out.exit_early = true;
            break;
        }

        let bytes = argument.as_bytes();
        let mut char_pos = 1usize; // skip leading '-'
        while char_pos < bytes.len() {
            match bytes[char_pos] as char {
                'd' => out.op_mode = OpMode::Decompress,
                'i' => out.op_mode = OpMode::List,
                'a' => out.op_mode = OpMode::ArchiveCreate,
                'l' => {
                    let val = take_value(argument, char_pos, argv, &mut arg_idx, 'l')?;
                    let (level, rest) = read_u64_from_str(&val)
                        .ok_or_else(|| anyhow!("bad usage: -l expects a numeric level"))?;
                    if !rest.is_empty() {
                        return Err(anyhow!("bad usage: -l: unexpected text after level"));
                    }
                    if level > crate::config::LEVEL_MAX as u64 {
                        return Err(anyhow!(
                            "bad usage: -l level must be between {} and {}",
                            crate::config::LEVEL_MIN,
                            crate::config::LEVEL_MAX
                        ));
                    }
                    out.level = level as u32;
                    char_pos = bytes.len() - 1;
                }
                's' => {
                    let val = take_value(argument, char_pos, argv, &mut arg_idx, 's')?;
                    let (size, rest) = read_u64_from_str(&val)
                        .ok_or_else(|| anyhow!("bad usage: -s expects a chunk size"))?;
                    if !rest.is_empty() {
                        return Err(anyhow!("bad usage: -s: unexpected text after size"));
                    }
                    out.chunksize = Some(size);
                    char_pos = bytes.len() - 1;
                }
                't' => {
                    let val = take_value(argument, char_pos, argv, &mut arg_idx, 't')?;
                    let (n, rest) = read_u64_from_str(&val)
                        .ok_or_else(|| anyhow!("bad usage: -t expects a thread count"))?;
                    if !rest.is_empty() {
                        return Err(anyhow!("bad usage: -t: unexpected text after count"));
                    }
                    out.nb_workers = n as usize;
                    char_pos = bytes.len() - 1;
                }
                'c' => {
                    let val = take_value(argument, char_pos, argv, &mut arg_idx, 'c')?;
                    out.algo_name = Some(val);
                    char_pos = bytes.len() - 1;
                }
                'S' => {
                    let val = take_value(argument, char_pos, argv, &mut arg_idx, 'S')?;
                    out.cksum_name = Some(val);
                    char_pos = bytes.len() - 1;
                }
                'e' => {
                    let val = take_value(argument, char_pos, argv, &mut arg_idx, 'e')?;
                    out.cipher_name = Some(val);
                    char_pos = bytes.len() - 1;
                }
                'k' => {
                    let val = take_value(argument, char_pos, argv, &mut arg_idx, 'k')?;
                    let (len, rest) = read_u64_from_str(&val)
                        .ok_or_else(|| anyhow!("bad usage: -k expects 16 or 32"))?;
                    if !rest.is_empty() || (len != 16 && len != 32) {
                        return Err(anyhow!("bad usage: -k must be 16 or 32"));
                    }
                    out.key_len = len as usize;
                    char_pos = bytes.len() - 1;
                }
                'w' => {
                    let val = take_value(argument, char_pos, argv, &mut arg_idx, 'w')?;
                    out.passfile = Some(val);
                    char_pos = bytes.len() - 1;
                }
                'B' => {
                    let val = take_value(argument, char_pos, argv, &mut arg_idx, 'B')?;
                    let (idx, rest) = read_u64_from_str(&val)
                        .ok_or_else(|| anyhow!("bad usage: -B expects a block size index"))?;
                    if !rest.is_empty() || idx > 5 {
                        return Err(anyhow!("bad usage: -B must be between 0 and 5"));
                    }
                    out.rab_blk_sz = idx as u32;
                    char_pos = bytes.len() - 1;
                }
                'M' => {
                    let val = take_value(argument, char_pos, argv, &mut arg_idx, 'M')?;
                    let (mb, rest) = read_u64_from_str(&val)
                        .ok_or_else(|| anyhow!("bad usage: -M expects a memory size"))?;
                    if !rest.is_empty() {
                        return Err(anyhow!("bad usage: -M: unexpected text after size"));
                    }
                    out.mem_limit = Some(mb);
                    char_pos = bytes.len() - 1;
                }
                'D' => out.dedup = true,
                'G' => {
                    out.dedup = true;
                    out.global_dedup = true;
                }
                'F' => {
                    out.dedup = true;
                    out.fixed_dedup = true;
                }
                'E' => {
                    if out.delta {
                        out.delta_extra = true;
                    }
                    out.delta = true;
                }
                'L' => out.lzp = true,
                'P' => out.delta2 = true,
                'x' => out.exe_preprocess = true,
                'j' => out.media_filters = true,
                'T' => out.no_metadata_stream = true,
                'n' => out.no_archive_sort = true,
                'p' => out.streaming = true,
                'v' => {
                    let lvl = crate::cli::constants::display_level().saturating_add(1);
                    crate::cli::constants::set_display_level(lvl);
                }
                'm' => out.show_mem = true,
                'K' => out.keep_original = true,
                'C' => out.chained_start = true,
                'h' => {
                    out.exit_early = true;
                }
                other => {
                    return Err(anyhow!("bad usage: unrecognised option: -{other}"));
                }
            }

            if out.exit_early {
                break;
            }
            char_pos += 1;
        }

        if out.exit_early {
            break;
        }
        arg_idx += 1;
    }

    Ok(out)
}
