//! `pcompress` binary entry point (spec §6 "CLI surface").
//!
//! Parses argv, resolves it into a [`pcompress::cli::init::Plan`], and
//! dispatches into the library. Mirrors the donor's own `main.rs` shape:
//! argument errors print `"bad usage: ..."` and exit non-zero without a
//! panic or backtrace; library errors map through
//! [`pcompress::PcompressError::exit_code`].

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::process::ExitCode;

use pcompress::cli::constants::{display_level, set_display_level};
use pcompress::cli::init::{self, Plan};
use pcompress::cli::{args, help};
use pcompress::{archive, displaylevel};

fn run() -> anyhow::Result<()> {
    let parsed = args::parse_args()?;
    if parsed.exit_early {
        print!("{}", help::usage());
        return Ok(());
    }
    if parsed.show_mem {
        // `-m`: print a rough per-worker memory estimate and exit without
        // touching any file (spec §6 "show memory"). `-M` (cap) and `-K`/
        // `-C` are accepted upstream of here but are not wired into a
        // running limit yet; see DESIGN.md.
        let chunksize = parsed.chunksize.unwrap_or(pcompress::config::CHUNKSIZE_DEFAULT);
        let workers = if parsed.nb_workers == 0 {
            pcompress::util::count_cores()
        } else {
            parsed.nb_workers
        };
        println!("estimated working set: {} bytes ({workers} workers x {chunksize} byte chunks)", chunksize * workers as u64);
        return Ok(());
    }

    let _env = init::read_env_settings();
    let plan = init::build_plan(&parsed)?;

    match plan {
        Plan::Compress { cfg, input, output } => {
            let stats = pcompress::compress_file(&cfg, &input, &output).map_err(|e| anyhow::anyhow!("{e}"))?;
            displaylevel!(3, "{}", stats.summary());
        }
        Plan::Decompress {
            cfg,
            header_len,
            digest_len,
            mac_len,
            input,
            output,
        } => {
            let stats = pcompress::decompress_file(&cfg, digest_len, mac_len, header_len, &input, &output)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            displaylevel!(3, "{}", stats.summary());
        }
        Plan::List {
            header_len,
            digest_len,
            mac_len,
            input,
        } => {
            let mut file = File::open(&input)?;
            file.seek(SeekFrom::Start(header_len))?;
            let entries = archive::metadata::scan_metadata(&mut file, digest_len, mac_len)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            for entry in &entries {
                println!(
                    "{:>10}  {:o}  {}",
                    entry.size,
                    entry.mode,
                    entry.relative_path.display()
                );
            }
        }
        Plan::ArchiveCreate { cfg, entries, output } => {
            let mut header = pcompress::pipeline::build_file_header(&cfg, 0);
            header.flags |= pcompress::format::file_header::FileFlags::ARCHIVE
                | pcompress::format::file_header::FileFlags::META_STREAM;
            let mac_key = cfg
                .cipher
                .as_ref()
                .map(|c| pcompress::crypto::kdf::derive_key(&c.password, &c.salt, c.key_len))
                .transpose()
                .map_err(|e| anyhow::anyhow!("{e}"))?;

            let outfile = File::create(&output)?;
            let mut writer = BufWriter::new(outfile);
            header
                .write_with_integrity(&mut writer, mac_key.as_deref())
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            archive::metadata::write_metadata_stream(&mut writer, &entries).map_err(|e| anyhow::anyhow!("{e}"))?;
            writer.write_all(&pcompress::format::chunk_header::END_OF_STREAM.to_be_bytes())?;
            writer.flush()?;
            displaylevel!(3, "archived {} entries", entries.len());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let prev = display_level();
            if prev < 1 {
                set_display_level(1);
            }
            displaylevel!(1, "pcompress: {err}");
            set_display_level(prev);
            ExitCode::FAILURE
        }
    }
}
