//! Usage text (spec §6 "CLI surface").

use crate::cli::constants::{AUTHOR, PROGRAM_NAME};

pub fn usage() -> String {
    format!(
        "{name} — chunked, parallel, multi-algorithm compressor\n\n\
         USAGE:\n\
         \x20 {name} [OPTIONS] <input> [<output>]\n\
         \x20 {name} -d [OPTIONS] <input> [<output>]\n\
         \x20 {name} -i <archive>\n\
         \x20 {name} -a [OPTIONS] --output <archive> <input>...\n\n\
         OPTIONS:\n\
         \x20 -l level        compression level 0-14 (default 6)\n\
         \x20 -s size         chunk size, accepts K/M/G suffixes\n\
         \x20 -t nthreads     worker thread count (0 = auto)\n\
         \x20 -c alg          zlib | lzma | bzip2 | lz4 | none | adapt | adapt2\n\
         \x20 -S cksum        crc64 | sha256 | sha512 | keccak256 | keccak512 | blake256 | blake512\n\
         \x20 -e AES|SALSA20  enable authenticated encryption\n\
         \x20 -k 16|32        key length in bytes (default 32)\n\
         \x20 -w passfile     read the password from a file\n\
         \x20 -D              enable rabin content-defined dedup\n\
         \x20 -G              global dedup across chunks\n\
         \x20 -F              fixed-block (rather than rabin) global dedup\n\
         \x20 -E              delta (bsdiff) encoding of near-duplicate blocks; -EE for extra effort\n\
         \x20 -B 0..5         average rabin block size index\n\
         \x20 -L              LZP preprocessing pass\n\
         \x20 -P              Delta2 preprocessing pass\n\
         \x20 -x              executable (E8E9) preprocessing pass\n\
         \x20 -j              lossless media filters (accepted, not implemented in this port)\n\
         \x20 -T              disable the metadata stream\n\
         \x20 -n              disable archive entry sorting\n\
         \x20 -p              streaming / pipe mode\n\
         \x20 -v              increase verbosity (repeatable)\n\
         \x20 -m              show memory usage estimate and exit\n\
         \x20 -M size         cap working-set memory, accepts K/M/G suffixes\n\
         \x20 -K              keep the original (source) file\n\
         \x20 -C              start a new delta chain from this archive\n\
         \x20 --help          print this message\n\n\
         by {author}\n",
        name = PROGRAM_NAME,
        author = AUTHOR,
    )
}
