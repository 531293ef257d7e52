//! Total-system-RAM query, used by the pipeline orchestrator to refuse to
//! start when the projected working set would exceed 80% of RAM (spec §5
//! "Memory sizing").
//!
//! The donor crate has no equivalent (the LZ4 CLI never sizes itself against
//! system memory); this follows the same `sysinfo`-free, `libc`-based shape
//! as `util::cores::count_cores` uses `std::thread::available_parallelism`:
//! prefer a portable std/libc primitive over a new heavyweight dependency.

/// Returns total physical RAM in bytes, or `None` if it cannot be determined.
#[cfg(unix)]
pub fn total_ram_bytes() -> Option<u64> {
    // SAFETY: sysconf with these name constants returns -1 on error and is
    // otherwise side-effect free; no pointers are involved.
    unsafe {
        let pages = libc::sysconf(libc::_SC_PHYS_PAGES);
        let page_size = libc::sysconf(libc::_SC_PAGE_SIZE);
        if pages < 0 || page_size < 0 {
            return None;
        }
        Some(pages as u64 * page_size as u64)
    }
}

#[cfg(not(unix))]
pub fn total_ram_bytes() -> Option<u64> {
    None
}

/// `true` if `projected_bytes` would exceed `fraction` of total RAM.
/// Returns `false` (permissive) when total RAM cannot be determined, since
/// pcompress must still run inside containers/CI sandboxes that restrict
/// `/proc` visibility.
pub fn exceeds_ram_fraction(projected_bytes: u64, fraction: f64) -> bool {
    match total_ram_bytes() {
        Some(total) => (projected_bytes as f64) > (total as f64) * fraction,
        None => false,
    }
}
