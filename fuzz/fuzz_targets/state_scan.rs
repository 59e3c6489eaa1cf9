#![no_main]

//! Record Scanner Fuzzer
//!
//! Feeds arbitrary bytes to the savestate lookup path:
//! - Truncated and oversized length fields
//! - Headers split across the end of file
//! - Wraparound scans that must terminate
//! - Error counting consistency

use gencore::savestate::SaveState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let path = std::env::temp_dir().join(format!("gencore_fuzz_scan_{}.state", std::process::id()));
    if std::fs::write(&path, data).is_err() {
        return;
    }

    let mut state = match SaveState::open_read(&path) {
        Ok(state) => state,
        Err(_) => return,
    };

    let mut buf = [0u8; 64];
    let mut misses = 0u32;
    for tag in ["a", "record00", "vdp_regs", "sched_hint_counter"] {
        if state.read_tag(tag, &mut buf).is_none() {
            misses += 1;
        }
    }

    // Every miss is counted, nothing else is.
    assert_eq!(state.errors(), misses);
});
