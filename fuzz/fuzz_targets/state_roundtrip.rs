#![no_main]

//! Roundtrip Invariant Fuzzer
//!
//! Writes fuzz-chosen payloads under generated tags, then reads them back
//! in reverse order. Every record must be recovered exactly and the error
//! counter must stay at zero, regardless of payload contents or sizes.

use gencore::savestate::SaveState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|payloads: Vec<Vec<u8>>| {
    if payloads.is_empty() || payloads.len() > 32 {
        return;
    }

    let path = std::env::temp_dir().join(format!(
        "gencore_fuzz_roundtrip_{}.state",
        std::process::id()
    ));

    {
        let mut state = match SaveState::open_write(&path) {
            Ok(state) => state,
            Err(_) => return,
        };
        for (i, payload) in payloads.iter().enumerate() {
            state.write_tag(&format!("t{}", i), payload).unwrap();
        }
    }

    let mut state = SaveState::open_read(&path).unwrap();
    for (i, payload) in payloads.iter().enumerate().rev() {
        let mut buf = vec![0u8; payload.len()];
        assert_eq!(
            state.read_tag(&format!("t{}", i), &mut buf),
            Some(payload.len())
        );
        assert_eq!(&buf, payload);
    }
    assert_eq!(state.errors(), 0);
});
