#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|multiplier: i64| {
    // Wrapping arithmetic must never panic, and positive multipliers never
    // go below the base threshold.
    let d = latticepow_work::compute_difficulty(multiplier);
    if multiplier > 0 {
        assert!(d >= latticepow_work::V1_BASE_DIFFICULTY);
    }
});
