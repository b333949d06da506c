#![no_main]

use libfuzzer_sys::fuzz_target;
use latticepow_types::{Root, Work};

fuzz_target!(|data: &[u8]| {
    // Validate work with arbitrary root, work bytes and difficulty.
    // Requires at least 40 bytes: 32 (root) + 8 (work).
    if data.len() >= 40 {
        let mut root_bytes = [0u8; 32];
        root_bytes.copy_from_slice(&data[..32]);
        let root = Root::new(root_bytes);
        let work = Work::new(&data[32..40]);

        // Use remaining bytes for difficulty if available, else base
        let difficulty = if data.len() >= 48 {
            u64::from_le_bytes([
                data[40], data[41], data[42], data[43],
                data[44], data[45], data[46], data[47],
            ])
        } else {
            latticepow_work::V1_BASE_DIFFICULTY
        };

        // This must never panic regardless of input
        let valid = latticepow_work::is_valid(&root, difficulty, work);
        assert_eq!(valid, latticepow_work::work_value(&root, work) >= difficulty);
    }
});
