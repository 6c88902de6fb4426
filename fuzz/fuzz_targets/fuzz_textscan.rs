//! Fuzz target for the text scanning primitives.
//!
//! Goal: scanning should **never panic** on any input, including multi-byte
//! UTF-8, and a successful extraction always has exactly the requested width.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_textscan
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use errtrap_diagnose::textscan;

/// Structured input for text scan fuzzing.
/// Using Arbitrary allows libFuzzer to generate more meaningful test cases.
#[derive(Arbitrary, Debug)]
struct ScanInput {
    content: String,
    anchor: String,
    marker: String,
    width: u8,
}

fuzz_target!(|input: ScanInput| {
    // Limit input size to keep fuzzing fast
    if input.content.len() > 16 * 1024 || input.anchor.len() > 128 || input.marker.len() > 128 {
        return;
    }

    // Should never panic - a miss is fine
    let _ = textscan::find_ci(&input.content, &input.anchor, 0);
    let _ = textscan::contains_ci(&input.content, &input.anchor);

    let width = usize::from(input.width);
    if let Some(value) =
        textscan::extract_after(&input.content, &input.anchor, &input.marker, width)
    {
        assert_eq!(value.len(), width);
    }
});
