//! Fuzz target for manifest indexing.
//!
//! Goal: The indexers should **never panic** on any input.
//! They may return errors for malformed XML, but panics are unacceptable.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_manifest_index
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only test valid UTF-8 strings (project files must be UTF-8)
    if let Ok(text) = std::str::from_utf8(data) {
        // Test project manifest indexing - should never panic
        let _ = errtrap_project::fuzz::index_project_manifest(text);

        // Test packages.config indexing - should never panic
        let _ = errtrap_project::fuzz::index_packages_config(text);
    }
});
