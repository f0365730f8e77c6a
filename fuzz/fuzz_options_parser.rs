//! Fuzz target for the TOML options parser and the Krypton translation.
//!
//! Run with: cargo +nightly fuzz run fuzz_options_parser

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(options) = ppn_options::PpnOptions::parse(s) {
            let config = options.create_krypton_config();
            assert!(!config.copper_hostname_suffix.is_empty());
            assert_eq!(
                config.reconnector_config.initial_time_to_reconnect_msec.is_some(),
                options.reconnector_initial_time_to_reconnect().is_some()
            );
        }
    }
});
