//! Option fixtures for tests.
//!
//! [`fully_populated_builder`] sets every field to a distinctive non-default
//! value, and [`FULL_OPTIONS_TOML`] is the same set of values as an options
//! file, so tests on either path can assert against the same expectations.

use std::time::Duration;

use ppn_options::{DatapathProtocol, PpnOptions, PpnOptionsBuilder};

/// A builder with every field set to a non-default value.
pub fn fully_populated_builder() -> PpnOptionsBuilder {
    let mut builder = PpnOptions::builder();
    builder
        .zinc_url("a")
        .zinc_public_signing_key_url("psk")
        .brass_url("b")
        .zinc_oauth_scopes("c")
        .zinc_service_type("d")
        .connectivity_check_url("https://check.example.com")
        .connectivity_check_retry_delay(Duration::from_millis(1500))
        .connectivity_check_max_retries(10)
        .copper_controller_address("e")
        .copper_hostname_override("g")
        .copper_hostname_suffix(["f"])
        .disallowed_applications(["foo", "bar", "baz"])
        .datapath_protocol(DatapathProtocol::Bridge)
        .rekey_duration(Duration::from_millis(1005))
        .blind_signing_enabled(true)
        .reconnector_initial_time_to_reconnect(Duration::from_millis(2))
        .reconnector_session_connection_deadline(Duration::from_millis(4))
        .api_key("apiKey")
        .public_metadata_enabled(true)
        .ipv4_keepalive_interval(Duration::from_millis(8))
        .ipv6_keepalive_interval(Duration::from_millis(16))
        .periodic_health_check_duration(Duration::from_secs(60))
        .sticky_service(true)
        .safe_disconnect_enabled(true)
        .ipv6_enabled(false)
        .dns_cache_enabled(false)
        .attach_oauth_token_as_header_enabled(true)
        .dynamic_mtu_enabled(true)
        .integrity_attestation_enabled(true)
        .install_crash_signal_handler(true)
        .periodic_health_check_enabled(true);
    builder
        .bridge_key_length(128)
        .expect("128 is an allowed key length");
    builder
}

/// The values of [`fully_populated_builder`] as an options file.
pub const FULL_OPTIONS_TOML: &str = r#"
zinc_url = "a"
zinc_public_signing_key_url = "psk"
brass_url = "b"
zinc_oauth_scopes = "c"
zinc_service_type = "d"
connectivity_check_url = "https://check.example.com"
connectivity_check_retry_delay_ms = 1500
connectivity_check_max_retries = 10
copper_controller_address = "e"
copper_hostname_override = "g"
copper_hostname_suffix = ["f"]
disallowed_applications = ["foo", "bar", "baz"]
datapath_protocol = "bridge"
bridge_key_length = 128
rekey_duration_ms = 1005
blind_signing_enabled = true
reconnector_initial_time_to_reconnect_ms = 2
reconnector_session_connection_deadline_ms = 4
api_key = "apiKey"
public_metadata_enabled = true
ipv4_keepalive_interval_ms = 8
ipv6_keepalive_interval_ms = 16
periodic_health_check_duration_ms = 60000
sticky_service = true
safe_disconnect_enabled = true
ipv6_enabled = false
dns_cache_enabled = false
attach_oauth_token_as_header_enabled = true
dynamic_mtu_enabled = true
integrity_attestation_enabled = true
install_crash_signal_handler = true
periodic_health_check_enabled = true
"#;
