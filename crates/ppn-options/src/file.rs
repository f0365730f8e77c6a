//! TOML options files.
//!
//! Keys mirror the builder setters. Durations are written as integer
//! milliseconds (`*_ms`) and the datapath protocol as `"ipsec"` or
//! `"bridge"`. Every key is optional; values are fed through the regular
//! setters, so an empty string is ignored exactly as it would be in code.
//!
//! ## TOML Example
//!
//! ```toml
//! zinc_url = "https://auth.example.com/v1/authandsign"
//! brass_url = "https://brass.example.com/addegress"
//! datapath_protocol = "bridge"
//! bridge_key_length = 256
//! rekey_duration_ms = 86400000
//! blind_signing_enabled = false
//! copper_hostname_suffix = ["g-tun.com"]
//! ipv6_enabled = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::options::{DatapathProtocol, PpnOptions, PpnOptionsBuilder};
use crate::OptionsError;

/// Deserialized contents of a PPN options file.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OptionsFile {
    pub zinc_url: Option<String>,
    pub zinc_public_signing_key_url: Option<String>,
    pub brass_url: Option<String>,
    pub zinc_oauth_scopes: Option<String>,
    pub zinc_service_type: Option<String>,

    pub connectivity_check_url: Option<String>,
    pub connectivity_check_retry_delay_ms: Option<u64>,
    pub connectivity_check_max_retries: Option<u32>,

    pub copper_controller_address: Option<String>,
    pub copper_hostname_override: Option<String>,
    pub copper_hostname_suffix: Option<Vec<String>>,
    pub disallowed_applications: Option<Vec<String>>,

    pub datapath_protocol: Option<DatapathProtocol>,
    pub bridge_key_length: Option<u32>,
    pub rekey_duration_ms: Option<u64>,
    pub blind_signing_enabled: Option<bool>,
    pub reconnector_initial_time_to_reconnect_ms: Option<u64>,
    pub reconnector_session_connection_deadline_ms: Option<u64>,
    pub api_key: Option<String>,
    pub public_metadata_enabled: Option<bool>,
    pub ipv4_keepalive_interval_ms: Option<u64>,
    pub ipv6_keepalive_interval_ms: Option<u64>,
    pub periodic_health_check_duration_ms: Option<u64>,

    pub sticky_service: Option<bool>,
    pub safe_disconnect_enabled: Option<bool>,
    pub ipv6_enabled: Option<bool>,
    pub dns_cache_enabled: Option<bool>,
    pub attach_oauth_token_as_header_enabled: Option<bool>,
    pub dynamic_mtu_enabled: Option<bool>,
    pub integrity_attestation_enabled: Option<bool>,
    pub install_crash_signal_handler: Option<bool>,
    pub periodic_health_check_enabled: Option<bool>,
}

type FlagSetter = fn(&mut PpnOptionsBuilder, bool) -> &mut PpnOptionsBuilder;

fn millis(ms: Option<u64>) -> Option<Duration> {
    ms.map(Duration::from_millis)
}

impl OptionsFile {
    /// Parse a TOML document without applying it.
    pub fn from_toml(s: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(s)?)
    }

    /// Apply every key present in the file to `builder`.
    ///
    /// Keys absent from the file leave the builder untouched. Fails only when
    /// `bridge_key_length` is not an allowed value, in which case `builder`
    /// is left exactly as it was.
    pub fn apply(&self, builder: &mut PpnOptionsBuilder) -> Result<(), OptionsError> {
        let mut staged = builder.clone();
        self.apply_to(&mut staged)?;
        *builder = staged;
        Ok(())
    }

    fn apply_to(&self, builder: &mut PpnOptionsBuilder) -> Result<(), OptionsError> {
        builder
            .zinc_url(self.zinc_url.as_deref())
            .zinc_public_signing_key_url(self.zinc_public_signing_key_url.as_deref())
            .brass_url(self.brass_url.as_deref())
            .zinc_oauth_scopes(self.zinc_oauth_scopes.as_deref())
            .zinc_service_type(self.zinc_service_type.as_deref())
            .connectivity_check_url(self.connectivity_check_url.as_deref())
            .connectivity_check_retry_delay(millis(self.connectivity_check_retry_delay_ms))
            .copper_controller_address(self.copper_controller_address.as_deref())
            .copper_hostname_override(self.copper_hostname_override.as_deref());

        if let Some(retries) = self.connectivity_check_max_retries {
            builder.connectivity_check_max_retries(retries);
        }
        if let Some(suffixes) = &self.copper_hostname_suffix {
            builder.copper_hostname_suffix(suffixes.iter().cloned());
        }
        if let Some(applications) = &self.disallowed_applications {
            builder.disallowed_applications(applications.iter().cloned());
        }

        if let Some(bits) = self.bridge_key_length {
            builder.bridge_key_length(bits)?;
        }
        if let Some(protocol) = self.datapath_protocol {
            builder.datapath_protocol(protocol);
        }
        if let Some(duration) = millis(self.rekey_duration_ms) {
            builder.rekey_duration(duration);
        }
        if let Some(enabled) = self.blind_signing_enabled {
            builder.blind_signing_enabled(enabled);
        }
        if let Some(duration) = millis(self.reconnector_initial_time_to_reconnect_ms) {
            builder.reconnector_initial_time_to_reconnect(duration);
        }
        if let Some(duration) = millis(self.reconnector_session_connection_deadline_ms) {
            builder.reconnector_session_connection_deadline(duration);
        }
        if let Some(key) = &self.api_key {
            builder.api_key(key.as_str());
        }
        if let Some(enabled) = self.public_metadata_enabled {
            builder.public_metadata_enabled(enabled);
        }
        if let Some(interval) = millis(self.ipv4_keepalive_interval_ms) {
            builder.ipv4_keepalive_interval(interval);
        }
        if let Some(interval) = millis(self.ipv6_keepalive_interval_ms) {
            builder.ipv6_keepalive_interval(interval);
        }
        if let Some(duration) = millis(self.periodic_health_check_duration_ms) {
            builder.periodic_health_check_duration(duration);
        }

        let flags: [(Option<bool>, FlagSetter); 9] = [
            (self.sticky_service, PpnOptionsBuilder::sticky_service),
            (self.safe_disconnect_enabled, PpnOptionsBuilder::safe_disconnect_enabled),
            (self.ipv6_enabled, PpnOptionsBuilder::ipv6_enabled),
            (self.dns_cache_enabled, PpnOptionsBuilder::dns_cache_enabled),
            (
                self.attach_oauth_token_as_header_enabled,
                PpnOptionsBuilder::attach_oauth_token_as_header_enabled,
            ),
            (self.dynamic_mtu_enabled, PpnOptionsBuilder::dynamic_mtu_enabled),
            (
                self.integrity_attestation_enabled,
                PpnOptionsBuilder::integrity_attestation_enabled,
            ),
            (
                self.install_crash_signal_handler,
                PpnOptionsBuilder::install_crash_signal_handler,
            ),
            (
                self.periodic_health_check_enabled,
                PpnOptionsBuilder::periodic_health_check_enabled,
            ),
        ];
        for (value, set) in flags {
            if let Some(value) = value {
                set(builder, value);
            }
        }

        Ok(())
    }
}

impl PpnOptions {
    /// Build options from a TOML string, starting from the built-in defaults.
    pub fn parse(s: &str) -> Result<Self, OptionsError> {
        let file = OptionsFile::from_toml(s)?;
        let mut builder = PpnOptions::builder();
        file.apply(&mut builder)?;
        Ok(builder.build())
    }

    /// Load options from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, OptionsError> {
        let content = tokio::fs::read_to_string(path).await?;
        let options = Self::parse(&content)?;
        info!(path = %path.display(), "loaded PPN options");
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_empty_toml_gives_defaults() {
        let options = PpnOptions::parse("").unwrap();
        assert_eq!(options, PpnOptions::default());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            zinc_url = "https://auth.example.com"
            zinc_public_signing_key_url = "https://auth.example.com/psk"
            brass_url = "https://brass.example.com"
            zinc_oauth_scopes = "scope"
            zinc_service_type = "type"
            connectivity_check_url = "https://check.example.com"
            connectivity_check_retry_delay_ms = 1500
            connectivity_check_max_retries = 10
            copper_controller_address = "127.0.0.1"
            copper_hostname_override = "override.example"
            copper_hostname_suffix = ["a.example", "b.example"]
            disallowed_applications = ["foo", "bar"]
            datapath_protocol = "ipsec"
            bridge_key_length = 256
            rekey_duration_ms = 1005
            blind_signing_enabled = false
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
        let options = PpnOptions::parse(toml).unwrap();

        assert_eq!(options.zinc_url(), "https://auth.example.com");
        assert_eq!(options.zinc_public_signing_key_url(), "https://auth.example.com/psk");
        assert_eq!(options.brass_url(), "https://brass.example.com");
        assert_eq!(options.zinc_oauth_scopes(), "scope");
        assert_eq!(options.zinc_service_type(), "type");
        assert_eq!(options.connectivity_check_url(), "https://check.example.com");
        assert_eq!(
            options.connectivity_check_retry_delay(),
            Duration::from_millis(1500)
        );
        assert_eq!(options.connectivity_check_max_retries(), 10);
        assert_eq!(options.copper_controller_address(), Some("127.0.0.1"));
        assert_eq!(options.copper_hostname_override(), Some("override.example"));
        assert_eq!(options.copper_hostname_suffix(), ["a.example", "b.example"]);
        assert_eq!(options.disallowed_applications(), ["foo", "bar"]);
        assert_eq!(options.datapath_protocol(), Some(DatapathProtocol::Ipsec));
        assert_eq!(options.bridge_key_length(), Some(256));
        assert_eq!(options.rekey_duration(), Some(Duration::from_millis(1005)));
        assert_eq!(options.blind_signing_enabled(), Some(false));
        assert_eq!(
            options.reconnector_initial_time_to_reconnect(),
            Some(Duration::from_millis(2))
        );
        assert_eq!(
            options.reconnector_session_connection_deadline(),
            Some(Duration::from_millis(4))
        );
        assert_eq!(options.api_key().map(|k| k.expose()), Some("apiKey"));
        assert_eq!(options.public_metadata_enabled(), Some(true));
        assert_eq!(options.ipv4_keepalive_interval(), Some(Duration::from_millis(8)));
        assert_eq!(options.ipv6_keepalive_interval(), Some(Duration::from_millis(16)));
        assert_eq!(
            options.periodic_health_check_duration(),
            Some(Duration::from_secs(60))
        );
        assert!(options.sticky_service());
        assert!(options.safe_disconnect_enabled());
        assert!(!options.ipv6_enabled());
        assert!(!options.dns_cache_enabled());
        assert!(options.attach_oauth_token_as_header_enabled());
        assert!(options.dynamic_mtu_enabled());
        assert!(options.integrity_attestation_enabled());
        assert!(options.install_crash_signal_handler());
        assert!(options.periodic_health_check_enabled());
    }

    #[test]
    fn test_empty_strings_are_ignored() {
        let toml = r#"
            zinc_url = ""
            brass_url = ""
            copper_controller_address = ""
        "#;
        let options = PpnOptions::parse(toml).unwrap();
        let defaults = PpnOptions::default();
        assert_eq!(options.zinc_url(), defaults.zinc_url());
        assert_eq!(options.brass_url(), defaults.brass_url());
        assert_eq!(options.copper_controller_address(), None);
    }

    #[test]
    fn test_rejects_bad_key_length() {
        let result = PpnOptions::parse("bridge_key_length = 42");
        assert!(matches!(result, Err(OptionsError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_unknown_protocol() {
        let result = PpnOptions::parse(r#"datapath_protocol = "wireguard""#);
        assert!(matches!(result, Err(OptionsError::Parse(_))));
    }

    #[test]
    fn test_rejects_wrong_type() {
        let result = PpnOptions::parse(r#"ipv6_enabled = "yes""#);
        assert!(matches!(result, Err(OptionsError::Parse(_))));
    }

    #[test]
    fn test_apply_onto_existing_builder() {
        let mut builder = PpnOptions::builder();
        builder.zinc_service_type("from-code").sticky_service(true);

        let file = OptionsFile::from_toml(r#"brass_url = "https://brass.example.com""#).unwrap();
        file.apply(&mut builder).unwrap();

        let options = builder.build();
        assert_eq!(options.zinc_service_type(), "from-code");
        assert!(options.sticky_service());
        assert_eq!(options.brass_url(), "https://brass.example.com");
    }

    #[test]
    fn test_rejected_apply_leaves_builder_unchanged() {
        let mut builder = PpnOptions::builder();
        builder
            .brass_url("https://original.example")
            .rekey_duration(Duration::from_secs(30));
        let before = builder.build();

        let file = OptionsFile::from_toml(
            r#"
            brass_url = "https://from-file.example"
            sticky_service = true
            bridge_key_length = 42
            "#,
        )
        .unwrap();
        let result = file.apply(&mut builder);

        assert!(matches!(result, Err(OptionsError::InvalidArgument(_))));
        assert_eq!(builder.build(), before);
    }

    // ── Async file-based loading ──────────────────────────────────────

    #[tokio::test]
    async fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ppn.toml");
        tokio::fs::write(&path, b"zinc_service_type = \"type\"\nbridge_key_length = 128\n")
            .await
            .unwrap();

        let options = PpnOptions::load(&path).await.unwrap();
        assert_eq!(options.zinc_service_type(), "type");
        assert_eq!(options.bridge_key_length(), Some(128));
    }

    #[tokio::test]
    async fn test_load_nonexistent_file() {
        let result = PpnOptions::load(Path::new("/nonexistent/ppn.toml")).await;
        assert!(matches!(result, Err(OptionsError::Io(_))));
    }

    #[tokio::test]
    async fn test_load_invalid_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        tokio::fs::write(&path, b"not valid toml [[[")
            .await
            .unwrap();

        let result = PpnOptions::load(&path).await;
        assert!(matches!(result, Err(OptionsError::Parse(_))));
    }
}
