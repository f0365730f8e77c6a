//! Krypton configuration: the translation target of [`PpnOptions`].
//!
//! Every field with presence semantics is an `Option`, so an explicit
//! `false` or zero is never confused with "not set". The reconnector
//! sub-message is always present; only its inner fields are optional.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::options::{DatapathProtocol, PpnOptions};
use crate::secret::ApiKey;

/// Copper hostname suffix used when the options carry none.
pub const DEFAULT_COPPER_HOSTNAME_SUFFIX: &str = "g-tun.com";

/// Largest magnitude, in seconds, representable by a protobuf `Duration`
/// (10,000 years).
pub const MAX_PROTO_DURATION_SECONDS: i64 = 315_576_000_000;

/// Seconds plus nanoseconds, matching `google.protobuf.Duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct ProtoDuration {
    pub seconds: i64,
    pub nanos: i32,
}

impl From<Duration> for ProtoDuration {
    /// Exact to the nanosecond; saturates at [`MAX_PROTO_DURATION_SECONDS`].
    fn from(duration: Duration) -> Self {
        let seconds = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);
        if seconds >= MAX_PROTO_DURATION_SECONDS {
            return Self {
                seconds: MAX_PROTO_DURATION_SECONDS,
                nanos: 0,
            };
        }
        Self {
            seconds,
            nanos: i32::try_from(duration.subsec_nanos()).unwrap_or(i32::MAX),
        }
    }
}

/// Datapath protocol as understood by Krypton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KryptonDatapathProtocol {
    Ipsec,
    Bridge,
}

impl From<DatapathProtocol> for KryptonDatapathProtocol {
    fn from(protocol: DatapathProtocol) -> Self {
        match protocol {
            DatapathProtocol::Ipsec => Self::Ipsec,
            DatapathProtocol::Bridge => Self::Bridge,
        }
    }
}

/// Reconnection policy handed to the Krypton reconnector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconnectorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_time_to_reconnect_msec: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_connection_deadline_msec: Option<u32>,
}

/// Configuration consumed by the Krypton session runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KryptonConfig {
    pub zinc_url: String,
    pub zinc_public_signing_key_url: String,
    pub brass_url: String,
    pub service_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cipher_suite_key_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datapath_protocol: Option<KryptonDatapathProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_blind_signing: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub copper_controller_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copper_hostname_override: Option<String>,
    /// Never empty after translation.
    pub copper_hostname_suffix: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rekey_duration: Option<ProtoDuration>,
    pub reconnector_config: ReconnectorConfig,

    pub safe_disconnect_enabled: bool,
    pub ipv6_enabled: bool,
    pub dynamic_mtu_enabled: bool,
    pub integrity_attestation_enabled: bool,
    pub attach_oauth_token_as_header: bool,
    pub install_crash_signal_handler: bool,

    pub periodic_health_check_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodic_health_check_duration: Option<ProtoDuration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<ApiKey>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_keepalive_interval: Option<ProtoDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6_keepalive_interval: Option<ProtoDuration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_metadata_enabled: Option<bool>,
}

fn saturating_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

impl PpnOptions {
    /// Project these options onto a [`KryptonConfig`].
    ///
    /// Pure and infallible: the snapshot was validated while it was built.
    /// Options consumed by the host VPN layer (OAuth scopes, sticky service,
    /// DNS cache, disallowed applications, connectivity checks) are not part
    /// of the Krypton configuration.
    pub fn create_krypton_config(&self) -> KryptonConfig {
        let copper_hostname_suffix = if self.copper_hostname_suffix().is_empty() {
            vec![DEFAULT_COPPER_HOSTNAME_SUFFIX.to_string()]
        } else {
            self.copper_hostname_suffix().to_vec()
        };

        let config = KryptonConfig {
            zinc_url: self.zinc_url().to_string(),
            zinc_public_signing_key_url: self.zinc_public_signing_key_url().to_string(),
            brass_url: self.brass_url().to_string(),
            service_type: self.zinc_service_type().to_string(),
            cipher_suite_key_length: self.bridge_key_length(),
            datapath_protocol: self.datapath_protocol().map(Into::into),
            enable_blind_signing: self.blind_signing_enabled(),
            copper_controller_address: self.copper_controller_address().map(str::to_string),
            copper_hostname_override: self.copper_hostname_override().map(str::to_string),
            copper_hostname_suffix,
            rekey_duration: self.rekey_duration().map(ProtoDuration::from),
            reconnector_config: ReconnectorConfig {
                initial_time_to_reconnect_msec: self
                    .reconnector_initial_time_to_reconnect()
                    .map(saturating_millis),
                session_connection_deadline_msec: self
                    .reconnector_session_connection_deadline()
                    .map(saturating_millis),
            },
            safe_disconnect_enabled: self.safe_disconnect_enabled(),
            ipv6_enabled: self.ipv6_enabled(),
            dynamic_mtu_enabled: self.dynamic_mtu_enabled(),
            integrity_attestation_enabled: self.integrity_attestation_enabled(),
            attach_oauth_token_as_header: self.attach_oauth_token_as_header_enabled(),
            install_crash_signal_handler: self.install_crash_signal_handler(),
            periodic_health_check_enabled: self.periodic_health_check_enabled(),
            periodic_health_check_duration: self
                .periodic_health_check_duration()
                .map(ProtoDuration::from),
            api_key: self.api_key().cloned(),
            ipv4_keepalive_interval: self.ipv4_keepalive_interval().map(ProtoDuration::from),
            ipv6_keepalive_interval: self.ipv6_keepalive_interval().map(ProtoDuration::from),
            public_metadata_enabled: self.public_metadata_enabled(),
        };

        debug!(
            service_type = %config.service_type,
            datapath_protocol = ?config.datapath_protocol,
            suffixes = config.copper_hostname_suffix.len(),
            "created Krypton config"
        );

        config
    }
}
