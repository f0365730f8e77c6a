//! Options builder and immutable snapshot.
//!
//! Setters for defaulted fields are permissive: a `None` or empty input is
//! ignored and the current value (built-in default or an earlier setting)
//! is kept. Setters for optional fields overwrite unconditionally, so
//! passing `None` clears them. The bridge key length is the only setter
//! that validates its input.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{ApiKey, OptionsError};

pub const DEFAULT_ZINC_URL: &str = "https://phosphor-pa.googleapis.com/v1/authandsign";
pub const DEFAULT_ZINC_PUBLIC_SIGNING_KEY_URL: &str =
    "https://phosphor-pa.googleapis.com/v1/getInitialData";
pub const DEFAULT_BRASS_URL: &str = "https://phosphor-pa.googleapis.com/v1/addegress";
pub const DEFAULT_ZINC_OAUTH_SCOPES: &str = "oauth2:https://www.googleapis.com/auth/subscriptions";
pub const DEFAULT_ZINC_SERVICE_TYPE: &str = "g1";
pub const DEFAULT_CONNECTIVITY_CHECK_URL: &str =
    "https://connectivitycheck.gstatic.com/generate_204";
pub const DEFAULT_CONNECTIVITY_CHECK_RETRY_DELAY: Duration = Duration::from_secs(15);
pub const DEFAULT_CONNECTIVITY_CHECK_MAX_RETRIES: u32 = 5;

/// Key lengths, in bits, accepted for the bridge cipher suite.
pub const ALLOWED_BRIDGE_KEY_LENGTHS: [u32; 2] = [128, 256];

/// Datapath protocol requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatapathProtocol {
    Ipsec,
    Bridge,
}

/// Immutable snapshot of PPN connection options.
///
/// Obtain one from [`PpnOptions::builder`]. Defaulted fields are exposed as
/// plain values; fields without a built-in default are exposed as `Option`
/// so that "never set" stays distinguishable from "set to false or zero".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpnOptions {
    zinc_url: String,
    zinc_public_signing_key_url: String,
    brass_url: String,
    zinc_oauth_scopes: String,
    zinc_service_type: String,
    connectivity_check_url: String,
    connectivity_check_retry_delay: Duration,
    connectivity_check_max_retries: u32,

    copper_controller_address: Option<String>,
    copper_hostname_override: Option<String>,
    copper_hostname_suffix: Vec<String>,
    disallowed_applications: Vec<String>,

    datapath_protocol: Option<DatapathProtocol>,
    bridge_key_length: Option<u32>,
    rekey_duration: Option<Duration>,
    blind_signing_enabled: Option<bool>,
    reconnector_initial_time_to_reconnect: Option<Duration>,
    reconnector_session_connection_deadline: Option<Duration>,
    api_key: Option<ApiKey>,
    public_metadata_enabled: Option<bool>,
    ipv4_keepalive_interval: Option<Duration>,
    ipv6_keepalive_interval: Option<Duration>,
    periodic_health_check_duration: Option<Duration>,

    sticky_service: bool,
    safe_disconnect_enabled: bool,
    ipv6_enabled: bool,
    dns_cache_enabled: bool,
    attach_oauth_token_as_header_enabled: bool,
    dynamic_mtu_enabled: bool,
    integrity_attestation_enabled: bool,
    install_crash_signal_handler: bool,
    periodic_health_check_enabled: bool,
}

impl Default for PpnOptions {
    fn default() -> Self {
        Self {
            zinc_url: DEFAULT_ZINC_URL.to_string(),
            zinc_public_signing_key_url: DEFAULT_ZINC_PUBLIC_SIGNING_KEY_URL.to_string(),
            brass_url: DEFAULT_BRASS_URL.to_string(),
            zinc_oauth_scopes: DEFAULT_ZINC_OAUTH_SCOPES.to_string(),
            zinc_service_type: DEFAULT_ZINC_SERVICE_TYPE.to_string(),
            connectivity_check_url: DEFAULT_CONNECTIVITY_CHECK_URL.to_string(),
            connectivity_check_retry_delay: DEFAULT_CONNECTIVITY_CHECK_RETRY_DELAY,
            connectivity_check_max_retries: DEFAULT_CONNECTIVITY_CHECK_MAX_RETRIES,
            copper_controller_address: None,
            copper_hostname_override: None,
            copper_hostname_suffix: Vec::new(),
            disallowed_applications: Vec::new(),
            datapath_protocol: None,
            bridge_key_length: None,
            rekey_duration: None,
            blind_signing_enabled: None,
            reconnector_initial_time_to_reconnect: None,
            reconnector_session_connection_deadline: None,
            api_key: None,
            public_metadata_enabled: None,
            ipv4_keepalive_interval: None,
            ipv6_keepalive_interval: None,
            periodic_health_check_duration: None,
            sticky_service: false,
            safe_disconnect_enabled: false,
            ipv6_enabled: true,
            dns_cache_enabled: true,
            attach_oauth_token_as_header_enabled: false,
            dynamic_mtu_enabled: false,
            integrity_attestation_enabled: false,
            install_crash_signal_handler: false,
            periodic_health_check_enabled: false,
        }
    }
}

impl PpnOptions {
    /// Start a builder preloaded with the built-in defaults.
    pub fn builder() -> PpnOptionsBuilder {
        PpnOptionsBuilder::new()
    }

    /// Start a builder preloaded with this snapshot's values.
    pub fn to_builder(&self) -> PpnOptionsBuilder {
        PpnOptionsBuilder {
            options: self.clone(),
        }
    }

    pub fn zinc_url(&self) -> &str {
        &self.zinc_url
    }

    pub fn zinc_public_signing_key_url(&self) -> &str {
        &self.zinc_public_signing_key_url
    }

    pub fn brass_url(&self) -> &str {
        &self.brass_url
    }

    pub fn zinc_oauth_scopes(&self) -> &str {
        &self.zinc_oauth_scopes
    }

    pub fn zinc_service_type(&self) -> &str {
        &self.zinc_service_type
    }

    pub fn connectivity_check_url(&self) -> &str {
        &self.connectivity_check_url
    }

    pub fn connectivity_check_retry_delay(&self) -> Duration {
        self.connectivity_check_retry_delay
    }

    pub fn connectivity_check_max_retries(&self) -> u32 {
        self.connectivity_check_max_retries
    }

    pub fn copper_controller_address(&self) -> Option<&str> {
        self.copper_controller_address.as_deref()
    }

    pub fn copper_hostname_override(&self) -> Option<&str> {
        self.copper_hostname_override.as_deref()
    }

    /// Copper hostname suffixes as set by the caller (may be empty).
    pub fn copper_hostname_suffix(&self) -> &[String] {
        &self.copper_hostname_suffix
    }

    /// Application identifiers excluded from the tunnel.
    pub fn disallowed_applications(&self) -> &[String] {
        &self.disallowed_applications
    }

    pub fn datapath_protocol(&self) -> Option<DatapathProtocol> {
        self.datapath_protocol
    }

    /// Bridge cipher suite key length in bits; always one of
    /// [`ALLOWED_BRIDGE_KEY_LENGTHS`] when present.
    pub fn bridge_key_length(&self) -> Option<u32> {
        self.bridge_key_length
    }

    pub fn rekey_duration(&self) -> Option<Duration> {
        self.rekey_duration
    }

    pub fn blind_signing_enabled(&self) -> Option<bool> {
        self.blind_signing_enabled
    }

    pub fn reconnector_initial_time_to_reconnect(&self) -> Option<Duration> {
        self.reconnector_initial_time_to_reconnect
    }

    pub fn reconnector_session_connection_deadline(&self) -> Option<Duration> {
        self.reconnector_session_connection_deadline
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    pub fn public_metadata_enabled(&self) -> Option<bool> {
        self.public_metadata_enabled
    }

    pub fn ipv4_keepalive_interval(&self) -> Option<Duration> {
        self.ipv4_keepalive_interval
    }

    pub fn ipv6_keepalive_interval(&self) -> Option<Duration> {
        self.ipv6_keepalive_interval
    }

    pub fn periodic_health_check_duration(&self) -> Option<Duration> {
        self.periodic_health_check_duration
    }

    pub fn sticky_service(&self) -> bool {
        self.sticky_service
    }

    pub fn safe_disconnect_enabled(&self) -> bool {
        self.safe_disconnect_enabled
    }

    pub fn ipv6_enabled(&self) -> bool {
        self.ipv6_enabled
    }

    pub fn dns_cache_enabled(&self) -> bool {
        self.dns_cache_enabled
    }

    pub fn attach_oauth_token_as_header_enabled(&self) -> bool {
        self.attach_oauth_token_as_header_enabled
    }

    pub fn dynamic_mtu_enabled(&self) -> bool {
        self.dynamic_mtu_enabled
    }

    pub fn integrity_attestation_enabled(&self) -> bool {
        self.integrity_attestation_enabled
    }

    pub fn install_crash_signal_handler(&self) -> bool {
        self.install_crash_signal_handler
    }

    pub fn periodic_health_check_enabled(&self) -> bool {
        self.periodic_health_check_enabled
    }
}

/// Accumulates option values before they are frozen into a [`PpnOptions`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ppn_options::{DatapathProtocol, PpnOptions};
///
/// let options = PpnOptions::builder()
///     .brass_url("https://brass.example.com/addegress")
///     .datapath_protocol(DatapathProtocol::Bridge)
///     .bridge_key_length(256)?
///     .rekey_duration(Duration::from_secs(3600))
///     .build();
///
/// assert_eq!(options.bridge_key_length(), Some(256));
/// # Ok::<(), ppn_options::OptionsError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PpnOptionsBuilder {
    options: PpnOptions,
}

/// Store `value` unless it is absent or empty.
fn set_non_empty(slot: &mut String, field: &'static str, value: Option<&str>) {
    match value {
        Some(v) if !v.is_empty() => *slot = v.to_string(),
        _ => debug!(field = field, "ignoring null or empty value"),
    }
}

fn set_optional_non_empty(slot: &mut Option<String>, field: &'static str, value: Option<&str>) {
    match value {
        Some(v) if !v.is_empty() => *slot = Some(v.to_string()),
        _ => debug!(field = field, "ignoring null or empty value"),
    }
}

fn collect_strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl PpnOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Defaulted strings ─────────────────────────────────────────────

    pub fn zinc_url<'a>(&mut self, url: impl Into<Option<&'a str>>) -> &mut Self {
        set_non_empty(&mut self.options.zinc_url, "zinc_url", url.into());
        self
    }

    pub fn zinc_public_signing_key_url<'a>(
        &mut self,
        url: impl Into<Option<&'a str>>,
    ) -> &mut Self {
        set_non_empty(
            &mut self.options.zinc_public_signing_key_url,
            "zinc_public_signing_key_url",
            url.into(),
        );
        self
    }

    pub fn brass_url<'a>(&mut self, url: impl Into<Option<&'a str>>) -> &mut Self {
        set_non_empty(&mut self.options.brass_url, "brass_url", url.into());
        self
    }

    pub fn zinc_oauth_scopes<'a>(&mut self, scopes: impl Into<Option<&'a str>>) -> &mut Self {
        set_non_empty(
            &mut self.options.zinc_oauth_scopes,
            "zinc_oauth_scopes",
            scopes.into(),
        );
        self
    }

    pub fn zinc_service_type<'a>(&mut self, service_type: impl Into<Option<&'a str>>) -> &mut Self {
        set_non_empty(
            &mut self.options.zinc_service_type,
            "zinc_service_type",
            service_type.into(),
        );
        self
    }

    pub fn connectivity_check_url<'a>(&mut self, url: impl Into<Option<&'a str>>) -> &mut Self {
        set_non_empty(
            &mut self.options.connectivity_check_url,
            "connectivity_check_url",
            url.into(),
        );
        self
    }

    // ── Connectivity-check retry policy ───────────────────────────────

    /// Delay between connectivity checks. `None` keeps the current value.
    pub fn connectivity_check_retry_delay(
        &mut self,
        delay: impl Into<Option<Duration>>,
    ) -> &mut Self {
        match delay.into() {
            Some(delay) => self.options.connectivity_check_retry_delay = delay,
            None => debug!(
                field = "connectivity_check_retry_delay",
                "ignoring null value"
            ),
        }
        self
    }

    pub fn connectivity_check_max_retries(&mut self, retries: u32) -> &mut Self {
        self.options.connectivity_check_max_retries = retries;
        self
    }

    // ── Copper ────────────────────────────────────────────────────────

    /// Copper controller address. `None` and `""` are ignored.
    pub fn copper_controller_address<'a>(
        &mut self,
        address: impl Into<Option<&'a str>>,
    ) -> &mut Self {
        set_optional_non_empty(
            &mut self.options.copper_controller_address,
            "copper_controller_address",
            address.into(),
        );
        self
    }

    /// Copper hostname override. `None` and `""` are ignored.
    pub fn copper_hostname_override<'a>(
        &mut self,
        hostname: impl Into<Option<&'a str>>,
    ) -> &mut Self {
        set_optional_non_empty(
            &mut self.options.copper_hostname_override,
            "copper_hostname_override",
            hostname.into(),
        );
        self
    }

    pub fn copper_hostname_suffix<I, S>(&mut self, suffixes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.copper_hostname_suffix = collect_strings(suffixes);
        self
    }

    pub fn disallowed_applications<I, S>(&mut self, applications: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.disallowed_applications = collect_strings(applications);
        self
    }

    // ── Optional scalars ──────────────────────────────────────────────

    pub fn datapath_protocol(&mut self, protocol: impl Into<Option<DatapathProtocol>>) -> &mut Self {
        self.options.datapath_protocol = protocol.into();
        self
    }

    /// Set the bridge cipher suite key length in bits.
    ///
    /// Fails with [`OptionsError::InvalidArgument`] unless `bits` is one of
    /// [`ALLOWED_BRIDGE_KEY_LENGTHS`]; the builder is left unchanged on
    /// failure.
    pub fn bridge_key_length(&mut self, bits: u32) -> Result<&mut Self, OptionsError> {
        if !ALLOWED_BRIDGE_KEY_LENGTHS.contains(&bits) {
            warn!(bits = bits, "rejecting bridge key length");
            return Err(OptionsError::InvalidArgument(format!(
                "bridge key length must be one of {ALLOWED_BRIDGE_KEY_LENGTHS:?}, got {bits}"
            )));
        }
        self.options.bridge_key_length = Some(bits);
        Ok(self)
    }

    pub fn rekey_duration(&mut self, duration: impl Into<Option<Duration>>) -> &mut Self {
        self.options.rekey_duration = duration.into();
        self
    }

    pub fn blind_signing_enabled(&mut self, enabled: impl Into<Option<bool>>) -> &mut Self {
        self.options.blind_signing_enabled = enabled.into();
        self
    }

    pub fn reconnector_initial_time_to_reconnect(
        &mut self,
        duration: impl Into<Option<Duration>>,
    ) -> &mut Self {
        self.options.reconnector_initial_time_to_reconnect = duration.into();
        self
    }

    pub fn reconnector_session_connection_deadline(
        &mut self,
        duration: impl Into<Option<Duration>>,
    ) -> &mut Self {
        self.options.reconnector_session_connection_deadline = duration.into();
        self
    }

    pub fn api_key<'a>(&mut self, key: impl Into<Option<&'a str>>) -> &mut Self {
        self.options.api_key = key.into().map(ApiKey::from);
        self
    }

    pub fn public_metadata_enabled(&mut self, enabled: impl Into<Option<bool>>) -> &mut Self {
        self.options.public_metadata_enabled = enabled.into();
        self
    }

    pub fn ipv4_keepalive_interval(&mut self, interval: impl Into<Option<Duration>>) -> &mut Self {
        self.options.ipv4_keepalive_interval = interval.into();
        self
    }

    pub fn ipv6_keepalive_interval(&mut self, interval: impl Into<Option<Duration>>) -> &mut Self {
        self.options.ipv6_keepalive_interval = interval.into();
        self
    }

    pub fn periodic_health_check_duration(
        &mut self,
        duration: impl Into<Option<Duration>>,
    ) -> &mut Self {
        self.options.periodic_health_check_duration = duration.into();
        self
    }

    // ── Flags ─────────────────────────────────────────────────────────

    pub fn sticky_service(&mut self, sticky: bool) -> &mut Self {
        self.options.sticky_service = sticky;
        self
    }

    pub fn safe_disconnect_enabled(&mut self, enabled: bool) -> &mut Self {
        self.options.safe_disconnect_enabled = enabled;
        self
    }

    pub fn ipv6_enabled(&mut self, enabled: bool) -> &mut Self {
        self.options.ipv6_enabled = enabled;
        self
    }

    pub fn dns_cache_enabled(&mut self, enabled: bool) -> &mut Self {
        self.options.dns_cache_enabled = enabled;
        self
    }

    pub fn attach_oauth_token_as_header_enabled(&mut self, enabled: bool) -> &mut Self {
        self.options.attach_oauth_token_as_header_enabled = enabled;
        self
    }

    pub fn dynamic_mtu_enabled(&mut self, enabled: bool) -> &mut Self {
        self.options.dynamic_mtu_enabled = enabled;
        self
    }

    pub fn integrity_attestation_enabled(&mut self, enabled: bool) -> &mut Self {
        self.options.integrity_attestation_enabled = enabled;
        self
    }

    pub fn install_crash_signal_handler(&mut self, install: bool) -> &mut Self {
        self.options.install_crash_signal_handler = install;
        self
    }

    pub fn periodic_health_check_enabled(&mut self, enabled: bool) -> &mut Self {
        self.options.periodic_health_check_enabled = enabled;
        self
    }

    /// Freeze the accumulated values into a snapshot.
    pub fn build(&self) -> PpnOptions {
        self.options.clone()
    }
}
