#![deny(unsafe_code)]

//! Connection options for PPN and their translation into a [`KryptonConfig`].
//!
//! Callers accumulate values on a [`PpnOptionsBuilder`], freeze them into an
//! immutable [`PpnOptions`] snapshot, and project that snapshot onto the
//! [`KryptonConfig`] consumed by the Krypton session runtime.
//!
//! Options can also be read from a TOML file through the [`file`] module,
//! which feeds every key through the same builder setters.

/// TOML options-file layer.
pub mod file;
/// Translation target consumed by the Krypton runtime.
pub mod krypton;
/// Options builder and immutable snapshot.
pub mod options;
/// Redacting wrapper for the API key.
pub mod secret;

pub use file::OptionsFile;
pub use krypton::{KryptonConfig, KryptonDatapathProtocol, ProtoDuration, ReconnectorConfig};
pub use options::{DatapathProtocol, PpnOptions, PpnOptionsBuilder};
pub use secret::ApiKey;

/// Errors produced while building or loading options.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("failed to read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_options_error_display() {
        let err = OptionsError::InvalidArgument("bad value".to_string());
        assert_eq!(err.to_string(), "invalid argument: bad value");
    }

    #[test]
    fn test_parse_error_converts() {
        let toml_err = toml::from_str::<toml::Table>("not valid [[[").unwrap_err();
        let err: OptionsError = toml_err.into();
        assert!(matches!(err, OptionsError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse TOML"));
    }
}
