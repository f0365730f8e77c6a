#![deny(unsafe_code)]

//! PPN CLI: validate options files and emit Krypton configs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ppn_options::{KryptonConfig, PpnOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// PPN options tool.
#[derive(Parser)]
#[command(name = "ppn", version, about, long_about = None)]
struct Cli {
    /// Path to the options file.
    #[arg(short, long, default_value = "ppn.toml")]
    options: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the options file loads.
    Validate,

    /// Print the resolved options (API key redacted).
    Show,

    /// Print the Krypton config derived from the options as JSON.
    KryptonConfig {
        /// Emit single-line JSON.
        #[arg(long)]
        compact: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = load_options(&cli.options).await?;

    match cli.command {
        Commands::Validate => {
            println!("Options at '{}' are valid.", cli.options.display());
        }
        Commands::Show => println!("{options:#?}"),
        Commands::KryptonConfig { compact } => {
            let config = options.create_krypton_config();
            println!("{}", render_krypton_config(&config, compact)?);
        }
    }

    Ok(())
}

async fn load_options(path: &Path) -> Result<PpnOptions> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        PpnOptions::load(path)
            .await
            .with_context(|| format!("failed to load options from '{}'", path.display()))
    } else {
        info!(path = %path.display(), "Options file not found, using defaults");
        Ok(PpnOptions::default())
    }
}

fn render_krypton_config(config: &KryptonConfig, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(config)?
    } else {
        serde_json::to_string_pretty(config)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use ppn_test_utils::fixtures::FULL_OPTIONS_TOML;
    use ppn_test_utils::options_file::TestOptionsFile;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_krypton_config_subcommand() {
        let cli = Cli::try_parse_from(["ppn", "-o", "custom.toml", "krypton-config", "--compact"])
            .unwrap();
        assert_eq!(cli.options, PathBuf::from("custom.toml"));
        assert!(matches!(cli.command, Commands::KryptonConfig { compact: true }));
    }

    #[test]
    fn test_default_options_path() {
        let cli = Cli::try_parse_from(["ppn", "-vv", "validate"]).unwrap();
        assert_eq!(cli.options, PathBuf::from("ppn.toml"));
        assert_eq!(cli.verbose, 2);
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let options = load_options(&tmp.path().join("absent.toml")).await.unwrap();
        assert_eq!(options, PpnOptions::default());
    }

    #[tokio::test]
    async fn test_invalid_file_reports_path() {
        let file = TestOptionsFile::with_toml("bridge_key_length = 42").await;
        let err = load_options(&file.path).await.unwrap_err();
        assert!(format!("{err:#}").contains("ppn.toml"));
        assert!(format!("{err:#}").contains("invalid argument"));
    }

    #[tokio::test]
    async fn test_render_full_config() {
        let file = TestOptionsFile::with_toml(FULL_OPTIONS_TOML).await;
        let options = load_options(&file.path).await.unwrap();
        let rendered = render_krypton_config(&options.create_krypton_config(), true).unwrap();

        let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(json["service_type"], "d");
        assert_eq!(json["datapath_protocol"], "BRIDGE");
        assert_eq!(json["reconnector_config"]["initial_time_to_reconnect_msec"], 2);
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn test_render_pretty_is_multiline() {
        let config = PpnOptions::default().create_krypton_config();
        let rendered = render_krypton_config(&config, false).unwrap();
        assert!(rendered.contains('\n'));
        assert!(rendered.contains("g-tun.com"));
    }
}
