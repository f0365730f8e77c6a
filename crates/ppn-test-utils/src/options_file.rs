//! Temporary options files.

use std::path::PathBuf;

use tempfile::TempDir;
use tracing::debug;

/// An options file in a test-scoped temp directory.
///
/// The directory is deleted when this value is dropped, guaranteeing cleanup
/// even on panic.
pub struct TestOptionsFile {
    pub path: PathBuf,
    _temp_dir: TempDir,
}

impl TestOptionsFile {
    /// Write `toml_content` to `ppn.toml` inside a fresh temp directory.
    pub async fn with_toml(toml_content: &str) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("ppn.toml");
        tokio::fs::write(&path, toml_content)
            .await
            .expect("failed to write test options file");
        debug!(path = %path.display(), "wrote test options file");

        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Overwrite the file with new content.
    pub async fn write(&self, toml_content: &str) {
        tokio::fs::write(&self.path, toml_content)
            .await
            .expect("failed to rewrite test options file");
    }
}
