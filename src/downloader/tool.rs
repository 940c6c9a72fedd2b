// Extraction tool abstraction
//
// The service never fetches media itself; everything goes through an
// external binary. The trait keeps the executor testable without yt-dlp
// installed.

use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::errors::DownloadError;
use super::utils::run_output_with_timeout;

/// A command-line media extraction tool
#[async_trait]
pub trait ExtractionTool: Send + Sync {
    /// Name of the tool (for logging)
    fn name(&self) -> &'static str;

    /// Whether the binary is present and runnable
    async fn is_available(&self) -> bool;

    /// Tool version string, if it can be determined
    async fn version(&self) -> Option<String>;

    /// Run one invocation to completion with a timeout
    async fn run(&self, args: &[String], timeout_secs: u64) -> Result<Output, DownloadError>;
}

/// The yt-dlp binary
pub struct YtDlp {
    path: String,
}

impl YtDlp {
    /// Locate the binary: explicit override first, then common install
    /// paths, then whatever `which` finds on PATH.
    pub fn locate(override_path: Option<String>) -> Self {
        if let Some(path) = override_path {
            return Self { path };
        }
        Self {
            path: Self::find_binary(),
        }
    }

    fn find_binary() -> String {
        let common_paths = [
            "/opt/homebrew/bin/yt-dlp",
            "/usr/local/bin/yt-dlp",
            "/usr/bin/yt-dlp",
        ];

        for path in common_paths {
            if std::path::Path::new(path).exists() {
                debug!(path, "found yt-dlp at common path");
                return path.to_string();
            }
        }

        if let Ok(output) = std::process::Command::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                if let Ok(path) = String::from_utf8(output.stdout) {
                    let trimmed = path.trim();
                    if !trimmed.is_empty() {
                        debug!(path = trimmed, "found yt-dlp on PATH");
                        return trimmed.to_string();
                    }
                }
            }
        }

        "yt-dlp".to_string()
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl ExtractionTool for YtDlp {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn is_available(&self) -> bool {
        match Command::new(&self.path).arg("--version").output().await {
            Ok(out) => out.status.success(),
            Err(_) => false,
        }
    }

    async fn version(&self) -> Option<String> {
        match Command::new(&self.path).arg("--version").output().await {
            Ok(out) if out.status.success() => {
                Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
            }
            _ => None,
        }
    }

    async fn run(&self, args: &[String], timeout_secs: u64) -> Result<Output, DownloadError> {
        run_output_with_timeout(&self.path, args, timeout_secs).await
    }
}
