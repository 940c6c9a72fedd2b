// Error types for the download pipeline

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// Network timeout while the tool was talking to the source site
    #[error("network timeout: the source site is not responding")]
    NetworkTimeout,

    /// yt-dlp binary not found or not runnable
    #[error("extraction tool not available: {0}")]
    ToolNotFound(String),

    /// URL failed validation or the tool rejected it
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A single attempt timed out and the child was killed
    #[error("attempt timed out after {0}s")]
    AttemptTimeout(u64),

    /// Command could not be spawned or waited on
    #[error("execution error: {0}")]
    ExecutionError(String),

    /// Tool exited zero but the expected output file is missing
    #[error("tool reported success but no output file was produced at {0}")]
    MissingOutput(String),

    /// Anything we could not classify; holds the raw tool stderr
    #[error("download failed: {0}")]
    Unknown(String),
}

// Smart classification of raw tool stderr, for the common case where all
// we have is an opaque message.
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();

        if lower.contains("timeout") || lower.contains("timed out") {
            return Self::NetworkTimeout;
        }

        if lower.contains("not found")
            || lower.contains("no such file")
            || lower.contains("command not found")
        {
            return Self::ToolNotFound(s);
        }

        if lower.contains("invalid url")
            || lower.contains("unsupported url")
            || lower.contains("is not a valid url")
        {
            return Self::InvalidUrl(s);
        }

        Self::Unknown(s)
    }
}
