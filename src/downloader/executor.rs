// Download executor - walks the strategy list until one attempt produces
// the output file
//
// Success means the tool exited zero AND the file exists on disk. yt-dlp
// sometimes exits zero after downloading nothing (e.g. a playlist URL with
// --no-playlist), so the file check is not optional.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use super::diagnostics::{diagnose_error, suggestions_for, FailureReason};
use super::errors::DownloadError;
use super::models::{DownloadRequest, MediaKind, NetworkConfig};
use super::platform;
use super::strategy::build_strategies;
use super::tool::ExtractionTool;
use super::utils::{sanitize_filename, short_id};

/// Failure with everything the caller needs to explain it
#[derive(Debug)]
pub struct FailedDownload {
    pub error: DownloadError,
    pub reason: FailureReason,
    pub suggestions: Vec<String>,
}

impl FailedDownload {
    fn new(error: DownloadError, reason: FailureReason, req: &DownloadRequest) -> Self {
        Self {
            error,
            reason,
            suggestions: suggestions_for(reason, req.platform),
        }
    }
}

pub struct DownloadExecutor {
    tool: Arc<dyn ExtractionTool>,
    download_dir: PathBuf,
    network: NetworkConfig,
    attempt_timeout_secs: u64,
}

impl DownloadExecutor {
    pub fn new(
        tool: Arc<dyn ExtractionTool>,
        download_dir: PathBuf,
        network: NetworkConfig,
        attempt_timeout_secs: u64,
    ) -> Self {
        Self {
            tool,
            download_dir,
            network,
            attempt_timeout_secs,
        }
    }

    pub fn tool(&self) -> &Arc<dyn ExtractionTool> {
        &self.tool
    }

    /// Run the request to completion, returning the path of the downloaded
    /// file.
    pub async fn download(&self, req: &DownloadRequest) -> Result<PathBuf, FailedDownload> {
        if !self.tool.is_available().await {
            let err = DownloadError::ToolNotFound(format!(
                "{} binary not found or not runnable",
                self.tool.name()
            ));
            return Err(FailedDownload {
                error: err,
                reason: FailureReason::Unknown,
                suggestions: vec![format!(
                    "Install {} and make sure it is on the server's PATH",
                    self.tool.name()
                )],
            });
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.download_dir).await {
            let err = DownloadError::ExecutionError(format!(
                "cannot create download directory {}: {}",
                self.download_dir.display(),
                e
            ));
            return Err(FailedDownload::new(err, FailureReason::Unknown, req));
        }

        let output_path = self.output_path(req);
        let strategies = build_strategies(req, &output_path, &self.network);
        let total = strategies.len();
        let mut last_error = DownloadError::Unknown("no strategies attempted".to_string());
        let mut last_stderr: Option<String> = None;

        for (i, strategy) in strategies.iter().enumerate() {
            info!(
                tool = self.tool.name(),
                strategy = strategy.label,
                attempt = i + 1,
                total,
                url = %req.url,
                "running download attempt"
            );

            match self.tool.run(&strategy.args, self.attempt_timeout_secs).await {
                Ok(output) if output.status.success() => {
                    if output_path.exists() {
                        info!(
                            strategy = strategy.label,
                            path = %output_path.display(),
                            "download succeeded"
                        );
                        return Ok(output_path);
                    }
                    warn!(
                        strategy = strategy.label,
                        "tool exited zero but produced no file"
                    );
                    last_error =
                        DownloadError::MissingOutput(output_path.display().to_string());
                    last_stderr = None;
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    warn!(strategy = strategy.label, stderr = %stderr, "attempt failed");
                    last_error = DownloadError::from(stderr.clone());
                    last_stderr = Some(stderr);
                }
                Err(e) => {
                    warn!(strategy = strategy.label, error = %e, "attempt errored");
                    last_error = e;
                    last_stderr = None;
                }
            }
        }

        let reason = match (&last_error, &last_stderr) {
            (DownloadError::AttemptTimeout(_) | DownloadError::NetworkTimeout, _) => {
                FailureReason::NetworkTimeout
            }
            (_, Some(stderr)) => diagnose_error(stderr),
            _ => FailureReason::Unknown,
        };

        Err(FailedDownload::new(last_error, reason, req))
    }

    /// Output path: caller-supplied stem if present, otherwise a platform
    /// prefix plus the media id (or a short random id).
    ///
    /// The whole stem is sanitized here, not just at the API boundary: the
    /// media id comes percent-decoded out of the URL, so it is as
    /// user-controlled as the filename field and must never carry path
    /// separators into the join.
    fn output_path(&self, req: &DownloadRequest) -> PathBuf {
        let stem = match &req.filename {
            Some(name) => name.clone(),
            None => {
                let prefix = match req.kind {
                    MediaKind::Audio => "audio",
                    MediaKind::Video => req.platform.as_str(),
                };
                let id = platform::media_id(req.platform, &req.url).unwrap_or_else(short_id);
                format!("{}_{}", prefix, id)
            }
        };
        self.download_dir
            .join(format!("{}.{}", sanitize_filename(&stem), req.kind.extension()))
    }
}

#[cfg(test)]
mod tests {
    use std::process::Output;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use url::Url;

    use super::*;
    use crate::downloader::models::Quality;
    use crate::downloader::platform::Platform;

    /// Scripted outcome for one fake attempt
    enum Attempt {
        /// Exit zero and write the output file
        Succeed,
        /// Exit zero without writing anything
        ExitZeroNoFile,
        /// Exit nonzero with this stderr
        Fail(&'static str),
        /// Simulate a killed attempt
        Timeout,
    }

    struct FakeTool {
        script: Mutex<Vec<Attempt>>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl FakeTool {
        fn new(script: Vec<Attempt>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    fn exit(code: i32) -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    fn output_arg(args: &[String]) -> PathBuf {
        let idx = args.iter().position(|a| a == "-o").unwrap();
        PathBuf::from(&args[idx + 1])
    }

    #[async_trait]
    impl ExtractionTool for FakeTool {
        fn name(&self) -> &'static str {
            "fake-tool"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn version(&self) -> Option<String> {
            Some("test".to_string())
        }

        async fn run(&self, args: &[String], _timeout: u64) -> Result<Output, DownloadError> {
            self.calls.lock().unwrap().push(args.to_vec());
            let attempt = self.script.lock().unwrap().remove(0);
            match attempt {
                Attempt::Succeed => {
                    // yt-dlp creates missing parent directories itself
                    let path = output_arg(args);
                    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                    std::fs::write(path, b"media").unwrap();
                    Ok(Output {
                        status: exit(0),
                        stdout: Vec::new(),
                        stderr: Vec::new(),
                    })
                }
                Attempt::ExitZeroNoFile => Ok(Output {
                    status: exit(0),
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                }),
                Attempt::Fail(stderr) => Ok(Output {
                    status: exit(1),
                    stdout: Vec::new(),
                    stderr: stderr.as_bytes().to_vec(),
                }),
                Attempt::Timeout => Err(DownloadError::AttemptTimeout(1)),
            }
        }
    }

    fn request(url: &str) -> DownloadRequest {
        let url = Url::parse(url).unwrap();
        DownloadRequest {
            platform: Platform::classify(&url),
            url,
            kind: MediaKind::Video,
            quality: Quality::Best,
            filename: None,
        }
    }

    fn executor(tool: Arc<FakeTool>) -> DownloadExecutor {
        let dir = std::env::temp_dir().join(format!("mediafetch-test-{}", short_id()));
        DownloadExecutor::new(tool, dir, NetworkConfig::default(), 30)
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let tool = Arc::new(FakeTool::new(vec![Attempt::Succeed]));
        let exec = executor(tool.clone());
        let req = request("https://www.youtube.com/watch?v=abc");

        let path = exec.download(&req).await.unwrap();
        assert!(path.exists());
        assert_eq!(tool.call_count(), 1);
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_falls_through_to_next_strategy() {
        let tool = Arc::new(FakeTool::new(vec![
            Attempt::Fail("ERROR: Requested format is not available"),
            Attempt::Succeed,
        ]));
        let exec = executor(tool.clone());
        let req = request("https://www.youtube.com/watch?v=abc");

        let path = exec.download(&req).await.unwrap();
        assert!(path.exists());
        assert_eq!(tool.call_count(), 2);
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_exit_zero_without_file_is_not_success() {
        // Youtube video builds 3 strategies
        let tool = Arc::new(FakeTool::new(vec![
            Attempt::ExitZeroNoFile,
            Attempt::ExitZeroNoFile,
            Attempt::ExitZeroNoFile,
        ]));
        let exec = executor(tool.clone());
        let req = request("https://www.youtube.com/watch?v=abc");

        let failure = exec.download(&req).await.unwrap_err();
        assert_eq!(tool.call_count(), 3);
        assert!(matches!(failure.error, DownloadError::MissingOutput(_)));
    }

    #[tokio::test]
    async fn test_exhaustion_reports_diagnosed_reason() {
        let tool = Arc::new(FakeTool::new(vec![
            Attempt::Fail("ERROR: Sign in to confirm you're not a bot"),
            Attempt::Fail("ERROR: Sign in to confirm you're not a bot"),
            Attempt::Fail("ERROR: Sign in to confirm you're not a bot"),
        ]));
        let exec = executor(tool);
        let req = request("https://www.youtube.com/watch?v=abc");

        let failure = exec.download(&req).await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::BotDetection);
        assert!(!failure.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_maps_to_network_reason() {
        let tool = Arc::new(FakeTool::new(vec![
            Attempt::Timeout,
            Attempt::Timeout,
            Attempt::Timeout,
        ]));
        let exec = executor(tool);
        let req = request("https://www.youtube.com/watch?v=abc");

        let failure = exec.download(&req).await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::NetworkTimeout);
    }

    #[tokio::test]
    async fn test_default_filename_uses_media_id() {
        let tool = Arc::new(FakeTool::new(vec![Attempt::Succeed]));
        let exec = executor(tool);
        let req = request("https://www.youtube.com/watch?v=dQw4w9WgXcQ");

        let path = exec.download(&req).await.unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "youtube_dQw4w9WgXcQ.mp4"
        );
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_media_id_cannot_escape_download_dir() {
        // A percent-encoded video id decodes to "../../escaped"; the stem
        // must be flattened so the file stays inside the download dir
        let tool = Arc::new(FakeTool::new(vec![Attempt::Succeed]));
        let dir = std::env::temp_dir().join(format!("mediafetch-test-{}", short_id()));
        let exec = DownloadExecutor::new(tool, dir.clone(), NetworkConfig::default(), 30);
        let req = request("https://www.youtube.com/watch?v=..%2F..%2Fescaped");

        let path = exec.download(&req).await.unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "youtube_.._.._escaped.mp4"
        );
        assert_eq!(
            path.canonicalize().unwrap().parent().unwrap(),
            dir.canonicalize().unwrap()
        );
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_stderr_classified_into_error_variant() {
        let tool = Arc::new(FakeTool::new(vec![
            Attempt::Fail("ERROR: Connection timed out"),
            Attempt::Fail("ERROR: Connection timed out"),
            Attempt::Fail("ERROR: Connection timed out"),
        ]));
        let exec = executor(tool);
        let req = request("https://www.youtube.com/watch?v=abc");

        let failure = exec.download(&req).await.unwrap_err();
        assert!(matches!(failure.error, DownloadError::NetworkTimeout));
        assert_eq!(failure.reason, FailureReason::NetworkTimeout);
    }
}
