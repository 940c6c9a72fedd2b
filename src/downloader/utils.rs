// Helper functions shared across the download pipeline

use std::process::{Output, Stdio};

use lazy_static::lazy_static;
use regex::Regex;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::errors::DownloadError;

/// Run a command to completion with a wall-clock timeout.
///
/// On timeout the child is killed (kill_on_drop) and `AttemptTimeout` is
/// returned. Spawn failures come back as `ExecutionError`.
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    timeout_secs: u64,
) -> Result<Output, DownloadError> {
    let future = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    match timeout(Duration::from_secs(timeout_secs), future).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(DownloadError::ExecutionError(format!(
            "failed to run {}: {}",
            program, e
        ))),
        Err(_) => Err(DownloadError::AttemptTimeout(timeout_secs)),
    }
}

/// Replace anything outside word characters, dash and dot with underscores.
///
/// Same rule the original service applied before joining the name into a
/// filesystem path.
pub fn sanitize_filename(name: &str) -> String {
    lazy_static! {
        static ref UNSAFE_RE: Regex = Regex::new(r"[^\w\-.]").unwrap();
    }
    UNSAFE_RE.replace_all(name, "_").into_owned()
}

/// Short random id for default filenames (8 hex chars, like the original's
/// truncated uuid)
pub fn short_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}
