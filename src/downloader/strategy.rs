// Strategy builder - turns a request into an ordered list of tool invocations
//
// Each strategy is one complete yt-dlp argument vector. The executor walks
// the list in order and stops at the first attempt that produces the output
// file. The last entry is always the `-f b` last resort the original
// service relied on for stubborn URLs.

use std::path::Path;

use super::models::{DownloadRequest, MediaKind, NetworkConfig};
use super::platform::Platform;

/// One concrete invocation of the extraction tool
#[derive(Debug, Clone)]
pub struct Strategy {
    /// Short label for logs ("format-selection", "best-single", ...)
    pub label: &'static str,
    pub args: Vec<String>,
}

impl Strategy {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            args: Vec::new(),
        }
    }

    fn arg(mut self, a: impl Into<String>) -> Self {
        self.args.push(a.into());
        self
    }

    fn args<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(items.into_iter().map(Into::into));
        self
    }

    /// Finish the vector with shared network flags, the output path and the URL
    fn finish(mut self, req: &DownloadRequest, output: &Path, net: &NetworkConfig) -> Self {
        if let Some(cookies) = &net.cookies_file {
            self.args.push("--cookies".to_string());
            self.args.push(cookies.to_string_lossy().into_owned());
        }
        if let Some(proxy) = &net.proxy {
            self.args.push("--proxy".to_string());
            self.args.push(proxy.clone());
        }
        if let Some(secs) = net.socket_timeout {
            self.args.push("--socket-timeout".to_string());
            self.args.push(secs.to_string());
        }
        self.args.push("-o".to_string());
        self.args.push(output.to_string_lossy().into_owned());
        self.args.push(req.url.to_string());
        self
    }
}

/// Build the ordered attempt list for a request.
///
/// The list is never empty and always ends with a last-resort attempt.
pub fn build_strategies(
    req: &DownloadRequest,
    output: &Path,
    net: &NetworkConfig,
) -> Vec<Strategy> {
    match req.kind {
        MediaKind::Audio => audio_strategies(req, output, net),
        MediaKind::Video => video_strategies(req, output, net),
    }
}

fn audio_strategies(req: &DownloadRequest, output: &Path, net: &NetworkConfig) -> Vec<Strategy> {
    let extract = ["-x", "--audio-format", "mp3", "--audio-quality", "0"];

    vec![
        Strategy::new("audio-extract")
            .args(extract)
            .arg("--no-playlist")
            .finish(req, output, net),
        // Pin the source format to best-audio when the default selection
        // trips over format-less entries
        Strategy::new("audio-best-source")
            .args(["-f", "ba"])
            .args(extract)
            .arg("--no-playlist")
            .finish(req, output, net),
    ]
}

fn video_strategies(req: &DownloadRequest, output: &Path, net: &NetworkConfig) -> Vec<Strategy> {
    let mut list = Vec::new();

    match req.platform {
        Platform::Youtube => {
            let spec = req.quality.format_spec();
            list.push(
                Strategy::new("format-selection")
                    .args(["-f", spec.as_str()])
                    .args(["--merge-output-format", "mp4"])
                    .arg("--no-playlist")
                    .arg("--no-warnings")
                    .finish(req, output, net),
            );
            // The android player client sees formats the web client gets
            // blocked from
            list.push(
                Strategy::new("android-client")
                    .args(["-f", spec.as_str()])
                    .args(["--extractor-args", "youtube:player_client=android"])
                    .args(["--merge-output-format", "mp4"])
                    .arg("--no-playlist")
                    .finish(req, output, net),
            );
        }
        Platform::Pinterest => {
            list.push(
                Strategy::new("merged-mp4")
                    .args(["--merge-output-format", "mp4"])
                    .arg("--no-warnings")
                    .finish(req, output, net),
            );
        }
        _ => {
            list.push(
                Strategy::new("merged-mp4")
                    .args(["--merge-output-format", "mp4"])
                    .arg("--no-playlist")
                    .arg("--no-warnings")
                    .finish(req, output, net),
            );
        }
    }

    // Last resort: single best pre-merged format
    list.push(
        Strategy::new("best-single")
            .args(["-f", "b"])
            .args(["--merge-output-format", "mp4"])
            .arg("--no-playlist")
            .finish(req, output, net),
    );

    list
}
