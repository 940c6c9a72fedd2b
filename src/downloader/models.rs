// Common data models for the download pipeline

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::platform::Platform;

/// What the caller wants out of the URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// File extension of the produced output
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Audio => "mp3",
            Self::Video => "mp4",
        }
    }
}

/// Video quality tier. Audio requests ignore this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    #[default]
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "360p")]
    P360,
}

impl Quality {
    /// Height cap in pixels, if any
    pub fn max_height(&self) -> Option<u32> {
        match self {
            Self::Best => None,
            Self::P1080 => Some(1080),
            Self::P720 => Some(720),
            Self::P480 => Some(480),
            Self::P360 => Some(360),
        }
    }

    /// yt-dlp format selection string for this tier
    pub fn format_spec(&self) -> String {
        match self.max_height() {
            None => "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string(),
            Some(h) => format!(
                "bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/best[height<={h}][ext=mp4]/best"
            ),
        }
    }
}

/// A single validated download request
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: Url,
    pub platform: Platform,
    pub kind: MediaKind,
    pub quality: Quality,
    /// Caller-supplied filename stem, already sanitized
    pub filename: Option<String>,
}

/// A finished download held in the in-memory registry
#[derive(Debug, Clone, Serialize)]
pub struct CompletedDownload {
    pub id: Uuid,
    pub url: String,
    pub platform: Platform,
    pub kind: MediaKind,
    pub path: PathBuf,
    pub filename: String,
    pub completed_at: DateTime<Utc>,
}

/// Network knobs passed through to the tool on every attempt
#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    /// Proxy URL (e.g. "socks5://127.0.0.1:1080")
    pub proxy: Option<String>,

    /// Cookies file handed to the tool with --cookies
    pub cookies_file: Option<PathBuf>,

    /// Socket timeout in seconds for the tool's own connections
    pub socket_timeout: Option<u32>,
}
