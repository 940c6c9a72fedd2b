// Runtime configuration from environment variables
//
// MEDIAFETCH_BIND          listen address (default 127.0.0.1:8080)
// MEDIAFETCH_DOWNLOAD_DIR  where finished files land
// MEDIAFETCH_YTDLP         explicit path to the yt-dlp binary
// MEDIAFETCH_COOKIES       cookies file passed to every invocation
// MEDIAFETCH_PROXY         proxy URL passed to every invocation
// MEDIAFETCH_TIMEOUT_SECS  per-attempt wall-clock timeout

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::downloader::NetworkConfig;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 180;
const DEFAULT_SOCKET_TIMEOUT_SECS: u32 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub download_dir: PathBuf,
    pub ytdlp_path: Option<String>,
    pub network: NetworkConfig,
    pub attempt_timeout_secs: u64,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    ///
    /// Returns an error only for values that parse but are unusable
    /// (malformed bind address).
    pub fn from_env() -> Result<Self, String> {
        let bind = match std::env::var("MEDIAFETCH_BIND") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| format!("MEDIAFETCH_BIND {:?} is not a socket address: {}", raw, e))?,
            Err(_) => DEFAULT_BIND.parse().expect("default bind address"),
        };

        let download_dir = std::env::var("MEDIAFETCH_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_download_dir());

        let ytdlp_path = non_empty_env("MEDIAFETCH_YTDLP");

        let network = NetworkConfig {
            proxy: non_empty_env("MEDIAFETCH_PROXY"),
            cookies_file: non_empty_env("MEDIAFETCH_COOKIES").map(PathBuf::from),
            socket_timeout: Some(DEFAULT_SOCKET_TIMEOUT_SECS),
        };

        let attempt_timeout_secs = std::env::var("MEDIAFETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_ATTEMPT_TIMEOUT_SECS);

        Ok(Self {
            bind,
            download_dir,
            ytdlp_path,
            network,
            attempt_timeout_secs,
        })
    }
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mediafetch")
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
