pub mod config;
pub mod downloader;
pub mod server;

pub use config::Config;
pub use downloader::{
    DownloadError, DownloadExecutor, DownloadRequest, FailureReason, MediaKind, Platform, Quality,
};
