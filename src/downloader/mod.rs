// Download orchestration - platform classification, strategy building,
// execution with fallback, and failure diagnostics

pub mod diagnostics;
pub mod errors;
pub mod executor;
pub mod models;
pub mod platform;
pub mod strategy;
pub mod tool;
pub mod utils;

pub use diagnostics::{diagnose_error, suggestions_for, FailureReason};
pub use errors::DownloadError;
pub use executor::{DownloadExecutor, FailedDownload};
pub use models::{CompletedDownload, DownloadRequest, MediaKind, NetworkConfig, Quality};
pub use platform::Platform;
pub use strategy::{build_strategies, Strategy};
pub use tool::{ExtractionTool, YtDlp};
