// Request handlers for the download API

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use tracing::info;
use url::Url;
use uuid::Uuid;

use super::AppState;
use crate::downloader::{
    diagnostics::FailureReason, utils::sanitize_filename, CompletedDownload, DownloadError,
    DownloadRequest, ExtractionTool, MediaKind, Platform, Quality,
};

#[derive(Debug, Deserialize)]
pub struct DownloadBody {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: MediaKind,
    #[serde(default)]
    pub quality: Quality,
}

// The original API treated a missing type as an audio request
fn default_kind() -> MediaKind {
    MediaKind::Audio
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub id: Uuid,
    pub file: String,
    pub platform: Platform,
}

/// Error response with a stable JSON shape
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                success: false,
                error: message.into(),
                reason: None,
                suggestions: Vec::new(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorBody {
                success: false,
                error: message.into(),
                reason: None,
                suggestions: Vec::new(),
            },
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                success: false,
                error: message.into(),
                reason: None,
                suggestions: Vec::new(),
            },
        }
    }

    /// Map a failed download to a status code and a diagnostic body
    pub fn from_failure(failure: crate::downloader::FailedDownload) -> Self {
        let status = match &failure.error {
            DownloadError::ToolNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DownloadError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            _ => match failure.reason {
                FailureReason::UnsupportedUrl => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::BAD_GATEWAY,
            },
        };
        Self {
            status,
            body: ErrorBody {
                success: false,
                error: failure.error.to_string(),
                reason: Some(failure.reason),
                suggestions: failure.suggestions,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// POST /api/download
pub async fn download(
    State(state): State<AppState>,
    Json(body): Json<DownloadBody>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let url = Url::parse(body.url.trim())
        .map_err(|e| ApiError::bad_request(format!("invalid url: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::bad_request("only http(s) URLs are supported"));
    }

    let platform = Platform::classify(&url);
    let filename = body
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(sanitize_filename);

    let request = DownloadRequest {
        url,
        platform,
        kind: body.kind,
        quality: body.quality,
        filename,
    };

    info!(url = %request.url, platform = %platform, kind = ?request.kind, "download requested");

    let path = state
        .executor
        .download(&request)
        .await
        .map_err(ApiError::from_failure)?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("download.{}", request.kind.extension()));

    let completed = CompletedDownload {
        id: Uuid::new_v4(),
        url: request.url.to_string(),
        platform,
        kind: request.kind,
        path,
        filename: filename.clone(),
        completed_at: Utc::now(),
    };

    let id = completed.id;
    state.downloads.lock().await.insert(id, completed);

    Ok(Json(DownloadResponse {
        success: true,
        id,
        file: filename,
        platform,
    }))
}

/// GET /api/downloads/{id}
pub async fn download_info(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompletedDownload>, ApiError> {
    state
        .downloads
        .lock()
        .await
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no download with id {}", id)))
}

/// GET /api/downloads/{id}/file
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let entry = state
        .downloads
        .lock()
        .await
        .get(&id)
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("no download with id {}", id)))?;

    let file = tokio::fs::File::open(&entry.path)
        .await
        .map_err(|e| ApiError::internal(format!("cannot open {}: {}", entry.path.display(), e)))?;

    let content_type = mime_guess::from_path(&entry.path)
        .first_or_octet_stream()
        .to_string();

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .map_err(|_| ApiError::internal("invalid content type"))?,
    );
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", entry.filename))
            .map_err(|_| ApiError::internal("invalid filename for header"))?,
    );

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((headers, body).into_response())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub tool: ToolStatus,
}

#[derive(Debug, Serialize)]
pub struct ToolStatus {
    pub name: &'static str,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let tool = state.executor.tool();
    Json(HealthResponse {
        status: "ok",
        tool: ToolStatus {
            name: tool.name(),
            available: tool.is_available().await,
            version: tool.version().await,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_defaults() {
        let body: DownloadBody =
            serde_json::from_str(r#"{"url": "https://youtu.be/abc"}"#).unwrap();
        assert_eq!(body.kind, MediaKind::Audio);
        assert_eq!(body.quality, Quality::Best);
        assert!(body.filename.is_none());
    }

    #[test]
    fn test_body_full() {
        let body: DownloadBody = serde_json::from_str(
            r#"{"url": "https://youtu.be/abc", "type": "video", "quality": "720p", "filename": "clip"}"#,
        )
        .unwrap();
        assert_eq!(body.kind, MediaKind::Video);
        assert_eq!(body.quality, Quality::P720);
        assert_eq!(body.filename.as_deref(), Some("clip"));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = serde_json::from_str::<DownloadBody>(
            r#"{"url": "https://youtu.be/abc", "type": "hologram"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_error_body_shape() {
        let err = ApiError::bad_request("nope");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let json = serde_json::to_value(&err.body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "nope");
        // reason and suggestions are omitted when empty
        assert!(json.get("reason").is_none());
        assert!(json.get("suggestions").is_none());
    }

    #[test]
    fn test_failure_reason_serializes_snake_case() {
        let json = serde_json::to_string(&FailureReason::RateLimited).unwrap();
        assert_eq!(json, "\"rate_limited\"");
    }
}
