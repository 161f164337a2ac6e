//! Multipart upload handlers for video records.

pub mod thumbnail;
pub mod video;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use tubely_core::error::ApiError;
use tubely_core::types::Video;
use tubely_db::repo::videos;

use crate::error::AppError;
use crate::state::AppState;

/// Request body cap for thumbnail uploads.
pub const THUMBNAIL_MAX_BYTES: usize = 10 << 20;

/// Request body cap for video uploads.
pub const VIDEO_MAX_BYTES: usize = 1 << 30;

/// Per-route request body caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub thumbnail_bytes: usize,
    pub video_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            thumbnail_bytes: THUMBNAIL_MAX_BYTES,
            video_bytes: VIDEO_MAX_BYTES,
        }
    }
}

/// Media type of a multipart part without parameters, lowercased.
pub(crate) fn parse_media_type(raw: Option<&str>) -> Result<String, ApiError> {
    let essence = raw
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match essence.split_once('/') {
        Some((top, sub)) if !top.is_empty() && !sub.is_empty() && !sub.contains('/') => {
            Ok(essence)
        }
        _ => Err(ApiError::BadRequest("invalid Content-Type".into())),
    }
}

pub(crate) fn multipart_error(e: MultipartError, limit: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::BadRequest(format!("upload exceeds the {limit} byte limit"))
    } else {
        ApiError::BadRequest(format!("malformed multipart body: {}", e.body_text()))
    }
}

pub(crate) fn multipart_rejection(e: MultipartRejection) -> ApiError {
    ApiError::BadRequest(format!("expected a multipart form: {}", e.body_text()))
}

/// Write the record back after a successful upload. The stored object is
/// left in place if this fails.
pub(crate) async fn persist(state: &AppState, video: &mut Video) -> Result<(), AppError> {
    let updated = videos::update_video(&state.db, video)
        .await
        .map_err(|e| ApiError::Internal(format!("couldn't update video: {e}")))?;
    if !updated {
        return Err(ApiError::NotFound("video not found".into()).into());
    }
    Ok(())
}
