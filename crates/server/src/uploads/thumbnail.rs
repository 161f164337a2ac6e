use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use tracing::info;
use tubely_core::error::ApiError;
use tubely_core::types::Video;
use tubely_storage::keys;

use super::{multipart_error, multipart_rejection, parse_media_type, persist};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::routes::load_owned_video;
use crate::state::AppState;

const FIELD: &str = "thumbnail";
const ALLOWED_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// `POST /api/thumbnail_upload/{video_id}` with multipart field `thumbnail`.
pub async fn upload_thumbnail(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Video>, AppError> {
    let mut video = load_owned_video(&state, &auth, &video_id).await?;
    info!(video_id = %video.id, user_id = %auth.user_id, "uploading thumbnail");

    let limit = state.limits.thumbnail_bytes;
    let mut multipart = multipart.map_err(multipart_rejection)?;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FIELD) {
            continue;
        }

        let media_type = parse_media_type(field.content_type())?;
        if !ALLOWED_TYPES.contains(&media_type.as_str()) {
            return Err(
                ApiError::BadRequest(format!("unsupported thumbnail type: {media_type}")).into(),
            );
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limit))?;
        upload = Some((media_type, data));
        break;
    }

    let (media_type, data) =
        upload.ok_or_else(|| ApiError::BadRequest(format!("missing form field '{FIELD}'")))?;
    if data.is_empty() {
        return Err(ApiError::BadRequest("thumbnail is empty".into()).into());
    }

    let key = keys::asset_key(&media_type);
    state
        .store
        .put_bytes(&key, data, &media_type)
        .await
        .map_err(|e| ApiError::Internal(format!("couldn't store thumbnail: {e}")))?;

    video.thumbnail_url = Some(state.store.public_url(&key));
    persist(&state, &mut video).await?;

    info!(video_id = %video.id, key = %key, "thumbnail stored");
    Ok(Json(video))
}
