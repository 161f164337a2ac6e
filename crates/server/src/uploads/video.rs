use std::path::Path as FsPath;

use axum::Json;
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use tubely_core::error::ApiError;
use tubely_core::types::Video;
use tubely_storage::keys;

use super::{multipart_error, multipart_rejection, parse_media_type, persist};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::routes::load_owned_video;
use crate::state::AppState;

const FIELD: &str = "video";
const ALLOWED_TYPE: &str = "video/mp4";

/// `POST /api/video_upload/{video_id}` with multipart field `video`.
///
/// The part is spooled to a temp file, probed for its aspect ratio, remuxed
/// for fast start and stored under `<aspect>/<random>.mp4`. Both local files
/// are removed when the request finishes, whatever the outcome.
pub async fn upload_video(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Video>, AppError> {
    let mut video = load_owned_video(&state, &auth, &video_id).await?;
    info!(video_id = %video.id, user_id = %auth.user_id, "uploading video");

    let limit = state.limits.video_bytes;
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
        if media_type != ALLOWED_TYPE {
            return Err(
                ApiError::BadRequest(format!("unsupported video type: {media_type}")).into(),
            );
        }

        let source = spool_to_temp(field, &state.temp_dir, limit).await?;
        upload = Some((media_type, source));
        break;
    }

    let (media_type, source) =
        upload.ok_or_else(|| ApiError::BadRequest(format!("missing form field '{FIELD}'")))?;

    let dims = state
        .prober
        .probe(&source)
        .await
        .map_err(|e| ApiError::Internal(format!("couldn't read video dimensions: {e}")))?;
    let aspect = tubely_media::classify(dims.width, dims.height)
        .map_err(|e| ApiError::Internal(format!("couldn't classify aspect ratio: {e}")))?;
    debug!(width = dims.width, height = dims.height, aspect = %aspect, "probed upload");

    let processed = state
        .remuxer
        .fast_start(&source)
        .await
        .map_err(|e| ApiError::Internal(format!("couldn't process video: {e}")))?;
    let processed = TempPath::try_from_path(processed)
        .map_err(|e| ApiError::Internal(format!("couldn't track processed file: {e}")))?;

    let key = keys::video_key(aspect, &media_type);
    state
        .store
        .put_file(&key, &processed, ALLOWED_TYPE)
        .await
        .map_err(|e| ApiError::Internal(format!("couldn't store video: {e}")))?;

    video.video_url = Some(state.store.public_url(&key));
    persist(&state, &mut video).await?;

    info!(video_id = %video.id, key = %key, aspect = %aspect, "video stored");
    Ok(Json(video))
}

/// Stream a multipart part into a fresh temp file under `dir`. The file is
/// removed if the body cap trips partway through.
async fn spool_to_temp(
    mut field: Field<'_>,
    dir: &FsPath,
    limit: usize,
) -> Result<TempPath, ApiError> {
    let temp = tempfile::Builder::new()
        .prefix("tubely-upload")
        .suffix(".mp4")
        .tempfile_in(dir)
        .map_err(|e| ApiError::Internal(format!("couldn't create temp file: {e}")))?;
    let (file, path) = temp.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut written = 0usize;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| ApiError::Internal(format!("couldn't write temp file: {e}")))?;
        written += chunk.len();
    }
    file.flush()
        .await
        .map_err(|e| ApiError::Internal(format!("couldn't write temp file: {e}")))?;

    if written == 0 {
        return Err(ApiError::BadRequest("video is empty".into()));
    }
    Ok(path)
}
