use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tubely_core::error::ApiError;
use tubely_core::types::Video;
use tubely_db::DbError;
use tubely_db::repo::{users, videos};

use crate::auth::{AuthUser, issue_token};
use crate::error::AppError;
use crate::state::AppState;
use crate::uploads;

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .nest("/api", api_router(state.limits));

    if let Some(root) = state.assets_root.clone() {
        router = router.nest_service("/assets", ServeDir::new(root));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn api_router(limits: uploads::UploadLimits) -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/login", post(login))
        // Videos
        .route("/videos", post(create_video).get(list_videos))
        .route("/videos/{video_id}", get(get_video).delete(delete_video))
        // Uploads
        .route(
            "/thumbnail_upload/{video_id}",
            post(uploads::thumbnail::upload_thumbnail)
                .layer(DefaultBodyLimit::max(limits.thumbnail_bytes)),
        )
        .route(
            "/video_upload/{video_id}",
            post(uploads::video::upload_video)
                .layer(DefaultBodyLimit::max(limits.video_bytes)),
        )
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("database check failed: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Users & auth
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CredentialsRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct UserResponse {
    id: String,
    email: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let email = body.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(ApiError::BadRequest("a valid email is required".into()).into());
    }
    if body.password.is_empty() {
        return Err(ApiError::BadRequest("password must not be empty".into()).into());
    }

    let user = users::create_user(&state.db, &email, &body.password)
        .await
        .map_err(|e| match e {
            DbError::DuplicateEmail(_) => ApiError::Conflict("email already registered".into()),
            other => ApiError::Internal(format!("db error: {other}")),
        })?;

    info!(user_id = %user.id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            email: user.email,
            created_at: chrono::DateTime::from_timestamp(user.created_ts, 0).unwrap_or_default(),
        }),
    ))
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
    user_id: String,
    email: String,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = body.email.trim().to_lowercase();
    let user = users::find_by_email(&state.db, &email)
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("incorrect email or password".into()))?;

    let valid = users::verify_password(&body.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(format!("hash error: {e}")))?;

    if !valid {
        return Err(ApiError::Unauthorized("incorrect email or password".into()).into());
    }

    let token = issue_token(&user.id, &user.email, &state.jwt_secret)?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        email: user.email,
    }))
}

// ---------------------------------------------------------------------------
// Videos
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CreateVideoRequest {
    title: String,
    #[serde(default)]
    description: String,
}

async fn create_video(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateVideoRequest>,
) -> Result<(StatusCode, Json<Video>), AppError> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".into()).into());
    }

    let video = videos::create_video(&state.db, &auth.user_id, title, &body.description)
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    info!(video_id = %video.id, user_id = %auth.user_id, "video created");
    Ok((StatusCode::CREATED, Json(video)))
}

async fn list_videos(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Video>>, AppError> {
    let list = videos::list_videos_for_user(&state.db, &auth.user_id)
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;
    Ok(Json(list))
}

async fn get_video(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<Video>, AppError> {
    let video = load_owned_video(&state, &auth, &video_id).await?;
    Ok(Json(video))
}

async fn delete_video(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let video = load_owned_video(&state, &auth, &video_id).await?;
    videos::delete_video(&state.db, &video.id)
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    info!(video_id = %video.id, user_id = %auth.user_id, "video deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Parse a path id and fetch the record.
async fn lookup_video(state: &AppState, raw_id: &str) -> Result<Video, AppError> {
    let video_id = uuid::Uuid::parse_str(raw_id)
        .map_err(|_| ApiError::BadRequest(format!("invalid video id: {raw_id}")))?;

    let video = videos::get_video(&state.db, &video_id.to_string())
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?
        .ok_or_else(|| ApiError::NotFound("video not found".into()))?;

    Ok(video)
}

/// Fetch a record the caller is allowed to mutate. A foreign owner is an
/// authorization failure, reported before any request payload is read.
pub(crate) async fn load_owned_video(
    state: &AppState,
    auth: &AuthUser,
    raw_id: &str,
) -> Result<Video, AppError> {
    let video = lookup_video(state, raw_id).await?;
    if !video.is_owned_by(&auth.user_id) {
        return Err(ApiError::Unauthorized("not the owner of this video".into()).into());
    }
    Ok(video)
}
