use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tubely_core::types::Video;

type VideoTuple = (
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    i64,
    i64,
);

const SELECT_COLUMNS: &str = "SELECT id, user_id, title, description, thumbnail_url, video_url, \
                              created_ts, updated_ts FROM video";

/// Insert a new video record with no media attached yet.
pub async fn create_video(
    pool: &SqlitePool,
    user_id: &str,
    title: &str,
    description: &str,
) -> Result<Video, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO video (id, user_id, title, description, created_ts, updated_ts) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(title)
    .bind(description)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(row_to_video((
        id,
        user_id.to_string(),
        title.to_string(),
        description.to_string(),
        None,
        None,
        now,
        now,
    )))
}

pub async fn get_video(pool: &SqlitePool, video_id: &str) -> Result<Option<Video>, sqlx::Error> {
    let row: Option<VideoTuple> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(video_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(row_to_video))
}

/// Videos owned by a user, newest first.
pub async fn list_videos_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<Video>, sqlx::Error> {
    let rows: Vec<VideoTuple> = sqlx::query_as(&format!(
        "{SELECT_COLUMNS} WHERE user_id = ? ORDER BY created_ts DESC, id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_video).collect())
}

/// Persist the mutable fields of a video and bump `updated_at`.
/// Returns false when the row no longer exists.
pub async fn update_video(pool: &SqlitePool, video: &mut Video) -> Result<bool, sqlx::Error> {
    let now = Utc::now();
    let result = sqlx::query(
        "UPDATE video SET title = ?, description = ?, thumbnail_url = ?, video_url = ?, \
         updated_ts = ? WHERE id = ?",
    )
    .bind(&video.title)
    .bind(&video.description)
    .bind(&video.thumbnail_url)
    .bind(&video.video_url)
    .bind(now.timestamp())
    .bind(&video.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }
    video.updated_at = from_ts(now.timestamp());
    Ok(true)
}

pub async fn delete_video(pool: &SqlitePool, video_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM video WHERE id = ?")
        .bind(video_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

fn row_to_video(r: VideoTuple) -> Video {
    Video {
        id: r.0,
        user_id: r.1,
        title: r.2,
        description: r.3,
        thumbnail_url: r.4,
        video_url: r.5,
        created_at: from_ts(r.6),
        updated_at: from_ts(r.7),
    }
}

fn from_ts(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}
