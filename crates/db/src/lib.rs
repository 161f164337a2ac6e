pub mod migrate;
pub mod repo;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

const IN_MEMORY: &str = ":memory:";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("couldn't prepare database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("password hash error: {0}")]
    Hash(String),
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
}

/// Open the users/videos database. `:memory:` gives a private in-process
/// database shared by every connection in the pool.
pub async fn connect(db_path: &str) -> Result<SqlitePool, DbError> {
    if db_path != IN_MEMORY {
        if let Some(dir) = Path::new(db_path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
    }

    let opts = SqliteConnectOptions::from_str(db_path)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data/nested/tubely.db");

        let pool = connect(db_path.to_str().unwrap()).await.unwrap();
        sqlx::query("SELECT 1").execute(&pool).await.unwrap();
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn enforces_foreign_keys() {
        let pool = connect(IN_MEMORY).await.unwrap();
        let (on,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(on, 1);
    }
}
