use sqlx::SqlitePool;
use tracing::{debug, info};

/// Schema steps in apply order. Names are recorded once applied, so an
/// entry must never be edited or reordered after release.
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial_schema",
    include_str!("../migrations/001_initial_schema.sql"),
)];

/// Bring the schema up to date. Each step runs in its own transaction
/// together with its `_migrations` bookkeeping row.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_ts INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: Option<(String,)> =
            sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                .bind(name)
                .fetch_optional(pool)
                .await?;

        if applied.is_some() {
            debug!(migration = name, "already applied");
            continue;
        }

        apply(pool, name, sql).await?;
        info!(migration = name, "migration applied");
    }

    Ok(())
}

async fn apply(pool: &SqlitePool, name: &str, sql: &str) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Schema files hold plain DDL, so `;` only ever ends a statement.
    for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        if let Err(e) = sqlx::query(statement).execute(&mut *tx).await {
            tx.rollback().await?;
            return Err(e);
        }
    }

    sqlx::query("INSERT INTO _migrations (name, applied_ts) VALUES (?, ?)")
        .bind(name)
        .bind(chrono::Utc::now().timestamp())
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_each_step_once() {
        let pool = crate::connect(":memory:").await.unwrap();
        run(&pool).await.unwrap();
        run(&pool).await.unwrap();

        let names: Vec<(String,)> = sqlx::query_as("SELECT name FROM _migrations")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(names, vec![("001_initial_schema".to_string(),)]);
    }

    #[tokio::test]
    async fn failed_step_is_not_recorded() {
        let pool = crate::connect(":memory:").await.unwrap();
        run(&pool).await.unwrap();

        let err = apply(&pool, "999_broken", "CREATE TABLE broken (id TEXT); NOT SQL").await;
        assert!(err.is_err());

        let broken: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE name = 'broken'")
                .fetch_optional(&pool)
                .await
                .unwrap();
        assert!(broken.is_none());
        let recorded: Option<(String,)> =
            sqlx::query_as("SELECT name FROM _migrations WHERE name = '999_broken'")
                .fetch_optional(&pool)
                .await
                .unwrap();
        assert!(recorded.is_none());
    }
}
