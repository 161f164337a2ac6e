use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use sqlx::SqlitePool;

/// User row from the database.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_ts: i64,
}

/// Create a new user. Returns the stored row.
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<UserRow, crate::DbError> {
    let id = uuid::Uuid::new_v4().to_string();
    let hash = hash_password(password)?;
    let now = chrono::Utc::now().timestamp();

    sqlx::query("INSERT INTO user (id, email, password_hash, created_ts) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(email)
        .bind(&hash)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if duplicate {
                crate::DbError::DuplicateEmail(email.to_string())
            } else {
                crate::DbError::Sqlx(e)
            }
        })?;

    Ok(UserRow {
        id,
        email: email.to_string(),
        password_hash: hash,
        created_ts: now,
    })
}

/// Find user by email.
pub async fn find_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    let row: Option<(String, String, String, i64)> = sqlx::query_as(
        "SELECT id, email, password_hash, created_ts FROM user WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, email, password_hash, created_ts)| UserRow {
        id,
        email,
        password_hash,
        created_ts,
    }))
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, crate::DbError> {
    let parsed = PasswordHash::new(hash).map_err(|e| crate::DbError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn hash_password(password: &str) -> Result<String, crate::DbError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| crate::DbError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}
