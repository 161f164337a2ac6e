pub mod keys;
pub mod local;
pub mod s3;

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;

pub use local::LocalStore;
pub use s3::{S3Config, S3Store};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("upload of {key} failed: {message}")]
    Upload { key: String, message: String },
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for uploaded assets.
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    /// Store an in-memory body under `key`.
    async fn put_bytes(&self, key: &str, body: Bytes, content_type: &str)
    -> Result<(), StorageError>;

    /// Stream a local file as the body stored under `key`.
    async fn put_file(&self, key: &str, path: &Path, content_type: &str)
    -> Result<(), StorageError>;

    /// URL under which an object stored at `key` is served.
    fn public_url(&self, key: &str) -> String;
}
