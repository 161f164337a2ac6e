use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tracing::info;

use crate::{AssetStore, StorageError};

/// Filesystem-backed store. Objects land under `root` and are served by the
/// HTTP layer at `<public_base>/assets/<key>`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    public_base: String,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    /// Resolve a key to its path under the root, refusing anything that
    /// would escape it.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(key);
        if key.is_empty() || !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(rel))
    }

    async fn prepare(&self, key: &str) -> Result<PathBuf, StorageError> {
        let dest = self.path_for(key)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(dest)
    }
}

#[async_trait::async_trait]
impl AssetStore for LocalStore {
    async fn put_bytes(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let dest = self.prepare(key).await?;
        tokio::fs::write(&dest, &body).await?;
        info!(key = %key, content_type = %content_type, size_bytes = body.len(), "asset stored locally");
        Ok(())
    }

    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let dest = self.prepare(key).await?;
        let size = tokio::fs::copy(path, &dest).await?;
        info!(key = %key, content_type = %content_type, size_bytes = size, "asset stored locally");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/assets/{}", self.public_base.trim_end_matches('/'), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_nested_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:8091/");

        store
            .put_bytes("landscape/abc.mp4", Bytes::from_static(b"moov"), "video/mp4")
            .await
            .unwrap();
        let written = std::fs::read(dir.path().join("landscape/abc.mp4")).unwrap();
        assert_eq!(written, b"moov");
        assert_eq!(
            store.public_url("landscape/abc.mp4"),
            "http://localhost:8091/assets/landscape/abc.mp4"
        );
    }

    #[tokio::test]
    async fn copies_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        std::fs::write(&src, b"payload").unwrap();
        let store = LocalStore::new(dir.path().join("assets"), "http://localhost");

        store.put_file("x.png", &src, "image/png").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("assets/x.png")).unwrap(), b"payload");
    }

    #[test]
    fn rejects_escaping_keys() {
        let store = LocalStore::new("/srv/assets", "http://localhost");
        assert!(store.path_for("../etc/passwd").is_err());
        assert!(store.path_for("/etc/passwd").is_err());
        assert!(store.path_for("").is_err());
        assert_eq!(
            store.path_for("portrait/a.mp4").unwrap(),
            PathBuf::from("/srv/assets/portrait/a.mp4")
        );
    }
}
