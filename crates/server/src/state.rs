use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;
use tubely_media::{Prober, Remuxer};
use tubely_storage::AssetStore;

use crate::uploads::UploadLimits;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt_secret: String,
    pub store: Arc<dyn AssetStore>,
    pub prober: Arc<dyn Prober>,
    pub remuxer: Arc<dyn Remuxer>,
    /// Directory for per-request upload temp files.
    pub temp_dir: PathBuf,
    pub limits: UploadLimits,
    /// Served at `/assets` when the local store is in use.
    pub assets_root: Option<PathBuf>,
}
