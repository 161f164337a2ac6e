use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tubely_server::config::{Config, StoreConfig};
use tubely_storage::{AssetStore, LocalStore, S3Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment still applies
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    info!(db_path = %config.db_path, "connecting to database");

    let pool = tubely_db::connect(&config.db_path)
        .await
        .context("failed to connect to database")?;

    tubely_db::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("migrations complete");

    std::fs::create_dir_all(&config.temp_dir).context("failed to create temp dir")?;

    let (store, assets_root) = match config.store.clone() {
        StoreConfig::Local { root, public_base } => {
            std::fs::create_dir_all(&root).context("failed to create assets root")?;
            info!(root = %root.display(), "using local asset store");
            let store: Arc<dyn AssetStore> = Arc::new(LocalStore::new(root.clone(), public_base));
            (store, Some(root))
        }
        StoreConfig::S3(s3) => {
            let store: Arc<dyn AssetStore> = Arc::new(S3Store::new(s3).await);
            (store, None)
        }
    };

    let app_state = tubely_server::state::AppState {
        db: pool,
        jwt_secret: config.jwt_secret.clone(),
        store,
        prober: Arc::new(tubely_media::FfprobeProber::new(
            config.media.ffprobe_path.clone(),
        )),
        remuxer: Arc::new(tubely_media::FfmpegRemuxer::new(
            config.media.ffmpeg_path.clone(),
        )),
        temp_dir: config.temp_dir.clone(),
        limits: tubely_server::uploads::UploadLimits::default(),
        assets_root,
    };

    let app = tubely_server::routes::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("failed to bind")?;
    info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
