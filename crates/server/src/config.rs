use std::path::PathBuf;

use tubely_media::MediaConfig;
use tubely_storage::S3Config;

/// Where uploaded assets are written.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Local {
        root: PathBuf,
        public_base: String,
    },
    S3(S3Config),
}

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub temp_dir: PathBuf,
    pub store: StoreConfig,
    pub media: MediaConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("TUBELY_BIND").unwrap_or_else(|| "0.0.0.0:8091".to_string());
        let public_base = get("TUBELY_PUBLIC_URL").unwrap_or_else(|| {
            let port = bind_addr.rsplit(':').next().unwrap_or("8091");
            format!("http://localhost:{port}")
        });

        let store = match get("S3_BUCKET") {
            Some(bucket) => StoreConfig::S3(S3Config {
                bucket,
                region: get("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                endpoint_url: get("S3_ENDPOINT"),
                distribution: get("S3_CF_DISTRIBUTION"),
            }),
            None => StoreConfig::Local {
                root: get("TUBELY_ASSETS_ROOT")
                    .unwrap_or_else(|| "./assets".to_string())
                    .into(),
                public_base,
            },
        };

        let defaults = MediaConfig::default();
        Self {
            db_path: get("TUBELY_DB").unwrap_or_else(|| "tubely.db".to_string()),
            jwt_secret: get("TUBELY_JWT_SECRET")
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            bind_addr,
            temp_dir: get("TUBELY_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            store,
            media: MediaConfig {
                ffmpeg_path: get("TUBELY_FFMPEG")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.ffmpeg_path),
                ffprobe_path: get("TUBELY_FFPROBE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.ffprobe_path),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_to_local_store() {
        let cfg = config(&[]);
        assert_eq!(cfg.db_path, "tubely.db");
        assert_eq!(cfg.bind_addr, "0.0.0.0:8091");
        assert_eq!(cfg.media.ffprobe_path, PathBuf::from("ffprobe"));
        match cfg.store {
            StoreConfig::Local { root, public_base } => {
                assert_eq!(root, PathBuf::from("./assets"));
                assert_eq!(public_base, "http://localhost:8091");
            }
            StoreConfig::S3(_) => panic!("expected local store"),
        }
    }

    #[test]
    fn bucket_selects_s3() {
        let cfg = config(&[
            ("S3_BUCKET", "tubely-123"),
            ("S3_REGION", "us-east-2"),
            ("S3_CF_DISTRIBUTION", "https://d1.cloudfront.net"),
            ("S3_ENDPOINT", "  "),
        ]);
        match cfg.store {
            StoreConfig::S3(s3) => {
                assert_eq!(s3.bucket, "tubely-123");
                assert_eq!(s3.region, "us-east-2");
                assert_eq!(s3.distribution.as_deref(), Some("https://d1.cloudfront.net"));
                assert!(s3.endpoint_url.is_none());
            }
            StoreConfig::Local { .. } => panic!("expected s3 store"),
        }
    }

    #[test]
    fn public_url_follows_bind_port() {
        let cfg = config(&[("TUBELY_BIND", "127.0.0.1:9000"), ("TUBELY_FFMPEG", "/opt/ffmpeg")]);
        assert_eq!(cfg.media.ffmpeg_path, PathBuf::from("/opt/ffmpeg"));
        match cfg.store {
            StoreConfig::Local { public_base, .. } => {
                assert_eq!(public_base, "http://localhost:9000")
            }
            StoreConfig::S3(_) => panic!("expected local store"),
        }
    }
}
