use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse orientation of a video, used as the storage-key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    Landscape,
    Portrait,
    Other,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A video record as stored in the `video` table and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_labels() {
        assert_eq!(AspectRatio::Landscape.to_string(), "landscape");
        assert_eq!(AspectRatio::Portrait.to_string(), "portrait");
        assert_eq!(AspectRatio::Other.to_string(), "other");
    }

    #[test]
    fn video_serializes_snake_case_with_null_urls() {
        let now = Utc::now();
        let video = Video {
            id: "v1".into(),
            user_id: "u1".into(),
            title: "Boots".into(),
            description: String::new(),
            thumbnail_url: None,
            video_url: Some("https://cdn.example.com/landscape/a.mp4".into()),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&video).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert!(json["thumbnail_url"].is_null());
        assert_eq!(json["video_url"], "https://cdn.example.com/landscape/a.mp4");
        assert!(video.is_owned_by("u1"));
        assert!(!video.is_owned_by("u2"));
    }
}
