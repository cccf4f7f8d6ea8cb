use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::tag::Tag;

pub const MAX_TITLE_LENGTH: usize = 150;

/// Media type enum. Derived from the accepted upload, never from client input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "media_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// `image/*` maps to Image, anything else to Video.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            MediaType::Image
        } else {
            MediaType::Video
        }
    }
}

/// The album a media sits in, as seen from the media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AlbumRef {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    pub is_private: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Media {
    pub id: Uuid,
    pub uploader_id: Uuid,
    pub title: Option<String>,
    pub storage_key: String,
    pub storage_url: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub media_type: MediaType,
    pub album: Option<AlbumRef>,
    pub tags: Vec<Tag>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload. The row only exists once a repository commits it.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub id: Uuid,
    pub uploader_id: Uuid,
    pub title: Option<String>,
    pub storage_key: String,
    pub storage_url: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub media_type: MediaType,
    pub album_id: Option<Uuid>,
    pub is_public: bool,
}

/// A media in a listing, with its comment count.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedItem {
    #[serde(flatten)]
    pub media: Media,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOrder {
    Newest,
    Random,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub page: u32,
    pub num_pages: u32,
    pub total: i64,
    pub has_next: bool,
    pub next_page_number: Option<u32>,
    pub current_tag: Option<Tag>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTitleRequest {
    #[serde(default)]
    pub title: String,
}

/// Normalizes a submitted title: trimmed, blank becomes `None`.
pub fn normalize_title(raw: &str) -> Result<Option<String>, crate::AppError> {
    let title = raw.trim();
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(crate::AppError::InvalidInput(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok((!title.is_empty()).then(|| title.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_follows_content_type_prefix() {
        assert_eq!(MediaType::from_content_type("image/gif"), MediaType::Image);
        assert_eq!(MediaType::from_content_type("video/webm"), MediaType::Video);
    }

    #[test]
    fn blank_title_is_none() {
        assert_eq!(normalize_title("   ").unwrap(), None);
        assert_eq!(normalize_title(" hi ").unwrap().as_deref(), Some("hi"));
        assert!(normalize_title(&"x".repeat(151)).is_err());
    }
}
