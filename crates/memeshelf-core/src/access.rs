//! Ownership and visibility rules
//!
//! Every mutating operation asks [`can_modify`]; every read path asks [`can_view`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Album, Comment, Media};

/// The authenticated identity making a request, as vouched for by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Uuid,
    /// Bypasses per-owner checks.
    pub elevated: bool,
}

impl Caller {
    pub fn new(user_id: Uuid) -> Self {
        Caller {
            user_id,
            elevated: false,
        }
    }

    pub fn elevated(user_id: Uuid) -> Self {
        Caller {
            user_id,
            elevated: true,
        }
    }
}

/// Entities with a single owning identity.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Media {
    fn owner_id(&self) -> Uuid {
        self.uploader_id
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

impl Owned for Album {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Owner or elevated caller.
pub fn can_modify<T: Owned + ?Sized>(entity: &T, caller: &Caller) -> bool {
    caller.elevated || entity.owner_id() == caller.user_id
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

pub fn visibility(media: &Media) -> Visibility {
    if media.is_public {
        Visibility::Public
    } else {
        Visibility::Private
    }
}

/// Whether `caller` may see `media`. Callers that get `false` must be told NotFound.
///
/// The media flag and the album flag are checked independently: a private media is
/// hidden from everyone but its uploader whatever album it is in, and media in a
/// private album is hidden from everyone but the album owner and the uploader.
pub fn can_view(media: &Media, caller: &Caller) -> bool {
    if caller.elevated || media.uploader_id == caller.user_id {
        return true;
    }
    if visibility(media) == Visibility::Private {
        return false;
    }
    match &media.album {
        Some(album) if album.is_private => album.owner_id == caller.user_id,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlbumRef, MediaType};
    use chrono::Utc;

    fn media(uploader: Uuid, is_public: bool, album: Option<AlbumRef>) -> Media {
        Media {
            id: Uuid::new_v4(),
            uploader_id: uploader,
            title: None,
            storage_key: "memes/user_x/a.png".to_string(),
            storage_url: "http://localhost/a.png".to_string(),
            original_filename: "a.png".to_string(),
            content_type: "image/png".to_string(),
            file_size: 8,
            media_type: MediaType::Image,
            album,
            tags: vec![],
            is_public,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_and_elevated_can_modify() {
        let owner = Uuid::new_v4();
        let m = media(owner, true, None);
        assert!(can_modify(&m, &Caller::new(owner)));
        assert!(can_modify(&m, &Caller::elevated(Uuid::new_v4())));
        assert!(!can_modify(&m, &Caller::new(Uuid::new_v4())));
    }

    #[test]
    fn private_media_hidden_from_strangers() {
        let owner = Uuid::new_v4();
        let m = media(owner, false, None);
        assert_eq!(visibility(&m), Visibility::Private);
        assert!(can_view(&m, &Caller::new(owner)));
        assert!(can_view(&m, &Caller::elevated(Uuid::new_v4())));
        assert!(!can_view(&m, &Caller::new(Uuid::new_v4())));
    }

    #[test]
    fn private_media_stays_hidden_in_public_album_and_from_album_owner() {
        let uploader = Uuid::new_v4();
        let album_owner = Uuid::new_v4();
        let album = AlbumRef {
            id: Uuid::new_v4(),
            title: "stuff".to_string(),
            owner_id: album_owner,
            is_private: false,
        };
        let m = media(uploader, false, Some(album));
        assert!(!can_view(&m, &Caller::new(album_owner)));
        assert!(!can_view(&m, &Caller::new(Uuid::new_v4())));
    }

    #[test]
    fn private_album_limits_public_media() {
        let uploader = Uuid::new_v4();
        let album_owner = Uuid::new_v4();
        let album = AlbumRef {
            id: Uuid::new_v4(),
            title: "secret".to_string(),
            owner_id: album_owner,
            is_private: true,
        };
        let m = media(uploader, true, Some(album));
        assert!(can_view(&m, &Caller::new(album_owner)));
        assert!(can_view(&m, &Caller::new(uploader)));
        assert!(!can_view(&m, &Caller::new(Uuid::new_v4())));
    }
}
