//! In-process repositories
//!
//! [`InMemoryDatabase`] implements every repository trait over one mutex-guarded
//! state and enforces the same uniqueness, cascade and visibility rules as the
//! PostgreSQL schema. Services and HTTP tests run against it.

use chrono::{DateTime, Utc};
use memeshelf_core::models::{
    Album, AlbumRef, Comment, FeedItem, FeedOrder, Media, NewMedia, Tag, TagSuggestion,
};
use memeshelf_core::AppError;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::db::media::{
    AlbumRepositoryTrait, CommentRepositoryTrait, FeedFilter, MediaRepositoryTrait,
    TagRepositoryTrait,
};

struct StoredMedia {
    seq: u64,
    row: NewMedia,
    tag_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

struct StoredComment {
    seq: u64,
    comment: Comment,
}

#[derive(Default)]
struct State {
    seq: u64,
    tags: Vec<Tag>,
    albums: HashMap<Uuid, Album>,
    media: HashMap<Uuid, StoredMedia>,
    comments: Vec<StoredComment>,
}

impl State {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn to_media(&self, stored: &StoredMedia) -> Media {
        let album = stored
            .row
            .album_id
            .and_then(|id| self.albums.get(&id))
            .map(|a| AlbumRef {
                id: a.id,
                title: a.title.clone(),
                owner_id: a.owner_id,
                is_private: a.is_private,
            });
        let tags = stored
            .tag_ids
            .iter()
            .filter_map(|id| self.tags.iter().find(|t| t.id == *id).cloned())
            .collect();

        Media {
            id: stored.row.id,
            uploader_id: stored.row.uploader_id,
            title: stored.row.title.clone(),
            storage_key: stored.row.storage_key.clone(),
            storage_url: stored.row.storage_url.clone(),
            original_filename: stored.row.original_filename.clone(),
            content_type: stored.row.content_type.clone(),
            file_size: stored.row.file_size,
            media_type: stored.row.media_type,
            album,
            tags,
            is_public: stored.row.is_public,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }

    fn in_feed(&self, stored: &StoredMedia, filter: &FeedFilter) -> bool {
        if !stored.row.is_public {
            return false;
        }
        if let Some(tag_id) = filter.tag_id {
            if !stored.tag_ids.contains(&tag_id) {
                return false;
            }
        }
        let viewer = &filter.viewer;
        match stored.row.album_id.and_then(|id| self.albums.get(&id)) {
            Some(album) if album.is_private => {
                viewer.elevated
                    || album.owner_id == viewer.user_id
                    || stored.row.uploader_id == viewer.user_id
            }
            _ => true,
        }
    }

    fn comment_count(&self, media_id: Uuid) -> i64 {
        self.comments
            .iter()
            .filter(|c| c.comment.media_id == media_id)
            .count() as i64
    }

    fn check_tag_ids(&self, tag_ids: &[Uuid]) -> Result<Vec<Uuid>, AppError> {
        let mut linked = Vec::with_capacity(tag_ids.len());
        for id in tag_ids {
            if !self.tags.iter().any(|t| t.id == *id) {
                return Err(AppError::InvalidInput(format!("Unknown tag {}", id)));
            }
            if !linked.contains(id) {
                linked.push(*id);
            }
        }
        Ok(linked)
    }
}

/// Every repository trait over shared in-process state. Clones share the state.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("In-memory database lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl TagRepositoryTrait for InMemoryDatabase {
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, AppError> {
        let wanted = name.to_lowercase();
        let state = self.lock()?;
        Ok(state
            .tags
            .iter()
            .find(|t| t.name.to_lowercase() == wanted)
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, AppError> {
        let state = self.lock()?;
        Ok(state.tags.iter().find(|t| t.slug == slug).cloned())
    }

    async fn insert(&self, name: &str, slug: &str) -> Result<Tag, AppError> {
        let lowered = name.to_lowercase();
        let mut state = self.lock()?;
        if state.tags.iter().any(|t| t.name.to_lowercase() == lowered) {
            return Err(AppError::Conflict("tags_name_lower_key".to_string()));
        }
        if state.tags.iter().any(|t| t.slug == slug) {
            return Err(AppError::Conflict("tags_slug_key".to_string()));
        }

        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: Utc::now(),
        };
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn suggestions(
        &self,
        query: Option<&str>,
        limit: i64,
    ) -> Result<Vec<TagSuggestion>, AppError> {
        let needle = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let state = self.lock()?;

        let mut suggestions: Vec<TagSuggestion> = state
            .tags
            .iter()
            .filter(|t| match &needle {
                Some(n) => t.name.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .map(|t| TagSuggestion {
                id: t.id,
                name: t.name.clone(),
                slug: t.slug.clone(),
                count: state
                    .media
                    .values()
                    .filter(|m| m.tag_ids.contains(&t.id))
                    .count() as i64,
            })
            .collect();

        suggestions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        suggestions.truncate(limit.max(0) as usize);
        Ok(suggestions)
    }
}

#[async_trait::async_trait]
impl AlbumRepositoryTrait for InMemoryDatabase {
    async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        description: &str,
        is_private: bool,
    ) -> Result<Album, AppError> {
        let now = Utc::now();
        let album = Album {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            description: description.to_string(),
            is_private,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.albums.insert(album.id, album.clone());
        Ok(album)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Album>, AppError> {
        Ok(self.lock()?.albums.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Album>, AppError> {
        let state = self.lock()?;
        let mut albums: Vec<Album> = state
            .albums
            .values()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect();
        albums.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(albums)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.lock()?;
        if state.albums.remove(&id).is_none() {
            return Ok(false);
        }
        for stored in state.media.values_mut() {
            if stored.row.album_id == Some(id) {
                stored.row.album_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait::async_trait]
impl CommentRepositoryTrait for InMemoryDatabase {
    async fn create(
        &self,
        media_id: Uuid,
        author_id: Uuid,
        text: &str,
    ) -> Result<Comment, AppError> {
        let mut state = self.lock()?;
        if !state.media.contains_key(&media_id) {
            return Err(AppError::media_not_found());
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            media_id,
            author_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        let seq = state.next_seq();
        state.comments.push(StoredComment {
            seq,
            comment: comment.clone(),
        });
        Ok(comment)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, AppError> {
        let state = self.lock()?;
        Ok(state
            .comments
            .iter()
            .find(|c| c.comment.id == id)
            .map(|c| c.comment.clone()))
    }

    async fn count_for_media(&self, media_id: Uuid) -> Result<i64, AppError> {
        Ok(self.lock()?.comment_count(media_id))
    }

    async fn list_for_media(
        &self,
        media_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, AppError> {
        let state = self.lock()?;
        let mut matching: Vec<&StoredComment> = state
            .comments
            .iter()
            .filter(|c| c.comment.media_id == media_id)
            .collect();
        matching.sort_by(|a, b| b.seq.cmp(&a.seq));

        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|c| c.comment.clone())
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.lock()?;
        let before = state.comments.len();
        state.comments.retain(|c| c.comment.id != id);
        Ok(state.comments.len() < before)
    }
}

#[async_trait::async_trait]
impl MediaRepositoryTrait for InMemoryDatabase {
    async fn create(&self, media: NewMedia, tag_ids: &[Uuid]) -> Result<Media, AppError> {
        let mut state = self.lock()?;
        if let Some(album_id) = media.album_id {
            if !state.albums.contains_key(&album_id) {
                return Err(AppError::InvalidInput("Select a valid album".to_string()));
            }
        }
        let tag_ids = state.check_tag_ids(tag_ids)?;

        let now = Utc::now();
        let seq = state.next_seq();
        let stored = StoredMedia {
            seq,
            row: media,
            tag_ids,
            created_at: now,
            updated_at: now,
        };
        let created = state.to_media(&stored);
        state.media.insert(created.id, stored);
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        let state = self.lock()?;
        Ok(state.media.get(&id).map(|m| state.to_media(m)))
    }

    async fn update_title(&self, id: Uuid, title: Option<&str>) -> Result<Option<Media>, AppError> {
        let mut state = self.lock()?;
        let Some(stored) = state.media.get_mut(&id) else {
            return Ok(None);
        };
        stored.row.title = title.map(str::to_string);
        stored.updated_at = Utc::now();

        Ok(state.media.get(&id).map(|m| state.to_media(m)))
    }

    async fn replace_tags(&self, id: Uuid, tag_ids: &[Uuid]) -> Result<Option<Media>, AppError> {
        let mut state = self.lock()?;
        if !state.media.contains_key(&id) {
            return Ok(None);
        }
        let tag_ids = state.check_tag_ids(tag_ids)?;
        if let Some(stored) = state.media.get_mut(&id) {
            stored.tag_ids = tag_ids;
            stored.updated_at = Utc::now();
        }

        Ok(state.media.get(&id).map(|m| state.to_media(m)))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<String>, AppError> {
        let mut state = self.lock()?;
        let Some(stored) = state.media.remove(&id) else {
            return Ok(None);
        };
        state.comments.retain(|c| c.comment.media_id != id);
        Ok(Some(stored.row.storage_key))
    }

    async fn count_feed(&self, filter: &FeedFilter) -> Result<i64, AppError> {
        let state = self.lock()?;
        Ok(state
            .media
            .values()
            .filter(|m| state.in_feed(m, filter))
            .count() as i64)
    }

    async fn list_feed(
        &self,
        filter: &FeedFilter,
        order: FeedOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FeedItem>, AppError> {
        let state = self.lock()?;
        let mut visible: Vec<&StoredMedia> = state
            .media
            .values()
            .filter(|m| state.in_feed(m, filter))
            .collect();

        match order {
            FeedOrder::Newest => visible.sort_by(|a, b| b.seq.cmp(&a.seq)),
            FeedOrder::Random => visible.shuffle(&mut rand::rng()),
        }

        Ok(visible
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|m| FeedItem {
                media: state.to_media(m),
                comment_count: state.comment_count(m.row.id),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memeshelf_core::models::MediaType;
    use memeshelf_core::Caller;

    fn new_media(uploader: Uuid, album_id: Option<Uuid>, is_public: bool) -> NewMedia {
        let id = Uuid::new_v4();
        NewMedia {
            id,
            uploader_id: uploader,
            title: None,
            storage_key: format!("memes/user_{}/{}.png", uploader, id),
            storage_url: format!("http://localhost/{}.png", id),
            original_filename: "a.png".to_string(),
            content_type: "image/png".to_string(),
            file_size: 8,
            media_type: MediaType::Image,
            album_id,
            is_public,
        }
    }

    #[tokio::test]
    async fn tag_names_are_unique_case_insensitively() {
        let db = InMemoryDatabase::new();
        TagRepositoryTrait::insert(&db, "Cats", "cats").await.unwrap();

        let err = TagRepositoryTrait::insert(&db, "CATS", "cats-2")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = TagRepositoryTrait::insert(&db, "cats!", "cats")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let found = db.find_by_name("cAtS").await.unwrap().unwrap();
        assert_eq!(found.name, "Cats");
    }

    #[tokio::test]
    async fn deleting_album_keeps_media() {
        let db = InMemoryDatabase::new();
        let owner = Uuid::new_v4();
        let album = AlbumRepositoryTrait::create(&db, owner, "a", "", false)
            .await
            .unwrap();
        let media = MediaRepositoryTrait::create(&db, new_media(owner, Some(album.id), true), &[])
            .await
            .unwrap();
        assert!(media.album.is_some());

        assert!(AlbumRepositoryTrait::delete(&db, album.id).await.unwrap());
        let media = MediaRepositoryTrait::get(&db, media.id).await.unwrap().unwrap();
        assert!(media.album.is_none());
    }

    #[tokio::test]
    async fn deleting_media_cascades_comments() {
        let db = InMemoryDatabase::new();
        let owner = Uuid::new_v4();
        let media = MediaRepositoryTrait::create(&db, new_media(owner, None, true), &[])
            .await
            .unwrap();
        let comment = CommentRepositoryTrait::create(&db, media.id, owner, "nice")
            .await
            .unwrap();

        let key = MediaRepositoryTrait::delete(&db, media.id).await.unwrap();
        assert_eq!(key.as_deref(), Some(media.storage_key.as_str()));
        assert!(CommentRepositoryTrait::get(&db, comment.id).await.unwrap().is_none());
        assert!(MediaRepositoryTrait::delete(&db, media.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn feed_hides_private_album_from_strangers() {
        let db = InMemoryDatabase::new();
        let owner = Uuid::new_v4();
        let album = AlbumRepositoryTrait::create(&db, owner, "secret", "", true)
            .await
            .unwrap();
        MediaRepositoryTrait::create(&db, new_media(owner, Some(album.id), true), &[])
            .await
            .unwrap();
        MediaRepositoryTrait::create(&db, new_media(owner, None, true), &[])
            .await
            .unwrap();
        MediaRepositoryTrait::create(&db, new_media(owner, None, false), &[])
            .await
            .unwrap();

        let stranger = FeedFilter {
            tag_id: None,
            viewer: Caller::new(Uuid::new_v4()),
        };
        let album_owner = FeedFilter {
            tag_id: None,
            viewer: Caller::new(owner),
        };
        assert_eq!(db.count_feed(&stranger).await.unwrap(), 1);
        assert_eq!(db.count_feed(&album_owner).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn feed_is_newest_first_and_keeps_tag_order() {
        let db = InMemoryDatabase::new();
        let owner = Uuid::new_v4();
        let b = TagRepositoryTrait::insert(&db, "b", "b").await.unwrap();
        let a = TagRepositoryTrait::insert(&db, "a", "a").await.unwrap();
        let first = MediaRepositoryTrait::create(&db, new_media(owner, None, true), &[b.id, a.id])
            .await
            .unwrap();
        let second = MediaRepositoryTrait::create(&db, new_media(owner, None, true), &[])
            .await
            .unwrap();

        let filter = FeedFilter {
            tag_id: None,
            viewer: Caller::new(owner),
        };
        let items = db
            .list_feed(&filter, FeedOrder::Newest, 10, 0)
            .await
            .unwrap();
        assert_eq!(items[0].media.id, second.id);
        assert_eq!(items[1].media.id, first.id);
        let names: Vec<&str> = items[1].media.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
