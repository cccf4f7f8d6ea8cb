use chrono::{DateTime, Utc};
use memeshelf_core::models::{AlbumRef, FeedItem, FeedOrder, Media, MediaType, NewMedia, Tag};
use memeshelf_core::{AppError, Caller};
use sqlx::{PgConnection, PgPool, Postgres};
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::transaction::TransactionGuard;

/// Which media a listing may show to `viewer`.
///
/// Listings only ever contain public media; media in a private album additionally
/// require the viewer to own the album or the media, or to be elevated.
#[derive(Debug, Clone, Copy)]
pub struct FeedFilter {
    pub tag_id: Option<Uuid>,
    pub viewer: Caller,
}

#[async_trait::async_trait]
pub trait MediaRepositoryTrait: Send + Sync {
    /// Inserts the media row and its tag links in one transaction.
    async fn create(&self, media: NewMedia, tag_ids: &[Uuid]) -> Result<Media, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Media>, AppError>;

    async fn update_title(&self, id: Uuid, title: Option<&str>) -> Result<Option<Media>, AppError>;

    /// Replaces the whole tag set, keeping the given order.
    async fn replace_tags(&self, id: Uuid, tag_ids: &[Uuid]) -> Result<Option<Media>, AppError>;

    /// Deletes the row (comments and tag links cascade) and returns its storage key.
    async fn delete(&self, id: Uuid) -> Result<Option<String>, AppError>;

    async fn count_feed(&self, filter: &FeedFilter) -> Result<i64, AppError>;

    async fn list_feed(
        &self,
        filter: &FeedFilter,
        order: FeedOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FeedItem>, AppError>;
}

const MEDIA_COLUMNS: &str = r#"
    m.id, m.uploader_id, m.title, m.storage_key, m.storage_url, m.original_filename,
    m.content_type, m.file_size, m.media_type, m.is_public, m.created_at, m.updated_at,
    a.id AS album_id, a.title AS album_title, a.owner_id AS album_owner_id,
    a.is_private AS album_is_private
"#;

const MEDIA_FROM: &str = "FROM media m LEFT JOIN albums a ON a.id = m.album_id";

const FEED_WHERE: &str = r#"
    WHERE m.is_public
      AND (a.id IS NULL OR NOT a.is_private OR $2 OR a.owner_id = $3 OR m.uploader_id = $3)
      AND ($1::uuid IS NULL OR EXISTS (
            SELECT 1 FROM media_tags ft WHERE ft.media_id = m.id AND ft.tag_id = $1))
"#;

#[derive(sqlx::FromRow)]
struct MediaRow {
    id: Uuid,
    uploader_id: Uuid,
    title: Option<String>,
    storage_key: String,
    storage_url: String,
    original_filename: String,
    content_type: String,
    file_size: i64,
    media_type: MediaType,
    is_public: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    album_id: Option<Uuid>,
    album_title: Option<String>,
    album_owner_id: Option<Uuid>,
    album_is_private: Option<bool>,
}

impl MediaRow {
    fn into_media(self, tags: Vec<Tag>) -> Media {
        let album = match (
            self.album_id,
            self.album_title,
            self.album_owner_id,
            self.album_is_private,
        ) {
            (Some(id), Some(title), Some(owner_id), Some(is_private)) => Some(AlbumRef {
                id,
                title,
                owner_id,
                is_private,
            }),
            _ => None,
        };

        Media {
            id: self.id,
            uploader_id: self.uploader_id,
            title: self.title,
            storage_key: self.storage_key,
            storage_url: self.storage_url,
            original_filename: self.original_filename,
            content_type: self.content_type,
            file_size: self.file_size,
            media_type: self.media_type,
            album,
            tags,
            is_public: self.is_public,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FeedRow {
    #[sqlx(flatten)]
    media: MediaRow,
    comment_count: i64,
}

#[derive(sqlx::FromRow)]
struct TagLinkRow {
    media_id: Uuid,
    #[sqlx(flatten)]
    tag: Tag,
}

/// Unified media repository backed by PostgreSQL
#[derive(Clone)]
pub struct PostgresMediaRepository {
    pool: PgPool,
}

impl PostgresMediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tags for each media id, in link order.
    async fn load_tags(&self, media_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>, AppError> {
        let mut by_media: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        if media_ids.is_empty() {
            return Ok(by_media);
        }

        let rows = sqlx::query_as::<Postgres, TagLinkRow>(
            r#"
            SELECT mt.media_id, t.id, t.name, t.slug, t.created_at
            FROM media_tags mt
            JOIN tags t ON t.id = mt.tag_id
            WHERE mt.media_id = ANY($1)
            ORDER BY mt.media_id, mt.position
            "#,
        )
        .bind(media_ids)
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            by_media.entry(row.media_id).or_default().push(row.tag);
        }
        Ok(by_media)
    }
}

async fn insert_tag_links(
    conn: &mut PgConnection,
    media_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), AppError> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO media_tags (media_id, tag_id, position)
        SELECT $1, t.tag_id, (t.ord - 1)::int
        FROM UNNEST($2::uuid[]) WITH ORDINALITY AS t(tag_id, ord)
        ON CONFLICT (media_id, tag_id) DO NOTHING
        "#,
    )
    .bind(media_id)
    .bind(tag_ids)
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait::async_trait]
impl MediaRepositoryTrait for PostgresMediaRepository {
    #[tracing::instrument(skip(self, media, tag_ids), fields(db.table = "media", db.operation = "insert", db.record_id = %media.id, media_type = ?media.media_type))]
    async fn create(&self, media: NewMedia, tag_ids: &[Uuid]) -> Result<Media, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO media (
                id, uploader_id, title, storage_key, storage_url, original_filename,
                content_type, file_size, media_type, album_id, is_public
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(media.id)
        .bind(media.uploader_id)
        .bind(&media.title)
        .bind(&media.storage_key)
        .bind(&media.storage_url)
        .bind(&media.original_filename)
        .bind(&media.content_type)
        .bind(media.file_size)
        .bind(media.media_type)
        .bind(media.album_id)
        .bind(media.is_public)
        .execute(tx.conn()?)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                return Err(AppError::InvalidInput("Select a valid album".to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        insert_tag_links(tx.conn()?, media.id, tag_ids).await?;
        tx.commit().await?;

        self.get(media.id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Media {} vanished after insert", media.id)))
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        let sql = format!("SELECT {} {} WHERE m.id = $1", MEDIA_COLUMNS, MEDIA_FROM);
        let row = sqlx::query_as::<Postgres, MediaRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut tags = self.load_tags(&[id]).await?;
        Ok(Some(row.into_media(tags.remove(&id).unwrap_or_default())))
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "update", db.record_id = %id))]
    async fn update_title(&self, id: Uuid, title: Option<&str>) -> Result<Option<Media>, AppError> {
        let rows_affected =
            sqlx::query("UPDATE media SET title = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(title)
                .execute(&self.pool)
                .await?
                .rows_affected();

        if rows_affected == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    #[tracing::instrument(skip(self, tag_ids), fields(db.table = "media_tags", db.operation = "replace", db.record_id = %id))]
    async fn replace_tags(&self, id: Uuid, tag_ids: &[Uuid]) -> Result<Option<Media>, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let locked = sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT id FROM media WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(tx.conn()?)
        .await?;

        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("DELETE FROM media_tags WHERE media_id = $1")
            .bind(id)
            .execute(tx.conn()?)
            .await?;
        insert_tag_links(tx.conn()?, id, tag_ids).await?;
        sqlx::query("UPDATE media SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(tx.conn()?)
            .await?;

        tx.commit().await?;
        self.get(id).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<Option<String>, AppError> {
        let key = sqlx::query_scalar::<Postgres, String>(
            "DELETE FROM media WHERE id = $1 RETURNING storage_key",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "count"))]
    async fn count_feed(&self, filter: &FeedFilter) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) {} {}", MEDIA_FROM, FEED_WHERE);
        let count = sqlx::query_scalar::<Postgres, i64>(&sql)
            .bind(filter.tag_id)
            .bind(filter.viewer.elevated)
            .bind(filter.viewer.user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    async fn list_feed(
        &self,
        filter: &FeedFilter,
        order: FeedOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FeedItem>, AppError> {
        let order_by = match order {
            FeedOrder::Newest => "m.created_at DESC, m.id DESC",
            FeedOrder::Random => "random()",
        };
        let sql = format!(
            r#"
            SELECT {},
                   (SELECT COUNT(*) FROM comments c WHERE c.media_id = m.id) AS comment_count
            {} {}
            ORDER BY {}
            LIMIT $4 OFFSET $5
            "#,
            MEDIA_COLUMNS, MEDIA_FROM, FEED_WHERE, order_by
        );

        let rows = sqlx::query_as::<Postgres, FeedRow>(&sql)
            .bind(filter.tag_id)
            .bind(filter.viewer.elevated)
            .bind(filter.viewer.user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.media.id).collect();
        let mut tags = self.load_tags(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let media_tags = tags.remove(&row.media.id).unwrap_or_default();
                FeedItem {
                    media: row.media.into_media(media_tags),
                    comment_count: row.comment_count,
                }
            })
            .collect())
    }
}
