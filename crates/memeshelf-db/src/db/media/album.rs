use memeshelf_core::models::Album;
use memeshelf_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait AlbumRepositoryTrait: Send + Sync {
    async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        description: &str,
        is_private: bool,
    ) -> Result<Album, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Album>, AppError>;

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Album>, AppError>;

    /// Deletes the album; its media stay and lose their album reference.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Repository for albums
#[derive(Clone)]
pub struct PostgresAlbumRepository {
    pool: PgPool,
}

impl PostgresAlbumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AlbumRepositoryTrait for PostgresAlbumRepository {
    #[tracing::instrument(skip(self, description), fields(db.table = "albums", db.operation = "insert"))]
    async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        description: &str,
        is_private: bool,
    ) -> Result<Album, AppError> {
        let album = sqlx::query_as::<Postgres, Album>(
            r#"
            INSERT INTO albums (owner_id, title, description, is_private)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, title, description, is_private, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(is_private)
        .fetch_one(&self.pool)
        .await?;

        Ok(album)
    }

    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Album>, AppError> {
        let album = sqlx::query_as::<Postgres, Album>(
            "SELECT id, owner_id, title, description, is_private, created_at, updated_at FROM albums WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(album)
    }

    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "select"))]
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Album>, AppError> {
        let albums = sqlx::query_as::<Postgres, Album>(
            r#"
            SELECT id, owner_id, title, description, is_private, created_at, updated_at
            FROM albums
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(albums)
    }

    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        // media.album_id is ON DELETE SET NULL
        let rows_affected = sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
