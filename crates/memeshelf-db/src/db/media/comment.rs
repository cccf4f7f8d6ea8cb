use memeshelf_core::models::Comment;
use memeshelf_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait CommentRepositoryTrait: Send + Sync {
    /// Fails with NotFound when the media is gone.
    async fn create(&self, media_id: Uuid, author_id: Uuid, text: &str)
        -> Result<Comment, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, AppError>;

    async fn count_for_media(&self, media_id: Uuid) -> Result<i64, AppError>;

    /// Newest first.
    async fn list_for_media(
        &self,
        media_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CommentRepositoryTrait for PostgresCommentRepository {
    #[tracing::instrument(skip(self, text), fields(db.table = "comments", db.operation = "insert"))]
    async fn create(
        &self,
        media_id: Uuid,
        author_id: Uuid,
        text: &str,
    ) -> Result<Comment, AppError> {
        let result = sqlx::query_as::<Postgres, Comment>(
            r#"
            INSERT INTO comments (media_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, media_id, author_id, text, created_at
            "#,
        )
        .bind(media_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(comment) => Ok(comment),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(AppError::media_not_found())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "comments", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<Postgres, Comment>(
            "SELECT id, media_id, author_id, text, created_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    #[tracing::instrument(skip(self), fields(db.table = "comments", db.operation = "count"))]
    async fn count_for_media(&self, media_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM comments WHERE media_id = $1",
        )
        .bind(media_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "comments", db.operation = "select"))]
    async fn list_for_media(
        &self,
        media_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<Postgres, Comment>(
            r#"
            SELECT id, media_id, author_id, text, created_at
            FROM comments
            WHERE media_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(media_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    #[tracing::instrument(skip(self), fields(db.table = "comments", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
