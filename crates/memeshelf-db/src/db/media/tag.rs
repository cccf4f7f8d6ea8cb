use memeshelf_core::models::{Tag, TagSuggestion};
use memeshelf_core::AppError;
use sqlx::{PgPool, Postgres};

/// Tag persistence.
///
/// Names are unique case-insensitively and slugs are unique; `insert` reports a
/// clash on either as [`AppError::Conflict`] and leaves resolution to the caller.
#[async_trait::async_trait]
pub trait TagRepositoryTrait: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, AppError>;

    async fn insert(&self, name: &str, slug: &str) -> Result<Tag, AppError>;

    /// Most used tags first, ties by name. `query` filters by case-insensitive substring.
    async fn suggestions(
        &self,
        query: Option<&str>,
        limit: i64,
    ) -> Result<Vec<TagSuggestion>, AppError>;
}

#[derive(Clone)]
pub struct PostgresTagRepository {
    pool: PgPool,
}

impl PostgresTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes `%`, `_` and `\` so user text matches literally inside ILIKE.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait::async_trait]
impl TagRepositoryTrait for PostgresTagRepository {
    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "select"))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, AppError> {
        let tag = sqlx::query_as::<Postgres, Tag>(
            "SELECT id, name, slug, created_at FROM tags WHERE lower(name) = lower($1)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "select"))]
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, AppError> {
        let tag = sqlx::query_as::<Postgres, Tag>(
            "SELECT id, name, slug, created_at FROM tags WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "insert"))]
    async fn insert(&self, name: &str, slug: &str) -> Result<Tag, AppError> {
        let tag = sqlx::query_as::<Postgres, Tag>(
            r#"
            INSERT INTO tags (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug, created_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(tag)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "select"))]
    async fn suggestions(
        &self,
        query: Option<&str>,
        limit: i64,
    ) -> Result<Vec<TagSuggestion>, AppError> {
        let pattern = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(like_pattern);

        let rows = sqlx::query_as::<Postgres, TagSuggestion>(
            r#"
            SELECT t.id, t.name, t.slug, COUNT(mt.media_id) AS count
            FROM tags t
            LEFT JOIN media_tags mt ON mt.tag_id = t.id
            WHERE $1::text IS NULL OR t.name ILIKE $1
            GROUP BY t.id
            ORDER BY count DESC, t.name ASC
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("cat"), "%cat%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
