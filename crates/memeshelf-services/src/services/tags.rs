//! Tag resolution: free text to stored tags.
//!
//! Names are matched case-insensitively and created on first use. Creation races are
//! settled by the store's unique constraints: a rejected insert is followed by a
//! re-select, and only a clash on the slug alone moves on to the next slug candidate.

use memeshelf_core::models::{Tag, TagSuggestion};
use memeshelf_core::tags::{parse_and_validate, slug_candidate, slugify};
use memeshelf_core::AppError;
use memeshelf_db::TagRepositoryTrait;
use std::sync::Arc;

pub const SUGGESTION_LIMIT: i64 = 10;
const MAX_SLUG_ATTEMPTS: u32 = 20;

#[derive(Clone)]
pub struct TagService {
    repo: Arc<dyn TagRepositoryTrait>,
}

impl TagService {
    pub fn new(repo: Arc<dyn TagRepositoryTrait>) -> Self {
        Self { repo }
    }

    /// Parses `raw` and resolves every name to a stored tag, in first-seen order.
    #[tracing::instrument(skip(self, raw), fields(tags.operation = "resolve"))]
    pub async fn resolve(&self, raw: &str) -> Result<Vec<Tag>, AppError> {
        let names = parse_and_validate(raw)?;
        self.resolve_names(&names).await
    }

    /// Resolves already parsed names. The result holds each tag once.
    pub async fn resolve_names(&self, names: &[String]) -> Result<Vec<Tag>, AppError> {
        let mut resolved: Vec<Tag> = Vec::with_capacity(names.len());
        for name in names {
            let tag = self.get_or_create(name).await?;
            if !resolved.iter().any(|t| t.id == tag.id) {
                resolved.push(tag);
            }
        }
        Ok(resolved)
    }

    async fn get_or_create(&self, name: &str) -> Result<Tag, AppError> {
        if let Some(tag) = self.repo.find_by_name(name).await? {
            return Ok(tag);
        }

        let base = slugify(name);
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let slug = slug_candidate(&base, attempt);
            match self.repo.insert(name, &slug).await {
                Ok(tag) => {
                    tracing::debug!(tag_id = %tag.id, tag = %tag.name, slug = %tag.slug, "Created tag");
                    return Ok(tag);
                }
                Err(AppError::Conflict(constraint)) => {
                    if let Some(tag) = self.repo.find_by_name(name).await? {
                        tracing::debug!(tag = %name, "Tag created concurrently, using existing row");
                        return Ok(tag);
                    }
                    tracing::debug!(
                        tag = %name,
                        slug = %slug,
                        constraint = %constraint,
                        "Tag slug taken, trying next candidate"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Internal(format!(
            "No free slug for tag '{}' after {} attempts",
            name, MAX_SLUG_ATTEMPTS
        )))
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, AppError> {
        self.repo.find_by_slug(slug).await
    }

    /// Up to [`SUGGESTION_LIMIT`] tags, most used first.
    pub async fn suggestions(&self, query: Option<&str>) -> Result<Vec<TagSuggestion>, AppError> {
        self.repo.suggestions(query, SUGGESTION_LIMIT).await
    }
}
