use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// A tag. `name` keeps the casing of the first insert; `slug` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Tag with its usage count, for autocomplete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct TagSuggestion {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub count: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTagsRequest {
    /// Free text, tags separated by `,`, `#` or `;`
    #[serde(default)]
    pub tags: String,
}
