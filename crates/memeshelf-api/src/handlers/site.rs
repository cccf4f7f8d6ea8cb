use crate::state::AppState;
use axum::{extract::State, Json};
use memeshelf_core::SiteConfig;
use std::sync::Arc;

/// Site header and title. Needs no caller identity.
#[utoipa::path(
    get,
    path = "/api/v0/site",
    tag = "site",
    responses(
        (status = 200, description = "Site branding", body = SiteConfig)
    )
)]
pub async fn get_site(State(state): State<Arc<AppState>>) -> Json<SiteConfig> {
    Json(state.site.clone())
}
