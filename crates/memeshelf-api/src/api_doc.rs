//! OpenAPI documentation.
//! Handler annotations carry the full `/api/v0` path; see `crate::constants::API_PREFIX`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::setup::routes::HealthCheckResponse;
use memeshelf_core::{models, SiteConfig};

/// The document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Memeshelf API",
        version = "0.1.0",
        description = "Meme sharing API (v0): uploads with tags and albums, feeds, and comments. Caller identity comes from the X-User-Id and X-User-Elevated headers set by the upstream identity provider."
    ),
    paths(
        // Media
        handlers::media::upload_media,
        handlers::media::get_media,
        handlers::media::download_media_file,
        handlers::media::update_title,
        handlers::media::update_tags,
        handlers::media::delete_media,
        // Comments
        handlers::comments::list_comments,
        handlers::comments::add_comment,
        handlers::comments::delete_comment,
        // Feed
        handlers::feed::get_feed,
        handlers::feed::get_random_feed,
        // Tags
        handlers::tags::resolve_tags,
        handlers::tags::tag_suggestions,
        // Albums
        handlers::albums::list_albums,
        handlers::albums::create_album,
        handlers::albums::delete_album,
        handlers::site::get_site,
    ),
    components(schemas(
        models::Media,
        models::MediaType,
        models::AlbumRef,
        models::FeedItem,
        models::FeedPage,
        models::UpdateTitleRequest,
        models::Tag,
        models::TagSuggestion,
        models::UpdateTagsRequest,
        models::Album,
        models::CreateAlbumRequest,
        models::Comment,
        models::CommentPage,
        models::CreateCommentRequest,
        SiteConfig,
        error::ErrorResponse,
        HealthCheckResponse,
    )),
    tags(
        (name = "media", description = "Upload, read, edit and delete memes"),
        (name = "comments", description = "Comments on media"),
        (name = "feed", description = "Public listings"),
        (name = "tags", description = "Tag resolution and autocomplete"),
        (name = "albums", description = "The caller's albums"),
        (name = "site", description = "Site branding"),
    )
)]
pub struct ApiDoc;
