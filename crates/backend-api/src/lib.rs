//! HTTP surface of the Swapshop backend: axum router, handlers, services and
//! media storage.

mod docs;
mod error;
mod state;
mod util;

pub mod media;
pub mod routes;
pub mod services;

pub use docs::ApiDoc;
pub use error::{ApiError, ErrorResponse};
pub use media::{MediaError, MediaStore};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Room for the non-file form fields on top of the image itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let media_root = state.media().root().to_path_buf();
    let media_prefix = state.media().url_prefix().to_string();
    let body_limit = state
        .media()
        .max_upload_bytes()
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/docs/openapi.json", get(docs::openapi_json))
        // Auth routes
        .route("/auth/register/", post(routes::auth::register))
        .route("/auth/login/", post(routes::auth::login))
        .route("/auth/me/", get(routes::auth::me))
        // Wardrobe routes
        .route(
            "/wardrobes/",
            get(routes::wardrobes::list_wardrobes).post(routes::wardrobes::create_wardrobe),
        )
        // Listing routes
        .route(
            "/listings/",
            get(routes::listings::list_listings).post(routes::listings::create_listing),
        )
        .route(
            "/listings/:listing_id/",
            get(routes::listings::get_listing).delete(routes::listings::delete_listing),
        )
        .route(
            "/public-listings/",
            get(routes::listings::list_public_listings),
        )
        .route(
            "/nearby-listings/",
            get(routes::listings::list_nearby_listings),
        )
        // Message routes
        .route("/messages/", post(routes::messages::send_message))
        .route(
            "/messages/:message_id/",
            patch(routes::messages::update_message),
        )
        .route("/inbox/", get(routes::messages::inbox))
        .nest_service(&media_prefix, ServeDir::new(media_root))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
