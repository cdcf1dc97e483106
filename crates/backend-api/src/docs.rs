use axum::Json;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::wardrobes::list_wardrobes,
        crate::routes::wardrobes::create_wardrobe,
        crate::routes::listings::list_listings,
        crate::routes::listings::create_listing,
        crate::routes::listings::get_listing,
        crate::routes::listings::delete_listing,
        crate::routes::listings::list_public_listings,
        crate::routes::listings::list_nearby_listings,
        crate::routes::messages::send_message,
        crate::routes::messages::inbox,
        crate::routes::messages::update_message
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::auth::RegisterRequest,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::UserResponse,
            crate::routes::auth::AuthResponse,
            crate::routes::models::Condition,
            crate::routes::models::Category,
            crate::routes::models::Listing,
            crate::routes::models::CreateListingRequest,
            crate::routes::models::Wardrobe,
            crate::routes::models::ListingSummary,
            crate::routes::models::Message,
            crate::routes::models::CreateMessageRequest,
            crate::routes::models::UpdateMessageRequest
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Registration, login and the current user"),
        (name = "Wardrobes", description = "Per-user wardrobe"),
        (name = "Listings", description = "Wardrobe items, public browsing and nearby search"),
        (name = "Messages", description = "Messages about listings and the inbox")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        // Value is `Token <key>`; `Bearer <key>` is accepted too.
        let scheme = SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
            "Authorization",
            "Token <key>",
        )));
        components
            .security_schemes
            .insert("tokenAuth".to_string(), scheme);
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
