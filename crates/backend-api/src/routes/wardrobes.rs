use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::{
    routes::models::Wardrobe, services::wardrobe as wardrobe_service, util::require_token,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/wardrobes/",
    tag = "Wardrobes",
    security(("tokenAuth" = [])),
    responses(
        (status = 200, description = "The caller's wardrobes", body = [Wardrobe]),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_wardrobes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Wardrobe>>, ApiError> {
    let token = require_token(&headers)?;
    let user = state.authenticate(&token).await?;

    let wardrobes = wardrobe_service::list_wardrobes(&state.db_pool(), user.id).await?;
    Ok(Json(wardrobes))
}

#[utoipa::path(
    post,
    path = "/wardrobes/",
    tag = "Wardrobes",
    security(("tokenAuth" = [])),
    responses(
        (status = 201, description = "Wardrobe created", body = Wardrobe),
        (status = 400, description = "Wardrobe already exists", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_wardrobe(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<Wardrobe>), ApiError> {
    let token = require_token(&headers)?;
    let user = state.authenticate(&token).await?;

    let wardrobe = wardrobe_service::create_wardrobe(&state.db_pool(), user.id).await?;
    Ok((StatusCode::CREATED, Json(wardrobe)))
}
