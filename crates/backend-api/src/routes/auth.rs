use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use swapshop_auth::User;
use utoipa::ToSchema;

use crate::{util::require_token, ApiError, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            username: value.username,
            email: value.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/auth/register/",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input or username taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(req) = payload?;

    let (user, token) = state
        .authenticator()
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login/",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token for the account", body = AuthResponse),
        (status = 400, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(req) = payload?;

    let (user, token) = state
        .authenticator()
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

#[utoipa::path(
    get,
    path = "/auth/me/",
    tag = "Auth",
    security(("tokenAuth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let token = require_token(&headers)?;
    let user = state.authenticate(&token).await?;
    Ok(Json(user.into()))
}
