use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::{
    routes::models::{CreateMessageRequest, InboxQuery, Message, UpdateMessageRequest},
    services::message as message_service,
    util::require_token,
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/messages/",
    tag = "Messages",
    security(("tokenAuth" = [])),
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message sent to the listing owner", body = Message),
        (status = 400, description = "Invalid message", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let token = require_token(&headers)?;
    let user = state.authenticate(&token).await?;
    let Json(req) = payload?;

    let message =
        message_service::send_message(&state.db_pool(), user.id, req.listing, &req.content)
            .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[utoipa::path(
    get,
    path = "/inbox/",
    tag = "Messages",
    security(("tokenAuth" = [])),
    params(InboxQuery),
    responses(
        (status = 200, description = "Messages received by the caller, newest first", body = [Message]),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn inbox(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<InboxQuery>, QueryRejection>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let token = require_token(&headers)?;
    let user = state.authenticate(&token).await?;
    let Query(query) = query?;

    let messages =
        message_service::inbox(&state.db_pool(), user.id, query.unread.unwrap_or(false)).await?;
    Ok(Json(messages))
}

#[utoipa::path(
    patch,
    path = "/messages/{message_id}/",
    tag = "Messages",
    security(("tokenAuth" = [])),
    params(
        ("message_id" = i64, Path, description = "Message id")
    ),
    request_body = UpdateMessageRequest,
    responses(
        (status = 200, description = "Updated message", body = Message),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Message not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    headers: HeaderMap,
    payload: Result<Json<UpdateMessageRequest>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let token = require_token(&headers)?;
    let user = state.authenticate(&token).await?;
    let Json(req) = payload?;

    let message =
        message_service::set_read(&state.db_pool(), user.id, message_id, req.is_read).await?;
    Ok(Json(message))
}
