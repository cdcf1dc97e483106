use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::ApiError;

/// Extract the token from `Authorization: Token <key>` (or `Bearer <key>`).
pub fn require_token(headers: &HeaderMap) -> Result<String, ApiError> {
    optional_token(headers)?.ok_or_else(|| {
        ApiError::unauthorized("Authentication credentials were not provided.")
    })
}

/// Like [`require_token`] but an absent header is not an error.
pub fn optional_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid token header."))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Token") && !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ApiError::unauthorized("Invalid token header."));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::unauthorized(
            "Invalid token header. No credentials provided.",
        ));
    }
    if parts.next().is_some() {
        return Err(ApiError::unauthorized(
            "Invalid token header. Token string should not contain spaces.",
        ));
    }

    Ok(Some(token.to_string()))
}
