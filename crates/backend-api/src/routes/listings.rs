use axum::{
    extract::{
        rejection::QueryRejection, FromRequest, Multipart, Path, Query, Request, State,
    },
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use bytes::Bytes;

use crate::{
    routes::models::{CreateListingRequest, Listing, NearbyQuery},
    services::{geo::GeoPoint, listing as listing_service, listing::NewListing},
    util::{optional_token, require_token},
    ApiError, AppState,
};

/// Image part of a multipart submission.
struct Upload {
    file_name: String,
    bytes: Bytes,
}

#[utoipa::path(
    get,
    path = "/listings/",
    tag = "Listings",
    security(("tokenAuth" = [])),
    responses(
        (status = 200, description = "The caller's listings, newest first", body = [Listing]),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_listings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let token = require_token(&headers)?;
    let user = state.authenticate(&token).await?;

    let listings = listing_service::list_listings(&state.db_pool(), state.media(), user.id).await?;
    Ok(Json(listings))
}

#[utoipa::path(
    post,
    path = "/listings/",
    tag = "Listings",
    security(("tokenAuth" = [])),
    request_body(
        content = CreateListingRequest,
        description = "JSON, or multipart/form-data with the same fields plus an optional `image` file"
    ),
    responses(
        (status = 201, description = "Listing created", body = Listing),
        (status = 400, description = "Invalid listing", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 413, description = "Image too large", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> Result<(StatusCode, Json<Listing>), ApiError> {
    let token = require_token(&headers)?;
    let user = state.authenticate(&token).await?;

    let (req, upload) = if is_multipart(&headers) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        read_listing_form(multipart).await?
    } else {
        let Json(req) = Json::<CreateListingRequest>::from_request(request, &state).await?;
        (req, None)
    };

    let new = NewListing::try_from(req)?;

    let image = match upload {
        Some(upload) => Some(
            state
                .media()
                .save_listing_image(&upload.file_name, &upload.bytes)
                .await?,
        ),
        None => None,
    };

    let result = listing_service::create_listing(
        &state.db_pool(),
        state.media(),
        user.id,
        new,
        image.clone(),
    )
    .await;

    match result {
        Ok(listing) => Ok((StatusCode::CREATED, Json(listing))),
        Err(err) => {
            if let Some(path) = image {
                if let Err(cleanup) = state.media().remove(&path).await {
                    tracing::warn!(error = %cleanup, "failed to remove orphaned upload");
                }
            }
            Err(err.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/listings/{listing_id}/",
    tag = "Listings",
    params(
        ("listing_id" = i64, Path, description = "Listing id")
    ),
    responses(
        (status = 200, description = "Listing", body = Listing),
        (status = 401, description = "Invalid token", body = crate::error::ErrorResponse),
        (status = 404, description = "Listing not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Listing>, ApiError> {
    let viewer = state.authenticate_optional(optional_token(&headers)?).await?;

    let listing = listing_service::get_listing(
        &state.db_pool(),
        state.media(),
        listing_id,
        viewer.map(|user| user.id),
    )
    .await?;
    Ok(Json(listing))
}

#[utoipa::path(
    delete,
    path = "/listings/{listing_id}/",
    tag = "Listings",
    security(("tokenAuth" = [])),
    params(
        ("listing_id" = i64, Path, description = "Listing id")
    ),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Listing not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = require_token(&headers)?;
    let user = state.authenticate(&token).await?;

    listing_service::delete_listing(&state.db_pool(), state.media(), user.id, listing_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/public-listings/",
    tag = "Listings",
    responses(
        (status = 200, description = "All public listings, newest first", body = [Listing])
    )
)]
pub async fn list_public_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let listings = listing_service::list_public_listings(&state.db_pool(), state.media()).await?;
    Ok(Json(listings))
}

#[utoipa::path(
    get,
    path = "/nearby-listings/",
    tag = "Listings",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Public listings within the radius, nearest first", body = [Listing]),
        (status = 400, description = "Invalid coordinates or radius", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_nearby_listings(
    State(state): State<AppState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let Query(query) = query?;

    let (Some(lat), Some(lon)) = (query.lat, query.lon) else {
        return Err(ApiError::bad_request(
            "lat and lon query parameters are required.",
        ));
    };
    let center = GeoPoint::new(lon, lat)?;
    let radius = listing_service::nearby_radius(query.radius, state.geo())?;

    let listings =
        listing_service::list_nearby_listings(&state.db_pool(), state.media(), center, radius)
            .await?;
    Ok(Json(listings))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

async fn read_listing_form(
    mut multipart: Multipart,
) -> Result<(CreateListingRequest, Option<Upload>), ApiError> {
    let mut form = CreateListingRequest::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = field.text().await?,
            "description" => form.description = field.text().await?,
            "condition" => form.condition = field.text().await?,
            "category" => form.category = Some(field.text().await?),
            "location" => form.location = Some(field.text().await?),
            "is_public" => form.is_public = parse_form_bool(&field.text().await?)?,
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was picked.
                if !file_name.is_empty() && !bytes.is_empty() {
                    upload = Some(Upload { file_name, bytes });
                }
            }
            _ => {}
        }
    }

    Ok((form, upload))
}

fn parse_form_bool(raw: &str) -> Result<Option<bool>, ApiError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" | "1" | "on" | "yes" => Ok(Some(true)),
        "false" | "0" | "off" | "no" => Ok(Some(false)),
        _ => Err(ApiError::bad_request("is_public: Must be a valid boolean.")),
    }
}
