use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use swapshop_config::GeoConfig;

use super::eco::eco_impact;
use super::error::ServiceError;
use super::geo::{BoundingBox, GeoPoint};
use super::wardrobe::ensure_wardrobe;
use crate::media::MediaStore;
use crate::routes::models::{Category, Condition, CreateListingRequest, Listing, ListingRow};

const MAX_TITLE_CHARS: usize = 200;

const LISTING_SELECT: &str = r#"
    SELECT l.id, l.wardrobe_id, w.user_id AS owner_id, u.username AS owner_username,
           l.title, l.description, l.condition, l.category, l.image,
           l.longitude, l.latitude, l.is_public, l.eco_impact, l.created_at
    FROM listings l
    JOIN wardrobes w ON w.id = l.wardrobe_id
    JOIN users u ON u.id = w.user_id
"#;

/// A validated listing submission.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub condition: Condition,
    pub category: Category,
    pub location: Option<GeoPoint>,
    pub is_public: bool,
}

impl TryFrom<CreateListingRequest> for NewListing {
    type Error = ServiceError;

    fn try_from(req: CreateListingRequest) -> Result<Self, Self::Error> {
        let title = req.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::bad_request("title: This field may not be blank."));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(ServiceError::bad_request(format!(
                "title: Ensure this field has no more than {MAX_TITLE_CHARS} characters."
            )));
        }

        if req.condition.trim().is_empty() {
            return Err(ServiceError::bad_request("condition: This field is required."));
        }
        let condition = req.condition.parse::<Condition>()?;
        let category = match req.category.as_deref().map(str::trim) {
            None | Some("") => Category::default(),
            Some(raw) => raw.parse::<Category>()?,
        };
        let location = match req.location.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(GeoPoint::parse(raw)?),
        };

        Ok(Self {
            title,
            description: req.description.trim().to_string(),
            condition,
            category,
            location,
            is_public: req.is_public.unwrap_or(true),
        })
    }
}

/// Resolve the radius for a nearby query: default when absent, capped at
/// the configured maximum.
pub fn nearby_radius(requested: Option<f64>, geo: &GeoConfig) -> Result<f64, ServiceError> {
    match requested {
        None => Ok(geo.default_radius_km),
        Some(radius) if !radius.is_finite() || radius <= 0.0 => {
            Err(ServiceError::bad_request("radius must be a positive number of kilometres"))
        }
        Some(radius) => Ok(radius.min(geo.max_radius_km)),
    }
}

pub async fn list_listings(
    pool: &SqlitePool,
    media: &MediaStore,
    user_id: i64,
) -> Result<Vec<Listing>, ServiceError> {
    let rows = sqlx::query_as::<_, ListingRow>(&format!(
        "{LISTING_SELECT} WHERE w.user_id = ? ORDER BY l.created_at DESC, l.id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(|row| row.into_listing(media)).collect()
}

pub async fn list_public_listings(
    pool: &SqlitePool,
    media: &MediaStore,
) -> Result<Vec<Listing>, ServiceError> {
    let rows = sqlx::query_as::<_, ListingRow>(&format!(
        "{LISTING_SELECT} WHERE l.is_public = 1 ORDER BY l.created_at DESC, l.id DESC"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(|row| row.into_listing(media)).collect()
}

/// Public listings with a location within `radius_km` of `center`, nearest first.
pub async fn list_nearby_listings(
    pool: &SqlitePool,
    media: &MediaStore,
    center: GeoPoint,
    radius_km: f64,
) -> Result<Vec<Listing>, ServiceError> {
    let bbox = BoundingBox::around(&center, radius_km);

    let mut query = QueryBuilder::<Sqlite>::new(LISTING_SELECT);
    query
        .push(" WHERE l.is_public = 1 AND l.latitude IS NOT NULL AND l.longitude IS NOT NULL")
        .push(" AND l.latitude BETWEEN ")
        .push_bind(bbox.min_lat)
        .push(" AND ")
        .push_bind(bbox.max_lat);
    if let Some((min_lon, max_lon)) = bbox.lon_range {
        query
            .push(" AND l.longitude BETWEEN ")
            .push_bind(min_lon)
            .push(" AND ")
            .push_bind(max_lon);
    }

    let rows = query.build_query_as::<ListingRow>().fetch_all(pool).await?;
    let candidates = rows.len();

    let mut nearby = Vec::new();
    for row in rows {
        let Some(point) = row.location() else {
            continue;
        };
        let distance = center.distance_km(&point);
        if distance <= radius_km {
            let mut listing = row.into_listing(media)?;
            listing.distance = Some(distance);
            nearby.push(listing);
        }
    }
    nearby.sort_by(|a, b| {
        a.distance
            .unwrap_or_default()
            .total_cmp(&b.distance.unwrap_or_default())
    });

    tracing::debug!(candidates, matched = nearby.len(), radius_km, "nearby listings query");
    Ok(nearby)
}

/// A listing the viewer may see: public, or owned by `viewer_id`.
pub async fn find_visible_listing(
    pool: &SqlitePool,
    listing_id: i64,
    viewer_id: Option<i64>,
) -> Result<Option<ListingRow>, ServiceError> {
    let row = sqlx::query_as::<_, ListingRow>(&format!("{LISTING_SELECT} WHERE l.id = ?"))
        .bind(listing_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.filter(|row| row.is_public || Some(row.owner_id) == viewer_id))
}

pub async fn get_listing(
    pool: &SqlitePool,
    media: &MediaStore,
    listing_id: i64,
    viewer_id: Option<i64>,
) -> Result<Listing, ServiceError> {
    find_visible_listing(pool, listing_id, viewer_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Listing not found"))?
        .into_listing(media)
}

pub async fn create_listing(
    pool: &SqlitePool,
    media: &MediaStore,
    user_id: i64,
    new: NewListing,
    image: Option<String>,
) -> Result<Listing, ServiceError> {
    let now = chrono::Utc::now().to_rfc3339();
    let impact = eco_impact(new.category, new.condition);

    let mut tx = pool.begin().await?;
    let wardrobe_id = ensure_wardrobe(&mut tx, user_id).await?;

    let listing_id = sqlx::query(
        r#"
        INSERT INTO listings (wardrobe_id, title, description, condition, category, image,
                              longitude, latitude, is_public, eco_impact, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(wardrobe_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.condition.as_str())
    .bind(new.category.as_str())
    .bind(&image)
    .bind(new.location.map(|point| point.longitude))
    .bind(new.location.map(|point| point.latitude))
    .bind(new.is_public)
    .bind(impact)
    .bind(&now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    let row = sqlx::query_as::<_, ListingRow>(&format!("{LISTING_SELECT} WHERE l.id = ?"))
        .bind(listing_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(listing_id, user_id, eco_impact = impact, "created listing");
    row.into_listing(media)
}

/// Remove one of the user's listings together with its stored image.
pub async fn delete_listing(
    pool: &SqlitePool,
    media: &MediaStore,
    user_id: i64,
    listing_id: i64,
) -> Result<(), ServiceError> {
    let image = sqlx::query_scalar::<_, Option<String>>(
        r#"
        SELECT l.image FROM listings l
        JOIN wardrobes w ON w.id = l.wardrobe_id
        WHERE l.id = ? AND w.user_id = ?
        "#,
    )
    .bind(listing_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ServiceError::not_found("Listing not found"))?;

    sqlx::query("DELETE FROM listings WHERE id = ?")
        .bind(listing_id)
        .execute(pool)
        .await?;

    if let Some(path) = image {
        if let Err(err) = media.remove(&path).await {
            tracing::warn!(listing_id, error = %err, "failed to remove listing image");
        }
    }

    tracing::info!(listing_id, user_id, "deleted listing");
    Ok(())
}
