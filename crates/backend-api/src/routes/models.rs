use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::media::MediaStore;
use crate::services::error::ServiceError;
use crate::services::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    LikeNew,
    Good,
    Fair,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::LikeNew => "like_new",
            Condition::Good => "good",
            Condition::Fair => "fair",
        }
    }
}

impl FromStr for Condition {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "new" => Ok(Condition::New),
            "like_new" => Ok(Condition::LikeNew),
            "good" => Ok(Condition::Good),
            "fair" => Ok(Condition::Fair),
            other => Err(ServiceError::bad_request(format!(
                "condition: \"{other}\" is not a valid choice."
            ))),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cotton,
    Synthetic,
    #[default]
    Mixed,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cotton => "cotton",
            Category::Synthetic => "synthetic",
            Category::Mixed => "mixed",
        }
    }
}

impl FromStr for Category {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "cotton" => Ok(Category::Cotton),
            "synthetic" => Ok(Category::Synthetic),
            "mixed" => Ok(Category::Mixed),
            other => Err(ServiceError::bad_request(format!(
                "category: \"{other}\" is not a valid choice."
            ))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ListingRow {
    pub id: i64,
    pub wardrobe_id: i64,
    pub owner_id: i64,
    pub owner_username: String,
    pub title: String,
    pub description: String,
    pub condition: String,
    pub category: String,
    pub image: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub is_public: bool,
    pub eco_impact: f64,
    pub created_at: String,
}

impl ListingRow {
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.longitude, self.latitude) {
            (Some(longitude), Some(latitude)) => Some(GeoPoint {
                longitude,
                latitude,
            }),
            _ => None,
        }
    }

    pub fn into_listing(self, media: &MediaStore) -> Result<Listing, ServiceError> {
        let location_coords = self.location().map(|point| point.to_coords());
        let condition = self
            .condition
            .parse()
            .map_err(|_| ServiceError::internal(format!("stored condition {:?}", self.condition)))?;
        let category = self
            .category
            .parse()
            .map_err(|_| ServiceError::internal(format!("stored category {:?}", self.category)))?;

        Ok(Listing {
            id: self.id,
            wardrobe: self.wardrobe_id,
            owner_username: self.owner_username,
            title: self.title,
            description: self.description,
            condition,
            category,
            image: self.image.map(|path| media.public_url(&path)),
            location_coords,
            is_public: self.is_public,
            eco_impact: self.eco_impact,
            created_at: self.created_at,
            distance: None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Listing {
    pub id: i64,
    pub wardrobe: i64,
    pub owner_username: String,
    pub title: String,
    pub description: String,
    pub condition: Condition,
    pub category: Category,
    /// Public URL path of the uploaded image.
    pub image: Option<String>,
    /// `"lon,lat"`
    pub location_coords: Option<String>,
    pub is_public: bool,
    /// Estimated kg CO₂ saved by swapping instead of buying new.
    pub eco_impact: f64,
    pub created_at: String,
    /// Kilometres from the query point; nearby results only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance: Option<f64>,
}

/// JSON form of a listing submission. Multipart uploads carry the same
/// fields plus an optional `image` file.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    /// One of `new`, `like_new`, `good`, `fair`.
    pub condition: String,
    pub category: Option<String>,
    /// `"lon,lat"` or `"POINT(lon lat)"`
    pub location: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NearbyQuery {
    /// Latitude of the query point
    pub lat: Option<f64>,
    /// Longitude of the query point
    pub lon: Option<f64>,
    /// Radius in kilometres
    pub radius: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Wardrobe {
    pub id: i64,
    pub user: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingSummary {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: i64,
    pub sender_username: String,
    pub listing_id: i64,
    pub listing_title: String,
    pub content: String,
    pub created_at: String,
    pub is_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub id: i64,
    pub sender_username: String,
    pub listing: ListingSummary,
    pub content: String,
    pub created_at: String,
    pub is_read: bool,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            sender_username: row.sender_username,
            listing: ListingSummary {
                id: row.listing_id,
                title: row.listing_title,
            },
            content: row.content,
            created_at: row.created_at,
            is_read: row.is_read,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMessageRequest {
    pub listing: i64,
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMessageRequest {
    pub is_read: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct InboxQuery {
    /// Only return unread messages
    #[serde(default)]
    pub unread: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_round_trips_through_wire_names() {
        for condition in [Condition::New, Condition::LikeNew, Condition::Good, Condition::Fair] {
            let parsed: Condition = condition.as_str().parse().unwrap();
            assert_eq!(parsed, condition);
        }
        assert_eq!(
            serde_json::to_string(&Condition::LikeNew).unwrap(),
            "\"like_new\""
        );
    }

    #[test]
    fn unknown_choice_is_a_bad_request() {
        let err = "worn".parse::<Condition>().unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(ref msg) if msg.contains("\"worn\"")));
        assert!("wool".parse::<Category>().is_err());
    }

    #[test]
    fn listing_omits_distance_unless_present() {
        let listing = Listing {
            id: 1,
            wardrobe: 1,
            owner_username: "ann".to_string(),
            title: "Coat".to_string(),
            description: String::new(),
            condition: Condition::Good,
            category: Category::Mixed,
            image: None,
            location_coords: Some("13.4,52.5".to_string()),
            is_public: true,
            eco_impact: 4.0,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            distance: None,
        };

        let value = serde_json::to_value(&listing).unwrap();
        assert!(value.get("distance").is_none());
        assert_eq!(value["condition"], "good");
    }
}
