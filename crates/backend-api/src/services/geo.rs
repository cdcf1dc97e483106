//! Points, great-circle distance, and the bounding box used to pre-filter
//! nearby listings in SQL.

use std::f64::consts::FRAC_PI_2;

use crate::services::error::ServiceError;

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_DEGREE_LATITUDE: f64 = 111.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, ServiceError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ServiceError::bad_request(
                "longitude must be between -180 and 180",
            ));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ServiceError::bad_request(
                "latitude must be between -90 and 90",
            ));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Parse `"lon,lat"`, `"POINT(lon lat)"` or `"SRID=4326;POINT(lon lat)"`.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let invalid = || {
            ServiceError::bad_request(format!(
                "location: expected \"lon,lat\" or \"POINT(lon lat)\", got {raw:?}"
            ))
        };

        let mut text = raw.trim();
        if let Some((prefix, rest)) = text.split_once(';') {
            if !prefix.trim().to_ascii_uppercase().starts_with("SRID=") {
                return Err(invalid());
            }
            text = rest.trim();
        }

        let wkt_body = text
            .get(..5)
            .filter(|keyword| keyword.eq_ignore_ascii_case("POINT"))
            .and_then(|_| text.get(5..));
        let (lon, lat) = if let Some(body) = wkt_body {
            let inner = body
                .trim()
                .strip_prefix('(')
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(invalid)?;
            let mut parts = inner.split_whitespace();
            let lon = parts.next().ok_or_else(invalid)?;
            let lat = parts.next().ok_or_else(invalid)?;
            if parts.next().is_some() {
                return Err(invalid());
            }
            (lon, lat)
        } else {
            let (lon, lat) = text.split_once(',').ok_or_else(invalid)?;
            (lon.trim(), lat.trim())
        };

        let longitude: f64 = lon.parse().map_err(|_| invalid())?;
        let latitude: f64 = lat.parse().map_err(|_| invalid())?;
        Self::new(longitude, latitude)
    }

    pub fn to_coords(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let to_rad = |deg: f64| deg.to_radians();
    let dlat = to_rad(lat2 - lat1);
    let dlon = to_rad(lon2 - lon1);
    let a = (dlat / 2.0).sin().powi(2)
        + to_rad(lat1).cos() * to_rad(lat2).cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    /// `None` when the box spans the antimeridian or a pole; every longitude
    /// then has to be considered.
    pub lon_range: Option<(f64, f64)>,
}

impl BoundingBox {
    /// Box enclosing every point within `radius_km` of `center`, so the SQL
    /// pre-filter never drops a row [`haversine_km`] would accept.
    ///
    /// Latitude uses 111 km per degree, a little under the 111.19 of the
    /// sphere. Longitude uses the exact half-width of a spherical cap,
    /// `asin(sin(d) / cos(lat))` for angular radius `d`.
    pub fn around(center: &GeoPoint, radius_km: f64) -> Self {
        let lat_change = radius_km / KM_PER_DEGREE_LATITUDE;
        let min_lat = (center.latitude - lat_change).max(-90.0);
        let max_lat = (center.latitude + lat_change).min(90.0);

        let angular_radius = radius_km / EARTH_RADIUS_KM;
        let cos_lat = center.latitude.to_radians().cos().abs();
        let lon_ratio = if cos_lat < 1e-6 {
            f64::INFINITY
        } else {
            angular_radius.min(FRAC_PI_2).sin() / cos_lat
        };
        // A ratio of 1 or more means the cap reaches a pole.
        let lon_range = if lon_ratio >= 1.0 || min_lat <= -90.0 || max_lat >= 90.0 {
            None
        } else {
            let lon_change = lon_ratio.asin().to_degrees();
            let min_lon = center.longitude - lon_change;
            let max_lon = center.longitude + lon_change;
            (min_lon >= -180.0 && max_lon <= 180.0).then_some((min_lon, max_lon))
        };

        Self {
            min_lat,
            max_lat,
            lon_range,
        }
    }
}
