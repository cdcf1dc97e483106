use sqlx::SqlitePool;
use swapshop_auth::{Authenticator, User};
use swapshop_config::GeoConfig;

use crate::media::MediaStore;
use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    media: MediaStore,
    geo: GeoConfig,
}

impl AppState {
    pub fn new(authenticator: Authenticator, media: MediaStore, geo: GeoConfig) -> Self {
        Self {
            authenticator,
            media,
            geo,
        }
    }

    pub fn db_pool(&self) -> SqlitePool {
        self.authenticator.pool()
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    pub fn geo(&self) -> &GeoConfig {
        &self.geo
    }

    pub async fn authenticate(&self, token: &str) -> Result<User, ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }

    /// Resolve the caller when a token was supplied.
    pub async fn authenticate_optional(&self, token: Option<String>) -> Result<Option<User>, ApiError> {
        match token {
            Some(token) => self.authenticate(&token).await.map(Some),
            None => Ok(None),
        }
    }
}
