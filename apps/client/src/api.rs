use std::path::PathBuf;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub condition: String,
    pub category: String,
    pub image: Option<String>,
    pub location_coords: Option<String>,
    pub eco_impact: f64,
    pub owner_username: String,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingRef {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: i64,
    pub sender_username: String,
    pub listing: ListingRef,
    pub content: String,
    pub created_at: String,
    pub is_read: bool,
}

/// Fields of a new wardrobe item.
#[derive(Debug, Clone)]
pub struct ListingForm {
    pub title: String,
    pub description: String,
    pub condition: String,
    pub category: String,
    pub location: Option<String>,
    pub image: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Token {token}")),
            None => request,
        }
    }

    fn require_token(&self) -> Result<(), ClientError> {
        if self.token.is_some() {
            Ok(())
        } else {
            Err(ClientError::NotLoggedIn)
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.authorize(request).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        debug!(%status, url = %response.url(), "api response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_response(status, &body));
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = json!({ "username": username, "email": email, "password": password });
        self.send(self.client.post(self.url("/auth/register/")).json(&body))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = json!({ "username": username, "password": password });
        self.send(self.client.post(self.url("/auth/login/")).json(&body))
            .await
    }

    pub async fn me(&self) -> Result<UserInfo, ClientError> {
        self.require_token()?;
        self.send(self.client.get(self.url("/auth/me/"))).await
    }

    /// The logged-in user's own listings.
    pub async fn my_listings(&self) -> Result<Vec<Listing>, ClientError> {
        self.require_token()?;
        self.send(self.client.get(self.url("/listings/"))).await
    }

    pub async fn create_listing(&self, form: &ListingForm) -> Result<Listing, ClientError> {
        self.require_token()?;

        let mut multipart = Form::new()
            .text("title", form.title.clone())
            .text("description", form.description.clone())
            .text("condition", form.condition.clone())
            .text("category", form.category.clone());
        if let Some(location) = form.location.as_ref().filter(|l| !l.trim().is_empty()) {
            multipart = multipart.text("location", location.clone());
        }
        if let Some(path) = &form.image {
            let bytes = tokio::fs::read(path).await.map_err(|err| {
                ClientError::Invalid(format!("cannot read image {}: {err}", path.display()))
            })?;
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("image")
                .to_string();
            multipart = multipart.part("image", Part::bytes(bytes).file_name(file_name));
        }

        self.send(self.client.post(self.url("/listings/")).multipart(multipart))
            .await
    }

    pub async fn public_listings(&self) -> Result<Vec<Listing>, ClientError> {
        self.send(self.client.get(self.url("/public-listings/"))).await
    }

    pub async fn nearby_listings(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
    ) -> Result<Vec<Listing>, ClientError> {
        let request = self
            .client
            .get(self.url("/nearby-listings/"))
            .query(&[("lat", lat), ("lon", lon), ("radius", radius_km)]);
        self.send(request).await
    }

    pub async fn send_message(&self, listing_id: i64, content: &str) -> Result<Message, ClientError> {
        self.require_token()?;
        if content.trim().is_empty() {
            return Err(ClientError::Invalid("message content is empty".to_string()));
        }
        let body = json!({ "listing": listing_id, "content": content });
        self.send(self.client.post(self.url("/messages/")).json(&body))
            .await
    }

    pub async fn inbox(&self, unread_only: bool) -> Result<Vec<Message>, ClientError> {
        self.require_token()?;
        let mut request = self.client.get(self.url("/inbox/"));
        if unread_only {
            request = request.query(&[("unread", "true")]);
        }
        self.send(request).await
    }

    pub async fn mark_read(&self, message_id: i64) -> Result<Message, ClientError> {
        self.require_token()?;
        let request = self
            .client
            .patch(self.url(&format!("/messages/{message_id}/")))
            .json(&json!({ "is_read": true }));
        self.send(request).await
    }
}
