//! One method per CLI command. Each returns the text to print.

use crate::api::{ApiClient, ListingForm};
use crate::error::ClientError;
use crate::render::{render_inbox, render_listings, render_wardrobe};
use crate::session::{Session, SessionStore};

pub struct App {
    base_url: String,
    store: SessionStore,
}

impl App {
    pub fn new(base_url: impl Into<String>, store: SessionStore) -> Self {
        Self {
            base_url: base_url.into(),
            store,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn anonymous(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone())
    }

    /// Client carrying the stored token, if any.
    fn client(&self) -> Result<(ApiClient, Option<Session>), ClientError> {
        let session = self.store.load()?;
        let client = self
            .anonymous()
            .with_token(session.as_ref().map(|s| s.token.clone()));
        Ok((client, session))
    }

    fn logged_in(&self) -> Result<(ApiClient, Session), ClientError> {
        match self.client()? {
            (client, Some(session)) => Ok((client, session)),
            (_, None) => Err(ClientError::NotLoggedIn),
        }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, ClientError> {
        let auth = self.anonymous().register(username, email, password).await?;
        self.store.save(&Session {
            token: auth.token,
            username: auth.user.username.clone(),
        })?;
        Ok(format!("Registered and logged in as {}.", auth.user.username))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let auth = self.anonymous().login(username, password).await?;
        self.store.save(&Session {
            token: auth.token,
            username: auth.user.username.clone(),
        })?;
        Ok(format!("Logged in as {}.", auth.user.username))
    }

    pub fn logout(&self) -> Result<String, ClientError> {
        self.store.clear()?;
        Ok("Logged out.".to_string())
    }

    pub async fn whoami(&self) -> Result<String, ClientError> {
        let (client, _) = self.logged_in()?;
        let user = client.me().await?;
        if user.email.is_empty() {
            Ok(user.username)
        } else {
            Ok(format!("{} <{}>", user.username, user.email))
        }
    }

    pub async fn wardrobe(&self) -> Result<String, ClientError> {
        let (client, session) = self.logged_in()?;
        let listings = client.my_listings().await?;
        Ok(render_wardrobe(&session.username, &self.base_url, &listings))
    }

    /// Create an item, then show the refreshed wardrobe.
    pub async fn add_to_wardrobe(&self, form: &ListingForm) -> Result<String, ClientError> {
        let (client, session) = self.logged_in()?;
        client.create_listing(form).await?;
        let listings = client.my_listings().await?;
        Ok(render_wardrobe(&session.username, &self.base_url, &listings))
    }

    pub async fn listings(
        &self,
        near: Option<(f64, f64)>,
        radius_km: f64,
    ) -> Result<String, ClientError> {
        let (client, _) = self.client()?;
        let (listings, radius) = match near {
            Some((lat, lon)) => (
                client.nearby_listings(lat, lon, radius_km).await?,
                Some(radius_km),
            ),
            None => (client.public_listings().await?, None),
        };
        Ok(render_listings(&self.base_url, &listings, radius))
    }

    pub async fn message(&self, listing_id: i64, content: &str) -> Result<String, ClientError> {
        let (client, _) = self.logged_in()?;
        client.send_message(listing_id, content).await?;
        Ok("Message sent! Check your inbox.".to_string())
    }

    pub async fn inbox(&self, unread_only: bool) -> Result<String, ClientError> {
        let (client, _) = self.logged_in()?;
        let messages = client.inbox(unread_only).await?;
        Ok(render_inbox(&messages))
    }

    pub async fn mark_read(&self, message_id: i64) -> Result<String, ClientError> {
        let (client, _) = self.logged_in()?;
        let message = client.mark_read(message_id).await?;
        Ok(format!("Marked message #{} as read.", message.id))
    }
}
