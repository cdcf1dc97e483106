use anyhow::{Context, Result};
use sqlx::SqlitePool;
use swapshop_auth::Authenticator;
use swapshop_backend_api::{AppState, MediaStore};
use swapshop_config::AppConfig;
use swapshop_database::initialize_database;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub media: MediaStore,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(db_pool.clone(), config.auth.clone());

        let media = MediaStore::new(&config.media);
        tokio::fs::create_dir_all(media.root())
            .await
            .with_context(|| {
                format!("failed to create media root {}", media.root().display())
            })?;

        info!(media_root = %media.root().display(), "backend services ready");

        Ok(Self {
            db_pool,
            authenticator,
            media,
        })
    }

    /// Shared state for the HTTP router.
    pub fn app_state(&self, config: &AppConfig) -> AppState {
        AppState::new(
            self.authenticator.clone(),
            self.media.clone(),
            config.geo.clone(),
        )
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
