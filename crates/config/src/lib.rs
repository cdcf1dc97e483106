use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "swapshop.toml",
    "config/swapshop.toml",
    "crates/config/swapshop.toml",
    "../swapshop.toml",
    "../config/swapshop.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub geo: GeoConfig,
}

impl AppConfig {
    /// Reject values the backend cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.http.port == 0 {
            bail!("http.port must be greater than zero");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be greater than zero");
        }
        if self.auth.min_password_length == 0 {
            bail!("auth.min_password_length must be greater than zero");
        }
        if self.media.max_upload_bytes == 0 {
            bail!("media.max_upload_bytes must be greater than zero");
        }
        if !self.media.url_prefix.starts_with('/') {
            bail!("media.url_prefix must start with '/'");
        }
        if self.media.url_prefix.trim_end_matches('/').is_empty() {
            bail!("media.url_prefix must not be the site root");
        }
        self.geo.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://swapshop.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_min_password_length")]
    pub min_password_length: usize,
}

impl AuthConfig {
    const fn default_min_password_length() -> usize {
        1
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_length: Self::default_min_password_length(),
        }
    }
}

/// Where uploaded listing images live and how they are addressed.
///
/// ```
/// use swapshop_config::MediaConfig;
///
/// let media = MediaConfig::default();
/// assert_eq!(media.url_prefix, "/media");
/// assert_eq!(media.max_upload_bytes, 5 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "MediaConfig::default_root")]
    pub root: PathBuf,
    #[serde(default = "MediaConfig::default_url_prefix")]
    pub url_prefix: String,
    #[serde(default = "MediaConfig::default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl MediaConfig {
    fn default_root() -> PathBuf {
        PathBuf::from("media")
    }

    fn default_url_prefix() -> String {
        "/media".to_string()
    }

    const fn default_max_upload_bytes() -> usize {
        5 * 1024 * 1024
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: Self::default_root(),
            url_prefix: Self::default_url_prefix(),
            max_upload_bytes: Self::default_max_upload_bytes(),
        }
    }
}

/// Radius handling for the nearby-listings query, in kilometres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    #[serde(default = "GeoConfig::default_radius")]
    pub default_radius_km: f64,
    #[serde(default = "GeoConfig::default_max_radius")]
    pub max_radius_km: f64,
}

impl GeoConfig {
    const fn default_radius() -> f64 {
        10.0
    }

    const fn default_max_radius() -> f64 {
        500.0
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.default_radius_km > 0.0) {
            bail!("geo.default_radius_km must be positive");
        }
        if !(self.max_radius_km > 0.0) {
            bail!("geo.max_radius_km must be positive");
        }
        if self.default_radius_km > self.max_radius_km {
            bail!("geo.default_radius_km must not exceed geo.max_radius_km");
        }
        Ok(())
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            default_radius_km: Self::default_radius(),
            max_radius_km: Self::default_max_radius(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use swapshop_config::load;
///
/// std::env::remove_var("SWAPSHOP_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let media_root = defaults.media.root.to_string_lossy().into_owned();
    let min_password = i64::try_from(defaults.auth.min_password_length).unwrap_or(i64::MAX);
    let max_upload = i64::try_from(defaults.media.max_upload_bytes).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.min_password_length", min_password)?
        .set_default("media.root", media_root)?
        .set_default("media.url_prefix", defaults.media.url_prefix.clone())?
        .set_default("media.max_upload_bytes", max_upload)?
        .set_default("geo.default_radius_km", defaults.geo.default_radius_km)?
        .set_default("geo.max_radius_km", defaults.geo.max_radius_km)?;

    let environment_overrides = config::Environment::with_prefix("SWAPSHOP").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("SWAPSHOP_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via SWAPSHOP_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    config.validate().context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
