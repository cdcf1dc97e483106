//! On-disk storage for listing images.
//!
//! Files live under `<root>/listings/` and are referenced from the database
//! by their path relative to `root` (`listings/<file>`). The HTTP layer serves
//! `root` under `url_prefix`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use swapshop_config::MediaConfig;
use thiserror::Error;
use tracing::{debug, warn};

const LISTING_DIR: &str = "listings";
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const MAX_STEM_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("image: unsupported file type {0:?}; allowed: jpg, jpeg, png, gif, webp")]
    UnsupportedType(String),
    #[error("image: file exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },
    #[error("media storage error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
    max_upload_bytes: usize,
}

impl MediaStore {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: config.root.clone(),
            url_prefix: config.url_prefix.trim_end_matches('/').to_string(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Write an uploaded image and return its stored relative path.
    pub async fn save_listing_image(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        if bytes.len() > self.max_upload_bytes {
            return Err(MediaError::TooLarge {
                limit: self.max_upload_bytes,
            });
        }

        let file_name = unique_file_name(original_name)?;
        let dir = self.root.join(LISTING_DIR);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        let relative = format!("{LISTING_DIR}/{file_name}");
        debug!(path = %relative, size = bytes.len(), "stored listing image");
        Ok(relative)
    }

    pub fn public_url(&self, relative: &str) -> String {
        format!("{}/{}", self.url_prefix, relative.trim_start_matches('/'))
    }

    /// Delete a stored file. Missing files are not an error.
    pub async fn remove(&self, relative: &str) -> Result<(), MediaError> {
        let Some(path) = self.resolve(relative) else {
            warn!(path = relative, "refusing to remove media outside the store");
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        let escapes = relative.components().any(|component| {
            !matches!(component, std::path::Component::Normal(_))
        });
        (!escapes).then(|| self.root.join(relative))
    }
}

fn unique_file_name(original_name: &str) -> Result<String, MediaError> {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    let (stem, extension) = match base.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext.to_ascii_lowercase()),
        None => return Err(MediaError::UnsupportedType(base.to_string())),
    };

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(MediaError::UnsupportedType(extension));
    }

    let mut stem: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(MAX_STEM_LEN)
        .collect();
    if stem.is_empty() {
        stem.push_str("image");
    }

    Ok(format!("{stem}_{}.{extension}", cuid2::create_id()))
}
