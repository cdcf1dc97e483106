//! The logged-in user's token, kept in a small JSON file between runs.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub const SESSION_ENV: &str = "SWAPSHOP_SESSION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.swapshop/session.json`, or the working directory when no home
    /// directory is known.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".swapshop")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>, ClientError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(ClientError::Session(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )))
            }
        };

        serde_json::from_str(&contents).map(Some).map_err(|err| {
            ClientError::Session(format!("failed to parse {}: {err}", self.path.display()))
        })
    }

    pub fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    ClientError::Session(format!("failed to create {}: {err}", parent.display()))
                })?;
            }
        }

        let contents = serde_json::to_string_pretty(session)
            .map_err(|err| ClientError::Session(err.to_string()))?;
        fs::write(&self.path, contents).map_err(|err| {
            ClientError::Session(format!("failed to write {}: {err}", self.path.display()))
        })
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ClientError::Session(format!(
                "failed to remove {}: {err}",
                self.path.display()
            ))),
        }
    }
}
