//! Account registration, password login and token lookup.
//!
//! Every user owns exactly one opaque token. Login hands back the existing
//! token when there is one, so several clients logged in as the same user
//! share it.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::Utc;
use rand::RngCore;
use serde::Serialize;
use sqlx::{FromRow, Row, Sqlite, SqlitePool, Transaction};
use swapshop_config::AuthConfig;
use thiserror::Error;
use tracing::{debug, info};

pub mod validation;

const TOKEN_BYTES: usize = 20;

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    min_password_length: usize,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("a user with that username already exists")]
    UserExists,
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("Invalid token.")]
    InvalidToken,
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: AuthConfig) -> Self {
        Self {
            pool,
            min_password_length: config.min_password_length,
        }
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    /// Create the account together with its wardrobe and token.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AuthError> {
        let username = username.trim();
        let email = email.trim();
        validation::validate_username(username)?;
        validation::validate_email(email)?;
        validation::validate_password(password, self.min_password_length)?;

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            return Err(AuthError::UserExists);
        }

        let now = Utc::now().to_rfc3339();
        let password_hash = hash_password(password)?;

        let user_id = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?
        .last_insert_rowid();

        sqlx::query("INSERT INTO wardrobes (user_id, created_at) VALUES (?, ?)")
            .bind(user_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        let token = insert_token(&mut tx, user_id).await?;

        tx.commit().await?;

        info!(user_id, username, "registered user");

        Ok((
            User {
                id: user_id,
                username: username.to_owned(),
                email: email.to_owned(),
            },
            token,
        ))
    }

    /// Check the password and return the user's token, creating it on first use.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), AuthError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash FROM users WHERE username = ?",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidCredentials);
        };

        let secret: String = row.try_get("password_hash")?;
        let stored_hash = PasswordHash::new(&secret)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &stored_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let user = User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
        };

        let mut tx = self.pool.begin().await?;
        let existing: Option<String> =
            sqlx::query_scalar("SELECT key FROM auth_tokens WHERE user_id = ?")
                .bind(user.id)
                .fetch_optional(&mut *tx)
                .await?;

        let token = match existing {
            Some(key) => key,
            None => insert_token(&mut tx, user.id).await?,
        };
        tx.commit().await?;

        debug!(user_id = user.id, "password login succeeded");
        Ok((user, token))
    }

    pub async fn authenticate_token(&self, token: &str) -> Result<User, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.key = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::InvalidToken)
    }
}

async fn insert_token(tx: &mut Transaction<'_, Sqlite>, user_id: i64) -> Result<String, AuthError> {
    let token = generate_token();
    sqlx::query("INSERT INTO auth_tokens (key, user_id, created_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut **tx)
        .await?;
    Ok(token)
}

fn map_unique_violation(error: sqlx::Error) -> AuthError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::UserExists,
        _ => AuthError::Database(error),
    }
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Forty lowercase hex characters.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
