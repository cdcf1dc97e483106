use sqlx::{Sqlite, SqlitePool, Transaction};

use super::error::ServiceError;
use crate::routes::models::Wardrobe;

pub async fn list_wardrobes(pool: &SqlitePool, user_id: i64) -> Result<Vec<Wardrobe>, ServiceError> {
    let wardrobes = sqlx::query_as::<_, Wardrobe>(
        r#"
        SELECT id, user_id AS user, created_at
        FROM wardrobes
        WHERE user_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(wardrobes)
}

pub async fn create_wardrobe(pool: &SqlitePool, user_id: i64) -> Result<Wardrobe, ServiceError> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM wardrobes WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::bad_request("You already have a wardrobe."));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query("INSERT INTO wardrobes (user_id, created_at) VALUES (?, ?)")
        .bind(user_id)
        .bind(&now)
        .execute(pool)
        .await;

    let id = match result {
        Ok(done) => done.last_insert_rowid(),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(ServiceError::bad_request("You already have a wardrobe."));
        }
        Err(err) => return Err(err.into()),
    };

    Ok(Wardrobe {
        id,
        user: user_id,
        created_at: now,
    })
}

/// Id of the user's wardrobe, creating it when the account predates it.
pub async fn ensure_wardrobe(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
) -> Result<i64, ServiceError> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM wardrobes WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query("INSERT INTO wardrobes (user_id, created_at) VALUES (?, ?)")
        .bind(user_id)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&mut **tx)
        .await?
        .last_insert_rowid();

    tracing::debug!(user_id, wardrobe_id = id, "created missing wardrobe");
    Ok(id)
}
