use sqlx::SqlitePool;

use super::error::ServiceError;
use super::listing::find_visible_listing;
use crate::routes::models::{Message, MessageRow};

const MAX_CONTENT_CHARS: usize = 2000;

const MESSAGE_SELECT: &str = r#"
    SELECT m.id, s.username AS sender_username, l.id AS listing_id, l.title AS listing_title,
           m.content, m.created_at, m.is_read
    FROM messages m
    JOIN users s ON s.id = m.sender_id
    JOIN listings l ON l.id = m.listing_id
"#;

/// Send a message about a listing to its owner.
pub async fn send_message(
    pool: &SqlitePool,
    sender_id: i64,
    listing_id: i64,
    content: &str,
) -> Result<Message, ServiceError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ServiceError::bad_request("content: This field may not be blank."));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ServiceError::bad_request(format!(
            "content: Ensure this field has no more than {MAX_CONTENT_CHARS} characters."
        )));
    }

    let listing = find_visible_listing(pool, listing_id, Some(sender_id))
        .await?
        .ok_or_else(|| ServiceError::bad_request("listing: Listing not found."))?;

    if listing.owner_id == sender_id {
        return Err(ServiceError::bad_request(
            "You cannot send a message about your own listing.",
        ));
    }

    let message_id = sqlx::query(
        r#"
        INSERT INTO messages (sender_id, recipient_id, listing_id, content, is_read, created_at)
        VALUES (?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(sender_id)
    .bind(listing.owner_id)
    .bind(listing.id)
    .bind(content)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(pool)
    .await?
    .last_insert_rowid();

    tracing::info!(
        message_id,
        listing_id,
        sender_id,
        recipient_id = listing.owner_id,
        "message sent"
    );

    fetch_message(pool, message_id).await
}

/// Messages received by the user, newest first.
pub async fn inbox(
    pool: &SqlitePool,
    recipient_id: i64,
    unread_only: bool,
) -> Result<Vec<Message>, ServiceError> {
    let mut sql = format!("{MESSAGE_SELECT} WHERE m.recipient_id = ?");
    if unread_only {
        sql.push_str(" AND m.is_read = 0");
    }
    sql.push_str(" ORDER BY m.created_at DESC, m.id DESC");

    let rows = sqlx::query_as::<_, MessageRow>(&sql)
        .bind(recipient_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Message::from).collect())
}

/// Only the recipient may change the read flag; anyone else gets not-found.
pub async fn set_read(
    pool: &SqlitePool,
    recipient_id: i64,
    message_id: i64,
    is_read: bool,
) -> Result<Message, ServiceError> {
    let updated = sqlx::query("UPDATE messages SET is_read = ? WHERE id = ? AND recipient_id = ?")
        .bind(is_read)
        .bind(message_id)
        .bind(recipient_id)
        .execute(pool)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(ServiceError::not_found("Message not found"));
    }

    fetch_message(pool, message_id).await
}

async fn fetch_message(pool: &SqlitePool, message_id: i64) -> Result<Message, ServiceError> {
    let row = sqlx::query_as::<_, MessageRow>(&format!("{MESSAGE_SELECT} WHERE m.id = ?"))
        .bind(message_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Message not found"))?;

    Ok(row.into())
}
