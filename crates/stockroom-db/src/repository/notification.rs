//! # Notification Repository
//!
//! Outbox of event records written after a document commits.
//!
//! ## Delivery Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Fire and Forget                                      │
//! │                                                                         │
//! │  sale committed ──► notify(pool, Notification::for_sale(..))           │
//! │                          │                                              │
//! │                          ├── Ok  → row in notifications (is_read = 0)  │
//! │                          └── Err → warn!, dropped, save still Ok       │
//! │                                                                         │
//! │  Never inside the document transaction. Never retried.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use super::sortable_timestamp;
use crate::error::{DbError, DbResult};
use stockroom_core::{Notification, NotificationKind};

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: String,
    title: String,
    body: String,
    kind: NotificationKind,
    amount_cents: i64,
    metadata: String,
    created_at: DateTime<Utc>,
    is_read: bool,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            title: row.title,
            body: row.body,
            kind: row.kind,
            amount_cents: row.amount_cents,
            // Unparseable metadata reads as null
            metadata: serde_json::from_str(&row.metadata).unwrap_or_default(),
            created_at: row.created_at,
            is_read: row.is_read,
        }
    }
}

/// Repository for notification records.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Persists a notification, assigning an id when empty.
    pub async fn record(&self, mut notification: Notification) -> DbResult<Notification> {
        if notification.id.is_empty() {
            notification.id = Uuid::new_v4().to_string();
        }

        debug!(id = %notification.id, kind = ?notification.kind, "Recording notification");

        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, title, body, kind, amount_cents, metadata, created_at, is_read
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&notification.id)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.kind)
        .bind(notification.amount_cents)
        .bind(notification.metadata.to_string())
        .bind(sortable_timestamp(notification.created_at))
        .bind(notification.is_read)
        .execute(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Unread notifications, newest first.
    pub async fn list_unread(&self, limit: u32) -> DbResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT * FROM notifications
            WHERE is_read = 0
            ORDER BY created_at DESC, id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    pub async fn unread_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE is_read = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn mark_read(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Notification", id));
        }
        Ok(())
    }
}

/// Records a notification, logging instead of failing.
pub(crate) async fn notify(pool: &SqlitePool, notification: Notification) {
    let kind = notification.kind;
    if let Err(e) = NotificationRepository::new(pool.clone()).record(notification).await {
        warn!(kind = ?kind, error = %e, "Failed to record notification");
    }
}
