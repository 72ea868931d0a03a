//! Message repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::MessageEntity;
use crate::metrics::QueryTimer;

/// Repository for customer messages.
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Creates a new MessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List messages newest first, optionally for a single customer.
    pub async fn list(&self, customer_id: Option<Uuid>) -> Result<Vec<MessageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_messages");
        let result = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT id, customer_id, customer_name, message, read, created_at
            FROM messages
            WHERE ($1::UUID IS NULL OR customer_id = $1)
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Insert one message row per recipient in a single statement.
    pub async fn create_many(
        &self,
        recipients: &[(Uuid, String)],
        message: &str,
    ) -> Result<Vec<MessageEntity>, sqlx::Error> {
        if recipients.is_empty() {
            return Ok(Vec::new());
        }

        let (ids, names): (Vec<Uuid>, Vec<String>) = recipients.iter().cloned().unzip();
        let timer = QueryTimer::new("create_messages");
        let result = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (customer_id, customer_name, message)
            SELECT r.customer_id, r.customer_name, $3
            FROM UNNEST($1::UUID[], $2::TEXT[]) AS r(customer_id, customer_name)
            RETURNING id, customer_id, customer_name, message, read, created_at
            "#,
        )
        .bind(&ids)
        .bind(&names)
        .bind(message)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Set the read flag. Returns None if the message does not exist.
    pub async fn set_read(&self, id: Uuid, read: bool) -> Result<Option<MessageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_message_read");
        let result = sqlx::query_as::<_, MessageEntity>(
            r#"
            UPDATE messages
            SET read = $2
            WHERE id = $1
            RETURNING id, customer_id, customer_name, message, read, created_at
            "#,
        )
        .bind(id)
        .bind(read)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }
}
