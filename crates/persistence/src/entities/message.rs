//! Message entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the messages table.
#[derive(Debug, Clone, FromRow)]
pub struct MessageEntity {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MessageEntity> for domain::models::Message {
    fn from(entity: MessageEntity) -> Self {
        Self {
            id: entity.id,
            customer_id: entity.customer_id,
            customer_name: entity.customer_name,
            message: entity.message,
            read: entity.read,
            created_at: entity.created_at,
        }
    }
}
