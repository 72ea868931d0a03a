//! Customer entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the customers table.
#[derive(Debug, Clone, FromRow)]
pub struct CustomerEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub points: i64,
    pub unlimited: bool,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerEntity> for domain::models::Customer {
    fn from(entity: CustomerEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            points: entity.points,
            unlimited: entity.unlimited,
            revision: entity.revision,
            created_at: entity.created_at,
        }
    }
}
