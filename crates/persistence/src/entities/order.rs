//! Order entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::order::{OrderItem, OrderStatus};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for order_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
pub enum OrderStatusDb {
    Open,
    Completed,
}

impl From<OrderStatusDb> for OrderStatus {
    fn from(db_status: OrderStatusDb) -> Self {
        match db_status {
            OrderStatusDb::Open => OrderStatus::Open,
            OrderStatusDb::Completed => OrderStatus::Completed,
        }
    }
}

impl From<OrderStatus> for OrderStatusDb {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Open => OrderStatusDb::Open,
            OrderStatus::Completed => OrderStatusDb::Completed,
        }
    }
}

/// Database row mapping for the orders table.
#[derive(Debug, Clone, FromRow)]
pub struct OrderEntity {
    pub id: String,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub email: String,
    pub note: String,
    pub admin_note: String,
    pub items: Json<Vec<OrderItem>>,
    pub total: i64,
    pub status: OrderStatusDb,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderEntity> for domain::models::Order {
    fn from(entity: OrderEntity) -> Self {
        Self {
            id: entity.id,
            at: entity.created_at,
            person_name: entity.customer_name,
            customer_id: entity.customer_id,
            email: entity.email,
            note: entity.note,
            admin_note: entity.admin_note,
            items: entity.items.0,
            total: entity.total,
            status: entity.status.into(),
            revision: entity.revision,
        }
    }
}
