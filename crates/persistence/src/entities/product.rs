//! Product entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::product::ProductStatus;
use sqlx::FromRow;

/// Database enum for product_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "product_status", rename_all = "snake_case")]
pub enum ProductStatusDb {
    InStock,
    OutOfStock,
    ComingSoon,
}

impl From<ProductStatusDb> for ProductStatus {
    fn from(db_status: ProductStatusDb) -> Self {
        match db_status {
            ProductStatusDb::InStock => ProductStatus::InStock,
            ProductStatusDb::OutOfStock => ProductStatus::OutOfStock,
            ProductStatusDb::ComingSoon => ProductStatus::ComingSoon,
        }
    }
}

impl From<ProductStatus> for ProductStatusDb {
    fn from(status: ProductStatus) -> Self {
        match status {
            ProductStatus::InStock => ProductStatusDb::InStock,
            ProductStatus::OutOfStock => ProductStatusDb::OutOfStock,
            ProductStatus::ComingSoon => ProductStatusDb::ComingSoon,
        }
    }
}

/// Database row mapping for the products table.
#[derive(Debug, Clone, FromRow)]
pub struct ProductEntity {
    pub sku: String,
    pub name: String,
    pub price: i64,
    pub description: String,
    pub status: ProductStatusDb,
    pub image_url: String,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductEntity> for domain::models::Product {
    fn from(entity: ProductEntity) -> Self {
        Self {
            sku: entity.sku,
            name: entity.name,
            price: entity.price,
            description: entity.description,
            status: entity.status.into(),
            image_url: Some(entity.image_url).filter(|url| !url.is_empty()),
            revision: Some(entity.revision),
        }
    }
}
