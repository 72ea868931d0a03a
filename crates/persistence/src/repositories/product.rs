//! Product repository for database operations.

use domain::models::product::ProductInput;
use sqlx::PgPool;

use crate::entities::{ProductEntity, ProductStatusDb};
use crate::metrics::QueryTimer;
use crate::repositories::SaveOutcome;

/// Repository for the product catalogue.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Creates a new ProductRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all stored products, oldest first.
    pub async fn list(&self) -> Result<Vec<ProductEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_products");
        let result = sqlx::query_as::<_, ProductEntity>(
            r#"
            SELECT sku, name, price, description, status, image_url, revision, created_at, updated_at
            FROM products
            ORDER BY created_at ASC, sku ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Save the whole catalogue.
    ///
    /// Each product is upserted by SKU. Products carrying a revision are only
    /// written if the stored revision still matches; on a mismatch the
    /// transaction is rolled back and [`SaveOutcome::Stale`] is returned.
    /// Stored products missing from `products` are deleted.
    pub async fn save_all(
        &self,
        products: &[ProductInput],
        placeholder_image_url: &str,
    ) -> Result<SaveOutcome, sqlx::Error> {
        let timer = QueryTimer::new("save_products");
        let mut tx = self.pool.begin().await?;
        let mut upserted = 0u64;

        for product in products {
            let image_url = product
                .image_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .unwrap_or(placeholder_image_url);
            let status: ProductStatusDb = product.status.into();

            let rows = match product.revision {
                Some(revision) => {
                    sqlx::query(
                        r#"
                        INSERT INTO products (sku, name, price, description, status, image_url)
                        VALUES ($1, $2, $3, $4, $5, $6)
                        ON CONFLICT (sku) DO UPDATE
                        SET name = EXCLUDED.name,
                            price = EXCLUDED.price,
                            description = EXCLUDED.description,
                            status = EXCLUDED.status,
                            image_url = EXCLUDED.image_url,
                            revision = products.revision + 1,
                            updated_at = NOW()
                        WHERE products.revision = $7
                        "#,
                    )
                    .bind(product.sku.trim())
                    .bind(product.name.trim())
                    .bind(product.price)
                    .bind(&product.description)
                    .bind(status)
                    .bind(image_url)
                    .bind(revision)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected()
                }
                None => {
                    // Unchanged rows are skipped so their revision stays put.
                    sqlx::query(
                        r#"
                        INSERT INTO products (sku, name, price, description, status, image_url)
                        VALUES ($1, $2, $3, $4, $5, $6)
                        ON CONFLICT (sku) DO UPDATE
                        SET name = EXCLUDED.name,
                            price = EXCLUDED.price,
                            description = EXCLUDED.description,
                            status = EXCLUDED.status,
                            image_url = EXCLUDED.image_url,
                            revision = products.revision + 1,
                            updated_at = NOW()
                        WHERE (products.name, products.price, products.description, products.status, products.image_url)
                            IS DISTINCT FROM
                            (EXCLUDED.name, EXCLUDED.price, EXCLUDED.description, EXCLUDED.status, EXCLUDED.image_url)
                        "#,
                    )
                    .bind(product.sku.trim())
                    .bind(product.name.trim())
                    .bind(product.price)
                    .bind(&product.description)
                    .bind(status)
                    .bind(image_url)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected()
                }
            };

            if rows == 0 && product.revision.is_some() {
                tracing::warn!(sku = %product.sku, "Stale product revision, rolling back save");
                return Ok(SaveOutcome::Stale {
                    key: product.sku.trim().to_string(),
                });
            }
            upserted += rows;
        }

        let keep: Vec<String> = products.iter().map(|p| p.sku.trim().to_string()).collect();
        let removed = sqlx::query("DELETE FROM products WHERE NOT (sku = ANY($1))")
            .bind(&keep)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        timer.record();
        Ok(SaveOutcome::Saved { upserted, removed })
    }
}
