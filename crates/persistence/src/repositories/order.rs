//! Order repository for database operations.

use domain::models::order::{generate_order_id, OrderInput, OrderItem, OrderStatus};
use domain::services::checkout::UNLIMITED_POINTS_SENTINEL;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{OrderEntity, OrderStatusDb};
use crate::metrics::QueryTimer;
use crate::repositories::{SaveOutcome, UpdateOutcome};

const ORDER_COLUMNS: &str = "id, customer_id, customer_name, email, note, admin_note, items, total, status, revision, created_at, updated_at";

/// Attempts at finding an unused order id before giving up.
const ORDER_ID_ATTEMPTS: usize = 5;

/// An order to be placed through checkout.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub note: String,
    pub items: Vec<OrderItem>,
    pub total: i64,
}

/// Result of placing an order.
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    /// `points` is the balance after the order, `debited` what it cost the
    /// customer (0 for unlimited accounts).
    Placed {
        order: OrderEntity,
        points: i64,
        debited: i64,
    },
    CustomerNotFound,
    InsufficientPoints { balance: i64 },
}

/// Row returned by the conditional debit.
#[derive(Debug, sqlx::FromRow)]
struct DebitedCustomer {
    name: String,
    email: String,
    points: i64,
    debited: i64,
}

/// Repository for order-related database operations.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Creates a new OrderRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all orders, newest first.
    pub async fn list(&self) -> Result<Vec<OrderEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_orders");
        let result = sqlx::query_as::<_, OrderEntity>(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, id ASC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Find an order by ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<OrderEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_order_by_id");
        let result = sqlx::query_as::<_, OrderEntity>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Save the whole order collection.
    ///
    /// Same contract as the product catalogue save: revision-checked per-row
    /// upserts inside one transaction, then removal of orders that are not in
    /// the submitted collection.
    pub async fn save_all(&self, orders: &[OrderInput]) -> Result<SaveOutcome, sqlx::Error> {
        let timer = QueryTimer::new("save_orders");
        let mut tx = self.pool.begin().await?;
        let mut upserted = 0u64;

        for order in orders {
            let status: OrderStatusDb = order.status.into();
            let rows = sqlx::query(
                r#"
                INSERT INTO orders (id, customer_id, customer_name, email, note, admin_note, items, total, status, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, NOW()))
                ON CONFLICT (id) DO UPDATE
                SET customer_id = EXCLUDED.customer_id,
                    customer_name = EXCLUDED.customer_name,
                    email = EXCLUDED.email,
                    note = EXCLUDED.note,
                    admin_note = EXCLUDED.admin_note,
                    items = EXCLUDED.items,
                    total = EXCLUDED.total,
                    status = EXCLUDED.status,
                    revision = orders.revision + 1,
                    updated_at = NOW()
                WHERE ($11::BIGINT IS NULL OR orders.revision = $11)
                  AND (orders.customer_id, orders.customer_name, orders.email, orders.note,
                       orders.admin_note, orders.items, orders.total, orders.status)
                      IS DISTINCT FROM
                      (EXCLUDED.customer_id, EXCLUDED.customer_name, EXCLUDED.email, EXCLUDED.note,
                       EXCLUDED.admin_note, EXCLUDED.items, EXCLUDED.total, EXCLUDED.status)
                "#,
            )
            .bind(order.id.trim())
            .bind(order.customer_id)
            .bind(&order.person_name)
            .bind(&order.email)
            .bind(&order.note)
            .bind(&order.admin_note)
            .bind(Json(&order.items))
            .bind(order.total)
            .bind(status)
            .bind(order.at)
            .bind(order.revision)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if rows == 0 {
                if let Some(revision) = order.revision {
                    // Zero rows is also what an unchanged row produces.
                    let stored: Option<i64> =
                        sqlx::query_scalar("SELECT revision FROM orders WHERE id = $1")
                            .bind(order.id.trim())
                            .fetch_optional(&mut *tx)
                            .await?;
                    if stored.is_some_and(|stored| stored != revision) {
                        tracing::warn!(order_id = %order.id, "Stale order revision, rolling back save");
                        return Ok(SaveOutcome::Stale {
                            key: order.id.trim().to_string(),
                        });
                    }
                }
            }
            upserted += rows;
        }

        let keep: Vec<String> = orders.iter().map(|o| o.id.trim().to_string()).collect();
        let removed = sqlx::query("DELETE FROM orders WHERE NOT (id = ANY($1))")
            .bind(&keep)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        timer.record();
        Ok(SaveOutcome::Saved { upserted, removed })
    }

    /// Update status and/or admin note of one order.
    pub async fn update(
        &self,
        id: &str,
        status: Option<OrderStatus>,
        admin_note: Option<&str>,
        expected_revision: Option<i64>,
    ) -> Result<UpdateOutcome<OrderEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_order");
        let status: Option<OrderStatusDb> = status.map(Into::into);
        let result = sqlx::query_as::<_, OrderEntity>(&format!(
            r#"
            UPDATE orders
            SET status = COALESCE($2, status),
                admin_note = COALESCE($3, admin_note),
                revision = revision + 1,
                updated_at = NOW()
            WHERE id = $1 AND ($4::BIGINT IS NULL OR revision = $4)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .bind(admin_note)
        .bind(expected_revision)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);

        match result? {
            Some(entity) => Ok(UpdateOutcome::Updated(entity)),
            None if self.find_by_id(id).await?.is_some() => Ok(UpdateOutcome::Stale),
            None => Ok(UpdateOutcome::NotFound),
        }
    }

    /// Debit the customer and record the order in one transaction.
    ///
    /// The debit is a single conditional update, so two concurrent checkouts
    /// from the same account cannot both spend the same points. Unlimited
    /// accounts and balances at the sentinel are not debited.
    pub async fn place_order(&self, order: &NewOrder) -> Result<CheckoutOutcome, sqlx::Error> {
        let timer = QueryTimer::new("place_order");
        let mut tx = self.pool.begin().await?;

        let debited = sqlx::query_as::<_, DebitedCustomer>(
            r#"
            WITH locked AS (
                SELECT id, points AS previous_points
                FROM customers
                WHERE id = $1
                FOR UPDATE
            )
            UPDATE customers c
            SET points = CASE WHEN c.unlimited OR c.points >= $3 THEN c.points ELSE c.points - $2 END,
                revision = CASE WHEN c.unlimited OR c.points >= $3 THEN c.revision ELSE c.revision + 1 END,
                updated_at = NOW()
            FROM locked
            WHERE c.id = locked.id AND (c.unlimited OR c.points >= $3 OR c.points >= $2)
            RETURNING c.name, c.email, c.points, locked.previous_points - c.points AS debited
            "#,
        )
        .bind(order.customer_id)
        .bind(order.total)
        .bind(UNLIMITED_POINTS_SENTINEL)
        .fetch_optional(&mut *tx)
        .await?;

        let customer = match debited {
            Some(customer) => customer,
            None => {
                let balance: Option<i64> =
                    sqlx::query_scalar("SELECT points FROM customers WHERE id = $1")
                        .bind(order.customer_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                timer.record();
                return Ok(match balance {
                    Some(balance) => CheckoutOutcome::InsufficientPoints { balance },
                    None => CheckoutOutcome::CustomerNotFound,
                });
            }
        };

        let mut inserted = None;
        for _ in 0..ORDER_ID_ATTEMPTS {
            inserted = sqlx::query_as::<_, OrderEntity>(&format!(
                r#"
                INSERT INTO orders (id, customer_id, customer_name, email, note, items, total, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7, 'open')
                ON CONFLICT (id) DO NOTHING
                RETURNING {}
                "#,
                ORDER_COLUMNS
            ))
            .bind(generate_order_id())
            .bind(order.customer_id)
            .bind(&customer.name)
            .bind(&customer.email)
            .bind(&order.note)
            .bind(Json(&order.items))
            .bind(order.total)
            .fetch_optional(&mut *tx)
            .await?;
            if inserted.is_some() {
                break;
            }
        }
        let order_entity = inserted.ok_or_else(|| {
            sqlx::Error::Protocol("could not allocate a unique order id".to_string())
        })?;

        tx.commit().await?;
        timer.record();
        Ok(CheckoutOutcome::Placed {
            order: order_entity,
            points: customer.points,
            debited: customer.debited,
        })
    }
}
