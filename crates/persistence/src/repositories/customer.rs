//! Customer repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::CustomerEntity;
use crate::metrics::QueryTimer;
use crate::repositories::UpdateOutcome;

const CUSTOMER_COLUMNS: &str =
    "id, name, email, password_hash, points, unlimited, revision, created_at, updated_at";

/// Fields of a customer update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub points: Option<i64>,
    pub unlimited: Option<bool>,
    pub password_hash: Option<&'a str>,
    pub expected_revision: Option<i64>,
}

/// Repository for customer-related database operations.
#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all customers, oldest first.
    pub async fn list(&self) -> Result<Vec<CustomerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_customers");
        let result = sqlx::query_as::<_, CustomerEntity>(&format!(
            "SELECT {} FROM customers ORDER BY created_at ASC, id ASC",
            CUSTOMER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Find a customer by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CustomerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_customer_by_id");
        let result = sqlx::query_as::<_, CustomerEntity>(&format!(
            "SELECT {} FROM customers WHERE id = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Find a customer by email, ignoring case.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<CustomerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_customer_by_email");
        let result = sqlx::query_as::<_, CustomerEntity>(&format!(
            "SELECT {} FROM customers WHERE LOWER(email) = LOWER($1)",
            CUSTOMER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Check whether an email is registered, ignoring case.
    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("customer_email_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM customers WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email.trim())
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Create a customer. The email is expected to be normalized already.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: Option<&str>,
        points: i64,
    ) -> Result<CustomerEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_customer");
        let result = sqlx::query_as::<_, CustomerEntity>(&format!(
            r#"
            INSERT INTO customers (name, email, password_hash, points, unlimited)
            VALUES ($1, $2, $3, $4, false)
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(points)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Update a customer, optionally guarded by the expected revision.
    pub async fn update(
        &self,
        id: Uuid,
        update: &CustomerUpdate<'_>,
    ) -> Result<UpdateOutcome<CustomerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_customer");
        let result = sqlx::query_as::<_, CustomerEntity>(&format!(
            r#"
            UPDATE customers
            SET name = $2,
                email = COALESCE($3, email),
                points = COALESCE($4, points),
                unlimited = COALESCE($5, unlimited),
                password_hash = COALESCE($6, password_hash),
                revision = revision + 1,
                updated_at = NOW()
            WHERE id = $1 AND ($7::BIGINT IS NULL OR revision = $7)
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.email)
        .bind(update.points)
        .bind(update.unlimited)
        .bind(update.password_hash)
        .bind(update.expected_revision)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);

        match result? {
            Some(entity) => Ok(UpdateOutcome::Updated(entity)),
            None if self.find_by_id(id).await?.is_some() => Ok(UpdateOutcome::Stale),
            None => Ok(UpdateOutcome::NotFound),
        }
    }

    /// Store a password for an account that has none yet.
    ///
    /// Returns false if a password was set concurrently.
    pub async fn set_initial_password(&self, id: Uuid, hash: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("set_initial_customer_password");
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1 AND password_hash IS NULL
            "#,
        )
        .bind(id)
        .bind(hash)
        .execute(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.rows_affected() == 1)
    }

    /// Replace a stored hash if it still equals `current`.
    pub async fn replace_password_hash(
        &self,
        id: Uuid,
        current: &str,
        new_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("replace_customer_password_hash");
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET password_hash = $3, updated_at = NOW()
            WHERE id = $1 AND password_hash = $2
            "#,
        )
        .bind(id)
        .bind(current)
        .bind(new_hash)
        .execute(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.rows_affected() == 1)
    }

    /// Delete a customer. Orders and messages are left in place.
    /// Returns the number of rows deleted (0 or 1).
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_customer");
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected())
    }

    /// Names of the given customers. Unknown ids are omitted.
    pub async fn names_for(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, String)>, sqlx::Error> {
        let timer = QueryTimer::new("customer_names_for");
        let result = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, name FROM customers WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }
}
