//! Group repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::GroupEntity;
use crate::metrics::QueryTimer;

const GROUP_SELECT: &str = r#"
    SELECT g.id, g.name, g.created_at,
           COALESCE(
               ARRAY_AGG(m.customer_id ORDER BY m.position) FILTER (WHERE m.customer_id IS NOT NULL),
               '{}'::UUID[]
           ) AS member_ids
    FROM groups g
    LEFT JOIN group_members m ON m.group_id = g.id
"#;

/// Repository for recipient groups.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Creates a new GroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all groups with their members, newest first.
    pub async fn list(&self) -> Result<Vec<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_groups");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            "{} GROUP BY g.id ORDER BY g.created_at DESC, g.id ASC",
            GROUP_SELECT
        ))
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_id");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            "{} WHERE g.id = $1 GROUP BY g.id",
            GROUP_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Create a group with its members in member order.
    ///
    /// Fails with a foreign key violation if a member id is not a customer.
    pub async fn create(&self, name: &str, member_ids: &[Uuid]) -> Result<GroupEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_group");
        let mut tx = self.pool.begin().await?;

        let (id, created_at): (Uuid, chrono::DateTime<chrono::Utc>) = sqlx::query_as(
            "INSERT INTO groups (name) VALUES ($1) RETURNING id, created_at",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, customer_id, position)
            SELECT $1, m.customer_id, m.ord::INTEGER
            FROM UNNEST($2::UUID[]) WITH ORDINALITY AS m(customer_id, ord)
            "#,
        )
        .bind(id)
        .bind(member_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();

        Ok(GroupEntity {
            id,
            name: name.to_string(),
            member_ids: member_ids.to_vec(),
            created_at,
        })
    }

    /// Delete a group. Members are removed with it; customers are not touched.
    /// Returns the number of rows deleted (0 or 1).
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_group");
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected())
    }
}
