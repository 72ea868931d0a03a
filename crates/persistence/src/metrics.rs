//! Database metrics collection.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record database query duration.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Record a failed query.
pub fn record_query_error(query_name: &str) {
    counter!(
        "database_query_errors_total",
        "query" => query_name.to_string()
    )
    .increment(1);
}

/// Record database connection pool metrics.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times a repository call.
///
/// ```ignore
/// let timer = QueryTimer::new("find_customer_by_id");
/// let result = sqlx::query_as::<_, CustomerEntity>(...).fetch_optional(&pool).await;
/// timer.finish(&result);
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration.
    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }

    /// Record the elapsed duration and count the call as failed if it errored.
    pub fn finish<T, E>(self, result: &Result<T, E>) {
        if result.is_err() {
            record_query_error(self.query_name);
        }
        self.record();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_creation() {
        let timer = QueryTimer::new("list_products");
        assert_eq!(timer.query_name, "list_products");
    }

    #[test]
    fn test_query_timer_finish_without_recorder() {
        // No global recorder is installed in unit tests; recording is a no-op.
        let timer = QueryTimer::new("list_orders");
        let result: Result<(), ()> = Err(());
        timer.finish(&result);
    }
}
