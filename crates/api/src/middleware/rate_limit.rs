//! Rate limiting middleware.
//!
//! Limits password verification attempts per client IP.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use std::{
    net::IpAddr,
    num::NonZeroU32,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::client_ip::resolve_client_ip;

/// Checks between two sweeps of idle client entries.
const SWEEP_INTERVAL: u64 = 1024;

/// Rate limiter state shared across all requests, keyed by client IP.
///
/// Entries whose quota has fully replenished are dropped every
/// [`SWEEP_INTERVAL`] checks, so the key set stays bounded by the clients
/// seen within one quota period.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    clock: DefaultClock,
    checks: AtomicU64,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Returns `None` when the limit is 0 (disabled).
    pub fn new(rate_limit_per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            clock: DefaultClock::default(),
            checks: AtomicU64::new(0),
            rate_limit_per_minute,
        })
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Check whether a request from `ip` is allowed.
    /// Returns Err with the retry delay in seconds if rate limited.
    pub fn check(&self, ip: IpAddr) -> Result<(), u64> {
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.sweep();
        }

        self.limiter.check_key(&ip).map_err(|not_until| {
            let wait_time = not_until.wait_time_from(self.clock.now());
            wait_time.as_secs().max(1)
        })
    }

    /// Drop entries for clients whose quota has fully replenished.
    pub fn sweep(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("tracked_clients", &self.tracked_clients())
            .finish()
    }
}

/// Middleware that rate limits the password verification route per client IP.
///
/// Requests whose client address cannot be determined are not limited.
pub async fn verify_rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client_ip = resolve_client_ip(
        req.headers(),
        req.extensions(),
        state.config.security.trust_proxy_headers,
    );
    let (Some(limiter), Some(ip)) = (state.rate_limiter.as_ref(), client_ip) else {
        return next.run(req).await;
    };

    if let Err(retry_after) = limiter.check(ip) {
        tracing::warn!(client_ip = %ip, retry_after, "Verification rate limit exceeded");
        return rate_limited_response(retry_after);
    }

    next.run(req).await
}

/// Create a rate limited response with a Retry-After header.
fn rate_limited_response(retry_after: u64) -> Response {
    let mut response = ApiError::RateLimited.into_response();
    if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([203, 0, 113, last])
    }

    #[test]
    fn test_zero_limit_disables() {
        assert!(RateLimiterState::new(0).is_none());
    }

    #[test]
    fn test_rate_limiter_allows_requests() {
        let state = RateLimiterState::new(100).unwrap();
        assert!(state.check(ip(1)).is_ok());
        assert_eq!(state.rate_limit_per_minute(), 100);
    }

    #[test]
    fn test_rate_limiter_exhaustion() {
        let state = RateLimiterState::new(3).unwrap();

        for i in 0..3 {
            assert!(state.check(ip(1)).is_ok(), "Request {} should be allowed", i);
        }

        let result = state.check(ip(1));
        assert!(result.unwrap_err() >= 1);
    }

    #[test]
    fn test_rate_limiter_clients_independent() {
        let state = RateLimiterState::new(1).unwrap();

        assert!(state.check(ip(1)).is_ok());
        assert!(state.check(ip(2)).is_ok());

        assert!(state.check(ip(1)).is_err());
        assert!(state.check(ip(2)).is_err());
        assert!(state.check(ip(3)).is_ok());
    }

    #[test]
    fn test_sweep_keeps_exhausted_clients() {
        let state = RateLimiterState::new(1).unwrap();

        assert!(state.check(ip(1)).is_ok());
        assert!(state.check(ip(1)).is_err());
        assert_eq!(state.tracked_clients(), 1);

        // Still inside its quota period, so the entry and its limit survive.
        state.sweep();
        assert!(state.check(ip(1)).is_err());
    }

    #[test]
    fn test_sweep_drops_replenished_clients() {
        // One cell per millisecond, so a single use replenishes almost at once.
        let state = RateLimiterState::new(60_000).unwrap();

        for last in 1..=50 {
            assert!(state.check(ip(last)).is_ok());
        }
        assert_eq!(state.tracked_clients(), 50);

        std::thread::sleep(std::time::Duration::from_millis(20));
        state.sweep();
        assert_eq!(state.tracked_clients(), 0);
    }

    #[test]
    fn test_debug_output() {
        let state = RateLimiterState::new(10).unwrap();
        let debug = format!("{:?}", state);
        assert!(debug.contains("rate_limit_per_minute"));
        assert!(debug.contains("tracked_clients"));
    }

    #[test]
    fn test_rate_limited_response_format() {
        let response = rate_limited_response(42);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }
}
