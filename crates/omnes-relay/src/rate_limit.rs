//! Fixed-window rate limiter middleware for the chat endpoint.
//!
//! Counts requests per client IP per wall-clock second, so one noisy caller
//! cannot exhaust the budget of everyone else. Client addresses come from
//! `ConnectInfo`, which `start_server` installs; requests without one (for
//! example when the router is driven directly) share a single bucket. Over the
//! limit the relay still answers HTTP 200, with the rate-limited reply in
//! place of a completion.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{ConnectInfo, Extension, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::RelayFailure;

#[derive(Debug, Clone, Copy)]
struct Window {
    /// The epoch second this window covers.
    second: u64,
    /// Requests seen in it.
    count: u64,
}

/// Shared state for the rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    /// Maximum requests allowed per client per second.
    max_per_sec: u64,
    /// Active windows keyed by client; `None` is the shared unknown-peer bucket.
    windows: Arc<Mutex<HashMap<Option<IpAddr>, Window>>>,
}

impl RateLimiter {
    /// Create a limiter allowing `max_per_sec` requests per client per second
    /// (at least one).
    pub fn new(max_per_sec: u64) -> Self {
        Self {
            max_per_sec: max_per_sec.max(1),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Try to acquire a permit for `client`. Returns true if the request is allowed.
    pub fn try_acquire(&self, client: Option<IpAddr>) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.try_acquire_at(client, now)
    }

    fn try_acquire_at(&self, client: Option<IpAddr>, now: u64) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        // Windows from earlier seconds can no longer limit anyone.
        windows.retain(|_, window| window.second == now);

        let window = windows.entry(client).or_insert(Window {
            second: now,
            count: 0,
        });
        if window.count >= self.max_per_sec {
            return false;
        }
        window.count += 1;
        true
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Axum middleware that enforces the rate limit.
pub async fn rate_limit_middleware(
    Extension(limiter): Extension<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if limiter.try_acquire(client) {
        next.run(req).await
    } else {
        tracing::warn!(client = ?client, "Chat rate limit exceeded");
        RelayFailure::RateLimited.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> Option<IpAddr> {
        Some(IpAddr::from([10, 0, 0, last]))
    }

    #[test]
    fn test_allows_up_to_limit_within_window() {
        let limiter = RateLimiter::new(2);
        assert!(limiter.try_acquire_at(ip(1), 100));
        assert!(limiter.try_acquire_at(ip(1), 100));
        assert!(!limiter.try_acquire_at(ip(1), 100));
    }

    #[test]
    fn test_new_window_resets_count() {
        let limiter = RateLimiter::new(1);
        assert!(limiter.try_acquire_at(ip(1), 100));
        assert!(!limiter.try_acquire_at(ip(1), 100));
        assert!(limiter.try_acquire_at(ip(1), 101));
    }

    #[test]
    fn test_zero_limit_is_clamped_to_one() {
        let limiter = RateLimiter::new(0);
        assert!(limiter.try_acquire_at(None, 5));
        assert!(!limiter.try_acquire_at(None, 5));
    }

    #[test]
    fn test_clients_have_separate_budgets() {
        let limiter = RateLimiter::new(1);
        assert!(limiter.try_acquire_at(ip(1), 7));
        assert!(!limiter.try_acquire_at(ip(1), 7));
        assert!(limiter.try_acquire_at(ip(2), 7));
        assert!(limiter.try_acquire_at(None, 7));
    }

    #[test]
    fn test_clones_share_budget() {
        let a = RateLimiter::new(1);
        let b = a.clone();
        assert!(a.try_acquire_at(ip(1), 7));
        assert!(!b.try_acquire_at(ip(1), 7));
    }

    #[test]
    fn test_stale_windows_are_dropped() {
        let limiter = RateLimiter::new(5);
        for last in 1..=20 {
            assert!(limiter.try_acquire_at(ip(last), 7));
        }
        assert_eq!(limiter.tracked_clients(), 20);
        assert!(limiter.try_acquire_at(ip(1), 8));
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
