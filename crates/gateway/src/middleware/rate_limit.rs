//! Rate limiting middleware using token bucket algorithm

use artstuff_common::errors::AppError;
use axum::{extract::Request, middleware::Next, response::Response};
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter using governor crate
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Limiter plus the configured rate, reported back in 429 responses
#[derive(Clone)]
pub struct GlobalLimit {
    limiter: Arc<GlobalRateLimiter>,
    requests_per_second: u32,
}

/// Create a new rate limiter; zero values are raised to one
pub fn create_rate_limiter(requests_per_second: u32, burst: u32) -> GlobalLimit {
    let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    let quota = Quota::per_second(rate).allow_burst(NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN));

    GlobalLimit {
        limiter: Arc::new(RateLimiter::direct(quota)),
        requests_per_second: rate.get(),
    }
}

/// Rate limiting middleware; health probes are never limited
pub async fn rate_limit_middleware(request: Request, next: Next, limit: GlobalLimit) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();
    if path == "/health" || path == "/ready" {
        return Ok(next.run(request).await);
    }

    match limit.limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!(path = %path, "Rate limit exceeded");
            Err(AppError::RateLimited {
                limit: limit.requests_per_second,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_creation() {
        let limit = create_rate_limiter(100, 200);
        assert!(limit.limiter.check().is_ok());
        assert_eq!(limit.requests_per_second, 100);
    }

    #[test]
    fn test_burst_exhausts() {
        let limit = create_rate_limiter(1, 2);
        assert!(limit.limiter.check().is_ok());
        assert!(limit.limiter.check().is_ok());
        assert!(limit.limiter.check().is_err());
    }

    #[test]
    fn test_zero_quota_is_raised() {
        let limit = create_rate_limiter(0, 0);
        assert!(limit.limiter.check().is_ok());
        assert_eq!(limit.requests_per_second, 1);
    }
}
