//! Fixed-window rate limiting per client IP, counted in the cache.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use questhub_cache::{CacheManager, keys};
use questhub_core::config::RateLimitConfig;
use questhub_core::traits::cache::CacheProvider;

use crate::error::rate_limited;
use crate::extractors::client_ip;
use crate::state::AppState;

/// Budget a route group draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every route.
    General,
    /// Sign-in and anonymous submissions.
    Strict,
}

impl Scope {
    fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Strict => "strict",
        }
    }
}

/// Outcome of one counted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

/// Window index and seconds until the next window for a unix time.
fn window_position(now_secs: u64, window_secs: u64) -> (u64, u64) {
    let window = window_secs.max(1);
    (now_secs / window, window - now_secs % window)
}

/// Counts requests per client and window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cache: CacheManager,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a limiter over the shared cache.
    pub fn new(cache: CacheManager, config: &RateLimitConfig) -> Self {
        Self {
            cache,
            config: config.clone(),
        }
    }

    fn limit(&self, scope: Scope) -> u64 {
        match scope {
            Scope::General => self.config.general_limit,
            Scope::Strict => self.config.strict_limit,
        }
    }

    /// Count one request at `now_secs`. A cache outage lets traffic through.
    pub async fn check_at(&self, scope: Scope, client: &str, now_secs: u64) -> RateDecision {
        if !self.config.enabled {
            return RateDecision::Allowed;
        }
        let (index, retry_after_secs) = window_position(now_secs, self.config.window_seconds);
        let key = keys::rate_limit(scope.as_str(), client, index);

        let count = match self.cache.incr(&key).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, scope = scope.as_str(), "Rate limit counter unavailable");
                return RateDecision::Allowed;
            }
        };
        if count == 1 {
            let ttl = Duration::from_secs(self.config.window_seconds.max(1) + 1);
            if let Err(e) = self.cache.expire(&key, ttl).await {
                warn!(error = %e, key = %key, "Failed to set rate limit window expiry");
            }
        }

        if u64::try_from(count).unwrap_or(0) > self.limit(scope) {
            RateDecision::Limited { retry_after_secs }
        } else {
            RateDecision::Allowed
        }
    }

    /// Count one request now.
    pub async fn check(&self, scope: Scope, client: &str) -> RateDecision {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.check_at(scope, client, now).await
    }
}

async fn enforce(state: &AppState, scope: Scope, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let client = client_ip(&parts, state.config.server.trust_forwarded_for);
    let request = Request::from_parts(parts, body);

    match state.rate_limiter.check(scope, &client).await {
        RateDecision::Allowed => next.run(request).await,
        RateDecision::Limited { retry_after_secs } => {
            warn!(client = %client, scope = scope.as_str(), "Rate limit exceeded");
            rate_limited(retry_after_secs)
        }
    }
}

/// Budget shared by all routes.
pub async fn general(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce(&state, Scope::General, request, next).await
}

/// Smaller budget for authentication and anonymous submission routes.
pub async fn strict(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce(&state, Scope::Strict, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use questhub_core::config::CacheConfig;

    async fn limiter(general: u64, strict: u64) -> RateLimiter {
        let cache = CacheManager::new(&CacheConfig::default()).await.unwrap();
        let config = RateLimitConfig {
            enabled: true,
            window_seconds: 60,
            general_limit: general,
            strict_limit: strict,
        };
        RateLimiter::new(cache, &config)
    }

    #[test]
    fn test_window_position() {
        assert_eq!(window_position(120, 60), (2, 60));
        assert_eq!(window_position(125, 60), (2, 55));
        assert_eq!(window_position(125, 0), (125, 1));
    }

    #[tokio::test]
    async fn test_limits_after_budget_and_resets_next_window() {
        let limiter = limiter(100, 2).await;
        let t = 6_000;
        assert_eq!(limiter.check_at(Scope::Strict, "1.2.3.4", t).await, RateDecision::Allowed);
        assert_eq!(limiter.check_at(Scope::Strict, "1.2.3.4", t + 1).await, RateDecision::Allowed);
        assert_eq!(
            limiter.check_at(Scope::Strict, "1.2.3.4", t + 2).await,
            RateDecision::Limited { retry_after_secs: 58 }
        );
        // Other clients and scopes have their own counters.
        assert_eq!(limiter.check_at(Scope::Strict, "5.6.7.8", t).await, RateDecision::Allowed);
        assert_eq!(limiter.check_at(Scope::General, "1.2.3.4", t).await, RateDecision::Allowed);
        // Next window.
        assert_eq!(limiter.check_at(Scope::Strict, "1.2.3.4", t + 60).await, RateDecision::Allowed);
    }

    #[tokio::test]
    async fn test_disabled_never_limits() {
        let mut limiter = limiter(0, 0).await;
        limiter.config.enabled = false;
        for _ in 0..5 {
            assert_eq!(limiter.check(Scope::General, "x").await, RateDecision::Allowed);
        }
    }
}
