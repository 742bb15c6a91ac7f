//! Cache key builders for all QuestHub cache entries.
//!
//! Providers add the configured prefix; these are the logical keys.

use uuid::Uuid;

/// Counter for one rate-limit window of a client.
///
/// `window` is the window index (`unix_seconds / window_seconds`), so a new
/// window starts a fresh counter.
pub fn rate_limit(scope: &str, client: &str, window: u64) -> String {
    format!("rate:{scope}:{client}:{window}")
}

/// Marker for a revoked token id.
pub fn jwt_blocklist(jti: Uuid) -> String {
    format!("jwt:blocked:{jti}")
}

/// Unix timestamp before which every token issued to a user is revoked.
pub fn user_tokens_revoked_at(user_id: Uuid) -> String {
    format!("jwt:revoked_before:{user_id}")
}

/// Single-runner lock for a scheduled job.
pub fn job_lock(job: &str) -> String {
    format!("lock:job:{job}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_key() {
        assert_eq!(rate_limit("strict", "10.0.0.1", 42), "rate:strict:10.0.0.1:42");
    }

    #[test]
    fn test_blocklist_key() {
        assert_eq!(
            jwt_blocklist(Uuid::nil()),
            "jwt:blocked:00000000-0000-0000-0000-000000000000"
        );
    }
}
