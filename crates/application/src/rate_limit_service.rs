//! Rate limiting ports and application service.
//!
//! Fixed-window throttling keyed by client address. The site enforces two
//! independent rules: a global per-IP quota on every route and a tighter
//! quota on the membership form endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use clubgate_core::{AppError, AppResult};

/// Repository port for rate limit counters.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Records an attempt for the given key.
    ///
    /// If the current window has expired, the counter resets and a new window
    /// starts. Returns the updated attempt count within the active window.
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo>;

    /// Removes entries whose window started before the given cutoff.
    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Information about the current rate limit window for a key.
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    /// Number of attempts in the current window (including this one).
    pub attempt_count: i32,
    /// When the current window started.
    pub window_started_at: DateTime<Utc>,
}

/// Configuration for a rate limit rule.
#[derive(Debug, Clone)]
pub struct RateLimitRule {
    /// The route category name (e.g., "global", "form").
    pub category: String,
    /// Maximum number of attempts allowed in the window.
    pub max_attempts: i32,
    /// Window duration in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Creates a new rate limit rule.
    #[must_use]
    pub fn new(category: impl Into<String>, max_attempts: i32, window_seconds: i64) -> Self {
        Self {
            category: category.into(),
            max_attempts,
            window_seconds,
        }
    }
}

/// Application service for rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a new rate limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Checks whether the given key is within the rate limit.
    ///
    /// Records the attempt and returns `Ok(())` if allowed, or
    /// `Err(AppError::RateLimited)` if the limit has been exceeded.
    ///
    /// The key is formatted as `"{category}:{identifier}"` where the
    /// identifier is the client IP address, so the two rules count
    /// independently of each other.
    pub async fn check_rate_limit(&self, rule: &RateLimitRule, key: &str) -> AppResult<()> {
        let composite_key = format!("{}:{key}", rule.category);
        let info = self
            .repository
            .record_attempt(&composite_key, rule.window_seconds)
            .await?;

        if info.attempt_count > rule.max_attempts {
            return Err(AppError::RateLimited(
                "too many requests, please try again later".to_owned(),
            ));
        }

        Ok(())
    }

    /// Removes expired rate limit entries. Intended for periodic cleanup.
    pub async fn cleanup(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::hours(24);
        self.repository.cleanup_expired(cutoff).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use clubgate_core::AppResult;

    use super::{AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService};

    #[derive(Default)]
    struct CountingRepo {
        counts: Mutex<HashMap<String, i32>>,
    }

    #[async_trait]
    impl RateLimitRepository for CountingRepo {
        async fn record_attempt(
            &self,
            key: &str,
            _window_duration_seconds: i64,
        ) -> AppResult<AttemptInfo> {
            let mut counts = self.counts.lock().map_err(|error| {
                clubgate_core::AppError::Internal(format!("failed to lock counts: {error}"))
            })?;
            let count = counts.entry(key.to_owned()).or_insert(0);
            *count += 1;
            Ok(AttemptInfo {
                attempt_count: *count,
                window_started_at: Utc::now(),
            })
        }

        async fn cleanup_expired(&self, _before: DateTime<Utc>) -> AppResult<u64> {
            Ok(0)
        }
    }

    #[derive(Default)]
    struct CleanupRepo {
        cutoffs: Mutex<Vec<DateTime<Utc>>>,
    }

    #[async_trait]
    impl RateLimitRepository for CleanupRepo {
        async fn record_attempt(
            &self,
            _key: &str,
            _window_duration_seconds: i64,
        ) -> AppResult<AttemptInfo> {
            Ok(AttemptInfo {
                attempt_count: 1,
                window_started_at: Utc::now(),
            })
        }

        async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
            let mut cutoffs = self.cutoffs.lock().map_err(|error| {
                clubgate_core::AppError::Internal(format!("failed to lock cutoffs: {error}"))
            })?;
            cutoffs.push(before);
            Ok(3)
        }
    }

    #[tokio::test]
    async fn attempts_over_the_limit_are_rejected() {
        let service = RateLimitService::new(Arc::new(CountingRepo::default()));
        let rule = RateLimitRule::new("form", 2, 60);

        assert!(service.check_rate_limit(&rule, "10.0.0.1").await.is_ok());
        assert!(service.check_rate_limit(&rule, "10.0.0.1").await.is_ok());
        assert!(service.check_rate_limit(&rule, "10.0.0.1").await.is_err());
    }

    #[tokio::test]
    async fn categories_count_independently() {
        let service = RateLimitService::new(Arc::new(CountingRepo::default()));
        let form_rule = RateLimitRule::new("form", 1, 60);
        let global_rule = RateLimitRule::new("global", 2, 60);

        assert!(
            service
                .check_rate_limit(&form_rule, "10.0.0.1")
                .await
                .is_ok()
        );
        assert!(
            service
                .check_rate_limit(&form_rule, "10.0.0.1")
                .await
                .is_err()
        );
        // The global counter for the same address is untouched.
        assert!(
            service
                .check_rate_limit(&global_rule, "10.0.0.1")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn cleanup_evicts_with_a_day_old_cutoff() {
        let repository = Arc::new(CleanupRepo::default());
        let service = RateLimitService::new(repository.clone());

        let removed = service.cleanup().await;
        assert_eq!(removed.ok(), Some(3));

        let cutoff = repository
            .cutoffs
            .lock()
            .ok()
            .and_then(|cutoffs| cutoffs.first().copied());
        assert!(cutoff.is_some_and(|cutoff| {
            let age = Utc::now() - cutoff;
            age >= chrono::Duration::hours(24) && age < chrono::Duration::hours(25)
        }));
    }
}
