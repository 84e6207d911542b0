use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use clubgate_application::{AttemptInfo, RateLimitRepository};
use clubgate_core::AppResult;

#[derive(Debug, Clone)]
struct WindowEntry {
    attempt_count: i32,
    window_started_at: DateTime<Utc>,
}

/// In-memory fixed-window rate limit counters.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitRepository {
    windows: RwLock<HashMap<String, WindowEntry>>,
}

impl InMemoryRateLimitRepository {
    /// Creates an empty counter store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimitRepository for InMemoryRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        let now = Utc::now();
        let mut windows = self.windows.write().await;

        let entry = windows
            .entry(key.to_owned())
            .and_modify(|entry| {
                // Expired window: start over rather than carry the old count.
                if now - entry.window_started_at >= Duration::seconds(window_duration_seconds) {
                    entry.attempt_count = 1;
                    entry.window_started_at = now;
                } else {
                    entry.attempt_count += 1;
                }
            })
            .or_insert(WindowEntry {
                attempt_count: 1,
                window_started_at: now,
            });

        Ok(AttemptInfo {
            attempt_count: entry.attempt_count,
            window_started_at: entry.window_started_at,
        })
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut windows = self.windows.write().await;
        let initial = windows.len();
        windows.retain(|_, entry| entry.window_started_at >= before);

        Ok((initial - windows.len()) as u64)
    }
}
