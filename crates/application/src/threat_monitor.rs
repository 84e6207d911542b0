//! Attack logging, per-source escalation, and the blocked-address list.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use clubgate_core::AppResult;
use clubgate_domain::{AttackAttempt, AttackType, IpBlock, SecurityReport};

/// Longest offending-input fragment kept in an attempt record.
const MAX_RECORDED_INPUT: usize = 256;

/// Attempts included in the `recent_attempts` section of a report.
const REPORT_RECENT_LIMIT: usize = 10;

/// Repository port for the append-only attack log.
#[async_trait]
pub trait AttackLogRepository: Send + Sync {
    /// Appends an attempt record.
    async fn append(&self, attempt: AttackAttempt) -> AppResult<()>;

    /// Counts attempts from one source since the given instant.
    async fn count_since(&self, source: IpAddr, since: DateTime<Utc>) -> AppResult<usize>;

    /// Returns every recorded attempt, oldest first.
    async fn snapshot(&self) -> AppResult<Vec<AttackAttempt>>;
}

/// Repository port for the blocked-address set.
#[async_trait]
pub trait BlockListRepository: Send + Sync {
    /// Inserts or refreshes a block entry.
    async fn insert(&self, block: IpBlock) -> AppResult<()>;

    /// Returns the active block for an address, dropping it if expired.
    async fn find_active(&self, address: IpAddr, now: DateTime<Utc>) -> AppResult<Option<IpBlock>>;

    /// Removes a block explicitly. Returns whether one was present.
    async fn remove(&self, address: IpAddr) -> AppResult<bool>;

    /// Returns all blocks still in force at `now`.
    async fn list_active(&self, now: DateTime<Utc>) -> AppResult<Vec<IpBlock>>;
}

/// Escalation thresholds for repeat offenders.
#[derive(Debug, Clone)]
pub struct ThreatPolicy {
    /// Attempts from one source that trigger a block.
    pub max_failed_attempts: usize,
    /// Window, in seconds, over which attempts are counted.
    pub attempt_window_seconds: i64,
    /// How long a triggered block lasts, in seconds.
    pub block_duration_seconds: i64,
}

impl Default for ThreatPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            attempt_window_seconds: 3600,
            block_duration_seconds: 3600,
        }
    }
}

/// Application service tracking rejected requests and blocking sources.
#[derive(Clone)]
pub struct ThreatMonitor {
    attack_log: Arc<dyn AttackLogRepository>,
    block_list: Arc<dyn BlockListRepository>,
    policy: ThreatPolicy,
}

impl ThreatMonitor {
    /// Creates a monitor over the given repositories.
    #[must_use]
    pub fn new(
        attack_log: Arc<dyn AttackLogRepository>,
        block_list: Arc<dyn BlockListRepository>,
        policy: ThreatPolicy,
    ) -> Self {
        Self {
            attack_log,
            block_list,
            policy,
        }
    }

    /// Records a rejected request and escalates to a block when the source
    /// reaches the policy threshold inside the counting window.
    ///
    /// Returns `true` when this attempt triggered a block.
    pub async fn record_attempt(
        &self,
        source: IpAddr,
        attack_type: AttackType,
        matched_input: &str,
    ) -> AppResult<bool> {
        let fragment: String = matched_input.chars().take(MAX_RECORDED_INPUT).collect();

        self.attack_log
            .append(AttackAttempt::new(source, attack_type, fragment))
            .await?;

        let now = Utc::now();
        let since = now - Duration::seconds(self.policy.attempt_window_seconds);
        let recent = self.attack_log.count_since(source, since).await?;

        if recent >= self.policy.max_failed_attempts {
            self.block_list
                .insert(IpBlock {
                    address: source,
                    reason: "multiple attack attempts".to_owned(),
                    blocked_at: now,
                    expires_at: now + Duration::seconds(self.policy.block_duration_seconds),
                })
                .await?;
            return Ok(true);
        }

        Ok(false)
    }

    /// Returns whether the source is currently blocked.
    pub async fn is_blocked(&self, source: IpAddr) -> AppResult<bool> {
        Ok(self
            .block_list
            .find_active(source, Utc::now())
            .await?
            .is_some())
    }

    /// Removes a block explicitly. Returns whether one was present.
    pub async fn unblock(&self, source: IpAddr) -> AppResult<bool> {
        self.block_list.remove(source).await
    }

    /// Builds a point-in-time report of monitor state.
    pub async fn security_report(&self) -> AppResult<SecurityReport> {
        let now = Utc::now();
        let attempts = self.attack_log.snapshot().await?;
        let blocks = self.block_list.list_active(now).await?;

        let recent_start = attempts.len().saturating_sub(REPORT_RECENT_LIMIT);
        let recent_attempts = attempts[recent_start..].to_vec();

        Ok(SecurityReport {
            generated_at: now,
            blocked_ip_count: blocks.len(),
            attack_attempt_count: attempts.len(),
            recent_attempts,
            blocked_ips: blocks.into_iter().map(|block| block.address).collect(),
        })
    }
}
