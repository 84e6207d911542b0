use std::net::IpAddr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use clubgate_application::AttackLogRepository;
use clubgate_core::AppResult;
use clubgate_domain::AttackAttempt;

/// In-memory append-only attack log.
///
/// Entries are never removed within the process lifetime.
#[derive(Debug, Default)]
pub struct InMemoryAttackLog {
    attempts: RwLock<Vec<AttackAttempt>>,
}

impl InMemoryAttackLog {
    /// Creates an empty attack log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            attempts: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AttackLogRepository for InMemoryAttackLog {
    async fn append(&self, attempt: AttackAttempt) -> AppResult<()> {
        tracing::warn!(
            source = %attempt.source,
            attack_type = attempt.attack_type.as_str(),
            input = attempt.matched_input.as_str(),
            "attack attempt detected"
        );
        self.attempts.write().await.push(attempt);
        Ok(())
    }

    async fn count_since(&self, source: IpAddr, since: DateTime<Utc>) -> AppResult<usize> {
        Ok(self
            .attempts
            .read()
            .await
            .iter()
            .filter(|attempt| attempt.source == source && attempt.occurred_at >= since)
            .count())
    }

    async fn snapshot(&self) -> AppResult<Vec<AttackAttempt>> {
        Ok(self.attempts.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use chrono::{Duration, Utc};
    use clubgate_application::AttackLogRepository;
    use clubgate_domain::{AttackAttempt, AttackType};

    use super::InMemoryAttackLog;

    fn source(last_octet: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(203, 0, 113, last_octet))
    }

    #[tokio::test]
    async fn appended_attempts_are_counted_per_source() {
        let log = InMemoryAttackLog::new();
        let since = Utc::now() - Duration::hours(1);

        for _ in 0..3 {
            let appended = log
                .append(AttackAttempt::new(source(1), AttackType::Xss, "<script"))
                .await;
            assert!(appended.is_ok());
        }
        let appended = log
            .append(AttackAttempt::new(
                source(2),
                AttackType::SqlInjection,
                "or 1=1",
            ))
            .await;
        assert!(appended.is_ok());

        assert_eq!(log.count_since(source(1), since).await.ok(), Some(3));
        assert_eq!(log.count_since(source(2), since).await.ok(), Some(1));
        assert_eq!(log.count_since(source(3), since).await.ok(), Some(0));
    }

    #[tokio::test]
    async fn count_ignores_attempts_before_the_cutoff() {
        let log = InMemoryAttackLog::new();
        let mut old_attempt = AttackAttempt::new(source(1), AttackType::Xss, "<script");
        old_attempt.occurred_at = Utc::now() - Duration::hours(2);
        assert!(log.append(old_attempt).await.is_ok());

        let since = Utc::now() - Duration::hours(1);
        assert_eq!(log.count_since(source(1), since).await.ok(), Some(0));
        // The snapshot still holds everything ever recorded.
        assert_eq!(log.snapshot().await.map(|all| all.len()).ok(), Some(1));
    }
}
