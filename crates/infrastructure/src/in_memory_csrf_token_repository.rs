use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use clubgate_application::{CsrfTokenRecord, CsrfTokenRepository};
use clubgate_core::{AppResult, SessionId};

/// In-memory CSRF token store, one record per session.
#[derive(Debug, Default)]
pub struct InMemoryCsrfTokenRepository {
    tokens: RwLock<HashMap<SessionId, CsrfTokenRecord>>,
}

impl InMemoryCsrfTokenRepository {
    /// Creates an empty token store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CsrfTokenRepository for InMemoryCsrfTokenRepository {
    async fn store_token(&self, session_id: SessionId, record: CsrfTokenRecord) -> AppResult<()> {
        self.tokens.write().await.insert(session_id, record);
        Ok(())
    }

    async fn find_token(&self, session_id: SessionId) -> AppResult<Option<CsrfTokenRecord>> {
        Ok(self.tokens.read().await.get(&session_id).cloned())
    }

    async fn remove_token(&self, session_id: SessionId) -> AppResult<()> {
        self.tokens.write().await.remove(&session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use clubgate_application::{CsrfTokenRecord, CsrfTokenRepository};
    use clubgate_core::SessionId;

    use super::InMemoryCsrfTokenRepository;

    fn record() -> CsrfTokenRecord {
        CsrfTokenRecord {
            token_hash: "ab".repeat(32),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn stored_token_is_found_and_replaced_per_session() {
        let repository = InMemoryCsrfTokenRepository::new();
        let session_id = SessionId::new();

        assert!(repository.store_token(session_id, record()).await.is_ok());
        let mut replacement = record();
        replacement.token_hash = "cd".repeat(32);
        assert!(
            repository
                .store_token(session_id, replacement)
                .await
                .is_ok()
        );

        let found = repository.find_token(session_id).await;
        assert_eq!(
            found.ok().flatten().map(|record| record.token_hash),
            Some("cd".repeat(32))
        );
    }

    #[tokio::test]
    async fn sessions_do_not_share_tokens() {
        let repository = InMemoryCsrfTokenRepository::new();
        let session_a = SessionId::new();
        let session_b = SessionId::new();

        assert!(repository.store_token(session_a, record()).await.is_ok());
        let found = repository.find_token(session_b).await;
        assert!(matches!(found, Ok(None)));

        assert!(repository.remove_token(session_a).await.is_ok());
        let found = repository.find_token(session_a).await;
        assert!(matches!(found, Ok(None)));
    }
}
