//! CSRF token issuance and validation.
//!
//! Tokens are cryptographically random, stored as SHA-256 hashes bound to a
//! visitor session, and time-limited. A token stays valid for multiple form
//! submissions until it expires.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use clubgate_core::{AppError, AppResult, SessionId};

/// Token lifetime in seconds (one hour).
pub const CSRF_TOKEN_TTL_SECONDS: i64 = 3600;

/// CSRF token record as stored per session.
#[derive(Debug, Clone)]
pub struct CsrfTokenRecord {
    /// SHA-256 hash of the token value handed to the page.
    pub token_hash: String,
    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Repository port for CSRF token storage.
#[async_trait]
pub trait CsrfTokenRepository: Send + Sync {
    /// Stores the token for a session, replacing any previous one.
    async fn store_token(&self, session_id: SessionId, record: CsrfTokenRecord) -> AppResult<()>;

    /// Returns the stored token for a session, if any.
    async fn find_token(&self, session_id: SessionId) -> AppResult<Option<CsrfTokenRecord>>;

    /// Removes the stored token for a session.
    async fn remove_token(&self, session_id: SessionId) -> AppResult<()>;
}

/// Application service for CSRF protection of the membership form.
#[derive(Clone)]
pub struct CsrfService {
    repository: Arc<dyn CsrfTokenRepository>,
}

impl CsrfService {
    /// Creates a new CSRF service.
    #[must_use]
    pub fn new(repository: Arc<dyn CsrfTokenRepository>) -> Self {
        Self { repository }
    }

    /// Issues a fresh token for the session and returns the raw value to
    /// embed in the page. Only the hash is stored server-side.
    pub async fn issue(&self, session_id: SessionId) -> AppResult<String> {
        let (raw_token, token_hash) = generate_token()?;
        let record = CsrfTokenRecord {
            token_hash,
            expires_at: Utc::now() + Duration::seconds(CSRF_TOKEN_TTL_SECONDS),
        };
        self.repository.store_token(session_id, record).await?;

        Ok(raw_token)
    }

    /// Validates a presented token against the session's stored hash.
    ///
    /// Fails with a deliberately generic message when the token is missing,
    /// expired, or mismatched; an expired token is removed on sight.
    pub async fn validate(&self, session_id: SessionId, presented: Option<&str>) -> AppResult<()> {
        let presented = presented
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Forbidden("invalid request".to_owned()))?;

        let record = self
            .repository
            .find_token(session_id)
            .await?
            .ok_or_else(|| AppError::Forbidden("invalid request".to_owned()))?;

        if Utc::now() >= record.expires_at {
            self.repository.remove_token(session_id).await?;
            return Err(AppError::Forbidden("invalid request".to_owned()));
        }

        if hash_token(presented) != record.token_hash {
            return Err(AppError::Forbidden("invalid request".to_owned()));
        }

        Ok(())
    }
}

/// Generates a cryptographically random token and its SHA-256 hash.
///
/// Returns `(raw_token_hex, sha256_hash_hex)`.
fn generate_token() -> AppResult<(String, String)> {
    use std::fmt::Write;

    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to generate csrf token: {error}")))?;

    let raw_token = bytes
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        });

    let hash = hash_token(&raw_token);
    Ok((raw_token, hash))
}

/// Computes the SHA-256 hash of a token string for storage.
fn hash_token(raw_token: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write;

    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    let result = hasher.finalize();

    result
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use clubgate_core::{AppResult, SessionId};

    use super::{CsrfService, CsrfTokenRecord, CsrfTokenRepository};

    #[derive(Default)]
    struct TestTokenRepo {
        tokens: Mutex<HashMap<SessionId, CsrfTokenRecord>>,
    }

    impl TestTokenRepo {
        fn locked(
            &self,
        ) -> AppResult<std::sync::MutexGuard<'_, HashMap<SessionId, CsrfTokenRecord>>> {
            self.tokens.lock().map_err(|error| {
                clubgate_core::AppError::Internal(format!("failed to lock repo state: {error}"))
            })
        }
    }

    #[async_trait]
    impl CsrfTokenRepository for TestTokenRepo {
        async fn store_token(
            &self,
            session_id: SessionId,
            record: CsrfTokenRecord,
        ) -> AppResult<()> {
            self.locked()?.insert(session_id, record);
            Ok(())
        }

        async fn find_token(&self, session_id: SessionId) -> AppResult<Option<CsrfTokenRecord>> {
            Ok(self.locked()?.get(&session_id).cloned())
        }

        async fn remove_token(&self, session_id: SessionId) -> AppResult<()> {
            self.locked()?.remove(&session_id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn issued_token_validates_and_stays_reusable() {
        let repo = Arc::new(TestTokenRepo::default());
        let service = CsrfService::new(repo);
        let session_id = SessionId::new();

        let token = service.issue(session_id).await;
        assert!(token.is_ok());
        let token = token.unwrap_or_default();
        assert_eq!(token.len(), 64);

        assert!(service.validate(session_id, Some(&token)).await.is_ok());
        // Multi-use until expiry.
        assert!(service.validate(session_id, Some(&token)).await.is_ok());
    }

    #[tokio::test]
    async fn missing_and_mismatched_tokens_are_rejected() {
        let repo = Arc::new(TestTokenRepo::default());
        let service = CsrfService::new(repo);
        let session_id = SessionId::new();

        assert!(service.validate(session_id, None).await.is_err());
        assert!(service.validate(session_id, Some("")).await.is_err());

        let issued = service.issue(session_id).await;
        assert!(issued.is_ok());
        assert!(
            service
                .validate(session_id, Some("not-the-token"))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn expired_token_is_rejected_and_removed() {
        let repo = Arc::new(TestTokenRepo::default());
        let service = CsrfService::new(repo.clone());
        let session_id = SessionId::new();

        let token = service.issue(session_id).await.unwrap_or_default();
        if let Ok(mut guard) = repo.tokens.lock() {
            if let Some(record) = guard.get_mut(&session_id) {
                record.expires_at = Utc::now() - Duration::seconds(1);
            }
        }

        assert!(service.validate(session_id, Some(&token)).await.is_err());
        let remaining = repo.tokens.lock().map(|guard| guard.len()).unwrap_or(1);
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn tokens_are_bound_to_their_session() {
        let repo = Arc::new(TestTokenRepo::default());
        let service = CsrfService::new(repo);

        let session_a = SessionId::new();
        let session_b = SessionId::new();
        let token = service.issue(session_a).await.unwrap_or_default();

        assert!(service.validate(session_b, Some(&token)).await.is_err());
    }
}
