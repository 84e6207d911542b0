use clubgate_core::{AppError, SessionId};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::ApiError;

/// Session key holding the anonymous visitor identifier.
pub const SESSION_VISITOR_KEY: &str = "visitor_id";

/// Returns the visitor's session identifier, minting one on first contact.
///
/// CSRF tokens are bound to this identifier, so every visitor gets one as
/// soon as they touch a route that needs it.
pub async fn visitor_session_id(session: &Session) -> Result<SessionId, ApiError> {
    let existing = session
        .get::<Uuid>(SESSION_VISITOR_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session: {error}")))?;

    if let Some(id) = existing {
        return Ok(SessionId::from_uuid(id));
    }

    let session_id = SessionId::new();
    session
        .insert(SESSION_VISITOR_KEY, session_id.as_uuid())
        .await
        .map_err(|error| AppError::Internal(format!("failed to write session: {error}")))?;

    Ok(session_id)
}
