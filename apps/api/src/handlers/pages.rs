use axum::extract::State;
use axum::response::Html;
use clubgate_core::AppError;
use tower_sessions::Session;

use crate::error::ApiResult;
use crate::session::visitor_session_id;
use crate::state::AppState;

/// Serves the landing page with a fresh CSRF token injected into the form.
///
/// The hidden input is spliced in just before the closing form tag, so the
/// static page itself never contains a token.
pub async fn index_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Html<String>> {
    let session_id = visitor_session_id(&session).await?;
    let csrf_token = state.csrf_service.issue(session_id).await?;

    let index_path = state.static_dir.join("index.html");
    let page = tokio::fs::read_to_string(&index_path).await.map_err(|error| {
        AppError::Internal(format!(
            "failed to read {}: {error}",
            index_path.display()
        ))
    })?;

    let hidden_input = format!(
        "<input type=\"hidden\" name=\"csrf_token\" value=\"{csrf_token}\">\n</form>"
    );
    let page = page.replacen("</form>", &hidden_input, 1);

    Ok(Html(page))
}
