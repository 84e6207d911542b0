use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Multipart, State};
use axum::http::HeaderMap;
use clubgate_application::SubmissionInput;
use clubgate_core::AppError;
use tower_sessions::Session;

use crate::dto::SubmitFormResponse;
use crate::error::ApiResult;
use crate::middleware::resolve_client_ip;
use crate::session::visitor_session_id;
use crate::state::AppState;

/// Accepts a membership application from the signup form.
pub async fn submit_form_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    session: Session,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<Json<SubmitFormResponse>> {
    let source = resolve_client_ip(&headers, peer.ip());
    let session_id = visitor_session_id(&session).await?;
    let input = read_form_fields(multipart).await?;

    let receipt = state
        .membership_service
        .submit_application(source, session_id, input)
        .await?;

    tracing::info!(
        source = %source,
        email = receipt.application.email().as_str(),
        "membership application accepted"
    );

    Ok(Json(SubmitFormResponse {
        success: true,
        message: receipt.message,
    }))
}

async fn read_form_fields(mut multipart: Multipart) -> Result<SubmissionInput, AppError> {
    let mut input = SubmissionInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::Validation("malformed form data".to_owned()))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|_| AppError::Validation("malformed form data".to_owned()))?;

        match name.as_str() {
            "name" => input.name = value,
            "email" => input.email = value,
            "year" => input.year = value,
            "csrf_token" => input.csrf_token = Some(value),
            _ => {}
        }
    }

    Ok(input)
}
