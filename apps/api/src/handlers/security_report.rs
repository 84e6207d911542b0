use axum::Json;
use axum::extract::State;

use crate::dto::SecurityReportResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Returns a snapshot of recorded attacks and active IP blocks.
pub async fn security_report_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<SecurityReportResponse>> {
    let report = state.threat_monitor.security_report().await?;
    Ok(Json(SecurityReportResponse::from(&report)))
}
