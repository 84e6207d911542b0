use axum::Json;
use axum::extract::Path;
use chrono::Utc;
use clubgate_domain::{MonthCursor, MonthView, sample_events};

use crate::dto::MonthViewResponse;
use crate::error::ApiResult;

/// Returns the 42-cell grid and event list for one month.
pub async fn month_view_handler(
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<Json<MonthViewResponse>> {
    let today = Utc::now().date_naive();
    let cursor = MonthCursor::new(year, month)?;
    let events = sample_events(today);
    let view = MonthView::build(cursor, today, &events)?;

    Ok(Json(MonthViewResponse::from(&view)))
}
