use chrono::{DateTime, NaiveDate, Utc};
use clubgate_domain::{AttackAttempt, CalendarEvent, DayCell, MonthView, SecurityReport};
use serde::Serialize;

/// Health probe payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Membership form submission outcome.
#[derive(Debug, Serialize)]
pub struct SubmitFormResponse {
    pub success: bool,
    pub message: String,
}

/// One cell of the month grid.
#[derive(Debug, Serialize)]
pub struct DayCellResponse {
    pub date: NaiveDate,
    pub day: u32,
    pub in_month: bool,
    pub is_today: bool,
    pub has_events: bool,
}

impl From<&DayCell> for DayCellResponse {
    fn from(cell: &DayCell) -> Self {
        use chrono::Datelike;
        Self {
            date: cell.date,
            day: cell.date.day(),
            in_month: cell.in_month,
            is_today: cell.is_today,
            has_events: cell.has_events,
        }
    }
}

/// A dated event shown alongside the grid.
#[derive(Debug, Serialize)]
pub struct CalendarEventResponse {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
}

impl From<&CalendarEvent> for CalendarEventResponse {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            date: event.date,
            title: event.title.clone(),
            description: event.description.clone(),
        }
    }
}

/// Full month view: label, grid cells and the month's events.
#[derive(Debug, Serialize)]
pub struct MonthViewResponse {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<DayCellResponse>,
    pub events: Vec<CalendarEventResponse>,
}

impl From<&MonthView> for MonthViewResponse {
    fn from(view: &MonthView) -> Self {
        Self {
            year: view.cursor().year(),
            month: view.cursor().month(),
            cells: view.cells().iter().map(DayCellResponse::from).collect(),
            events: view
                .events()
                .iter()
                .map(CalendarEventResponse::from)
                .collect(),
        }
    }
}

/// A recorded attack attempt, as exposed by the report endpoint.
#[derive(Debug, Serialize)]
pub struct AttackAttemptResponse {
    pub occurred_at: DateTime<Utc>,
    pub source: String,
    pub attack_type: String,
    pub matched_input: String,
}

impl From<&AttackAttempt> for AttackAttemptResponse {
    fn from(attempt: &AttackAttempt) -> Self {
        Self {
            occurred_at: attempt.occurred_at,
            source: attempt.source.to_string(),
            attack_type: attempt.attack_type.as_str().to_owned(),
            matched_input: attempt.matched_input.clone(),
        }
    }
}

/// Aggregate security posture snapshot.
#[derive(Debug, Serialize)]
pub struct SecurityReportResponse {
    pub generated_at: DateTime<Utc>,
    pub blocked_ip_count: usize,
    pub attack_attempt_count: usize,
    pub recent_attempts: Vec<AttackAttemptResponse>,
    pub blocked_ips: Vec<String>,
}

impl From<&SecurityReport> for SecurityReportResponse {
    fn from(report: &SecurityReport) -> Self {
        Self {
            generated_at: report.generated_at,
            blocked_ip_count: report.blocked_ip_count,
            attack_attempt_count: report.attack_attempt_count,
            recent_attempts: report
                .recent_attempts
                .iter()
                .map(AttackAttemptResponse::from)
                .collect(),
            blocked_ips: report.blocked_ips.iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use chrono::Utc;
    use clubgate_domain::{AttackAttempt, AttackType, SecurityReport};

    use super::SecurityReportResponse;

    #[test]
    fn security_report_maps_addresses_and_attempts() {
        let source = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));
        let report = SecurityReport {
            generated_at: Utc::now(),
            blocked_ip_count: 1,
            attack_attempt_count: 1,
            recent_attempts: vec![AttackAttempt::new(source, AttackType::Xss, "<script")],
            blocked_ips: vec![source],
        };

        let response = SecurityReportResponse::from(&report);
        assert_eq!(response.blocked_ips, vec!["203.0.113.7".to_owned()]);
        assert_eq!(response.recent_attempts.len(), 1);
        assert_eq!(response.recent_attempts[0].attack_type, "xss");
        assert_eq!(response.recent_attempts[0].source, "203.0.113.7");
    }
}
