//! The membership form guard: a linear sequence of independent checks.
//!
//! Order matters and mirrors the endpoint contract: CSRF first, then the
//! cheap length bound, then the denylist, then structural validation. Every
//! rejection is recorded with the threat monitor so repeat offenders get
//! blocked; the monitor owns that escalation.


use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

use clubgate_core::{AppError, AppResult, SessionId};
use clubgate_domain::{AttackType, ClassYear, EmailAddress, MemberName, MembershipApplication};

use crate::csrf_service::CsrfService;
use crate::input_inspector::{InputInspector, MAX_INPUT_LENGTH};
use crate::threat_monitor::ThreatMonitor;

/// Raw fields as received from the form endpoint, unvalidated.
#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    /// Submitted name field.
    pub name: String,
    /// Submitted email field.
    pub email: String,
    /// Submitted year field.
    pub year: String,
    /// Submitted CSRF token, if any.
    pub csrf_token: Option<String>,
}

/// Outcome of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// The accepted application.
    pub application: MembershipApplication,
    /// User-facing confirmation message.
    pub message: String,
}

/// Application service guarding the membership form endpoint.
#[derive(Clone)]
pub struct MembershipService {
    csrf_service: CsrfService,
    inspector: Arc<InputInspector>,
    monitor: ThreatMonitor,
}

impl MembershipService {
    /// Creates the form guard.
    #[must_use]
    pub fn new(
        csrf_service: CsrfService,
        inspector: Arc<InputInspector>,
        monitor: ThreatMonitor,
    ) -> Self {
        Self {
            csrf_service,
            inspector,
            monitor,
        }
    }

    /// Runs the full check sequence for one submission.
    ///
    /// Each check is evaluated once with no cross-request coordination beyond
    /// the monitor's counters. A failed check records an attack attempt and
    /// returns the corresponding error; later checks are not evaluated.
    pub async fn submit_application(
        &self,
        source: IpAddr,
        session_id: SessionId,
        input: SubmissionInput,
    ) -> AppResult<SubmissionReceipt> {
        if let Err(error) = self
            .csrf_service
            .validate(session_id, input.csrf_token.as_deref())
            .await
        {
            self.monitor
                .record_attempt(
                    source,
                    AttackType::CsrfViolation,
                    input.csrf_token.as_deref().unwrap_or("<missing>"),
                )
                .await?;
            return Err(error);
        }

        let fields = [
            ("name", input.name.as_str()),
            ("email", input.email.as_str()),
            ("year", input.year.as_str()),
        ];

        for (label, value) in fields {
            if value.len() > MAX_INPUT_LENGTH {
                return Err(self
                    .reject(source, AttackType::OversizedInput, value, label)
                    .await?);
            }

            if let Some(hit) = self.inspector.classify(value) {
                return Err(self
                    .reject(source, hit.attack_type, &hit.matched, label)
                    .await?);
            }
        }

        let name = match MemberName::new(input.name.as_str()) {
            Ok(name) => name,
            Err(_) => {
                return Err(self
                    .reject(source, AttackType::MalformedInput, &input.name, "name")
                    .await?);
            }
        };
        let email = match EmailAddress::new(input.email.as_str()) {
            Ok(email) => email,
            Err(_) => {
                return Err(self
                    .reject(source, AttackType::MalformedInput, &input.email, "email")
                    .await?);
            }
        };
        let year = match ClassYear::from_str(input.year.as_str()) {
            Ok(year) => year,
            Err(_) => {
                return Err(self
                    .reject(source, AttackType::MalformedInput, &input.year, "year")
                    .await?);
            }
        };

        let application = MembershipApplication::new(name, email, year);
        let display_name = self.inspector.sanitize(application.name().as_str());
        let message = format!(
            "Thank you for joining, {display_name}! We'll be in touch at {} soon.",
            application.email().as_str()
        );

        Ok(SubmissionReceipt {
            application,
            message,
        })
    }

    /// Records the rejection and builds the user-facing error.
    async fn reject(
        &self,
        source: IpAddr,
        attack_type: AttackType,
        offending_input: &str,
        field_label: &str,
    ) -> AppResult<AppError> {
        self.monitor
            .record_attempt(source, attack_type, offending_input)
            .await?;

        Ok(AppError::Validation(format!(
            "invalid {field_label} format"
        )))
    }
}
