//! Attack-attempt records and blocked-address state.

use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clubgate_core::AppError;
use serde::{Deserialize, Serialize};

/// Classification tag for a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    /// Script injection into a form field or URL.
    Xss,
    /// SQL meta sequences in submitted input.
    SqlInjection,
    /// Shell command fragments in submitted input.
    CommandInjection,
    /// `../` style path escape sequences.
    PathTraversal,
    /// Missing, expired, or mismatched CSRF token.
    CsrfViolation,
    /// Field exceeding the configured length bound.
    OversizedInput,
    /// Input that fails structural validation without a recognized payload.
    MalformedInput,
}

impl AttackType {
    /// Returns a stable log value for this tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xss => "xss",
            Self::SqlInjection => "sql_injection",
            Self::CommandInjection => "command_injection",
            Self::PathTraversal => "path_traversal",
            Self::CsrfViolation => "csrf_violation",
            Self::OversizedInput => "oversized_input",
            Self::MalformedInput => "malformed_input",
        }
    }
}

impl FromStr for AttackType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "xss" => Ok(Self::Xss),
            "sql_injection" => Ok(Self::SqlInjection),
            "command_injection" => Ok(Self::CommandInjection),
            "path_traversal" => Ok(Self::PathTraversal),
            "csrf_violation" => Ok(Self::CsrfViolation),
            "oversized_input" => Ok(Self::OversizedInput),
            "malformed_input" => Ok(Self::MalformedInput),
            _ => Err(AppError::Validation(format!(
                "unknown attack type '{value}'"
            ))),
        }
    }
}

/// One rejected request, as recorded by the threat monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackAttempt {
    /// When the rejection happened.
    pub occurred_at: DateTime<Utc>,
    /// Address the request came from.
    pub source: IpAddr,
    /// Classification of the rejection.
    pub attack_type: AttackType,
    /// The offending input, truncated by the recorder.
    pub matched_input: String,
}

impl AttackAttempt {
    /// Creates an attempt record stamped with the current time.
    #[must_use]
    pub fn new(source: IpAddr, attack_type: AttackType, matched_input: impl Into<String>) -> Self {
        Self {
            occurred_at: Utc::now(),
            source,
            attack_type,
            matched_input: matched_input.into(),
        }
    }
}

/// An active block entry for a source address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpBlock {
    /// The blocked address.
    pub address: IpAddr,
    /// Why the address was blocked.
    pub reason: String,
    /// When the block was applied.
    pub blocked_at: DateTime<Utc>,
    /// When the block lapses.
    pub expires_at: DateTime<Utc>,
}

impl IpBlock {
    /// Returns whether the block is still in force at `now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Point-in-time snapshot of monitor state for the reporting endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityReport {
    /// When the snapshot was taken.
    pub generated_at: DateTime<Utc>,
    /// Number of currently blocked addresses.
    pub blocked_ip_count: usize,
    /// Total attack attempts recorded this process lifetime.
    pub attack_attempt_count: usize,
    /// The most recent attempts, newest last.
    pub recent_attempts: Vec<AttackAttempt>,
    /// Currently blocked addresses.
    pub blocked_ips: Vec<IpAddr>,
}
