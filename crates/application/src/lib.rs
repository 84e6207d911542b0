//! Application services and ports.

#![forbid(unsafe_code)]

mod csrf_service;
mod input_inspector;
mod membership_service;
mod rate_limit_service;
mod threat_monitor;

pub use csrf_service::{CSRF_TOKEN_TTL_SECONDS, CsrfService, CsrfTokenRecord, CsrfTokenRepository};
pub use input_inspector::{InputInspector, MAX_INPUT_LENGTH, PatternMatch};
pub use membership_service::{MembershipService, SubmissionInput, SubmissionReceipt};
pub use rate_limit_service::{AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService};
pub use threat_monitor::{
    AttackLogRepository, BlockListRepository, ThreatMonitor, ThreatPolicy,
};
