use std::path::PathBuf;
use std::sync::Arc;

use clubgate_application::{
    CsrfService, InputInspector, MembershipService, RateLimitRule, RateLimitService, ThreatMonitor,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub membership_service: MembershipService,
    pub csrf_service: CsrfService,
    pub rate_limit_service: RateLimitService,
    pub threat_monitor: ThreatMonitor,
    pub inspector: Arc<InputInspector>,
    /// Site-wide per-IP quota applied by middleware on every route.
    pub global_rate_rule: RateLimitRule,
    pub static_dir: PathBuf,
}
