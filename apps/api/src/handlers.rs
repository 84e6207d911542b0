mod calendar;
mod health;
mod membership;
mod pages;
mod security_report;

pub use calendar::month_view_handler;
pub use health::health_handler;
pub use membership::submit_form_handler;
pub use pages::index_handler;
pub use security_report::security_report_handler;
