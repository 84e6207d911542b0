//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod calendar;
mod member;
mod threat;

pub use calendar::{CalendarEvent, DayCell, GRID_CELL_COUNT, MonthCursor, MonthView, sample_events};
pub use member::{
    ClassYear, EmailAddress, MemberName, MembershipApplication, NAME_MAX_LENGTH, NAME_MIN_LENGTH,
};
pub use threat::{AttackAttempt, AttackType, IpBlock, SecurityReport};
