//! Month-grid model backing the club calendar widget.
//!
//! The widget itself is client-side DOM code; this module owns the date
//! arithmetic so the grid and navigation rules are testable server-side.

use chrono::{Datelike, Duration, NaiveDate};
use clubgate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Number of cells in a rendered month grid (6 weeks x 7 days).
pub const GRID_CELL_COUNT: usize = 42;

/// A dated club event shown on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Day the event takes place.
    pub date: NaiveDate,
    /// Short event title.
    pub title: String,
    /// One-line description shown in the day dialog.
    pub description: String,
}

/// The month a viewer is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    /// Creates a cursor for the given year and 1-based month.
    pub fn new(year: i32, month: u32) -> AppResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }

        Ok(Self { year, month })
    }

    /// Creates a cursor for the month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns the cursor year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the 1-based cursor month.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Advances one month, wrapping December into January of the next year.
    #[must_use]
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Regresses one month, wrapping January into December of the prior year.
    #[must_use]
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    fn first_day(&self) -> AppResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(|| {
            AppError::Validation(format!(
                "no such month: year {} month {}",
                self.year, self.month
            ))
        })
    }
}

/// One cell of the rendered month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    /// The calendar date of this cell.
    pub date: NaiveDate,
    /// Whether the date falls inside the cursor month.
    pub in_month: bool,
    /// Whether the date is the viewer's current day.
    pub is_today: bool,
    /// Whether at least one event falls on this date.
    pub has_events: bool,
}

/// A fully computed 42-cell month grid plus the month's event list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthView {
    cursor: MonthCursor,
    cells: Vec<DayCell>,
    events: Vec<CalendarEvent>,
}

impl MonthView {
    /// Builds the grid for `cursor`, marking `today` and event days.
    ///
    /// The grid starts on the Sunday on or before the first of the month and
    /// always spans exactly [`GRID_CELL_COUNT`] cells, so trailing days of the
    /// previous month and leading days of the next month appear dimmed.
    pub fn build(
        cursor: MonthCursor,
        today: NaiveDate,
        events: &[CalendarEvent],
    ) -> AppResult<Self> {
        let first_of_month = cursor.first_day()?;
        let lead_days = i64::from(first_of_month.weekday().num_days_from_sunday());
        let grid_start = first_of_month - Duration::days(lead_days);

        let cells = (0..GRID_CELL_COUNT as i64)
            .map(|offset| {
                let date = grid_start + Duration::days(offset);
                DayCell {
                    date,
                    in_month: date.year() == cursor.year() && date.month() == cursor.month(),
                    is_today: date == today,
                    has_events: events.iter().any(|event| event.date == date),
                }
            })
            .collect();

        let mut month_events: Vec<CalendarEvent> = events
            .iter()
            .filter(|event| {
                event.date.year() == cursor.year() && event.date.month() == cursor.month()
            })
            .cloned()
            .collect();
        month_events.sort_by_key(|event| event.date);

        Ok(Self {
            cursor,
            cells,
            events: month_events,
        })
    }

    /// Returns the cursor this view was built for.
    #[must_use]
    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    /// Returns the 42 grid cells, Sunday-first, top-left to bottom-right.
    #[must_use]
    pub fn cells(&self) -> &[DayCell] {
        self.cells.as_slice()
    }

    /// Returns the cursor month's events in date order.
    #[must_use]
    pub fn events(&self) -> &[CalendarEvent] {
        self.events.as_slice()
    }

    /// Returns the events falling on a single day.
    #[must_use]
    pub fn events_on(&self, date: NaiveDate) -> Vec<&CalendarEvent> {
        self.events
            .iter()
            .filter(|event| event.date == date)
            .collect()
    }
}

/// Returns the fixed club event list, anchored to the month containing `today`.
///
/// Five entries, regenerated at page load and never persisted.
#[must_use]
pub fn sample_events(today: NaiveDate) -> Vec<CalendarEvent> {
    let entries = [
        (3, "Weekly Meeting", "General club meeting in the lab, all welcome."),
        (10, "Intro to Linux Workshop", "Hands-on terminal basics for new members."),
        (17, "CTF Practice Night", "Team practice for the regional capture-the-flag."),
        (24, "Guest Speaker", "Alumni talk on careers in security engineering."),
        (27, "Social Night", "Board games and pizza in the student union."),
    ];

    entries
        .iter()
        .filter_map(|(day, title, description)| {
            NaiveDate::from_ymd_opt(today.year(), today.month(), *day).map(|date| CalendarEvent {
                date,
                title: (*title).to_owned(),
                description: (*description).to_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate};
    use proptest::prelude::*;

    use super::{CalendarEvent, GRID_CELL_COUNT, MonthCursor, MonthView, sample_events};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
    }

    #[test]
    fn december_advances_into_january_of_next_year() {
        let cursor = MonthCursor::new(2025, 12).map(|cursor| cursor.next());
        assert_eq!(cursor.ok(), MonthCursor::new(2026, 1).ok());
    }

    #[test]
    fn january_regresses_into_december_of_prior_year() {
        let cursor = MonthCursor::new(2026, 1).map(|cursor| cursor.previous());
        assert_eq!(cursor.ok(), MonthCursor::new(2025, 12).ok());
    }

    #[test]
    fn cursor_rejects_out_of_range_months() {
        assert!(MonthCursor::new(2026, 0).is_err());
        assert!(MonthCursor::new(2026, 13).is_err());
    }

    #[test]
    fn grid_always_has_42_cells_and_starts_on_sunday() {
        let today = date(2026, 8, 30);
        let cursor = MonthCursor::containing(today);
        let view = MonthView::build(cursor, today, &[]);
        assert!(view.is_ok());

        let view = view.unwrap_or_else(|_| unreachable!());
        assert_eq!(view.cells().len(), GRID_CELL_COUNT);
        // August 1st 2026 is a Saturday; the grid starts the prior Sunday.
        assert_eq!(view.cells()[0].date, date(2026, 7, 26));
        assert!(!view.cells()[0].in_month);
        assert!(view.cells()[6].in_month);
    }

    #[test]
    fn today_and_event_days_are_marked() {
        let today = date(2026, 8, 15);
        let events = vec![CalendarEvent {
            date: date(2026, 8, 20),
            title: "Meeting".to_owned(),
            description: "Lab".to_owned(),
        }];
        let view = MonthCursor::new(2026, 8)
            .and_then(|cursor| MonthView::build(cursor, today, &events));
        assert!(view.is_ok());

        let view = view.unwrap_or_else(|_| unreachable!());
        let today_cells = view.cells().iter().filter(|cell| cell.is_today).count();
        assert_eq!(today_cells, 1);
        assert!(
            view.cells()
                .iter()
                .any(|cell| cell.has_events && cell.date == date(2026, 8, 20))
        );
        assert_eq!(view.events_on(date(2026, 8, 20)).len(), 1);
        assert!(view.events_on(date(2026, 8, 21)).is_empty());
    }

    #[test]
    fn sample_events_stay_inside_the_current_month() {
        let today = date(2026, 2, 1);
        let events = sample_events(today);
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|event| event.date.month() == 2));
    }

    proptest! {
        #[test]
        fn any_month_grid_has_exactly_42_cells(year in 1970i32..2100, month in 1u32..=12) {
            let today = date(2026, 8, 30);
            let view = MonthCursor::new(year, month)
                .and_then(|cursor| MonthView::build(cursor, today, &[]));
            prop_assert!(view.is_ok());
            prop_assert_eq!(view.map(|view| view.cells().len()).unwrap_or_default(), GRID_CELL_COUNT);
        }

        #[test]
        fn navigation_round_trips(year in 1970i32..2100, month in 1u32..=12) {
            let cursor = MonthCursor::new(year, month);
            prop_assert!(cursor.is_ok());
            let cursor = cursor.unwrap_or_else(|_| unreachable!());
            prop_assert_eq!(cursor.next().previous(), cursor);
            prop_assert_eq!(cursor.previous().next(), cursor);
        }
    }
}
