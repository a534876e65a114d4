//! Timetable export documents built with the `icalendar` crate.
//!
//! The crate owns component structure, CRLF line endings, folding at 75
//! octets and date formatting. TEXT values are escaped here before they are
//! handed over, since the crate only rewrites raw newlines.

use chrono::{DateTime, NaiveDateTime, Utc};
use icalendar::{Calendar, CalendarDateTime, Component, Event, EventLike};
use uuid::Uuid;

pub const PRODUCT_ID: &str = "-//Campus Pilot//NONSGML Timetable//EN";
pub const CALENDAR_NAME: &str = "Campus Pilot Timetable";
pub const CALENDAR_DESCRIPTION: &str = "Your personalized Campus Pilot Timetable";

/// One calendar entry. Start and end are floating local times.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub uid: Uuid,
    pub stamp: DateTime<Utc>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub summary: String,
    pub description: String,
    pub location: String,
}

/// Escape a TEXT value.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

impl From<&CalendarEvent> for Event {
    fn from(event: &CalendarEvent) -> Self {
        Event::new()
            .uid(&event.uid.to_string())
            .timestamp(event.stamp)
            .starts(CalendarDateTime::Floating(event.start))
            .ends(CalendarDateTime::Floating(event.end))
            .summary(&escape_text(&event.summary))
            .description(&escape_text(&event.description))
            .location(&escape_text(&event.location))
            .done()
    }
}

/// Render a complete calendar containing `events`.
///
/// # Examples
/// ```
/// use campus_backend::domain::ics::render_calendar;
///
/// let body = render_calendar(&[]);
/// assert!(body.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
/// assert!(body.ends_with("END:VCALENDAR\r\n"));
/// ```
pub fn render_calendar(events: &[CalendarEvent]) -> String {
    let mut calendar = Calendar::empty();
    calendar
        .append_property(("VERSION", "2.0"))
        .append_property(("PRODID", PRODUCT_ID))
        .append_property(("CALSCALE", "GREGORIAN"))
        .append_property(("X-WR-CALNAME", CALENDAR_NAME))
        .append_property(("X-WR-CALDESC", CALENDAR_DESCRIPTION));
    for event in events {
        calendar.push(Event::from(event));
    }
    calendar.to_string()
}
