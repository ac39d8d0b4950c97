//! Timetable window calculation
//!
//! The timetable endpoint takes millisecond UNIX timestamps. Callers either
//! ask for the current week or pass portal-style `DD.MM.YY` dates.

use crate::config::DateOrderPolicy;
use crate::{Error, Result};
use chrono::{Datelike, Duration, Local, NaiveDate, TimeZone};
use std::sync::OnceLock;

/// Date format the portal uses in its own forms
pub const PORTAL_DATE_FORMAT: &str = "%d.%m.%y";

/// Half-open time range in milliseconds since the epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeWindow {
    pub fn is_ordered(&self) -> bool {
        self.start_ms < self.end_ms
    }
}

fn midnight_ms<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<i64> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::bad_timestamp(format!("no midnight on {}", date)))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| Error::bad_timestamp(format!("midnight of {} does not exist locally", date)))
}

/// Monday 00:00 of `today`'s week up to the following Monday 00:00
/// (Sunday 24:00), both in `tz`.
pub fn week_window<Tz: TimeZone>(today: NaiveDate, tz: &Tz) -> Result<TimeWindow> {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    let next_monday = monday + Duration::days(7);

    Ok(TimeWindow {
        start_ms: midnight_ms(monday, tz)?,
        end_ms: midnight_ms(next_monday, tz)?,
    })
}

/// The local current week, computed once per process
pub fn current_week() -> Result<TimeWindow> {
    static CURRENT_WEEK: OnceLock<TimeWindow> = OnceLock::new();

    if let Some(window) = CURRENT_WEEK.get() {
        return Ok(*window);
    }
    let window = week_window(Local::now().date_naive(), &Local)?;
    tracing::debug!("Monday: {}, Sunday: {}", window.start_ms, window.end_ms);
    Ok(*CURRENT_WEEK.get_or_init(|| window))
}

/// Parse a strict `DD.MM.YY` date into local midnight, in milliseconds
pub fn parse_portal_date<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<i64> {
    let date = NaiveDate::parse_from_str(input.trim(), PORTAL_DATE_FORMAT).map_err(|e| {
        Error::bad_timestamp(format!(
            "Bad timestamp, format needs to be 'DD.MM.YY' ({:?}: {})",
            input, e
        ))
    })?;
    midnight_ms(date, tz)
}

/// Window between two `DD.MM.YY` dates. An inverted window is either logged
/// or rejected depending on `policy`.
pub fn custom_window<Tz: TimeZone>(
    start: &str,
    end: &str,
    tz: &Tz,
    policy: DateOrderPolicy,
) -> Result<TimeWindow> {
    let window = TimeWindow {
        start_ms: parse_portal_date(start, tz)?,
        end_ms: parse_portal_date(end, tz)?,
    };

    if !window.is_ordered() {
        match policy {
            DateOrderPolicy::Warn => {
                tracing::error!("start date {} needs to be before end date {}", start, end);
            }
            DateOrderPolicy::Reject => {
                return Err(Error::bad_timestamp(format!(
                    "start date {} is not before end date {}",
                    start, end
                )));
            }
        }
    }

    Ok(window)
}
