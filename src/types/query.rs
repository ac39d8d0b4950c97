//! Request and response shapes for the domain operations

use super::record::Record;
use std::sync::Arc;
use std::time::Duration;

/// Which week(s) a timetable request covers
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum DateRange {
    /// Monday 00:00 to Sunday 24:00 of the current week
    #[default]
    CurrentWeek,
    /// Two `DD.MM.YY` dates
    Between { start: String, end: String },
}

/// Timetable request
///
/// ```rust
/// use opentam::TimetableQuery;
///
/// let query = TimetableQuery::between("20.12.21", "25.02.22").for_student(4711);
/// assert_eq!(query.student_id, Some(4711));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimetableQuery {
    pub range: DateRange,
    /// Student whose timetable to fetch, defaults to the logged-in user
    pub student_id: Option<i64>,
    /// Per-request timeout overriding the configured one
    pub timeout: Option<Duration>,
}

impl TimetableQuery {
    /// The current week for the logged-in user
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_week() -> Self {
        Self::default()
    }

    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            range: DateRange::Between {
                start: start.into(),
                end: end.into(),
            },
            ..Self::default()
        }
    }

    pub fn for_student(mut self, student_id: i64) -> Self {
        self.student_id = Some(student_id);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// One lesson or several, for [`crate::Intranet::lesson_absence_data`]
#[derive(Debug, Clone, Copy)]
pub enum Lessons<'a> {
    One(&'a Record),
    Many(&'a [Record]),
}

impl<'a> From<&'a Record> for Lessons<'a> {
    fn from(lesson: &'a Record) -> Self {
        Lessons::One(lesson)
    }
}

impl<'a> From<&'a [Record]> for Lessons<'a> {
    fn from(lessons: &'a [Record]) -> Self {
        Lessons::Many(lessons)
    }
}

impl<'a> From<&'a Vec<Record>> for Lessons<'a> {
    fn from(lessons: &'a Vec<Record>) -> Self {
        Lessons::Many(lessons.as_slice())
    }
}

impl<'a> From<&'a Arc<[Record]>> for Lessons<'a> {
    fn from(lessons: &'a Arc<[Record]>) -> Self {
        Lessons::Many(&lessons[..])
    }
}

/// Absence data shaped like the [`Lessons`] it was requested for
#[derive(Debug, Clone, PartialEq)]
pub enum AbsenceData {
    One(Arc<Record>),
    Many(Vec<Arc<Record>>),
}

impl AbsenceData {
    pub fn len(&self) -> usize {
        match self {
            AbsenceData::One(_) => 1,
            AbsenceData::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<Arc<Record>> {
        match self {
            AbsenceData::One(record) => vec![record],
            AbsenceData::Many(items) => items,
        }
    }
}
