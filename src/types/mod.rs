//! Type definitions for the intranet client
//!
//! This module contains the record wrapper and the request/response shapes
//! of the domain operations.

pub mod query;
pub mod record;

pub use query::{AbsenceData, DateRange, Lessons, TimetableQuery};
pub use record::{Field, Record, Records, records_from_rows};
