//! Utility functions and helpers
//!
//! This module contains utility functions used throughout the client.

pub mod time;

pub use time::{TimeWindow, current_week, custom_window, parse_portal_date, week_window};
