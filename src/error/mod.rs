//! Error handling for the intranet client
//!
//! This module defines the error taxonomy shared by every component.

pub mod types;

pub use types::{Error, Result};
