//! OpenTam - client for the TAM school intranet
//!
//! Logs into a school's instance of the TAM intranet portal and extracts
//! timetable entries, absences, classmates, class teachers, homework and
//! profile pictures. The portal has no API; data is scraped from JSON
//! embedded in its pages and from its AJAX endpoints.
//!
//! # Architecture
//!
//! - [`session`]: login handshake, cookie jar, CSRF token, status checks
//! - [`extract`]: locating JSON, hashes and tokens inside portal markup
//! - [`types`]: [`Record`], the schema-less wrapper every payload becomes
//! - [`client`]: the async [`Intranet`] client with per-client memoization,
//!   and a [`blocking`] facade
//!
//! # Examples
//!
//! ```rust,no_run
//! use opentam::{Credentials, Intranet, Settings};
//!
//! # async fn example() -> opentam::Result<()> {
//! let credentials = Credentials::new("max.muster", "secret", "krm");
//! let intranet = Intranet::connect(credentials, Settings::default()).await?;
//!
//! let resources = intranet.resources().await?;
//! for student in resources.records("students") {
//!     println!("{} | {}", student["personId"], student["name"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod session;
pub mod types;
pub mod utils;

pub use client::{Intranet, blocking};
pub use config::Settings;
pub use error::{Error, Result};
pub use session::Credentials;
pub use types::{AbsenceData, DateRange, Field, Lessons, Record, Records, TimetableQuery};
