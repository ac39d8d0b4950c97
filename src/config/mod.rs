//! Configuration management for the intranet client
//!
//! This module handles loading and managing the settings a client is built with.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{
    DateOrderPolicy, HttpSettings, ListIds, LoggingSettings, PortalSettings, Settings,
    TimetableSettings,
};
