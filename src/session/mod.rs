//! Session management for the intranet portal
//!
//! This module owns the login handshake, the cookie-jar HTTP client and the
//! response status validation every request goes through.

pub mod credentials;
pub mod manager;
pub mod validator;

pub use credentials::Credentials;
pub use manager::PortalSession;
