//! Error type definitions
//!
//! Defines the error taxonomy of the intranet client. Every failure is
//! returned to the caller immediately; nothing is retried.

use thiserror::Error;

/// Main error type for the intranet client
#[derive(Error, Debug)]
pub enum Error {
    /// Portal unreachable, or the landing page lacks the login hash
    #[error("Connection error: {0}")]
    Connection(String),

    /// Login accepted but no usable session came out of it
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Any non-2xx HTTP response
    #[error("Endpoint {label} returned bad status code {status}")]
    BadStatusCode { label: String, status: u16 },

    /// Date string failed strict `DD.MM.YY` parsing, or the window is inverted
    #[error("Bad timestamp: {0}")]
    BadTimestamp(String),

    /// Expected embedded JSON is absent, usually an expired-session login page
    #[error("Wrong webpage returned: {0}")]
    WrongWebpageReturned(String),

    /// Identity resolution against a roster failed
    #[error("User id not matching: {0}")]
    UserIdNotMatching(String),

    /// The portal answered with an empty payload
    #[error("Missing permission: {0}")]
    MissingPermission(String),

    /// JSON envelope carried a status other than success
    #[error("Portal reported status {status} for {label}")]
    PortalStatus { label: String, status: i64 },

    /// A record lacks a field an operation needs
    #[error("Missing field: {field}")]
    MissingField { field: String },

    /// Payload parsed but has an unexpected shape
    #[error("Unexpected payload: {context}")]
    Payload { context: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP client errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL construction errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Picture payload was not valid base64
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Picture payload was not a decodable JPEG
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a new authentication error
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a bad status code error for the labelled endpoint
    pub fn bad_status(label: impl Into<String>, status: u16) -> Self {
        Self::BadStatusCode {
            label: label.into(),
            status,
        }
    }

    /// Create a new bad timestamp error
    pub fn bad_timestamp(msg: impl Into<String>) -> Self {
        Self::BadTimestamp(msg.into())
    }

    /// Create a new wrong webpage error
    pub fn wrong_webpage(msg: impl Into<String>) -> Self {
        Self::WrongWebpageReturned(msg.into())
    }

    /// Create a new user id mismatch error
    pub fn user_id_not_matching(msg: impl Into<String>) -> Self {
        Self::UserIdNotMatching(msg.into())
    }

    /// Create a new missing permission error
    pub fn missing_permission(msg: impl Into<String>) -> Self {
        Self::MissingPermission(msg.into())
    }

    /// Create a portal status error
    pub fn portal_status(label: impl Into<String>, status: i64) -> Self {
        Self::PortalStatus {
            label: label.into(),
            status,
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an unexpected payload error
    pub fn payload(context: impl Into<String>) -> Self {
        Self::Payload {
            context: context.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for the soft failure the portal produces when a session expired
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::WrongWebpageReturned(_))
    }
}
