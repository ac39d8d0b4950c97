//! Portal client
//!
//! [`Intranet`] exposes every portal feature as an async method and
//! memoizes reads per client. [`blocking::Intranet`] wraps it for callers
//! without an async runtime.

pub mod blocking;
pub mod cache;
pub mod identity;
pub mod intranet;

pub use intranet::Intranet;
