//! Text extraction from portal markup
//!
//! The portal renders most data into inline JavaScript instead of serving it
//! through an API. This module locates those fragments: the login hash on the
//! landing page, the CSRF token on the classbook page, and the JSON grid blob
//! embedded in list pages.
//!
//! When a session has expired the portal answers `200 OK` with its login
//! page, so a missing fragment is reported as
//! [`Error::WrongWebpageReturned`] rather than as an HTTP failure.

pub mod patterns;

use crate::{Error, Result};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

pub use patterns::{CSRF_TOKEN, GRID_DATA};

/// Pull the JSON blob captured by `pattern`'s first group out of `body`.
///
/// The portal double-escapes embedded JSON, so every `\\` is collapsed to a
/// single `\` before parsing.
pub fn extract_json(body: &str, pattern: &Regex) -> Result<Value> {
    let blob = pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| {
            Error::wrong_webpage(
                "Intranet returned a page without the expected data, likely a reauth page",
            )
        })?
        .as_str();

    let unescaped = blob.replace("\\\\", "\\");
    Ok(serde_json::from_str(&unescaped)?)
}

/// Rows of a `list/index/list/<id>` grid page (`data.data` of the blob)
pub fn extract_grid_rows(body: &str) -> Result<Vec<Value>> {
    let mut blob = extract_json(body, &GRID_DATA)?;
    match blob
        .get_mut("data")
        .and_then(|data| data.get_mut("data"))
        .map(Value::take)
    {
        Some(Value::Array(rows)) => Ok(rows),
        Some(other) => Err(Error::payload(format!(
            "grid data is not a list: {}",
            other
        ))),
        None => Err(Error::payload("grid blob lacks data.data")),
    }
}

/// Value of the hidden hash input on the landing page
pub fn extract_login_hash(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let named = Selector::parse(r#"input[name="hash"]"#).ok()?;
    if let Some(value) = document
        .select(&named)
        .find_map(|input| input.value().attr("value"))
    {
        return Some(value.to_string());
    }

    // Older landing pages carry the hash in the first input without a name
    let any_input = Selector::parse("input[value]").ok()?;
    document
        .select(&any_input)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}

/// Anti-forgery token assigned in the classbook page script
pub fn extract_csrf_token(html: &str) -> Option<String> {
    CSRF_TOKEN
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse an AJAX body, treating non-JSON as the login page in disguise
pub fn parse_ajax_json(label: &str, body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| {
        tracing::debug!("{} returned non-JSON body: {}", label, e);
        Error::wrong_webpage(format!(
            "{} returned a reauth page instead of JSON. This is likely an authentication error",
            label
        ))
    })
}
