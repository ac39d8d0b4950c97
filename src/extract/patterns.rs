//! Compiled patterns for the portal's inline scripts

use regex::Regex;
use std::sync::LazyLock;

/// `csrfToken='<word>'` in the classbook page
pub static CSRF_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"csrfToken\s*=\s*'(\w+)'").expect("valid csrf token pattern")
});

/// The object assigned to `gridDataAndConfiguration:`, up to the `,front`
/// marker that follows it. Greedy and dot-all: the blob itself contains
/// braces and may span lines.
pub static GRID_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)gridDataAndConfiguration:(\{.*\}),front").expect("valid grid data pattern")
});
