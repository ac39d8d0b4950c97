//! Login credentials

use std::fmt;

/// Username, password and school code for one portal account.
///
/// The username is expected as `firstname.lastname`; the school code selects
/// the portal instance (e.g. `krm` for MNG, `krr` for RGZH).
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub school_code: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        school_code: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            school_code: school_code.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("school_code", &self.school_code)
            .finish()
    }
}
