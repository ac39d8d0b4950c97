//! # Portal session
//!
//! A [`PortalSession`] is an authenticated cookie-jar session against one
//! school's portal instance. Opening one performs the login handshake:
//!
//! 1. GET the portal root and read the hidden `hash` input
//! 2. POST `hash`, `loginschool`, `loginuser`, `loginpassword` to the school URL
//! 3. GET `timetable/classbook` and read the CSRF token from its script
//!
//! Cookies set during the handshake are kept by the underlying
//! [`reqwest::Client`] and sent with every later request. AJAX requests
//! additionally carry the CSRF token and an `X-Requested-With` header.
//!
//! ```rust,no_run
//! use opentam::{Credentials, Settings, session::PortalSession};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let credentials = Credentials::new("max.muster", "secret", "krm");
//! let session = PortalSession::open(&credentials, Arc::new(Settings::default())).await?;
//! println!("CSRF token: {}", session.csrf_token());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

use crate::{
    Error, Result,
    config::Settings,
    extract::{extract_csrf_token, extract_login_hash, parse_ajax_json},
    session::{Credentials, validator},
};
use reqwest::{Client, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const XHR_HEADER: &str = "X-Requested-With";
const XHR_VALUE: &str = "XMLHttpRequest";

/// Authenticated session against one school's portal instance
#[derive(Debug)]
pub struct PortalSession {
    /// HTTP client owning the cookie jar
    http_client: Client,
    /// Configuration settings
    settings: Arc<Settings>,
    /// Portal root, where the landing page lives
    portal_url: Url,
    /// `<portal root>/<school code>/`
    school_url: Url,
    school_code: String,
    /// Hidden hash read from the landing page
    login_hash: String,
    /// Anti-forgery token for AJAX requests
    csrf_token: String,
}

impl PortalSession {
    /// Log in and capture the CSRF token.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the landing page is unreachable or lacks
    ///   the hash input
    /// - [`Error::BadStatusCode`] if the login or classbook request fails
    /// - [`Error::Authentication`] if the classbook page has no CSRF token
    pub async fn open(credentials: &Credentials, settings: Arc<Settings>) -> Result<Self> {
        settings.validate()?;

        let school_code = credentials.school_code.trim();
        if !is_valid_school_code(school_code) {
            return Err(Error::config(format!(
                "Invalid school code: {:?}",
                credentials.school_code
            )));
        }

        let http_client = Client::builder()
            .user_agent(settings.portal.user_agent.as_str())
            .cookie_store(true)
            .timeout(settings.http.request_timeout())
            .build()?;

        let portal_url = Url::parse(&settings.portal.base_url)?;
        let school_url = portal_url.join(&format!("{}/", school_code))?;

        tracing::debug!("Username set to: {}", credentials.username);
        tracing::debug!("URL has been set to {}", school_url);

        let login_hash = Self::fetch_login_hash(&http_client, &portal_url).await?;
        tracing::debug!("login hash = {}", login_hash);

        let response = http_client
            .post(school_url.clone())
            .form(&[
                ("hash", login_hash.as_str()),
                ("loginschool", school_code),
                ("loginuser", credentials.username.as_str()),
                ("loginpassword", credentials.password.as_str()),
            ])
            .timeout(settings.http.login_timeout())
            .send()
            .await?;
        validator::check("authentication", response)?;

        let response = http_client
            .get(school_url.join("timetable/classbook")?)
            .send()
            .await?;
        let classbook = validator::check("classbook", response)?.text().await?;

        let csrf_token = extract_csrf_token(&classbook).ok_or_else(|| {
            Error::authentication("Could not authenticate, classbook page carries no CSRF token")
        })?;
        tracing::debug!("csrf token = {}", csrf_token);

        Ok(Self {
            http_client,
            settings,
            portal_url,
            school_url,
            school_code: school_code.to_string(),
            login_hash,
            csrf_token,
        })
    }

    async fn fetch_login_hash(http_client: &Client, portal_url: &Url) -> Result<String> {
        let response = http_client
            .get(portal_url.clone())
            .send()
            .await
            .map_err(|e| Error::connection(format!("Cannot connect to server: {}", e)))?;
        let response = validator::check("base-url", response)
            .map_err(|e| Error::connection(format!("Cannot connect to server: {}", e)))?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::connection(format!("Cannot read landing page: {}", e)))?;

        extract_login_hash(&body)
            .ok_or_else(|| Error::connection("Landing page has no login hash input"))
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    pub fn login_hash(&self) -> &str {
        &self.login_hash
    }

    pub fn school_code(&self) -> &str {
        &self.school_code
    }

    pub fn portal_url(&self) -> &Url {
        &self.portal_url
    }

    pub fn school_url(&self) -> &Url {
        &self.school_url
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolve `path` relative to the school URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.school_url.join(path)?)
    }

    /// GET a server-rendered page and return its body
    pub async fn get_page(&self, label: &str, path: &str) -> Result<String> {
        let response = self.http_client.get(self.endpoint(path)?).send().await?;
        Ok(validator::check(label, response)?.text().await?)
    }

    /// POST an AJAX form; the CSRF token is appended to `form`
    pub async fn post_ajax(
        &self,
        label: &str,
        path: &str,
        form: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> Result<Response> {
        let mut fields: Vec<(&str, &str)> =
            form.iter().map(|(k, v)| (*k, v.as_str())).collect();
        fields.push(("csrfToken", self.csrf_token.as_str()));

        let mut request = self
            .http_client
            .post(self.endpoint(path)?)
            .header(XHR_HEADER, XHR_VALUE)
            .form(&fields);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        validator::check(label, request.send().await?)
    }

    /// [`PortalSession::post_ajax`] and parse the body as JSON
    pub async fn post_ajax_json(
        &self,
        label: &str,
        path: &str,
        form: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let body = self.post_ajax(label, path, form, timeout).await?.text().await?;
        parse_ajax_json(label, &body)
    }
}

/// A school code is one URL path segment: ASCII letters, digits, `-`, `_`
fn is_valid_school_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}
