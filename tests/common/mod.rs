//! Common test utilities and helpers
//!
//! [`MockPortal`] stands in for one school's portal instance. `start()`
//! mounts a working login handshake; individual `mount_*` helpers let a test
//! break one step of it.

#![allow(dead_code)]

use opentam::{Credentials, Intranet, Settings};
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SCHOOL: &str = "krm";
pub const USERNAME: &str = "max.muster";
pub const USER_ID: i64 = 4711;
pub const CSRF_TOKEN: &str = "tok123";
pub const LOGIN_HASH: &str = "c0ffee42";

pub struct MockPortal {
    pub server: MockServer,
}

impl MockPortal {
    /// Portal with nothing mounted
    pub async fn bare() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Portal accepting `max.muster` with the default roster
    pub async fn start() -> Self {
        let portal = Self::bare().await;
        portal.mount_landing(&landing_page(LOGIN_HASH)).await;
        portal.mount_login(200).await;
        portal.mount_classbook(&classbook_page(CSRF_TOKEN)).await;
        portal
            .mount_resources(ResponseTemplate::new(200).set_body_json(roster()))
            .await;
        portal
    }

    pub fn settings(&self) -> Settings {
        Settings::new().with_base_url(format!("{}/", self.server.uri()))
    }

    pub fn credentials() -> Credentials {
        Credentials::new(USERNAME, "hunter2", SCHOOL)
    }

    pub async fn connect(&self) -> opentam::Result<Intranet> {
        Intranet::connect(Self::credentials(), self.settings()).await
    }

    pub async fn mount_landing(&self, html: &str) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_login(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(format!("/{}/", SCHOOL)))
            .and(body_string_contains(format!("hash={}", LOGIN_HASH)))
            .and(body_string_contains(format!("loginuser={}", USERNAME)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_classbook(&self, html: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/{}/timetable/classbook", SCHOOL)))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_resources(&self, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(format!("/{}/timetable/ajax-get-resources", SCHOOL)))
            .and(header("X-Requested-With", "XMLHttpRequest"))
            .and(body_string_contains(format!("csrfToken={}", CSRF_TOKEN)))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// AJAX endpoint under the school URL answering with `body`, expected
    /// to be hit exactly `times` times
    pub async fn mount_ajax(&self, endpoint: &str, body: Value, times: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/{}/{}", SCHOOL, endpoint)))
            .and(body_string_contains(format!("csrfToken={}", CSRF_TOKEN)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Grid list page `list/index/list/<id>` carrying `rows`
    pub async fn mount_list(&self, id: u32, rows: Value, times: u64) {
        let blob = json!({"data": {"data": rows}, "config": {"pageSize": 50}});
        Mock::given(method("GET"))
            .and(path(format!("/{}/list/index/list/{}", SCHOOL, id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(grid_page(&blob)))
            .expect(times)
            .mount(&self.server)
            .await;
    }
}

pub fn landing_page(hash: &str) -> String {
    format!(
        r#"<html><body><form method="post">
<input type="text" name="loginuser">
<input type="password" name="loginpassword">
<input type="hidden" name="hash" value="{}">
</form></body></html>"#,
        hash
    )
}

pub fn classbook_page(token: &str) -> String {
    format!(
        "<html><script>window.app = {{csrfToken='{}', locale: 'de'}};</script></html>",
        token
    )
}

/// The login form the portal serves in place of data once a session expired
pub fn reauth_page() -> String {
    landing_page("expired")
}

/// List page with `blob` embedded and double-escaped like the portal does
pub fn grid_page(blob: &Value) -> String {
    let escaped = blob.to_string().replace('\\', "\\\\");
    format!(
        "<html><script>$(function() {{ new Grid({{gridDataAndConfiguration:{},frontendConfig: {{\"paging\": true}}}}); }});</script></html>",
        escaped
    )
}

pub fn roster() -> Value {
    json!({
        "status": 1,
        "data": {
            "students": [
                {"personId": 1201, "name": "Beispiel, Eva"},
                {"personId": USER_ID, "name": "Muster, Max"}
            ],
            "teachers": [{"personId": 88, "name": "Lehrer, Hans"}]
        }
    })
}

pub fn classmates() -> Value {
    json!([
        {"PersonID": "1201", "Name": "Beispiel", "Vorname": "Eva"},
        {"PersonID": "4711", "Name": "Muster", "Vorname": "Max"}
    ])
}
