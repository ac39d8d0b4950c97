//! Login handshake and identity resolution against a mocked portal

mod common;

use common::{CSRF_TOKEN, LOGIN_HASH, MockPortal, USER_ID, classbook_page, landing_page};
use opentam::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::ResponseTemplate;

#[tokio::test]
async fn test_connect_resolves_user_id() {
    let portal = MockPortal::start().await;

    let intranet = portal.connect().await.unwrap();

    assert_eq!(intranet.user_id(), USER_ID);
    assert_eq!(intranet.username(), "max.muster");
    assert_eq!(intranet.school_code(), "krm");
    assert_eq!(intranet.csrf_token(), CSRF_TOKEN);
    assert_eq!(intranet.session().login_hash(), LOGIN_HASH);
}

#[tokio::test]
async fn test_resources_are_seeded_by_connect() {
    let portal = MockPortal::start().await;
    let intranet = portal.connect().await.unwrap();

    let first = intranet.resources().await.unwrap();
    let second = intranet.resources().await.unwrap();

    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first.records("students").count(), 2);
    assert_eq!(first.records("teachers").next().unwrap()["name"].to_string(), "Lehrer, Hans");
}

#[tokio::test]
async fn test_landing_page_without_hash_is_connection_error() {
    let portal = MockPortal::bare().await;
    portal
        .mount_landing("<html><h1>Wartungsarbeiten</h1></html>")
        .await;

    let result = portal.connect().await;
    assert!(matches!(result, Err(Error::Connection(_))));
}

#[tokio::test]
async fn test_landing_page_error_status_is_connection_error() {
    // Nothing mounted, so wiremock answers 404 for the landing page
    let portal = MockPortal::bare().await;

    let result = portal.connect().await;
    assert!(matches!(result, Err(Error::Connection(_))));
}

#[tokio::test]
async fn test_rejected_login_is_bad_status() {
    let portal = MockPortal::bare().await;
    portal.mount_landing(&landing_page(LOGIN_HASH)).await;
    portal.mount_login(500).await;

    match portal.connect().await {
        Err(Error::BadStatusCode { label, status }) => {
            assert_eq!(label, "authentication");
            assert_eq!(status, 500);
        }
        other => panic!("expected BadStatusCode, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_missing_csrf_token_is_authentication_error() {
    let portal = MockPortal::bare().await;
    portal.mount_landing(&landing_page(LOGIN_HASH)).await;
    portal.mount_login(200).await;
    portal
        .mount_classbook("<html><body>Bitte melden Sie sich an</body></html>")
        .await;

    let result = portal.connect().await;
    assert!(matches!(result, Err(Error::Authentication(_))));
}

#[tokio::test]
async fn test_non_json_resources_is_authentication_error() {
    let portal = MockPortal::bare().await;
    portal.mount_landing(&landing_page(LOGIN_HASH)).await;
    portal.mount_login(200).await;
    portal.mount_classbook(&classbook_page(CSRF_TOKEN)).await;
    portal
        .mount_resources(ResponseTemplate::new(200).set_body_string(landing_page("again")))
        .await;

    let result = portal.connect().await;
    assert!(matches!(result, Err(Error::Authentication(_))));
}

#[tokio::test]
async fn test_username_not_on_roster() {
    let portal = MockPortal::bare().await;
    portal.mount_landing(&landing_page(LOGIN_HASH)).await;
    portal.mount_login(200).await;
    portal.mount_classbook(&classbook_page(CSRF_TOKEN)).await;
    portal
        .mount_resources(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"students": [{"personId": 1201, "name": "Beispiel, Eva"}]}
        })))
        .await;

    let result = portal.connect().await;
    assert!(matches!(result, Err(Error::UserIdNotMatching(_))));
}

#[tokio::test]
async fn test_invalid_school_code_never_hits_the_network() {
    let portal = MockPortal::start().await;
    let credentials = opentam::Credentials::new("max.muster", "hunter2", "krm/../admin");

    let result = opentam::Intranet::connect(credentials, portal.settings()).await;

    assert!(matches!(result, Err(Error::Config(_))));
    let requests = portal.server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}
