//! Integration tests for following files.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, grantee, owner, stranger};

#[tokio::test]
async fn test_follow_and_unfollow() {
    let app = TestApp::new().await;
    let file = app.create_file(owner(), None, "permit.pdf").await;
    app.share(owner(), file, grantee(), false).await;

    let response = app
        .request(
            "POST",
            &format!("/api/nodes/{file}/follow"),
            Some(json!({ "days_before_alert": 14, "alert_on_expiry": true })),
            Some(grantee()),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["days_before_alert"], 14);

    let response = app
        .request("GET", &format!("/api/nodes/{file}/followers"), None, Some(owner()))
        .await;
    let followers = response.body["data"].as_array().unwrap();
    assert!(followers.iter().any(|f| f["actor_id"] == 7));

    let response = app
        .request("DELETE", &format!("/api/nodes/{file}/follow"), None, Some(grantee()))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request("DELETE", &format!("/api/nodes/{file}/follow"), None, Some(grantee()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_follow_without_body_uses_defaults() {
    let app = TestApp::new().await;
    let file = app.create_file(owner(), None, "permit.pdf").await;
    app.share(owner(), file, grantee(), false).await;

    let response = app
        .request("POST", &format!("/api/nodes/{file}/follow"), None, Some(grantee()))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["days_before_alert"], 7);
    assert_eq!(response.body["data"]["alert_on_expiry"], true);
}

#[tokio::test]
async fn test_follow_rejections() {
    let app = TestApp::new().await;
    let folder = app.create_folder(owner(), None, "Docs").await;
    let file = app.create_file(owner(), None, "permit.pdf").await;

    let response = app
        .request("POST", &format!("/api/nodes/{folder}/follow"), None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("POST", &format!("/api/nodes/{file}/follow"), None, Some(stranger()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owner_is_subscribed_on_first_read() {
    let app = TestApp::new().await;
    let file = app.create_file(owner(), None, "permit.pdf").await;

    let response = app
        .request("GET", &format!("/api/nodes/{file}"), None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", &format!("/api/nodes/{file}"), None, Some(owner()))
        .await;
    assert_eq!(response.body["data"]["following"]["actor_id"], 42);
    assert_eq!(response.body["data"]["follower_count"], 1);
}
