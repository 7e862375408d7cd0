//! Integration tests for node create, read, update and move.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{self, TestApp, owner, stranger};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_missing_or_invalid_actor_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/nodes", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "UNAUTHENTICATED");

    let response = app
        .request_with_headers(
            "GET",
            "/api/nodes",
            &[("x-actor-id", "42"), ("x-actor-kind", "robot")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request_with_headers(
            "GET",
            "/api/nodes",
            &[("x-actor-id", "abc"), ("x-actor-kind", "pf")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_list_and_read() {
    let app = TestApp::new().await;
    let docs = app.create_folder(owner(), None, "Docs").await;
    let contract = app.create_file(owner(), Some(docs), "contract.pdf").await;
    let readme = app.create_file(owner(), None, "readme.txt").await;

    assert_eq!(app.list_ids(owner(), None).await, vec![docs, readme]);
    assert_eq!(app.list_ids(owner(), Some(docs)).await, vec![contract]);
    assert!(app.list_ids(stranger(), None).await.is_empty());
    assert!(app.list_ids(stranger(), Some(docs)).await.is_empty());

    let response = app
        .request("GET", &format!("/api/nodes/{contract}"), None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["name"], "contract.pdf");
    assert_eq!(data["parent_id"], docs);
    assert_eq!(data["editable"], true);
    assert_eq!(data["is_owner"], true);

    let response = app
        .request("GET", &format!("/api/nodes/{contract}"), None, Some(stranger()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("GET", "/api/nodes?search=contract", None, Some(owner()))
        .await;
    assert_eq!(helpers::ids(&response.body["data"]), vec![contract]);
}

#[tokio::test]
async fn test_create_rejects_bad_parents() {
    let app = TestApp::new().await;
    let file = app.create_file(owner(), None, "notes.txt").await;

    let response = app
        .request(
            "POST",
            "/api/nodes",
            Some(json!({ "parent_id": file, "kind": "file", "name": "child" })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "NOT_A_FOLDER");

    let response = app
        .request(
            "POST",
            "/api/nodes",
            Some(json!({ "parent_id": 999, "kind": "file", "name": "child" })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "POST",
            "/api/nodes",
            Some(json!({ "kind": "folder", "name": "" })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "VALIDATION");
}

#[tokio::test]
async fn test_update_attributes() {
    let app = TestApp::new().await;
    let file = app.create_file(owner(), None, "draft.pdf").await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/nodes/{file}"),
            Some(json!({ "name": "final.pdf", "status": "approved", "expires_on": "2027-03-01" })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["name"], "final.pdf");
    assert_eq!(response.body["data"]["status"], "approved");
    assert_eq!(response.body["data"]["expires_on"], "2027-03-01");

    let response = app
        .request(
            "PATCH",
            &format!("/api/nodes/{file}"),
            Some(json!({ "name": "stolen.pdf" })),
            Some(stranger()),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_archive_move_and_cyclic_rejection() {
    let app = TestApp::new().await;
    let archive = app.create_folder(owner(), None, "Archive").await;
    let year = app.create_folder(owner(), Some(archive), "2024").await;
    let inbox = app.create_folder(owner(), None, "Inbox").await;
    let file = app.create_file(owner(), None, "scan.pdf").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/nodes/{inbox}/move"),
            Some(json!({ "parent_id": year })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["parent_id"], year);

    let response = app
        .request(
            "PUT",
            &format!("/api/nodes/{archive}/move"),
            Some(json!({ "parent_id": inbox })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error(), "CYCLIC_MOVE");

    let response = app
        .request(
            "PUT",
            &format!("/api/nodes/{archive}/move"),
            Some(json!({ "parent_id": archive })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.error(), "INVALID_TARGET");

    let response = app
        .request(
            "PUT",
            &format!("/api/nodes/{archive}/move"),
            Some(json!({ "parent_id": file })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.error(), "NOT_A_FOLDER");

    let response = app
        .request(
            "PUT",
            &format!("/api/nodes/{inbox}/move"),
            Some(json!({ "parent_id": null })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(app.list_ids(owner(), None).await.contains(&inbox));
}

#[tokio::test]
async fn test_history_lists_node_events_newest_first() {
    let app = TestApp::new().await;
    let file = app.create_file(owner(), None, "draft.pdf").await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/nodes/{file}"),
            Some(json!({ "name": "final.pdf" })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", &format!("/api/nodes/{file}/history"), None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let events = response.body["data"].as_array().cloned().unwrap_or_default();
    let actions: Vec<&str> = events.iter().filter_map(|e| e["action"].as_str()).collect();
    assert_eq!(actions, vec!["renamed", "created"]);
    assert_eq!(events[0]["node_id"], file);
    assert_eq!(events[0]["details"]["changes"]["name"]["to"], "final.pdf");

    let response = app
        .request(
            "GET",
            &format!("/api/nodes/{file}/history?limit=1&offset=1"),
            None,
            Some(owner()),
        )
        .await;
    assert_eq!(response.body["data"][0]["action"], "created");

    let response = app
        .request("GET", &format!("/api/nodes/{file}/history"), None, Some(stranger()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
