//! Integration tests for soft delete, trash listing, restore and purge.

use http::StatusCode;

use crate::helpers::{self, TestApp, grantee, owner, stranger};

#[tokio::test]
async fn test_trash_and_restore_subtree() {
    let app = TestApp::new().await;
    let docs = app.create_folder(owner(), None, "Docs").await;
    let contract = app.create_file(owner(), Some(docs), "contract.pdf").await;
    app.share(owner(), docs, grantee(), false).await;

    let response = app
        .request("DELETE", &format!("/api/nodes/{docs}"), None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["trashed"], 2);

    assert!(app.list_ids(owner(), None).await.is_empty());
    assert!(app.list_ids(grantee(), None).await.is_empty());
    let response = app
        .request("GET", &format!("/api/nodes/{contract}"), None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Trashing twice is not found: active operations never see trashed nodes.
    let response = app
        .request("DELETE", &format!("/api/nodes/{docs}"), None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("GET", "/api/trash", None, Some(owner())).await;
    assert_eq!(response.status, StatusCode::OK);
    let entries = response.body["data"].as_array().unwrap();
    let folder = entries.iter().find(|e| e["id"] == docs).unwrap();
    assert_eq!(folder["children_count"], 1);

    let response = app
        .request("POST", &format!("/api/trash/{docs}/restore"), None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.list_ids(owner(), None).await, vec![docs]);
    assert_eq!(app.list_ids(owner(), Some(docs)).await, vec![contract]);
    assert_eq!(app.list_ids(grantee(), Some(docs)).await, vec![contract]);

    let response = app
        .request("POST", &format!("/api/trash/{docs}/restore"), None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_restore_into_another_folder() {
    let app = TestApp::new().await;
    let inbox = app.create_folder(owner(), None, "Inbox").await;
    let file = app.create_file(owner(), None, "scan.pdf").await;

    app.request("DELETE", &format!("/api/nodes/{file}"), None, Some(owner()))
        .await;
    let response = app
        .request(
            "POST",
            &format!("/api/trash/{file}/restore?parent_id={inbox}"),
            None,
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["parent_id"], inbox);
    assert_eq!(app.list_ids(owner(), Some(inbox)).await, vec![file]);
}

#[tokio::test]
async fn test_purge_requires_trash_and_permission() {
    let app = TestApp::new().await;
    let docs = app.create_folder(owner(), None, "Docs").await;
    app.create_file(owner(), Some(docs), "a.pdf").await;
    app.create_file(owner(), Some(docs), "b.pdf").await;

    let response = app
        .request("DELETE", &format!("/api/trash/{docs}"), None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    app.request("DELETE", &format!("/api/nodes/{docs}"), None, Some(owner()))
        .await;

    let response = app
        .request("DELETE", &format!("/api/trash/{docs}"), None, Some(stranger()))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("DELETE", &format!("/api/trash/{docs}"), None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["roots"], 1);
    assert_eq!(response.body["data"]["nodes"], 3);

    let response = app.request("GET", "/api/trash", None, Some(owner())).await;
    assert!(helpers::ids(&response.body["data"]).is_empty());
}

#[tokio::test]
async fn test_empty_trash_honours_age() {
    let app = TestApp::new().await;
    let a = app.create_file(owner(), None, "a.pdf").await;
    let b = app.create_file(owner(), None, "b.pdf").await;
    for id in [a, b] {
        app.request("DELETE", &format!("/api/nodes/{id}"), None, Some(owner()))
            .await;
    }

    let response = app
        .request("DELETE", "/api/trash?older_than_days=30", None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["nodes"], 0);

    let response = app.request("DELETE", "/api/trash", None, Some(owner())).await;
    assert_eq!(response.body["data"]["nodes"], 2);

    let response = app.request("GET", "/api/trash", None, Some(owner())).await;
    assert!(helpers::ids(&response.body["data"]).is_empty());
}
