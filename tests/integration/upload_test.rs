//! Integration tests for uploads and content replacement.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{PUBLIC_BASE, TestApp, owner, stranger};

fn stored_files(app: &TestApp) -> usize {
    std::fs::read_dir(app.storage_root.path())
        .map(|entries| entries.filter_map(Result::ok).count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_multipart_upload_creates_file_node() {
    let app = TestApp::new().await;
    let docs = app.create_folder(owner(), None, "Docs").await;

    let response = app
        .multipart(
            "POST",
            "/api/uploads",
            &[
                ("parent_id", &docs.to_string()),
                ("status", "pending"),
                ("expires_on", "2027-06-30"),
            ],
            ("Contract.PDF", "application/pdf", b"%PDF-1.7"),
            owner(),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let data = &response.body["data"];
    assert_eq!(data["name"], "Contract.PDF");
    assert_eq!(data["kind"], "file");
    assert_eq!(data["parent_id"], docs);
    assert_eq!(data["size_bytes"], 8);
    assert_eq!(data["extension"], ".pdf");
    assert_eq!(data["status"], "pending");
    assert_eq!(stored_files(&app), 1);

    let id = response.id();
    let response = app
        .request("GET", &format!("/api/nodes/{id}"), None, Some(owner()))
        .await;
    let key = response.body["data"]["content_ref"].as_str().unwrap().to_string();
    assert_eq!(
        response.body["data"]["public_url"],
        format!("{PUBLIC_BASE}/{key}")
    );
}

#[tokio::test]
async fn test_upload_into_foreign_folder_keeps_no_blob() {
    let app = TestApp::new().await;
    let docs = app.create_folder(owner(), None, "Docs").await;

    let response = app
        .multipart(
            "POST",
            "/api/uploads",
            &[("parent_id", &docs.to_string())],
            ("x.txt", "text/plain", b"hello"),
            stranger(),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(stored_files(&app), 0);
}

#[tokio::test]
async fn test_replace_content_swaps_blob() {
    let app = TestApp::new().await;
    let response = app
        .multipart(
            "POST",
            "/api/uploads",
            &[],
            ("report.txt", "text/plain", b"v1"),
            owner(),
        )
        .await;
    let id = response.id();
    let first_key = response.body["data"]["content_ref"].as_str().unwrap().to_string();

    let response = app
        .multipart(
            "PUT",
            &format!("/api/nodes/{id}/content"),
            &[],
            ("report.csv", "text/csv", b"version two"),
            owner(),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["size_bytes"], 11);
    assert_eq!(response.body["data"]["extension"], ".csv");
    assert_ne!(response.body["data"]["content_ref"], first_key.as_str());
    assert_eq!(stored_files(&app), 1);
}

#[tokio::test]
async fn test_presign_and_complete() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/uploads/presign",
            Some(json!({ "filename": "scan.png", "content_type": "image/png" })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let key = response.body["data"]["key"].as_str().unwrap().to_string();
    assert!(key.ends_with(".png"));

    let response = app
        .request(
            "POST",
            "/api/uploads/complete",
            Some(json!({ "key": key, "filename": "scan.png", "size_bytes": 2048 })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["data"]["content_ref"], key.as_str());
    assert_eq!(response.body["data"]["size_bytes"], 2048);

    let response = app
        .request(
            "POST",
            "/api/uploads/complete",
            Some(json!({ "key": "../etc/passwd", "filename": "x", "size_bytes": 1 })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
