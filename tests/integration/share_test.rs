//! Integration tests for sharing, unsharing and the shared-with-me listing.

use http::StatusCode;
use serde_json::json;

use docvault_core::types::{ActorId, ActorKind};

use crate::helpers::{self, TestApp, grantee, owner, stranger};

#[tokio::test]
async fn test_docs_contract_share_scenario() {
    let app = TestApp::new().await;
    let docs = app.create_folder(owner(), None, "Docs").await;
    let contract = app.create_file(owner(), Some(docs), "contract.pdf").await;
    assert_eq!((docs, contract), (1, 2));

    app.share(owner(), docs, grantee(), false).await;

    assert_eq!(app.list_ids(grantee(), None).await, vec![docs]);
    assert_eq!(app.list_ids(grantee(), Some(docs)).await, vec![contract]);

    let response = app
        .request("GET", &format!("/api/nodes/{contract}"), None, Some(grantee()))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["editable"], false);
    assert_eq!(response.body["data"]["shared_by"]["id"], 42);

    let response = app
        .request("DELETE", &format!("/api/nodes/{contract}"), None, Some(grantee()))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // Re-sharing updates the edit flag in place.
    app.share(owner(), docs, grantee(), true).await;
    let response = app
        .request("GET", &format!("/api/nodes/{docs}/shares"), None, Some(owner()))
        .await;
    let shares = response.body["data"].as_array().unwrap();
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0]["edit_allowed"], true);

    let response = app
        .request("GET", &format!("/api/nodes/{contract}"), None, Some(grantee()))
        .await;
    assert_eq!(response.body["data"]["editable"], true);
}

#[tokio::test]
async fn test_inheritance_on_create_is_a_snapshot() {
    let app = TestApp::new().await;
    let docs = app.create_folder(owner(), None, "Docs").await;
    app.share(owner(), docs, grantee(), false).await;

    let later = app.create_file(owner(), Some(docs), "later.pdf").await;
    let response = app
        .request("GET", &format!("/api/nodes/{later}/shares"), None, Some(owner()))
        .await;
    assert_eq!(response.body["data"].as_array().unwrap().len(), 1);

    let other = app.create_folder(owner(), None, "Other").await;
    let moved = app.create_file(owner(), Some(other), "moved.pdf").await;
    app.request(
        "PUT",
        &format!("/api/nodes/{moved}/move"),
        Some(json!({ "parent_id": docs })),
        Some(owner()),
    )
    .await;

    // Moving does not grant the new parent's edges.
    let response = app
        .request("GET", &format!("/api/nodes/{moved}"), None, Some(grantee()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unshare_cascades_over_the_subtree() {
    let app = TestApp::new().await;
    let docs = app.create_folder(owner(), None, "Docs").await;
    let contract = app.create_file(owner(), Some(docs), "contract.pdf").await;
    app.share(owner(), docs, grantee(), false).await;

    let path = format!(
        "/api/nodes/{docs}/shares/{}/{}",
        grantee().kind.as_str(),
        grantee().id
    );
    let response = app.request("DELETE", &path, None, Some(owner())).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["removed"], 2);

    assert!(app.list_ids(grantee(), None).await.is_empty());
    let response = app
        .request("GET", &format!("/api/nodes/{contract}"), None, Some(grantee()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("DELETE", &path, None, Some(owner())).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("DELETE", &format!("/api/nodes/{docs}/shares/robot/7"), None, Some(owner()))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_share_by_email_and_self_share() {
    let app = TestApp::new().await;
    app.directory
        .register(grantee(), "ana@example.com", "Ana")
        .await;
    let file = app.create_file(owner(), None, "plan.pdf").await;

    let response = app
        .request(
            "POST",
            &format!("/api/nodes/{file}/shares"),
            Some(json!({ "grantee": { "email": "Ana@Example.com" } })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["data"]["grantee_id"], 7);

    let response = app
        .request("GET", &format!("/api/nodes/{file}/shares"), None, Some(owner()))
        .await;
    assert_eq!(response.body["data"][0]["grantee_name"], "Ana");

    let response = app
        .request(
            "POST",
            &format!("/api/nodes/{file}/shares"),
            Some(json!({ "grantee": { "email": "nobody@example.com" } })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "POST",
            &format!("/api/nodes/{file}/shares"),
            Some(json!({ "grantee": { "id": 42, "kind": "pf" } })),
            Some(owner()),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("GET", &format!("/api/nodes/{file}/shares"), None, Some(stranger()))
        .await;
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_shared_with_me_root_only() {
    let app = TestApp::new().await;
    let docs = app.create_folder(owner(), None, "Docs").await;
    let contract = app.create_file(owner(), Some(docs), "contract.pdf").await;
    let loose = app.create_file(owner(), None, "loose.pdf").await;
    app.share(owner(), docs, grantee(), false).await;
    app.share(owner(), loose, grantee(), false).await;

    let response = app
        .request("GET", "/api/shared-with-me", None, Some(grantee()))
        .await;
    let mut all = helpers::ids(&response.body["data"]);
    all.sort_unstable();
    assert_eq!(all, vec![docs, contract, loose]);

    let response = app
        .request("GET", "/api/shared-with-me?root_only=true", None, Some(grantee()))
        .await;
    let mut roots = helpers::ids(&response.body["data"]);
    roots.sort_unstable();
    assert_eq!(roots, vec![docs, loose]);

    let other = docvault_core::types::Actor::new(ActorId(8), ActorKind::Collaborator);
    let response = app
        .request("GET", "/api/shared-with-me", None, Some(other))
        .await;
    assert!(helpers::ids(&response.body["data"]).is_empty());
}
