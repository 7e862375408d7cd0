//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use docvault_auth::{StaticActorDirectory, StaticCapabilityLookup};
use docvault_core::config::AppConfig;
use docvault_core::types::{Actor, ActorId, ActorKind};
use docvault_database::{MemoryNodeStore, NodeStore};
use docvault_service::{LoggingDeadlineNotifier, MemoryAuditLog, ServiceDeps, Services};
use docvault_storage::providers::LocalObjectStore;

pub const PUBLIC_BASE: &str = "http://files.test";
const BOUNDARY: &str = "docvault-test-boundary";

pub fn owner() -> Actor {
    Actor::new(ActorId(42), ActorKind::Personal)
}

pub fn grantee() -> Actor {
    Actor::new(ActorId(7), ActorKind::Freelancer)
}

pub fn stranger() -> Actor {
    Actor::new(ActorId(99), ActorKind::Personal)
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Company memberships
    pub capabilities: StaticCapabilityLookup,
    /// Email directory
    pub directory: StaticActorDirectory,
    /// Object store root, removed on drop
    pub storage_root: TempDir,
}

impl TestApp {
    /// Create a new test application over the in-memory store
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.storage.public_base_url = PUBLIC_BASE.to_string();

        let storage_root = TempDir::new().expect("Failed to create storage dir");
        let objects = Arc::new(
            LocalObjectStore::new(storage_root.path().to_str().unwrap(), PUBLIC_BASE)
                .await
                .expect("Failed to init storage"),
        );
        let store: Arc<dyn NodeStore> = Arc::new(MemoryNodeStore::new());
        let capabilities = StaticCapabilityLookup::new();
        let directory = StaticActorDirectory::new();

        let services = Services::build(ServiceDeps {
            store: Arc::clone(&store),
            capabilities: Arc::new(capabilities.clone()),
            directory: Arc::new(directory.clone()),
            audit: Arc::new(MemoryAuditLog::new()),
            notifier: Arc::new(LoggingDeadlineNotifier),
            objects: objects.clone(),
            storage: config.storage.clone(),
        });

        let state = docvault_api::AppState::new(config, store, objects, services);
        let router = docvault_api::build_app(state);

        Self {
            router,
            capabilities,
            directory,
            storage_root,
        }
    }

    /// Make a JSON request as `actor`
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        actor: Option<Actor>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        if let Some(actor) = actor {
            req = with_actor(req, actor);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Make a bodiless request with raw headers
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let req = req.body(Body::empty()).expect("Failed to build request");
        self.send(req).await
    }

    /// Make a multipart request as `actor` with text `fields` and one file part
    pub async fn multipart(
        &self,
        method: &str,
        path: &str,
        fields: &[(&str, &str)],
        file: (&str, &str, &[u8]),
        actor: Actor,
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        let (filename, content_type, data) = file;
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        let req = with_actor(req, actor)
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Create a folder and return its id
    pub async fn create_folder(&self, actor: Actor, parent: Option<i64>, name: &str) -> i64 {
        self.create(actor, parent, name, "folder").await
    }

    /// Create an empty file node and return its id
    pub async fn create_file(&self, actor: Actor, parent: Option<i64>, name: &str) -> i64 {
        self.create(actor, parent, name, "file").await
    }

    async fn create(&self, actor: Actor, parent: Option<i64>, name: &str, kind: &str) -> i64 {
        let response = self
            .request(
                "POST",
                "/api/nodes",
                Some(json!({ "parent_id": parent, "kind": kind, "name": name })),
                Some(actor),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.id()
    }

    /// Share `node` with `grantee`
    pub async fn share(&self, actor: Actor, node: i64, grantee: Actor, edit_allowed: bool) {
        let response = self
            .request(
                "POST",
                &format!("/api/nodes/{node}/shares"),
                Some(json!({
                    "grantee": { "id": grantee.id, "kind": grantee.kind },
                    "edit_allowed": edit_allowed,
                })),
                Some(actor),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    }

    /// Ids visible to `actor` under `parent` (or at the root)
    pub async fn list_ids(&self, actor: Actor, parent: Option<i64>) -> Vec<i64> {
        let path = match parent {
            Some(p) => format!("/api/nodes?parent_id={p}"),
            None => "/api/nodes".to_string(),
        };
        let response = self.request("GET", &path, None, Some(actor)).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        ids(&response.body["data"])
    }
}

fn with_actor(req: http::request::Builder, actor: Actor) -> http::request::Builder {
    req.header("x-actor-id", actor.id.to_string())
        .header("x-actor-kind", actor.kind.as_str())
}

/// The `id` of every element of a JSON array
pub fn ids(items: &Value) -> Vec<i64> {
    items
        .as_array()
        .map(|a| a.iter().filter_map(|n| n["id"].as_i64()).collect())
        .unwrap_or_default()
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// `data.id` of an enveloped response
    pub fn id(&self) -> i64 {
        self.body["data"]["id"]
            .as_i64()
            .unwrap_or_else(|| panic!("No data.id in {:?}", self.body))
    }

    /// `error` code of a failed response
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
