//! Shared test harness: every service over the in-memory store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use docvault_auth::{StaticActorDirectory, StaticCapabilityLookup};
use docvault_core::config::StorageConfig;
use docvault_core::events::{AuditEvent, NodeAction};
use docvault_core::result::AppResult;
use docvault_core::traits::AuditSink;
use docvault_core::types::{Actor, ActorId, ActorKind, ListQuery, NodeId};
use docvault_database::{MemoryNodeStore, NodeStore};
use docvault_entity::node::Node;
use docvault_storage::providers::LocalObjectStore;

use crate::audit::LoggingDeadlineNotifier;
use crate::context::RequestContext;
use crate::services::{ServiceDeps, Services};
use crate::tree::CreateNodeRequest;

pub(crate) const PUBLIC_BASE: &str = "http://files.test";

pub(crate) fn owner() -> Actor {
    Actor::new(ActorId(42), ActorKind::Personal)
}

pub(crate) fn grantee() -> Actor {
    Actor::new(ActorId(7), ActorKind::Freelancer)
}

pub(crate) fn stranger() -> Actor {
    Actor::new(ActorId(99), ActorKind::Personal)
}

pub(crate) fn company() -> Actor {
    Actor::new(ActorId(900), ActorKind::Company)
}

pub(crate) fn ctx(actor: Actor) -> RequestContext {
    RequestContext::new(actor)
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, event: &AuditEvent) -> AppResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn history(
        &self,
        node_id: NodeId,
        offset: usize,
        limit: usize,
    ) -> AppResult<Vec<AuditEvent>> {
        let events = self.events.lock().unwrap();
        Ok(events
            .iter()
            .rev()
            .filter(|e| e.node_id == node_id)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

pub(crate) struct Harness {
    pub services: Services,
    pub store: MemoryNodeStore,
    pub capabilities: StaticCapabilityLookup,
    pub directory: StaticActorDirectory,
    pub audit: RecordingAuditSink,
    pub storage_root: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_storage(StorageConfig::default()).await
    }

    pub async fn with_storage(storage: StorageConfig) -> Self {
        let storage_root = TempDir::new().unwrap();
        let objects = LocalObjectStore::new(storage_root.path().to_str().unwrap(), PUBLIC_BASE)
            .await
            .unwrap();
        let store = MemoryNodeStore::new();
        let capabilities = StaticCapabilityLookup::new();
        let directory = StaticActorDirectory::new();
        let audit = RecordingAuditSink::default();

        let services = Services::build(ServiceDeps {
            store: Arc::new(store.clone()),
            capabilities: Arc::new(capabilities.clone()),
            directory: Arc::new(directory.clone()),
            audit: Arc::new(audit.clone()),
            notifier: Arc::new(LoggingDeadlineNotifier),
            objects: Arc::new(objects),
            storage,
        });

        Self {
            services,
            store,
            capabilities,
            directory,
            audit,
            storage_root,
        }
    }

    pub async fn folder(&self, actor: Actor, parent: Option<NodeId>, name: &str) -> Node {
        self.services
            .tree
            .create(&ctx(actor), CreateNodeRequest::folder(parent, name))
            .await
            .unwrap()
    }

    pub async fn file(&self, actor: Actor, parent: Option<NodeId>, name: &str) -> Node {
        self.services
            .tree
            .create(&ctx(actor), CreateNodeRequest::file(parent, name))
            .await
            .unwrap()
    }

    /// Names visible to `actor` under `parent`, in listing order.
    pub async fn names(&self, actor: Actor, parent: Option<NodeId>) -> Vec<String> {
        self.services
            .access
            .visible_nodes(&ctx(actor), parent, &ListQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect()
    }

    /// Every node row, trashed or not.
    pub async fn all_nodes(&self) -> Vec<Node> {
        let mut uow = self.store.begin().await.unwrap();
        let mut filter = docvault_database::NodeFilter::active();
        filter.trash = docvault_database::store::TrashState::Any;
        let nodes = uow.find_nodes(&filter).await.unwrap();
        uow.rollback().await.unwrap();
        nodes
    }

    pub fn actions(&self) -> Vec<NodeAction> {
        self.audit
            .events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.action)
            .collect()
    }
}
