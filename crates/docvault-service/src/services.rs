//! Wiring of every service over one set of collaborators.

use std::sync::Arc;

use docvault_auth::CapabilityResolver;
use docvault_core::config::StorageConfig;
use docvault_core::traits::{
    ActorDirectory, AuditSink, CapabilityLookup, DeadlineNotifier, ObjectStore,
};
use docvault_database::NodeStore;

use crate::access::{AccessGuard, AccessResolver, Enricher};
use crate::audit::{AuditRecorder, AuditTrail, DeadlineRelay};
use crate::content::ContentService;
use crate::follower::FollowerService;
use crate::share::ShareService;
use crate::trash::TrashService;
use crate::tree::TreeService;

/// External collaborators of the engine.
#[derive(Debug, Clone)]
pub struct ServiceDeps {
    /// Node store.
    pub store: Arc<dyn NodeStore>,
    /// Company membership lookup.
    pub capabilities: Arc<dyn CapabilityLookup>,
    /// Actor directory.
    pub directory: Arc<dyn ActorDirectory>,
    /// Audit sink.
    pub audit: Arc<dyn AuditSink>,
    /// Deadline notifier.
    pub notifier: Arc<dyn DeadlineNotifier>,
    /// Object store.
    pub objects: Arc<dyn ObjectStore>,
    /// Storage limits.
    pub storage: StorageConfig,
}

/// Every service, sharing one guard, recorder and relay.
#[derive(Debug, Clone)]
pub struct Services {
    /// Create, move and update.
    pub tree: TreeService,
    /// Share edges.
    pub shares: ShareService,
    /// Trash lifecycle.
    pub trash: TrashService,
    /// Listings and single-node reads.
    pub access: AccessResolver,
    /// Follower records.
    pub followers: FollowerService,
    /// File content.
    pub content: ContentService,
    /// Per-node audit history.
    pub history: AuditTrail,
}

impl Services {
    /// Build every service from `deps`.
    pub fn build(deps: ServiceDeps) -> Self {
        let guard = AccessGuard::new(CapabilityResolver::new(deps.capabilities));
        let history = AuditTrail::new(
            Arc::clone(&deps.store),
            guard.clone(),
            Arc::clone(&deps.audit),
        );
        let audit = AuditRecorder::new(deps.audit);
        let deadlines = DeadlineRelay::new(deps.notifier);
        let enricher = Enricher::new(guard.clone(), Arc::clone(&deps.objects));

        let access = AccessResolver::new(Arc::clone(&deps.store), guard.clone(), enricher);
        let tree = TreeService::new(
            Arc::clone(&deps.store),
            guard.clone(),
            audit.clone(),
            deadlines.clone(),
        );
        let shares = ShareService::new(
            Arc::clone(&deps.store),
            guard.clone(),
            deps.directory,
            audit.clone(),
            access.clone(),
        );
        let trash = TrashService::new(
            Arc::clone(&deps.store),
            guard.clone(),
            Arc::clone(&deps.objects),
            audit,
            deadlines,
        );
        let followers = FollowerService::new(Arc::clone(&deps.store), guard);
        let content = ContentService::new(tree.clone(), deps.objects, deps.storage);

        Self {
            tree,
            shares,
            trash,
            access,
            followers,
            content,
            history,
        }
    }
}
