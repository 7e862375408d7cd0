//! Backend wiring: picks the node store and its companions from configuration.

use std::sync::Arc;

use tracing::info;

use docvault_auth::{CachedCapabilityLookup, StaticActorDirectory, StaticCapabilityLookup};
use docvault_core::config::{AppConfig, StoreBackend};
use docvault_core::result::AppResult;
use docvault_core::traits::{ActorDirectory, AuditSink, CapabilityLookup, ObjectStore};
use docvault_database::{DatabasePool, MemoryNodeStore, NodeStore};
use docvault_storage::build_object_store;

use crate::audit::{LoggingDeadlineNotifier, MemoryAuditLog};
use crate::services::{ServiceDeps, Services};

/// Every collaborator of the engine, wired for one configuration.
#[derive(Debug, Clone)]
pub struct Backend {
    /// Node store.
    pub store: Arc<dyn NodeStore>,
    /// Object store.
    pub objects: Arc<dyn ObjectStore>,
    /// Services over `store` and `objects`.
    pub services: Services,
    /// Connection pool, for the Postgres backend.
    pub pool: Option<DatabasePool>,
}

impl Backend {
    /// Connect to the configured store and object store and build the services.
    ///
    /// The Postgres backend persists audit records and reads memberships and
    /// the actor directory from the database. The memory backend logs audit
    /// events and starts with empty membership and directory tables.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let objects = build_object_store(&config.storage).await?;

        let (store, capabilities, directory, audit, pool): (
            Arc<dyn NodeStore>,
            Arc<dyn CapabilityLookup>,
            Arc<dyn ActorDirectory>,
            Arc<dyn AuditSink>,
            Option<DatabasePool>,
        ) = match config.database.backend {
            StoreBackend::Postgres => {
                let pool = DatabasePool::connect(&config.database).await?;
                (
                    Arc::new(pool.node_store()),
                    Arc::new(pool.capabilities()),
                    Arc::new(pool.directory()),
                    Arc::new(pool.audit_log()),
                    Some(pool),
                )
            }
            StoreBackend::Memory => {
                info!("Using the in-memory node store; data is lost on exit");
                (
                    Arc::new(MemoryNodeStore::new()),
                    Arc::new(StaticCapabilityLookup::new()),
                    Arc::new(StaticActorDirectory::new()),
                    Arc::new(MemoryAuditLog::new()),
                    None,
                )
            }
        };

        let capabilities: Arc<dyn CapabilityLookup> =
            Arc::new(CachedCapabilityLookup::new(capabilities, &config.access));

        let services = Services::build(ServiceDeps {
            store: Arc::clone(&store),
            capabilities,
            directory,
            audit,
            notifier: Arc::new(LoggingDeadlineNotifier),
            objects: Arc::clone(&objects),
            storage: config.storage.clone(),
        });

        Ok(Self {
            store,
            objects,
            services,
            pool,
        })
    }

    /// Close the connection pool, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
