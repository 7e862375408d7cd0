//! Trash maintenance commands.
//!
//! These run outside any request, so they see every trashed node. A purge
//! of one node acts on behalf of whoever trashed it.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use docvault_core::config::AppConfig;
use docvault_core::types::{Actor, ActorId, ActorKind, NodeId};
use docvault_database::NodeFilter;
use docvault_database::store::CompanyScope;
use docvault_entity::node::Node;
use docvault_service::RequestContext;
use docvault_service::trash::{PurgeSummary, TrashFilter};

use crate::output::{self, OutputFormat};

/// Arguments for trash commands
#[derive(Debug, Args)]
pub struct TrashArgs {
    /// Trash subcommand
    #[command(subcommand)]
    pub command: TrashCommand,
}

/// Trash subcommands
#[derive(Debug, Subcommand)]
pub enum TrashCommand {
    /// List trashed nodes, most recently trashed first
    List {
        #[command(flatten)]
        scope: OwnerScope,
        /// Maximum number of rows
        #[arg(short, long, default_value_t = 100)]
        limit: usize,
    },
    /// Permanently delete trashed nodes
    Empty {
        #[command(flatten)]
        scope: OwnerScope,
        /// Only nodes trashed more than this many days ago (defaults to `trash.retention_days`)
        #[arg(long)]
        older_than_days: Option<u32>,
        /// Ignore the age limit and empty everything in scope
        #[arg(long, conflicts_with = "older_than_days")]
        all: bool,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Permanently delete one trashed node and its subtree
    Purge {
        /// Node ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Optional narrowing by owner or company.
#[derive(Debug, Clone, Args)]
pub struct OwnerScope {
    /// Owner actor ID
    #[arg(long, requires = "owner_kind")]
    pub owner_id: Option<i64>,
    /// Owner actor kind
    #[arg(long, requires = "owner_id")]
    pub owner_kind: Option<String>,
    /// Company ID
    #[arg(long)]
    pub company_id: Option<i64>,
}

impl OwnerScope {
    fn owner(&self) -> Result<Option<Actor>> {
        match (self.owner_id, &self.owner_kind) {
            (Some(id), Some(kind)) => {
                let kind: ActorKind = kind.parse()?;
                Ok(Some(Actor::new(ActorId(id), kind)))
            }
            _ => Ok(None),
        }
    }

    fn filter(&self) -> Result<TrashFilter> {
        Ok(TrashFilter {
            owner: self.owner()?,
            company_id: self.company_id.map(ActorId),
            ..TrashFilter::default()
        })
    }
}

/// Trashed node display row
#[derive(Debug, Serialize, Tabled)]
struct TrashRow {
    /// Node ID
    id: i64,
    /// Kind
    kind: String,
    /// Name
    name: String,
    /// Owner
    owner: String,
    /// Trashed by
    deleted_by: String,
    /// Trashed at
    deleted_at: String,
}

impl From<&Node> for TrashRow {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.get(),
            kind: node.kind.to_string(),
            name: node.name.clone(),
            owner: node.owner().to_string(),
            deleted_by: node
                .deleted_by()
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string()),
            deleted_at: output::display_time(node.deleted_at),
        }
    }
}

/// Execute trash commands
pub async fn execute(args: &TrashArgs, config: &AppConfig, format: OutputFormat) -> Result<()> {
    let backend = super::connect(config).await?;

    match &args.command {
        TrashCommand::List { scope, limit } => {
            let mut filter = NodeFilter::trashed().page(0, *limit);
            if let Some(owner) = scope.owner()? {
                filter = filter.owned_by(owner);
            }
            if let Some(company_id) = scope.company_id {
                filter = filter.company(CompanyScope::Exactly(ActorId(company_id)));
            }

            let mut uow = backend.store.begin().await?;
            let nodes = uow.find_nodes(&filter).await?;
            uow.rollback().await?;

            let rows: Vec<TrashRow> = nodes.iter().map(TrashRow::from).collect();
            output::print_list(&rows, format);
        }
        TrashCommand::Empty {
            scope,
            older_than_days,
            all,
            force,
        } => {
            let mut filter = scope.filter()?;
            filter.older_than_days = if *all {
                None
            } else {
                Some(older_than_days.unwrap_or(config.trash.retention_days))
            };

            let prompt = match filter.older_than_days {
                Some(days) => format!("Permanently delete nodes trashed more than {days} days ago?"),
                None => "Permanently delete every trashed node in scope?".to_string(),
            };
            if !super::confirm(&prompt, *force)? {
                return Ok(());
            }

            let summary = backend.services.trash.sweep(&filter).await?;
            print_summary(&summary, format);
        }
        TrashCommand::Purge { id, force } => {
            let id = NodeId(*id);
            let mut uow = backend.store.begin().await?;
            let node = uow.find_node(id).await?;
            uow.rollback().await?;

            let Some(node) = node else {
                bail!("Node {id} not found");
            };
            let Some(deleted_by) = node.deleted_by() else {
                bail!("Node {id} is not in the trash");
            };

            if !super::confirm(
                &format!("Permanently delete '{}' ({id}) and everything under it?", node.name),
                *force,
            )? {
                return Ok(());
            }

            let ctx = RequestContext::new(deleted_by);
            let summary = backend
                .services
                .trash
                .purge(&ctx, id)
                .await
                .with_context(|| format!("Failed to purge node {id}"))?;
            print_summary(&summary, format);
        }
    }

    backend.close().await;
    Ok(())
}

fn print_summary(summary: &PurgeSummary, format: OutputFormat) {
    match format {
        OutputFormat::Table => output::print_success(&format!(
            "Purged {} node(s) under {} trashed root(s).",
            summary.nodes, summary.roots
        )),
        OutputFormat::Json => output::print_json(summary),
    }
}
