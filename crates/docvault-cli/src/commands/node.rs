//! Node inspection commands.

use std::collections::HashMap;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use docvault_core::config::AppConfig;
use docvault_core::types::NodeId;
use docvault_database::NodeFilter;
use docvault_entity::node::{Node, SubtreeIndex};

use crate::output::{self, OutputFormat};

/// Arguments for node commands
#[derive(Debug, Args)]
pub struct NodeArgs {
    /// Node subcommand
    #[command(subcommand)]
    pub command: NodeCommand,
}

/// Node subcommands
#[derive(Debug, Subcommand)]
pub enum NodeCommand {
    /// Show the subtree under a node, trashed nodes included
    Tree {
        /// Root node ID
        #[arg(short, long)]
        root: i64,
        /// Max depth below the root
        #[arg(short, long)]
        depth: Option<usize>,
    },
}

/// One line of a rendered tree
#[derive(Debug, Serialize, Tabled)]
struct TreeRow {
    /// Node ID
    id: i64,
    /// Parent ID
    #[tabled(skip)]
    parent_id: Option<i64>,
    /// Depth below the root
    depth: usize,
    /// Kind
    kind: String,
    /// Name
    name: String,
    /// Status
    status: String,
    /// Trashed at
    deleted_at: String,
}

/// Execute node commands
pub async fn execute(args: &NodeArgs, config: &AppConfig, format: OutputFormat) -> Result<()> {
    let backend = super::connect(config).await?;

    match &args.command {
        NodeCommand::Tree { root, depth } => {
            let root = NodeId(*root);
            let mut uow = backend.store.begin().await?;
            if uow.find_node(root).await?.is_none() {
                uow.rollback().await?;
                bail!("Node {root} not found");
            }
            let index = uow.subtree(root).await?;
            let nodes = uow.find_nodes(&NodeFilter::by_ids(index.preorder())).await?;
            uow.rollback().await?;

            let rows = tree_rows(&index, nodes, *depth);
            match format {
                OutputFormat::Table => print_tree(&rows),
                OutputFormat::Json => output::print_list(&rows, format),
            }
        }
    }

    backend.close().await;
    Ok(())
}

/// Rows in preorder, children sorted by id, cut at `max_depth`.
fn tree_rows(index: &SubtreeIndex, nodes: Vec<Node>, max_depth: Option<usize>) -> Vec<TreeRow> {
    let mut by_id: HashMap<NodeId, Node> = nodes.into_iter().map(|n| (n.id, n)).collect();
    let mut rows = Vec::with_capacity(by_id.len());
    let mut stack = vec![(index.root(), 0usize)];

    while let Some((id, depth)) = stack.pop() {
        let Some(node) = by_id.remove(&id) else {
            continue;
        };
        rows.push(TreeRow {
            id: node.id.get(),
            parent_id: node.parent_id.map(NodeId::get),
            depth,
            kind: node.kind.to_string(),
            name: node.name,
            status: node.status,
            deleted_at: output::display_time(node.deleted_at),
        });
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        for child in index.children(id).iter().rev() {
            stack.push((*child, depth + 1));
        }
    }
    rows
}

fn print_tree(rows: &[TreeRow]) {
    for row in rows {
        let marker = if row.kind == "folder" { "/" } else { "" };
        let trashed = if row.deleted_at == "-" {
            String::new()
        } else {
            format!("  [trashed {}]", row.deleted_at)
        };
        println!(
            "{}{}{}  ({}){}",
            "  ".repeat(row.depth),
            row.name,
            marker,
            row.id,
            trashed
        );
    }
}
