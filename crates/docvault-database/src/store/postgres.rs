//! PostgreSQL node store.
//!
//! Each unit of work is one sqlx transaction. Mutations lock the rows they
//! start from with `SELECT ... FOR UPDATE`, so overlapping operations on
//! the same node serialize in the database. Cascades lock their whole
//! subtree and moves share-lock the target's ancestor chain, re-reading
//! until the locked set is stable.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::{Actor, NodeId};
use docvault_entity::follower::{FollowPreferences, Follower};
use docvault_entity::node::{DeletionStamp, NewNode, Node, SubtreeIndex, TreeLink};
use docvault_entity::share::{Share, ShareGrant};

use super::{
    CompanyScope, LOCK_ATTEMPTS, MAX_TREE_DEPTH, NodeFilter, NodeOrder, NodeStore, ParentScope,
    TrashState, UnitOfWork,
};

/// Columns of the `nodes` table, in `Node` field order.
const NODE_COLUMNS: &str = "n.id, n.kind, n.name, n.parent_id, n.owner_id, n.owner_kind, \
     n.company_id, n.company_kind, n.size_bytes, n.extension, n.content_ref, n.expires_on, \
     n.status, n.comments, n.deleted_at, n.deleted_by_id, n.deleted_by_kind, \
     n.created_at, n.updated_at";

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Escape `%`, `_` and `\` for use inside an `ILIKE` pattern.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Append the `WHERE`, `ORDER BY` and window clauses of `filter`.
fn push_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a NodeFilter) {
    qb.push(" WHERE TRUE");
    match filter.parent {
        ParentScope::Any => {}
        ParentScope::Root => {
            qb.push(" AND n.parent_id IS NULL");
        }
        ParentScope::Of(id) => {
            qb.push(" AND n.parent_id = ").push_bind(id);
        }
    }
    match filter.company {
        CompanyScope::Any => {}
        CompanyScope::Exactly(id) => {
            qb.push(" AND n.company_id = ").push_bind(id);
        }
        CompanyScope::PersonalOf(id) => {
            qb.push(" AND (n.company_id IS NULL OR n.company_id = ")
                .push_bind(id)
                .push(")");
        }
    }
    match filter.trash {
        TrashState::Active => {
            qb.push(" AND n.deleted_at IS NULL");
        }
        TrashState::Trashed => {
            qb.push(" AND n.deleted_at IS NOT NULL");
        }
        TrashState::Any => {}
    }
    if let Some(owner) = filter.owner {
        qb.push(" AND n.owner_id = ")
            .push_bind(owner.id)
            .push(" AND n.owner_kind = ")
            .push_bind(owner.kind);
    }
    if let Some(owner_id) = filter.owner_id {
        qb.push(" AND n.owner_id = ").push_bind(owner_id);
    }
    if let Some(ids) = &filter.ids {
        qb.push(" AND n.id = ANY(").push_bind(ids.as_slice()).push(")");
    }
    if let Some(by) = filter.deleted_by {
        qb.push(" AND n.deleted_by_id = ")
            .push_bind(by.id)
            .push(" AND n.deleted_by_kind = ")
            .push_bind(by.kind);
    }
    if let Some(cutoff) = filter.deleted_before {
        qb.push(" AND n.deleted_at < ").push_bind(cutoff);
    }
    if let Some(grantee) = filter.shared_with {
        qb.push(" AND EXISTS (SELECT 1 FROM shares s WHERE s.node_id = n.id AND s.grantee_id = ")
            .push_bind(grantee.id)
            .push(" AND s.grantee_kind = ")
            .push_bind(grantee.kind)
            .push(")");
    }
    if let Some(query) = &filter.query {
        if let Some(kind) = query.kind {
            qb.push(" AND n.kind = ").push_bind(kind);
        }
        if let Some(status) = query.status_filter() {
            qb.push(" AND n.status = ").push_bind(status);
        }
        if let Some(search) = query.search() {
            let pattern = like_pattern(search);
            qb.push(" AND (n.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR n.comments ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
    match filter.order {
        NodeOrder::Listing => {
            qb.push(" ORDER BY (n.kind = 'folder') DESC, n.name ASC, n.id ASC");
        }
        NodeOrder::DeletedDesc => {
            qb.push(" ORDER BY n.deleted_at DESC, n.id ASC");
        }
    }
    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ").push_bind(limit as i64);
    }
    if let Some(offset) = filter.offset {
        qb.push(" OFFSET ").push_bind(offset as i64);
    }
}

/// PostgreSQL-backed [`NodeStore`].
#[derive(Debug, Clone)]
pub struct PgNodeStore {
    pool: PgPool,
}

impl PgNodeStore {
    /// Create a new store over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NodeStore for PgNodeStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(db_error("Health check failed"))
    }
}

/// Unit of work over one PostgreSQL transaction.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_node(&mut self, id: NodeId) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>(&format!("SELECT {NODE_COLUMNS} FROM nodes n WHERE n.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("Failed to find node"))
    }

    async fn lock_node(&mut self, id: NodeId) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>(&format!(
            "SELECT {NODE_COLUMNS} FROM nodes n WHERE n.id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to lock node"))
    }

    async fn find_nodes(&mut self, filter: &NodeFilter) -> AppResult<Vec<Node>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {NODE_COLUMNS} FROM nodes n"));
        push_filter(&mut qb, filter);
        qb.build_query_as::<Node>()
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error("Failed to list nodes"))
    }

    async fn insert_node(&mut self, node: NewNode) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(&format!(
            "INSERT INTO nodes AS n (kind, name, parent_id, owner_id, owner_kind, company_id, \
             company_kind, size_bytes, extension, content_ref, expires_on, status, comments) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {NODE_COLUMNS}"
        ))
        .bind(node.kind)
        .bind(&node.name)
        .bind(node.parent_id)
        .bind(node.owner.id)
        .bind(node.owner.kind)
        .bind(node.company_id)
        .bind(node.company_kind)
        .bind(node.size_bytes)
        .bind(&node.extension)
        .bind(&node.content_ref)
        .bind(node.expires_on)
        .bind(&node.status)
        .bind(&node.comments)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("Failed to insert node"))
    }

    async fn update_node(&mut self, node: &Node) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(&format!(
            "UPDATE nodes AS n SET name = $2, owner_id = $3, owner_kind = $4, size_bytes = $5, \
             extension = $6, content_ref = $7, expires_on = $8, status = $9, comments = $10, \
             updated_at = NOW() WHERE n.id = $1 RETURNING {NODE_COLUMNS}"
        ))
        .bind(node.id)
        .bind(&node.name)
        .bind(node.owner_id)
        .bind(node.owner_kind)
        .bind(node.size_bytes)
        .bind(&node.extension)
        .bind(&node.content_ref)
        .bind(node.expires_on)
        .bind(&node.status)
        .bind(&node.comments)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to update node"))?
        .ok_or_else(|| AppError::not_found(format!("Node {} not found", node.id)))
    }

    async fn set_parent(&mut self, id: NodeId, parent_id: Option<NodeId>) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(&format!(
            "UPDATE nodes AS n SET parent_id = $2, updated_at = NOW() WHERE n.id = $1 \
             RETURNING {NODE_COLUMNS}"
        ))
        .bind(id)
        .bind(parent_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to move node"))?
        .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }

    async fn ancestor_ids(&mut self, id: NodeId) -> AppResult<Vec<NodeId>> {
        sqlx::query_scalar::<_, NodeId>(
            "WITH RECURSIVE chain AS ( \
                SELECT id, parent_id, 1 AS depth FROM nodes WHERE id = $1 \
                UNION ALL \
                SELECT n.id, n.parent_id, c.depth + 1 FROM nodes n \
                INNER JOIN chain c ON n.id = c.parent_id WHERE c.depth < $2 \
             ) SELECT id FROM chain ORDER BY depth ASC",
        )
        .bind(id)
        .bind(MAX_TREE_DEPTH as i32)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to load ancestor chain"))
    }

    async fn subtree(&mut self, root: NodeId) -> AppResult<SubtreeIndex> {
        let links = sqlx::query_as::<_, TreeLink>(
            "WITH RECURSIVE tree AS ( \
                SELECT id, parent_id, kind, deleted_at, 1 AS depth FROM nodes WHERE id = $1 \
                UNION ALL \
                SELECT n.id, n.parent_id, n.kind, n.deleted_at, t.depth + 1 FROM nodes n \
                INNER JOIN tree t ON n.parent_id = t.id WHERE t.depth < $2 \
             ) SELECT DISTINCT ON (id) id, parent_id, kind, deleted_at FROM tree",
        )
        .bind(root)
        .bind(MAX_TREE_DEPTH as i32)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to load subtree"))?;
        debug!(root = %root, size = links.len(), "Loaded subtree");
        Ok(SubtreeIndex::build(root, links))
    }

    async fn lock_ancestors(&mut self, id: NodeId) -> AppResult<Vec<NodeId>> {
        let mut chain = self.ancestor_ids(id).await?;
        for _ in 0..LOCK_ATTEMPTS {
            sqlx::query("SELECT id FROM nodes WHERE id = ANY($1) ORDER BY id FOR SHARE")
                .bind(chain.as_slice())
                .execute(&mut *self.tx)
                .await
                .map_err(db_error("Failed to lock ancestor chain"))?;
            let current = self.ancestor_ids(id).await?;
            if current == chain {
                return Ok(chain);
            }
            debug!(node_id = %id, "Ancestor chain changed while locking");
            chain = current;
        }
        Err(AppError::conflict(format!(
            "Ancestor chain of node {id} kept changing; retry the operation"
        )))
    }

    async fn lock_subtree(&mut self, root: NodeId) -> AppResult<SubtreeIndex> {
        let mut index = self.subtree(root).await?;
        for _ in 0..LOCK_ATTEMPTS {
            let mut ids = index.preorder();
            sqlx::query("SELECT id FROM nodes WHERE id = ANY($1) ORDER BY id FOR UPDATE")
                .bind(ids.as_slice())
                .execute(&mut *self.tx)
                .await
                .map_err(db_error("Failed to lock subtree"))?;

            let current = self.subtree(root).await?;
            let mut now = current.preorder();
            ids.sort();
            now.sort();
            if now == ids {
                return Ok(current);
            }
            debug!(
                root = %root,
                before = ids.len(),
                after = now.len(),
                "Subtree changed while locking"
            );
            index = current;
        }
        Err(AppError::conflict(format!(
            "Subtree of node {root} kept changing; retry the operation"
        )))
    }

    async fn mark_deleted(&mut self, ids: &[NodeId], stamp: DeletionStamp) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE nodes SET deleted_at = $2, deleted_by_id = $3, deleted_by_kind = $4, \
             updated_at = $2 WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .bind(stamp.at)
        .bind(stamp.by.id)
        .bind(stamp.by.kind)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to trash nodes"))?;
        Ok(result.rows_affected())
    }

    async fn clear_deleted(&mut self, ids: &[NodeId]) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE nodes SET deleted_at = NULL, deleted_by_id = NULL, deleted_by_kind = NULL, \
             updated_at = NOW() WHERE id = ANY($1) AND deleted_at IS NOT NULL",
        )
        .bind(ids)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to restore nodes"))?;
        Ok(result.rows_affected())
    }

    async fn delete_nodes(&mut self, ids: &[NodeId]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *self.tx)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }

    async fn count_trashed_children(
        &mut self,
        parents: &[NodeId],
    ) -> AppResult<HashMap<NodeId, i64>> {
        let rows: Vec<(NodeId, i64)> = sqlx::query_as(
            "SELECT parent_id, COUNT(*) FROM nodes \
             WHERE parent_id = ANY($1) AND deleted_at IS NOT NULL GROUP BY parent_id",
        )
        .bind(parents)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to count trashed children"))?;
        Ok(rows.into_iter().collect())
    }

    async fn shares_for_node(&mut self, node_id: NodeId) -> AppResult<Vec<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM shares WHERE node_id = $1 ORDER BY id ASC")
            .bind(node_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error("Failed to list shares"))
    }

    async fn shares_for_grantee(
        &mut self,
        grantee: &Actor,
        node_ids: &[NodeId],
    ) -> AppResult<Vec<Share>> {
        sqlx::query_as::<_, Share>(
            "SELECT * FROM shares WHERE grantee_id = $1 AND grantee_kind = $2 \
             AND node_id = ANY($3) ORDER BY id ASC",
        )
        .bind(grantee.id)
        .bind(grantee.kind)
        .bind(node_ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to list grantee shares"))
    }

    async fn upsert_shares(&mut self, node_ids: &[NodeId], grant: &ShareGrant) -> AppResult<u64> {
        let result = sqlx::query(
            "INSERT INTO shares (node_id, grantee_id, grantee_kind, grantor_id, grantor_kind, edit_allowed) \
             SELECT node_id, $2, $3, $4, $5, $6 FROM UNNEST($1::BIGINT[]) AS t(node_id) \
             ON CONFLICT ON CONSTRAINT shares_node_grantee_key \
             DO UPDATE SET edit_allowed = EXCLUDED.edit_allowed",
        )
        .bind(node_ids)
        .bind(grant.grantee.id)
        .bind(grant.grantee.kind)
        .bind(grant.grantor.id)
        .bind(grant.grantor.kind)
        .bind(grant.edit_allowed)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to upsert shares"))?;
        Ok(result.rows_affected())
    }

    async fn inherit_shares(&mut self, node_id: NodeId, parent_id: NodeId) -> AppResult<u64> {
        let result = sqlx::query(
            "INSERT INTO shares (node_id, grantee_id, grantee_kind, grantor_id, grantor_kind, edit_allowed) \
             SELECT $1, grantee_id, grantee_kind, grantor_id, grantor_kind, edit_allowed \
             FROM shares WHERE node_id = $2 \
             ON CONFLICT ON CONSTRAINT shares_node_grantee_key DO NOTHING",
        )
        .bind(node_id)
        .bind(parent_id)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to inherit shares"))?;
        Ok(result.rows_affected())
    }

    async fn delete_shares(&mut self, node_ids: &[NodeId], grantee: &Actor) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM shares WHERE node_id = ANY($1) AND grantee_id = $2 AND grantee_kind = $3",
        )
        .bind(node_ids)
        .bind(grantee.id)
        .bind(grantee.kind)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to delete shares"))?;
        Ok(result.rows_affected())
    }

    async fn delete_shares_for_nodes(&mut self, node_ids: &[NodeId]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM shares WHERE node_id = ANY($1)")
            .bind(node_ids)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to delete shares"))?;
        Ok(result.rows_affected())
    }

    async fn followers_for_nodes(
        &mut self,
        node_ids: &[NodeId],
        active_only: bool,
    ) -> AppResult<Vec<Follower>> {
        sqlx::query_as::<_, Follower>(
            "SELECT * FROM followers WHERE node_id = ANY($1) AND (active OR NOT $2) \
             ORDER BY id ASC",
        )
        .bind(node_ids)
        .bind(active_only)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to list followers"))
    }

    async fn upsert_follower(
        &mut self,
        node_id: NodeId,
        actor: &Actor,
        prefs: FollowPreferences,
    ) -> AppResult<Follower> {
        sqlx::query_as::<_, Follower>(
            "INSERT INTO followers (node_id, actor_id, actor_kind, days_before_alert, alert_on_expiry) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT ON CONSTRAINT followers_node_actor_key DO UPDATE SET \
             days_before_alert = EXCLUDED.days_before_alert, \
             alert_on_expiry = EXCLUDED.alert_on_expiry, active = TRUE, updated_at = NOW() \
             RETURNING *",
        )
        .bind(node_id)
        .bind(actor.id)
        .bind(actor.kind)
        .bind(prefs.days_before_alert)
        .bind(prefs.alert_on_expiry)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("Failed to follow node"))
    }

    async fn deactivate_follower(&mut self, node_id: NodeId, actor: &Actor) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE followers SET active = FALSE, updated_at = NOW() \
             WHERE node_id = $1 AND actor_id = $2 AND actor_kind = $3 AND active",
        )
        .bind(node_id)
        .bind(actor.id)
        .bind(actor.kind)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to unfollow node"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_followers_for_nodes(&mut self, node_ids: &[NodeId]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM followers WHERE node_id = ANY($1)")
            .bind(node_ids)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to delete followers"))?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(db_error("Failed to commit transaction"))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(db_error("Failed to roll back transaction"))
    }
}
