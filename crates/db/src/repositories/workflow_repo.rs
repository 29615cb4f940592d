//! Repository for the `workflows` table.

use entyre_core::types::DbId;
use entyre_core::workflow::WorkflowGraph;
use serde_json::Value;
use sqlx::PgPool;

use crate::models::workflow::Workflow;

/// Column list for workflows queries.
const COLUMNS: &str =
    "id, name, status, description, nodes, connections, node_positions, created_at, updated_at";

pub struct WorkflowRepo;

impl WorkflowRepo {
    /// List all workflows, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Workflow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflows ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Workflow>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workflow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflows WHERE id = $1");
        sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, graph: &WorkflowGraph) -> Result<Workflow, sqlx::Error> {
        let (nodes, connections, positions) = graph_columns(graph)?;
        let query = format!(
            "INSERT INTO workflows (name, status, description, nodes, connections, node_positions)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(&graph.name)
            .bind(&graph.status)
            .bind(&graph.description)
            .bind(nodes)
            .bind(connections)
            .bind(positions)
            .fetch_one(pool)
            .await
    }

    /// Overwrite a workflow with its resolved graph.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        graph: &WorkflowGraph,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        let (nodes, connections, positions) = graph_columns(graph)?;
        let query = format!(
            "UPDATE workflows SET
                name = $2,
                status = $3,
                description = $4,
                nodes = $5,
                connections = $6,
                node_positions = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .bind(&graph.name)
            .bind(&graph.status)
            .bind(&graph.description)
            .bind(nodes)
            .bind(connections)
            .bind(positions)
            .fetch_optional(pool)
            .await
    }

    /// Delete a workflow. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn graph_columns(graph: &WorkflowGraph) -> Result<(Value, Value, Option<Value>), sqlx::Error> {
    let encode = |e: serde_json::Error| sqlx::Error::Encode(Box::new(e));
    let nodes = serde_json::to_value(&graph.nodes).map_err(encode)?;
    let connections = serde_json::to_value(&graph.connections).map_err(encode)?;
    let positions = graph
        .node_positions
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(encode)?;
    Ok((nodes, connections, positions))
}
