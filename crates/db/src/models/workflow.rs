//! Stored workflow graphs.

use entyre_core::types::{DbId, Timestamp};
use entyre_core::workflow::WorkflowGraph;
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `workflows` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: DbId,
    pub name: String,
    pub status: Option<String>,
    pub description: Option<String>,
    pub nodes: Value,
    pub connections: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_positions: Option<Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Workflow {
    /// Decode the JSONB columns back into a typed graph.
    pub fn graph(&self) -> Result<WorkflowGraph, serde_json::Error> {
        Ok(WorkflowGraph {
            name: self.name.clone(),
            status: self.status.clone(),
            description: self.description.clone(),
            nodes: serde_json::from_value(self.nodes.clone())?,
            connections: serde_json::from_value(self.connections.clone())?,
            node_positions: self
                .node_positions
                .clone()
                .map(serde_json::from_value)
                .transpose()?,
        })
    }
}
