//! Workflow graphs: named sets of nodes, directed connections between
//! them, and optional 2-D positions for the editor canvas.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::choice::define_choice_enum;
use crate::error::CoreError;

define_choice_enum! {
    /// Rendering style of a connection.
    EdgeStyle ("edgeStyle") {
        Default => "default",
        RedDashed => "redDashed",
        RedSolid => "redSolid",
        GrayDashed => "grayDashed",
        BlueBold => "blueBold",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_style: Option<EdgeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

pub type NodePositions = BTreeMap<String, NodePosition>;

/// A complete, validated workflow ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowGraph {
    pub name: String,
    pub status: Option<String>,
    pub description: Option<String>,
    pub nodes: Vec<String>,
    pub connections: Vec<Connection>,
    pub node_positions: Option<NodePositions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowMode {
    Create,
    Update,
}

/// Validated request fields. `None` means the key was not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowInput {
    pub name: Option<String>,
    pub status: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub nodes: Option<Vec<String>>,
    pub connections: Option<Vec<Connection>>,
    /// `Some(None)` clears the stored positions.
    pub node_positions: Option<Option<NodePositions>>,
}

/// Check a create or update body, collecting every problem.
pub fn validate(body: &Value, mode: WorkflowMode) -> Result<WorkflowInput, CoreError> {
    let Some(obj) = body.as_object() else {
        return Err(CoreError::InvalidFields(vec![
            "Request body must be a JSON object".into(),
        ]));
    };

    let mut errors = Vec::new();
    let mut input = WorkflowInput::default();

    match obj.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => input.name = Some(s.trim().to_string()),
        Some(Value::String(_)) => errors.push("name must be a non-empty string".to_string()),
        Some(Value::Null) | None if mode == WorkflowMode::Create => {
            errors.push("name is required".to_string())
        }
        Some(Value::Null) | None => {}
        Some(_) => errors.push("name must be a string".to_string()),
    }

    for key in ["status", "description"] {
        let parsed = match obj.get(key) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                Some((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Some(_) => {
                errors.push(format!("{key} must be a string"));
                None
            }
        };
        if key == "status" {
            input.status = parsed;
        } else {
            input.description = parsed;
        }
    }

    match obj.get("nodes") {
        None => {}
        Some(Value::Null) => input.nodes = Some(Vec::new()),
        Some(Value::Array(items)) => input.nodes = Some(validate_nodes(items, &mut errors)),
        Some(_) => errors.push("nodes must be an array".to_string()),
    }

    match obj.get("connections") {
        None => {}
        Some(Value::Null) => input.connections = Some(Vec::new()),
        Some(Value::Array(items)) => {
            input.connections = Some(validate_connections(items, &mut errors))
        }
        Some(_) => errors.push("connections must be an array".to_string()),
    }

    match obj.get("nodePositions") {
        None => {}
        Some(Value::Null) => input.node_positions = Some(None),
        Some(Value::Object(map)) => {
            let positions = validate_positions(map, &mut errors);
            input.node_positions = Some((!positions.is_empty()).then_some(positions));
        }
        Some(_) => errors.push("nodePositions must be an object".to_string()),
    }

    if errors.is_empty() {
        Ok(input)
    } else {
        Err(CoreError::InvalidFields(errors))
    }
}

fn validate_nodes(items: &[Value], errors: &mut Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_str().map(str::trim) {
            Some(id) if !id.is_empty() => {
                if seen.insert(id.to_string()) {
                    nodes.push(id.to_string());
                } else {
                    errors.push(format!("nodes contains '{id}' more than once"));
                }
            }
            _ => errors.push(format!("nodes[{i}] must be a non-empty string")),
        }
    }
    nodes
}

fn validate_connections(items: &[Value], errors: &mut Vec<String>) -> Vec<Connection> {
    let mut connections = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            errors.push(format!("connections[{i}] must be an object"));
            continue;
        };

        let mut ok = true;
        let mut required = |key: &str| match obj.get(key).and_then(Value::as_str).map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                errors.push(format!("connections[{i}].{key} is required"));
                ok = false;
                String::new()
            }
        };
        let from = required("from");
        let to = required("to");

        let mut optional = |key: &str| match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(_) => {
                errors.push(format!("connections[{i}].{key} must be a string"));
                ok = false;
                None
            }
        };
        let source_handle = optional("sourceHandle");
        let target_handle = optional("targetHandle");
        let edge_type = optional("edgeType");
        let edge_style = optional("edgeStyle");

        let edge_style = match edge_style.as_deref().map(EdgeStyle::from_str_value) {
            None => None,
            Some(Ok(style)) => Some(style),
            Some(Err(e)) => {
                errors.push(format!("connections[{i}]: {e}"));
                ok = false;
                None
            }
        };

        if ok {
            connections.push(Connection {
                from,
                to,
                source_handle,
                target_handle,
                edge_style,
                edge_type,
            });
        }
    }
    connections
}

fn validate_positions(map: &Map<String, Value>, errors: &mut Vec<String>) -> NodePositions {
    let mut positions = NodePositions::new();
    for (node, value) in map {
        let coords = value.as_object().and_then(|p| {
            Some(NodePosition {
                x: p.get("x")?.as_f64()?,
                y: p.get("y")?.as_f64()?,
            })
        });
        match coords {
            Some(position) => {
                positions.insert(node.clone(), position);
            }
            None => errors.push(format!(
                "nodePositions.{node} must be an object with numeric x and y"
            )),
        }
    }
    positions
}

impl WorkflowInput {
    /// Apply the input on top of the stored workflow (if any) and check
    /// that every connection joins declared nodes.
    pub fn resolve(self, existing: Option<&WorkflowGraph>) -> Result<WorkflowGraph, CoreError> {
        let name = match (self.name, existing) {
            (Some(name), _) => name,
            (None, Some(stored)) => stored.name.clone(),
            (None, None) => return Err(CoreError::InvalidFields(vec!["name is required".into()])),
        };

        let graph = WorkflowGraph {
            name,
            status: self
                .status
                .unwrap_or_else(|| existing.and_then(|w| w.status.clone())),
            description: self
                .description
                .unwrap_or_else(|| existing.and_then(|w| w.description.clone())),
            nodes: self
                .nodes
                .or_else(|| existing.map(|w| w.nodes.clone()))
                .unwrap_or_default(),
            connections: self
                .connections
                .or_else(|| existing.map(|w| w.connections.clone()))
                .unwrap_or_default(),
            node_positions: self
                .node_positions
                .unwrap_or_else(|| existing.and_then(|w| w.node_positions.clone())),
        };

        let declared: HashSet<&str> = graph.nodes.iter().map(String::as_str).collect();
        let mut errors = Vec::new();
        for (i, connection) in graph.connections.iter().enumerate() {
            for (end, node) in [("from", &connection.from), ("to", &connection.to)] {
                if !declared.contains(node.as_str()) {
                    errors.push(format!(
                        "connections[{i}].{end} references unknown node '{node}'"
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(graph)
        } else {
            Err(CoreError::InvalidFields(errors))
        }
    }
}
