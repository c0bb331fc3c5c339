//! Graph projection of the resource-allocation state.
//!
//! The backend builds a resource allocation graph: `R -> P` means the process
//! holds an instance of the resource, `P -> R` means it is waiting for one.
//! Node ids follow the backend convention `P<n>` / `R<n>`.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Directed graph with nodes in backend order.
///
/// Node order drives layout angle assignment, so it is preserved exactly.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node with the given id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Count nodes of a given kind.
    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn process(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Process)
    }

    pub fn resource(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Resource)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// What a node stands for.
///
/// The backend labels untyped nodes `"unknown"`; any string we don't
/// recognise lands in [`NodeKind::Unknown`] rather than failing the snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NodeKind {
    Process,
    Resource,
    Unknown,
}

impl NodeKind {
    /// Map a wire label to a kind. Never fails.
    pub fn from_wire(label: &str) -> Self {
        label.parse().unwrap_or(NodeKind::Unknown)
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(NodeKind::from_wire(&label))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_from_wire() {
        assert_eq!(NodeKind::from_wire("process"), NodeKind::Process);
        assert_eq!(NodeKind::from_wire("Resource"), NodeKind::Resource);
        assert_eq!(NodeKind::from_wire("unknown"), NodeKind::Unknown);
        assert_eq!(NodeKind::from_wire("semaphore"), NodeKind::Unknown);
    }

    #[test]
    fn test_node_type_field_rename() {
        let node: GraphNode = serde_json::from_str(r#"{"id": "P1", "type": "process"}"#).unwrap();
        assert_eq!(node, GraphNode::process("P1"));

        let json = serde_json::to_string(&GraphNode::resource("R2")).unwrap();
        assert_eq!(json, r#"{"id":"R2","type":"resource"}"#);
    }

    #[test]
    fn test_lookup_and_counts() {
        let graph = GraphData {
            nodes: vec![
                GraphNode::process("P1"),
                GraphNode::resource("R1"),
                GraphNode::process("P2"),
            ],
            edges: vec![GraphEdge::new("R1", "P1")],
        };
        assert!(!graph.is_empty());
        assert_eq!(graph.node("R1").map(|n| n.kind), Some(NodeKind::Resource));
        assert!(graph.node("R9").is_none());
        assert_eq!(graph.count_kind(NodeKind::Process), 2);
        assert_eq!(graph.count_kind(NodeKind::Unknown), 0);
    }

    #[test]
    fn test_missing_edges_is_an_error() {
        let result: Result<GraphData, _> = serde_json::from_str(r#"{"nodes": []}"#);
        assert!(result.is_err());
    }
}
