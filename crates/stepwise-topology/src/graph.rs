//! Unweighted adjacency-list graph for traversal.

use std::collections::HashSet;

use crate::TopologyError;

/// A graph node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node with a display label and ordered outgoing connections.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphNode {
    pub id: NodeId,
    pub label: String,
    pub connections: Vec<NodeId>,
}

/// Adjacency-list graph. Node order and connection order are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawGraph")
)]
pub struct Graph {
    nodes: Vec<GraphNode>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGraph {
    nodes: Vec<GraphNode>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGraph> for Graph {
    type Error = TopologyError;

    fn try_from(raw: RawGraph) -> Result<Self, Self::Error> {
        Self::new(raw.nodes)
    }
}

impl Graph {
    /// Build a graph, checking ids are unique and every connection resolves.
    pub fn new(nodes: Vec<GraphNode>) -> Result<Self, TopologyError> {
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(node.id) {
                return Err(TopologyError::DuplicateNode(node.id));
            }
        }
        for node in &nodes {
            if let Some(&to) = node.connections.iter().find(|c| !seen.contains(*c)) {
                return Err(TopologyError::UnknownConnection { from: node.id, to });
            }
        }
        Ok(Self { nodes })
    }

    /// Build from `(id, label, connections)` rows.
    pub fn from_rows(rows: &[(u32, &str, &[u32])]) -> Result<Self, TopologyError> {
        let nodes = rows
            .iter()
            .map(|(id, label, conns)| GraphNode {
                id: NodeId(*id),
                label: (*label).to_string(),
                connections: conns.iter().copied().map(NodeId).collect(),
            })
            .collect();
        Self::new(nodes)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Whether the graph has a node with this id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Outgoing connections of a node, in declaration order.
    pub fn connections(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.connections.as_slice()).unwrap_or(&[])
    }
}
