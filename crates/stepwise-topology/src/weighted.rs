//! Undirected weighted graph stored as an edge list.

use crate::TopologyError;

/// A vertex index in `0..vertex_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexId(pub usize);

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an edge in the graph's edge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeId(pub usize);

/// An undirected edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub source: VertexId,
    pub target: VertexId,
    pub weight: u32,
}

impl Edge {
    /// Create an edge.
    pub const fn new(source: usize, target: usize, weight: u32) -> Self {
        Self {
            source: VertexId(source),
            target: VertexId(target),
            weight,
        }
    }

    /// The endpoint opposite `vertex`, if `vertex` is an endpoint.
    pub fn other(&self, vertex: VertexId) -> Option<VertexId> {
        if vertex == self.source {
            Some(self.target)
        } else if vertex == self.target {
            Some(self.source)
        } else {
            None
        }
    }

    /// Whether the edge joins `a` and `b` in either direction.
    pub fn joins(&self, a: VertexId, b: VertexId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Undirected weighted graph over vertices `0..vertex_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawWeightedGraph")
)]
pub struct WeightedGraph {
    vertex_count: usize,
    edges: Vec<Edge>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawWeightedGraph {
    vertex_count: usize,
    edges: Vec<Edge>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawWeightedGraph> for WeightedGraph {
    type Error = TopologyError;

    fn try_from(raw: RawWeightedGraph) -> Result<Self, Self::Error> {
        Self::new(raw.vertex_count, raw.edges)
    }
}

impl WeightedGraph {
    /// Build a graph, rejecting unknown endpoints and self-loops.
    pub fn new(vertex_count: usize, edges: Vec<Edge>) -> Result<Self, TopologyError> {
        for edge in &edges {
            for vertex in [edge.source, edge.target] {
                if vertex.0 >= vertex_count {
                    return Err(TopologyError::UnknownVertex {
                        vertex,
                        vertex_count,
                    });
                }
            }
            if edge.source == edge.target {
                return Err(TopologyError::SelfLoop(edge.source));
            }
        }
        Ok(Self {
            vertex_count,
            edges,
        })
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up an edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    /// Per-vertex incidence lists of `(edge id, neighbor)`.
    ///
    /// Each list follows edge insertion order; an edge appears in both of
    /// its endpoints' lists.
    pub fn adjacency(&self) -> Vec<Vec<(EdgeId, VertexId)>> {
        let mut adj = vec![Vec::new(); self.vertex_count];
        for (i, edge) in self.edges.iter().enumerate() {
            adj[edge.source.0].push((EdgeId(i), edge.target));
            adj[edge.target.0].push((EdgeId(i), edge.source));
        }
        adj
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> u64 {
        self.edges.iter().map(|e| u64::from(e.weight)).sum()
    }
}
