//! Weighted graph snapshot for Prim/Kruskal playback.

use serde::{Deserialize, Serialize};
use stepwise_runners::mst::{circle_layout, Candidate};
use stepwise_runners::{MstAlgorithm, MstEvent, MstInput};
use stepwise_topology::{Edge, EdgeId, VertexId};

use super::Reduce;

const CANVAS_WIDTH: f64 = 800.0;
const CANVAS_HEIGHT: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexStatus {
    Normal,
    Considering,
    Highlight,
    InTree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStatus {
    Normal,
    Considering,
    Highlight,
    InTree,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeView {
    pub edge: Edge,
    pub status: EdgeStatus,
}

/// Vertex and edge statuses, the committed tree and its weight.
///
/// Tree members are never downgraded by later events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MstSnapshot {
    pub algorithm: MstAlgorithm,
    /// Status line for the last applied event.
    pub message: String,
    pub vertices: Vec<VertexStatus>,
    /// Vertex positions on the drawing canvas.
    pub layout: Vec<(f64, f64)>,
    pub edges: Vec<EdgeView>,
    pub tree: Vec<EdgeId>,
    pub total_weight: u64,
    /// Set once the run completes; false for a spanning forest.
    pub spanning: Option<bool>,
}

impl MstSnapshot {
    pub fn new(input: &MstInput, algorithm: MstAlgorithm) -> Self {
        let graph = input.graph();
        Self {
            algorithm,
            message: String::new(),
            vertices: vec![VertexStatus::Normal; graph.vertex_count()],
            layout: circle_layout(graph.vertex_count(), CANVAS_WIDTH, CANVAS_HEIGHT),
            edges: graph
                .edges()
                .iter()
                .map(|&edge| EdgeView {
                    edge,
                    status: EdgeStatus::Normal,
                })
                .collect(),
            tree: Vec::new(),
            total_weight: 0,
            spanning: None,
        }
    }

    pub fn vertex(&self, vertex: VertexId) -> VertexStatus {
        self.vertices[self.vertex_index(vertex)]
    }

    pub fn edge(&self, edge: EdgeId) -> EdgeStatus {
        self.edges[self.edge_index(edge)].status
    }

    fn vertex_index(&self, vertex: VertexId) -> usize {
        assert!(
            vertex.0 < self.vertices.len(),
            "vertex {} outside graph of {} vertices",
            vertex,
            self.vertices.len()
        );
        vertex.0
    }

    fn edge_index(&self, edge: EdgeId) -> usize {
        assert!(
            edge.0 < self.edges.len(),
            "edge {} outside graph of {} edges",
            edge.0,
            self.edges.len()
        );
        edge.0
    }

    fn mark_edge(&mut self, edge: EdgeId, status: EdgeStatus) {
        let i = self.edge_index(edge);
        if self.edges[i].status != EdgeStatus::InTree {
            self.edges[i].status = status;
        }
    }

    fn mark_endpoints(&mut self, candidate: &Candidate, status: VertexStatus) {
        for vertex in [candidate.from, candidate.to] {
            let i = self.vertex_index(vertex);
            if self.vertices[i] != VertexStatus::InTree {
                self.vertices[i] = status;
            }
        }
    }
}

impl Reduce for MstSnapshot {
    type Event = MstEvent;

    fn apply(&self, event: &MstEvent) -> Self {
        let mut next = self.clone();
        next.message = event.describe(self.algorithm);
        match event {
            MstEvent::Seed { vertex } => {
                let i = next.vertex_index(*vertex);
                next.vertices[i] = VertexStatus::InTree;
            }
            MstEvent::ConsiderEdge { candidate } => {
                next.mark_edge(candidate.edge, EdgeStatus::Considering);
                next.mark_endpoints(candidate, VertexStatus::Considering);
            }
            MstEvent::HighlightEdge { candidate } => {
                for view in &mut next.edges {
                    if view.status == EdgeStatus::Highlight {
                        view.status = EdgeStatus::Normal;
                    }
                }
                next.mark_edge(candidate.edge, EdgeStatus::Highlight);
                next.mark_endpoints(candidate, VertexStatus::Highlight);
            }
            MstEvent::SkipEdge { candidate } => {
                next.mark_edge(candidate.edge, EdgeStatus::Skipped);
                next.mark_endpoints(candidate, VertexStatus::Normal);
            }
            MstEvent::CommitEdge {
                candidate,
                total_weight,
            } => {
                next.mark_edge(candidate.edge, EdgeStatus::InTree);
                next.mark_endpoints(candidate, VertexStatus::InTree);
                next.tree.push(candidate.edge);
                next.total_weight = *total_weight;
            }
            MstEvent::Complete {
                edges,
                total_weight,
                spanning,
            } => {
                for view in &mut next.edges {
                    if matches!(view.status, EdgeStatus::Considering | EdgeStatus::Highlight) {
                        view.status = EdgeStatus::Normal;
                    }
                }
                for status in &mut next.vertices {
                    if *status != VertexStatus::InTree {
                        *status = VertexStatus::Normal;
                    }
                }
                next.tree = edges.clone();
                next.total_weight = *total_weight;
                next.spanning = Some(*spanning);
            }
        }
        next
    }
}
