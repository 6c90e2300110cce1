//! Graph snapshot for BFS/DFS playback.

use serde::{Deserialize, Serialize};
use stepwise_runners::traversal::TraversalStats;
use stepwise_runners::{TraversalEvent, TraversalInput};
use stepwise_topology::NodeId;

use super::Reduce;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Unvisited,
    Frontier,
    Explored,
    Current,
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOutcome {
    Found,
    NoPath,
}

/// One node as drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: NodeId,
    pub label: String,
    pub status: NodeStatus,
}

/// Node statuses plus running stats, in graph declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalSnapshot {
    pub nodes: Vec<NodeView>,
    pub start: NodeId,
    pub target: NodeId,
    pub current: Option<NodeId>,
    pub path: Vec<NodeId>,
    pub stats: TraversalStats,
    pub outcome: Option<TraversalOutcome>,
}

impl TraversalSnapshot {
    pub fn new(input: &TraversalInput) -> Self {
        Self {
            nodes: input
                .graph()
                .nodes()
                .iter()
                .map(|n| NodeView {
                    id: n.id,
                    label: n.label.clone(),
                    status: NodeStatus::Unvisited,
                })
                .collect(),
            start: input.start(),
            target: input.target(),
            current: None,
            path: Vec::new(),
            stats: TraversalStats::default(),
            outcome: None,
        }
    }

    pub fn status(&self, id: NodeId) -> NodeStatus {
        self.nodes[self.position(id)].status
    }

    fn position(&self, id: NodeId) -> usize {
        self.nodes
            .iter()
            .position(|n| n.id == id)
            .unwrap_or_else(|| panic!("node {} is not in the graph", id))
    }

    fn set(&mut self, id: NodeId, status: NodeStatus) {
        let i = self.position(id);
        self.nodes[i].status = status;
    }
}

impl Reduce for TraversalSnapshot {
    type Event = TraversalEvent;

    fn apply(&self, event: &TraversalEvent) -> Self {
        let mut next = self.clone();
        match event {
            TraversalEvent::Current {
                node,
                explored,
                frontier,
            } => {
                for view in &mut next.nodes {
                    view.status = NodeStatus::Unvisited;
                }
                for &id in explored {
                    next.set(id, NodeStatus::Explored);
                }
                for &id in frontier {
                    next.set(id, NodeStatus::Frontier);
                }
                next.set(*node, NodeStatus::Current);
                next.current = Some(*node);
                next.stats.steps += 1;
                next.stats.discovered = explored.len() + frontier.len() + 1;
            }
            TraversalEvent::Complete { path } => {
                for &id in path {
                    next.set(id, NodeStatus::Path);
                }
                next.path = path.clone();
                next.stats.path_length = path.len();
                next.outcome = Some(TraversalOutcome::Found);
            }
            TraversalEvent::NoPath => {
                next.current = None;
                next.outcome = Some(TraversalOutcome::NoPath);
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_runners::{bfs, dfs, SampleGraph};

    #[test]
    fn final_stats_match_runner_stats() {
        for sample in SampleGraph::ALL {
            let input = sample.input().unwrap();
            for trace in [bfs(&input), dfs(&input)] {
                let snapshot = TraversalSnapshot::new(&input).fold(&trace);
                assert_eq!(snapshot.stats, TraversalStats::from_trace(&trace));
                assert_eq!(snapshot.outcome, Some(TraversalOutcome::Found));
            }
        }
    }

    #[test]
    fn current_event_rewrites_statuses() {
        let input = SampleGraph::Simple.input().unwrap();
        let trace = bfs(&input);
        let snapshot = TraversalSnapshot::new(&input).fold(trace.events()[..2].iter());

        assert_eq!(snapshot.status(NodeId(1)), NodeStatus::Explored);
        assert_eq!(snapshot.status(NodeId(2)), NodeStatus::Current);
        assert_eq!(snapshot.status(NodeId(3)), NodeStatus::Frontier);
        assert_eq!(snapshot.status(NodeId(5)), NodeStatus::Unvisited);
        assert_eq!(snapshot.current, Some(NodeId(2)));
    }

    #[test]
    fn path_nodes_marked() {
        let input = SampleGraph::Simple.input().unwrap();
        let snapshot = TraversalSnapshot::new(&input).fold(&dfs(&input));
        for id in [1, 2, 5, 9] {
            assert_eq!(snapshot.status(NodeId(id)), NodeStatus::Path);
        }
        assert_eq!(snapshot.path, vec![NodeId(1), NodeId(2), NodeId(5), NodeId(9)]);
    }

    #[test]
    #[should_panic(expected = "not in the graph")]
    fn unknown_node_panics() {
        let input = SampleGraph::Simple.input().unwrap();
        TraversalSnapshot::new(&input).apply(&TraversalEvent::Complete {
            path: vec![NodeId(99)],
        });
    }
}
