//! Breadth-first and depth-first graph traversal.
//!
//! Both strategies share one loop and differ only in which end of the
//! frontier they take from. Nodes are marked discovered when they enter the
//! frontier, so each node is taken at most once.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use stepwise_topology::{Graph, NodeId};
use tracing::debug;

use crate::lockstep::{lockstep, Lockstep};
use crate::{InputError, Trace, TraceEvent, TraceRecorder};

/// A graph with validated start and target nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTraversalInput")]
pub struct TraversalInput {
    graph: Graph,
    start: NodeId,
    target: NodeId,
}

#[derive(Deserialize)]
struct RawTraversalInput {
    graph: Graph,
    start: NodeId,
    target: NodeId,
}

impl TryFrom<RawTraversalInput> for TraversalInput {
    type Error = InputError;

    fn try_from(raw: RawTraversalInput) -> Result<Self, Self::Error> {
        Self::new(raw.graph, raw.start, raw.target)
    }
}

impl TraversalInput {
    pub fn new(graph: Graph, start: NodeId, target: NodeId) -> Result<Self, InputError> {
        for (role, node) in [("start", start), ("target", target)] {
            if !graph.contains(node) {
                return Err(InputError::UnknownNode { role, node });
            }
        }
        Ok(Self {
            graph,
            start,
            target,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn target(&self) -> NodeId {
        self.target
    }
}

/// The built-in demonstration graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleGraph {
    /// Nine-node tree-like graph.
    Simple,
    /// Twelve nodes with several cycles.
    Complex,
    /// Thirteen-node corridor maze.
    Maze,
}

impl SampleGraph {
    pub const ALL: [Self; 3] = [Self::Simple, Self::Complex, Self::Maze];

    pub fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Complex => "complex",
            Self::Maze => "maze",
        }
    }

    /// Build the graph with its start and target.
    pub fn input(self) -> Result<TraversalInput, InputError> {
        let (rows, target) = match self {
            Self::Simple => (SIMPLE_ROWS, 9),
            Self::Complex => (COMPLEX_ROWS, 11),
            Self::Maze => (MAZE_ROWS, 13),
        };
        TraversalInput::new(Graph::from_rows(rows)?, NodeId(1), NodeId(target))
    }
}

type NodeRow = (u32, &'static str, &'static [u32]);

const SIMPLE_ROWS: &[NodeRow] = &[
    (1, "A", &[2, 3, 4]),
    (2, "B", &[1, 5, 6]),
    (3, "C", &[1, 7]),
    (4, "D", &[1, 8]),
    (5, "E", &[2, 9]),
    (6, "F", &[2]),
    (7, "G", &[3, 8]),
    (8, "H", &[4, 7]),
    (9, "I", &[5]),
];

const COMPLEX_ROWS: &[NodeRow] = &[
    (1, "A", &[2, 3, 4]),
    (2, "B", &[1, 5, 6]),
    (3, "C", &[1, 7, 8]),
    (4, "D", &[1, 8, 9]),
    (5, "E", &[2, 10]),
    (6, "F", &[2, 7, 10]),
    (7, "G", &[3, 6, 8]),
    (8, "H", &[3, 4, 7, 9]),
    (9, "I", &[4, 8, 12]),
    (10, "J", &[5, 6, 11]),
    (11, "K", &[10, 12]),
    (12, "L", &[9, 11]),
];

const MAZE_ROWS: &[NodeRow] = &[
    (1, "A", &[2]),
    (2, "B", &[1, 3, 5]),
    (3, "C", &[2, 4]),
    (4, "D", &[3, 7]),
    (5, "E", &[2, 6]),
    (6, "F", &[5, 9]),
    (7, "G", &[4, 8, 10]),
    (8, "H", &[7]),
    (9, "I", &[6, 10, 12]),
    (10, "J", &[7, 9, 11]),
    (11, "K", &[10]),
    (12, "L", &[9, 13]),
    (13, "M", &[12]),
];

/// Which end of the frontier to take from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// FIFO queue.
    Bfs,
    /// LIFO stack.
    Dfs,
}

/// One traversal decision point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraversalEvent {
    /// A node was taken from the frontier.
    ///
    /// `explored` lists nodes taken earlier, oldest first; `frontier` is the
    /// queue or stack after the removal, front/bottom first.
    Current {
        node: NodeId,
        explored: Vec<NodeId>,
        frontier: Vec<NodeId>,
    },
    /// Target reached along this path.
    Complete { path: Vec<NodeId> },
    /// Frontier emptied without reaching the target.
    NoPath,
}

impl TraceEvent for TraversalEvent {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::NoPath)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Current { .. } => "current",
            Self::Complete { .. } => "complete",
            Self::NoPath => "no_path",
        }
    }
}

/// Breadth-first search.
pub fn bfs(input: &TraversalInput) -> Trace<TraversalEvent> {
    traverse(input, Strategy::Bfs)
}

/// Depth-first search.
pub fn dfs(input: &TraversalInput) -> Trace<TraversalEvent> {
    traverse(input, Strategy::Dfs)
}

/// BFS and DFS side by side, BFS in lane 0.
pub fn compare(input: &TraversalInput) -> Trace<Lockstep<TraversalEvent>> {
    lockstep(&[bfs(input), dfs(input)])
}

/// Traverse with the given strategy.
pub fn traverse(input: &TraversalInput, strategy: Strategy) -> Trace<TraversalEvent> {
    let graph = input.graph();
    let mut recorder = TraceRecorder::new();
    let mut frontier = VecDeque::from([input.start]);
    let mut discovered = HashSet::from([input.start]);
    let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
    let mut explored = Vec::new();

    loop {
        let taken = match strategy {
            Strategy::Bfs => frontier.pop_front(),
            Strategy::Dfs => frontier.pop_back(),
        };
        let Some(node) = taken else { break };

        recorder.push(TraversalEvent::Current {
            node,
            explored: explored.clone(),
            frontier: frontier.iter().copied().collect(),
        });
        explored.push(node);

        if node == input.target {
            let mut path = vec![node];
            let mut cursor = node;
            while let Some(&parent) = parents.get(&cursor) {
                path.push(parent);
                cursor = parent;
            }
            path.reverse();
            debug!(?strategy, steps = explored.len(), path_len = path.len(), "traversal reached target");
            return recorder.finish(TraversalEvent::Complete { path });
        }

        let connections = graph.connections(node);
        let ordered: Box<dyn Iterator<Item = &NodeId>> = match strategy {
            Strategy::Bfs => Box::new(connections.iter()),
            Strategy::Dfs => Box::new(connections.iter().rev()),
        };
        for &next in ordered {
            if discovered.insert(next) {
                parents.insert(next, node);
                frontier.push_back(next);
            }
        }
    }

    debug!(?strategy, steps = explored.len(), "traversal found no path");
    recorder.finish(TraversalEvent::NoPath)
}

/// Summary figures for a traversal trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraversalStats {
    /// Nodes taken from the frontier.
    pub steps: usize,
    /// Nodes on the found path, or 0.
    pub path_length: usize,
    /// Nodes ever discovered.
    pub discovered: usize,
}

impl TraversalStats {
    pub fn from_trace(trace: &Trace<TraversalEvent>) -> Self {
        let mut stats = Self::default();
        for event in trace {
            match event {
                TraversalEvent::Current {
                    explored, frontier, ..
                } => {
                    stats.steps += 1;
                    stats.discovered = explored.len() + frontier.len() + 1;
                }
                TraversalEvent::Complete { path } => stats.path_length = path.len(),
                TraversalEvent::NoPath => {}
            }
        }
        stats
    }
}
