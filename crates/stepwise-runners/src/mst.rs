//! Minimum spanning tree: Prim and Kruskal.
//!
//! Both runners break weight ties by edge insertion order. Candidate lists
//! are re-sorted with a stable sort after every batch of insertions, so an
//! earlier edge of equal weight always comes first.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use stepwise_topology::{Edge, EdgeId, VertexId, WeightedGraph};
use tracing::debug;

use crate::{InputError, Trace, TraceEvent, TraceRecorder};

/// Smallest graph worth visualizing.
pub const MIN_VERTICES: usize = 3;

/// A weighted graph accepted by the MST runners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMstInput")]
pub struct MstInput {
    graph: WeightedGraph,
}

#[derive(Deserialize)]
struct RawMstInput {
    graph: WeightedGraph,
}

impl TryFrom<RawMstInput> for MstInput {
    type Error = InputError;

    fn try_from(raw: RawMstInput) -> Result<Self, Self::Error> {
        Self::new(raw.graph)
    }
}

impl MstInput {
    pub fn new(graph: WeightedGraph) -> Result<Self, InputError> {
        if graph.vertex_count() < MIN_VERTICES {
            return Err(InputError::TooFewVertices {
                count: graph.vertex_count(),
                min: MIN_VERTICES,
            });
        }
        Ok(Self { graph })
    }

    pub fn graph(&self) -> &WeightedGraph {
        &self.graph
    }
}

/// Parameters for a random MST graph.
///
/// Every vertex pair `i < j` is connected with probability
/// `edge_probability`, with a uniform weight in `min_weight..=max_weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomGraphConfig {
    pub vertex_count: usize,
    pub edge_probability: f64,
    pub min_weight: u32,
    pub max_weight: u32,
    pub seed: u64,
}

impl Default for RandomGraphConfig {
    fn default() -> Self {
        Self {
            vertex_count: 8,
            edge_probability: 0.5,
            min_weight: 1,
            max_weight: 20,
            seed: 0,
        }
    }
}

impl RandomGraphConfig {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.vertex_count < MIN_VERTICES {
            return Err(InputError::TooFewVertices {
                count: self.vertex_count,
                min: MIN_VERTICES,
            });
        }
        if !(0.0..=1.0).contains(&self.edge_probability) {
            return Err(InputError::InvalidDensity(self.edge_probability));
        }
        if self.min_weight == 0 || self.min_weight > self.max_weight {
            return Err(InputError::InvalidWeightRange {
                min: self.min_weight,
                max: self.max_weight,
            });
        }
        Ok(())
    }

    /// Generate a graph. The same config always yields the same graph.
    pub fn generate(&self) -> Result<MstInput, InputError> {
        self.validate()?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut edges = Vec::new();
        for i in 0..self.vertex_count {
            for j in (i + 1)..self.vertex_count {
                if rng.gen_bool(self.edge_probability) {
                    let weight = rng.gen_range(self.min_weight..=self.max_weight);
                    edges.push(Edge::new(i, j, weight));
                }
            }
        }
        MstInput::new(WeightedGraph::new(self.vertex_count, edges)?)
    }
}

/// Place `count` vertices evenly on a circle inside a `width` x `height`
/// canvas, starting at angle zero.
pub fn circle_layout(count: usize, width: f64, height: f64) -> Vec<(f64, f64)> {
    let radius = width.min(height) * 0.4;
    let (cx, cy) = (width / 2.0, height / 2.0);
    let step = std::f64::consts::TAU / count.max(1) as f64;
    (0..count)
        .map(|i| {
            let angle = i as f64 * step;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

/// An edge seen from the vertex that reached it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub edge: EdgeId,
    pub from: VertexId,
    pub to: VertexId,
    pub weight: u32,
}

/// One MST decision point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MstEvent {
    /// Prim's start vertex joins the tree.
    Seed { vertex: VertexId },
    /// Edge added to the candidate set.
    ConsiderEdge { candidate: Candidate },
    /// Edge taken as the cheapest candidate.
    HighlightEdge { candidate: Candidate },
    /// Edge rejected because it would close a cycle.
    SkipEdge { candidate: Candidate },
    /// Edge added to the tree.
    CommitEdge { candidate: Candidate, total_weight: u64 },
    /// Run finished. `spanning` is false for a disconnected graph.
    Complete {
        edges: Vec<EdgeId>,
        total_weight: u64,
        spanning: bool,
    },
}

impl TraceEvent for MstEvent {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Seed { .. } => "seed",
            Self::ConsiderEdge { .. } => "consider_edge",
            Self::HighlightEdge { .. } => "highlight_edge",
            Self::SkipEdge { .. } => "skip_edge",
            Self::CommitEdge { .. } => "commit_edge",
            Self::Complete { .. } => "complete",
        }
    }
}

impl MstEvent {
    /// Status line shown under the canvas while this event plays.
    pub fn describe(&self, algorithm: MstAlgorithm) -> String {
        let edge = |c: &Candidate| format!("({}-{})", c.from, c.to);
        match self {
            Self::Seed { vertex } => format!("Starting with vertex {}", vertex),
            Self::ConsiderEdge { candidate } => format!(
                "Considering edge {} with weight {}",
                edge(candidate),
                candidate.weight
            ),
            Self::HighlightEdge { candidate } => format!(
                "Checking edge {} with weight {}",
                edge(candidate),
                candidate.weight
            ),
            Self::SkipEdge { candidate } => match algorithm {
                MstAlgorithm::Prim => format!(
                    "Vertex {} is already in the MST. Skipping edge.",
                    candidate.to
                ),
                MstAlgorithm::Kruskal => {
                    format!("Edge {} would create a cycle. Skipping.", edge(candidate))
                }
            },
            Self::CommitEdge {
                candidate,
                total_weight,
            } => format!(
                "Adding edge {} to MST. Total weight: {}",
                edge(candidate),
                total_weight
            ),
            Self::Complete { total_weight, .. } => format!(
                "{} algorithm complete. MST weight: {}",
                algorithm.title(),
                total_weight
            ),
        }
    }
}

/// Disjoint-set forest with path compression.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    /// Root of `x`'s set, compressing the path on the way.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Attach `a`'s root under `b`'s root. Returns false if already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        self.parent[ra] = rb;
        true
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }
}

struct TreeBuilder {
    recorder: TraceRecorder<MstEvent>,
    edges: Vec<EdgeId>,
    total: u64,
    target_size: usize,
}

impl TreeBuilder {
    fn new(vertex_count: usize) -> Self {
        Self {
            recorder: TraceRecorder::new(),
            edges: Vec::new(),
            total: 0,
            target_size: vertex_count.saturating_sub(1),
        }
    }

    fn commit(&mut self, candidate: Candidate) {
        self.edges.push(candidate.edge);
        self.total += u64::from(candidate.weight);
        self.recorder.push(MstEvent::CommitEdge {
            candidate,
            total_weight: self.total,
        });
    }

    fn is_complete(&self) -> bool {
        self.edges.len() >= self.target_size
    }

    fn finish(self, algorithm: &'static str) -> Trace<MstEvent> {
        let spanning = self.is_complete();
        debug!(
            algorithm,
            events = self.recorder.len() + 1,
            total_weight = self.total,
            spanning,
            "mst finished"
        );
        self.recorder.finish(MstEvent::Complete {
            edges: self.edges,
            total_weight: self.total,
            spanning,
        })
    }
}

/// Prim's algorithm from vertex 0.
pub fn prim(input: &MstInput) -> Trace<MstEvent> {
    let graph = input.graph();
    let adjacency = graph.adjacency();
    let weight_of = |edge: EdgeId| graph.edges()[edge.0].weight;

    let mut tree = TreeBuilder::new(graph.vertex_count());
    let mut in_tree = vec![false; graph.vertex_count()];
    let mut candidates: Vec<Candidate> = Vec::new();

    let start = VertexId(0);
    in_tree[start.0] = true;
    tree.recorder.push(MstEvent::Seed { vertex: start });
    for &(edge, to) in &adjacency[start.0] {
        let candidate = Candidate {
            edge,
            from: start,
            to,
            weight: weight_of(edge),
        };
        candidates.push(candidate);
        tree.recorder.push(MstEvent::ConsiderEdge { candidate });
    }
    candidates.sort_by_key(|c| c.weight);

    while !candidates.is_empty() && !tree.is_complete() {
        let candidate = candidates.remove(0);
        tree.recorder.push(MstEvent::HighlightEdge { candidate });

        if in_tree[candidate.to.0] {
            tree.recorder.push(MstEvent::SkipEdge { candidate });
            continue;
        }

        let vertex = candidate.to;
        in_tree[vertex.0] = true;
        tree.commit(candidate);

        for &(edge, to) in &adjacency[vertex.0] {
            if in_tree[to.0] {
                continue;
            }
            let next = Candidate {
                edge,
                from: vertex,
                to,
                weight: weight_of(edge),
            };
            candidates.push(next);
            tree.recorder.push(MstEvent::ConsiderEdge { candidate: next });
        }
        candidates.sort_by_key(|c| c.weight);
    }

    tree.finish("prim")
}

/// Kruskal's algorithm over the weight-sorted edge list.
pub fn kruskal(input: &MstInput) -> Trace<MstEvent> {
    let graph = input.graph();
    let mut order: Vec<EdgeId> = (0..graph.edges().len()).map(EdgeId).collect();
    order.sort_by_key(|id| graph.edges()[id.0].weight);

    let mut tree = TreeBuilder::new(graph.vertex_count());
    let mut sets = UnionFind::new(graph.vertex_count());

    for edge in order {
        let e = graph.edges()[edge.0];
        let candidate = Candidate {
            edge,
            from: e.source,
            to: e.target,
            weight: e.weight,
        };
        tree.recorder.push(MstEvent::ConsiderEdge { candidate });

        if sets.union(e.source.0, e.target.0) {
            tree.commit(candidate);
            if tree.is_complete() {
                break;
            }
        } else {
            tree.recorder.push(MstEvent::SkipEdge { candidate });
        }
    }

    tree.finish("kruskal")
}

/// Which spanning-tree runner to record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MstAlgorithm {
    Prim,
    Kruskal,
}

impl MstAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::Prim => "prim",
            Self::Kruskal => "kruskal",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Prim => "Prim's",
            Self::Kruskal => "Kruskal's",
        }
    }

    pub fn run(self, input: &MstInput) -> Trace<MstEvent> {
        match self {
            Self::Prim => prim(input),
            Self::Kruskal => kruskal(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(vertices: usize, edges: &[(usize, usize, u32)]) -> MstInput {
        let edges = edges.iter().map(|&(s, t, w)| Edge::new(s, t, w)).collect();
        MstInput::new(WeightedGraph::new(vertices, edges).unwrap()).unwrap()
    }

    fn square() -> MstInput {
        // 0-1 (1), 1-2 (2), 2-3 (3), 3-0 (4), 0-2 (5), 1-3 (6)
        input(4, &[(0, 1, 1), (1, 2, 2), (2, 3, 3), (3, 0, 4), (0, 2, 5), (1, 3, 6)])
    }

    fn committed(trace: &Trace<MstEvent>) -> Vec<Candidate> {
        trace
            .iter()
            .filter_map(|e| match e {
                MstEvent::CommitEdge { candidate, .. } => Some(*candidate),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn kruskal_never_commits_a_cycle() {
        let trace = kruskal(&square());
        let mut sets = UnionFind::new(4);
        for c in committed(&trace) {
            assert!(!sets.connected(c.from.0, c.to.0), "edge {:?} closes a cycle", c.edge);
            sets.union(c.from.0, c.to.0);
        }
        assert_eq!(
            trace.terminal(),
            &MstEvent::Complete {
                edges: vec![EdgeId(0), EdgeId(1), EdgeId(2)],
                total_weight: 6,
                spanning: true
            }
        );
        // Stops after the third commit, so the heavier edges are never considered.
        assert_eq!(trace.count(|e| matches!(e, MstEvent::ConsiderEdge { .. })), 3);
    }

    #[test]
    fn kruskal_skips_cycle_edges() {
        // Triangle plus a pendant vertex: the heaviest triangle edge is skipped.
        let trace = kruskal(&input(4, &[(0, 1, 1), (1, 2, 1), (0, 2, 2), (2, 3, 3)]));
        let skipped: Vec<_> = trace
            .iter()
            .filter_map(|e| match e {
                MstEvent::SkipEdge { candidate } => Some(candidate.edge),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, vec![EdgeId(2)]);
    }

    #[test]
    fn prim_event_order() {
        let trace = prim(&input(3, &[(0, 1, 2), (0, 2, 1), (1, 2, 1)]));
        let c = |edge, from, to, weight| Candidate {
            edge: EdgeId(edge),
            from: VertexId(from),
            to: VertexId(to),
            weight,
        };
        assert_eq!(
            trace.events(),
            &[
                MstEvent::Seed { vertex: VertexId(0) },
                MstEvent::ConsiderEdge { candidate: c(0, 0, 1, 2) },
                MstEvent::ConsiderEdge { candidate: c(1, 0, 2, 1) },
                MstEvent::HighlightEdge { candidate: c(1, 0, 2, 1) },
                MstEvent::CommitEdge {
                    candidate: c(1, 0, 2, 1),
                    total_weight: 1
                },
                MstEvent::ConsiderEdge { candidate: c(2, 2, 1, 1) },
                MstEvent::HighlightEdge { candidate: c(2, 2, 1, 1) },
                MstEvent::CommitEdge {
                    candidate: c(2, 2, 1, 1),
                    total_weight: 2
                },
                MstEvent::Complete {
                    edges: vec![EdgeId(1), EdgeId(2)],
                    total_weight: 2,
                    spanning: true
                },
            ]
        );
    }

    #[test]
    fn prim_skips_stale_candidates() {
        // 0-2 (3) is queued from 0 and goes stale once 1-2 (1) reaches 2.
        let trace = prim(&input(4, &[(0, 1, 1), (0, 2, 3), (1, 2, 1), (2, 3, 5)]));
        let skipped: Vec<_> = trace
            .iter()
            .filter_map(|e| match e {
                MstEvent::SkipEdge { candidate } => Some(candidate.edge),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, vec![EdgeId(1)]);
        assert_eq!(
            trace.terminal(),
            &MstEvent::Complete {
                edges: vec![EdgeId(0), EdgeId(2), EdgeId(3)],
                total_weight: 7,
                spanning: true
            }
        );
    }

    #[test]
    fn prim_matches_kruskal_on_square() {
        let (p, k) = (prim(&square()), kruskal(&square()));
        assert_eq!(committed(&p).len(), 3);
        assert!(matches!(p.terminal(), MstEvent::Complete { total_weight: 6, .. }));
        assert!(matches!(k.terminal(), MstEvent::Complete { total_weight: 6, .. }));
    }

    #[test]
    fn disconnected_graph_is_not_spanning() {
        let graph = input(4, &[(0, 1, 3), (2, 3, 1)]);
        for trace in [prim(&graph), kruskal(&graph)] {
            match trace.terminal() {
                MstEvent::Complete { spanning, .. } => assert!(!spanning),
                other => panic!("unexpected terminal {:?}", other),
            }
        }
    }

    #[test]
    fn union_find_compresses() {
        let mut sets = UnionFind::new(5);
        assert!(sets.union(0, 1));
        assert!(sets.union(1, 2));
        assert!(sets.union(2, 3));
        assert!(!sets.union(3, 0));
        let root = sets.find(0);
        assert_eq!(sets.parent[0], root);
        assert!(!sets.connected(0, 4));
    }

    #[test]
    fn generator_is_seeded() {
        let config = RandomGraphConfig {
            seed: 7,
            ..Default::default()
        };
        let a = config.generate().unwrap();
        let b = config.generate().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.graph().vertex_count(), 8);
        assert!(a.graph().edges().iter().all(|e| (1..=20).contains(&e.weight)));
    }

    #[test]
    fn generator_validates() {
        let bad = |config: RandomGraphConfig| config.generate().unwrap_err();
        assert!(matches!(
            bad(RandomGraphConfig {
                vertex_count: 2,
                ..Default::default()
            }),
            InputError::TooFewVertices { count: 2, min: 3 }
        ));
        assert!(matches!(
            bad(RandomGraphConfig {
                edge_probability: 1.5,
                ..Default::default()
            }),
            InputError::InvalidDensity(_)
        ));
        assert!(matches!(
            bad(RandomGraphConfig {
                min_weight: 9,
                max_weight: 3,
                ..Default::default()
            }),
            InputError::InvalidWeightRange { min: 9, max: 3 }
        ));
    }

    #[test]
    fn full_density_is_complete_graph() {
        let config = RandomGraphConfig {
            vertex_count: 6,
            edge_probability: 1.0,
            ..Default::default()
        };
        assert_eq!(config.generate().unwrap().graph().edges().len(), 15);
    }

    #[test]
    fn layout_is_on_circle() {
        let points = circle_layout(4, 800.0, 500.0);
        assert_eq!(points.len(), 4);
        for (x, y) in points {
            let r = ((x - 400.0).powi(2) + (y - 250.0).powi(2)).sqrt();
            assert!((r - 200.0).abs() < 1e-9);
        }
    }

    #[test]
    fn kruskal_ties_follow_insertion_order() {
        // Equal-weight 4-cycle: the closing edge 3-0 is never reached.
        let trace = kruskal(&input(4, &[(0, 1, 5), (1, 2, 5), (2, 3, 5), (3, 0, 5)]));
        assert_eq!(
            trace.terminal(),
            &MstEvent::Complete {
                edges: vec![EdgeId(0), EdgeId(1), EdgeId(2)],
                total_weight: 15,
                spanning: true
            }
        );
    }

    #[test]
    fn prim_ties_follow_insertion_order() {
        // Two parallel 0-1 edges of equal weight: the first one wins.
        let trace = prim(&input(3, &[(0, 1, 2), (0, 1, 2), (1, 2, 1)]));
        let highlighted: Vec<_> = trace
            .iter()
            .filter_map(|e| match e {
                MstEvent::HighlightEdge { candidate } => Some(candidate.edge),
                _ => None,
            })
            .collect();
        assert_eq!(highlighted, vec![EdgeId(0), EdgeId(2)]);
        assert_eq!(
            committed(&trace).iter().map(|c| c.edge).collect::<Vec<_>>(),
            vec![EdgeId(0), EdgeId(2)]
        );
        assert!(matches!(trace.terminal(), MstEvent::Complete { total_weight: 3, .. }));
    }

    #[test]
    fn describe_names_the_edge() {
        let candidate = Candidate {
            edge: EdgeId(4),
            from: VertexId(2),
            to: VertexId(5),
            weight: 7,
        };
        let line = |event: MstEvent, algorithm| event.describe(algorithm);
        assert_eq!(
            line(MstEvent::Seed { vertex: VertexId(0) }, MstAlgorithm::Prim),
            "Starting with vertex 0"
        );
        assert_eq!(
            line(MstEvent::HighlightEdge { candidate }, MstAlgorithm::Prim),
            "Checking edge (2-5) with weight 7"
        );
        assert_eq!(
            line(MstEvent::SkipEdge { candidate }, MstAlgorithm::Prim),
            "Vertex 5 is already in the MST. Skipping edge."
        );
        assert_eq!(
            line(MstEvent::SkipEdge { candidate }, MstAlgorithm::Kruskal),
            "Edge (2-5) would create a cycle. Skipping."
        );
        assert_eq!(
            line(
                MstEvent::CommitEdge {
                    candidate,
                    total_weight: 12
                },
                MstAlgorithm::Kruskal
            ),
            "Adding edge (2-5) to MST. Total weight: 12"
        );
        let done = MstEvent::Complete {
            edges: vec![],
            total_weight: 12,
            spanning: true,
        };
        assert_eq!(
            line(done, MstAlgorithm::Kruskal),
            "Kruskal's algorithm complete. MST weight: 12"
        );
    }

    #[test]
    fn deserialize_checks_graph() {
        let input = square();
        let json = serde_json::to_string(&input).unwrap();
        assert_eq!(serde_json::from_str::<MstInput>(&json).unwrap(), input);

        let dangling = r#"{"graph":{"vertex_count":1,"edges":[{"source":0,"target":5,"weight":3}]}}"#;
        let err = serde_json::from_str::<MstInput>(dangling).unwrap_err();
        assert!(err.to_string().contains("endpoint 5"), "{}", err);

        let tiny = r#"{"graph":{"vertex_count":2,"edges":[{"source":0,"target":1,"weight":3}]}}"#;
        let err = serde_json::from_str::<MstInput>(tiny).unwrap_err();
        assert!(err.to_string().contains("below the minimum of 3"), "{}", err);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prim_and_kruskal_agree_on_weight(
                seed in any::<u64>(),
                vertex_count in 3usize..12,
                density in 0.2f64..1.0,
            ) {
                let input = RandomGraphConfig {
                    vertex_count,
                    edge_probability: density,
                    seed,
                    ..Default::default()
                }
                .generate()
                .unwrap();

                let (p, k) = (prim(&input), kruskal(&input));
                let (MstEvent::Complete { total_weight: pw, spanning: ps, .. },
                     MstEvent::Complete { total_weight: kw, spanning: ks, edges }) =
                    (p.terminal(), k.terminal())
                else {
                    unreachable!("mst traces end in Complete");
                };
                if *ps {
                    prop_assert!(*ks);
                    prop_assert_eq!(pw, kw);
                }
                if *ks {
                    prop_assert_eq!(edges.len(), vertex_count - 1);
                }
            }
        }
    }
}
