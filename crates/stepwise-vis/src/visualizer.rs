//! One visualizer per algorithm family, plus the play/pause toggle.

use std::fmt;

use stepwise_runners::sorting::SortAlgorithm;
use stepwise_runners::traversal::{traverse, Strategy};
use stepwise_runners::{
    astar, compare, race, solve, sort, MazeInput, MstAlgorithm, MstInput, SortInput, SudokuInput,
    Trace, TraversalInput,
};
use tokio::time::Instant;

use crate::playback::{DelayCurve, PlaybackError, PlaybackState, Scheduler, Speed};
use crate::run::Run;
use crate::snapshot::{
    ArraySnapshot, ComparisonSnapshot, GridSnapshot, MstSnapshot, RaceSnapshot, Reduce,
    SudokuSnapshot, TraversalSnapshot,
};

/// Event type of a visualizer's snapshot.
pub type EventOf<V> = <<V as Visualizer>::Snapshot as Reduce>::Event;

/// Ties an input type to its runner, snapshot and pacing.
pub trait Visualizer: Send + Sync + 'static {
    type Input: Clone + fmt::Debug + Send + Sync + 'static;
    type Snapshot: Reduce;

    fn name(&self) -> &'static str;

    fn delay_curve(&self) -> DelayCurve;

    /// Run the algorithm to completion.
    fn record(&self, input: &Self::Input) -> Trace<EventOf<Self>>;

    fn initial_snapshot(&self, input: &Self::Input) -> Self::Snapshot;

    /// Record a fresh run ready for playback.
    fn start(&self, input: &Self::Input) -> Run<Self::Snapshot> {
        Run::record(self.initial_snapshot(input), || self.record(input))
    }
}

/// A* on a grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStar;

impl Visualizer for AStar {
    type Input = MazeInput;
    type Snapshot = GridSnapshot;

    fn name(&self) -> &'static str {
        "astar"
    }

    fn delay_curve(&self) -> DelayCurve {
        DelayCurve::GRID
    }

    fn record(&self, input: &MazeInput) -> Trace<EventOf<Self>> {
        astar(input)
    }

    fn initial_snapshot(&self, input: &MazeInput) -> GridSnapshot {
        GridSnapshot::new(input)
    }
}

/// BFS or DFS over a node graph.
#[derive(Debug, Clone, Copy)]
pub struct Traversal {
    pub strategy: Strategy,
}

impl Visualizer for Traversal {
    type Input = TraversalInput;
    type Snapshot = TraversalSnapshot;

    fn name(&self) -> &'static str {
        match self.strategy {
            Strategy::Bfs => "bfs",
            Strategy::Dfs => "dfs",
        }
    }

    fn delay_curve(&self) -> DelayCurve {
        DelayCurve::GRAPH
    }

    fn record(&self, input: &TraversalInput) -> Trace<EventOf<Self>> {
        traverse(input, self.strategy)
    }

    fn initial_snapshot(&self, input: &TraversalInput) -> TraversalSnapshot {
        TraversalSnapshot::new(input)
    }
}

/// BFS and DFS on the same graph under one clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct Comparison;

impl Visualizer for Comparison {
    type Input = TraversalInput;
    type Snapshot = ComparisonSnapshot;

    fn name(&self) -> &'static str {
        "compare"
    }

    fn delay_curve(&self) -> DelayCurve {
        DelayCurve::GRAPH
    }

    fn record(&self, input: &TraversalInput) -> Trace<EventOf<Self>> {
        compare(input)
    }

    fn initial_snapshot(&self, input: &TraversalInput) -> ComparisonSnapshot {
        ComparisonSnapshot::new(
            [Strategy::Bfs, Strategy::Dfs]
                .map(|strategy| (Traversal { strategy }.name(), TraversalSnapshot::new(input))),
        )
    }
}

/// Prim or Kruskal on a weighted graph.
#[derive(Debug, Clone, Copy)]
pub struct Mst {
    pub algorithm: MstAlgorithm,
}

impl Visualizer for Mst {
    type Input = MstInput;
    type Snapshot = MstSnapshot;

    fn name(&self) -> &'static str {
        self.algorithm.name()
    }

    fn delay_curve(&self) -> DelayCurve {
        DelayCurve::MST
    }

    fn record(&self, input: &MstInput) -> Trace<EventOf<Self>> {
        self.algorithm.run(input)
    }

    fn initial_snapshot(&self, input: &MstInput) -> MstSnapshot {
        MstSnapshot::new(input, self.algorithm)
    }
}

/// A single sorting algorithm.
#[derive(Debug, Clone, Copy)]
pub struct Sorting {
    pub algorithm: SortAlgorithm,
}

impl Visualizer for Sorting {
    type Input = SortInput;
    type Snapshot = ArraySnapshot;

    fn name(&self) -> &'static str {
        self.algorithm.name()
    }

    fn delay_curve(&self) -> DelayCurve {
        DelayCurve::SORTING
    }

    fn record(&self, input: &SortInput) -> Trace<EventOf<Self>> {
        sort(self.algorithm, input)
    }

    fn initial_snapshot(&self, input: &SortInput) -> ArraySnapshot {
        ArraySnapshot::new(input)
    }
}

/// Every sorting algorithm on the same array, one lane each.
#[derive(Debug, Clone, Copy, Default)]
pub struct Race;

impl Visualizer for Race {
    type Input = SortInput;
    type Snapshot = RaceSnapshot;

    fn name(&self) -> &'static str {
        "race"
    }

    fn delay_curve(&self) -> DelayCurve {
        DelayCurve::SORTING
    }

    fn record(&self, input: &SortInput) -> Trace<EventOf<Self>> {
        race(input)
    }

    fn initial_snapshot(&self, input: &SortInput) -> RaceSnapshot {
        RaceSnapshot::new(
            SortAlgorithm::ALL.map(|algorithm| (algorithm.name(), ArraySnapshot::new(input))),
        )
    }
}

/// Backtracking Sudoku.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sudoku;

impl Visualizer for Sudoku {
    type Input = SudokuInput;
    type Snapshot = SudokuSnapshot;

    fn name(&self) -> &'static str {
        "sudoku"
    }

    fn delay_curve(&self) -> DelayCurve {
        DelayCurve::SUDOKU
    }

    fn record(&self, input: &SudokuInput) -> Trace<EventOf<Self>> {
        solve(input)
    }

    fn initial_snapshot(&self, input: &SudokuInput) -> SudokuSnapshot {
        SudokuSnapshot::new(input)
    }
}

/// A visualizer with its scheduler, driven by one toggle button.
#[derive(Debug)]
pub struct Session<V: Visualizer> {
    visualizer: V,
    scheduler: Scheduler<V::Snapshot>,
}

impl<V: Visualizer> Session<V> {
    pub fn new(visualizer: V, speed: Speed) -> Self {
        let curve = visualizer.delay_curve();
        Self {
            visualizer,
            scheduler: Scheduler::new(speed, curve),
        }
    }

    pub fn visualizer(&self) -> &V {
        &self.visualizer
    }

    pub fn scheduler(&self) -> &Scheduler<V::Snapshot> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<V::Snapshot> {
        &mut self.scheduler
    }

    /// Start a fresh run when idle or finished, pause while playing, resume
    /// while paused.
    pub fn toggle(&mut self, input: &V::Input, now: Instant) -> Result<PlaybackState, PlaybackError> {
        match self.scheduler.state() {
            PlaybackState::Idle | PlaybackState::Finished => {
                self.scheduler.load(self.visualizer.start(input))?;
                self.scheduler.play(now)
            }
            PlaybackState::Ready | PlaybackState::Paused => self.scheduler.play(now),
            PlaybackState::Playing => self.scheduler.pause(),
        }
    }
}
