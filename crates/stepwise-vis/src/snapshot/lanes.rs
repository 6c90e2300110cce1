//! Side-by-side snapshots driven by one lockstep trace.

use serde::{Deserialize, Serialize};
use stepwise_runners::Lockstep;

use super::{ArraySnapshot, Reduce, TraversalSnapshot};

/// BFS in lane 0, DFS in lane 1.
pub type ComparisonSnapshot = LanesSnapshot<TraversalSnapshot>;

/// One lane per sorting algorithm.
pub type RaceSnapshot = LanesSnapshot<ArraySnapshot>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane<S> {
    pub name: String,
    pub snapshot: S,
    /// Steps this lane took, set on its terminal event.
    pub finished_at: Option<usize>,
}

/// Every lane's own snapshot plus the order they finished in.
///
/// A finished lane keeps its last snapshot while the others play on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanesSnapshot<S> {
    pub lanes: Vec<Lane<S>>,
    /// Ticks applied so far.
    pub tick: usize,
    /// Lane indices, earliest finisher first. Lanes ending on the same tick
    /// keep lane order.
    pub finish_order: Vec<usize>,
}

impl<S: Reduce> LanesSnapshot<S> {
    pub fn new<N: Into<String>>(lanes: impl IntoIterator<Item = (N, S)>) -> Self {
        Self {
            lanes: lanes
                .into_iter()
                .map(|(name, snapshot)| Lane {
                    name: name.into(),
                    snapshot,
                    finished_at: None,
                })
                .collect(),
            tick: 0,
            finish_order: Vec::new(),
        }
    }

    pub fn winner(&self) -> Option<&Lane<S>> {
        self.finish_order.first().map(|&k| &self.lanes[k])
    }

    pub fn is_finished(&self) -> bool {
        self.finish_order.len() == self.lanes.len()
    }
}

impl<S: Reduce> Reduce for LanesSnapshot<S> {
    type Event = Lockstep<S::Event>;

    fn apply(&self, tick: &Lockstep<S::Event>) -> Self {
        assert_eq!(
            tick.lanes.len(),
            self.lanes.len(),
            "tick for {} lanes applied to {} lanes",
            tick.lanes.len(),
            self.lanes.len()
        );
        let mut next = self.clone();
        for (lane, event) in next.lanes.iter_mut().zip(&tick.lanes) {
            if let Some(event) = event {
                lane.snapshot = lane.snapshot.apply(event);
            }
        }
        next.tick += 1;
        for k in tick.finishing() {
            next.lanes[k].finished_at = Some(next.tick);
            next.finish_order.push(k);
        }
        next
    }
}
