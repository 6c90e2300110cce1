//! Bar-chart snapshot for the sorting race.

use serde::{Deserialize, Serialize};
use stepwise_runners::sorting::SortCounters;
use stepwise_runners::{SortEvent, SortInput};

use super::Reduce;

/// The array mid-sort, with the bars touched by the last event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArraySnapshot {
    pub values: Vec<u32>,
    /// Pair under comparison.
    pub compared: Option<(usize, usize)>,
    /// Indices written by the last swap or overwrite.
    pub moved: Vec<usize>,
    pub counters: SortCounters,
    pub sorted: bool,
}

impl ArraySnapshot {
    pub fn new(input: &SortInput) -> Self {
        Self {
            values: input.values().to_vec(),
            compared: None,
            moved: Vec::new(),
            counters: SortCounters::default(),
            sorted: false,
        }
    }

    fn check(&self, index: usize) {
        assert!(
            index < self.values.len(),
            "index {} outside array of length {}",
            index,
            self.values.len()
        );
    }
}

impl Reduce for ArraySnapshot {
    type Event = SortEvent;

    fn apply(&self, event: &SortEvent) -> Self {
        let mut next = self.clone();
        match *event {
            SortEvent::Compare { i, j } => {
                next.check(i);
                next.check(j);
                next.compared = Some((i, j));
                next.moved.clear();
                next.counters.comparisons += 1;
            }
            SortEvent::Swap { i, j } => {
                next.check(i);
                next.check(j);
                next.values.swap(i, j);
                next.compared = None;
                next.moved = vec![i, j];
                next.counters.swaps += 1;
            }
            SortEvent::Overwrite { index, value } => {
                next.check(index);
                next.values[index] = value;
                next.compared = None;
                next.moved = vec![index];
                next.counters.writes += 1;
            }
            SortEvent::Finished => {
                next.compared = None;
                next.moved.clear();
                next.sorted = true;
            }
        }
        next
    }
}
