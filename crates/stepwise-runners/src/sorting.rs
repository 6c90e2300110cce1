//! Comparison sorts that record every compare and write.
//!
//! Indices in events always refer to the array as it stands when the event
//! is applied, so replaying the events in order reproduces the sort.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lockstep::{lockstep, Lockstep};
use crate::{InputError, Trace, TraceEvent, TraceRecorder};

/// The array to sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSortInput")]
pub struct SortInput {
    values: Vec<u32>,
}

#[derive(Deserialize)]
struct RawSortInput {
    values: Vec<u32>,
}

impl TryFrom<RawSortInput> for SortInput {
    type Error = InputError;

    fn try_from(raw: RawSortInput) -> Result<Self, Self::Error> {
        Self::new(raw.values)
    }
}

impl SortInput {
    pub fn new(values: Vec<u32>) -> Result<Self, InputError> {
        if values.is_empty() {
            return Err(InputError::EmptyArray);
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }
}

/// Parameters for a random array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomArrayConfig {
    pub size: usize,
    pub min: u32,
    pub max: u32,
    pub seed: u64,
}

impl Default for RandomArrayConfig {
    fn default() -> Self {
        Self {
            size: 20,
            min: 5,
            max: 100,
            seed: 0,
        }
    }
}

impl RandomArrayConfig {
    pub fn generate(&self) -> Result<SortInput, InputError> {
        if self.min > self.max {
            return Err(InputError::InvalidValueRange {
                min: self.min,
                max: self.max,
            });
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let values = (0..self.size)
            .map(|_| rng.gen_range(self.min..=self.max))
            .collect();
        SortInput::new(values)
    }
}

/// The four racing algorithms, in leaderboard tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAlgorithm {
    Bubble,
    Insertion,
    Merge,
    Quick,
}

impl SortAlgorithm {
    pub const ALL: [Self; 4] = [Self::Bubble, Self::Insertion, Self::Merge, Self::Quick];

    pub fn name(self) -> &'static str {
        match self {
            Self::Bubble => "bubble",
            Self::Insertion => "insertion",
            Self::Merge => "merge",
            Self::Quick => "quick",
        }
    }
}

impl std::str::FromStr for SortAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| format!("unknown sort algorithm: {}", s))
    }
}

/// One sorting decision point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SortEvent {
    Compare { i: usize, j: usize },
    Swap { i: usize, j: usize },
    Overwrite { index: usize, value: u32 },
    Finished,
}

impl TraceEvent for SortEvent {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Compare { .. } => "compare",
            Self::Swap { .. } => "swap",
            Self::Overwrite { .. } => "overwrite",
            Self::Finished => "finished",
        }
    }
}

/// Sort a copy of the input with the chosen algorithm.
pub fn sort(algorithm: SortAlgorithm, input: &SortInput) -> Trace<SortEvent> {
    let mut values = input.values.clone();
    let mut recorder = TraceRecorder::new();
    match algorithm {
        SortAlgorithm::Bubble => bubble(&mut values, &mut recorder),
        SortAlgorithm::Insertion => insertion(&mut values, &mut recorder),
        SortAlgorithm::Merge => {
            let last = values.len() - 1;
            merge_sort(&mut values, 0, last, &mut recorder);
        }
        SortAlgorithm::Quick => {
            let last = values.len() - 1;
            quick_sort(&mut values, 0, last, &mut recorder);
        }
    }
    debug_assert!(values.windows(2).all(|w| w[0] <= w[1]));
    debug!(algorithm = algorithm.name(), events = recorder.len() + 1, "sort finished");
    recorder.finish(SortEvent::Finished)
}

fn bubble(values: &mut [u32], rec: &mut TraceRecorder<SortEvent>) {
    let n = values.len();
    for i in 0..n {
        for j in 0..n - i - 1 {
            rec.push(SortEvent::Compare { i: j, j: j + 1 });
            if values[j] > values[j + 1] {
                values.swap(j, j + 1);
                rec.push(SortEvent::Swap { i: j, j: j + 1 });
            }
        }
    }
}

fn insertion(values: &mut [u32], rec: &mut TraceRecorder<SortEvent>) {
    for i in 1..values.len() {
        let mut j = i;
        while j > 0 {
            rec.push(SortEvent::Compare { i: j - 1, j });
            if values[j - 1] <= values[j] {
                break;
            }
            values.swap(j - 1, j);
            rec.push(SortEvent::Swap { i: j - 1, j });
            j -= 1;
        }
    }
}

fn merge_sort(values: &mut [u32], start: usize, end: usize, rec: &mut TraceRecorder<SortEvent>) {
    if start >= end {
        return;
    }
    let mid = start + (end - start) / 2;
    merge_sort(values, start, mid, rec);
    merge_sort(values, mid + 1, end, rec);

    let left = values[start..=mid].to_vec();
    let right = values[mid + 1..=end].to_vec();
    let (mut i, mut j) = (0, 0);
    let mut merged = Vec::with_capacity(end - start + 1);

    while i < left.len() && j < right.len() {
        rec.push(SortEvent::Compare {
            i: start + i,
            j: mid + 1 + j,
        });
        if left[i] <= right[j] {
            merged.push(left[i]);
            i += 1;
        } else {
            merged.push(right[j]);
            j += 1;
        }
        overwrite(values, start + merged.len() - 1, merged[merged.len() - 1], rec);
    }
    for &value in left[i..].iter().chain(&right[j..]) {
        merged.push(value);
        overwrite(values, start + merged.len() - 1, value, rec);
    }
}

fn overwrite(values: &mut [u32], index: usize, value: u32, rec: &mut TraceRecorder<SortEvent>) {
    values[index] = value;
    rec.push(SortEvent::Overwrite { index, value });
}

fn quick_sort(values: &mut [u32], low: usize, high: usize, rec: &mut TraceRecorder<SortEvent>) {
    if low >= high {
        return;
    }
    let pivot = partition(values, low, high, rec);
    if pivot > low {
        quick_sort(values, low, pivot - 1, rec);
    }
    quick_sort(values, pivot + 1, high, rec);
}

fn partition(values: &mut [u32], low: usize, high: usize, rec: &mut TraceRecorder<SortEvent>) -> usize {
    let pivot = values[high];
    let mut store = low;
    for j in low..high {
        rec.push(SortEvent::Compare { i: j, j: high });
        if values[j] <= pivot {
            exchange(values, store, j, rec);
            store += 1;
        }
    }
    exchange(values, store, high, rec);
    store
}

fn exchange(values: &mut [u32], a: usize, b: usize, rec: &mut TraceRecorder<SortEvent>) {
    if a == b {
        return;
    }
    values.swap(a, b);
    rec.push(SortEvent::Overwrite {
        index: a,
        value: values[a],
    });
    rec.push(SortEvent::Overwrite {
        index: b,
        value: values[b],
    });
}

/// Operation counts for one sort trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortCounters {
    pub comparisons: usize,
    pub swaps: usize,
    pub writes: usize,
}

impl SortCounters {
    pub fn from_trace(trace: &Trace<SortEvent>) -> Self {
        let mut counters = Self::default();
        for event in trace {
            match event {
                SortEvent::Compare { .. } => counters.comparisons += 1,
                SortEvent::Swap { .. } => counters.swaps += 1,
                SortEvent::Overwrite { .. } => counters.writes += 1,
                SortEvent::Finished => {}
            }
        }
        counters
    }
}

/// All four algorithms side by side, one lane each in [`SortAlgorithm::ALL`]
/// order.
pub fn race(input: &SortInput) -> Trace<Lockstep<SortEvent>> {
    let traces: Vec<_> = SortAlgorithm::ALL
        .into_iter()
        .map(|algorithm| sort(algorithm, input))
        .collect();
    lockstep(&traces)
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResult {
    pub rank: usize,
    pub algorithm: SortAlgorithm,
    /// Playback steps to finish, i.e. the trace length.
    pub steps: usize,
    pub counters: SortCounters,
}

/// Race all four algorithms on the same input, fastest first.
pub fn leaderboard(input: &SortInput) -> Vec<RaceResult> {
    let mut results: Vec<RaceResult> = SortAlgorithm::ALL
        .into_iter()
        .map(|algorithm| {
            let trace = sort(algorithm, input);
            RaceResult {
                rank: 0,
                algorithm,
                steps: trace.len(),
                counters: SortCounters::from_trace(&trace),
            }
        })
        .collect();
    results.sort_by_key(|r| r.steps);
    for (i, result) in results.iter_mut().enumerate() {
        result.rank = i + 1;
    }
    results
}
