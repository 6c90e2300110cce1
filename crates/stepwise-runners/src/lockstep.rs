//! Several traces played side by side under one clock.
//!
//! Tick `i` carries event `i` of every lane. A lane that has already ended
//! contributes nothing, so shorter traces freeze on their terminal event
//! while the longer ones keep going. The merged trace ends on the tick that
//! holds the terminal event of the longest lane.

use serde::{Deserialize, Serialize};

use crate::{Trace, TraceEvent, TraceRecorder};

/// One tick of a lockstep trace. `lanes[k]` is `None` once lane `k` ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lockstep<E> {
    pub lanes: Vec<Option<E>>,
}

impl<E: TraceEvent> Lockstep<E> {
    /// Lanes whose terminal event lands on this tick.
    pub fn finishing(&self) -> impl Iterator<Item = usize> + '_ {
        self.lanes
            .iter()
            .enumerate()
            .filter(|(_, e)| e.as_ref().is_some_and(TraceEvent::is_terminal))
            .map(|(lane, _)| lane)
    }
}

impl<E: TraceEvent> TraceEvent for Lockstep<E> {
    /// Terminal once every lane still running ends here.
    fn is_terminal(&self) -> bool {
        let mut live = self.lanes.iter().flatten().peekable();
        live.peek().is_some() && live.all(TraceEvent::is_terminal)
    }

    fn kind(&self) -> &'static str {
        if self.is_terminal() {
            "lockstep_end"
        } else {
            "lockstep_tick"
        }
    }
}

/// Merge traces index by index.
///
/// # Panics
///
/// Panics if `traces` is empty.
pub fn lockstep<E: TraceEvent>(traces: &[Trace<E>]) -> Trace<Lockstep<E>> {
    let ticks = traces
        .iter()
        .map(Trace::len)
        .max()
        .unwrap_or_else(|| panic!("lockstep needs at least one lane"));
    let tick = |i: usize| Lockstep {
        lanes: traces.iter().map(|t| t.get(i).cloned()).collect(),
    };

    let mut recorder = TraceRecorder::new();
    for i in 0..ticks - 1 {
        recorder.push(tick(i));
    }
    recorder.finish(tick(ticks - 1))
}
