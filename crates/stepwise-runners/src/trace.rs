//! Append-only event traces.
//!
//! A runner appends events to a [`TraceRecorder`] while the algorithm
//! executes and seals it with exactly one terminal event. The sealed
//! [`Trace`] is immutable and cheap to clone, so a scheduler can replay it
//! any number of times without re-running the algorithm.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// An event that can appear in a trace.
pub trait TraceEvent: Clone + fmt::Debug {
    /// Whether this event ends the trace.
    fn is_terminal(&self) -> bool;

    /// Short kind name, used for logging and diagnostics.
    fn kind(&self) -> &'static str;
}

/// Reasons an externally supplied event list is not a valid trace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// A trace holds at least its terminal event.
    #[error("trace is empty")]
    Empty,

    /// The last event is not terminal.
    #[error("trace ends with non-terminal event `{last_kind}`")]
    MissingTerminal { last_kind: &'static str },

    /// A terminal event appears before the end.
    #[error("event `{kind}` at index {index} follows the terminal event")]
    EventAfterTerminal { index: usize, kind: &'static str },
}

/// An immutable, ordered event trace ending in exactly one terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace<E> {
    events: Arc<[E]>,
}

impl<E: TraceEvent> Trace<E> {
    /// Validate and wrap a list of events.
    pub fn from_events(events: Vec<E>) -> Result<Self, TraceError> {
        let last = events.last().ok_or(TraceError::Empty)?;
        if let Some(pos) = events.iter().position(TraceEvent::is_terminal) {
            if pos + 1 < events.len() {
                return Err(TraceError::EventAfterTerminal {
                    index: pos + 1,
                    kind: events[pos + 1].kind(),
                });
            }
        } else {
            return Err(TraceError::MissingTerminal {
                last_kind: last.kind(),
            });
        }
        Ok(Self {
            events: events.into(),
        })
    }

    /// The terminal event.
    pub fn terminal(&self) -> &E {
        // Construction guarantees at least one event.
        &self.events[self.events.len() - 1]
    }
}

impl<E> Trace<E> {
    /// Number of events, including the terminal one.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always false for a sealed trace.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in order.
    pub fn events(&self) -> &[E] {
        &self.events
    }

    /// Event at `index`.
    pub fn get(&self, index: usize) -> Option<&E> {
        self.events.get(index)
    }

    /// Iterate over the events.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.events.iter()
    }

    /// Count events matching a predicate.
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&E) -> bool,
    {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

impl<E> Index<usize> for Trace<E> {
    type Output = E;

    fn index(&self, index: usize) -> &E {
        &self.events[index]
    }
}

impl<'a, E> IntoIterator for &'a Trace<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl<E: Serialize> Serialize for Trace<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.events.as_ref().serialize(serializer)
    }
}

impl<'de, E> Deserialize<'de> for Trace<E>
where
    E: TraceEvent + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let events = Vec::<E>::deserialize(deserializer)?;
        Trace::from_events(events).map_err(serde::de::Error::custom)
    }
}

/// Builder a runner appends to while the algorithm executes.
#[derive(Debug)]
pub struct TraceRecorder<E> {
    events: Vec<E>,
}

impl<E: TraceEvent> TraceRecorder<E> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append a non-terminal event.
    ///
    /// # Panics
    ///
    /// Panics if `event` is terminal; use [`finish`](Self::finish) instead.
    pub fn push(&mut self, event: E) {
        assert!(
            !event.is_terminal(),
            "terminal event `{}` pushed before finish",
            event.kind()
        );
        self.events.push(event);
    }

    /// Number of events recorded so far.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Seal the trace with its terminal event.
    ///
    /// # Panics
    ///
    /// Panics if `terminal` is not a terminal event.
    pub fn finish(mut self, terminal: E) -> Trace<E> {
        assert!(
            terminal.is_terminal(),
            "finish called with non-terminal event `{}`",
            terminal.kind()
        );
        self.events.push(terminal);
        Trace {
            events: self.events.into(),
        }
    }
}

impl<E: TraceEvent> Default for TraceRecorder<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    enum Tick {
        Step(u32),
        Done,
    }

    impl TraceEvent for Tick {
        fn is_terminal(&self) -> bool {
            matches!(self, Tick::Done)
        }

        fn kind(&self) -> &'static str {
            match self {
                Tick::Step(_) => "step",
                Tick::Done => "done",
            }
        }
    }

    #[test]
    fn recorder_seals_with_terminal() {
        let mut recorder = TraceRecorder::new();
        recorder.push(Tick::Step(1));
        recorder.push(Tick::Step(2));
        let trace = recorder.finish(Tick::Done);

        assert_eq!(trace.len(), 3);
        assert_eq!(trace.terminal(), &Tick::Done);
        assert_eq!(trace.count(|e| matches!(e, Tick::Step(_))), 2);
    }

    #[test]
    #[should_panic(expected = "pushed before finish")]
    fn recorder_rejects_early_terminal() {
        let mut recorder = TraceRecorder::new();
        recorder.push(Tick::Done);
    }

    #[test]
    #[should_panic(expected = "non-terminal")]
    fn finish_requires_terminal() {
        TraceRecorder::new().finish(Tick::Step(0));
    }

    #[test]
    fn from_events_validates() {
        assert_eq!(Trace::<Tick>::from_events(vec![]), Err(TraceError::Empty));
        assert_eq!(
            Trace::from_events(vec![Tick::Step(1)]),
            Err(TraceError::MissingTerminal { last_kind: "step" })
        );
        assert_eq!(
            Trace::from_events(vec![Tick::Done, Tick::Step(1), Tick::Done]),
            Err(TraceError::EventAfterTerminal {
                index: 1,
                kind: "step"
            })
        );
        assert!(Trace::from_events(vec![Tick::Step(1), Tick::Done]).is_ok());
    }

    #[test]
    fn deserialize_rejects_invalid_trace() {
        let json = serde_json::to_string(&vec![Tick::Step(1)]).unwrap();
        assert!(serde_json::from_str::<Trace<Tick>>(&json).is_err());

        let trace = Trace::from_events(vec![Tick::Step(4), Tick::Done]).unwrap();
        let json = serde_json::to_string(&trace).unwrap();
        let parsed: Trace<Tick> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, trace);
    }

    #[test]
    fn clones_share_storage() {
        let trace = TraceRecorder::new().finish(Tick::Done);
        let copy = trace.clone();
        assert!(Arc::ptr_eq(&trace.events, &copy.events));
    }
}
