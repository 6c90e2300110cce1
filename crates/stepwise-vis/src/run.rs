//! One recorded algorithm run and its replay cursor.

use std::sync::Arc;

use stepwise_runners::{Trace, TraceEvent};
use tracing::debug;

use crate::snapshot::Reduce;

/// A trace, the snapshot it starts from, and how far it has been replayed.
///
/// The current snapshot is always `initial` folded over `trace[..cursor]`.
#[derive(Debug, Clone)]
pub struct Run<S: Reduce> {
    trace: Trace<S::Event>,
    initial: Arc<S>,
    cursor: usize,
    current: S,
}

impl<S: Reduce> Run<S> {
    /// Wrap an already recorded trace.
    pub fn new(initial: S, trace: Trace<S::Event>) -> Self {
        Self {
            trace,
            current: initial.clone(),
            initial: Arc::new(initial),
            cursor: 0,
        }
    }

    /// Run the recorder to completion, then wrap its trace.
    pub fn record<F>(initial: S, recorder: F) -> Self
    where
        F: FnOnce() -> Trace<S::Event>,
    {
        let trace = recorder();
        debug!(
            events = trace.len(),
            terminal = trace.terminal().kind(),
            "run recorded"
        );
        Self::new(initial, trace)
    }

    pub fn trace(&self) -> &Trace<S::Event> {
        &self.trace
    }

    pub fn initial(&self) -> &S {
        &self.initial
    }

    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.trace.len()
    }

    /// Always false: a trace holds at least its terminal event.
    pub fn is_empty(&self) -> bool {
        self.trace.is_empty()
    }

    /// Whether every event has been applied.
    pub fn is_finished(&self) -> bool {
        self.cursor == self.trace.len()
    }

    /// Apply the next event and return it.
    ///
    /// # Panics
    ///
    /// If the run is already finished.
    pub fn advance(&mut self) -> &S::Event {
        assert!(
            self.cursor < self.trace.len(),
            "advance past end of run ({} events)",
            self.trace.len()
        );
        let event = &self.trace[self.cursor];
        self.current = self.current.apply(event);
        self.cursor += 1;
        event
    }

    /// Move the cursor to `frame` (clamped to the trace length) and rebuild
    /// the current snapshot by folding from the start.
    pub fn seek(&mut self, frame: usize) -> usize {
        let frame = frame.min(self.trace.len());
        self.current = self.snapshot_at(frame);
        self.cursor = frame;
        frame
    }

    /// The snapshot after the first `frame` events, without moving the cursor.
    pub fn snapshot_at(&self, frame: usize) -> S {
        let frame = frame.min(self.trace.len());
        self.initial.fold(&self.trace.events()[..frame])
    }
}
