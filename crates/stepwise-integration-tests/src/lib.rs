//! Shared helpers for the cross-crate tests under `tests/`.

use stepwise_runners::Trace;
use stepwise_vis::{Frame, RecordingSink, Reduce, Run, Scheduler};
use tokio::time::Instant;

/// Every snapshot of a trace, from the initial one to the final one.
pub fn snapshots<S: Reduce>(initial: &S, trace: &Trace<S::Event>) -> Vec<S> {
    let mut out = Vec::with_capacity(trace.len() + 1);
    out.push(initial.clone());
    for event in trace {
        let next = out[out.len() - 1].apply(event);
        out.push(next);
    }
    out
}

/// Fire pending steps until the scheduler stops scheduling, each exactly at
/// its deadline. Returns the number of steps applied.
pub fn drain<S: Reduce>(scheduler: &mut Scheduler<S>, sink: &mut RecordingSink<S>) -> usize {
    let mut applied = 0;
    while let Some((token, deadline)) = scheduler.pending() {
        if scheduler.fire(token, deadline, sink) {
            applied += 1;
        }
    }
    applied
}

/// Fire at most `steps` pending steps.
pub fn fire_n<S: Reduce>(scheduler: &mut Scheduler<S>, sink: &mut RecordingSink<S>, steps: usize) {
    for _ in 0..steps {
        let Some((token, deadline)) = scheduler.pending() else {
            return;
        };
        scheduler.fire(token, deadline, sink);
    }
}

/// Play a run with no interruptions and collect the published snapshots.
pub fn uninterrupted<S: Reduce>(run: Run<S>, scheduler: Scheduler<S>) -> Vec<S> {
    let mut scheduler = scheduler;
    let mut sink = RecordingSink::new();
    scheduler
        .load(run)
        .and_then(|_| scheduler.play(Instant::now()))
        .unwrap_or_else(|e| panic!("fresh scheduler refused run: {}", e));
    drain(&mut scheduler, &mut sink);
    published(&sink)
}

/// Snapshots carried by the published frames, in order.
pub fn published<S: Reduce>(sink: &RecordingSink<S>) -> Vec<S> {
    sink.frames().iter().map(|f: &Frame<S>| f.snapshot.clone()).collect()
}
