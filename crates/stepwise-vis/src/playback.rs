//! Playback scheduler for recorded runs.
//!
//! The scheduler never sleeps. It tracks at most one pending step (a token
//! plus a deadline) and applies it only when [`Scheduler::fire`] is called
//! with a matching token while playing. Anything that stops playback
//! forgets the pending step, so a timer that fires late is simply ignored.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stepwise_runners::TraceEvent;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use crate::run::Run;
use crate::sink::{Frame, SnapshotSink};
use crate::snapshot::Reduce;

/// Playback speed on a 1-100 slider. Out-of-range values are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Speed(u8);

impl Speed {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(100);

    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::MIN.0, Self::MAX.0))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self(50)
    }
}

impl From<u8> for Speed {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Speed> for u8 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

/// Maps a speed to the delay between steps.
///
/// `delay = max(min_ms, base_ms - speed * per_speed_ms)`, so faster speeds
/// never wait longer and nothing waits less than `min_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelayCurve {
    pub base_ms: u64,
    pub per_speed_ms: u64,
    pub min_ms: u64,
}

impl DelayCurve {
    /// A* grid search.
    pub const GRID: Self = Self::new(1000, 9, 50);
    /// BFS/DFS graph traversal.
    pub const GRAPH: Self = Self::new(1000, 9, 50);
    /// Prim/Kruskal.
    pub const MST: Self = Self::new(1000, 9, 100);
    pub const SORTING: Self = Self::new(300, 3, 5);
    pub const SUDOKU: Self = Self::new(1000, 10, 10);

    pub const fn new(base_ms: u64, per_speed_ms: u64, min_ms: u64) -> Self {
        Self {
            base_ms,
            per_speed_ms,
            min_ms,
        }
    }

    pub fn delay(&self, speed: Speed) -> Duration {
        let scaled = self
            .base_ms
            .saturating_sub(self.per_speed_ms.saturating_mul(u64::from(speed.get())));
        Duration::from_millis(scaled.max(self.min_ms))
    }
}

/// Where playback stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// No run loaded.
    Idle,
    /// Run loaded, nothing applied yet.
    Ready,
    Playing,
    Paused,
    /// Every event applied.
    Finished,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// A playback request that was refused. Refused requests change nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("cannot {op} while {state}")]
    InvalidTransition { op: &'static str, state: PlaybackState },

    #[error("no run is loaded")]
    NoRun,

    #[error("player task has stopped")]
    PlayerClosed,
}

/// Playback status for clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    /// Events applied so far.
    pub frame: usize,
    pub total: usize,
    pub state: PlaybackState,
    pub speed: Speed,
    /// `frame / total`, 0.0 without a run.
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    token: u64,
    deadline: Instant,
}

/// Drives one run through the playback state machine.
#[derive(Debug)]
pub struct Scheduler<S: Reduce> {
    run: Option<Run<S>>,
    state: PlaybackState,
    speed: Speed,
    curve: DelayCurve,
    generation: u64,
    pending: Option<Pending>,
}

impl<S: Reduce> Scheduler<S> {
    pub fn new(speed: Speed, curve: DelayCurve) -> Self {
        Self {
            run: None,
            state: PlaybackState::Idle,
            speed,
            curve,
            generation: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn curve(&self) -> DelayCurve {
        self.curve
    }

    pub fn run(&self) -> Option<&Run<S>> {
        self.run.as_ref()
    }

    /// The snapshot at the cursor, if a run is loaded.
    pub fn snapshot(&self) -> Option<&S> {
        self.run.as_ref().map(Run::current)
    }

    /// Token and deadline of the step waiting to fire.
    pub fn pending(&self) -> Option<(u64, Instant)> {
        self.pending.map(|p| (p.token, p.deadline))
    }

    /// Install a fresh run, rewound to its start.
    pub fn load(&mut self, mut run: Run<S>) -> Result<PlaybackState, PlaybackError> {
        self.require("load", &[PlaybackState::Idle, PlaybackState::Finished])?;
        run.seek(0);
        debug!(events = run.len(), "run loaded");
        self.run = Some(run);
        self.cancel();
        Ok(self.transition("load", PlaybackState::Ready))
    }

    /// Start or resume. The first step is due at `now`.
    pub fn play(&mut self, now: Instant) -> Result<PlaybackState, PlaybackError> {
        if self.state == PlaybackState::Idle {
            return Err(PlaybackError::NoRun);
        }
        self.require("play", &[PlaybackState::Ready, PlaybackState::Paused])?;
        self.schedule(now);
        Ok(self.transition("play", PlaybackState::Playing))
    }

    pub fn pause(&mut self) -> Result<PlaybackState, PlaybackError> {
        self.require("pause", &[PlaybackState::Playing])?;
        self.cancel();
        Ok(self.transition("pause", PlaybackState::Paused))
    }

    /// Drop the run from any state. A pending step never applies.
    pub fn reset(&mut self) -> Result<PlaybackState, PlaybackError> {
        self.cancel();
        self.run = None;
        Ok(self.transition("reset", PlaybackState::Idle))
    }

    /// Change speed. While playing this is a pause followed by a play at
    /// `now`, so the new delay applies from the next step on.
    pub fn set_speed(&mut self, speed: Speed, now: Instant) -> Result<PlaybackState, PlaybackError> {
        self.speed = speed;
        debug!(speed = speed.get(), "speed changed");
        if self.state == PlaybackState::Playing {
            self.pause()?;
            return self.play(now);
        }
        Ok(self.state)
    }

    /// Apply the pending step if `token` still names it.
    ///
    /// Returns whether an event was applied.
    pub fn fire<K>(&mut self, token: u64, now: Instant, sink: &mut K) -> bool
    where
        K: SnapshotSink<S> + ?Sized,
    {
        match self.pending {
            Some(pending) if pending.token == token && self.state == PlaybackState::Playing => {}
            _ => {
                debug!(token, state = %self.state, "stale step ignored");
                return false;
            }
        }
        self.pending = None;

        if self.apply_next(sink) {
            self.finish(sink);
        } else {
            let delay = self.curve.delay(self.speed);
            self.schedule(now + delay);
        }
        true
    }

    /// Apply one event by hand.
    pub fn step_forward<K>(&mut self, sink: &mut K) -> Result<PlaybackState, PlaybackError>
    where
        K: SnapshotSink<S> + ?Sized,
    {
        self.require_scrubbable("step_forward")?;
        if self.apply_next(sink) {
            self.finish(sink);
            return Ok(self.state);
        }
        Ok(self.transition("step_forward", PlaybackState::Paused))
    }

    /// Undo one event by refolding from the start.
    pub fn step_backward<K>(&mut self, sink: &mut K) -> Result<PlaybackState, PlaybackError>
    where
        K: SnapshotSink<S> + ?Sized,
    {
        self.require_scrubbable("step_backward")?;
        let cursor = self.run.as_ref().map_or(0, Run::cursor);
        if cursor == 0 {
            return Ok(self.state);
        }
        self.seek(cursor - 1, sink)
    }

    /// Jump to `frame`, clamped to the trace length.
    pub fn seek<K>(&mut self, frame: usize, sink: &mut K) -> Result<PlaybackState, PlaybackError>
    where
        K: SnapshotSink<S> + ?Sized,
    {
        self.require_scrubbable("seek")?;
        let Some(run) = self.run.as_mut() else {
            return Err(PlaybackError::NoRun);
        };
        let frame = run.seek(frame);
        let end = run.len();
        sink.seeked(frame, run.current());

        if frame == end {
            self.finish(sink);
            Ok(self.state)
        } else if frame == 0 {
            Ok(self.transition("seek", PlaybackState::Ready))
        } else {
            Ok(self.transition("seek", PlaybackState::Paused))
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        let (frame, total) = self
            .run
            .as_ref()
            .map_or((0, 0), |run| (run.cursor(), run.len()));
        PlaybackStatus {
            frame,
            total,
            state: self.state,
            speed: self.speed,
            progress: if total == 0 {
                0.0
            } else {
                frame as f64 / total as f64
            },
        }
    }

    /// Advance the run and publish the frame. Returns true once the run is
    /// over, either on a terminal event or at the end of the trace.
    fn apply_next<K>(&mut self, sink: &mut K) -> bool
    where
        K: SnapshotSink<S> + ?Sized,
    {
        let Some(run) = self.run.as_mut() else {
            return true;
        };
        let index = run.cursor();
        let event = run.advance().clone();
        let done = event.is_terminal() || run.is_finished();
        sink.publish(Frame {
            index,
            event,
            snapshot: run.current().clone(),
        });
        done
    }

    fn finish<K>(&mut self, sink: &mut K)
    where
        K: SnapshotSink<S> + ?Sized,
    {
        self.cancel();
        self.transition("finish", PlaybackState::Finished);
        sink.finished(&self.status());
    }

    fn schedule(&mut self, deadline: Instant) {
        self.generation += 1;
        self.pending = Some(Pending {
            token: self.generation,
            deadline,
        });
    }

    fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    fn require(&self, op: &'static str, allowed: &[PlaybackState]) -> Result<(), PlaybackError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(PlaybackError::InvalidTransition {
                op,
                state: self.state,
            })
        }
    }

    fn require_scrubbable(&self, op: &'static str) -> Result<(), PlaybackError> {
        if self.state == PlaybackState::Idle {
            return Err(PlaybackError::NoRun);
        }
        self.require(op, &[PlaybackState::Ready, PlaybackState::Paused])
    }

    fn transition(&mut self, op: &'static str, to: PlaybackState) -> PlaybackState {
        if self.state != to {
            debug!(op, from = %self.state, to = %to, "playback transition");
        }
        self.state = to;
        to
    }
}
