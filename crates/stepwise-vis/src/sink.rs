//! Where replayed frames go.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::warn;

use crate::playback::PlaybackStatus;
use crate::snapshot::Reduce;

/// One applied event and the snapshot it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct Frame<S: Reduce> {
    /// Position of `event` in the trace.
    pub index: usize,
    pub event: S::Event,
    pub snapshot: S,
}

/// Receives playback output.
///
/// Only `publish` is required; the other notifications default to no-ops.
pub trait SnapshotSink<S: Reduce>: Send + 'static {
    /// Called once per applied event, in trace order.
    fn publish(&mut self, frame: Frame<S>);

    /// The cursor jumped (seek or step back) and `snapshot` is now current.
    fn seeked(&mut self, _cursor: usize, _snapshot: &S) {}

    /// The run finished.
    fn finished(&mut self, _status: &PlaybackStatus) {}
}

/// Keeps everything in memory.
#[derive(Debug, Clone)]
pub struct RecordingSink<S: Reduce> {
    frames: Vec<Frame<S>>,
    seeks: Vec<(usize, S)>,
    finished: Vec<PlaybackStatus>,
}

impl<S: Reduce> RecordingSink<S> {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            seeks: Vec::new(),
            finished: Vec::new(),
        }
    }

    pub fn frames(&self) -> &[Frame<S>] {
        &self.frames
    }

    pub fn seeks(&self) -> &[(usize, S)] {
        &self.seeks
    }

    pub fn finished(&self) -> &[PlaybackStatus] {
        &self.finished
    }
}

impl<S: Reduce> Default for RecordingSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Reduce> SnapshotSink<S> for RecordingSink<S> {
    fn publish(&mut self, frame: Frame<S>) {
        self.frames.push(frame);
    }

    fn seeked(&mut self, cursor: usize, snapshot: &S) {
        self.seeks.push((cursor, snapshot.clone()));
    }

    fn finished(&mut self, status: &PlaybackStatus) {
        self.finished.push(status.clone());
    }
}

/// JSON messages pushed to streaming clients.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", bound = "")]
pub enum StreamMessage<'a, S: Reduce> {
    Frame(&'a Frame<S>),
    /// Full snapshot after a jump, or on connect.
    Snapshot { frame: usize, snapshot: &'a S },
    Finished(&'a PlaybackStatus),
}

impl<S: Reduce> StreamMessage<'_, S> {
    pub fn to_json(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("failed to encode stream message: {}", e);
                None
            }
        }
    }
}

/// Fans frames out to every subscribed client as JSON text.
///
/// Sending with no subscribers is not an error; frames are just dropped.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<String>,
}

impl BroadcastSink {
    pub fn new(tx: broadcast::Sender<String>) -> Self {
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    fn send<S: Reduce>(&self, message: StreamMessage<'_, S>) {
        if let Some(json) = message.to_json() {
            let _ = self.tx.send(json);
        }
    }
}

impl<S: Reduce> SnapshotSink<S> for BroadcastSink {
    fn publish(&mut self, frame: Frame<S>) {
        self.send(StreamMessage::Frame(&frame));
    }

    fn seeked(&mut self, cursor: usize, snapshot: &S) {
        self.send(StreamMessage::Snapshot {
            frame: cursor,
            snapshot,
        });
    }

    fn finished(&mut self, status: &PlaybackStatus) {
        self.send::<S>(StreamMessage::Finished(status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ArraySnapshot;
    use stepwise_runners::{SortEvent, SortInput};

    fn frame() -> Frame<ArraySnapshot> {
        let input = SortInput::new(vec![2, 1]).unwrap();
        Frame {
            index: 0,
            event: SortEvent::Compare { i: 0, j: 1 },
            snapshot: ArraySnapshot::new(&input),
        }
    }

    #[test]
    fn frame_message_is_tagged() {
        let frame = frame();
        let json = StreamMessage::Frame(&frame).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["type"], "frame");
        assert_eq!(value["index"], 0);
        assert_eq!(value["event"]["type"], "compare");
        assert_eq!(value["snapshot"]["values"], serde_json::json!([2, 1]));
    }

    #[tokio::test]
    async fn broadcast_reaches_subscribers() {
        let (tx, _) = broadcast::channel(16);
        let mut sink = BroadcastSink::new(tx);
        let mut rx = sink.subscribe();

        SnapshotSink::<ArraySnapshot>::publish(&mut sink, frame());
        let json = rx.recv().await.unwrap();
        assert!(json.contains("\"type\":\"frame\""));
    }

    #[test]
    fn broadcast_without_subscribers_is_fine() {
        let (tx, rx) = broadcast::channel(4);
        drop(rx);
        let mut sink = BroadcastSink::new(tx);
        SnapshotSink::<ArraySnapshot>::publish(&mut sink, frame());
    }
}
