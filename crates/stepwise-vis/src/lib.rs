//! Stepwise Algorithm Visualization
//!
//! Replays recorded algorithm runs with playback controls.
//!
//! # Architecture
//!
//! - **Snapshot**: Folds trace events into the state a viewer sees
//! - **Run**: A trace plus a replay cursor, seekable to any frame
//! - **Playback**: Play, pause, step and seek with speed-derived delays
//! - **Player**: Drives one scheduler from a tokio task
//! - **Server**: REST controls and a WebSocket frame stream
//!
//! # Usage
//!
//! ```ignore
//! let input = SortInput::new(vec![5, 3, 8, 1])?;
//! let server = VisServer::new(Sorting { algorithm: SortAlgorithm::Bubble }, input, &config);
//! server.serve(3000).await;
//! ```

mod config;
mod playback;
mod player;
mod run;
mod server;
mod sink;
pub mod snapshot;
mod visualizer;

pub use config::{ConfigError, PlaybackConfig, DEFAULT_PORT};
pub use playback::{
    DelayCurve, PlaybackError, PlaybackState, PlaybackStatus, Scheduler, Speed,
};
pub use player::{spawn as spawn_player, PlayerHandle};
pub use run::Run;
pub use server::VisServer;
pub use sink::{BroadcastSink, Frame, RecordingSink, SnapshotSink, StreamMessage};
pub use snapshot::Reduce;
pub use visualizer::{
    AStar, Comparison, EventOf, Mst, Race, Session, Sorting, Sudoku, Traversal, Visualizer,
};
