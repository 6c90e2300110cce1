//! Axum web server with WebSocket streaming for visualization.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::config::PlaybackConfig;
use crate::playback::{PlaybackError, PlaybackState, PlaybackStatus, Scheduler, Speed};
use crate::player::{self, PlayerHandle};
use crate::sink::{BroadcastSink, StreamMessage};
use crate::visualizer::Visualizer;

/// Frames buffered per streaming client before it starts lagging.
const STREAM_BUFFER: usize = 1024;

/// Shared application state.
pub struct AppState<V: Visualizer> {
    visualizer: V,
    input: V::Input,
    player: PlayerHandle<V::Snapshot>,
    stream: broadcast::Sender<String>,
}

/// Visualization server for one visualizer and one input.
pub struct VisServer<V: Visualizer> {
    state: Arc<AppState<V>>,
}

impl<V: Visualizer> VisServer<V> {
    /// Spawn the player task and build the shared state.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(visualizer: V, input: V::Input, config: &PlaybackConfig) -> Self {
        let (stream, _) = broadcast::channel(STREAM_BUFFER);
        let scheduler = Scheduler::new(config.speed, config.curve_or(visualizer.delay_curve()));
        let (player, _task) = player::spawn(scheduler, BroadcastSink::new(stream.clone()));
        Self {
            state: Arc::new(AppState {
                visualizer,
                input,
                player,
                stream,
            }),
        }
    }

    /// Handle to the player, for driving playback without HTTP.
    pub fn player(&self) -> PlayerHandle<V::Snapshot> {
        self.state.player.clone()
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(status_handler::<V>))
            .route("/api/snapshot", get(snapshot_handler::<V>))
            .route("/api/playback/play", post(play_handler::<V>))
            .route("/api/playback/pause", post(pause_handler::<V>))
            .route("/api/playback/reset", post(reset_handler::<V>))
            .route("/api/playback/step", post(step_handler::<V>))
            .route("/api/playback/seek", post(seek_handler::<V>))
            .route("/api/playback/speed", post(speed_handler::<V>))
            .route("/ws", get(ws_handler::<V>))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the given port.
    pub async fn serve(self, port: u16) -> Result<(), std::io::Error> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(
            visualizer = self.state.visualizer.name(),
            "Visualization server running on http://localhost:{}", port
        );
        axum::serve(listener, self.router()).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StepDirection {
    Forward,
    Backward,
}

/// Playback request shared by the HTTP routes and the WebSocket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Control {
    Play,
    Pause,
    Reset,
    Step { direction: StepDirection },
    Seek { frame: usize },
    Speed { speed: Speed },
    Status,
}

async fn control<V: Visualizer>(state: &AppState<V>, request: Control) -> Result<PlaybackStatus, PlaybackError> {
    let player = &state.player;
    match request {
        Control::Play => {
            let current = player.status().await?.state;
            if matches!(current, PlaybackState::Idle | PlaybackState::Finished) {
                player.load(state.visualizer.start(&state.input)).await?;
            }
            player.play().await?;
        }
        Control::Pause => {
            player.pause().await?;
        }
        Control::Reset => {
            player.reset().await?;
        }
        Control::Step {
            direction: StepDirection::Forward,
        } => {
            load_if_idle(state).await?;
            player.step_forward().await?;
        }
        Control::Step {
            direction: StepDirection::Backward,
        } => {
            player.step_backward().await?;
        }
        Control::Seek { frame } => {
            load_if_idle(state).await?;
            player.seek(frame).await?;
        }
        Control::Speed { speed } => {
            player.set_speed(speed).await?;
        }
        Control::Status => {}
    }
    player.status().await
}

/// Scrubbing from idle records a run first, as play does.
async fn load_if_idle<V: Visualizer>(state: &AppState<V>) -> Result<(), PlaybackError> {
    if state.player.status().await?.state == PlaybackState::Idle {
        state.player.load(state.visualizer.start(&state.input)).await?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorBody>)>;

fn reject(err: PlaybackError) -> (StatusCode, Json<ErrorBody>) {
    let code = match err {
        PlaybackError::InvalidTransition { .. } | PlaybackError::NoRun => StatusCode::CONFLICT,
        PlaybackError::PlayerClosed => StatusCode::SERVICE_UNAVAILABLE,
    };
    debug!(%err, "playback request rejected");
    (
        code,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

async fn respond<V: Visualizer>(state: &AppState<V>, request: Control) -> ApiResult<PlaybackStatus> {
    control(state, request).await.map(Json).map_err(reject)
}

/// Server status response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    visualizer: &'static str,
    playback: PlaybackStatus,
}

async fn status_handler<V: Visualizer>(State(state): State<Arc<AppState<V>>>) -> ApiResult<StatusResponse> {
    let playback = state.player.status().await.map_err(reject)?;
    Ok(Json(StatusResponse {
        status: "ok",
        visualizer: state.visualizer.name(),
        playback,
    }))
}

/// Current snapshot and its frame. Without a run, the input's initial
/// snapshot at frame 0.
#[derive(Serialize)]
#[serde(bound = "")]
struct SnapshotResponse<V: Visualizer> {
    frame: usize,
    snapshot: V::Snapshot,
}

async fn current_snapshot<V: Visualizer>(state: &AppState<V>) -> Result<SnapshotResponse<V>, PlaybackError> {
    let (frame, snapshot) = match state.player.snapshot().await? {
        Some(current) => current,
        None => (0, state.visualizer.initial_snapshot(&state.input)),
    };
    Ok(SnapshotResponse { frame, snapshot })
}

async fn snapshot_handler<V: Visualizer>(
    State(state): State<Arc<AppState<V>>>,
) -> ApiResult<SnapshotResponse<V>> {
    current_snapshot(&state).await.map(Json).map_err(reject)
}

async fn play_handler<V: Visualizer>(State(state): State<Arc<AppState<V>>>) -> ApiResult<PlaybackStatus> {
    respond(&state, Control::Play).await
}

async fn pause_handler<V: Visualizer>(State(state): State<Arc<AppState<V>>>) -> ApiResult<PlaybackStatus> {
    respond(&state, Control::Pause).await
}

async fn reset_handler<V: Visualizer>(State(state): State<Arc<AppState<V>>>) -> ApiResult<PlaybackStatus> {
    respond(&state, Control::Reset).await
}

#[derive(Deserialize)]
struct StepRequest {
    direction: StepDirection,
}

async fn step_handler<V: Visualizer>(
    State(state): State<Arc<AppState<V>>>,
    Json(req): Json<StepRequest>,
) -> ApiResult<PlaybackStatus> {
    respond(
        &state,
        Control::Step {
            direction: req.direction,
        },
    )
    .await
}

#[derive(Deserialize)]
struct SeekRequest {
    frame: usize,
}

async fn seek_handler<V: Visualizer>(
    State(state): State<Arc<AppState<V>>>,
    Json(req): Json<SeekRequest>,
) -> ApiResult<PlaybackStatus> {
    respond(&state, Control::Seek { frame: req.frame }).await
}

#[derive(Deserialize)]
struct SpeedRequest {
    speed: Speed,
}

async fn speed_handler<V: Visualizer>(
    State(state): State<Arc<AppState<V>>>,
    Json(req): Json<SpeedRequest>,
) -> ApiResult<PlaybackStatus> {
    respond(&state, Control::Speed { speed: req.speed }).await
}

async fn ws_handler<V: Visualizer>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<V>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsReply {
    Status(PlaybackStatus),
    Error { message: String },
}

async fn handle_ws<V: Visualizer>(mut socket: WebSocket, state: Arc<AppState<V>>) {
    // Subscribe before reading the snapshot so no frame falls in between.
    let mut frames = state.stream.subscribe();

    let current = match current_snapshot(&state).await {
        Ok(current) => current,
        Err(e) => {
            warn!("Failed to read initial snapshot: {}", e);
            return;
        }
    };
    let initial: StreamMessage<'_, V::Snapshot> = StreamMessage::Snapshot {
        frame: current.frame,
        snapshot: &current.snapshot,
    };
    if let Some(json) = initial.to_json() {
        if socket.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            msg = socket.recv() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let reply = match serde_json::from_str::<Control>(&text) {
                        Ok(request) => match control(&state, request).await {
                            Ok(status) => WsReply::Status(status),
                            Err(e) => WsReply::Error { message: e.to_string() },
                        },
                        Err(e) => WsReply::Error { message: format!("bad command: {}", e) },
                    };
                    if let Ok(json) = serde_json::to_string(&reply) {
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!("WebSocket client disconnected");
                    break;
                }
                Some(Err(e)) => {
                    warn!("WebSocket error: {}", e);
                    break;
                }
                Some(Ok(_)) => {}
            },
            frame = frames.recv() => match frame {
                Ok(json) => {
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "WebSocket client lagging, frames dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SudokuOutcome;
    use crate::visualizer::{Sorting, Sudoku};
    use stepwise_runners::{SortAlgorithm, SortInput, SudokuInput};

    fn sorting_server() -> VisServer<Sorting> {
        VisServer::new(
            Sorting {
                algorithm: SortAlgorithm::Bubble,
            },
            SortInput::new(vec![3, 1, 2]).unwrap(),
            &PlaybackConfig::default(),
        )
    }

    #[tokio::test]
    async fn router_builds() {
        let _router = sorting_server().router();
    }

    #[tokio::test(start_paused = true)]
    async fn play_from_idle_records_a_run() {
        let server = sorting_server();
        let status = control(&server.state, Control::Play).await.unwrap();
        assert_eq!(status.state, PlaybackState::Playing);
        assert_eq!(status.total, 6);

        assert_eq!(control(&server.state, Control::Pause).await.unwrap().state, PlaybackState::Paused);
        let reset = control(&server.state, Control::Reset).await.unwrap();
        assert_eq!((reset.state, reset.total), (PlaybackState::Idle, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_control_maps_to_conflict() {
        let server = sorting_server();
        let err = control(&server.state, Control::Pause).await.unwrap_err();
        assert_eq!(reject(err).0, StatusCode::CONFLICT);
        assert_eq!(reject(PlaybackError::PlayerClosed).0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_falls_back_to_initial() {
        let server = sorting_server();
        let current = current_snapshot(&server.state).await.unwrap();
        assert_eq!(current.frame, 0);
        assert_eq!(current.snapshot.values, vec![3, 1, 2]);

        control(&server.state, Control::Seek { frame: 100 }).await.unwrap();
        let end = current_snapshot(&server.state).await.unwrap();
        assert_eq!(end.frame, 6);
        assert!(end.snapshot.sorted);
    }

    #[tokio::test(start_paused = true)]
    async fn frames_stream_to_subscribers() {
        let server = VisServer::new(Sudoku, SudokuInput::classic(), &PlaybackConfig::default());
        let mut frames = server.state.stream.subscribe();

        control(
            &server.state,
            Control::Step {
                direction: StepDirection::Forward,
            },
        )
        .await
        .unwrap();
        let json = frames.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "frame");
        assert_eq!(value["event"]["type"], "place");

        control(&server.state, Control::Seek { frame: usize::MAX }).await.unwrap();
        let (_, snapshot) = server.player().snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.outcome, Some(SudokuOutcome::Solved));
    }

    #[test]
    fn control_parses_from_json() {
        let parsed: Control = serde_json::from_str(r#"{"type":"step","direction":"backward"}"#).unwrap();
        assert_eq!(
            parsed,
            Control::Step {
                direction: StepDirection::Backward
            }
        );
        let parsed: Control = serde_json::from_str(r#"{"type":"speed","speed":75}"#).unwrap();
        assert_eq!(parsed, Control::Speed { speed: Speed::new(75) });
    }
}
