//! A scheduler running inside its own tokio task.
//!
//! Every request goes through one channel, and the task handles requests
//! before a due step, so a pause or reset that races a timer always wins.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::playback::{PlaybackError, PlaybackState, PlaybackStatus, Scheduler, Speed};
use crate::run::Run;
use crate::sink::SnapshotSink;
use crate::snapshot::Reduce;

const COMMAND_BUFFER: usize = 32;

type Reply = oneshot::Sender<Result<PlaybackState, PlaybackError>>;

enum Command<S: Reduce> {
    Load { run: Run<S>, reply: Reply },
    Play { reply: Reply },
    Pause { reply: Reply },
    Reset { reply: Reply },
    SetSpeed { speed: Speed, reply: Reply },
    StepForward { reply: Reply },
    StepBackward { reply: Reply },
    Seek { frame: usize, reply: Reply },
    Status { reply: oneshot::Sender<PlaybackStatus> },
    Snapshot { reply: oneshot::Sender<Option<(usize, S)>> },
}

/// Cloneable handle to a running player.
///
/// The task stops once every handle is dropped.
#[derive(Debug)]
pub struct PlayerHandle<S: Reduce> {
    tx: mpsc::Sender<Command<S>>,
}

impl<S: Reduce> Clone for PlayerHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Start a player task. The join handle yields the sink once the task ends.
pub fn spawn<S, K>(scheduler: Scheduler<S>, sink: K) -> (PlayerHandle<S>, JoinHandle<K>)
where
    S: Reduce,
    K: SnapshotSink<S>,
{
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let task = tokio::spawn(drive(scheduler, sink, rx));
    (PlayerHandle { tx }, task)
}

impl<S: Reduce> PlayerHandle<S> {
    pub async fn load(&self, run: Run<S>) -> Result<PlaybackState, PlaybackError> {
        self.request(|reply| Command::Load { run, reply }).await?
    }

    pub async fn play(&self) -> Result<PlaybackState, PlaybackError> {
        self.request(|reply| Command::Play { reply }).await?
    }

    pub async fn pause(&self) -> Result<PlaybackState, PlaybackError> {
        self.request(|reply| Command::Pause { reply }).await?
    }

    pub async fn reset(&self) -> Result<PlaybackState, PlaybackError> {
        self.request(|reply| Command::Reset { reply }).await?
    }

    pub async fn set_speed(&self, speed: Speed) -> Result<PlaybackState, PlaybackError> {
        self.request(|reply| Command::SetSpeed { speed, reply }).await?
    }

    pub async fn step_forward(&self) -> Result<PlaybackState, PlaybackError> {
        self.request(|reply| Command::StepForward { reply }).await?
    }

    pub async fn step_backward(&self) -> Result<PlaybackState, PlaybackError> {
        self.request(|reply| Command::StepBackward { reply }).await?
    }

    pub async fn seek(&self, frame: usize) -> Result<PlaybackState, PlaybackError> {
        self.request(|reply| Command::Seek { frame, reply }).await?
    }

    pub async fn status(&self) -> Result<PlaybackStatus, PlaybackError> {
        self.request(|reply| Command::Status { reply }).await
    }

    /// Cursor and snapshot at the cursor, `None` without a run.
    pub async fn snapshot(&self) -> Result<Option<(usize, S)>, PlaybackError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    async fn request<T, F>(&self, command: F) -> Result<T, PlaybackError>
    where
        F: FnOnce(oneshot::Sender<T>) -> Command<S>,
    {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| PlaybackError::PlayerClosed)?;
        rx.await.map_err(|_| PlaybackError::PlayerClosed)
    }
}

async fn drive<S, K>(mut scheduler: Scheduler<S>, mut sink: K, mut rx: mpsc::Receiver<Command<S>>) -> K
where
    S: Reduce,
    K: SnapshotSink<S>,
{
    loop {
        let pending = scheduler.pending();
        tokio::select! {
            biased;

            command = rx.recv() => match command {
                Some(command) => handle(&mut scheduler, &mut sink, command),
                None => break,
            },
            token = wait(pending) => {
                scheduler.fire(token, Instant::now(), &mut sink);
            }
        }
    }
    debug!(state = %scheduler.state(), "player stopped");
    sink
}

async fn wait(pending: Option<(u64, Instant)>) -> u64 {
    match pending {
        Some((token, deadline)) => {
            sleep_until(deadline).await;
            token
        }
        None => std::future::pending().await,
    }
}

fn handle<S, K>(scheduler: &mut Scheduler<S>, sink: &mut K, command: Command<S>)
where
    S: Reduce,
    K: SnapshotSink<S>,
{
    // A dropped reply receiver means the caller gave up; the command still applies.
    match command {
        Command::Load { run, reply } => {
            let _ = reply.send(scheduler.load(run));
        }
        Command::Play { reply } => {
            let _ = reply.send(scheduler.play(Instant::now()));
        }
        Command::Pause { reply } => {
            let _ = reply.send(scheduler.pause());
        }
        Command::Reset { reply } => {
            let _ = reply.send(scheduler.reset());
        }
        Command::SetSpeed { speed, reply } => {
            let _ = reply.send(scheduler.set_speed(speed, Instant::now()));
        }
        Command::StepForward { reply } => {
            let _ = reply.send(scheduler.step_forward(sink));
        }
        Command::StepBackward { reply } => {
            let _ = reply.send(scheduler.step_backward(sink));
        }
        Command::Seek { frame, reply } => {
            let _ = reply.send(scheduler.seek(frame, sink));
        }
        Command::Status { reply } => {
            let _ = reply.send(scheduler.status());
        }
        Command::Snapshot { reply } => {
            let _ = reply.send(scheduler.run().map(|run| (run.cursor(), run.current().clone())));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::playback::DelayCurve;
    use crate::sink::RecordingSink;
    use crate::snapshot::ArraySnapshot;
    use stepwise_runners::{sort, SortAlgorithm, SortInput};
    use tokio::time::sleep;

    // Bubble sort of [4, 3, 2, 1]: 6 compares, 6 swaps, 1 terminal.
    const EVENTS: usize = 13;
    // SORTING curve at the default speed.
    const DELAY: Duration = Duration::from_millis(150);

    fn run() -> Run<ArraySnapshot> {
        let input = SortInput::new(vec![4, 3, 2, 1]).unwrap();
        Run::record(ArraySnapshot::new(&input), || sort(SortAlgorithm::Bubble, &input))
    }

    fn start() -> (PlayerHandle<ArraySnapshot>, JoinHandle<RecordingSink<ArraySnapshot>>) {
        spawn(Scheduler::new(Speed::default(), DelayCurve::SORTING), RecordingSink::new())
    }

    #[tokio::test(start_paused = true)]
    async fn plays_to_the_end_at_curve_pace() {
        let (handle, task) = start();
        handle.load(run()).await.unwrap();
        handle.play().await.unwrap();

        sleep(DELAY * (EVENTS as u32 - 1) + Duration::from_millis(1)).await;
        let status = handle.status().await.unwrap();
        assert_eq!(status.state, PlaybackState::Finished);
        assert_eq!(status.frame, EVENTS);

        drop(handle);
        let sink = task.await.unwrap();
        let indices: Vec<usize> = sink.frames().iter().map(|f| f.index).collect();
        assert_eq!(indices, (0..EVENTS).collect::<Vec<_>>());
        assert_eq!(sink.finished().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_holds_position() {
        let (handle, _task) = start();
        handle.load(run()).await.unwrap();
        handle.play().await.unwrap();

        // Steps at 0ms and 150ms.
        sleep(DELAY + Duration::from_millis(10)).await;
        assert_eq!(handle.pause().await, Ok(PlaybackState::Paused));
        let paused_at = handle.status().await.unwrap().frame;
        assert_eq!(paused_at, 2);

        sleep(DELAY * 10).await;
        assert_eq!(handle.status().await.unwrap().frame, paused_at);

        // Resuming applies the next event straight away.
        handle.play().await.unwrap();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(handle.status().await.unwrap().frame, paused_at + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_while_playing_stops_everything() {
        let (handle, task) = start();
        handle.load(run()).await.unwrap();
        handle.play().await.unwrap();
        sleep(Duration::from_millis(10)).await;

        assert_eq!(handle.reset().await, Ok(PlaybackState::Idle));
        sleep(DELAY * 20).await;
        let status = handle.status().await.unwrap();
        assert_eq!((status.state, status.frame, status.total), (PlaybackState::Idle, 0, 0));
        assert_eq!(handle.snapshot().await, Ok(None));

        drop(handle);
        assert_eq!(task.await.unwrap().frames().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_request_reports_state() {
        let (handle, _task) = start();
        assert_eq!(handle.play().await, Err(PlaybackError::NoRun));
        handle.load(run()).await.unwrap();
        assert_eq!(
            handle.load(run()).await,
            Err(PlaybackError::InvalidTransition {
                op: "load",
                state: PlaybackState::Ready
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn scrubbing_through_handle() {
        let (handle, task) = start();
        handle.load(run()).await.unwrap();
        assert_eq!(handle.step_forward().await, Ok(PlaybackState::Paused));
        assert_eq!(handle.seek(5).await, Ok(PlaybackState::Paused));
        assert_eq!(handle.step_backward().await, Ok(PlaybackState::Paused));
        assert_eq!(handle.seek(EVENTS).await, Ok(PlaybackState::Finished));

        let (frame, snapshot) = handle.snapshot().await.unwrap().unwrap();
        assert_eq!(frame, EVENTS);
        assert_eq!(snapshot.values, vec![1, 2, 3, 4]);
        assert!(snapshot.sorted);

        drop(handle);
        let sink = task.await.unwrap();
        assert_eq!(sink.frames().len(), 1);
        assert_eq!(sink.seeks().iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![5, 4, EVENTS]);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_player_is_reported() {
        let (handle, task) = start();
        task.abort();
        let _ = task.await;
        assert_eq!(handle.status().await, Err(PlaybackError::PlayerClosed));
    }
}
