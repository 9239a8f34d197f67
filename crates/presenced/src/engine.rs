//! The engine thread: one OS thread owns the `LivenessSession`, and every
//! mutation — frame delivery, start/stop/reset, style changes — arrives
//! through a single request channel. That serialization is the session's
//! concurrency contract: a frame is fully processed before the next
//! request is taken.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use presence_core::{
    ConfigError, GestureKind, LandmarkSet, LivenessSession, SessionPhase, Signal, SignalKind,
    Snapshot, StyleConfig, Thresholds,
};

use crate::config::Config;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("engine thread exited")]
    ChannelClosed,
}

/// Session state summary for the Status D-Bus method.
pub struct EngineStatus {
    pub phase: SessionPhase,
    pub current_task: Option<GestureKind>,
    pub remaining: usize,
    pub passed: usize,
    pub stroke_color: String,
}

/// Messages sent from D-Bus handlers to the engine thread.
enum EngineRequest {
    Start {
        count: usize,
        reply: oneshot::Sender<Result<Vec<GestureKind>, ConfigError>>,
    },
    StartWith {
        tasks: Vec<GestureKind>,
        reply: oneshot::Sender<Result<(), ConfigError>>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    SetStyle {
        style: StyleConfig,
        reply: oneshot::Sender<()>,
    },
    Frame {
        landmarks: LandmarkSet,
        snapshot: Option<Snapshot>,
    },
    CurrentTask {
        reply: oneshot::Sender<Option<GestureKind>>,
    },
    Remaining {
        reply: oneshot::Sender<Vec<GestureKind>>,
    },
    History {
        reply: oneshot::Sender<Vec<GestureKind>>,
    },
    Status {
        reply: oneshot::Sender<EngineStatus>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// Start a session with `count` randomly selected gestures.
    pub async fn start_random(&self, count: usize) -> Result<Vec<GestureKind>, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Start {
                count,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        Ok(reply_rx.await.map_err(|_| EngineError::ChannelClosed)??)
    }

    /// Start a session with an explicit, ordered task list.
    pub async fn start_with(&self, tasks: Vec<GestureKind>) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::StartWith {
                tasks,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        Ok(reply_rx.await.map_err(|_| EngineError::ChannelClosed)??)
    }

    pub async fn stop(&self) -> Result<(), EngineError> {
        self.query(|reply| EngineRequest::Stop { reply }).await
    }

    pub async fn reset(&self) -> Result<(), EngineError> {
        self.query(|reply| EngineRequest::Reset { reply }).await
    }

    pub async fn set_style(&self, style: StyleConfig) -> Result<(), EngineError> {
        self.query(move |reply| EngineRequest::SetStyle { style, reply })
            .await
    }

    /// Submit one frame. Non-blocking: returns `false` when the engine
    /// queue is full and the frame was dropped.
    pub fn submit_frame(&self, landmarks: LandmarkSet, snapshot: Option<Snapshot>) -> bool {
        self.tx
            .try_send(EngineRequest::Frame {
                landmarks,
                snapshot,
            })
            .is_ok()
    }

    pub async fn current_task(&self) -> Result<Option<GestureKind>, EngineError> {
        self.query(|reply| EngineRequest::CurrentTask { reply }).await
    }

    pub async fn remaining(&self) -> Result<Vec<GestureKind>, EngineError> {
        self.query(|reply| EngineRequest::Remaining { reply }).await
    }

    pub async fn history(&self) -> Result<Vec<GestureKind>, EngineError> {
        self.query(|reply| EngineRequest::History { reply }).await
    }

    pub async fn status(&self) -> Result<EngineStatus, EngineError> {
        self.query(|reply| EngineRequest::Status { reply }).await
    }

    async fn query<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> EngineRequest,
    ) -> Result<T, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)
    }
}

/// Spawn the engine on a dedicated OS thread.
///
/// Builds the session from the configured guide geometry and thresholds,
/// subscribes a forwarder for every signal kind onto `signal_tx`, then
/// enters the request loop until every handle is dropped.
pub fn spawn_engine(
    config: &Config,
    thresholds: Thresholds,
    signal_tx: mpsc::UnboundedSender<Signal>,
) -> EngineHandle {
    let mut session = LivenessSession::with_thresholds(config.guide(), thresholds);

    for kind in [
        SignalKind::TaskStarted,
        SignalKind::TaskPassed,
        SignalKind::AllTasksPassed,
        SignalKind::FacePlaceStatus,
    ] {
        let tx = signal_tx.clone();
        session.subscribe(kind, move |signal| {
            // The receiver half going away just means nobody is forwarding
            // signals anymore; the session itself keeps working.
            let _ = tx.send(signal.clone());
        });
    }

    let (tx, mut rx) = mpsc::channel::<EngineRequest>(config.queue_depth);
    let default_count = config.default_task_count;

    std::thread::Builder::new()
        .name("presence-engine".into())
        .spawn(move || {
            tracing::info!("engine thread started");
            let mut rng = rand::thread_rng();
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Start { count, reply } => {
                        let count = if count == 0 { default_count } else { count };
                        let _ = reply.send(session.start_random(&mut rng, count));
                    }
                    EngineRequest::StartWith { tasks, reply } => {
                        let _ = reply.send(session.start(tasks));
                    }
                    EngineRequest::Stop { reply } => {
                        session.stop();
                        let _ = reply.send(());
                    }
                    EngineRequest::Reset { reply } => {
                        session.reset();
                        let _ = reply.send(());
                    }
                    EngineRequest::SetStyle { style, reply } => {
                        session.set_style(style);
                        let _ = reply.send(());
                    }
                    EngineRequest::Frame {
                        landmarks,
                        snapshot,
                    } => {
                        let frame = match snapshot {
                            Some(snapshot) => {
                                presence_core::Frame::with_snapshot(landmarks, snapshot)
                            }
                            None => presence_core::Frame::new(landmarks),
                        };
                        session.process_frame(&frame);
                    }
                    EngineRequest::CurrentTask { reply } => {
                        let _ = reply.send(session.current_task());
                    }
                    EngineRequest::Remaining { reply } => {
                        let _ = reply.send(session.remaining_tasks());
                    }
                    EngineRequest::History { reply } => {
                        let _ = reply.send(session.pass_history().to_vec());
                    }
                    EngineRequest::Status { reply } => {
                        let _ = reply.send(EngineStatus {
                            phase: session.phase(),
                            current_task: session.current_task(),
                            remaining: session.remaining_tasks().len(),
                            passed: session.pass_history().len(),
                            stroke_color: session.style().stroke_color.clone(),
                        });
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })
        .expect("failed to spawn engine thread");

    EngineHandle { tx }
}
