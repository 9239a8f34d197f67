use tokio::sync::mpsc;
use zbus::interface;
use zbus::object_server::SignalEmitter;

use presence_core::{
    GestureKind, Landmark, LandmarkSet, SessionPhase, Signal, Snapshot, StyleConfig,
};

use crate::engine::{EngineError, EngineHandle};

/// D-Bus interface for the Presence liveness challenge daemon.
///
/// Bus name: org.presence.Liveness1
/// Object path: /org/presence/Liveness1
pub const BUS_NAME: &str = "org.presence.Liveness1";
pub const OBJECT_PATH: &str = "/org/presence/Liveness1";

pub struct LivenessService {
    pub engine: EngineHandle,
}

fn to_fdo(err: EngineError) -> zbus::fdo::Error {
    zbus::fdo::Error::Failed(err.to_string())
}

fn phase_str(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Idle => "idle",
        SessionPhase::AwaitingGesture => "awaiting_gesture",
        SessionPhase::Completed => "completed",
    }
}

#[interface(name = "org.presence.Liveness1")]
impl LivenessService {
    /// Start a session with `count` randomly selected gestures (0 uses
    /// the configured default count). Returns the selected task names in
    /// challenge order.
    async fn start(&self, count: u32) -> zbus::fdo::Result<Vec<String>> {
        tracing::info!(count, "start requested");
        let tasks = self
            .engine
            .start_random(count as usize)
            .await
            .map_err(to_fdo)?;
        Ok(tasks.iter().map(|task| task.to_string()).collect())
    }

    /// Start a session with an explicit, ordered task list.
    async fn start_with_tasks(&self, tasks: Vec<String>) -> zbus::fdo::Result<()> {
        tracing::info!(?tasks, "start with explicit tasks requested");
        let parsed = tasks
            .iter()
            .map(|name| name.parse::<GestureKind>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| zbus::fdo::Error::InvalidArgs(e.to_string()))?;
        self.engine.start_with(parsed).await.map_err(to_fdo)
    }

    /// Halt gesture evaluation. Idempotent.
    async fn stop(&self) -> zbus::fdo::Result<()> {
        tracing::info!("stop requested");
        self.engine.stop().await.map_err(to_fdo)
    }

    /// Clear the task queue and pass history.
    async fn reset(&self) -> zbus::fdo::Result<()> {
        tracing::info!("reset requested");
        self.engine.reset().await.map_err(to_fdo)
    }

    /// Feed one detector frame: `landmarks` is a JSON array of `[x, y, z]`
    /// triples in the FaceMesh index order; `rgb` is the optional packed
    /// RGB8 frame image used for pass-time snapshots (empty to omit).
    ///
    /// Returns whether the frame was accepted. A malformed frame or a
    /// full engine queue drops the frame — the session is unaffected
    /// either way.
    async fn process_frame(
        &self,
        landmarks: &str,
        rgb: Vec<u8>,
        width: u32,
        height: u32,
    ) -> zbus::fdo::Result<bool> {
        let points: Vec<[f32; 3]> = match serde_json::from_str(landmarks) {
            Ok(points) => points,
            Err(err) => {
                tracing::warn!(error = %err, "frame rejected: malformed landmark JSON");
                return Ok(false);
            }
        };
        let set = match LandmarkSet::new(
            points
                .into_iter()
                .map(|[x, y, z]| Landmark::new(x, y, z))
                .collect(),
        ) {
            Ok(set) => set,
            Err(err) => {
                tracing::warn!(error = %err, "frame rejected");
                return Ok(false);
            }
        };

        let snapshot = (!rgb.is_empty()).then(|| Snapshot::rgb8(width, height, rgb));
        let accepted = self.engine.submit_frame(set, snapshot);
        if !accepted {
            tracing::debug!("frame dropped: engine queue full");
        }
        Ok(accepted)
    }

    /// Name of the gesture currently awaited, or "" when none.
    async fn current_task(&self) -> zbus::fdo::Result<String> {
        let task = self.engine.current_task().await.map_err(to_fdo)?;
        Ok(task.map(|t| t.to_string()).unwrap_or_default())
    }

    /// Remaining task names in challenge order.
    async fn remaining_tasks(&self) -> zbus::fdo::Result<Vec<String>> {
        let tasks = self.engine.remaining().await.map_err(to_fdo)?;
        Ok(tasks.iter().map(|task| task.to_string()).collect())
    }

    /// Task names passed this session, in pass order.
    async fn pass_history(&self) -> zbus::fdo::Result<Vec<String>> {
        let tasks = self.engine.history().await.map_err(to_fdo)?;
        Ok(tasks.iter().map(|task| task.to_string()).collect())
    }

    /// Apply guide overlay styling. Unrecognized options are ignored.
    async fn set_style_config(&self, config: &str) -> zbus::fdo::Result<()> {
        let style: StyleConfig = serde_json::from_str(config)
            .map_err(|e| zbus::fdo::Error::InvalidArgs(e.to_string()))?;
        self.engine.set_style(style).await.map_err(to_fdo)
    }

    /// Daemon status as JSON.
    async fn status(&self) -> zbus::fdo::Result<String> {
        let status = self.engine.status().await.map_err(to_fdo)?;
        Ok(serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "phase": phase_str(status.phase),
            "current_task": status.current_task.map(|t| t.to_string()),
            "remaining": status.remaining,
            "passed": status.passed,
            "stroke_color": status.stroke_color,
        })
        .to_string())
    }

    #[zbus(signal)]
    async fn task_started(emitter: &SignalEmitter<'_>, task: &str) -> zbus::Result<()>;

    #[zbus(signal)]
    async fn task_passed(
        emitter: &SignalEmitter<'_>,
        task: &str,
        snapshot_png: Vec<u8>,
    ) -> zbus::Result<()>;

    #[zbus(signal)]
    async fn all_tasks_passed(emitter: &SignalEmitter<'_>) -> zbus::Result<()>;

    #[zbus(signal)]
    async fn face_place_status(emitter: &SignalEmitter<'_>, inside_guide: bool) -> zbus::Result<()>;
}

/// Re-emit session signals as D-Bus signals until the engine side closes.
/// Pass-time snapshots are encoded to PNG here, off the engine thread.
pub async fn forward_signals(conn: zbus::Connection, mut rx: mpsc::UnboundedReceiver<Signal>) {
    let iface = match conn
        .object_server()
        .interface::<_, LivenessService>(OBJECT_PATH)
        .await
    {
        Ok(iface) => iface,
        Err(err) => {
            tracing::error!(error = %err, "signal forwarder: interface lookup failed");
            return;
        }
    };

    while let Some(signal) = rx.recv().await {
        let emitter = iface.signal_emitter();
        let result = match &signal {
            Signal::TaskStarted { task } => {
                LivenessService::task_started(emitter, task.as_str()).await
            }
            Signal::TaskPassed { task, snapshot } => {
                let png = match snapshot {
                    Some(snapshot) => match encode_png(snapshot) {
                        Ok(png) => png,
                        Err(err) => {
                            tracing::warn!(error = %err, "snapshot PNG encoding failed");
                            Vec::new()
                        }
                    },
                    None => Vec::new(),
                };
                LivenessService::task_passed(emitter, task.as_str(), png).await
            }
            Signal::AllTasksPassed => LivenessService::all_tasks_passed(emitter).await,
            Signal::FacePlaceStatus { inside } => {
                LivenessService::face_place_status(emitter, *inside).await
            }
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to emit D-Bus signal");
        }
    }
    tracing::debug!("signal forwarder exiting");
}

fn encode_png(snapshot: &Snapshot) -> Result<Vec<u8>, image::ImageError> {
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(
        snapshot.data(),
        snapshot.width(),
        snapshot.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(out)
}
