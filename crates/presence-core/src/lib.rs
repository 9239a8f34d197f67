//! Interactive liveness gesture-challenge engine.
//!
//! Drives a challenge/response liveness flow: a session owns an ordered
//! queue of required facial gestures (blink, head turns, smile, look up,
//! open mouth, raise eyebrows). For every camera frame the caller supplies
//! a set of normalized face-mesh landmarks; the engine checks that the face
//! sits inside an elliptical guide region, classifies the active gesture,
//! advances the task queue on a pass, and notifies subscribed listeners
//! (task started / task passed / all tasks passed / face placement).
//!
//! Landmark detection, camera acquisition, and rendering stay external: the
//! engine consumes landmark frames and never runs inference or touches
//! pixels. See [`session::LivenessSession`] for the entry point.

pub mod error;
pub mod geometry;
pub mod gesture;
pub mod guide;
pub mod landmarks;
pub mod mesh;
pub mod session;
pub mod signals;
pub mod thresholds;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{ConfigError, InputError};
pub use gesture::{classify, GestureKind};
pub use guide::{GuideRegion, StyleConfig};
pub use landmarks::{Frame, Landmark, LandmarkSet, Snapshot};
pub use session::{random_tasks, LivenessSession, SessionPhase};
pub use signals::{ListenerId, Signal, SignalKind};
pub use thresholds::Thresholds;
