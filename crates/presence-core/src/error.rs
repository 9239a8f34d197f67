use thiserror::Error;

use crate::gesture::GestureKind;

/// Errors raised synchronously by configuring operations (task selection,
/// explicit task lists, gesture name parsing). These abort the operation
/// that produced them and never affect an already-running session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("requested task count must be at least 1")]
    TaskCountZero,

    #[error("requested {requested} tasks but only {available} distinct gestures exist")]
    TaskCountTooLarge { requested: usize, available: usize },

    #[error("task list contains '{0}' more than once")]
    DuplicateTask(GestureKind),

    #[error("unknown gesture kind: '{0}'")]
    UnknownGesture(String),
}

/// A landmark set that cannot be evaluated.
///
/// Per-frame policy: an `InputError` is logged and the frame is skipped
/// with session state unchanged — a single malformed frame never
/// terminates a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("landmark set has {got} points, expected at least {expected}")]
    TooFewLandmarks { got: usize, expected: usize },

    #[error("landmark index {index} missing from set of {len} points")]
    MissingLandmark { index: usize, len: usize },
}
