//! The closed gesture set and its per-gesture classifiers.
//!
//! Each classifier is a pure function over a landmark set and the
//! threshold configuration — no history, no side effects. Task progress is
//! the sequencer's job; detection here is strictly per-frame. Dispatch
//! goes through a static lookup table so adding a gesture is a table entry
//! plus an enum variant, not a new branch in the frame loop.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, InputError};
use crate::geometry::{distance, DEGENERATE_EPS};
use crate::landmarks::LandmarkSet;
use crate::mesh;
use crate::thresholds::{BlinkThresholds, EyebrowThresholds, Thresholds};

/// One required liveness gesture. Closed set; sides are the subject's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Blink,
    TurnRight,
    LookUp,
    Smile,
    OpenMouth,
    RaiseEyebrows,
    TurnLeft,
}

impl GestureKind {
    /// Every gesture kind, in challenge-catalog order.
    pub const ALL: [GestureKind; 7] = [
        GestureKind::Blink,
        GestureKind::TurnRight,
        GestureKind::LookUp,
        GestureKind::Smile,
        GestureKind::OpenMouth,
        GestureKind::RaiseEyebrows,
        GestureKind::TurnLeft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blink => "blink",
            Self::TurnRight => "turn_right",
            Self::LookUp => "look_up",
            Self::Smile => "smile",
            Self::OpenMouth => "open_mouth",
            Self::RaiseEyebrows => "raise_eyebrows",
            Self::TurnLeft => "turn_left",
        }
    }

    /// Instruction text a UI shows the subject for this gesture.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Blink => "Blink both eyes",
            Self::TurnRight => "Turn your head to the right",
            Self::LookUp => "Look up",
            Self::Smile => "Smile",
            Self::OpenMouth => "Open your mouth",
            Self::RaiseEyebrows => "Raise your eyebrows",
            Self::TurnLeft => "Turn your head to the left",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GestureKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| ConfigError::UnknownGesture(s.to_string()))
    }
}

/// A per-frame gesture predicate. Stateless; a degenerate denominator
/// means "not detected" (`Ok(false)`), a missing landmark index is a typed
/// input error for the dispatch loop to log and skip.
pub type Classifier = fn(&LandmarkSet, &Thresholds) -> Result<bool, InputError>;

/// Static gesture → classifier dispatch table.
const CLASSIFIERS: [(GestureKind, Classifier); 7] = [
    (GestureKind::Blink, is_blinking),
    (GestureKind::TurnRight, is_turning_right),
    (GestureKind::LookUp, is_looking_up),
    (GestureKind::Smile, is_smiling),
    (GestureKind::OpenMouth, is_opening_mouth),
    (GestureKind::RaiseEyebrows, is_raising_eyebrows),
    (GestureKind::TurnLeft, is_turning_left),
];

/// Run the classifier bound to `kind` against one frame's landmarks.
pub fn classify(
    kind: GestureKind,
    landmarks: &LandmarkSet,
    thresholds: &Thresholds,
) -> Result<bool, InputError> {
    let (_, classifier) = CLASSIFIERS
        .iter()
        .find(|(k, _)| *k == kind)
        .expect("classifier table covers every gesture kind");
    classifier(landmarks, thresholds)
}

/// Both eyes closed. The brow-distance ratio guards against head tilt
/// shrinking the projected eyelid gap without an actual blink.
fn is_blinking(landmarks: &LandmarkSet, thresholds: &Thresholds) -> Result<bool, InputError> {
    let right = eye_closed(
        landmarks,
        mesh::RIGHT_EYE_TOP,
        mesh::RIGHT_EYE_BOTTOM,
        mesh::RIGHT_EYEBROW,
        &thresholds.blink,
    )?;
    let left = eye_closed(
        landmarks,
        mesh::LEFT_EYE_TOP,
        mesh::LEFT_EYE_BOTTOM,
        mesh::LEFT_EYEBROW,
        &thresholds.blink,
    )?;
    Ok(right && left)
}

fn eye_closed(
    landmarks: &LandmarkSet,
    top_idx: usize,
    bottom_idx: usize,
    brow_idx: usize,
    thresholds: &BlinkThresholds,
) -> Result<bool, InputError> {
    let top = landmarks.get(top_idx)?;
    let bottom = landmarks.get(bottom_idx)?;
    let brow = landmarks.get(brow_idx)?;

    let gap = distance(top.xy(), bottom.xy());
    let brow_to_top = distance(brow.xy(), top.xy());
    let brow_to_bottom = distance(brow.xy(), bottom.xy());
    if brow_to_bottom < DEGENERATE_EPS {
        return Ok(false);
    }

    Ok(gap < thresholds.max_eyelid_gap && brow_to_top / brow_to_bottom > thresholds.min_brow_ratio)
}

/// Nose tip crossed past the subject's right cheek-oval edge (smaller x in
/// unmirrored coordinates).
fn is_turning_right(landmarks: &LandmarkSet, thresholds: &Thresholds) -> Result<bool, InputError> {
    let nose = landmarks.get(mesh::NOSE_TIP)?;
    let cheek = landmarks.get(mesh::RIGHT_CHEEK_EDGE)?;
    Ok(nose.x < cheek.x - thresholds.turn.margin)
}

fn is_turning_left(landmarks: &LandmarkSet, thresholds: &Thresholds) -> Result<bool, InputError> {
    let nose = landmarks.get(mesh::NOSE_TIP)?;
    let cheek = landmarks.get(mesh::LEFT_CHEEK_EDGE)?;
    Ok(nose.x > cheek.x + thresholds.turn.margin)
}

/// Mouth-corner width relative to the mean distance from each corner to
/// its own-side cheek-oval anchor. Bilateral by construction, so a
/// one-sided smirk moves the ratio far less than a symmetric smile.
fn is_smiling(landmarks: &LandmarkSet, thresholds: &Thresholds) -> Result<bool, InputError> {
    let right_corner = landmarks.get(mesh::RIGHT_MOUTH_CORNER)?;
    let left_corner = landmarks.get(mesh::LEFT_MOUTH_CORNER)?;
    let right_anchor = landmarks.get(mesh::RIGHT_CHEEK_EDGE)?;
    let left_anchor = landmarks.get(mesh::LEFT_CHEEK_EDGE)?;

    let width = distance(right_corner.xy(), left_corner.xy());
    let anchor = (distance(right_corner.xy(), right_anchor.xy())
        + distance(left_corner.xy(), left_anchor.xy()))
        / 2.0;
    if anchor < DEGENERATE_EPS {
        return Ok(false);
    }

    Ok(width / anchor > thresholds.smile.min_width_ratio)
}

/// Planar brow→nose distance shrinks against nose depth as the head
/// pitches back.
fn is_looking_up(landmarks: &LandmarkSet, thresholds: &Thresholds) -> Result<bool, InputError> {
    let nose = landmarks.get(mesh::NOSE_TIP)?;
    let brow = landmarks.get(mesh::RIGHT_EYEBROW_INNER)?;

    let depth = nose.z.abs();
    if depth < DEGENERATE_EPS {
        return Ok(false);
    }

    Ok(distance(brow.xy(), nose.xy()) / depth < thresholds.look_up.max_ratio)
}

fn is_opening_mouth(landmarks: &LandmarkSet, thresholds: &Thresholds) -> Result<bool, InputError> {
    let upper = landmarks.get(mesh::UPPER_LIP)?;
    let lower = landmarks.get(mesh::LOWER_LIP)?;
    Ok((upper.y - lower.y).abs() > thresholds.open_mouth.min_lip_gap)
}

/// Both brows lifted. The iris→face-top distance normalizes the lift for
/// face scale.
fn is_raising_eyebrows(
    landmarks: &LandmarkSet,
    thresholds: &Thresholds,
) -> Result<bool, InputError> {
    let right = brow_lifted(
        landmarks,
        mesh::RIGHT_IRIS_TOP,
        mesh::RIGHT_EYEBROW,
        &thresholds.raise_eyebrows,
    )?;
    let left = brow_lifted(
        landmarks,
        mesh::LEFT_IRIS_TOP,
        mesh::LEFT_EYEBROW,
        &thresholds.raise_eyebrows,
    )?;
    Ok(right && left)
}

fn brow_lifted(
    landmarks: &LandmarkSet,
    iris_idx: usize,
    brow_idx: usize,
    thresholds: &EyebrowThresholds,
) -> Result<bool, InputError> {
    let iris = landmarks.get(iris_idx)?;
    let brow = landmarks.get(brow_idx)?;
    let face_top = landmarks.get(mesh::FACE_TOP)?;

    let lift = distance(iris.xy(), brow.xy());
    let head = distance(iris.xy(), face_top.xy());
    if head < DEGENERATE_EPS {
        return Ok(false);
    }

    Ok(lift / head > thresholds.min_lift_ratio)
}
