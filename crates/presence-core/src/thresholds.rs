//! Classifier threshold configuration.
//!
//! Every numeric constant a gesture classifier compares against lives
//! here, never inline in a classifier body, so calibration is a config
//! change rather than a rebuild. All structs deserialize with per-field
//! defaults — a calibration TOML only needs the values it overrides.
//!
//! Defaults are empirical, tuned against the FaceMesh normalized
//! coordinate space at typical webcam framing.

use serde::Deserialize;

/// Complete threshold set, one sub-struct per gesture family.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub blink: BlinkThresholds,
    pub turn: TurnThresholds,
    pub smile: SmileThresholds,
    pub look_up: LookUpThresholds,
    pub open_mouth: OpenMouthThresholds,
    pub raise_eyebrows: EyebrowThresholds,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlinkThresholds {
    /// Maximum eyelid gap (normalized) for an eye to count as closed.
    pub max_eyelid_gap: f32,
    /// Minimum ratio of brow→upper-lid to brow→lower-lid distance. As the
    /// eye closes the two distances converge, pushing the ratio toward 1;
    /// head tilt alone shrinks the gap without raising the ratio.
    pub min_brow_ratio: f32,
}

impl Default for BlinkThresholds {
    fn default() -> Self {
        Self {
            max_eyelid_gap: 0.015,
            min_brow_ratio: 0.9,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TurnThresholds {
    /// Extra normalized-x margin the nose tip must cross past the cheek
    /// oval reference before a turn registers. Zero reproduces a bare
    /// crossing test.
    pub margin: f32,
}

impl Default for TurnThresholds {
    fn default() -> Self {
        Self { margin: 0.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmileThresholds {
    /// Minimum ratio of mouth-corner width to the mean corner→cheek-oval
    /// distance. Smiling widens the mouth and pulls both corners toward
    /// their own cheeks, raising the ratio from both directions.
    pub min_width_ratio: f32,
}

impl Default for SmileThresholds {
    fn default() -> Self {
        Self {
            min_width_ratio: 1.25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookUpThresholds {
    /// Maximum ratio of planar brow→nose-tip distance to absolute nose-tip
    /// depth. Pitching the head back compresses the planar distance while
    /// the depth magnitude grows.
    pub max_ratio: f32,
}

impl Default for LookUpThresholds {
    fn default() -> Self {
        Self { max_ratio: 1.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenMouthThresholds {
    /// Minimum vertical inner-lip gap (normalized).
    pub min_lip_gap: f32,
}

impl Default for OpenMouthThresholds {
    fn default() -> Self {
        Self { min_lip_gap: 0.05 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EyebrowThresholds {
    /// Minimum ratio of iris→brow distance to iris→face-top distance,
    /// required on both sides.
    pub min_lift_ratio: f32,
}

impl Default for EyebrowThresholds {
    fn default() -> Self {
        Self {
            min_lift_ratio: 0.36,
        }
    }
}
