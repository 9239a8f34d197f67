//! The elliptical guide region and the per-frame face containment check
//! that gates gesture evaluation.

use serde::Deserialize;

use crate::error::InputError;
use crate::geometry::distance;
use crate::landmarks::LandmarkSet;
use crate::mesh;

/// Default horizontal guide radius as a fraction of frame width.
pub const DEFAULT_RADIUS_X_FRAC: f32 = 0.2;

/// Default vertical guide radius as a fraction of frame height.
pub const DEFAULT_RADIUS_Y_FRAC: f32 = 0.4;

/// Nose-tip centering tolerance as a fraction of the smaller guide radius.
const CENTER_TOLERANCE: f32 = 0.5;

/// The on-screen ellipse the subject's face must occupy. Centered on the
/// frame; radii are fractions of the frame dimensions so the same
/// configuration fits any resolution.
#[derive(Debug, Clone)]
pub struct GuideRegion {
    width: f32,
    height: f32,
    radius_x_frac: f32,
    radius_y_frac: f32,
}

impl GuideRegion {
    /// Guide with the canonical radii for the given frame dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_radii(width, height, DEFAULT_RADIUS_X_FRAC, DEFAULT_RADIUS_Y_FRAC)
    }

    pub fn with_radii(width: u32, height: u32, radius_x_frac: f32, radius_y_frac: f32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            radius_x_frac,
            radius_y_frac,
        }
    }

    /// Ellipse center in pixels.
    pub fn center(&self) -> [f32; 2] {
        [self.width / 2.0, self.height / 2.0]
    }

    /// Ellipse radii in pixels.
    pub fn radii(&self) -> [f32; 2] {
        [
            self.width * self.radius_x_frac,
            self.height * self.radius_y_frac,
        ]
    }

    /// Whether the face is acceptably placed: the entire silhouette lies
    /// within the ellipse, and the nose tip sits within half the smaller
    /// radius of the center.
    pub fn contains(&self, landmarks: &LandmarkSet) -> Result<bool, InputError> {
        let [cx, cy] = self.center();
        let [rx, ry] = self.radii();

        let nose = landmarks.get(mesh::NOSE_TIP)?;

        let all_inside = landmarks.iter().all(|p| {
            let nx = (p.x * self.width - cx) / rx;
            let ny = (p.y * self.height - cy) / ry;
            nx * nx + ny * ny <= 1.0
        });

        let nose_offset = distance([nose.x * self.width, nose.y * self.height], [cx, cy]);
        Ok(all_inside && nose_offset <= rx.min(ry) * CENTER_TOLERANCE)
    }
}

/// Visual styling for the guide overlay, passed through to external
/// renderers. Deserialization ignores unrecognized options rather than
/// rejecting them, so newer frontends can carry extra keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Stroke color of the guide ellipse (any CSS color string).
    pub stroke_color: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            stroke_color: "blue".to_string(),
        }
    }
}
