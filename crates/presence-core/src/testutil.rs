//! Synthetic landmark fixtures for classifier, containment, and sequencer
//! tests. Key mesh indices are placed at anatomically plausible neutral
//! positions inside the default 1280×720 guide; the mutators move only
//! the points the gesture under test depends on.

use crate::landmarks::{Frame, Landmark, LandmarkSet};
use crate::mesh;

pub(crate) struct FaceBuilder {
    points: Vec<Landmark>,
}

impl FaceBuilder {
    /// A neutral, well-centered face: filler points clustered at frame
    /// center, key indices at rest positions that satisfy no classifier.
    pub fn neutral() -> Self {
        let mut builder = Self {
            points: vec![Landmark::new(0.5, 0.5, -0.03); mesh::REFINED_POINT_COUNT],
        };
        builder
            .set(mesh::NOSE_TIP, 0.50, 0.50, -0.03)
            .set(mesh::FACE_TOP, 0.50, 0.20, 0.0)
            .set(mesh::RIGHT_CHEEK_EDGE, 0.35, 0.52, 0.0)
            .set(mesh::LEFT_CHEEK_EDGE, 0.65, 0.52, 0.0)
            .set(mesh::RIGHT_EYE_TOP, 0.40, 0.42, 0.0)
            .set(mesh::RIGHT_EYE_BOTTOM, 0.40, 0.46, 0.0)
            .set(mesh::LEFT_EYE_TOP, 0.60, 0.42, 0.0)
            .set(mesh::LEFT_EYE_BOTTOM, 0.60, 0.46, 0.0)
            .set(mesh::RIGHT_EYEBROW, 0.40, 0.38, 0.0)
            .set(mesh::LEFT_EYEBROW, 0.60, 0.38, 0.0)
            .set(mesh::RIGHT_EYEBROW_INNER, 0.45, 0.40, 0.0)
            .set(mesh::RIGHT_IRIS_TOP, 0.40, 0.44, 0.0)
            .set(mesh::LEFT_IRIS_TOP, 0.60, 0.44, 0.0)
            .set(mesh::UPPER_LIP, 0.50, 0.575, 0.0)
            .set(mesh::LOWER_LIP, 0.50, 0.585, 0.0)
            .set(mesh::RIGHT_MOUTH_CORNER, 0.44, 0.58, 0.0)
            .set(mesh::LEFT_MOUTH_CORNER, 0.56, 0.58, 0.0);
        builder
    }

    fn set(&mut self, index: usize, x: f32, y: f32, z: f32) -> &mut Self {
        self.points[index] = Landmark::new(x, y, z);
        self
    }

    /// Place an arbitrary point, e.g. to push one landmark outside the
    /// guide ellipse.
    pub fn point(mut self, index: usize, x: f32, y: f32) -> Self {
        self.set(index, x, y, 0.0);
        self
    }

    pub fn nose_at(mut self, x: f32, y: f32) -> Self {
        let z = self.points[mesh::NOSE_TIP].z;
        self.set(mesh::NOSE_TIP, x, y, z);
        self
    }

    pub fn nose_depth(mut self, z: f32) -> Self {
        let nose = self.points[mesh::NOSE_TIP];
        self.set(mesh::NOSE_TIP, nose.x, nose.y, z);
        self
    }

    /// Both eyes nearly shut: tiny eyelid gap, brow ratio close to 1.
    pub fn blink(mut self) -> Self {
        self.set(mesh::RIGHT_EYE_TOP, 0.40, 0.448, 0.0)
            .set(mesh::RIGHT_EYE_BOTTOM, 0.40, 0.452, 0.0)
            .set(mesh::LEFT_EYE_TOP, 0.60, 0.448, 0.0)
            .set(mesh::LEFT_EYE_BOTTOM, 0.60, 0.452, 0.0);
        self
    }

    pub fn blink_right_only(mut self) -> Self {
        self.set(mesh::RIGHT_EYE_TOP, 0.40, 0.448, 0.0)
            .set(mesh::RIGHT_EYE_BOTTOM, 0.40, 0.452, 0.0);
        self
    }

    /// Eyes partly shut: a 0.03 gap that only calibrated (looser)
    /// thresholds accept.
    pub fn half_blink(mut self) -> Self {
        self.set(mesh::RIGHT_EYE_TOP, 0.40, 0.44, 0.0)
            .set(mesh::RIGHT_EYE_BOTTOM, 0.40, 0.47, 0.0)
            .set(mesh::LEFT_EYE_TOP, 0.60, 0.44, 0.0)
            .set(mesh::LEFT_EYE_BOTTOM, 0.60, 0.47, 0.0);
        self
    }

    /// Yawed right: the nose projects past the (also shifted) right cheek
    /// edge while staying within the centering tolerance.
    pub fn turn_right(mut self) -> Self {
        self.set(mesh::NOSE_TIP, 0.44, 0.50, -0.03)
            .set(mesh::RIGHT_CHEEK_EDGE, 0.46, 0.52, 0.0);
        self
    }

    pub fn turn_left(mut self) -> Self {
        self.set(mesh::NOSE_TIP, 0.56, 0.50, -0.03)
            .set(mesh::LEFT_CHEEK_EDGE, 0.54, 0.52, 0.0);
        self
    }

    /// Mouth corners widened toward the cheeks.
    pub fn smile(mut self) -> Self {
        self.set(mesh::RIGHT_MOUTH_CORNER, 0.41, 0.57, 0.0)
            .set(mesh::LEFT_MOUTH_CORNER, 0.59, 0.57, 0.0);
        self
    }

    /// Pitched back: nose depth magnitude grows well past the planar
    /// brow→nose distance.
    pub fn look_up(self) -> Self {
        self.nose_depth(-0.2)
    }

    pub fn open_mouth(mut self) -> Self {
        self.set(mesh::UPPER_LIP, 0.50, 0.57, 0.0)
            .set(mesh::LOWER_LIP, 0.50, 0.64, 0.0);
        self
    }

    pub fn raise_eyebrows(mut self) -> Self {
        self.set(mesh::RIGHT_EYEBROW, 0.40, 0.33, 0.0)
            .set(mesh::LEFT_EYEBROW, 0.60, 0.33, 0.0);
        self
    }

    pub fn raise_right_eyebrow_only(mut self) -> Self {
        self.set(mesh::RIGHT_EYEBROW, 0.40, 0.33, 0.0);
        self
    }

    /// Truncate to the base topology — no refined iris points.
    pub fn without_iris_points(mut self) -> Self {
        self.points.truncate(mesh::BASE_POINT_COUNT);
        self
    }

    pub fn build(self) -> LandmarkSet {
        LandmarkSet::new(self.points).expect("fixture has enough points")
    }

    pub fn frame(self) -> Frame {
        Frame::new(self.build())
    }
}
