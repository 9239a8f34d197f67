//! Inbound frame data: landmark points, landmark sets, and the opaque
//! snapshot handle carried through pass signals.

use std::fmt;
use std::sync::Arc;

use crate::error::InputError;
use crate::mesh;

/// A single facial keypoint in normalized coordinates: `x`/`y` are
/// fractions of frame width/height in `[0, 1]`, `z` is a relative depth
/// (negative toward the camera in the FaceMesh convention).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Planar projection, the form most classifier distances use.
    pub fn xy(&self) -> [f32; 2] {
        [self.x, self.y]
    }
}

/// An ordered, fixed-size landmark sequence indexed by the FaceMesh
/// topology (see [`crate::mesh`]). Construction rejects sets smaller than
/// the base topology; indexed access is checked so a missing refined index
/// surfaces as a typed [`InputError`] instead of a panic.
#[derive(Debug, Clone)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Result<Self, InputError> {
        if points.len() < mesh::BASE_POINT_COUNT {
            return Err(InputError::TooFewLandmarks {
                got: points.len(),
                expected: mesh::BASE_POINT_COUNT,
            });
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Checked access by mesh index.
    pub fn get(&self, index: usize) -> Result<Landmark, InputError> {
        self.points
            .get(index)
            .copied()
            .ok_or(InputError::MissingLandmark {
                index,
                len: self.points.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.points.iter()
    }
}

/// Opaque, cheaply clonable handle to the raw frame pixels captured with a
/// landmark set. The engine never inspects the contents; the handle is
/// cloned into `TaskPassed` signals so listeners can persist or display
/// the image that satisfied the gesture.
#[derive(Clone)]
pub struct Snapshot {
    data: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl Snapshot {
    /// Wrap a tightly packed RGB8 pixel buffer.
    pub fn rgb8(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            data: data.into(),
            width,
            height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Snapshot({}x{}, {} bytes)",
            self.width,
            self.height,
            self.data.len()
        )
    }
}

/// One unit of inbound work: the landmarks detected in a camera frame and,
/// optionally, the frame image itself for pass-time snapshotting.
#[derive(Debug, Clone)]
pub struct Frame {
    pub landmarks: LandmarkSet,
    pub snapshot: Option<Snapshot>,
}

impl Frame {
    pub fn new(landmarks: LandmarkSet) -> Self {
        Self {
            landmarks,
            snapshot: None,
        }
    }

    pub fn with_snapshot(landmarks: LandmarkSet, snapshot: Snapshot) -> Self {
        Self {
            landmarks,
            snapshot: Some(snapshot),
        }
    }
}
