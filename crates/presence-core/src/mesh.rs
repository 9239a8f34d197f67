//! MediaPipe FaceMesh index contract.
//!
//! The external landmark detector emits a fixed-size sequence of points
//! whose positions are defined by the FaceMesh topology: 468 base points,
//! 478 when iris refinement is enabled. The indices below are the stable
//! anatomical picks used by the containment check and the gesture
//! classifiers. Side names are the *subject's* side — in unmirrored camera
//! coordinates the subject's right appears at smaller x.

/// Base FaceMesh point count; the minimum accepted landmark set size.
pub const BASE_POINT_COUNT: usize = 468;

/// Point count with iris refinement (indices 468–477 are iris points).
pub const REFINED_POINT_COUNT: usize = 478;

/// Nose tip.
pub const NOSE_TIP: usize = 1;

/// Topmost point of the face oval (forehead apex).
pub const FACE_TOP: usize = 10;

/// Face-oval edge at the subject's right cheek, used as the head-turn
/// crossing reference and the right smile anchor.
pub const RIGHT_CHEEK_EDGE: usize = 93;

/// Face-oval edge at the subject's left cheek.
pub const LEFT_CHEEK_EDGE: usize = 323;

/// Upper eyelid midpoint, right eye.
pub const RIGHT_EYE_TOP: usize = 159;

/// Lower eyelid midpoint, right eye.
pub const RIGHT_EYE_BOTTOM: usize = 145;

/// Upper eyelid midpoint, left eye.
pub const LEFT_EYE_TOP: usize = 386;

/// Lower eyelid midpoint, left eye.
pub const LEFT_EYE_BOTTOM: usize = 374;

/// Mid-arch eyebrow point, right side.
pub const RIGHT_EYEBROW: usize = 65;

/// Mid-arch eyebrow point, left side.
pub const LEFT_EYEBROW: usize = 295;

/// Inner right eyebrow point, the look-up pitch reference.
pub const RIGHT_EYEBROW_INNER: usize = 55;

/// Upper iris point, right eye (requires iris refinement).
pub const RIGHT_IRIS_TOP: usize = 470;

/// Upper iris point, left eye (requires iris refinement).
pub const LEFT_IRIS_TOP: usize = 475;

/// Inner upper-lip midpoint.
pub const UPPER_LIP: usize = 13;

/// Inner lower-lip midpoint.
pub const LOWER_LIP: usize = 14;

/// Mouth corner, subject's right.
pub const RIGHT_MOUTH_CORNER: usize = 61;

/// Mouth corner, subject's left.
pub const LEFT_MOUTH_CORNER: usize = 291;
