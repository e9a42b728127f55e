//! Geometric primitives shared by collision solids and bounding volumes.
//!
//! The world is Z-up: "vertical" means along ±Z, and the floor mesh
//! projects onto the XY plane.

pub mod parabola;
pub mod plane;

pub use parabola::Parabola;
pub use plane::Plane;

/// Values closer to zero than this are treated as zero by the quadratic solvers.
pub(crate) const NEARLY_ZERO: f32 = 1.0e-6;

#[inline]
pub(crate) fn is_nearly_zero(value: f32) -> bool {
    value.abs() < NEARLY_ZERO
}
