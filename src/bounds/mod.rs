//! Bounding volumes computed by collision solids.
//!
//! A solid's internal bounds are computed lazily in the solid's own
//! coordinate space and dropped whenever the solid is transformed.

pub mod aabb;
pub mod hexahedron;
pub mod sphere;

use glam::{Mat4, Vec3};

use crate::math::Plane;

pub use aabb::BoundingBox;
pub use hexahedron::BoundingHexahedron;
pub use sphere::BoundingSphere;

/// An infinite line used to bound rays and lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingLine {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl BoundingLine {
    /// Distance from `point` to the infinite line.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        let dir = self.direction.normalize_or_zero();
        let offset = point - self.origin;
        (offset - dir * offset.dot(dir)).length()
    }
}

/// Any of the bounding volume shapes a solid may report.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundingVolume {
    /// Contains nothing.
    Empty,
    Sphere(BoundingSphere),
    Box(BoundingBox),
    Hexahedron(BoundingHexahedron),
    /// Everything behind the plane.
    Plane(Plane),
    Line(BoundingLine),
}

impl BoundingVolume {
    pub fn is_empty(&self) -> bool {
        matches!(self, BoundingVolume::Empty)
    }

    /// Whether `point` lies inside (or on) the volume.
    pub fn contains_point(&self, point: Vec3) -> bool {
        match self {
            BoundingVolume::Empty => false,
            BoundingVolume::Sphere(sphere) => sphere.contains_point(point),
            BoundingVolume::Box(aabb) => aabb.contains_point(point),
            BoundingVolume::Hexahedron(hex) => hex.contains_point(point),
            BoundingVolume::Plane(plane) => plane.dist_to_plane(point) <= 0.0,
            BoundingVolume::Line(line) => line.distance_to(point) <= crate::math::NEARLY_ZERO,
        }
    }

    /// A representative center point, if the volume is finite.
    pub fn approx_center(&self) -> Option<Vec3> {
        match self {
            BoundingVolume::Empty | BoundingVolume::Plane(_) | BoundingVolume::Line(_) => None,
            BoundingVolume::Sphere(sphere) => Some(sphere.center),
            BoundingVolume::Box(aabb) => Some(aabb.center()),
            BoundingVolume::Hexahedron(hex) => Some(hex.centroid()),
        }
    }

    /// Transform the volume by `mat`.
    ///
    /// An axis-aligned box stays axis-aligned and grows to enclose its
    /// transformed corners.
    pub fn xform(&self, mat: &Mat4) -> Self {
        match self {
            BoundingVolume::Empty => BoundingVolume::Empty,
            BoundingVolume::Sphere(sphere) => BoundingVolume::Sphere(sphere.xform(mat)),
            BoundingVolume::Box(aabb) => BoundingVolume::Box(aabb.xform(mat)),
            BoundingVolume::Hexahedron(hex) => BoundingVolume::Hexahedron(hex.xform(mat)),
            BoundingVolume::Plane(plane) => BoundingVolume::Plane(plane.xform(mat)),
            BoundingVolume::Line(line) => BoundingVolume::Line(BoundingLine {
                origin: mat.transform_point3(line.origin),
                direction: mat.transform_vector3(line.direction),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_contains_nothing() {
        assert!(!BoundingVolume::Empty.contains_point(Vec3::ZERO));
        assert!(BoundingVolume::Empty.approx_center().is_none());
    }

    #[test]
    fn test_plane_contains_behind() {
        let volume = BoundingVolume::Plane(Plane::default());
        assert!(volume.contains_point(Vec3::new(0.0, 0.0, -1.0)));
        assert!(!volume.contains_point(Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_line_contains_points_on_line() {
        let volume = BoundingVolume::Line(BoundingLine {
            origin: Vec3::ZERO,
            direction: Vec3::new(0.0, 0.0, -2.0),
        });
        assert!(volume.contains_point(Vec3::new(0.0, 0.0, 7.0)));
        assert!(!volume.contains_point(Vec3::new(0.5, 0.0, 7.0)));
    }
}
