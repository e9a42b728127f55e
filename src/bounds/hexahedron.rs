//! Convex six-sided volume given by eight corner points.

use glam::{Mat4, Vec3};

use crate::math::Plane;

/// A convex hexahedron.
///
/// Corners are ordered far-lower-left, far-lower-right, far-upper-right,
/// far-upper-left, then the same four on the near face. The six face planes
/// always point outward, whatever winding the corners were given in.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingHexahedron {
    points: [Vec3; 8],
    planes: [Plane; 6],
    centroid: Vec3,
}

impl BoundingHexahedron {
    pub fn new(points: [Vec3; 8]) -> Self {
        let centroid = points.iter().copied().sum::<Vec3>() / 8.0;
        let planes = Self::face_planes(&points, centroid);
        Self {
            points,
            planes,
            centroid,
        }
    }

    fn face_planes(p: &[Vec3; 8], centroid: Vec3) -> [Plane; 6] {
        let first = Plane::from_points(p[0], p[3], p[2]);
        if first.dist_to_plane(centroid) > 0.0 {
            // Corners wound the other way; build every plane reversed.
            [
                Plane::from_points(p[0], p[2], p[3]),
                Plane::from_points(p[0], p[5], p[1]),
                Plane::from_points(p[1], p[6], p[2]),
                Plane::from_points(p[2], p[7], p[3]),
                Plane::from_points(p[3], p[4], p[0]),
                Plane::from_points(p[4], p[7], p[6]),
            ]
        } else {
            [
                first,
                Plane::from_points(p[0], p[1], p[5]),
                Plane::from_points(p[1], p[2], p[6]),
                Plane::from_points(p[2], p[3], p[7]),
                Plane::from_points(p[3], p[0], p[4]),
                Plane::from_points(p[4], p[6], p[7]),
            ]
        }
    }

    pub fn points(&self) -> &[Vec3; 8] {
        &self.points
    }

    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// A point is inside when it is behind every face plane.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.dist_to_plane(point) <= 0.0)
    }

    /// Whether a sphere overlaps the hexahedron. Conservative near edges.
    pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.dist_to_plane(center) <= radius)
    }

    pub fn xform(&self, mat: &Mat4) -> Self {
        Self::new(self.points.map(|p| mat.transform_point3(p)))
    }
}
