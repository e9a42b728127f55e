//! Bounding sphere.

use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Smallest sphere around the two points.
    pub fn around_segment(a: Vec3, b: Vec3) -> Self {
        Self {
            center: (a + b) * 0.5,
            radius: a.distance(b) * 0.5,
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }

    /// Transform the sphere, scaling the radius by the largest axis scale.
    pub fn xform(&self, mat: &Mat4) -> Self {
        let scale_x = mat.x_axis.truncate().length();
        let scale_y = mat.y_axis.truncate().length();
        let scale_z = mat.z_axis.truncate().length();
        Self {
            center: mat.transform_point3(self.center),
            radius: self.radius * scale_x.max(scale_y).max(scale_z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_around_segment() {
        let sphere = BoundingSphere::around_segment(Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(sphere.center, Vec3::new(0.0, 2.0, 0.0));
        assert!((sphere.radius - 2.0).abs() < 1e-6);
        assert!(sphere.contains_point(Vec3::new(0.0, 4.0, 0.0)));
        assert!(!sphere.contains_point(Vec3::new(0.0, 4.1, 0.0)));
    }

    #[test]
    fn test_xform_scales_radius() {
        let sphere = BoundingSphere::new(Vec3::ZERO, 1.0);
        let mat = Mat4::from_scale(Vec3::new(1.0, 3.0, 2.0));
        let scaled = sphere.xform(&mat);
        assert!((scaled.radius - 3.0).abs() < 1e-6);
    }
}
