//! Infinite plane in 3D space.

use glam::{Mat4, Vec3, Vec4};

use super::{is_nearly_zero, Parabola};

/// A plane defined by the equation `normal · p + d = 0`.
///
/// The normal is kept unit length. Points with a positive distance are in
/// front of the plane (on the side the normal points to).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal.
    pub normal: Vec3,
    /// Distance term of the plane equation.
    pub d: f32,
}

impl Plane {
    /// Create a plane from a normal (normalized here) and the `d` term.
    pub fn new(normal: Vec3, d: f32) -> Self {
        let len = normal.length();
        if len > 0.0 {
            Self {
                normal: normal / len,
                d: d / len,
            }
        } else {
            Self { normal, d }
        }
    }

    /// Create a plane through `point` with the given normal.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            d: -normal.dot(point),
        }
    }

    /// Create a plane through three points, counter-clockwise winding
    /// facing the normal.
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            normal,
            d: -normal.dot(a),
        }
    }

    /// Plane coefficients as `(a, b, c, d)`.
    pub fn to_vec4(&self) -> Vec4 {
        self.normal.extend(self.d)
    }

    /// Signed distance from `point` to the plane.
    #[inline]
    pub fn dist_to_plane(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// The point on the plane closest to the origin.
    pub fn point(&self) -> Vec3 {
        self.normal * -self.d
    }

    /// Solve for the parameter `t` where `from + t * delta` crosses the plane.
    ///
    /// Returns `None` when the line is parallel to the plane.
    pub fn intersects_line(&self, from: Vec3, delta: Vec3) -> Option<f32> {
        let denom = self.normal.dot(delta);
        if denom == 0.0 {
            return None;
        }
        Some(-(self.dist_to_plane(from) / denom))
    }

    /// Solve for the parameters where the parabola crosses the plane.
    ///
    /// Returns both roots of the quadratic; when the parabola degenerates
    /// into a line both roots are equal. `None` means the infinite parabola
    /// never reaches the plane.
    pub fn intersects_parabola(&self, parabola: &Parabola) -> Option<(f32, f32)> {
        let a = self.normal.dot(parabola.a);
        let b = self.normal.dot(parabola.b);
        let c = self.dist_to_plane(parabola.c);

        if is_nearly_zero(a) {
            // Linear in t.
            if is_nearly_zero(b) {
                return None;
            }
            let t = -c / b;
            return Some((t, t));
        }

        let radical = b * b - 4.0 * a * c;
        if radical < 0.0 {
            return None;
        }
        let sqrt_radical = radical.sqrt();
        let t1 = (-b + sqrt_radical) / (2.0 * a);
        let t2 = (-b - sqrt_radical) / (2.0 * a);
        Some((t1, t2))
    }

    /// Transform the plane by `mat`.
    ///
    /// Normals transform by the inverse-transpose so that non-uniform scale
    /// keeps the plane perpendicular to its normal.
    pub fn xform(&self, mat: &Mat4) -> Self {
        let point = mat.transform_point3(self.point());
        let normal_mat = mat.inverse().transpose();
        let normal = normal_mat.transform_vector3(self.normal);
        Self::from_point_normal(point, normal)
    }
}

impl Default for Plane {
    /// The XY plane facing +Z.
    fn default() -> Self {
        Self {
            normal: Vec3::Z,
            d: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dist_to_plane() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 0.0, 2.0), Vec3::Z);
        let eps = 1e-6;
        assert!((plane.dist_to_plane(Vec3::new(5.0, -3.0, 5.0)) - 3.0).abs() < eps);
        assert!((plane.dist_to_plane(Vec3::ZERO) + 2.0).abs() < eps);
    }

    #[test]
    fn test_from_points_winding() {
        let plane = Plane::from_points(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!((plane.normal - Vec3::Z).length() < 1e-6);
        assert!(plane.d.abs() < 1e-6);
    }

    #[test]
    fn test_intersects_line() {
        let plane = Plane::default();
        let t = plane
            .intersects_line(Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.0, 0.0, -2.0))
            .unwrap();
        assert!((t - 2.0).abs() < 1e-6);
        assert!(plane.intersects_line(Vec3::Z, Vec3::X).is_none());
    }

    #[test]
    fn test_intersects_parabola() {
        // Thrown straight up from z = 0 with gravity pulling down.
        let parabola = Parabola::new(
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::ZERO,
        );
        let (t1, t2) = Plane::default().intersects_parabola(&parabola).unwrap();
        let (lo, hi) = (t1.min(t2), t1.max(t2));
        assert!(lo.abs() < 1e-5);
        assert!((hi - 4.0).abs() < 1e-5);

        let high = Plane::from_point_normal(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(high.intersects_parabola(&parabola).is_none());
    }

    #[test]
    fn test_xform_translation() {
        let plane = Plane::default();
        let moved = plane.xform(&Mat4::from_translation(Vec3::new(0.0, 0.0, 3.0)));
        assert!((moved.normal - Vec3::Z).length() < 1e-6);
        assert!((moved.dist_to_plane(Vec3::new(1.0, 1.0, 3.0))).abs() < 1e-5);
    }
}
