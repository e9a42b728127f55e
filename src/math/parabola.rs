//! Parametric parabola `p(t) = a t² + b t + c`.

use glam::{Mat4, Vec3};

/// A parabolic arc in 3D space.
///
/// `a` is typically half the gravity vector, `b` the initial velocity and
/// `c` the launch point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parabola {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Parabola {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Point on the parabola at parameter `t`.
    #[inline]
    pub fn calc_point(&self, t: f32) -> Vec3 {
        self.a * (t * t) + self.b * t + self.c
    }

    /// Transform the parabola by `mat`. `a` and `b` are directions, `c` is a point.
    pub fn xform(&self, mat: &Mat4) -> Self {
        Self {
            a: mat.transform_vector3(self.a),
            b: mat.transform_vector3(self.b),
            c: mat.transform_point3(self.c),
        }
    }
}

impl Default for Parabola {
    fn default() -> Self {
        Self {
            a: Vec3::ZERO,
            b: Vec3::Y,
            c: Vec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_point() {
        let p = Parabola::new(Vec3::new(0.0, 0.0, -4.9), Vec3::new(1.0, 0.0, 9.8), Vec3::ZERO);
        let pt = p.calc_point(1.0);
        let eps = 1e-5;
        assert!((pt - Vec3::new(1.0, 0.0, 4.9)).length() < eps);
    }

    #[test]
    fn test_xform_keeps_shape() {
        let p = Parabola::new(Vec3::new(0.0, 0.0, -1.0), Vec3::X, Vec3::ZERO);
        let moved = p.xform(&Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)));
        assert_eq!(moved.a, p.a);
        assert_eq!(moved.b, p.b);
        assert!((moved.calc_point(2.0) - (p.calc_point(2.0) + Vec3::Y * 5.0)).length() < 1e-5);
    }
}
