//! Spatial components for entities that act as driving nodes.

use glam::{Mat4, Quat, Vec3};

/// Local transform relative to the parent entity, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Scale, then rotate, then translate.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Split an affine matrix. Shear is lost.
    pub fn from_matrix(mat: Mat4) -> Self {
        let (scale, rotation, position) = mat.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// World transform, written by [`transform_system`](crate::ecs::systems::transform_system).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalTransform(pub Mat4);

impl Default for GlobalTransform {
    fn default() -> Self {
        Self(Mat4::IDENTITY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub hecs::Entity);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children(pub Vec<hecs::Entity>);

/// Value read by scalar joints controlled by this entity. Without it the
/// X translation of the entity's transform is used.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScalarValue(pub f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let t = Transform::default();
        assert_eq!(t, Transform::identity());
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
        assert_eq!(GlobalTransform::default().0, Mat4::IDENTITY);
    }

    #[test]
    fn test_matrix_split() {
        let original = Transform::from_position(Vec3::new(0.0, 1.0, 4.0))
            .with_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_3));
        let recovered = Transform::from_matrix(original.to_matrix());

        let eps = 1e-5;
        assert!((original.position - recovered.position).length() < eps);
        assert!((original.rotation.dot(recovered.rotation).abs() - 1.0).abs() < eps);
        assert!((recovered.scale - Vec3::ONE).length() < eps);
    }
}
