//! Transform hierarchy propagation.

use glam::Mat4;

use crate::ecs::components::{Children, GlobalTransform, Parent, Transform};

/// Write every `GlobalTransform` from the `Parent`/`Children` hierarchy.
///
/// Roots are entities with a `Transform` and no `Parent`. Children without
/// a `Transform` take their parent's world transform.
pub fn transform_system(world: &mut hecs::World) {
    let mut stack: Vec<(hecs::Entity, Mat4)> = world
        .query_mut::<hecs::Without<&Transform, &Parent>>()
        .into_iter()
        .map(|(entity, transform)| (entity, transform.to_matrix()))
        .collect();

    while let Some((entity, global)) = stack.pop() {
        if let Ok(mut target) = world.get::<&mut GlobalTransform>(entity) {
            target.0 = global;
        }
        let Ok(children) = world.get::<&Children>(entity) else {
            continue;
        };
        for &child in &children.0 {
            let local = world
                .get::<&Transform>(child)
                .map(|transform| transform.to_matrix())
                .unwrap_or(Mat4::IDENTITY);
            stack.push((child, global * local));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn test_root_entity() {
        let mut world = hecs::World::new();
        let pos = Vec3::new(1.0, 2.0, 3.0);
        let entity = world.spawn((Transform::from_position(pos), GlobalTransform::default()));

        transform_system(&mut world);

        assert_eq!(world.get::<&GlobalTransform>(entity).unwrap().0, Mat4::from_translation(pos));
    }

    #[test]
    fn test_chain_with_rotation() {
        let mut world = hecs::World::new();
        // Parent turned 90 degrees about Z; the child's +X offset lands on +Y.
        let parent = world.spawn((
            Transform::from_position(Vec3::new(0.0, 0.0, 1.0))
                .with_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
            GlobalTransform::default(),
        ));
        let child = world.spawn((
            Transform::from_position(Vec3::new(2.0, 0.0, 0.0)),
            GlobalTransform::default(),
            Parent(parent),
        ));
        let grandchild = world.spawn((GlobalTransform::default(), Parent(child)));
        world.insert_one(parent, Children(vec![child])).unwrap();
        world.insert_one(child, Children(vec![grandchild])).unwrap();

        transform_system(&mut world);

        let eps = 1e-5;
        let expected = Vec3::new(0.0, 2.0, 1.0);
        for entity in [child, grandchild] {
            let global = world.get::<&GlobalTransform>(entity).unwrap().0;
            let actual = global.transform_point3(Vec3::ZERO);
            assert!(
                (actual - expected).length() < eps,
                "Expected {:?}, got {:?}",
                expected,
                actual
            );
        }
    }
}
