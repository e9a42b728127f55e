//! Lets a `hecs::World` serve as the node registry for controlled joints.

use glam::Mat4;

use crate::ecs::components::{GlobalTransform, ScalarValue, Transform};
use crate::node::{NodeHandle, NodeSource};

impl From<hecs::Entity> for NodeHandle {
    fn from(entity: hecs::Entity) -> Self {
        NodeHandle(entity.to_bits().get())
    }
}

/// The entity a handle was made from, if the bits are a valid entity.
pub fn node_entity(node: NodeHandle) -> Option<hecs::Entity> {
    hecs::Entity::from_bits(node.0)
}

/// Nodes are entities. The world transform is `GlobalTransform` when
/// present, else the local `Transform`.
impl NodeSource for hecs::World {
    fn node_transform(&self, node: NodeHandle) -> Option<Mat4> {
        let entity = node_entity(node)?;
        if let Ok(global) = self.get::<&GlobalTransform>(entity) {
            return Some(global.0);
        }
        self.get::<&Transform>(entity).ok().map(|t| t.to_matrix())
    }

    fn node_scalar(&self, node: NodeHandle) -> Option<f32> {
        let entity = node_entity(node)?;
        if let Ok(value) = self.get::<&ScalarValue>(entity) {
            return Some(value.0);
        }
        self.node_transform(node).map(|mat| mat.w_axis.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_entity_handle_roundtrip() {
        let mut world = hecs::World::new();
        let entity = world.spawn((Transform::identity(),));
        assert_eq!(node_entity(NodeHandle::from(entity)), Some(entity));
        assert_eq!(node_entity(NodeHandle(0)), None);
    }

    #[test]
    fn test_world_prefers_global_transform() {
        let mut world = hecs::World::new();
        let local_only = world.spawn((Transform::from_position(Vec3::new(1.0, 0.0, 0.0)),));
        let both = world.spawn((
            Transform::from_position(Vec3::new(1.0, 0.0, 0.0)),
            GlobalTransform(Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0))),
        ));
        let bare = world.spawn((ScalarValue(0.5),));

        assert_eq!(world.node_scalar(local_only.into()), Some(1.0));
        assert_eq!(world.node_scalar(both.into()), Some(5.0));
        assert_eq!(world.node_scalar(bare.into()), Some(0.5));
        assert_eq!(world.node_transform(bare.into()), None);
    }

    #[test]
    fn test_despawned_node() {
        let mut world = hecs::World::new();
        let entity = world.spawn((GlobalTransform::default(),));
        world.despawn(entity).unwrap();
        assert_eq!(world.node_transform(entity.into()), None);
    }
}
