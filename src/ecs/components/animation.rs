//! Components that put skeletons into the world.

use crate::chan::PartBundle;

/// An animated skeleton owned by an entity.
#[derive(Debug, Clone)]
pub struct Skeleton(pub PartBundle);

/// Places this entity at a joint of another entity's [`Skeleton`].
///
/// [`exposed_joint_system`](crate::ecs::systems::exposed_joint_system)
/// writes the joint's net transform, taken through the skeleton entity's
/// world transform, into this entity's `GlobalTransform`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposedJoint {
    pub skeleton: hecs::Entity,
    pub joint: String,
}

impl ExposedJoint {
    pub fn new(skeleton: hecs::Entity, joint: impl Into<String>) -> Self {
        Self {
            skeleton,
            joint: joint.into(),
        }
    }
}
