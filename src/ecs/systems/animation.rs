//! Skeleton playback and joint exposure.

use glam::Mat4;
use tracing::trace;

use crate::ecs::components::{ExposedJoint, GlobalTransform, Skeleton};

/// Advance every skeleton's controls by `dt` and recompute its joints.
///
/// Controlled joints read their nodes from the same world, so run
/// [`transform_system`](super::transform_system) first.
pub fn animation_system(world: &mut hecs::World, dt: f32) {
    let world = &*world;
    let mut changed = 0usize;
    for (_, skeleton) in world.query::<&mut Skeleton>().iter() {
        skeleton.0.advance(dt);
        if skeleton.0.update(world) {
            changed += 1;
        }
    }
    trace!(target: "chan", "{} skeletons changed", changed);
}

/// Copy joint net transforms onto entities with an [`ExposedJoint`].
pub fn exposed_joint_system(world: &mut hecs::World) {
    let updates: Vec<(hecs::Entity, Mat4)> = world
        .query::<&ExposedJoint>()
        .iter()
        .filter_map(|(entity, exposed)| {
            let skeleton = world.get::<&Skeleton>(exposed.skeleton).ok()?;
            let joint = skeleton.0.joint(&exposed.joint)?;
            let base = world
                .get::<&GlobalTransform>(exposed.skeleton)
                .map(|global| global.0)
                .unwrap_or(Mat4::IDENTITY);
            let net = base * joint.net_transform();
            Some((entity, net))
        })
        .collect();

    for (entity, net) in updates {
        if let Ok(mut global) = world.get::<&mut GlobalTransform>(entity) {
            global.0 = net;
        }
    }
}
