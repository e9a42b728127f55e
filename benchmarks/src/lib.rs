//! Scene builders shared by the benchmarks.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use kinema::chan::{MatrixChannel, MatrixTable};
use kinema::{
    AnimBundle, AnimChannel, AnimGroup, CollisionEntry, CollisionFloorMesh, CollisionRay,
    CollisionSphere, HierarchyMatchFlags, Joint, PartBundle, PartGroup, PartSubset,
};

/// Rolling terrain of `n` x `n` unit quads, two triangles each.
pub fn floor_grid(n: u32) -> CollisionFloorMesh {
    let mut mesh = CollisionFloorMesh::new();
    let height = |x: u32, y: u32| ((x as f32) * 0.7).sin() + ((y as f32) * 0.3).cos();
    for y in 0..=n {
        for x in 0..=n {
            mesh.add_vertex(Vec3::new(x as f32, y as f32, height(x, y)));
        }
    }
    let row = n + 1;
    for y in 0..n {
        for x in 0..n {
            let i = y * row + x;
            mesh.add_triangle(i, i + 1, i + row + 1);
            mesh.add_triangle(i, i + row + 1, i + row);
        }
    }
    mesh
}

/// Downward rays spread over the grid.
pub fn drop_rays(mesh: &Arc<CollisionFloorMesh>, n: u32, count: usize) -> Vec<CollisionEntry> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            let x = (t * 7919.0).fract() * n as f32;
            let y = (t * 104_729.0).fract() * n as f32;
            let ray = CollisionRay::new(Vec3::new(x, y, 10.0), Vec3::new(0.0, 0.0, -1.0));
            CollisionEntry::new(Arc::new(ray), mesh.clone(), Mat4::IDENTITY)
        })
        .collect()
}

/// Pairs of spheres at a random-looking spread of offsets.
pub fn sphere_pairs(count: usize) -> Vec<CollisionEntry> {
    (0..count)
        .map(|i| {
            let angle = i as f32 * 2.399;
            let spread = 1.0 + (i % 3) as f32;
            let offset = Vec3::new(angle.cos(), angle.sin(), (i % 7) as f32 * 0.1) * spread;
            CollisionEntry::new(
                Arc::new(CollisionSphere::new(offset, 1.0)),
                Arc::new(CollisionSphere::new(Vec3::ZERO, 1.5)),
                Mat4::IDENTITY,
            )
        })
        .collect()
}

fn joint_name(path: &[usize]) -> String {
    let parts: Vec<String> = path.iter().map(usize::to_string).collect();
    format!("j{}", parts.join("_"))
}

/// A skeleton with `fanout` children per joint, `depth` joints deep.
pub fn skeleton(depth: usize, fanout: usize) -> PartBundle {
    fn grow(group: &mut PartGroup, path: &mut Vec<usize>, depth: usize, fanout: usize) {
        if path.len() == depth {
            return;
        }
        for i in 0..fanout {
            path.push(i);
            let child = group.add_child(
                PartGroup::with_joint(joint_name(path), Joint::matrix(Mat4::IDENTITY)),
            );
            grow(child, path, depth, fanout);
            path.pop();
        }
    }

    let mut bundle = PartBundle::new("body");
    grow(bundle.root_mut(), &mut Vec::new(), depth, fanout);
    bundle.sort_descendants();
    bundle
}

/// An animation for [`skeleton`] with `frames` frames of swaying joints.
pub fn sway(depth: usize, fanout: usize, frames: usize, phase: f32) -> Arc<AnimBundle> {
    fn channel(frames: usize, phase: f32) -> AnimChannel {
        let table = MatrixTable {
            rotation: (0..frames)
                .map(|f| Quat::from_rotation_x((f as f32 * 0.1 + phase).sin() * 0.5))
                .collect(),
            translation: vec![Vec3::new(0.0, 0.0, 1.0)],
            ..MatrixTable::default()
        };
        AnimChannel::Matrix(MatrixChannel::Table(table))
    }

    fn grow(
        group: &mut AnimGroup,
        path: &mut Vec<usize>,
        depth: usize,
        fanout: usize,
        frames: usize,
        phase: f32,
    ) {
        if path.len() == depth {
            return;
        }
        for i in 0..fanout {
            path.push(i);
            let child = group.add_child(
                AnimGroup::with_channel(joint_name(path), channel(frames, phase)),
            );
            grow(child, path, depth, fanout, frames, phase);
            path.pop();
        }
    }

    let mut anim = AnimBundle::new("body", 30.0, frames);
    if depth > 0 {
        for i in 0..fanout {
            let mut path = vec![i];
            let child = anim.add_child(
                AnimGroup::with_channel(joint_name(&path), channel(frames, phase)),
            );
            grow(child, &mut path, depth, fanout, frames, phase);
        }
    }
    anim.sort_descendants();
    Arc::new(anim)
}

/// [`skeleton`] with `layers` looping animations blended together.
pub fn blended_skeleton(depth: usize, fanout: usize, layers: usize) -> PartBundle {
    let mut bundle = skeleton(depth, fanout);
    bundle.set_anim_blend_flag(true);
    for layer in 0..layers {
        let anim = sway(depth, fanout, 60, layer as f32);
        if let Ok(id) = bundle.bind_anim(anim, HierarchyMatchFlags::empty(), &PartSubset::new()) {
            let _ = bundle.loop_anim(id, true);
            let _ = bundle.set_control_effect(id, 1.0 + layer as f32);
        }
    }
    bundle
}
