//! Skeletons and animations written to disk, loaded back and bound.

use std::path::PathBuf;
use std::sync::Arc;

use kinema::chan::{MatrixTable, ScalarChannel};
use kinema::glam::{Mat4, Vec3};
use kinema::{
    AnimBundle, AnimChannel, AnimGroup, BlendType, HierarchyMatchFlags, Joint, PartBundle,
    PartGroup, PartSubset,
};

fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("kinema-{}-{}", std::process::id(), name))
}

#[test]
fn test_load_and_bind() {
    let mut skeleton = PartBundle::new("crane");
    skeleton.set_blend_type(BlendType::Componentwise);
    let boom = skeleton.add_child(PartGroup::with_joint("boom", Joint::matrix(Mat4::IDENTITY)));
    boom.add_child(PartGroup::with_joint("hook", Joint::scalar(0.0)));
    skeleton.sort_descendants();

    let mut anim = AnimBundle::new("crane", 10.0, 3);
    let boom = anim.add_child(AnimGroup::with_channel(
        "boom",
        AnimChannel::Matrix(kinema::chan::MatrixChannel::Table(MatrixTable::from_translations(vec![
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 2.0),
        ]))),
    ));
    boom.add_child(AnimGroup::with_channel(
        "hook",
        AnimChannel::Scalar(ScalarChannel::Table(vec![0.0, -1.0, -2.0])),
    ));
    anim.sort_descendants();

    let skeleton_path = scratch_file("crane.bam");
    let anim_path = scratch_file("crane-lift.bam");
    std::fs::write(&skeleton_path, skeleton.to_bam()).unwrap();
    std::fs::write(&anim_path, anim.to_bam()).unwrap();

    let mut loaded = PartBundle::load(&skeleton_path).unwrap();
    let lift = AnimBundle::load(&anim_path).unwrap();
    std::fs::remove_file(&skeleton_path).ok();
    std::fs::remove_file(&anim_path).ok();

    assert_eq!(loaded.blend_type(), BlendType::Componentwise);
    assert_eq!(lift.num_frames(), 3);

    let id = loaded
        .bind_anim(Arc::new(lift), HierarchyMatchFlags::empty(), &PartSubset::new())
        .unwrap();
    loaded.pose(id, 2.0).unwrap();
    loaded.update(&());

    let hook = loaded.joint("hook").and_then(Joint::as_scalar).unwrap();
    assert_eq!(hook.value(), -2.0);
    let boom = loaded.joint("boom").unwrap();
    let eps = 1e-5;
    let top = boom.net_transform().transform_point3(Vec3::ZERO);
    assert!((top - Vec3::new(0.0, 0.0, 2.0)).length() < eps);
}

#[test]
fn test_garbage_file_is_reported() {
    let path = scratch_file("garbage.bam");
    std::fs::write(&path, b"not a bam stream").unwrap();
    let err = PartBundle::load(&path).unwrap_err();
    std::fs::remove_file(&path).ok();
    assert!(err.to_string().contains("Failed to parse skeleton file"));
}
