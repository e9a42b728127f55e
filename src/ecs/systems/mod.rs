//! ECS systems (transform propagation, skeleton playback).

pub mod animation;
pub mod transform;

pub use animation::{animation_system, exposed_joint_system};
pub use transform::transform_system;
