//! Entity Component System integration with hecs.
//!
//! Entities double as driving nodes: a `hecs::World` implements
//! [`NodeSource`](crate::node::NodeSource), and an entity converts into a
//! [`NodeHandle`](crate::node::NodeHandle).

pub mod bridge;
pub mod components;
pub mod systems;

pub mod prelude {
    pub use super::bridge::node_entity;
    pub use super::components::*;
    pub use super::systems::{animation_system, exposed_joint_system, transform_system};
}
