//! Skeletal animation: binding animations to skeletons and blending them.
//!
//! A skeleton is a [`PartBundle`], a tree of [`PartGroup`]s whose leaves
//! usually carry a [`Joint`]. An animation is an [`AnimBundle`], a tree of
//! [`AnimGroup`]s carrying channels. Binding walks both trees by name and
//! gives every joint a channel slot for the new [`AnimControl`].
//!
//! Both trees must be sorted by name before binding, see
//! [`PartGroup::sort_descendants`] and [`AnimGroup::sort_descendants`].

mod anim_bundle;
mod anim_group;
mod bound_joints;
mod channel;
mod control;
mod flags;
mod moving_part;
mod part_bundle;
mod part_group;
mod subset;

pub use anim_bundle::{AnimBundle, BundleId};
pub use anim_group::AnimGroup;
pub use bound_joints::BoundJoints;
pub use channel::{AnimChannel, MatrixChannel, MatrixTable, ScalarChannel, ValueType};
pub use control::{AnimControl, ControlId, PlayMode};
pub use flags::HierarchyMatchFlags;
pub use moving_part::{
    BlendType, Joint, MatrixBlend, MovingPart, MovingPartMatrix, MovingPartScalar, PartValue,
};
pub use part_bundle::PartBundle;
pub use part_group::PartGroup;
pub use subset::{GlobPattern, PartSubset};
