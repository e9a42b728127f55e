//! Handles to external driving nodes.
//!
//! Joints can be slaved to a node owned by some other system. The animation
//! code only keeps a [`NodeHandle`] and reads the node's value through a
//! [`NodeSource`] once per update.

use std::collections::HashMap;

use glam::Mat4;

/// Opaque, non-owning reference to a node in an external registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

/// Registry that resolves [`NodeHandle`]s to current values.
pub trait NodeSource {
    /// Current world transform of the node, if it exists.
    fn node_transform(&self, node: NodeHandle) -> Option<Mat4>;

    /// Current scalar value of the node. Defaults to the X component of
    /// the node's translation.
    fn node_scalar(&self, node: NodeHandle) -> Option<f32> {
        self.node_transform(node).map(|mat| mat.w_axis.x)
    }
}

/// No nodes at all.
impl NodeSource for () {
    fn node_transform(&self, _node: NodeHandle) -> Option<Mat4> {
        None
    }
}

/// A plain table of transforms.
impl NodeSource for HashMap<NodeHandle, Mat4> {
    fn node_transform(&self, node: NodeHandle) -> Option<Mat4> {
        self.get(&node).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_unit_source_is_empty() {
        assert_eq!(().node_transform(NodeHandle(1)), None);
        assert_eq!(().node_scalar(NodeHandle(1)), None);
    }

    #[test]
    fn test_scalar_from_translation() {
        let mut nodes = HashMap::new();
        nodes.insert(NodeHandle(3), Mat4::from_translation(Vec3::new(2.5, 1.0, 0.0)));
        assert_eq!(nodes.node_scalar(NodeHandle(3)), Some(2.5));
        assert_eq!(nodes.node_scalar(NodeHandle(4)), None);
    }
}
