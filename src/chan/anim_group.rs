//! The animation side of a bound hierarchy.

use std::sync::Arc;

use tracing::warn;

use super::anim_bundle::BundleId;
use super::channel::{AnimChannel, ValueType};
use crate::bam::{BamError, BamReader, BamRecord, BamWriter, Datagram, DatagramIterator, Resolved};

/// A named node in an animation hierarchy, optionally carrying a channel.
///
/// Children are owned. `root` names the [`AnimBundle`](super::AnimBundle)
/// the node belongs to without referring to it directly.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimGroup {
    name: String,
    children: Vec<AnimGroup>,
    channel: Option<Arc<AnimChannel>>,
    root: Option<BundleId>,
}

impl AnimGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            channel: None,
            root: None,
        }
    }

    pub fn with_channel(name: impl Into<String>, channel: AnimChannel) -> Self {
        let mut group = Self::new(name);
        group.channel = Some(Arc::new(channel));
        group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> Option<&Arc<AnimChannel>> {
        self.channel.as_ref()
    }

    pub fn set_channel(&mut self, channel: Option<AnimChannel>) {
        self.channel = channel.map(Arc::new);
    }

    /// The value type of this node's channel, `None` for plain groups.
    pub fn value_type(&self) -> Option<ValueType> {
        self.channel.as_ref().map(|channel| channel.value_type())
    }

    /// The bundle this node belongs to.
    pub fn root(&self) -> Option<BundleId> {
        self.root
    }

    pub fn children(&self) -> &[AnimGroup] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, n: usize) -> Option<&AnimGroup> {
        self.children.get(n)
    }

    /// Append a child, adopting it into this node's bundle.
    pub fn add_child(&mut self, mut child: AnimGroup) -> &mut AnimGroup {
        child.set_root(self.root);
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// First descendant with the given name, searched depth-first.
    pub fn find_child(&self, name: &str) -> Option<&AnimGroup> {
        let mut stack: Vec<&AnimGroup> = self.children.iter().rev().collect();
        while let Some(group) = stack.pop() {
            if group.name == name {
                return Some(group);
            }
            stack.extend(group.children.iter().rev());
        }
        None
    }

    /// Sort the children at every level into name order.
    pub fn sort_descendants(&mut self) {
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            group.children.sort_by(|a, b| a.name.cmp(&b.name));
            stack.extend(group.children.iter_mut());
        }
    }

    pub(crate) fn set_root(&mut self, root: Option<BundleId>) {
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            group.root = root;
            stack.extend(group.children.iter_mut());
        }
    }

    /// True if every level of the hierarchy is in name order.
    pub fn is_sorted(&self) -> bool {
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            if !group.children.windows(2).all(|pair| pair[0].name <= pair[1].name) {
                return false;
            }
            stack.extend(group.children.iter());
        }
        true
    }
}

/// Drops descendants from a heap stack, so depth is not limited by the
/// thread's stack.
impl Drop for AnimGroup {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut group) = stack.pop() {
            stack.append(&mut group.children);
        }
    }
}

impl BamRecord for AnimGroup {
    const TYPE_NAME: &'static str = "AnimGroup";

    fn write_record<'a>(&'a self, writer: &mut BamWriter<'a, Self>, dg: &mut Datagram) {
        dg.add_string(&self.name);
        let root = writer.root_id();
        writer.write_link(dg, root);
        AnimChannel::write_optional(self.channel.as_deref(), dg);
        dg.add_u32(self.children.len() as u32);
        for child in &self.children {
            writer.write_pointer(dg, Some(child));
        }
    }

    fn fill_from(
        scan: &mut DatagramIterator<'_>,
        reader: &mut BamReader<Self>,
    ) -> Result<Self, BamError> {
        let name = scan.get_string()?;
        reader.read_link(scan)?;
        let channel = AnimChannel::read_optional(scan)?;
        let num_children = scan.get_u32()?;
        for _ in 0..num_children {
            reader.read_pointer(scan)?;
        }
        Ok(Self {
            name,
            children: Vec::with_capacity(num_children as usize),
            channel: channel.map(Arc::new),
            root: None,
        })
    }

    fn complete_pointers(
        &mut self,
        p_list: Vec<Resolved<Self>>,
        _reader: &BamReader<Self>,
    ) -> usize {
        let consumed = p_list.len();
        // The first entry is the link to the bundle root; the bundle
        // assigns its id once the whole tree is read.
        for resolved in p_list.into_iter().skip(1) {
            match resolved {
                Resolved::Owned(child) => self.children.push(child),
                Resolved::Null | Resolved::Link(_) => {
                    warn!(target: "chan", "AnimGroup {} ignoring null child", self.name);
                }
            }
        }
        consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chan::ScalarChannel;

    fn tree() -> AnimGroup {
        let mut root = AnimGroup::new("root");
        let torso = root.add_child(AnimGroup::new("torso"));
        torso.add_child(AnimGroup::new("neck"));
        torso.add_child(AnimGroup::new("arm"));
        root.add_child(AnimGroup::new("hips"));
        root
    }

    #[test]
    fn test_find_child_depth_first() {
        let root = tree();
        assert_eq!(root.find_child("arm").map(AnimGroup::name), Some("arm"));
        assert!(root.find_child("root").is_none());
        assert!(root.find_child("tail").is_none());
    }

    #[test]
    fn test_sort_descendants() {
        let mut root = tree();
        assert!(!root.is_sorted());
        root.sort_descendants();
        assert!(root.is_sorted());

        let names: Vec<_> = root.children().iter().map(AnimGroup::name).collect();
        assert_eq!(names, vec!["hips", "torso"]);
        let names: Vec<_> = root.children()[1].children().iter().map(AnimGroup::name).collect();
        assert_eq!(names, vec!["arm", "neck"]);
    }

    #[test]
    fn test_add_child_adopts_root() {
        let mut root = AnimGroup::new("root");
        root.set_root(Some(BundleId::next()));
        let mut limb = AnimGroup::new("limb");
        limb.add_child(AnimGroup::new("hand"));
        root.add_child(limb);
        assert_eq!(root.find_child("hand").and_then(AnimGroup::root), root.root());
    }

    #[test]
    fn test_value_type() {
        assert_eq!(AnimGroup::new("g").value_type(), None);
        let scalar = AnimGroup::with_channel("s", AnimChannel::Scalar(ScalarChannel::Fixed(1.0)));
        assert_eq!(scalar.value_type(), Some(ValueType::Scalar));
    }

    #[test]
    fn test_deep_chain_drops() {
        let mut root = AnimGroup::new("root");
        let mut group = &mut root;
        for _ in 0..200_000 {
            group = group.add_child(AnimGroup::new("link"));
        }
        drop(root);
    }

    #[test]
    fn test_wide_group_survives_bam() {
        let mut bundle = crate::chan::AnimBundle::new("crowd", 24.0, 1);
        for i in 0..70_000 {
            bundle.add_child(AnimGroup::new(format!("a{i}")));
        }
        let read = crate::chan::AnimBundle::from_bam(&bundle.to_bam()).unwrap();
        assert_eq!(read.root().num_children(), 70_000);
        assert_eq!(read.root().children()[69_999].name(), "a69999");
    }
}
