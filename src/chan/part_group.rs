//! The skeleton side of a bound hierarchy, and the name-ordered walk that
//! binds an animation hierarchy to it.
//!
//! Both hierarchies must be sorted with `sort_descendants` first. Matching
//! children are then found by walking the two sorted child lists side by
//! side, like a merge.

use std::cmp::Ordering;

use glam::Mat4;
use tracing::{debug, error, info, Level};

use super::anim_group::AnimGroup;
use super::bound_joints::BoundJoints;
use super::channel::ValueType;
use super::flags::HierarchyMatchFlags;
use super::moving_part::{BlendContext, Joint};
use super::subset::PartSubset;
use crate::bam::{BamError, BamReader, BamRecord, BamWriter, Datagram, DatagramIterator, Resolved};

/// Yields the thread every `interval` nodes of a long hierarchy walk.
#[derive(Debug, Clone, Default)]
pub(crate) struct YieldBudget {
    interval: u32,
    count: u32,
}

impl YieldBudget {
    /// `interval` 0 never yields.
    pub fn new(interval: u32) -> Self {
        Self { interval, count: 0 }
    }

    pub fn consider_yield(&mut self) {
        if self.interval == 0 {
            return;
        }
        self.count += 1;
        if self.count >= self.interval {
            self.count = 0;
            std::thread::yield_now();
        }
    }
}

/// A named node in a skeleton, optionally carrying an animated joint.
#[derive(Debug, Clone)]
pub struct PartGroup {
    name: String,
    children: Vec<PartGroup>,
    joint: Option<Joint>,
}

/// One step of the side-by-side walk over two sorted child lists.
enum Pairing<'p, 'a> {
    PartOnly(&'p PartGroup),
    AnimOnly(&'a AnimGroup),
    Both(&'p PartGroup, &'a AnimGroup),
}

struct MergeChildren<'p, 'a> {
    parts: &'p [PartGroup],
    anims: &'a [AnimGroup],
    i: usize,
    j: usize,
}

impl<'p, 'a> MergeChildren<'p, 'a> {
    fn new(parts: &'p [PartGroup], anims: &'a [AnimGroup]) -> Self {
        Self { parts, anims, i: 0, j: 0 }
    }
}

impl<'p, 'a> Iterator for MergeChildren<'p, 'a> {
    type Item = Pairing<'p, 'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let pairing = match (self.parts.get(self.i), self.anims.get(self.j)) {
            (Some(pc), Some(ac)) => match pc.name.as_str().cmp(ac.name()) {
                Ordering::Less => Pairing::PartOnly(pc),
                Ordering::Greater => Pairing::AnimOnly(ac),
                Ordering::Equal => Pairing::Both(pc, ac),
            },
            (Some(pc), None) => Pairing::PartOnly(pc),
            (None, Some(ac)) => Pairing::AnimOnly(ac),
            (None, None) => return None,
        };
        match pairing {
            Pairing::PartOnly(_) => self.i += 1,
            Pairing::AnimOnly(_) => self.j += 1,
            Pairing::Both(..) => {
                self.i += 1;
                self.j += 1;
            }
        }
        Some(pairing)
    }
}

impl PartGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            joint: None,
        }
    }

    pub fn with_joint(name: impl Into<String>, joint: Joint) -> Self {
        let mut group = Self::new(name);
        group.joint = Some(joint);
        group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn joint(&self) -> Option<&Joint> {
        self.joint.as_ref()
    }

    pub fn joint_mut(&mut self) -> Option<&mut Joint> {
        self.joint.as_mut()
    }

    /// The value type of this node's joint, `None` for plain groups.
    pub fn value_type(&self) -> Option<ValueType> {
        self.joint.as_ref().map(Joint::value_type)
    }

    pub fn children(&self) -> &[PartGroup] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, n: usize) -> Option<&PartGroup> {
        self.children.get(n)
    }

    pub fn add_child(&mut self, child: PartGroup) -> &mut PartGroup {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// First descendant with the given name, searched depth-first.
    pub fn find_child(&self, name: &str) -> Option<&PartGroup> {
        let mut stack: Vec<&PartGroup> = self.children.iter().rev().collect();
        while let Some(group) = stack.pop() {
            if group.name == name {
                return Some(group);
            }
            stack.extend(group.children.iter().rev());
        }
        None
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut PartGroup> {
        let mut stack: Vec<&mut PartGroup> = self.children.iter_mut().rev().collect();
        while let Some(group) = stack.pop() {
            if group.name == name {
                return Some(group);
            }
            stack.extend(group.children.iter_mut().rev());
        }
        None
    }

    /// Sort the children at every level into name order. The sort is
    /// stable, so equal names keep their insertion order.
    pub fn sort_descendants(&mut self) {
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            group.children.sort_by(|a, b| a.name.cmp(&b.name));
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

    /// Number of joints in this node and its descendants.
    pub fn num_joints(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            count += usize::from(group.joint.is_some());
            stack.extend(group.children.iter());
        }
        count
    }

    /// Walk this hierarchy alongside `anim` and report whether they match
    /// closely enough for `flags`.
    pub fn check_hierarchy(&self, anim: &AnimGroup, flags: HierarchyMatchFlags) -> bool {
        self.check_hierarchy_with(anim, flags, &mut YieldBudget::default())
    }

    pub(crate) fn check_hierarchy_with(
        &self,
        anim: &AnimGroup,
        flags: HierarchyMatchFlags,
        budget: &mut YieldBudget,
    ) -> bool {
        debug_assert!(
            self.is_sorted() && anim.is_sorted(),
            "hierarchies must be sorted before matching"
        );

        let mut stack = vec![(self, anim)];
        while let Some((part, anim)) = stack.pop() {
            budget.consider_yield();
            if part.value_type() != anim.value_type() {
                error!(
                    target: "chan",
                    "Part {} expects type {:?} while matching anim node has type {:?}",
                    part.name,
                    part.value_type(),
                    anim.value_type()
                );
                return false;
            }

            if tracing::enabled!(target: "chan", Level::INFO) {
                log_child_mismatch(part, anim);
            }

            let mut matched = Vec::new();
            for pairing in MergeChildren::new(&part.children, anim.children()) {
                match pairing {
                    Pairing::PartOnly(_) if !flags.contains(HierarchyMatchFlags::OK_PART_EXTRA) => {
                        return false
                    }
                    Pairing::AnimOnly(_) if !flags.contains(HierarchyMatchFlags::OK_ANIM_EXTRA) => {
                        return false
                    }
                    Pairing::Both(pc, ac) => matched.push((pc, ac)),
                    Pairing::PartOnly(_) | Pairing::AnimOnly(_) => {}
                }
            }
            stack.extend(matched.into_iter().rev());
        }
        true
    }

    /// Bind `anim` into slot `channel_index` of every included joint.
    ///
    /// Parts without a matching anim node bind to their rest value; anim
    /// nodes without a matching part are ignored. Bit `n` of
    /// `bound_joints` records whether the `n`th joint in walk order was
    /// included. Returns the number of joints walked.
    pub(crate) fn bind_hierarchy(
        &mut self,
        anim: Option<&AnimGroup>,
        channel_index: usize,
        is_included: bool,
        bound_joints: &mut BoundJoints,
        subset: &PartSubset,
        budget: &mut YieldBudget,
    ) -> usize {
        let mut joint_index = 0;
        let mut stack = vec![(self, anim, is_included)];
        while let Some((group, anim, parent_included)) = stack.pop() {
            budget.consider_yield();
            let included = subset.resolve(&group.name, parent_included);

            if let Some(joint) = &mut group.joint {
                if included {
                    joint.bind_channel(channel_index, anim);
                } else {
                    debug!(
                        target: "chan",
                        "Joint {} excluded from channel {}",
                        group.name,
                        channel_index
                    );
                }
                bound_joints.set_bit_to(joint_index, included);
                joint_index += 1;
            }

            let anim_children = anim.map_or(&[][..], AnimGroup::children);
            let matched: Vec<Option<&AnimGroup>> =
                MergeChildren::new(&group.children, anim_children)
                    .filter_map(|pairing| match pairing {
                        Pairing::PartOnly(_) => Some(None),
                        Pairing::Both(_, ac) => Some(Some(ac)),
                        Pairing::AnimOnly(_) => None,
                    })
                    .collect();

            for (child, anim) in group.children.iter_mut().zip(matched).rev() {
                stack.push((child, anim, included));
            }
        }
        joint_index
    }

    /// Compute which joints a bind with `subset` would include, without
    /// binding anything. Returns the number of joints walked.
    pub(crate) fn find_bound_joints(
        &self,
        is_included: bool,
        bound_joints: &mut BoundJoints,
        subset: &PartSubset,
    ) -> usize {
        let mut joint_index = 0;
        let mut stack = vec![(self, is_included)];
        while let Some((group, parent_included)) = stack.pop() {
            let included = subset.resolve(&group.name, parent_included);
            if group.joint.is_some() {
                bound_joints.set_bit_to(joint_index, included);
                joint_index += 1;
            }
            stack.extend(group.children.iter().rev().map(|child| (child, included)));
        }
        joint_index
    }

    /// Narrow `holes` to slots no joint uses and advance `next` past every
    /// slot any joint has allocated.
    pub(crate) fn pick_channel_index(&self, holes: &mut Vec<usize>, next: &mut usize) {
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            if let Some(joint) = &group.joint {
                joint.restrict_holes(holes, next);
            }
            stack.extend(group.children.iter());
        }
    }

    pub(crate) fn unbind_channel(&mut self, channel_index: usize) {
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            if let Some(joint) = &mut group.joint {
                joint.unbind_channel(channel_index);
            }
            stack.extend(group.children.iter_mut());
        }
    }

    /// Recompute every joint for the current frame. Returns true if any
    /// joint changed.
    pub(crate) fn update(&mut self, ctx: &BlendContext<'_>) -> bool {
        let mut any_changed = false;
        let mut stack = vec![(self, Mat4::IDENTITY)];
        while let Some((group, parent_net)) = stack.pop() {
            let net = match &mut group.joint {
                Some(joint) => {
                    any_changed |= joint.update(ctx, &parent_net);
                    joint.net_transform()
                }
                None => parent_net,
            };
            stack.extend(group.children.iter_mut().map(|child| (child, net)));
        }
        any_changed
    }
}

/// List the children that differ between `part` and `anim`, with a
/// one-line summary first.
fn log_child_mismatch(part: &PartGroup, anim: &AnimGroup) {
    if part.num_children() != anim.num_children() {
        info!(
            target: "chan",
            "Part {} has {} children, while matching anim node has {}:",
            part.name,
            part.num_children(),
            anim.num_children()
        );
    } else if part
        .children
        .iter()
        .zip(anim.children())
        .any(|(pc, ac)| pc.name != ac.name())
    {
        info!(
            target: "chan",
            "Part {} has a different set of children than matching anim node:",
            part.name
        );
    } else {
        return;
    }

    for pairing in MergeChildren::new(&part.children, anim.children()) {
        match pairing {
            Pairing::PartOnly(pc) => info!(target: "chan", "  part has {}, not in anim.", pc.name),
            Pairing::AnimOnly(ac) => info!(
                target: "chan",
                "  anim has {}, not in part.",
                ac.name()
            ),
            Pairing::Both(..) => {}
        }
    }
}

/// Drops descendants from a heap stack, so depth is not limited by the
/// thread's stack.
impl Drop for PartGroup {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut group) = stack.pop() {
            stack.append(&mut group.children);
        }
    }
}

impl BamRecord for PartGroup {
    const TYPE_NAME: &'static str = "PartGroup";

    fn write_record<'a>(&'a self, writer: &mut BamWriter<'a, Self>, dg: &mut Datagram) {
        dg.add_string(&self.name);
        Joint::write_optional(self.joint.as_ref(), dg);
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
        let joint = Joint::read_optional(scan)?;
        let num_children = scan.get_u32()?;
        for _ in 0..num_children {
            reader.read_pointer(scan)?;
        }
        Ok(Self {
            name,
            children: Vec::with_capacity(num_children as usize),
            joint,
        })
    }

    fn complete_pointers(
        &mut self,
        p_list: Vec<Resolved<Self>>,
        _reader: &BamReader<Self>,
    ) -> usize {
        let consumed = p_list.len();
        for resolved in p_list {
            match resolved {
                Resolved::Owned(child) => self.children.push(child),
                Resolved::Null | Resolved::Link(_) => {
                    tracing::warn!(target: "chan", "PartGroup {} ignoring null child", self.name);
                }
            }
        }
        consumed
    }
}
