//! The root of a skeleton: owns the part hierarchy, the bound animations
//! and the blend weights between them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use glam::Mat4;
use tracing::{debug, info};

use super::anim_bundle::AnimBundle;
use super::bound_joints::BoundJoints;
use super::control::{AnimControl, ControlId};
use super::flags::HierarchyMatchFlags;
use super::moving_part::{BlendContext, BlendType, Joint};
use super::part_group::{PartGroup, YieldBudget};
use super::subset::PartSubset;
use crate::bam::{read_stream, write_stream, BamError, Datagram, DatagramIterator};
use crate::config::ChanConfig;
use crate::error::BindError;
use crate::node::{NodeHandle, NodeSource};

/// A skeleton plus everything needed to animate it.
///
/// Animations are bound with [`PartBundle::bind_anim`], which returns a
/// [`ControlId`] for the new [`AnimControl`]. Each control has a blend
/// weight (its "effect"); [`PartBundle::update`] combines the controls
/// with non-empty weights into every joint's value.
#[derive(Debug, Clone)]
pub struct PartBundle {
    root: PartGroup,
    config: ChanConfig,
    controls: BTreeMap<ControlId, AnimControl>,
    blend: BTreeMap<ControlId, f32>,
    last_control_set: Option<ControlId>,
    next_control_id: u32,
    anim_blend_flag: bool,
    frame_blend_flag: bool,
    blend_type: BlendType,
}

impl PartBundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, ChanConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: ChanConfig) -> Self {
        Self::from_root(PartGroup::new(name), config)
    }

    fn from_root(root: PartGroup, config: ChanConfig) -> Self {
        Self {
            root,
            controls: BTreeMap::new(),
            blend: BTreeMap::new(),
            last_control_set: None,
            next_control_id: 0,
            anim_blend_flag: config.anim_blend_flag,
            frame_blend_flag: config.interpolate_frames,
            blend_type: config.blend_type,
            config,
        }
    }

    pub fn name(&self) -> &str {
        self.root.name()
    }

    pub fn root(&self) -> &PartGroup {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut PartGroup {
        &mut self.root
    }

    pub fn config(&self) -> &ChanConfig {
        &self.config
    }

    pub fn add_child(&mut self, child: PartGroup) -> &mut PartGroup {
        self.root.add_child(child)
    }

    pub fn find_child(&self, name: &str) -> Option<&PartGroup> {
        self.root.find_child(name)
    }

    /// The joint on the named part, if the part exists and has one.
    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.root.find_child(name).and_then(PartGroup::joint)
    }

    pub fn sort_descendants(&mut self) {
        self.root.sort_descendants();
    }

    /// Whether `anim` could be bound with `flags`, ignoring root names.
    pub fn check_hierarchy(&self, anim: &AnimBundle, flags: HierarchyMatchFlags) -> bool {
        let mut budget = YieldBudget::new(self.config.yield_interval);
        self.root.check_hierarchy_with(anim.root(), flags, &mut budget)
    }

    /// Bind an animation to this skeleton.
    ///
    /// Both hierarchies must already be sorted. Joints excluded by `subset`
    /// are left alone. The new control starts stopped, with no effect.
    pub fn bind_anim(
        &mut self,
        anim: Arc<AnimBundle>,
        flags: HierarchyMatchFlags,
        subset: &PartSubset,
    ) -> Result<ControlId, BindError> {
        if !flags.contains(HierarchyMatchFlags::OK_WRONG_ROOT_NAME) && anim.name() != self.name() {
            return Err(BindError::RootNameMismatch {
                part: self.name().to_string(),
                anim: anim.name().to_string(),
            });
        }

        let mut budget = YieldBudget::new(self.config.yield_interval);
        if !self.root.check_hierarchy_with(anim.root(), flags, &mut budget) {
            return Err(BindError::HierarchyMismatch {
                part: self.name().to_string(),
                anim: anim.name().to_string(),
            });
        }

        let channel_index = self.pick_channel_index();
        let mut bound_joints = BoundJoints::new();
        let walked = self.root.bind_hierarchy(
            Some(anim.root()),
            channel_index,
            subset.is_include_empty(),
            &mut bound_joints,
            subset,
            &mut budget,
        );

        let id = ControlId(self.next_control_id);
        self.next_control_id += 1;
        debug!(
            target: "chan",
            "Bound {} to {} in channel {} ({} joints)",
            anim.name(),
            self.name(),
            channel_index,
            walked
        );
        self.controls.insert(id, AnimControl::new(id, anim, channel_index, bound_joints));
        Ok(id)
    }

    /// Lowest channel slot that no joint uses and no live control holds.
    /// A control whose subset left out every joint owns a slot that no
    /// joint records.
    fn pick_channel_index(&self) -> usize {
        let (mut holes, mut next) = (Vec::new(), 0);
        self.root.pick_channel_index(&mut holes, &mut next);
        let held: BTreeSet<usize> =
            self.controls.values().map(AnimControl::channel_index).collect();
        holes.sort_unstable();
        holes
            .into_iter()
            .find(|hole| !held.contains(hole))
            .unwrap_or_else(|| (next..).find(|slot| !held.contains(slot)).unwrap_or(next))
    }

    /// Joints a bind with `subset` would include, computed without an
    /// animation.
    pub fn find_bound_joints(&self, subset: &PartSubset) -> BoundJoints {
        let mut bound_joints = BoundJoints::new();
        self.root
            .find_bound_joints(subset.is_include_empty(), &mut bound_joints, subset);
        bound_joints
    }

    /// Remove a control and free its channel slot for the next bind.
    pub fn unbind_anim(&mut self, id: ControlId) -> Result<(), BindError> {
        let control = self.controls.remove(&id).ok_or(BindError::UnknownControl(id))?;
        self.blend.remove(&id);
        if self.last_control_set == Some(id) {
            self.last_control_set = None;
        }
        self.root.unbind_channel(control.channel_index());
        Ok(())
    }

    pub fn control(&self, id: ControlId) -> Option<&AnimControl> {
        self.controls.get(&id)
    }

    pub fn control_mut(&mut self, id: ControlId) -> Option<&mut AnimControl> {
        self.controls.get_mut(&id)
    }

    pub fn controls(&self) -> impl Iterator<Item = &AnimControl> {
        self.controls.values()
    }

    fn require_control(&mut self, id: ControlId) -> Result<&mut AnimControl, BindError> {
        self.controls.get_mut(&id).ok_or(BindError::UnknownControl(id))
    }

    /// Set a control's blend weight.
    ///
    /// Without the anim-blend flag only one control is active at a time,
    /// so this replaces every other weight. Zero weights stay in the map.
    pub fn set_control_effect(&mut self, id: ControlId, effect: f32) -> Result<(), BindError> {
        self.require_control(id)?;
        if !self.anim_blend_flag {
            self.blend.clear();
        }
        self.blend.insert(id, effect);
        self.last_control_set = Some(id);
        Ok(())
    }

    /// Take a control out of the blend entirely.
    pub fn clear_control_effect(&mut self, id: ControlId) {
        self.blend.remove(&id);
    }

    /// A control's blend weight, 0 if it is not in the blend.
    pub fn control_effect(&self, id: ControlId) -> f32 {
        self.blend.get(&id).copied().unwrap_or(0.0)
    }

    pub fn anim_blend_flag(&self) -> bool {
        self.anim_blend_flag
    }

    /// Allow several controls to be blended at once. Turning the flag off
    /// keeps only the control whose effect was set last.
    pub fn set_anim_blend_flag(&mut self, anim_blend_flag: bool) {
        if !anim_blend_flag && self.blend.len() > 1 {
            let last = self.last_control_set;
            self.blend.retain(|id, _| Some(*id) == last);
        }
        self.anim_blend_flag = anim_blend_flag;
    }

    pub fn frame_blend_flag(&self) -> bool {
        self.frame_blend_flag
    }

    /// Interpolate between successive frames instead of holding each one.
    pub fn set_frame_blend_flag(&mut self, frame_blend_flag: bool) {
        self.frame_blend_flag = frame_blend_flag;
    }

    pub fn blend_type(&self) -> BlendType {
        self.blend_type
    }

    pub fn set_blend_type(&mut self, blend_type: BlendType) {
        self.blend_type = blend_type;
    }

    /// Starting a control enables it, unless the anim-blend flag is on and
    /// the caller manages weights.
    fn control_activated(&mut self, id: ControlId) {
        if !self.anim_blend_flag {
            self.blend.clear();
            self.blend.insert(id, 1.0);
            self.last_control_set = Some(id);
        }
    }

    pub fn play(&mut self, id: ControlId) -> Result<(), BindError> {
        self.require_control(id)?.play();
        self.control_activated(id);
        Ok(())
    }

    pub fn loop_anim(&mut self, id: ControlId, restart: bool) -> Result<(), BindError> {
        self.require_control(id)?.loop_anim(restart);
        self.control_activated(id);
        Ok(())
    }

    pub fn pose(&mut self, id: ControlId, frame: f64) -> Result<(), BindError> {
        self.require_control(id)?.pose(frame);
        self.control_activated(id);
        Ok(())
    }

    pub fn stop(&mut self, id: ControlId) -> Result<(), BindError> {
        self.require_control(id)?.stop();
        Ok(())
    }

    /// Advance every control by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        for control in self.controls.values_mut() {
            control.advance(dt);
        }
    }

    /// Recompute every joint for the controls' current frames. Nodes that
    /// drive controlled joints are read from `nodes`. Returns true if any
    /// joint changed.
    pub fn update(&mut self, nodes: &dyn NodeSource) -> bool {
        let ctx = BlendContext {
            blend: &self.blend,
            controls: &self.controls,
            frame_blend: self.frame_blend_flag,
            blend_type: self.blend_type,
            restore_initial_pose: self.config.restore_initial_pose,
            nodes,
        };
        self.root.update(&ctx)
    }

    fn named_joint_mut(&mut self, name: &str) -> Option<&mut Joint> {
        self.root.find_child_mut(name).and_then(PartGroup::joint_mut)
    }

    /// Hold the named joint at `transform`. Scalar joints take the X
    /// translation. Returns false if there is no such joint.
    pub fn freeze_joint(&mut self, name: &str, transform: Mat4) -> bool {
        match self.named_joint_mut(name) {
            Some(joint) => {
                joint.apply_freeze(&transform);
                true
            }
            None => false,
        }
    }

    /// Slave the named joint to an external node. Returns false if there
    /// is no such joint.
    pub fn control_joint(&mut self, name: &str, node: NodeHandle) -> bool {
        match self.named_joint_mut(name) {
            Some(joint) => {
                joint.apply_control(node);
                true
            }
            None => false,
        }
    }

    /// Undo [`PartBundle::freeze_joint`] or [`PartBundle::control_joint`].
    /// Returns true if the joint was frozen or controlled.
    pub fn release_joint(&mut self, name: &str) -> bool {
        self.named_joint_mut(name)
            .is_some_and(|joint| joint.clear_forced_channel())
    }

    /// Serialize the skeleton and its blend settings. Bound animations
    /// are not written.
    pub fn to_bam(&self) -> Vec<u8> {
        let mut header = Datagram::new();
        header.add_u8(blend_type_to_u8(self.blend_type));
        header.add_bool(self.anim_blend_flag);
        header.add_bool(self.frame_blend_flag);
        write_stream(&self.root, &header)
    }

    pub fn from_bam(bytes: &[u8]) -> Result<Self, BamError> {
        Self::from_bam_with_config(bytes, ChanConfig::default())
    }

    pub fn from_bam_with_config(bytes: &[u8], config: ChanConfig) -> Result<Self, BamError> {
        let (root, header) = read_stream::<PartGroup>(bytes)?;
        let mut scan = DatagramIterator::new(&header);
        let blend_type = blend_type_from_u8(scan.get_u8()?)?;
        let anim_blend_flag = scan.get_bool()?;
        let frame_blend_flag = scan.get_bool()?;

        let mut bundle = Self::from_root(root, config);
        bundle.blend_type = blend_type;
        bundle.anim_blend_flag = anim_blend_flag;
        bundle.frame_blend_flag = frame_blend_flag;
        Ok(bundle)
    }

    /// Load a skeleton from a Bam file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read skeleton file: {}", path.display()))?;
        let bundle = Self::from_bam(&bytes)
            .with_context(|| format!("Failed to parse skeleton file: {}", path.display()))?;
        info!(
            target: "chan",
            "Loaded skeleton {} ({} joints)",
            bundle.name(),
            bundle.root.num_joints()
        );
        Ok(bundle)
    }
}

fn blend_type_to_u8(blend_type: BlendType) -> u8 {
    match blend_type {
        BlendType::Linear => 0,
        BlendType::NormalizedLinear => 1,
        BlendType::Componentwise => 2,
        BlendType::ComponentwiseQuat => 3,
    }
}

fn blend_type_from_u8(value: u8) -> Result<BlendType, BamError> {
    Ok(match value {
        0 => BlendType::Linear,
        1 => BlendType::NormalizedLinear,
        2 => BlendType::Componentwise,
        3 => BlendType::ComponentwiseQuat,
        other => {
            return Err(BamError::UnexpectedType {
                expected: "BlendType".to_string(),
                found: format!("blend type {other}"),
            })
        }
    })
}
