//! Animated joints and per-frame channel blending.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::anim_group::AnimGroup;
use super::channel::{AnimChannel, MatrixChannel, ScalarChannel, ValueType};
use super::control::{AnimControl, ControlId};
use crate::bam::{BamError, Datagram, DatagramIterator};
use crate::node::{NodeHandle, NodeSource};

/// How matrix joints combine the values of several animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendType {
    /// Weighted sum of the matrices. Cheap, but rotations shear.
    Linear,
    /// Weighted sum of the matrices for rotation and translation, with
    /// scale averaged separately.
    #[default]
    NormalizedLinear,
    /// Scale, heading/pitch/roll and translation blended separately.
    Componentwise,
    /// Scale, quaternion and translation blended separately.
    ComponentwiseQuat,
}

/// A value a moving part can hold.
pub trait PartValue: Copy + Debug + PartialEq + Send + Sync + 'static {
    const VALUE_TYPE: ValueType;

    /// Running state of a weighted blend.
    type Accum: Default;

    /// Sample a channel, or `None` if it carries another value type.
    fn sample(channel: &AnimChannel, frame: usize, nodes: &dyn NodeSource) -> Option<Self>;

    fn fixed_channel(value: Self) -> AnimChannel;

    fn dynamic_channel(node: NodeHandle) -> AnimChannel;

    /// The value a frozen joint holds for a frozen transform.
    fn from_transform(transform: &Mat4) -> Self;

    fn accumulate(acc: &mut Self::Accum, value: Self, weight: f32, blend_type: BlendType);

    /// Divide out the summed weight. `net` is never zero.
    fn finish(acc: Self::Accum, net: f32, blend_type: BlendType) -> Self;

    /// Transform handed to child joints.
    fn net_transform(&self, parent: &Mat4) -> Mat4;

    fn write_value(&self, dg: &mut Datagram);

    fn read_value(scan: &mut DatagramIterator<'_>) -> Result<Self, BamError>;
}

impl PartValue for f32 {
    const VALUE_TYPE: ValueType = ValueType::Scalar;
    type Accum = f32;

    fn sample(channel: &AnimChannel, frame: usize, nodes: &dyn NodeSource) -> Option<Self> {
        match channel {
            AnimChannel::Scalar(channel) => Some(channel.value(frame, nodes)),
            AnimChannel::Matrix(_) => None,
        }
    }

    fn fixed_channel(value: Self) -> AnimChannel {
        AnimChannel::Scalar(ScalarChannel::Fixed(value))
    }

    fn dynamic_channel(node: NodeHandle) -> AnimChannel {
        AnimChannel::Scalar(ScalarChannel::Dynamic(node))
    }

    fn from_transform(transform: &Mat4) -> Self {
        transform.w_axis.x
    }

    fn accumulate(acc: &mut f32, value: Self, weight: f32, _blend_type: BlendType) {
        *acc += value * weight;
    }

    fn finish(acc: f32, net: f32, _blend_type: BlendType) -> Self {
        acc / net
    }

    fn net_transform(&self, parent: &Mat4) -> Mat4 {
        *parent
    }

    fn write_value(&self, dg: &mut Datagram) {
        dg.add_f32(*self);
    }

    fn read_value(scan: &mut DatagramIterator<'_>) -> Result<Self, BamError> {
        scan.get_f32()
    }
}

/// Blend state for matrix joints; only the fields used by the active
/// [`BlendType`] are filled.
#[derive(Debug, Clone, Copy)]
pub struct MatrixBlend {
    sum: Mat4,
    scale: Vec3,
    hpr: Vec3,
    translation: Vec3,
    quat: Vec4,
    reference: Option<Quat>,
}

impl Default for MatrixBlend {
    fn default() -> Self {
        Self {
            sum: Mat4::ZERO,
            scale: Vec3::ZERO,
            hpr: Vec3::ZERO,
            translation: Vec3::ZERO,
            quat: Vec4::ZERO,
            reference: None,
        }
    }
}

/// Heading about Z, then pitch about X, then roll about Y.
const HPR_ORDER: EulerRot = EulerRot::ZXY;

impl PartValue for Mat4 {
    const VALUE_TYPE: ValueType = ValueType::Matrix;
    type Accum = MatrixBlend;

    fn sample(channel: &AnimChannel, frame: usize, nodes: &dyn NodeSource) -> Option<Self> {
        match channel {
            AnimChannel::Matrix(channel) => Some(channel.value(frame, nodes)),
            AnimChannel::Scalar(_) => None,
        }
    }

    fn fixed_channel(value: Self) -> AnimChannel {
        AnimChannel::Matrix(MatrixChannel::Fixed(value))
    }

    fn dynamic_channel(node: NodeHandle) -> AnimChannel {
        AnimChannel::Matrix(MatrixChannel::Dynamic(node))
    }

    fn from_transform(transform: &Mat4) -> Self {
        *transform
    }

    fn accumulate(acc: &mut MatrixBlend, value: Self, weight: f32, blend_type: BlendType) {
        match blend_type {
            BlendType::Linear => acc.sum += value * weight,
            BlendType::NormalizedLinear => {
                // Scale is averaged on its own so the summed rotation
                // axes do not shrink the result.
                let (scale, _, _) = value.to_scale_rotation_translation();
                acc.sum += value * weight;
                acc.scale += scale * weight;
            }
            BlendType::Componentwise => {
                let (scale, rotation, translation) = value.to_scale_rotation_translation();
                let (h, p, r) = rotation.to_euler(HPR_ORDER);
                acc.scale += scale * weight;
                acc.hpr += Vec3::new(h, p, r) * weight;
                acc.translation += translation * weight;
            }
            BlendType::ComponentwiseQuat => {
                let (scale, mut rotation, translation) = value.to_scale_rotation_translation();
                // Keep every quaternion on the same hemisphere as the first.
                let reference = acc.reference;
                match reference {
                    Some(reference) if reference.dot(rotation) < 0.0 => rotation = -rotation,
                    Some(_) => {}
                    None => acc.reference = Some(rotation),
                }
                acc.scale += scale * weight;
                acc.quat += Vec4::from(rotation) * weight;
                acc.translation += translation * weight;
            }
        }
    }

    fn finish(acc: MatrixBlend, net: f32, blend_type: BlendType) -> Self {
        let inv_net = 1.0 / net;
        match blend_type {
            BlendType::Linear => acc.sum * inv_net,
            BlendType::NormalizedLinear => {
                let (_, rotation, translation) =
                    (acc.sum * inv_net).to_scale_rotation_translation();
                Mat4::from_scale_rotation_translation(
                    acc.scale * inv_net,
                    rotation.normalize(),
                    translation,
                )
            }
            BlendType::Componentwise => {
                let hpr = acc.hpr * inv_net;
                Mat4::from_scale_rotation_translation(
                    acc.scale * inv_net,
                    Quat::from_euler(HPR_ORDER, hpr.x, hpr.y, hpr.z),
                    acc.translation * inv_net,
                )
            }
            BlendType::ComponentwiseQuat => {
                let rotation = Quat::from_vec4(acc.quat * inv_net);
                let rotation = if rotation.length_squared() > 0.0 {
                    rotation.normalize()
                } else {
                    Quat::IDENTITY
                };
                Mat4::from_scale_rotation_translation(
                    acc.scale * inv_net,
                    rotation,
                    acc.translation * inv_net,
                )
            }
        }
    }

    fn net_transform(&self, parent: &Mat4) -> Mat4 {
        *parent * *self
    }

    fn write_value(&self, dg: &mut Datagram) {
        dg.add_mat4(self);
    }

    fn read_value(scan: &mut DatagramIterator<'_>) -> Result<Self, BamError> {
        scan.get_mat4()
    }
}

/// Bundle-wide state a joint needs to compute its value for a frame.
pub(crate) struct BlendContext<'a> {
    pub blend: &'a BTreeMap<ControlId, f32>,
    pub controls: &'a BTreeMap<ControlId, AnimControl>,
    pub frame_blend: bool,
    pub blend_type: BlendType,
    pub restore_initial_pose: bool,
    pub nodes: &'a dyn NodeSource,
}

/// A joint whose value is driven by animation channels.
///
/// `channels` is indexed by the channel slot each bound animation was
/// assigned; empty slots are free for reuse.
#[derive(Debug, Clone)]
pub struct MovingPart<V: PartValue> {
    value: V,
    default_value: V,
    net_transform: Mat4,
    channels: Vec<Option<Arc<AnimChannel>>>,
    forced_channel: Option<Arc<AnimChannel>>,
}

pub type MovingPartScalar = MovingPart<f32>;
pub type MovingPartMatrix = MovingPart<Mat4>;

impl<V: PartValue> MovingPart<V> {
    pub fn new(default_value: V) -> Self {
        Self {
            value: default_value,
            default_value,
            net_transform: Mat4::IDENTITY,
            channels: Vec::new(),
            forced_channel: None,
        }
    }

    /// Value computed by the last update.
    pub fn value(&self) -> V {
        self.value
    }

    /// Rest value, used when nothing drives the joint.
    pub fn default_value(&self) -> V {
        self.default_value
    }

    pub fn set_default_value(&mut self, value: V) {
        self.default_value = value;
    }

    /// Parent net transform combined with this joint's value.
    pub fn net_transform(&self) -> Mat4 {
        self.net_transform
    }

    pub fn channel(&self, channel_index: usize) -> Option<&Arc<AnimChannel>> {
        self.channels.get(channel_index).and_then(Option::as_ref)
    }

    pub fn forced_channel(&self) -> Option<&Arc<AnimChannel>> {
        self.forced_channel.as_ref()
    }

    /// Bind `anim`'s channel into slot `channel_index`. Without a matching
    /// channel the slot holds the rest value instead.
    pub(crate) fn bind_channel(&mut self, channel_index: usize, anim: Option<&AnimGroup>) {
        if self.channels.len() <= channel_index {
            self.channels.resize(channel_index + 1, None);
        }
        debug_assert!(
            self.channels[channel_index].is_none(),
            "channel slot {channel_index} is already bound"
        );

        let channel = anim
            .and_then(AnimGroup::channel)
            .filter(|channel| channel.value_type() == V::VALUE_TYPE)
            .cloned()
            .unwrap_or_else(|| Arc::new(V::fixed_channel(self.default_value)));
        self.channels[channel_index] = Some(channel);
    }

    pub(crate) fn unbind_channel(&mut self, channel_index: usize) {
        if let Some(slot) = self.channels.get_mut(channel_index) {
            *slot = None;
        }
    }

    /// Drop candidate slots this joint uses and add the free slots it
    /// has at or past `next`.
    pub(crate) fn restrict_holes(&self, holes: &mut Vec<usize>, next: &mut usize) {
        holes.retain(|&hole| self.channel(hole).is_none());
        if *next < self.channels.len() {
            holes.extend((*next..self.channels.len()).filter(|&i| self.channels[i].is_none()));
            *next = self.channels.len();
        }
    }

    /// Hold `transform` regardless of any bound animation.
    pub fn apply_freeze(&mut self, transform: &Mat4) {
        self.forced_channel = Some(Arc::new(V::fixed_channel(V::from_transform(transform))));
    }

    /// Follow an external node regardless of any bound animation.
    pub fn apply_control(&mut self, node: NodeHandle) {
        self.forced_channel = Some(Arc::new(V::dynamic_channel(node)));
    }

    /// Returns true if a forced channel was removed.
    pub fn clear_forced_channel(&mut self) -> bool {
        self.forced_channel.take().is_some()
    }

    /// Recompute the value and net transform. Returns true if either changed.
    pub(crate) fn update(&mut self, ctx: &BlendContext<'_>, parent_net: &Mat4) -> bool {
        let previous = (self.value, self.net_transform);
        self.blend_value(ctx);
        self.net_transform = self.value.net_transform(parent_net);
        (self.value, self.net_transform) != previous
    }

    fn blend_value(&mut self, ctx: &BlendContext<'_>) {
        // A forced channel always wins and is always read at frame 0.
        if let Some(forced) = &self.forced_channel {
            if let Some(value) = V::sample(forced, 0, ctx.nodes) {
                self.value = value;
            }
            return;
        }

        if ctx.blend.is_empty() {
            if ctx.restore_initial_pose {
                self.value = self.default_value;
            }
            return;
        }

        // One active animation, read directly.
        if !ctx.frame_blend && ctx.blend.len() == 1 {
            if let Some((id, &weight)) = ctx.blend.iter().next() {
                if weight != 0.0 {
                    let sample = ctx.controls.get(id).and_then(|control| {
                        let channel = self.channel(control.channel_index())?;
                        V::sample(channel, control.frame(), ctx.nodes)
                    });
                    if let Some(value) = sample {
                        self.value = value;
                        return;
                    }
                }
            }
        }

        let mut acc = V::Accum::default();
        let mut net = 0.0f32;
        for (id, &weight) in ctx.blend {
            let Some(control) = ctx.controls.get(id) else {
                continue;
            };
            let Some(channel) = self.channel(control.channel_index()) else {
                continue;
            };
            let Some(value) = V::sample(channel, control.frame(), ctx.nodes) else {
                continue;
            };

            if !ctx.frame_blend {
                V::accumulate(&mut acc, value, weight, ctx.blend_type);
            } else {
                let frac = control.frac();
                V::accumulate(&mut acc, value, weight * (1.0 - frac), ctx.blend_type);
                if let Some(next) = V::sample(channel, control.next_frame(), ctx.nodes) {
                    V::accumulate(&mut acc, next, weight * frac, ctx.blend_type);
                }
            }
            net += weight;
        }

        if net == 0.0 {
            if ctx.restore_initial_pose {
                self.value = self.default_value;
            }
        } else {
            self.value = V::finish(acc, net, ctx.blend_type);
        }
    }
}

/// A joint of either value type.
#[derive(Debug, Clone)]
pub enum Joint {
    Scalar(MovingPartScalar),
    Matrix(MovingPartMatrix),
}

macro_rules! each_joint {
    ($joint:expr, $part:ident => $body:expr) => {
        match $joint {
            Joint::Scalar($part) => $body,
            Joint::Matrix($part) => $body,
        }
    };
}

const JOINT_SCALAR: u8 = 1;
const JOINT_MATRIX: u8 = 2;

impl Joint {
    pub fn scalar(default_value: f32) -> Self {
        Joint::Scalar(MovingPart::new(default_value))
    }

    pub fn matrix(default_value: Mat4) -> Self {
        Joint::Matrix(MovingPart::new(default_value))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Joint::Scalar(_) => ValueType::Scalar,
            Joint::Matrix(_) => ValueType::Matrix,
        }
    }

    pub fn as_scalar(&self) -> Option<&MovingPartScalar> {
        match self {
            Joint::Scalar(part) => Some(part),
            Joint::Matrix(_) => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&MovingPartMatrix> {
        match self {
            Joint::Matrix(part) => Some(part),
            Joint::Scalar(_) => None,
        }
    }

    pub fn net_transform(&self) -> Mat4 {
        each_joint!(self, part => part.net_transform())
    }

    pub fn forced_channel(&self) -> Option<&Arc<AnimChannel>> {
        each_joint!(self, part => part.forced_channel())
    }

    pub fn apply_freeze(&mut self, transform: &Mat4) {
        each_joint!(self, part => part.apply_freeze(transform))
    }

    pub fn apply_control(&mut self, node: NodeHandle) {
        each_joint!(self, part => part.apply_control(node))
    }

    pub fn clear_forced_channel(&mut self) -> bool {
        each_joint!(self, part => part.clear_forced_channel())
    }

    pub(crate) fn bind_channel(&mut self, channel_index: usize, anim: Option<&AnimGroup>) {
        each_joint!(self, part => part.bind_channel(channel_index, anim))
    }

    pub(crate) fn unbind_channel(&mut self, channel_index: usize) {
        each_joint!(self, part => part.unbind_channel(channel_index))
    }

    pub(crate) fn restrict_holes(&self, holes: &mut Vec<usize>, next: &mut usize) {
        each_joint!(self, part => part.restrict_holes(holes, next))
    }

    pub(crate) fn update(&mut self, ctx: &BlendContext<'_>, parent_net: &Mat4) -> bool {
        each_joint!(self, part => part.update(ctx, parent_net))
    }

    pub(crate) fn write_optional(joint: Option<&Joint>, dg: &mut Datagram) {
        match joint {
            None => dg.add_u8(0),
            Some(Joint::Scalar(part)) => {
                dg.add_u8(JOINT_SCALAR);
                part.default_value.write_value(dg);
            }
            Some(Joint::Matrix(part)) => {
                dg.add_u8(JOINT_MATRIX);
                part.default_value.write_value(dg);
            }
        }
    }

    pub(crate) fn read_optional(
        scan: &mut DatagramIterator<'_>,
    ) -> Result<Option<Joint>, BamError> {
        match scan.get_u8()? {
            0 => Ok(None),
            JOINT_SCALAR => Ok(Some(Joint::scalar(f32::read_value(scan)?))),
            JOINT_MATRIX => Ok(Some(Joint::matrix(Mat4::read_value(scan)?))),
            tag => Err(BamError::UnexpectedType {
                expected: "MovingPart".to_string(),
                found: format!("joint tag {tag}"),
            }),
        }
    }
}
