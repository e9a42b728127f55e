//! Playback state of one bound animation.

use std::sync::Arc;

use super::anim_bundle::AnimBundle;
use super::bound_joints::BoundJoints;

/// Identifies an [`AnimControl`] within its [`PartBundle`](super::PartBundle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    #[default]
    Stopped,
    /// Play once and stop on the last frame.
    Play,
    /// Play forever, wrapping to the first frame.
    Loop,
    /// Hold a single frame.
    Pose,
}

/// An animation bound to a part bundle, with its own frame position.
///
/// The control knows which channel slot its animation was bound to and
/// which joints the bind included. Starting playback goes through the
/// bundle so that the control's blend weight can be updated with it.
#[derive(Debug, Clone)]
pub struct AnimControl {
    id: ControlId,
    anim: Arc<AnimBundle>,
    channel_index: usize,
    bound_joints: BoundJoints,
    position: f64,
    play_rate: f64,
    mode: PlayMode,
}

impl AnimControl {
    pub(crate) fn new(
        id: ControlId,
        anim: Arc<AnimBundle>,
        channel_index: usize,
        bound_joints: BoundJoints,
    ) -> Self {
        Self {
            id,
            anim,
            channel_index,
            bound_joints,
            position: 0.0,
            play_rate: 1.0,
            mode: PlayMode::Stopped,
        }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn anim(&self) -> &Arc<AnimBundle> {
        &self.anim
    }

    /// Channel slot in every moving part that holds this animation.
    pub fn channel_index(&self) -> usize {
        self.channel_index
    }

    /// Joints this animation affects.
    pub fn bound_joints(&self) -> &BoundJoints {
        &self.bound_joints
    }

    pub fn num_frames(&self) -> usize {
        self.anim.num_frames()
    }

    pub fn play_mode(&self) -> PlayMode {
        self.mode
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.mode, PlayMode::Play | PlayMode::Loop)
    }

    pub fn play_rate(&self) -> f64 {
        self.play_rate
    }

    /// Negative rates play backwards.
    pub fn set_play_rate(&mut self, rate: f64) {
        self.play_rate = rate;
    }

    fn last_frame(&self) -> f64 {
        self.num_frames().saturating_sub(1) as f64
    }

    pub(crate) fn play(&mut self) {
        self.position = if self.play_rate < 0.0 { self.last_frame() } else { 0.0 };
        self.mode = PlayMode::Play;
    }

    pub(crate) fn loop_anim(&mut self, restart: bool) {
        if restart {
            self.position = 0.0;
        }
        self.mode = PlayMode::Loop;
    }

    pub(crate) fn pose(&mut self, frame: f64) {
        self.position = frame.clamp(0.0, self.last_frame());
        self.mode = PlayMode::Pose;
    }

    /// Freeze at the current frame.
    pub fn stop(&mut self) {
        self.mode = PlayMode::Stopped;
    }

    /// Move the frame position forward by `dt` seconds of playback.
    pub fn advance(&mut self, dt: f32) {
        if !self.is_playing() {
            return;
        }
        let frames = self.num_frames() as f64;
        if frames == 0.0 {
            return;
        }
        self.position += dt as f64 * self.anim.fps() as f64 * self.play_rate;

        match self.mode {
            PlayMode::Loop => self.position = self.position.rem_euclid(frames),
            PlayMode::Play => {
                let last = self.last_frame();
                if self.position >= last {
                    self.position = last;
                    self.mode = PlayMode::Stopped;
                } else if self.position <= 0.0 && self.play_rate < 0.0 {
                    self.position = 0.0;
                    self.mode = PlayMode::Stopped;
                }
            }
            PlayMode::Stopped | PlayMode::Pose => {}
        }
    }

    /// Fractional frame position.
    pub fn frame_position(&self) -> f64 {
        self.position
    }

    /// The whole frame currently shown.
    pub fn frame(&self) -> usize {
        let frames = self.num_frames();
        if frames == 0 {
            return 0;
        }
        let frame = self.position.max(0.0).floor() as usize;
        if self.mode == PlayMode::Loop {
            frame % frames
        } else {
            frame.min(frames - 1)
        }
    }

    /// The frame after [`AnimControl::frame`], used when blending between
    /// frames. Wraps when looping, otherwise holds the last frame.
    pub fn next_frame(&self) -> usize {
        let frames = self.num_frames();
        if frames == 0 {
            return 0;
        }
        if self.mode == PlayMode::Loop {
            (self.frame() + 1) % frames
        } else {
            (self.frame() + 1).min(frames - 1)
        }
    }

    /// How far the position is between [`AnimControl::frame`] and
    /// [`AnimControl::next_frame`], in `[0, 1)`.
    pub fn frac(&self) -> f32 {
        (self.position - self.position.floor()) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(num_frames: usize) -> AnimControl {
        let anim = Arc::new(AnimBundle::new("walk", 10.0, num_frames));
        AnimControl::new(ControlId(0), anim, 0, BoundJoints::all_on())
    }

    #[test]
    fn test_play_stops_on_last_frame() {
        let mut c = control(5);
        c.play();
        c.advance(0.25);
        assert_eq!(c.frame(), 2);
        assert!((c.frac() - 0.5).abs() < 1e-5);
        assert_eq!(c.next_frame(), 3);

        c.advance(1.0);
        assert_eq!(c.frame(), 4);
        assert_eq!(c.next_frame(), 4);
        assert!(!c.is_playing());
    }

    #[test]
    fn test_loop_wraps() {
        let mut c = control(4);
        c.loop_anim(true);
        c.advance(0.35);
        assert_eq!(c.frame(), 3);
        assert_eq!(c.next_frame(), 0);
        c.advance(0.1);
        assert_eq!(c.frame(), 0);
        assert!(c.is_playing());
    }

    #[test]
    fn test_backwards_play() {
        let mut c = control(5);
        c.set_play_rate(-1.0);
        c.play();
        assert_eq!(c.frame(), 4);
        c.advance(1.0);
        assert_eq!(c.frame(), 0);
        assert_eq!(c.play_mode(), PlayMode::Stopped);
    }

    #[test]
    fn test_pose_holds() {
        let mut c = control(5);
        c.pose(2.0);
        c.advance(10.0);
        assert_eq!(c.frame(), 2);
        c.pose(99.0);
        assert_eq!(c.frame(), 4);
    }

    #[test]
    fn test_empty_animation() {
        let mut c = control(0);
        c.loop_anim(true);
        c.advance(1.0);
        assert_eq!((c.frame(), c.next_frame()), (0, 0));
    }
}
