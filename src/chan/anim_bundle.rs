//! A complete animation: a hierarchy of channels plus timing.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;

use super::anim_group::AnimGroup;
use crate::bam::{read_stream, write_stream, BamError, Datagram, DatagramIterator};

static NEXT_BUNDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of an [`AnimBundle`], shared by all of its groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleId(u64);

impl BundleId {
    pub(crate) fn next() -> Self {
        Self(NEXT_BUNDLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The root of an animation hierarchy.
#[derive(Debug, Clone)]
pub struct AnimBundle {
    id: BundleId,
    root: AnimGroup,
    fps: f32,
    num_frames: usize,
}

impl AnimBundle {
    pub fn new(name: impl Into<String>, fps: f32, num_frames: usize) -> Self {
        let id = BundleId::next();
        let mut root = AnimGroup::new(name);
        root.set_root(Some(id));
        Self {
            id,
            root,
            fps,
            num_frames,
        }
    }

    pub fn id(&self) -> BundleId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.root.name()
    }

    pub fn root(&self) -> &AnimGroup {
        &self.root
    }

    /// Frames per second at a play rate of 1.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn add_child(&mut self, child: AnimGroup) -> &mut AnimGroup {
        self.root.add_child(child)
    }

    pub fn find_child(&self, name: &str) -> Option<&AnimGroup> {
        self.root.find_child(name)
    }

    pub fn sort_descendants(&mut self) {
        self.root.sort_descendants();
    }

    /// Serialize to a Bam stream.
    pub fn to_bam(&self) -> Vec<u8> {
        let mut header = Datagram::new();
        header.add_f32(self.fps);
        header.add_u32(self.num_frames as u32);
        write_stream(&self.root, &header)
    }

    /// Read a bundle written by [`AnimBundle::to_bam`]. The result gets a
    /// fresh [`BundleId`].
    pub fn from_bam(bytes: &[u8]) -> Result<Self, BamError> {
        let (mut root, header) = read_stream::<AnimGroup>(bytes)?;
        let mut scan = DatagramIterator::new(&header);
        let fps = scan.get_f32()?;
        let num_frames = scan.get_u32()? as usize;

        let id = BundleId::next();
        root.set_root(Some(id));
        Ok(Self {
            id,
            root,
            fps,
            num_frames,
        })
    }

    /// Load a bundle from a Bam file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read animation file: {}", path.display()))?;
        let bundle = Self::from_bam(&bytes)
            .with_context(|| format!("Failed to parse animation file: {}", path.display()))?;
        tracing::info!(
            target: "chan",
            "Loaded animation {} ({} frames)",
            bundle.name(),
            bundle.num_frames
        );
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chan::{AnimChannel, ScalarChannel};

    #[test]
    fn test_ids_are_unique() {
        let a = AnimBundle::new("walk", 24.0, 10);
        let b = AnimBundle::new("walk", 24.0, 10);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.root().root(), Some(a.id()));
    }

    #[test]
    fn test_bam_keeps_tree_and_timing() {
        let mut bundle = AnimBundle::new("wave", 30.0, 3);
        let arm = bundle.add_child(AnimGroup::new("arm"));
        arm.add_child(AnimGroup::with_channel(
            "elbow",
            AnimChannel::Scalar(ScalarChannel::Table(vec![0.0, 0.5, 1.0])),
        ));

        let read = AnimBundle::from_bam(&bundle.to_bam()).unwrap();
        assert_eq!(read.name(), "wave");
        assert_eq!(read.fps(), 30.0);
        assert_eq!(read.num_frames(), 3);
        assert_ne!(read.id(), bundle.id());

        let elbow = read.find_child("elbow").unwrap();
        assert_eq!(elbow.root(), Some(read.id()));
        assert_eq!(elbow.channel().map(|c| c.num_frames()), Some(Some(3)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnimBundle::load("/nonexistent/walk.bam").unwrap_err();
        assert!(err.to_string().contains("Failed to read animation file"));
    }
}
