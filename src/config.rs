//! Runtime configuration.
//!
//! Settings are plain structs injected into the constructors that need them.
//! An [`EngineConfig`] can be loaded from a RON file; any field left out of
//! the file keeps its default.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::chan::BlendType;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub collide: CollideConfig,
    pub chan: ChanConfig,
}

impl EngineConfig {
    /// Load a configuration from a RON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_ron_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse a configuration from RON text.
    pub fn from_ron_str(text: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(text)?)
    }
}

/// Collision settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollideConfig {
    /// Parabolas whose chord is shorter than this get a bounding sphere
    /// instead of a hexahedron. Default: 10.0
    pub parabola_bounds_threshold: f32,
    /// Interior samples used to find a parabola's vertical extent. Default: 10
    pub parabola_bounds_sample: u32,
    /// Whether new solids honour the effective normal of the solids they
    /// hit. Default: true
    pub respect_effective_normal: bool,
}

impl Default for CollideConfig {
    fn default() -> Self {
        Self {
            parabola_bounds_threshold: 10.0,
            parabola_bounds_sample: 10,
            respect_effective_normal: true,
        }
    }
}

/// Animation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChanConfig {
    /// Unbound parts snap back to their rest value. Default: true
    pub restore_initial_pose: bool,
    /// Initial frame-blend flag for new bundles. Default: false
    pub interpolate_frames: bool,
    /// How matrix joints combine blended values. Default: NormalizedLinear
    pub blend_type: BlendType,
    /// Initial anim-blend flag for new bundles. Default: false
    pub anim_blend_flag: bool,
    /// Number of hierarchy nodes walked between cooperative yields.
    /// 0 never yields. Default: 0
    pub yield_interval: u32,
}

impl Default for ChanConfig {
    fn default() -> Self {
        Self {
            restore_initial_pose: true,
            interpolate_frames: false,
            blend_type: BlendType::NormalizedLinear,
            anim_blend_flag: false,
            yield_interval: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.collide.parabola_bounds_threshold, 10.0);
        assert_eq!(config.collide.parabola_bounds_sample, 10);
        assert!(config.chan.restore_initial_pose);
        assert_eq!(config.chan.blend_type, BlendType::NormalizedLinear);
    }

    #[test]
    fn test_partial_ron() {
        let config = EngineConfig::from_ron_str(
            "(collide: (parabola_bounds_sample: 4), chan: (blend_type: ComponentwiseQuat))",
        )
        .unwrap();
        assert_eq!(config.collide.parabola_bounds_sample, 4);
        assert_eq!(config.collide.parabola_bounds_threshold, 10.0);
        assert_eq!(config.chan.blend_type, BlendType::ComponentwiseQuat);
        assert!(!config.chan.anim_blend_flag);
    }

    #[test]
    fn test_bad_ron() {
        assert!(EngineConfig::from_ron_str("(collide: 3)").is_err());
    }
}
