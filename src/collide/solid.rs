//! The [`CollisionSolid`] trait shared by every collision shape.

use std::any::Any;
use std::fmt::Debug;
use std::sync::OnceLock;

use glam::{Mat4, Vec3};

use super::viz::VizGeom;
use crate::bam::{BamError, Datagram, DatagramIterator};
use crate::bounds::BoundingVolume;

const FLAG_TANGIBLE: u8 = 0x01;
const FLAG_EFFECTIVE_NORMAL: u8 = 0x02;
const FLAG_RESPECT_EFFECTIVE_NORMAL: u8 = 0x04;

/// State every solid carries next to its geometry.
#[derive(Debug, Clone)]
pub struct SolidCommon {
    effective_normal: Option<Vec3>,
    respect_effective_normal: bool,
    tangible: bool,
    bounds: OnceLock<BoundingVolume>,
    viz: OnceLock<VizGeom>,
}

impl SolidCommon {
    pub fn new(respect_effective_normal: bool) -> Self {
        Self {
            effective_normal: None,
            respect_effective_normal,
            tangible: true,
            bounds: OnceLock::new(),
            viz: OnceLock::new(),
        }
    }

    /// Drop cached bounds and viz geometry.
    pub fn mark_stale(&mut self) {
        self.bounds = OnceLock::new();
        self.viz = OnceLock::new();
    }

    /// Write the flags byte, then the effective normal if there is one.
    pub fn write_datagram(&self, dg: &mut Datagram) {
        let mut flags = 0;
        if self.tangible {
            flags |= FLAG_TANGIBLE;
        }
        if self.effective_normal.is_some() {
            flags |= FLAG_EFFECTIVE_NORMAL;
        }
        if self.respect_effective_normal {
            flags |= FLAG_RESPECT_EFFECTIVE_NORMAL;
        }
        dg.add_u8(flags);
        if let Some(normal) = self.effective_normal {
            dg.add_vec3(normal);
        }
    }

    pub fn fill_from(scan: &mut DatagramIterator<'_>) -> Result<Self, BamError> {
        let flags = scan.get_u8()?;
        let effective_normal = if flags & FLAG_EFFECTIVE_NORMAL != 0 {
            Some(scan.get_vec3()?)
        } else {
            None
        };
        Ok(Self {
            effective_normal,
            respect_effective_normal: flags & FLAG_RESPECT_EFFECTIVE_NORMAL != 0,
            tangible: flags & FLAG_TANGIBLE != 0,
            bounds: OnceLock::new(),
            viz: OnceLock::new(),
        })
    }
}

impl Default for SolidCommon {
    fn default() -> Self {
        Self::new(true)
    }
}

/// A collision shape.
///
/// Solids are plain values; cloning one is a deep copy. The geometry of a
/// solid lives in its own coordinate space, and intersection tests receive
/// the transform between the two solids' spaces through the
/// [`CollisionEntry`](super::CollisionEntry).
pub trait CollisionSolid: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// Short name used in log output.
    fn type_name(&self) -> &'static str;

    /// A point that represents the solid when sorting collisions by distance.
    fn collision_origin(&self) -> Vec3;

    /// Transform the geometry only. Callers go through [`CollisionSolid::xform`].
    fn xform_geometry(&mut self, mat: &Mat4);

    fn compute_internal_bounds(&self) -> BoundingVolume;

    fn fill_viz_geom(&self, viz: &mut VizGeom);

    fn common(&self) -> &SolidCommon;

    fn common_mut(&mut self) -> &mut SolidCommon;

    fn box_clone(&self) -> Box<dyn CollisionSolid>;

    /// Transform the solid in place and invalidate its cached data.
    fn xform(&mut self, mat: &Mat4) {
        self.xform_geometry(mat);
        let common = self.common_mut();
        if let Some(normal) = common.effective_normal {
            common.effective_normal = Some(mat.transform_vector3(normal).normalize_or_zero());
        }
        common.mark_stale();
    }

    /// Bounding volume in the solid's own space, computed on first use.
    fn bounds(&self) -> &BoundingVolume {
        self.common().bounds.get_or_init(|| {
            tracing::debug!(target: "collide", "Recomputing bounds for {}", self.type_name());
            self.compute_internal_bounds()
        })
    }

    /// Visualization geometry, computed on first use.
    fn viz_geom(&self) -> &VizGeom {
        self.common().viz.get_or_init(|| {
            tracing::debug!(target: "collide", "Recomputing viz for {}", self.type_name());
            let mut viz = VizGeom::default();
            self.fill_viz_geom(&mut viz);
            viz
        })
    }

    fn is_tangible(&self) -> bool {
        self.common().tangible
    }

    /// Intangible solids still report collisions but should not block motion.
    fn set_tangible(&mut self, tangible: bool) {
        self.common_mut().tangible = tangible;
    }

    fn effective_normal(&self) -> Option<Vec3> {
        self.common().effective_normal
    }

    /// Report this normal for every collision into this solid, instead of
    /// the true surface normal, to solids that respect it.
    fn set_effective_normal(&mut self, normal: Vec3) {
        self.common_mut().effective_normal = Some(normal.normalize_or_zero());
    }

    fn clear_effective_normal(&mut self) {
        self.common_mut().effective_normal = None;
    }

    fn respect_effective_normal(&self) -> bool {
        self.common().respect_effective_normal
    }

    fn set_respect_effective_normal(&mut self, respect: bool) {
        self.common_mut().respect_effective_normal = respect;
    }
}

impl Clone for Box<dyn CollisionSolid> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Normal to report for a hit from `from` into `into`, given the geometric
/// surface normal.
pub(crate) fn reported_normal(
    into: &dyn CollisionSolid,
    from: &dyn CollisionSolid,
    surface_normal: Vec3,
) -> Vec3 {
    match into.effective_normal() {
        Some(normal) if from.respect_effective_normal() => normal,
        _ => surface_normal,
    }
}

/// Implement the boilerplate parts of [`CollisionSolid`] for a type with a
/// `common: SolidCommon` field.
macro_rules! solid_common_impl {
    ($name:literal) => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn type_name(&self) -> &'static str {
            $name
        }

        fn common(&self) -> &$crate::collide::solid::SolidCommon {
            &self.common
        }

        fn common_mut(&mut self) -> &mut $crate::collide::solid::SolidCommon {
            &mut self.common
        }

        fn box_clone(&self) -> Box<dyn $crate::collide::CollisionSolid> {
            Box::new(self.clone())
        }
    };
}

pub(crate) use solid_common_impl;
