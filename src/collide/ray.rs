//! Half-infinite ray.

use glam::{Mat4, Vec3};

use super::solid::{solid_common_impl, SolidCommon};
use super::viz::VizGeom;
use super::CollisionSolid;
use crate::bam::{BamError, BamReader, BamRecord, BamWriter, Datagram, DatagramIterator};
use crate::bounds::{BoundingLine, BoundingVolume};
use crate::config::CollideConfig;

/// Length drawn for rays and lines in viz geometry.
pub(crate) const VIZ_LENGTH: f32 = 100.0;

/// A ray starting at `origin` and extending forever along `direction`.
#[derive(Debug, Clone)]
pub struct CollisionRay {
    origin: Vec3,
    direction: Vec3,
    common: SolidCommon,
}

impl CollisionRay {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::with_config(origin, direction, &CollideConfig::default())
    }

    pub fn with_config(origin: Vec3, direction: Vec3, config: &CollideConfig) -> Self {
        debug_assert!(direction != Vec3::ZERO, "ray direction must be nonzero");
        Self {
            origin,
            direction,
            common: SolidCommon::new(config.respect_effective_normal),
        }
    }

    /// A ray from `origin` through `point`.
    pub fn from_points(origin: Vec3, point: Vec3) -> Self {
        Self::new(origin, point - origin)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
        self.common.mark_stale();
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        debug_assert!(direction != Vec3::ZERO, "ray direction must be nonzero");
        self.direction = direction;
        self.common.mark_stale();
    }
}

impl CollisionSolid for CollisionRay {
    solid_common_impl!("ray");

    fn collision_origin(&self) -> Vec3 {
        self.origin
    }

    fn xform_geometry(&mut self, mat: &Mat4) {
        self.origin = mat.transform_point3(self.origin);
        self.direction = mat.transform_vector3(self.direction);
    }

    fn compute_internal_bounds(&self) -> BoundingVolume {
        BoundingVolume::Line(BoundingLine {
            origin: self.origin,
            direction: self.direction,
        })
    }

    fn fill_viz_geom(&self, viz: &mut VizGeom) {
        let far = self.origin + self.direction.normalize_or_zero() * VIZ_LENGTH;
        viz.add_line_strip([self.origin, far]);
    }
}

impl BamRecord for CollisionRay {
    const TYPE_NAME: &'static str = "CollisionRay";

    fn write_record<'a>(&'a self, _writer: &mut BamWriter<'a, Self>, dg: &mut Datagram) {
        self.common.write_datagram(dg);
        dg.add_vec3(self.origin);
        dg.add_vec3(self.direction);
    }

    fn fill_from(
        scan: &mut DatagramIterator<'_>,
        _reader: &mut BamReader<Self>,
    ) -> Result<Self, BamError> {
        let common = SolidCommon::fill_from(scan)?;
        let origin = scan.get_vec3()?;
        let direction = scan.get_vec3()?;
        Ok(Self {
            origin,
            direction,
            common,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xform_marks_bounds_stale() {
        let mut ray = CollisionRay::new(Vec3::ZERO, Vec3::X);
        let BoundingVolume::Line(before) = ray.bounds().clone() else {
            panic!("ray bounds should be a line");
        };
        assert_eq!(before.origin, Vec3::ZERO);

        ray.xform(&Mat4::from_translation(Vec3::new(0.0, 0.0, 3.0)));
        let BoundingVolume::Line(after) = ray.bounds().clone() else {
            panic!("ray bounds should be a line");
        };
        assert_eq!(after.origin, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(after.direction, Vec3::X);
    }

    #[test]
    fn test_viz_is_single_strip() {
        let ray = CollisionRay::from_points(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0));
        let viz = ray.viz_geom();
        assert_eq!(viz.line_strips.len(), 1);
        assert!((viz.vertices[1] - Vec3::new(0.0, VIZ_LENGTH, 0.0)).length() < 1e-3);
    }
}
