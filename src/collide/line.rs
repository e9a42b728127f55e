//! Infinite line.

use glam::{Mat4, Vec3};

use super::ray::VIZ_LENGTH;
use super::solid::{solid_common_impl, SolidCommon};
use super::viz::VizGeom;
use super::CollisionSolid;
use crate::bam::{BamError, BamReader, BamRecord, BamWriter, Datagram, DatagramIterator};
use crate::bounds::{BoundingLine, BoundingVolume};
use crate::config::CollideConfig;

/// A line through `origin`, infinite in both directions.
#[derive(Debug, Clone)]
pub struct CollisionLine {
    origin: Vec3,
    direction: Vec3,
    common: SolidCommon,
}

impl CollisionLine {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::with_config(origin, direction, &CollideConfig::default())
    }

    pub fn with_config(origin: Vec3, direction: Vec3, config: &CollideConfig) -> Self {
        debug_assert!(direction != Vec3::ZERO, "line direction must be nonzero");
        Self {
            origin,
            direction,
            common: SolidCommon::new(config.respect_effective_normal),
        }
    }

    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::new(a, b - a)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }
}

impl CollisionSolid for CollisionLine {
    solid_common_impl!("line");

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
        let reach = self.direction.normalize_or_zero() * VIZ_LENGTH;
        viz.add_line_strip([self.origin - reach, self.origin + reach]);
    }
}

impl BamRecord for CollisionLine {
    const TYPE_NAME: &'static str = "CollisionLine";

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
