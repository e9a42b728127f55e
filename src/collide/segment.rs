//! Finite line segment.

use glam::{Mat4, Vec3};

use super::solid::{solid_common_impl, SolidCommon};
use super::viz::VizGeom;
use super::CollisionSolid;
use crate::bam::{BamError, BamReader, BamRecord, BamWriter, Datagram, DatagramIterator};
use crate::bounds::{BoundingSphere, BoundingVolume};
use crate::config::CollideConfig;

/// A segment from `a` to `b`. Parametrically `a + t (b - a)`, `t` in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct CollisionSegment {
    a: Vec3,
    b: Vec3,
    common: SolidCommon,
}

impl CollisionSegment {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self::with_config(a, b, &CollideConfig::default())
    }

    pub fn with_config(a: Vec3, b: Vec3, config: &CollideConfig) -> Self {
        debug_assert!(a != b, "segment endpoints must differ");
        Self {
            a,
            b,
            common: SolidCommon::new(config.respect_effective_normal),
        }
    }

    pub fn point_a(&self) -> Vec3 {
        self.a
    }

    pub fn point_b(&self) -> Vec3 {
        self.b
    }

    pub fn set_points(&mut self, a: Vec3, b: Vec3) {
        self.a = a;
        self.b = b;
        self.common.mark_stale();
    }
}

impl CollisionSolid for CollisionSegment {
    solid_common_impl!("segment");

    fn collision_origin(&self) -> Vec3 {
        self.a
    }

    fn xform_geometry(&mut self, mat: &Mat4) {
        self.a = mat.transform_point3(self.a);
        self.b = mat.transform_point3(self.b);
    }

    fn compute_internal_bounds(&self) -> BoundingVolume {
        BoundingVolume::Sphere(BoundingSphere::around_segment(self.a, self.b))
    }

    fn fill_viz_geom(&self, viz: &mut VizGeom) {
        viz.add_line_strip([self.a, self.b]);
    }
}

impl BamRecord for CollisionSegment {
    const TYPE_NAME: &'static str = "CollisionSegment";

    fn write_record<'a>(&'a self, _writer: &mut BamWriter<'a, Self>, dg: &mut Datagram) {
        self.common.write_datagram(dg);
        dg.add_vec3(self.a);
        dg.add_vec3(self.b);
    }

    fn fill_from(
        scan: &mut DatagramIterator<'_>,
        _reader: &mut BamReader<Self>,
    ) -> Result<Self, BamError> {
        let common = SolidCommon::fill_from(scan)?;
        let a = scan.get_vec3()?;
        let b = scan.get_vec3()?;
        Ok(Self { a, b, common })
    }
}
