//! Parabolic arc, e.g. the flight path of a projectile.

use glam::{Mat4, Vec3};

use super::solid::{solid_common_impl, SolidCommon};
use super::viz::VizGeom;
use super::CollisionSolid;
use crate::bam::{BamError, BamReader, BamRecord, BamWriter, Datagram, DatagramIterator};
use crate::bounds::{BoundingHexahedron, BoundingSphere, BoundingVolume};
use crate::config::CollideConfig;
use crate::math::Parabola;

const VIZ_POINTS: u32 = 100;

/// Half-thickness of the bounding hexahedron across the parabola's plane.
const BOUNDS_HALF_WIDTH: f32 = 0.01;

/// The section of a parabola between parameters `t1` and `t2`.
#[derive(Debug, Clone)]
pub struct CollisionParabola {
    parabola: Parabola,
    t1: f32,
    t2: f32,
    bounds_threshold: f32,
    bounds_sample: u32,
    common: SolidCommon,
}

impl CollisionParabola {
    pub fn new(parabola: Parabola, t1: f32, t2: f32) -> Self {
        Self::with_config(parabola, t1, t2, &CollideConfig::default())
    }

    pub fn with_config(parabola: Parabola, t1: f32, t2: f32, config: &CollideConfig) -> Self {
        Self {
            parabola,
            t1,
            t2,
            bounds_threshold: config.parabola_bounds_threshold,
            bounds_sample: config.parabola_bounds_sample,
            common: SolidCommon::new(config.respect_effective_normal),
        }
    }

    pub fn parabola(&self) -> &Parabola {
        &self.parabola
    }

    pub fn t1(&self) -> f32 {
        self.t1
    }

    pub fn t2(&self) -> f32 {
        self.t2
    }

    pub fn set_parabola(&mut self, parabola: Parabola) {
        self.parabola = parabola;
        self.common.mark_stale();
    }

    pub fn set_t1(&mut self, t1: f32) {
        self.t1 = t1;
        self.common.mark_stale();
    }

    pub fn set_t2(&mut self, t2: f32) {
        self.t2 = t2;
        self.common.mark_stale();
    }

    /// Frame whose origin is the arc start, whose Y axis runs along the
    /// chord and whose YZ plane holds the parabola.
    fn parabola_frame(&self, start: Vec3, chord: Vec3) -> Mat4 {
        let forward = chord.normalize();
        let mut right = forward.cross(-self.parabola.a);
        if right.length_squared() < f32::EPSILON {
            // Straight arc; any plane through the chord will do.
            right = forward.any_orthonormal_vector();
        }
        let right = right.normalize();
        let up = right.cross(forward);
        Mat4::from_cols(
            right.extend(0.0),
            forward.extend(0.0),
            up.extend(0.0),
            start.extend(1.0),
        )
    }
}

impl CollisionSolid for CollisionParabola {
    solid_common_impl!("parabola");

    fn collision_origin(&self) -> Vec3 {
        self.parabola.calc_point(self.t1)
    }

    fn xform_geometry(&mut self, mat: &Mat4) {
        self.parabola = self.parabola.xform(mat);
    }

    fn compute_internal_bounds(&self) -> BoundingVolume {
        let p1 = self.parabola.calc_point(self.t1);
        let p2 = self.parabola.calc_point(self.t2);
        let chord = p2 - p1;

        let d2 = chord.length_squared();
        if d2 < self.bounds_threshold * self.bounds_threshold {
            return BoundingVolume::Sphere(BoundingSphere::new((p1 + p2) * 0.5, d2.sqrt() * 0.5));
        }

        let from_parabola = self.parabola_frame(p1, chord);
        let local = self.parabola.xform(&from_parabola.inverse());

        let max_y = local.calc_point(self.t2).y;
        let mut min_z = 0.0_f32;
        let mut max_z = 0.0_f32;
        let samples = self.bounds_sample;
        for i in 0..samples {
            let s = (i + 1) as f32 / (samples + 1) as f32;
            let z = local.calc_point(self.t1 + s * (self.t2 - self.t1)).z;
            min_z = min_z.min(z);
            max_z = max_z.max(z);
        }

        let w = BOUNDS_HALF_WIDTH;
        let hexahedron = BoundingHexahedron::new([
            Vec3::new(-w, max_y, min_z),
            Vec3::new(w, max_y, min_z),
            Vec3::new(w, max_y, max_z),
            Vec3::new(-w, max_y, max_z),
            Vec3::new(-w, 0.0, min_z),
            Vec3::new(w, 0.0, min_z),
            Vec3::new(w, 0.0, max_z),
            Vec3::new(-w, 0.0, max_z),
        ]);
        BoundingVolume::Hexahedron(hexahedron.xform(&from_parabola))
    }

    fn fill_viz_geom(&self, viz: &mut VizGeom) {
        let (t1, t2) = (self.t1, self.t2);
        viz.add_line_strip((0..VIZ_POINTS).map(|i| {
            let s = i as f32 / VIZ_POINTS as f32;
            self.parabola.calc_point(t1 + s * (t2 - t1))
        }));
    }
}

impl BamRecord for CollisionParabola {
    const TYPE_NAME: &'static str = "CollisionParabola";

    fn write_record<'a>(&'a self, _writer: &mut BamWriter<'a, Self>, dg: &mut Datagram) {
        self.common.write_datagram(dg);
        dg.add_vec3(self.parabola.a);
        dg.add_vec3(self.parabola.b);
        dg.add_vec3(self.parabola.c);
        dg.add_f32(self.t1);
        dg.add_f32(self.t2);
    }

    fn fill_from(
        scan: &mut DatagramIterator<'_>,
        _reader: &mut BamReader<Self>,
    ) -> Result<Self, BamError> {
        let common = SolidCommon::fill_from(scan)?;
        let a = scan.get_vec3()?;
        let b = scan.get_vec3()?;
        let c = scan.get_vec3()?;
        let t1 = scan.get_f32()?;
        let t2 = scan.get_f32()?;
        let mut parabola = Self::new(Parabola::new(a, b, c), t1, t2);
        parabola.common = common;
        Ok(parabola)
    }
}
