//! Infinite solid plane. Everything behind the plane is inside the solid.

use glam::{Mat4, Vec3};

use super::solid::{reported_normal, solid_common_impl, SolidCommon};
use super::viz::VizGeom;
use super::{
    CollisionEntry, CollisionLine, CollisionParabola, CollisionRay, CollisionSegment,
    CollisionSolid, CollisionSphere,
};
use crate::bam::{BamError, BamReader, BamRecord, BamWriter, Datagram, DatagramIterator};
use crate::bounds::BoundingVolume;
use crate::math::Plane;

/// Half-size of the square drawn for a plane.
const VIZ_SCALE: f32 = 10.0;

#[derive(Debug, Clone, Default)]
pub struct CollisionPlane {
    plane: Plane,
    common: SolidCommon,
}

impl CollisionPlane {
    pub fn new(plane: Plane) -> Self {
        Self {
            plane,
            common: SolidCommon::default(),
        }
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn normal(&self) -> Vec3 {
        self.plane.normal
    }

    pub fn dist_to_plane(&self, point: Vec3) -> f32 {
        self.plane.dist_to_plane(point)
    }

    pub fn set_plane(&mut self, plane: Plane) {
        self.plane = plane;
        self.common.mark_stale();
    }

    pub(crate) fn test_from_sphere(
        &self,
        from: &CollisionSphere,
        entry: &CollisionEntry,
    ) -> Option<CollisionEntry> {
        let (from_center, from_radius) = from.in_into_space(entry.wrt_mat());

        let dist = self.dist_to_plane(from_center);
        if dist > from_radius {
            return None;
        }

        let normal = self.normal();
        let mut hit = entry.clone();
        hit.set_surface_normal(reported_normal(self, from, normal));
        hit.set_surface_point(from_center - normal * dist);
        hit.set_interior_point(from_center - normal * from_radius);
        Some(hit)
    }

    pub(crate) fn test_from_line(
        &self,
        from: &CollisionLine,
        entry: &CollisionEntry,
    ) -> Option<CollisionEntry> {
        let origin = entry.wrt_mat().transform_point3(from.origin());
        let direction = entry.wrt_mat().transform_vector3(from.direction());

        let t = match self.plane.intersects_line(origin, direction) {
            Some(t) => t,
            // Parallel: either entirely inside or entirely outside.
            None if self.dist_to_plane(origin) > 0.0 => return None,
            None => 0.0,
        };
        Some(self.line_hit(from, entry, origin + direction * t, t))
    }

    pub(crate) fn test_from_ray(
        &self,
        from: &CollisionRay,
        entry: &CollisionEntry,
    ) -> Option<CollisionEntry> {
        let origin = entry.wrt_mat().transform_point3(from.origin());
        let direction = entry.wrt_mat().transform_vector3(from.direction());

        let t = if self.dist_to_plane(origin) < 0.0 {
            // Origin already inside the solid.
            0.0
        } else {
            let t = self.plane.intersects_line(origin, direction)?;
            if t < 0.0 {
                return None;
            }
            t
        };
        Some(self.line_hit(from, entry, origin + direction * t, t))
    }

    pub(crate) fn test_from_segment(
        &self,
        from: &CollisionSegment,
        entry: &CollisionEntry,
    ) -> Option<CollisionEntry> {
        let a = entry.wrt_mat().transform_point3(from.point_a());
        let b = entry.wrt_mat().transform_point3(from.point_b());
        let direction = b - a;

        let t = if self.dist_to_plane(a) < 0.0 {
            0.0
        } else {
            let t = self.plane.intersects_line(a, direction)?;
            if !(0.0..=1.0).contains(&t) {
                return None;
            }
            t
        };
        Some(self.line_hit(from, entry, a + direction * t, t))
    }

    pub(crate) fn test_from_parabola(
        &self,
        from: &CollisionParabola,
        entry: &CollisionEntry,
    ) -> Option<CollisionEntry> {
        let parabola = from.parabola().xform(entry.wrt_mat());
        let (t_min, t_max) = (from.t1(), from.t2());

        let t = if self.dist_to_plane(parabola.calc_point(t_min)) < 0.0 {
            // The arc starts inside the solid.
            t_min
        } else {
            let (t1, t2) = self.plane.intersects_parabola(&parabola)?;
            let in_range = |t: f32| t >= t_min && t <= t_max;
            match (in_range(t1), in_range(t2)) {
                (true, true) => t1.min(t2),
                (true, false) => t1,
                (false, true) => t2,
                (false, false) => return None,
            }
        };
        Some(self.line_hit(from, entry, parabola.calc_point(t), t))
    }

    fn line_hit(
        &self,
        from: &dyn CollisionSolid,
        entry: &CollisionEntry,
        point: Vec3,
        t: f32,
    ) -> CollisionEntry {
        let mut hit = entry.clone();
        hit.set_t(t);
        hit.set_surface_normal(reported_normal(self, from, self.normal()));
        hit.set_surface_point(point);
        hit
    }
}

impl CollisionSolid for CollisionPlane {
    solid_common_impl!("plane");

    /// A plane has no meaningful origin; this is the world origin.
    fn collision_origin(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn xform_geometry(&mut self, mat: &Mat4) {
        self.plane = self.plane.xform(mat);
    }

    fn compute_internal_bounds(&self) -> BoundingVolume {
        BoundingVolume::Plane(self.plane)
    }

    /// A square on the plane, centered on the axis with the largest normal
    /// component.
    fn fill_viz_geom(&self, viz: &mut VizGeom) {
        let normal = self.plane.normal;
        let d = self.plane.d;

        let abs = normal.abs();
        let (center, corner) = if abs.x > abs.y && abs.x > abs.z {
            let center = Vec3::new(-d / normal.x, 0.0, 0.0);
            (center, Vec3::new(-(normal.y + normal.z + d) / normal.x, 1.0, 1.0))
        } else if abs.y > abs.z {
            let center = Vec3::new(0.0, -d / normal.y, 0.0);
            (center, Vec3::new(1.0, -(normal.x + normal.z + d) / normal.y, 1.0))
        } else {
            let center = Vec3::new(0.0, 0.0, -d / normal.z);
            (center, Vec3::new(1.0, 1.0, -(normal.x + normal.y + d) / normal.z))
        };

        let p1 = (corner - center).normalize_or_zero();
        let p2 = normal.cross(p1);
        let p3 = normal.cross(p2);
        let p4 = normal.cross(p3);

        viz.add_polygon(&[
            center + p1 * VIZ_SCALE,
            center + p2 * VIZ_SCALE,
            center + p3 * VIZ_SCALE,
            center + p4 * VIZ_SCALE,
        ]);
    }
}

impl BamRecord for CollisionPlane {
    const TYPE_NAME: &'static str = "CollisionPlane";

    fn write_record<'a>(&'a self, _writer: &mut BamWriter<'a, Self>, dg: &mut Datagram) {
        self.common.write_datagram(dg);
        dg.add_vec3(self.plane.normal);
        dg.add_f32(self.plane.d);
    }

    fn fill_from(
        scan: &mut DatagramIterator<'_>,
        _reader: &mut BamReader<Self>,
    ) -> Result<Self, BamError> {
        let common = SolidCommon::fill_from(scan)?;
        let normal = scan.get_vec3()?;
        let d = scan.get_f32()?;
        Ok(Self {
            plane: Plane::new(normal, d),
            common,
        })
    }
}
