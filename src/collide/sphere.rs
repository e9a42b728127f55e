//! Sphere solid, usable both as a from and an into solid.

use glam::{Mat4, Vec3};

use super::solid::{reported_normal, solid_common_impl, SolidCommon};
use super::viz::VizGeom;
use super::{CollisionEntry, CollisionLine, CollisionRay, CollisionSegment, CollisionSolid};
use crate::bam::{BamError, BamReader, BamRecord, BamWriter, Datagram, DatagramIterator};
use crate::bounds::{BoundingSphere, BoundingVolume};
use crate::config::CollideConfig;
use crate::math::is_nearly_zero;

const VIZ_SLICES: u32 = 16;
const VIZ_STACKS: u32 = 8;

#[derive(Debug, Clone)]
pub struct CollisionSphere {
    center: Vec3,
    radius: f32,
    common: SolidCommon,
}

impl CollisionSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self::with_config(center, radius, &CollideConfig::default())
    }

    /// Takes the effective-normal default from `config`.
    pub fn with_config(center: Vec3, radius: f32, config: &CollideConfig) -> Self {
        debug_assert!(radius >= 0.0, "sphere radius must not be negative");
        Self {
            center,
            radius,
            common: SolidCommon::new(config.respect_effective_normal),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
        self.common.mark_stale();
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
        self.common.mark_stale();
    }

    /// Center and radius of `self` as a from solid, in into space.
    pub(crate) fn in_into_space(&self, wrt_mat: &Mat4) -> (Vec3, f32) {
        let center = wrt_mat.transform_point3(self.center);
        let radius = wrt_mat
            .transform_vector3(Vec3::new(self.radius, 0.0, 0.0))
            .length();
        (center, radius)
    }

    /// Parameters where `from + t * delta` enters and leaves the sphere,
    /// smallest first.
    pub fn intersects_line(&self, from: Vec3, delta: Vec3) -> Option<(f32, f32)> {
        let a = delta.dot(delta);
        debug_assert!(a != 0.0, "line direction must be nonzero");

        let fc = from - self.center;
        let b = 2.0 * delta.dot(fc);
        let c = fc.dot(fc) - self.radius * self.radius;

        let radical = b * b - 4.0 * a * c;
        if is_nearly_zero(radical) {
            // Tangent.
            let t = -b / (2.0 * a);
            return Some((t, t));
        }
        if radical < 0.0 {
            return None;
        }

        let reciprocal_2a = 1.0 / (2.0 * a);
        let sqrt_radical = radical.sqrt();
        Some(((-b - sqrt_radical) * reciprocal_2a, (-b + sqrt_radical) * reciprocal_2a))
    }

    pub(crate) fn test_from_sphere(
        &self,
        from: &CollisionSphere,
        entry: &CollisionEntry,
    ) -> Option<CollisionEntry> {
        let (from_center, from_radius) = from.in_into_space(entry.wrt_mat());

        let vec = from_center - self.center;
        let reach = self.radius + from_radius;
        if vec.dot(vec) > reach * reach {
            return None;
        }

        let vec_length = vec.length();
        let surface_normal = if is_nearly_zero(vec_length) {
            Vec3::X
        } else {
            vec / vec_length
        };

        let mut hit = entry.clone();
        hit.set_surface_normal(reported_normal(self, from, surface_normal));
        hit.set_surface_point(self.center + surface_normal * self.radius);
        hit.set_interior_point(from_center - surface_normal * from_radius);
        hit.set_contact_pos(from_center);
        hit.set_contact_normal(surface_normal);
        Some(hit)
    }

    pub(crate) fn test_from_line(
        &self,
        from: &CollisionLine,
        entry: &CollisionEntry,
    ) -> Option<CollisionEntry> {
        let origin = entry.wrt_mat().transform_point3(from.origin());
        let direction = entry.wrt_mat().transform_vector3(from.direction());
        let (t1, _) = self.intersects_line(origin, direction)?;
        Some(self.line_hit(from, entry, origin + direction * t1, t1))
    }

    pub(crate) fn test_from_ray(
        &self,
        from: &CollisionRay,
        entry: &CollisionEntry,
    ) -> Option<CollisionEntry> {
        let origin = entry.wrt_mat().transform_point3(from.origin());
        let direction = entry.wrt_mat().transform_vector3(from.direction());
        let (t1, t2) = self.intersects_line(origin, direction)?;
        if t2 < 0.0 {
            // Sphere entirely behind the ray.
            return None;
        }
        let t1 = t1.max(0.0);
        Some(self.line_hit(from, entry, origin + direction * t1, t1))
    }

    pub(crate) fn test_from_segment(
        &self,
        from: &CollisionSegment,
        entry: &CollisionEntry,
    ) -> Option<CollisionEntry> {
        let a = entry.wrt_mat().transform_point3(from.point_a());
        let b = entry.wrt_mat().transform_point3(from.point_b());
        let direction = b - a;
        let (t1, t2) = self.intersects_line(a, direction)?;
        if t2 < 0.0 || t1 > 1.0 {
            return None;
        }
        let t1 = t1.max(0.0);
        Some(self.line_hit(from, entry, a + direction * t1, t1))
    }

    fn line_hit(
        &self,
        from: &dyn CollisionSolid,
        entry: &CollisionEntry,
        point: Vec3,
        t: f32,
    ) -> CollisionEntry {
        let surface_normal = (point - self.center).normalize_or_zero();
        let mut hit = entry.clone();
        hit.set_t(t);
        hit.set_surface_point(point);
        hit.set_surface_normal(reported_normal(self, from, surface_normal));
        hit
    }
}

impl CollisionSolid for CollisionSphere {
    solid_common_impl!("sphere");

    fn collision_origin(&self) -> Vec3 {
        self.center
    }

    fn xform_geometry(&mut self, mat: &Mat4) {
        self.center = mat.transform_point3(self.center);
        self.radius = mat
            .transform_vector3(Vec3::new(self.radius, 0.0, 0.0))
            .length();
    }

    fn compute_internal_bounds(&self) -> BoundingVolume {
        BoundingVolume::Sphere(BoundingSphere::new(self.center, self.radius))
    }

    fn fill_viz_geom(&self, viz: &mut VizGeom) {
        let point = |slice: u32, stack: u32| {
            let theta = std::f32::consts::TAU * slice as f32 / VIZ_SLICES as f32;
            let phi = std::f32::consts::PI * stack as f32 / VIZ_STACKS as f32;
            let dir = Vec3::new(theta.cos() * phi.sin(), theta.sin() * phi.sin(), phi.cos());
            self.center + dir * self.radius
        };

        let base = viz.vertices.len() as u32;
        for stack in 0..=VIZ_STACKS {
            for slice in 0..VIZ_SLICES {
                viz.add_vertex(point(slice, stack));
            }
        }
        let index = |slice: u32, stack: u32| base + stack * VIZ_SLICES + slice % VIZ_SLICES;
        for stack in 0..VIZ_STACKS {
            for slice in 0..VIZ_SLICES {
                let (a, b) = (index(slice, stack), index(slice + 1, stack));
                let (c, d) = (index(slice, stack + 1), index(slice + 1, stack + 1));
                viz.triangles.push([a, c, b]);
                viz.triangles.push([b, c, d]);
            }
        }
    }
}

impl BamRecord for CollisionSphere {
    const TYPE_NAME: &'static str = "CollisionSphere";

    fn write_record<'a>(&'a self, _writer: &mut BamWriter<'a, Self>, dg: &mut Datagram) {
        self.common.write_datagram(dg);
        dg.add_vec3(self.center);
        dg.add_f32(self.radius);
    }

    fn fill_from(
        scan: &mut DatagramIterator<'_>,
        _reader: &mut BamReader<Self>,
    ) -> Result<Self, BamError> {
        let common = SolidCommon::fill_from(scan)?;
        let center = scan.get_vec3()?;
        let radius = scan.get_f32()?;
        Ok(Self {
            center,
            radius,
            common,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn entry_into(
        into: CollisionSphere,
        from: impl CollisionSolid,
        wrt: Mat4,
    ) -> (CollisionSphere, CollisionEntry) {
        let entry = CollisionEntry::new(Arc::new(from), Arc::new(into.clone()), wrt);
        (into, entry)
    }

    #[test]
    fn test_intersects_line() {
        let sphere = CollisionSphere::new(Vec3::ZERO, 1.0);
        let (t1, t2) = sphere
            .intersects_line(Vec3::new(-3.0, 0.0, 0.0), Vec3::X)
            .unwrap();
        let eps = 1e-5;
        assert!((t1 - 2.0).abs() < eps);
        assert!((t2 - 4.0).abs() < eps);
        assert!(sphere
            .intersects_line(Vec3::new(-3.0, 2.0, 0.0), Vec3::X)
            .is_none());
    }

    #[test]
    fn test_sphere_into_sphere() {
        let from = CollisionSphere::new(Vec3::ZERO, 1.0);
        let (into, entry) = entry_into(
            CollisionSphere::new(Vec3::ZERO, 2.0),
            from.clone(),
            Mat4::from_translation(Vec3::new(2.5, 0.0, 0.0)),
        );
        let hit = into.test_from_sphere(&from, &entry).unwrap();
        let eps = 1e-5;
        assert!((hit.surface_point(&Mat4::IDENTITY) - Vec3::new(2.0, 0.0, 0.0)).length() < eps);
        assert!((hit.surface_normal(&Mat4::IDENTITY) - Vec3::X).length() < eps);
        assert!((hit.interior_point(&Mat4::IDENTITY) - Vec3::new(1.5, 0.0, 0.0)).length() < eps);
        assert!(hit.has_contact_pos());

        let far = CollisionEntry::new(
            Arc::new(from.clone()),
            Arc::new(into.clone()),
            Mat4::from_translation(Vec3::new(3.5, 0.0, 0.0)),
        );
        assert!(into.test_from_sphere(&from, &far).is_none());
    }

    #[test]
    fn test_concentric_spheres_use_x_normal() {
        let from = CollisionSphere::new(Vec3::ZERO, 0.5);
        let (into, entry) = entry_into(
            CollisionSphere::new(Vec3::ZERO, 2.0),
            from.clone(),
            Mat4::IDENTITY,
        );
        let hit = into.test_from_sphere(&from, &entry).unwrap();
        assert_eq!(hit.surface_normal(&Mat4::IDENTITY), Vec3::X);
    }

    #[test]
    fn test_ray_from_inside_clamps_t() {
        let from = CollisionRay::new(Vec3::ZERO, Vec3::X);
        let (into, entry) = entry_into(
            CollisionSphere::new(Vec3::ZERO, 1.0),
            from.clone(),
            Mat4::IDENTITY,
        );
        let hit = into.test_from_ray(&from, &entry).unwrap();
        assert_eq!(hit.t(), 0.0);
        assert_eq!(hit.surface_point(&Mat4::IDENTITY), Vec3::ZERO);
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        let from = CollisionRay::new(Vec3::new(3.0, 0.0, 0.0), Vec3::X);
        let (into, entry) = entry_into(
            CollisionSphere::new(Vec3::ZERO, 1.0),
            from.clone(),
            Mat4::IDENTITY,
        );
        assert!(into.test_from_ray(&from, &entry).is_none());
    }

    #[test]
    fn test_segment_range() {
        let sphere = CollisionSphere::new(Vec3::ZERO, 1.0);

        let short = CollisionSegment::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(-3.0, 0.0, 0.0));
        let (into, entry) = entry_into(sphere.clone(), short.clone(), Mat4::IDENTITY);
        assert!(into.test_from_segment(&short, &entry).is_none());

        let through = CollisionSegment::new(Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        let (into, entry) = entry_into(sphere, through.clone(), Mat4::IDENTITY);
        let hit = into.test_from_segment(&through, &entry).unwrap();
        assert!((hit.t() - 0.25).abs() < 1e-5);
        assert!((hit.surface_normal(&Mat4::IDENTITY) + Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_line_hits_behind_origin() {
        let from = CollisionLine::new(Vec3::new(5.0, 0.0, 0.0), Vec3::X);
        let (into, entry) = entry_into(
            CollisionSphere::new(Vec3::ZERO, 1.0),
            from.clone(),
            Mat4::IDENTITY,
        );
        let hit = into.test_from_line(&from, &entry).unwrap();
        assert!((hit.t() + 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_effective_normal_respected() {
        let mut into = CollisionSphere::new(Vec3::ZERO, 2.0);
        into.set_effective_normal(Vec3::Z);
        let mut from = CollisionSphere::new(Vec3::new(2.5, 0.0, 0.0), 1.0);
        let (into, entry) = entry_into(into, from.clone(), Mat4::IDENTITY);
        let hit = into.test_from_sphere(&from, &entry).unwrap();
        assert_eq!(hit.surface_normal(&Mat4::IDENTITY), Vec3::Z);

        from.set_respect_effective_normal(false);
        let hit = into.test_from_sphere(&from, &entry).unwrap();
        assert!((hit.surface_normal(&Mat4::IDENTITY) - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_viz_vertex_count() {
        let sphere = CollisionSphere::new(Vec3::ZERO, 1.0);
        let viz = sphere.viz_geom();
        assert_eq!(viz.vertices.len() as u32, (VIZ_STACKS + 1) * VIZ_SLICES);
        assert_eq!(viz.triangles.len() as u32, VIZ_STACKS * VIZ_SLICES * 2);
    }
}
