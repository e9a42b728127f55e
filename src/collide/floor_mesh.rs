//! Triangle mesh queried by vertical rays and spheres, for terrain following.

use glam::{Mat4, Vec3};
use tracing::warn;

use super::solid::{solid_common_impl, SolidCommon};
use super::viz::VizGeom;
use super::{CollisionEntry, CollisionRay, CollisionSolid, CollisionSphere};
use crate::bam::{BamError, BamReader, BamRecord, BamWriter, Datagram, DatagramIterator};
use crate::bounds::{BoundingBox, BoundingVolume};

/// A triangle of the mesh with its XY extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorTriangle {
    pub indices: [u32; 3],
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl FloorTriangle {
    fn new(indices: [u32; 3], vertices: &[Vec3]) -> Self {
        let mut tri = Self {
            indices,
            min_x: 0.0,
            max_x: 0.0,
            min_y: 0.0,
            max_y: 0.0,
        };
        tri.update_extent(vertices);
        tri
    }

    fn update_extent(&mut self, vertices: &[Vec3]) {
        let [a, b, c] = self.indices.map(|i| vertices[i as usize]);
        self.min_x = a.x.min(b.x).min(c.x);
        self.max_x = a.x.max(b.x).max(c.x);
        self.min_y = a.y.min(b.y).min(c.y);
        self.max_y = a.y.max(b.y).max(c.y);
    }

    /// Half-open XY box test.
    fn may_contain(&self, x: f32, y: f32) -> bool {
        !(x < self.min_x || x >= self.max_x || y < self.min_y || y >= self.max_y)
    }
}

/// A floor made of triangles, treated as a height field over XY.
///
/// Queries project onto the XY plane; only vertical rays give meaningful
/// results. When triangles overlap in XY, the first one added wins.
#[derive(Debug, Clone, Default)]
pub struct CollisionFloorMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<FloorTriangle>,
    common: SolidCommon,
}

impl CollisionFloorMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: Vec3) -> u32 {
        self.vertices.push(vertex);
        self.common.mark_stale();
        (self.vertices.len() - 1) as u32
    }

    /// Append a triangle over existing vertices.
    ///
    /// A triangle referring to a missing vertex is dropped.
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        let count = self.vertices.len();
        let valid = [a, b, c].iter().all(|&i| (i as usize) < count);
        debug_assert!(valid, "triangle ({a}, {b}, {c}) refers past {count} vertices");
        if !valid {
            warn!(
                target: "collide",
                "Dropping floor triangle ({a}, {b}, {c}): only {count} vertices"
            );
            return;
        }
        self.triangles
            .push(FloorTriangle::new([a, b, c], &self.vertices));
        self.common.mark_stale();
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[FloorTriangle] {
        &self.triangles
    }

    /// Height of the floor under `(x, y)`: the first triangle covering the
    /// point, in insertion order.
    pub fn height_at(&self, x: f32, y: f32) -> Option<f32> {
        self.triangles
            .iter()
            .filter(|tri| tri.may_contain(x, y))
            .find_map(|tri| self.height_on(tri, x, y))
    }

    /// Barycentric solve of `(x, y)` against the triangle's XY projection.
    fn height_on(&self, tri: &FloorTriangle, fx: f32, fy: f32) -> Option<f32> {
        let [p0, p1, p2] = tri.indices.map(|i| self.vertices[i as usize]);

        let (e0x, e0y) = (fx - p0.x, fy - p0.y);
        let (e1x, e1y) = (p1.x - p0.x, p1.y - p0.y);
        let (e2x, e2y) = (p2.x - p0.x, p2.y - p0.y);

        let (u, v);
        if e1x == 0.0 {
            if e2x == 0.0 {
                return None;
            }
            u = e0x / e2x;
            if !(0.0..=1.0).contains(&u) || e1y == 0.0 {
                return None;
            }
            v = (e0y - e2y * u) / e1y;
        } else {
            let d = e2y * e1x - e2x * e1y;
            if d == 0.0 {
                return None;
            }
            u = (e0y * e1x - e0x * e1y) / d;
            if !(0.0..=1.0).contains(&u) {
                return None;
            }
            v = (e0x - e2x * u) / e1x;
        }
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        Some(p0.z + u * (p2.z - p0.z) + v * (p1.z - p0.z))
    }

    pub(crate) fn test_from_ray(
        &self,
        from: &CollisionRay,
        entry: &CollisionEntry,
    ) -> Option<CollisionEntry> {
        let origin = entry.wrt_mat().transform_point3(from.origin());
        let z = self.height_at(origin.x, origin.y)?;

        let mut hit = entry.clone();
        hit.set_surface_normal(Vec3::Z);
        hit.set_surface_point(Vec3::new(origin.x, origin.y, z));
        Some(hit)
    }

    /// The sphere's radius is taken in its own space, not scaled by the
    /// entry's transform.
    pub(crate) fn test_from_sphere(
        &self,
        from: &CollisionSphere,
        entry: &CollisionEntry,
    ) -> Option<CollisionEntry> {
        let center = entry.wrt_mat().transform_point3(from.center());
        let z = self.height_at(center.x, center.y)?;
        if center.z - z > from.radius() {
            return None;
        }

        let mut hit = entry.clone();
        hit.set_surface_normal(Vec3::Z);
        hit.set_surface_point(Vec3::new(center.x, center.y, z));
        Some(hit)
    }
}

impl CollisionSolid for CollisionFloorMesh {
    solid_common_impl!("floor mesh");

    fn collision_origin(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn xform_geometry(&mut self, mat: &Mat4) {
        for vertex in &mut self.vertices {
            *vertex = mat.transform_point3(*vertex);
        }
        for tri in &mut self.triangles {
            tri.update_extent(&self.vertices);
        }
    }

    fn compute_internal_bounds(&self) -> BoundingVolume {
        match BoundingBox::from_points(self.vertices.iter().copied()) {
            Some(aabb) => BoundingVolume::Box(aabb),
            None => BoundingVolume::Empty,
        }
    }

    fn fill_viz_geom(&self, viz: &mut VizGeom) {
        let base = viz.vertices.len() as u32;
        viz.vertices.extend_from_slice(&self.vertices);
        for tri in &self.triangles {
            let [a, b, c] = tri.indices.map(|i| base + i);
            viz.triangles.push([a, b, c]);
            viz.line_strips.push(vec![a, b, c, a]);
        }
    }
}

impl BamRecord for CollisionFloorMesh {
    const TYPE_NAME: &'static str = "CollisionFloorMesh";

    fn write_record<'a>(&'a self, _writer: &mut BamWriter<'a, Self>, dg: &mut Datagram) {
        self.common.write_datagram(dg);
        dg.add_u32(self.vertices.len() as u32);
        for vertex in &self.vertices {
            dg.add_vec3(*vertex);
        }
        dg.add_u32(self.triangles.len() as u32);
        for tri in &self.triangles {
            for index in tri.indices {
                dg.add_u32(index);
            }
        }
    }

    fn fill_from(
        scan: &mut DatagramIterator<'_>,
        _reader: &mut BamReader<Self>,
    ) -> Result<Self, BamError> {
        let mut mesh = Self {
            common: SolidCommon::fill_from(scan)?,
            ..Self::default()
        };
        let num_vertices = scan.get_u32()?;
        for _ in 0..num_vertices {
            mesh.add_vertex(scan.get_vec3()?);
        }
        let num_triangles = scan.get_u32()?;
        for _ in 0..num_triangles {
            let (a, b, c) = (scan.get_u32()?, scan.get_u32()?, scan.get_u32()?);
            mesh.add_triangle(a, b, c);
        }
        Ok(mesh)
    }
}
