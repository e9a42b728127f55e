//! CPU-side visualization geometry for collision solids.
//!
//! Solids fill a [`VizGeom`] on demand; drawing it is up to the caller.

use glam::Vec3;

/// Vertices plus the primitives that reference them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VizGeom {
    pub vertices: Vec<Vec3>,
    /// Open polylines, as vertex indices.
    pub line_strips: Vec<Vec<u32>>,
    pub triangles: Vec<[u32; 3]>,
}

impl VizGeom {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: Vec3) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    /// Append a polyline through the given points.
    pub fn add_line_strip(&mut self, points: impl IntoIterator<Item = Vec3>) {
        let strip = points.into_iter().map(|p| self.add_vertex(p)).collect();
        self.line_strips.push(strip);
    }

    /// Append a closed convex polygon as a fan plus its outline.
    pub fn add_polygon(&mut self, points: &[Vec3]) {
        if points.len() < 3 {
            return;
        }
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(points);
        let count = points.len() as u32;
        for i in 1..count - 1 {
            self.triangles.push([base, base + i, base + i + 1]);
        }
        let mut border: Vec<u32> = (base..base + count).collect();
        border.push(base);
        self.line_strips.push(border);
    }
}
