//! The record of one detected collision.

use std::sync::Arc;

use bitflags::bitflags;
use glam::{Mat4, Vec3};

use super::CollisionSolid;

bitflags! {
    /// Which optional fields of a [`CollisionEntry`] are valid.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntryFlags: u8 {
        const SURFACE_POINT  = 1 << 0;
        const SURFACE_NORMAL = 1 << 1;
        const INTERIOR_POINT = 1 << 2;
        const CONTACT_POS    = 1 << 3;
        const CONTACT_NORMAL = 1 << 4;
    }
}

/// A pair of solids under test, and after a successful test the contact
/// data between them.
///
/// The traversal layer builds an entry holding the two solids and the
/// transform from the `from` solid's space into the `into` solid's space.
/// An intersection test copies it and fills in whatever contact data it
/// computes, in the into-solid's space. Once returned inside an [`Arc`] the
/// entry is never mutated again.
#[derive(Debug, Clone)]
pub struct CollisionEntry {
    from: Arc<dyn CollisionSolid>,
    into: Arc<dyn CollisionSolid>,
    from_node: Option<String>,
    into_node: Option<String>,
    wrt_mat: Mat4,
    inv_wrt_mat: Mat4,
    t: f32,
    flags: EntryFlags,
    surface_point: Vec3,
    surface_normal: Vec3,
    interior_point: Vec3,
    contact_pos: Vec3,
    contact_normal: Vec3,
}

impl CollisionEntry {
    /// `wrt_mat` maps the from-solid's space into the into-solid's space.
    pub fn new(
        from: Arc<dyn CollisionSolid>,
        into: Arc<dyn CollisionSolid>,
        wrt_mat: Mat4,
    ) -> Self {
        Self::with_inverse(from, into, wrt_mat, wrt_mat.inverse())
    }

    /// Like [`CollisionEntry::new`] with a caller-supplied inverse.
    pub fn with_inverse(
        from: Arc<dyn CollisionSolid>,
        into: Arc<dyn CollisionSolid>,
        wrt_mat: Mat4,
        inv_wrt_mat: Mat4,
    ) -> Self {
        Self {
            from,
            into,
            from_node: None,
            into_node: None,
            wrt_mat,
            inv_wrt_mat,
            t: 0.0,
            flags: EntryFlags::empty(),
            surface_point: Vec3::ZERO,
            surface_normal: Vec3::ZERO,
            interior_point: Vec3::ZERO,
            contact_pos: Vec3::ZERO,
            contact_normal: Vec3::ZERO,
        }
    }

    /// Attach the names of the nodes holding the two solids.
    pub fn with_node_names(mut self, from: impl Into<String>, into: impl Into<String>) -> Self {
        self.from_node = Some(from.into());
        self.into_node = Some(into.into());
        self
    }

    pub fn from_solid(&self) -> &Arc<dyn CollisionSolid> {
        &self.from
    }

    pub fn into_solid(&self) -> &Arc<dyn CollisionSolid> {
        &self.into
    }

    pub fn from_node(&self) -> Option<&str> {
        self.from_node.as_deref()
    }

    pub fn into_node(&self) -> Option<&str> {
        self.into_node.as_deref()
    }

    /// From-space to into-space.
    pub fn wrt_mat(&self) -> &Mat4 {
        &self.wrt_mat
    }

    /// Into-space to from-space.
    pub fn inv_wrt_mat(&self) -> &Mat4 {
        &self.inv_wrt_mat
    }

    /// Parametric position of the hit along the from-solid, where that
    /// makes sense (rays, lines, segments, parabolas).
    pub fn t(&self) -> f32 {
        self.t
    }

    pub fn flags(&self) -> EntryFlags {
        self.flags
    }

    pub fn has_surface_point(&self) -> bool {
        self.flags.contains(EntryFlags::SURFACE_POINT)
    }

    pub fn has_surface_normal(&self) -> bool {
        self.flags.contains(EntryFlags::SURFACE_NORMAL)
    }

    pub fn has_interior_point(&self) -> bool {
        self.flags.contains(EntryFlags::INTERIOR_POINT)
    }

    pub fn has_contact_pos(&self) -> bool {
        self.flags.contains(EntryFlags::CONTACT_POS)
    }

    pub fn has_contact_normal(&self) -> bool {
        self.flags.contains(EntryFlags::CONTACT_NORMAL)
    }

    /// Surface point, transformed by `into_to_space`.
    ///
    /// Pass `Mat4::IDENTITY` for the into-solid's space, or
    /// [`CollisionEntry::inv_wrt_mat`] for the from-solid's space.
    pub fn surface_point(&self, into_to_space: &Mat4) -> Vec3 {
        debug_assert!(self.has_surface_point(), "surface point not set");
        into_to_space.transform_point3(self.surface_point)
    }

    pub fn surface_normal(&self, into_to_space: &Mat4) -> Vec3 {
        debug_assert!(self.has_surface_normal(), "surface normal not set");
        into_to_space
            .transform_vector3(self.surface_normal)
            .normalize_or_zero()
    }

    /// The deepest point of the from-solid inside the into-solid.
    pub fn interior_point(&self, into_to_space: &Mat4) -> Vec3 {
        debug_assert!(self.has_interior_point(), "interior point not set");
        into_to_space.transform_point3(self.interior_point)
    }

    pub fn contact_pos(&self, into_to_space: &Mat4) -> Vec3 {
        debug_assert!(self.has_contact_pos(), "contact pos not set");
        into_to_space.transform_point3(self.contact_pos)
    }

    pub fn contact_normal(&self, into_to_space: &Mat4) -> Vec3 {
        debug_assert!(self.has_contact_normal(), "contact normal not set");
        into_to_space
            .transform_vector3(self.contact_normal)
            .normalize_or_zero()
    }

    /// Surface point, surface normal and interior point at once. The
    /// interior point falls back to the surface point when unset.
    pub fn all(&self, into_to_space: &Mat4) -> (Vec3, Vec3, Vec3) {
        let point = self.surface_point(into_to_space);
        let normal = self.surface_normal(into_to_space);
        let interior = if self.has_interior_point() {
            self.interior_point(into_to_space)
        } else {
            point
        };
        (point, normal, interior)
    }

    // Setters are for intersection tests building a fresh entry.

    pub fn set_t(&mut self, t: f32) {
        self.t = t;
    }

    pub fn set_surface_point(&mut self, point: Vec3) {
        self.surface_point = point;
        self.flags |= EntryFlags::SURFACE_POINT;
    }

    pub fn set_surface_normal(&mut self, normal: Vec3) {
        self.surface_normal = normal;
        self.flags |= EntryFlags::SURFACE_NORMAL;
    }

    pub fn set_interior_point(&mut self, point: Vec3) {
        self.interior_point = point;
        self.flags |= EntryFlags::INTERIOR_POINT;
    }

    pub fn set_contact_pos(&mut self, pos: Vec3) {
        self.contact_pos = pos;
        self.flags |= EntryFlags::CONTACT_POS;
    }

    pub fn set_contact_normal(&mut self, normal: Vec3) {
        self.contact_normal = normal;
        self.flags |= EntryFlags::CONTACT_NORMAL;
    }
}
