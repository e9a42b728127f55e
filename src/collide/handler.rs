//! Consumers of collision entries.
//!
//! A traversal reports every entry found during one pass to a handler,
//! bracketed by `begin_group` and `end_group`.

use std::sync::Arc;

use glam::Vec3;

use super::CollisionEntry;

pub trait CollisionHandler {
    /// Called before the entries of a pass are added.
    fn begin_group(&mut self) {}

    fn add_entry(&mut self, entry: Arc<CollisionEntry>);

    /// Called after the last entry of a pass. Returns false if the handler
    /// could not process the group.
    fn end_group(&mut self) -> bool {
        true
    }
}

/// Squared distance from the from-solid's origin to the surface point, in
/// from space. Entries without a surface point sort first.
fn distance_sq(entry: &CollisionEntry) -> f32 {
    if !entry.has_surface_point() {
        return 0.0;
    }
    let point = entry.surface_point(entry.inv_wrt_mat());
    (point - entry.from_solid().collision_origin()).length_squared()
}

/// Collects entries for the caller to inspect.
#[derive(Debug, Default)]
pub struct CollisionHandlerQueue {
    entries: Vec<Arc<CollisionEntry>>,
}

impl CollisionHandlerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Arc<CollisionEntry>] {
        &self.entries
    }

    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    pub fn clear_entries(&mut self) {
        self.entries.clear();
    }

    /// Order entries nearest first, measured from each from-solid's
    /// collision origin. Ties keep their insertion order.
    pub fn sort_entries(&mut self) {
        self.entries
            .sort_by(|a, b| distance_sq(a).total_cmp(&distance_sq(b)));
    }
}

impl CollisionHandler for CollisionHandlerQueue {
    fn begin_group(&mut self) {
        self.entries.clear();
    }

    fn add_entry(&mut self, entry: Arc<CollisionEntry>) {
        self.entries.push(entry);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEventKind {
    /// The pair started colliding this pass.
    Enter,
    /// The pair was colliding last pass too.
    Again,
    /// The pair stopped colliding; the entry is from the last pass.
    Exit,
}

#[derive(Debug, Clone)]
pub struct CollisionEvent {
    pub kind: CollisionEventKind,
    pub entry: Arc<CollisionEntry>,
}

/// Identity of a from/into solid pair.
fn pair_key(entry: &CollisionEntry) -> (*const (), *const ()) {
    (
        Arc::as_ptr(entry.from_solid()) as *const (),
        Arc::as_ptr(entry.into_solid()) as *const (),
    )
}

/// Tracks only the closest collision of each pass and reports enter, again
/// and exit events for it.
#[derive(Debug, Default)]
pub struct CollisionHandlerHighestEvent {
    last: Option<Arc<CollisionEntry>>,
    closest: Option<(f32, Arc<CollisionEntry>)>,
    events: Vec<CollisionEvent>,
}

impl CollisionHandlerHighestEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// The closest entry of the last completed pass.
    pub fn current(&self) -> Option<&Arc<CollisionEntry>> {
        self.last.as_ref()
    }

    /// Take the events produced so far.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    fn push(&mut self, kind: CollisionEventKind, entry: Arc<CollisionEntry>) {
        tracing::trace!(
            target: "collide",
            "{kind:?} {} into {}",
            entry.from_solid().type_name(),
            entry.into_solid().type_name()
        );
        self.events.push(CollisionEvent { kind, entry });
    }
}

impl CollisionHandler for CollisionHandlerHighestEvent {
    fn begin_group(&mut self) {
        self.closest = None;
    }

    fn add_entry(&mut self, entry: Arc<CollisionEntry>) {
        let dist = distance_sq(&entry);
        let closer = match &self.closest {
            Some((best, _)) => dist < *best,
            None => true,
        };
        if closer {
            self.closest = Some((dist, entry));
        }
    }

    fn end_group(&mut self) -> bool {
        let current = self.closest.take().map(|(_, entry)| entry);
        let previous = self.last.take();

        match (previous, &current) {
            (Some(prev), Some(cur)) if pair_key(&prev) == pair_key(cur) => {
                self.push(CollisionEventKind::Again, cur.clone());
            }
            (prev, cur) => {
                if let Some(prev) = prev {
                    self.push(CollisionEventKind::Exit, prev);
                }
                if let Some(cur) = cur {
                    self.push(CollisionEventKind::Enter, cur.clone());
                }
            }
        }

        self.last = current;
        true
    }
}

/// Convenience for handlers that want a from-space contact point.
pub fn surface_point_in_from_space(entry: &CollisionEntry) -> Option<Vec3> {
    entry
        .has_surface_point()
        .then(|| entry.surface_point(entry.inv_wrt_mat()))
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::collide::{CollisionDispatcher, CollisionPlane, CollisionRay, CollisionSolid};
    use crate::math::Plane;

    fn hit(
        dispatcher: &CollisionDispatcher,
        from: &Arc<dyn CollisionSolid>,
        into: &Arc<dyn CollisionSolid>,
    ) -> Arc<CollisionEntry> {
        let entry = CollisionEntry::new(from.clone(), into.clone(), Mat4::IDENTITY);
        dispatcher.test_intersection(&entry).unwrap()
    }

    fn floors() -> (Arc<dyn CollisionSolid>, Arc<dyn CollisionSolid>) {
        let near = CollisionPlane::new(Plane::from_point_normal(Vec3::new(0.0, 0.0, 5.0), Vec3::Z));
        let far = CollisionPlane::new(Plane::from_point_normal(Vec3::new(0.0, 0.0, 1.0), Vec3::Z));
        (Arc::new(near), Arc::new(far))
    }

    #[test]
    fn test_queue_sorts_by_distance() {
        let dispatcher = CollisionDispatcher::default();
        let ray: Arc<dyn CollisionSolid> =
            Arc::new(CollisionRay::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0)));
        let (near, far) = floors();

        let mut queue = CollisionHandlerQueue::new();
        queue.begin_group();
        queue.add_entry(hit(&dispatcher, &ray, &far));
        queue.add_entry(hit(&dispatcher, &ray, &near));
        assert!(queue.end_group());
        queue.sort_entries();

        let eps = 1e-5;
        let first = surface_point_in_from_space(&queue.entries()[0]).unwrap();
        assert!((first.z - 5.0).abs() < eps);

        let order: Vec<_> = queue.entries().iter().map(|e| e.t()).collect();
        queue.sort_entries();
        let again: Vec<_> = queue.entries().iter().map(|e| e.t()).collect();
        assert_eq!(order, again);
    }

    #[test]
    fn test_highest_event_sequence() {
        let dispatcher = CollisionDispatcher::default();
        let ray: Arc<dyn CollisionSolid> =
            Arc::new(CollisionRay::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0)));
        let (near, far) = floors();
        let mut handler = CollisionHandlerHighestEvent::new();

        handler.begin_group();
        handler.add_entry(hit(&dispatcher, &ray, &far));
        handler.add_entry(hit(&dispatcher, &ray, &near));
        handler.end_group();
        let events = handler.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, CollisionEventKind::Enter);
        assert!(Arc::ptr_eq(events[0].entry.into_solid(), &near));

        handler.begin_group();
        handler.add_entry(hit(&dispatcher, &ray, &near));
        handler.end_group();
        let kinds: Vec<_> = handler.drain_events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![CollisionEventKind::Again]);

        handler.begin_group();
        handler.add_entry(hit(&dispatcher, &ray, &far));
        handler.end_group();
        let kinds: Vec<_> = handler.drain_events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![CollisionEventKind::Exit, CollisionEventKind::Enter]);

        handler.begin_group();
        handler.end_group();
        let kinds: Vec<_> = handler.drain_events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![CollisionEventKind::Exit]);
        assert!(handler.current().is_none());
    }
}
