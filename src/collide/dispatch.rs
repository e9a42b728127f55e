//! Pairwise intersection dispatch.
//!
//! Each test is registered for a concrete `(from, into)` pair of solid
//! types. New shapes add their tests by registering more pairs; nothing
//! else needs to change.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::{
    CollisionEntry, CollisionFloorMesh, CollisionLine, CollisionParabola, CollisionPlane,
    CollisionRay, CollisionSegment, CollisionSolid, CollisionSphere,
};

type PairTest = Box<dyn Fn(&CollisionEntry) -> Option<CollisionEntry> + Send + Sync>;

/// Table of intersection tests keyed by `(from type, into type)`.
pub struct CollisionDispatcher {
    tests: HashMap<(TypeId, TypeId), PairTest>,
    reported: Mutex<HashSet<(TypeId, TypeId)>>,
}

impl CollisionDispatcher {
    /// A dispatcher with no tests registered.
    pub fn new() -> Self {
        Self {
            tests: HashMap::new(),
            reported: Mutex::new(HashSet::new()),
        }
    }

    /// Register the test run when an `F` solid collides into an `I` solid.
    /// Replaces any previous test for the pair.
    ///
    /// The test receives the into solid, the from solid and the entry
    /// under test, and returns a new entry on contact.
    pub fn register<F, I>(&mut self, test: fn(&I, &F, &CollisionEntry) -> Option<CollisionEntry>)
    where
        F: CollisionSolid,
        I: CollisionSolid,
    {
        let wrapped = move |entry: &CollisionEntry| {
            let into = entry.into_solid().as_any().downcast_ref::<I>();
            let from = entry.from_solid().as_any().downcast_ref::<F>();
            debug_assert!(
                into.is_some() && from.is_some(),
                "dispatch table entry called with wrong solid types"
            );
            test(into?, from?, entry)
        };
        self.tests
            .insert((TypeId::of::<F>(), TypeId::of::<I>()), Box::new(wrapped));
    }

    pub fn supports<F: CollisionSolid, I: CollisionSolid>(&self) -> bool {
        self.tests
            .contains_key(&(TypeId::of::<F>(), TypeId::of::<I>()))
    }

    /// Test the entry's from solid against its into solid.
    ///
    /// Returns a new entry holding the contact data, or `None` when the
    /// solids do not touch or no test exists for the pair.
    pub fn test_intersection(&self, entry: &CollisionEntry) -> Option<Arc<CollisionEntry>> {
        let from = entry.from_solid();
        let into = entry.into_solid();
        let key = (Any::type_id(from.as_any()), Any::type_id(into.as_any()));

        let Some(test) = self.tests.get(&key) else {
            self.report_undefined(key, from.type_name(), into.type_name());
            return None;
        };

        let result = test(entry)?;
        debug!(
            target: "collide",
            "intersection detected from {} into {}",
            from.type_name(),
            into.type_name()
        );
        Some(Arc::new(result))
    }

    fn report_undefined(&self, key: (TypeId, TypeId), from: &str, into: &str) {
        let first = match self.reported.lock() {
            Ok(mut reported) => reported.insert(key),
            Err(_) => false,
        };
        if first {
            warn!(
                target: "collide",
                "Collisions from {from} into {into} are not defined"
            );
        }
    }
}

impl Default for CollisionDispatcher {
    /// A dispatcher with every built-in pair registered.
    fn default() -> Self {
        let mut dispatcher = Self::new();

        dispatcher.register::<CollisionSphere, CollisionPlane>(CollisionPlane::test_from_sphere);
        dispatcher.register::<CollisionLine, CollisionPlane>(CollisionPlane::test_from_line);
        dispatcher.register::<CollisionRay, CollisionPlane>(CollisionPlane::test_from_ray);
        dispatcher.register::<CollisionSegment, CollisionPlane>(CollisionPlane::test_from_segment);
        dispatcher
            .register::<CollisionParabola, CollisionPlane>(CollisionPlane::test_from_parabola);

        dispatcher.register::<CollisionSphere, CollisionSphere>(CollisionSphere::test_from_sphere);
        dispatcher.register::<CollisionLine, CollisionSphere>(CollisionSphere::test_from_line);
        dispatcher.register::<CollisionRay, CollisionSphere>(CollisionSphere::test_from_ray);
        dispatcher
            .register::<CollisionSegment, CollisionSphere>(CollisionSphere::test_from_segment);

        dispatcher.register::<CollisionRay, CollisionFloorMesh>(CollisionFloorMesh::test_from_ray);
        dispatcher
            .register::<CollisionSphere, CollisionFloorMesh>(CollisionFloorMesh::test_from_sphere);

        dispatcher
    }
}

impl std::fmt::Debug for CollisionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionDispatcher")
            .field("pairs", &self.tests.len())
            .finish()
    }
}
