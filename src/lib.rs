//! Kinema
//!
//! Collision solids and skeletal animation for a Z-up 3D scene graph.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **math** - Planes and parabolas shared by the solids
//! 2. **bounds** - Bounding volumes (sphere, box, hexahedron, plane, line)
//! 3. **collide** - Collision solids, pairwise intersection dispatch, handlers
//! 4. **chan** - Animation channels, skeleton binding and weighted blending
//! 5. **bam** - Binary object streams for hierarchies and solids
//! 6. **node** - Handles to external nodes that drive controlled joints
//! 7. **ecs** - hecs integration: the world as a node registry (feature = "ecs")
//! 8. **config** - RON-loadable settings injected into constructors

pub mod bam;
pub mod bounds;
pub mod chan;
pub mod collide;
pub mod config;
pub mod error;
pub mod math;
pub mod node;

#[cfg(feature = "ecs")]
pub mod ecs;

// Re-export commonly used types
pub use bounds::{BoundingBox, BoundingHexahedron, BoundingLine, BoundingSphere, BoundingVolume};

pub use collide::{
    CollisionDispatcher, CollisionEntry, CollisionEvent, CollisionEventKind, CollisionFloorMesh,
    CollisionHandler, CollisionHandlerHighestEvent, CollisionHandlerQueue, CollisionLine,
    CollisionParabola, CollisionPlane, CollisionRay, CollisionSegment, CollisionSolid,
    CollisionSphere, EntryFlags, FloorTriangle,
};

pub use chan::{
    AnimBundle, AnimChannel, AnimControl, AnimGroup, BlendType, BoundJoints, ControlId,
    HierarchyMatchFlags, Joint, PartBundle, PartGroup, PartSubset, PlayMode,
};

pub use config::{ChanConfig, CollideConfig, EngineConfig};
pub use error::{BamError, BindError};
pub use math::{Parabola, Plane};
pub use node::{NodeHandle, NodeSource};

#[cfg(feature = "ecs")]
pub use ecs::prelude::*;

// Re-export glam for convenience
pub use glam;
