//! Collision solids and their pairwise intersection tests.
//!
//! A traversal (outside this crate) pairs a moving *from* solid with a
//! stationary *into* solid, wraps them in a [`CollisionEntry`] together
//! with the transform between their spaces, and asks the
//! [`CollisionDispatcher`] for a test. Successful tests return a new entry
//! filled with contact data, which is handed to a [`CollisionHandler`].
//!
//! | from \ into | plane | sphere | floor mesh |
//! |-------------|-------|--------|------------|
//! | sphere      | yes   | yes    | yes        |
//! | line        | yes   | yes    |            |
//! | ray         | yes   | yes    | yes        |
//! | segment     | yes   | yes    |            |
//! | parabola    | yes   |        |            |

pub mod dispatch;
pub mod entry;
pub mod floor_mesh;
pub mod handler;
pub mod line;
pub mod parabola;
pub mod plane;
pub mod ray;
pub mod segment;
pub mod solid;
pub mod sphere;
pub mod viz;

pub use dispatch::CollisionDispatcher;
pub use entry::{CollisionEntry, EntryFlags};
pub use floor_mesh::{CollisionFloorMesh, FloorTriangle};
pub use handler::{
    CollisionEvent, CollisionEventKind, CollisionHandler, CollisionHandlerHighestEvent,
    CollisionHandlerQueue,
};
pub use line::CollisionLine;
pub use parabola::CollisionParabola;
pub use plane::CollisionPlane;
pub use ray::CollisionRay;
pub use segment::CollisionSegment;
pub use solid::{CollisionSolid, SolidCommon};
pub use sphere::CollisionSphere;
pub use viz::VizGeom;
