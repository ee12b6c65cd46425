//! Planes, bounding boxes and convex windings: the polygon kernel every
//! other stage is written against.

pub mod bounds;
pub mod plane;
pub mod winding;

pub use bounds::Bounds;
pub use plane::{BACK, FRONT, ON, Plane, PlaneKind};
pub use winding::Winding;
