//! Light transport: emitters, per-sample direct light, bounces, and the
//! final byte encoding.

pub mod bounce;
pub mod compositor;
pub mod direct;
pub mod facelight;
pub mod phong;
pub mod triangulation;

pub use compositor::final_light_face;
pub use direct::{DirectLight, LightKind, LightSet, Sun, collect_lights};
pub use facelight::{FaceLight, LightContext, PatchSample, build_facelight};
pub use phong::VertexNormals;
pub use triangulation::Triangulation;
