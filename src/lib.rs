//! Static **radiosity lightmap baking** for compiled BSP map tiles.
//!
//! Given a compiled [`Tile`](bsp::Tile) (planes, nodes, faces and the entity
//! string), the baker splits every face into patches, turns emissive
//! surfaces and light entities into direct lights, traces shadow rays
//! through a tree mirrored from the tile's BSP and writes one RGB lightmap
//! per face into the tile's light lump for the selected
//! [`LightPass`](config::LightPass).
//!
//! ```no_run
//! use radlight::{RadConfig, light_tile, patch::NullTextures, scheduler::SerialRunner};
//! # fn bake(tile: &mut radlight::bsp::Tile) -> radlight::errors::Result<()> {
//! let config = RadConfig::default();
//! let stats = light_tile(tile, &config, &NullTextures, &SerialRunner::new())?;
//! println!("{} faces lit", stats.lit_faces);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//! #### Default
//! - **f32**: use f32 as Real
//! - **parallel**: use rayon to light faces on a worker pool
//! - **image-io**: read texture reflectivity from `.tga`, `.png` and `.jpg` files
//!
//! #### Optional
//! - **f64**: use f64 as Real, this conflicts with f32

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod bsp;
pub mod config;
pub mod entities;
pub mod errors;
pub mod float_types;
pub mod geometry;
pub mod light;
pub mod patch;
pub mod rad;
pub mod scheduler;
pub mod trace;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use config::{LightPass, RadConfig};
pub use errors::{BakeError, Result};
pub use rad::{BakeStats, RadWorld, light_tile, write_light_lump};
