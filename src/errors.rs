//! Bake errors

use crate::float_types::Real;

/// Every condition that aborts a bake.
///
/// These all mean the tile or map geometry is outside what the baker supports,
/// so there is no partial result to salvage.
#[derive(Debug, thiserror::Error)]
pub enum BakeError {
    /// A clip produced more points than a winding may hold
    #[error("winding overflow: {points} points exceeds the maximum of {max}")]
    WindingOverflow { points: usize, max: usize },
    /// The patch table hit its configured cap
    #[error("patch table overflow: more than {max} patches")]
    PatchOverflow { max: usize },
    /// The tile has no nodes or no faces
    #[error("world has no nodes or faces")]
    EmptyWorld,
    /// The node tree handed to the trace builder is inconsistent
    #[error("corrupt trace node {node}: {reason}")]
    CorruptTraceNode { node: usize, reason: &'static str },
    /// A face winding reaches past the world extent
    #[error("huge winding on face {face}: coordinate beyond {extent}")]
    HugeWinding { face: usize, extent: Real },
    /// An index in the tile points outside its table
    #[error("corrupt tile: {0}")]
    CorruptTile(String),
    /// A face needs more lightmap samples than a single map allows
    #[error("surface too large to light on face {face}: {width}x{height} samples")]
    SurfaceTooLarge { face: usize, width: usize, height: usize },
    /// The light-data lump grew past its cap
    #[error("light data overflow: {size} bytes exceeds {max}")]
    LightDataOverflow { size: usize, max: usize },
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    /// A configuration value outside what a bake supports
    #[error("invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },
    /// Bouncing was asked for with more patches than form factors are built for
    #[error("{patches} patches exceed the bounce limit of {max}")]
    TransferOverflow { patches: usize, max: usize },
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, BakeError>;

/// Texture lookups only ever degrade reflectivity, so these never leave the
/// reflectivity cache.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture {0} not found")]
    NotFound(String),
    #[error("texture {0} has no texels")]
    Empty(String),
    #[cfg(feature = "image-io")]
    #[error("failed to decode texture {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
}
