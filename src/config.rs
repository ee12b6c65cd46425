//! Bake configuration.
//!
//! Every knob has a default, so a TOML file only needs the keys it changes:
//!
//! ```
//! use radlight::config::{LightPass, RadConfig};
//!
//! let config = RadConfig::from_toml_str("pass = \"day\"\nnum_bounce = 2").unwrap();
//! assert_eq!(config.pass, LightPass::Day);
//! assert_eq!(config.light_quant_override, None);
//! ```

use crate::bsp::MAX_LIGHTQUANT;
use crate::errors::{BakeError, Result};
use crate::float_types::{MAX_WORLD_WIDTH, Real, tolerance};
use crate::scheduler::{DefaultRunner, default_runner};
use serde::Deserialize;

/// Hard cap of the light-data lump, per pass.
pub const MAX_MAP_LIGHTING: usize = 0x1000000;

/// Which of the two lightmap sets is being baked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightPass {
    #[default]
    Night,
    Day,
}

impl LightPass {
    pub const ALL: [LightPass; 2] = [LightPass::Night, LightPass::Day];

    /// Slot of this pass in the tile's per-pass arrays.
    pub const fn index(self) -> usize {
        match self {
            LightPass::Night => 0,
            LightPass::Day => 1,
        }
    }

    /// Suffix of the worldspawn keys that configure this pass.
    pub const fn key_suffix(self) -> &'static str {
        match self {
            LightPass::Night => "night",
            LightPass::Day => "day",
        }
    }
}

/// Distance falloff of point and spot lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Falloff {
    /// `intensity * REF² / d²`, see [`crate::light::direct::FALLOFF_REFERENCE`]
    #[default]
    InverseSquare,
    /// `intensity - d`
    Linear,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RadConfig {
    /// Patch grid size in world units, below 1 disables subdivision
    pub subdivide_size: Real,
    /// Sample every luxel five times
    pub extra_samples: bool,
    pub light_scale: Real,
    /// Scale of surface light intensity
    pub direct_scale: Real,
    /// Scale of entity light intensity
    pub entity_scale: Real,
    /// Brightest channel value written to the lump
    pub max_light: Real,
    pub num_bounce: usize,
    pub pass: LightPass,
    pub point_falloff: Falloff,
    /// Coordinates at or beyond this are a broken winding
    pub world_extent: Real,
    pub max_patches: usize,
    /// Most patches form factors are built between, bouncing needs one
    /// trace per patch pair
    pub max_transfer_patches: usize,
    pub max_light_data: usize,
    /// Overrides the tile's own light quantum when set, at most
    /// [`MAX_LIGHTQUANT`]
    pub light_quant_override: Option<u8>,
    /// Worker threads, `None` lets the pool decide
    pub threads: Option<usize>,
    /// Plane side tolerance, defaults to [`crate::float_types::tolerance`]
    pub clip_epsilon: Real,
}

impl Default for RadConfig {
    fn default() -> Self {
        Self {
            subdivide_size: 64.0,
            extra_samples: false,
            light_scale: 1.0,
            direct_scale: 0.4,
            entity_scale: 1.0,
            max_light: 255.0,
            num_bounce: 0,
            pass: LightPass::Night,
            point_falloff: Falloff::InverseSquare,
            world_extent: MAX_WORLD_WIDTH,
            max_patches: 65000,
            max_transfer_patches: 16384,
            max_light_data: MAX_MAP_LIGHTING,
            light_quant_override: None,
            threads: None,
            clip_epsilon: tolerance(),
        }
    }
}

impl RadConfig {
    /// Parse a config from TOML, filling missing keys with defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RadConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no bake can run with.
    pub fn validate(&self) -> Result<()> {
        if let Some(quant) = self.light_quant_override.filter(|&q| q > MAX_LIGHTQUANT) {
            return Err(BakeError::InvalidConfig {
                key: "light_quant_override",
                reason: format!("{quant} is above the maximum of {MAX_LIGHTQUANT}"),
            });
        }
        if !(self.clip_epsilon.is_finite() && self.clip_epsilon > 0.0) {
            return Err(BakeError::InvalidConfig {
                key: "clip_epsilon",
                reason: format!("{} is not a positive distance", self.clip_epsilon),
            });
        }
        if self.threads == Some(0) {
            return Err(BakeError::InvalidConfig {
                key: "threads",
                reason: "a pool needs at least one thread".to_owned(),
            });
        }
        Ok(())
    }

    /// The runner for [`Self::threads`], rayon backed when built with `parallel`.
    pub fn runner(&self) -> Result<DefaultRunner> {
        default_runner(self.threads)
    }

    /// Light quantum in effect for `tile_quant`.
    pub fn light_quant(&self, tile_quant: u8) -> u8 {
        self.light_quant_override.unwrap_or(tile_quant)
    }

    /// `max_light` limited to what fits a byte.
    pub fn byte_max_light(&self) -> Real {
        self.max_light.clamp(1.0, 255.0)
    }
}
