// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized plane-side tolerance used by clipping and tracing.
/// Defaults to [`ON_EPSILON`], but can be overridden:
///  1) **Build-time**: set env var `RADLIGHT_TOLERANCE` (e.g. `RADLIGHT_TOLERANCE=0.05 cargo build`)
///  2) **Runtime**: call [`set_tolerance`] once before baking
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

/// Returns the current plane-side tolerance.
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        if let Some(environment_variable) = option_env!("RADLIGHT_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        ON_EPSILON
    })
}

/// Set the tolerance programmatically once (subsequent calls are ignored).
pub fn set_tolerance(value: Real) {
    let _ = TOLERANCE_CELL.set(value.max(Real::EPSILON));
}

/// Distance within which a point counts as lying on a plane.
pub const ON_EPSILON: Real = 0.1;

/// Two coordinates closer than this are the same vertex.
pub const EQUAL_EPSILON: Real = 0.001;

/// Edges shorter than this do not count towards a usable winding.
pub const EDGE_LENGTH: Real = 0.2;

/// Maximum coordinate magnitude of a sane map.
pub const MAX_WORLD_WIDTH: Real = 4096.0;

// Pi
/// Archimedes' constant (π)
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
/// Archimedes' constant (π)
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

/// Degrees to radians.
pub const DEG_TO_RAD: Real = PI / 180.0;
