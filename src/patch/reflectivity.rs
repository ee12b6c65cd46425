//! Texture reflectivity.
//!
//! A face reflects the average color of its texture. Decoding is left to a
//! [`TextureSource`]; a texture that cannot be read reflects neutral gray.

use crate::errors::TextureError;
use crate::float_types::Real;
use hashbrown::HashMap;
use nalgebra::Vector3;

/// Reflectivity of textures that cannot be read.
pub const DEFAULT_REFLECTIVITY: Real = 0.5;

/// Decoded RGB texels.
#[derive(Debug, Clone, Default)]
pub struct Texels {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<[u8; 3]>,
}

/// Something that can decode a texture by name.
pub trait TextureSource {
    fn load(&self, name: &str) -> Result<Texels, TextureError>;
}

/// Knows no textures, every face reflects gray.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTextures;

impl TextureSource for NullTextures {
    fn load(&self, name: &str) -> Result<Texels, TextureError> {
        Err(TextureError::NotFound(name.to_owned()))
    }
}

/// Loads `<base>/textures/<name>.{tga,png,jpg}` with the `image` crate.
#[cfg(feature = "image-io")]
#[derive(Debug, Clone)]
pub struct ImageTextures {
    pub base: std::path::PathBuf,
}

#[cfg(feature = "image-io")]
impl ImageTextures {
    pub fn new(base: impl Into<std::path::PathBuf>) -> Self {
        ImageTextures { base: base.into() }
    }
}

#[cfg(feature = "image-io")]
impl TextureSource for ImageTextures {
    fn load(&self, name: &str) -> Result<Texels, TextureError> {
        let stem = self.base.join("textures").join(name);
        let path = ["tga", "png", "jpg"]
            .iter()
            .map(|ext| stem.with_extension(ext))
            .find(|path| path.is_file())
            .ok_or_else(|| TextureError::NotFound(name.to_owned()))?;

        let image = image::open(&path)
            .map_err(|source| TextureError::Decode {
                name: name.to_owned(),
                source,
            })?
            .to_rgb8();

        Ok(Texels {
            width: image.width(),
            height: image.height(),
            rgb: image.pixels().map(|p| p.0).collect(),
        })
    }
}

/// Per-texture reflectivity, each texture decoded at most once.
pub struct ReflectivityCache<'t> {
    source: &'t dyn TextureSource,
    cache: HashMap<String, Vector3<Real>>,
}

impl<'t> ReflectivityCache<'t> {
    pub fn new(source: &'t dyn TextureSource) -> Self {
        ReflectivityCache {
            source,
            cache: HashMap::new(),
        }
    }

    pub fn reflectivity(&mut self, texture: &str) -> Vector3<Real> {
        if let Some(known) = self.cache.get(texture) {
            return *known;
        }

        let value = match self.source.load(texture).and_then(|texels| {
            texture_reflectivity(&texels).ok_or_else(|| TextureError::Empty(texture.to_owned()))
        }) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("{err}, using default reflectivity");
                Vector3::repeat(DEFAULT_REFLECTIVITY)
            },
        };

        self.cache.insert(texture.to_owned(), value);
        value
    }
}

/// Average texel color scaled into [0, 1], brightest channel normalized to 1.
/// Dim textures (brightest channel below half) keep twice their brightness.
pub fn texture_reflectivity(texels: &Texels) -> Option<Vector3<Real>> {
    if texels.rgb.is_empty() {
        return None;
    }

    let sum = texels.rgb.iter().fold([0u64; 3], |mut acc, texel| {
        for (a, &c) in acc.iter_mut().zip(texel) {
            *a += u64::from(c);
        }
        acc
    });
    let count = texels.rgb.len() as Real * 255.0;
    let color = Vector3::new(
        sum[0] as Real / count,
        sum[1] as Real / count,
        sum[2] as Real / count,
    );

    let (mut normalized, scale) = color_normalize(&color);
    if scale < 0.5 {
        normalized *= scale * 2.0;
    }
    Some(normalized)
}

/// Split a color into a hue with its brightest channel at 1 and that
/// channel's value. Black stays black.
pub fn color_normalize(color: &Vector3<Real>) -> (Vector3<Real>, Real) {
    let max = color.max();
    if max <= 0.0 {
        return (Vector3::zeros(), 0.0);
    }
    (color / max, max)
}
