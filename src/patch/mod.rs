//! Radiosity patches.
//!
//! Every lit face starts as one patch; subdivision splits patches into
//! grid-sized siblings. Patches live in a [`PatchTable`] arena and each face
//! chains its patches through `next` indices starting at the face head.

pub mod builder;
pub mod reflectivity;
pub mod subdivide;

pub use builder::{back_planes, make_patches};
pub use reflectivity::{NullTextures, ReflectivityCache, Texels, TextureSource};
pub use subdivide::subdivide_patches;

#[cfg(feature = "image-io")]
pub use reflectivity::ImageTextures;

use crate::errors::{BakeError, Result};
use crate::float_types::Real;
use crate::geometry::bounds::Bounds;
use crate::geometry::plane::Plane;
use crate::geometry::winding::Winding;
use nalgebra::{Point3, Vector3};

#[derive(Debug, Clone)]
pub struct Patch {
    pub winding: Winding,
    /// Copy of the tile plane, back-plane, or offset plane the patch faces
    pub plane: Plane,
    pub face: usize,
    /// Winding center pushed one unit off the surface
    pub origin: Point3<Real>,
    /// Winding area, never below 1
    pub area: Real,
    pub reflectivity: Vector3<Real>,
    /// Emitted light
    pub baselight: Vector3<Real>,
    /// Light received so far
    pub totallight: Vector3<Real>,
    /// Average direct light of the samples that fell on the patch
    pub samplelight: Vector3<Real>,
    pub samples: u32,
    /// Next patch of the same face
    pub next: Option<usize>,
}

impl Patch {
    pub fn new(
        winding: Winding,
        plane: Plane,
        face: usize,
        reflectivity: Vector3<Real>,
        baselight: Vector3<Real>,
    ) -> Self {
        let mut patch = Patch {
            winding,
            plane,
            face,
            origin: Point3::origin(),
            area: 1.0,
            reflectivity,
            baselight,
            totallight: baselight,
            samplelight: Vector3::zeros(),
            samples: 0,
            next: None,
        };
        patch.recompute();
        patch
    }

    /// Refresh area and origin after the winding changed.
    pub fn recompute(&mut self) {
        self.area = self.winding.area().max(1.0);
        self.origin = self.winding.center() + self.plane.normal;
    }

    /// A patch sharing everything but the winding.
    pub fn sibling(&self, winding: Winding) -> Self {
        let mut patch = Patch {
            winding,
            next: None,
            ..self.clone()
        };
        patch.recompute();
        patch
    }

    pub fn bounds(&self) -> Bounds {
        self.winding.bounds()
    }
}

/// Arena of patches with a per-face chain.
#[derive(Debug, Clone)]
pub struct PatchTable {
    patches: Vec<Patch>,
    face_heads: Vec<Option<usize>>,
    face_tails: Vec<Option<usize>>,
    cap: usize,
}

impl PatchTable {
    pub fn new(num_faces: usize, cap: usize) -> Self {
        PatchTable {
            patches: Vec::new(),
            face_heads: vec![None; num_faces],
            face_tails: vec![None; num_faces],
            cap,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn get(&self, index: usize) -> &Patch {
        &self.patches[index]
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut Patch {
        &mut self.patches[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patch> {
        self.patches.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Patch> {
        self.patches.iter_mut()
    }

    fn check_cap(&self) -> Result<()> {
        if self.patches.len() >= self.cap {
            return Err(BakeError::PatchOverflow { max: self.cap });
        }
        Ok(())
    }

    /// Append `patch` to the end of its face's chain.
    pub fn push(&mut self, patch: Patch) -> Result<usize> {
        self.check_cap()?;
        let face = patch.face;
        if face >= self.face_heads.len() {
            self.face_heads.resize(face + 1, None);
            self.face_tails.resize(face + 1, None);
        }

        let index = self.patches.len();
        self.patches.push(patch);
        match self.face_tails[face] {
            Some(tail) => self.patches[tail].next = Some(index),
            None => self.face_heads[face] = Some(index),
        }
        self.face_tails[face] = Some(index);
        Ok(index)
    }

    /// Link `patch` into the chain right after `after`.
    pub fn insert_after(&mut self, after: usize, mut patch: Patch) -> Result<usize> {
        self.check_cap()?;
        let index = self.patches.len();
        let face = self.patches[after].face;
        patch.face = face;
        patch.next = self.patches[after].next;
        self.patches.push(patch);
        self.patches[after].next = Some(index);
        if self.face_tails[face] == Some(after) {
            self.face_tails[face] = Some(index);
        }
        Ok(index)
    }

    pub fn face_head(&self, face: usize) -> Option<usize> {
        self.face_heads.get(face).copied().flatten()
    }

    /// Indices of the patches of `face` in chain order.
    pub fn face_patches(&self, face: usize) -> FacePatches<'_> {
        FacePatches {
            table: self,
            next: self.face_head(face),
        }
    }
}

pub struct FacePatches<'a> {
    table: &'a PatchTable,
    next: Option<usize>,
}

impl Iterator for FacePatches<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.table.patches[current].next;
        Some(current)
    }
}
