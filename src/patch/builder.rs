use crate::bsp::{SurfaceFlags, Tile};
use crate::config::RadConfig;
use crate::entities::EntityList;
use crate::errors::{BakeError, Result};
use crate::float_types::Real;
use crate::geometry::plane::Plane;
use crate::geometry::winding::Winding;
use crate::patch::reflectivity::ReflectivityCache;
use crate::patch::{Patch, PatchTable};
use nalgebra::Vector3;

/// Negated copy of every tile plane, for faces looking along the back side.
pub fn back_planes(planes: &[Plane]) -> Vec<Plane> {
    planes.iter().map(Plane::flipped).collect()
}

/// Result of [`make_patches`].
#[derive(Debug, Clone)]
pub struct PatchMesh {
    pub patches: PatchTable,
    /// Origin offset of each face's brush entity, zero for world faces
    pub face_offsets: Vec<Vector3<Real>>,
}

/// One patch per face of every model, world first.
pub fn make_patches(
    tile: &Tile,
    entities: &EntityList,
    backplanes: &[Plane],
    textures: &mut ReflectivityCache<'_>,
    config: &RadConfig,
) -> Result<PatchMesh> {
    let mut patches = PatchTable::new(tile.faces.len(), config.max_patches);
    let mut face_offsets = vec![Vector3::zeros(); tile.faces.len()];

    for (m, model) in tile.models.iter().enumerate() {
        let entity = entities.for_model(m);
        let offset = entities.model_origin(m);
        // brush entity faces only emit when the entity asks for it
        let may_emit = m == 0 || entity.is_some_and(|e| e.int_for_key("_emit") != 0);

        for face_index in model.first_face..model.first_face + model.num_faces {
            let face = tile.face(face_index)?;
            face_offsets[face_index] = offset;

            let mut winding = Winding::from_face(tile, face_index)?;
            if offset != Vector3::zeros() {
                winding.translate(&offset);
            }
            if winding.is_huge(config.world_extent) {
                return Err(BakeError::HugeWinding {
                    face: face_index,
                    extent: config.world_extent,
                });
            }
            if winding.is_tiny() {
                log::debug!("face {face_index}: tiny winding dropped");
                continue;
            }

            let base = if face.side {
                backplanes
                    .get(face.plane)
                    .copied()
                    .ok_or_else(|| BakeError::CorruptTile(format!("plane {} out of range", face.plane)))?
            } else {
                *tile.plane(face.plane)?
            };
            let plane = if offset != Vector3::zeros() {
                base.translated(&offset)
            } else {
                base
            };

            let texinfo = tile.texinfo_of(face)?;
            let reflectivity = textures.reflectivity(&texinfo.texture);
            let mut baselight = Vector3::zeros();
            if texinfo.flags.contains(SurfaceFlags::LIGHT) {
                if texinfo.value <= 0.0 {
                    log::warn!(
                        "face {face_index}: surface light {} has no value, not emitting",
                        texinfo.texture
                    );
                } else if may_emit {
                    baselight = reflectivity * texinfo.value;
                }
            }

            patches.push(Patch::new(winding, plane, face_index, reflectivity, baselight))?;
        }
    }

    log::info!("{} patches from {} faces", patches.len(), tile.faces.len());
    Ok(PatchMesh {
        patches,
        face_offsets,
    })
}
