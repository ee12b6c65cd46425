//! One bake of one tile.
//!
//! [`RadWorld`] owns everything derived from the tile for the duration of a
//! bake: back-planes, patches, lights, the trace tree. Nothing outlives it,
//! so baking another tile, or the other pass, starts from scratch.

use crate::bsp::Tile;
use crate::config::{LightPass, RadConfig};
use crate::entities::EntityList;
use crate::errors::{BakeError, Result};
use crate::float_types::Real;
use crate::geometry::bounds::Bounds;
use crate::geometry::plane::Plane;
use crate::light::bounce::{bounce_light, make_transfers};
use crate::light::{
    FaceLight, LightContext, LightSet, Triangulation, VertexNormals, build_facelight, collect_lights,
    final_light_face,
};
use crate::patch::builder::{back_planes, make_patches};
use crate::patch::reflectivity::{ReflectivityCache, TextureSource};
use crate::patch::subdivide::subdivide_patches;
use crate::patch::PatchTable;
use crate::scheduler::JobRunner;
use crate::trace::TraceTree;
use hashbrown::HashMap;
use nalgebra::Vector3;

/// Summary of a finished bake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BakeStats {
    pub patches: usize,
    pub direct_lights: usize,
    pub lit_faces: usize,
    pub light_bytes: usize,
}

pub struct RadWorld<'t> {
    tile: &'t Tile,
    config: &'t RadConfig,
    backplanes: Vec<Plane>,
    face_offsets: Vec<Vector3<Real>>,
    patches: PatchTable,
    lights: LightSet,
    trace: TraceTree,
    normals: VertexNormals,
}

impl<'t> RadWorld<'t> {
    /// Everything the per-face passes read: patches, subdivided and with
    /// emitters turned into lights, the trace tree and phong normals.
    pub fn new(tile: &'t Tile, config: &'t RadConfig, textures: &dyn TextureSource) -> Result<Self> {
        config.validate()?;
        if tile.nodes.is_empty() || tile.faces.is_empty() {
            return Err(BakeError::EmptyWorld);
        }

        let entities = EntityList::parse(&tile.entity_string)?;
        let backplanes = back_planes(&tile.planes);

        let mut cache = ReflectivityCache::new(textures);
        let mesh = make_patches(tile, &entities, &backplanes, &mut cache, config)?;
        let mut patches = mesh.patches;
        subdivide_patches(&mut patches, config.subdivide_size, config.clip_epsilon)?;

        let trace = TraceTree::build(tile, config.clip_epsilon)?;
        let lights = collect_lights(&mut patches, &entities, config);
        let normals = VertexNormals::build(tile)?;

        Ok(RadWorld {
            tile,
            config,
            backplanes,
            face_offsets: mesh.face_offsets,
            patches,
            lights,
            trace,
            normals,
        })
    }

    pub fn patches(&self) -> &PatchTable {
        &self.patches
    }

    pub fn lights(&self) -> &LightSet {
        &self.lights
    }

    /// Negated tile planes, indexed like [`Tile::planes`].
    pub fn backplanes(&self) -> &[Plane] {
        &self.backplanes
    }

    fn context(&self) -> LightContext<'_> {
        LightContext {
            tile: self.tile,
            config: self.config,
            lights: &self.lights,
            trace: &self.trace,
            patches: &self.patches,
            face_offsets: &self.face_offsets,
            normals: &self.normals,
        }
    }

    /// Direct light for every face, `None` for faces that are not lit.
    ///
    /// With bouncing enabled the samples are also averaged onto the patches
    /// once every face is done.
    pub fn build_facelights<R: JobRunner>(&mut self, runner: &R) -> Result<Vec<Option<FaceLight>>> {
        let results = {
            let ctx = self.context();
            runner.run("facelights", self.tile.faces.len(), |face| build_facelight(&ctx, face))
        };

        let mut facelights = Vec::with_capacity(results.len());
        for result in results {
            match result? {
                Some((facelight, samples)) => {
                    for sample in samples {
                        let patch = self.patches.get_mut(sample.patch);
                        patch.samplelight += sample.light;
                        patch.samples += sample.count;
                    }
                    facelights.push(Some(facelight));
                },
                None => facelights.push(None),
            }
        }

        for patch in self.patches.iter_mut() {
            if patch.samples > 0 {
                patch.samplelight /= patch.samples as Real;
            }
        }
        Ok(facelights)
    }

    /// Radiosity bounces over the patches.
    pub fn bounce<R: JobRunner>(&mut self, runner: &R) -> Result<()> {
        if self.config.num_bounce == 0 {
            return Ok(());
        }
        if self.patches.len() > self.config.max_transfer_patches {
            return Err(BakeError::TransferOverflow {
                patches: self.patches.len(),
                max: self.config.max_transfer_patches,
            });
        }
        let transfers = make_transfers(&self.patches, &self.trace, runner);
        bounce_light(&mut self.patches, &transfers, self.config.num_bounce, runner);
        Ok(())
    }

    /// Patch origins of every face on the same plane and side as `face`,
    /// near enough to matter.
    fn face_triangulation(&self, face_index: usize, plane_faces: &HashMap<(usize, bool), Vec<usize>>) -> Result<Triangulation> {
        let face = self.tile.face(face_index)?;
        let normal = self.tile.face_plane(face)?.normal;
        let offset = self.face_offsets[face_index];
        let bounds = Bounds::from_points(
            &self
                .tile
                .face_points(face_index)?
                .into_iter()
                .map(|p| p + offset)
                .collect::<Vec<_>>(),
        );
        let reach = if self.config.subdivide_size >= 1.0 {
            self.config.subdivide_size * 2.0
        } else {
            Real::MAX
        };
        let near = bounds.expanded(reach.min(Real::MAX / 4.0));

        let mut trian = Triangulation::new(normal);
        for &other in plane_faces.get(&(face.plane, face.side)).into_iter().flatten() {
            for index in self.patches.face_patches(other) {
                let patch = self.patches.get(index);
                if near.contains_point(&patch.origin) {
                    trian.add_point(patch.origin, patch.totallight);
                }
            }
        }
        trian.triangulate();
        Ok(trian)
    }

    /// Encode every lit face into lightmap bytes, in face order.
    pub fn final_light<R: JobRunner>(&self, runner: &R, facelights: &[Option<FaceLight>]) -> Result<Vec<Option<Vec<u8>>>> {
        let bouncing = self.config.num_bounce > 0;
        let mut plane_faces: HashMap<(usize, bool), Vec<usize>> = HashMap::new();
        if bouncing {
            for (i, face) in self.tile.faces.iter().enumerate() {
                plane_faces.entry((face.plane, face.side)).or_default().push(i);
            }
        }

        runner
            .run("final light", facelights.len(), |face| -> Result<Option<Vec<u8>>> {
                let Some(facelight) = &facelights[face] else {
                    return Ok(None);
                };
                let trian = if bouncing {
                    Some(self.face_triangulation(face, &plane_faces)?)
                } else {
                    None
                };
                Ok(Some(final_light_face(
                    facelight,
                    trian.as_ref(),
                    &self.lights.ambient,
                    self.config,
                )))
            })
            .into_iter()
            .collect()
    }
}

/// Replace the pass's light lump with `blocks`, appended in face order.
///
/// Faces without a block get no offset. Returns the lump size.
pub fn write_light_lump(tile: &mut Tile, pass: LightPass, blocks: Vec<Option<Vec<u8>>>, max: usize) -> Result<usize> {
    let slot = pass.index();
    let mut lump = Vec::new();

    for (face, block) in tile.faces.iter_mut().zip(blocks) {
        face.light_offset[slot] = None;
        let Some(block) = block else {
            continue;
        };
        let size = lump.len() + block.len();
        if size > max {
            return Err(BakeError::LightDataOverflow { size, max });
        }
        face.light_offset[slot] = Some(lump.len());
        lump.extend_from_slice(&block);
    }

    let size = lump.len();
    tile.light_data[slot] = lump;
    Ok(size)
}

/// Bake the configured pass of `tile` and store it in the tile.
pub fn light_tile<R: JobRunner>(
    tile: &mut Tile,
    config: &RadConfig,
    textures: &dyn TextureSource,
    runner: &R,
) -> Result<BakeStats> {
    log::info!("baking {:?} lighting for {} faces", config.pass, tile.faces.len());

    let (blocks, patches, direct_lights) = {
        let mut world = RadWorld::new(tile, config, textures)?;
        let facelights = world.build_facelights(runner)?;
        world.bounce(runner)?;
        let blocks = world.final_light(runner, &facelights)?;
        (blocks, world.patches().len(), world.lights().len())
    };

    let lit_faces = blocks.iter().filter(|b| b.is_some()).count();
    let light_bytes = write_light_lump(tile, config.pass, blocks, config.max_light_data)?;

    log::info!("{lit_faces} faces lit, {light_bytes} bytes of light data");
    Ok(BakeStats {
        patches,
        direct_lights,
        lit_faces,
        light_bytes,
    })
}
