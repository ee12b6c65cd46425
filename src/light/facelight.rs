//! Direct light per lightmap sample.
//!
//! Samples sit on the face's texture-aligned luxel grid, one every
//! `2^lightquant` texels, back-projected onto the face plane.

use crate::bsp::{MAX_LIGHTQUANT, SurfaceFlags, Tile};
use crate::config::{Falloff, RadConfig};
use crate::errors::{BakeError, Result};
use crate::float_types::Real;
use crate::geometry::bounds::Bounds;
use crate::light::direct::{FALLOFF_REFERENCE, LightKind, LightSet};
use crate::light::phong::VertexNormals;
use crate::patch::PatchTable;
use crate::trace::TraceTree;
use nalgebra::{Point3, Vector3};

/// Most samples a single face may have.
pub const SINGLEMAP: usize = 256 * 256 * 4;

/// Sub-luxel offsets used with extra sampling, the first is the plain grid.
pub const SAMPLE_OFFSETS: [(Real, Real); 5] = [(0.0, 0.0), (-0.4, -0.4), (0.4, -0.4), (0.4, 0.4), (-0.4, 0.4)];

/// Light below this (summed over channels) is not fed back to patches.
const MIN_PATCH_SAMPLE: Real = 3.0;

/// How far outside a patch's bounds a sample may land and still count.
const PATCH_SAMPLE_SLACK: Real = 8.0;

/// Distance a sun ray is traced.
const SUN_DISTANCE: Real = 8192.0;

/// Lightmap samples of one face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceLight {
    pub width: usize,
    pub height: usize,
    /// Sample positions on the plain grid, row major
    pub origins: Vec<Point3<Real>>,
    /// Direct light per sample
    pub samples: Vec<Vector3<Real>>,
}

/// Direct light summed onto one patch by one face's samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchSample {
    pub patch: usize,
    pub light: Vector3<Real>,
    pub count: u32,
}

/// Everything a face job reads. Nothing in here changes during the pass.
#[derive(Clone, Copy)]
pub struct LightContext<'a> {
    pub tile: &'a Tile,
    pub config: &'a RadConfig,
    pub lights: &'a LightSet,
    pub trace: &'a TraceTree,
    pub patches: &'a PatchTable,
    pub face_offsets: &'a [Vector3<Real>],
    pub normals: &'a VertexNormals,
}

/// Texture space layout of one face.
#[derive(Debug, Clone)]
pub struct LightInfo {
    pub normal: Vector3<Real>,
    pub dist: Real,
    pub center: Point3<Real>,
    pub texmins: [i32; 2],
    pub texsize: [i32; 2],
    pub texorg: Point3<Real>,
    pub textoworld: [Vector3<Real>; 2],
    pub step: Real,
}

impl LightInfo {
    pub fn new(tile: &Tile, face_index: usize, offset: &Vector3<Real>, light_quant: u8) -> Result<Self> {
        let face = tile.face(face_index)?;
        let plane = tile.face_plane(face)?;
        let tex = tile.texinfo_of(face)?;
        if light_quant > MAX_LIGHTQUANT {
            return Err(BakeError::CorruptTile(format!(
                "light quantum {light_quant} above the maximum of {MAX_LIGHTQUANT}"
            )));
        }
        let step = (1u32 << light_quant) as Real;

        // extents
        let points = tile.face_points(face_index)?;
        let bounds = Bounds::from_points(&points);
        let mut stmins = [Real::MAX; 2];
        let mut stmaxs = [Real::MIN; 2];
        for point in &points {
            for j in 0..2 {
                let val = point.coords.dot(&tex.axis(j)) + tex.vecs[j][3];
                stmins[j] = stmins[j].min(val);
                stmaxs[j] = stmaxs[j].max(val);
            }
        }
        // sized in floats first, the casts below only see sane extents
        let lows = [(stmins[0] / step).floor(), (stmins[1] / step).floor()];
        let sizes = [(stmaxs[0] / step).ceil() - lows[0], (stmaxs[1] / step).ceil() - lows[1]];
        let samples = (sizes[0] + 1.0) * (sizes[1] + 1.0);
        if !samples.is_finite() || samples > SINGLEMAP as Real {
            return Err(BakeError::SurfaceTooLarge {
                face: face_index,
                width: (sizes[0] + 1.0) as usize,
                height: (sizes[1] + 1.0) as usize,
            });
        }
        let texmins = [lows[0] as i32, lows[1] as i32];
        let texsize = [sizes[0] as i32, sizes[1] as i32];

        // a normal to the texture axes, points can slide along it without
        // changing their s/t
        let (s_axis, t_axis) = (tex.axis(0), tex.axis(1));
        let mut texnormal = t_axis.cross(&s_axis).try_normalize(Real::EPSILON).unwrap_or(plane.normal);
        let mut distscale = texnormal.dot(&plane.normal);
        if distscale == 0.0 {
            log::debug!("face {face_index}: texture axis perpendicular to face");
            distscale = 1.0;
        }
        if distscale < 0.0 {
            distscale = -distscale;
            texnormal = -texnormal;
        }
        // ratio of distance along the texture normal to distance along the
        // plane normal
        let distscale = 1.0 / distscale;

        let mut textoworld = [Vector3::zeros(); 2];
        for (i, axis) in [s_axis, t_axis].iter().enumerate() {
            let len = axis.norm();
            if len == 0.0 {
                return Err(BakeError::CorruptTile(format!(
                    "texinfo {} has a zero texture axis",
                    face.texinfo
                )));
            }
            let distance = axis.dot(&plane.normal) * distscale;
            textoworld[i] = (axis - texnormal * distance) / (len * len);
        }

        let mut texorg = Point3::from(-tex.vecs[0][3] * textoworld[0] - tex.vecs[1][3] * textoworld[1]);
        // onto the plane, one unit in front
        let dist = (texorg.coords.dot(&plane.normal) - plane.dist - 1.0) * distscale;
        texorg -= texnormal * dist;
        texorg += offset;

        Ok(LightInfo {
            normal: plane.normal,
            dist: plane.dist + offset.dot(&plane.normal),
            center: bounds.center() + offset,
            texmins,
            texsize,
            texorg,
            textoworld,
            step,
        })
    }

    pub fn width(&self) -> usize {
        (self.texsize[0] + 1) as usize
    }

    pub fn height(&self) -> usize {
        (self.texsize[1] + 1) as usize
    }

    /// World positions of the grid shifted by `(sofs, tofs)` luxels.
    pub fn points(&self, sofs: Real, tofs: Real) -> Vec<Point3<Real>> {
        let starts = self.texmins[0] as Real * self.step;
        let startt = self.texmins[1] as Real * self.step;
        let mut out = Vec::with_capacity(self.width() * self.height());
        for t in 0..self.height() {
            for s in 0..self.width() {
                let us = starts + (s as Real + sofs) * self.step;
                let ut = startt + (t as Real + tofs) * self.step;
                out.push(self.texorg + self.textoworld[0] * us + self.textoworld[1] * ut);
            }
        }
        out
    }
}

/// Light every sample of `face_index`.
///
/// Returns `None` for faces that are never lightmapped. The patch samples
/// are only gathered when bouncing is enabled.
pub fn build_facelight(ctx: &LightContext<'_>, face_index: usize) -> Result<Option<(FaceLight, Vec<PatchSample>)>> {
    let tile = ctx.tile;
    let face = tile.face(face_index)?;
    let tex = tile.texinfo_of(face)?;
    if tex.flags.contains(SurfaceFlags::WARP) {
        return Ok(None);
    }

    let offset = ctx.face_offsets.get(face_index).copied().unwrap_or_else(Vector3::zeros);
    let info = LightInfo::new(tile, face_index, &offset, ctx.config.light_quant(tile.light_quant))?;

    let offsets = if ctx.config.extra_samples {
        &SAMPLE_OFFSETS[..]
    } else {
        &SAMPLE_OFFSETS[..1]
    };
    let weight = 1.0 / offsets.len() as Real;

    let phong_vertices = if tex.flags.contains(SurfaceFlags::PHONG) {
        Some(tile.face_vertex_indices(face)?)
    } else {
        None
    };

    let mut origins = Vec::new();
    let mut samples = vec![Vector3::zeros(); info.width() * info.height()];
    for (k, &(sofs, tofs)) in offsets.iter().enumerate() {
        let points = info.points(sofs, tofs);
        for (sample, point) in samples.iter_mut().zip(&points) {
            let normal = match &phong_vertices {
                Some(vertices) => ctx
                    .normals
                    .sample_normal(tile, vertices, &(point - offset), info.normal),
                None => info.normal,
            };
            *sample += gather_sample_light(ctx, point, &normal, &info.center, weight);
        }
        if k == 0 {
            origins = points;
        }
    }

    let patch_samples = if ctx.config.num_bounce > 0 {
        patch_samples(ctx.patches, face_index, &origins, &samples)
    } else {
        Vec::new()
    };

    // the emitted light went out as a direct light, but the surface itself
    // stays fully bright
    if let Some(head) = ctx.patches.face_head(face_index) {
        let baselight = ctx.patches.get(head).baselight;
        if baselight != Vector3::zeros() {
            for sample in &mut samples {
                *sample += baselight;
            }
        }
    }

    Ok(Some((
        FaceLight {
            width: info.width(),
            height: info.height(),
            origins,
            samples,
        },
        patch_samples,
    )))
}

/// Direct light reaching one sample.
pub fn gather_sample_light(
    ctx: &LightContext<'_>,
    pos: &Point3<Real>,
    normal: &Vector3<Real>,
    center: &Point3<Real>,
    weight: Real,
) -> Vector3<Real> {
    // move into the level, away from the face center and off the surface
    let dir = (pos - center).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
    let pos = pos + dir * 0.5 + normal * 0.5;

    let mut out = Vector3::zeros();
    for light in &ctx.lights.lights {
        let delta = light.origin - pos;
        let dist = delta.norm();
        if dist <= 0.0 {
            continue;
        }
        let delta = delta / dist;
        let dot = delta.dot(normal);
        if dot <= 0.001 {
            continue; // behind sample surface
        }

        let scale = match light.kind {
            LightKind::Point => point_falloff(ctx.config.point_falloff, light.intensity, dist) * dot,
            LightKind::Surface => {
                let dot2 = -delta.dot(&light.normal);
                if dot2 <= 0.001 {
                    continue; // behind light surface
                }
                light.intensity / (dist * dist) * dot * dot2
            },
            LightKind::Spot => {
                let dot2 = -delta.dot(&light.normal);
                if dot2 <= light.stopdot {
                    continue; // outside light cone
                }
                point_falloff(ctx.config.point_falloff, light.intensity, dist) * dot
            },
        };

        if scale <= 0.0 {
            continue;
        }
        if ctx.trace.test_line(&pos, &light.origin) {
            continue;
        }
        out += light.color * (scale * weight);
    }

    if let Some(sun) = &ctx.lights.sun {
        let dot = sun.dir.dot(normal);
        if dot > 0.001 && !ctx.trace.test_line(&pos, &(pos + sun.dir * SUN_DISTANCE)) {
            out += sun.color * (sun.intensity * dot * weight);
        }
    }

    out
}

#[inline]
fn point_falloff(falloff: Falloff, intensity: Real, dist: Real) -> Real {
    match falloff {
        Falloff::InverseSquare => {
            let ratio = FALLOFF_REFERENCE / dist.max(1.0);
            intensity * ratio * ratio
        },
        Falloff::Linear => intensity - dist,
    }
}

/// Sum the bright samples onto every patch of the face they roughly touch.
fn patch_samples(
    patches: &PatchTable,
    face_index: usize,
    origins: &[Point3<Real>],
    samples: &[Vector3<Real>],
) -> Vec<PatchSample> {
    let mut out: Vec<PatchSample> = patches
        .face_patches(face_index)
        .map(|patch| PatchSample {
            patch,
            light: Vector3::zeros(),
            count: 0,
        })
        .collect();
    let bounds: Vec<Bounds> = out
        .iter()
        .map(|s| patches.get(s.patch).bounds().expanded(PATCH_SAMPLE_SLACK))
        .collect();

    for (origin, color) in origins.iter().zip(samples) {
        if color.sum() < MIN_PATCH_SAMPLE {
            continue;
        }
        for (entry, bounds) in out.iter_mut().zip(&bounds) {
            if bounds.contains_point(origin) {
                entry.light += color;
                entry.count += 1;
            }
        }
    }

    out.retain(|s| s.count > 0);
    out
}
