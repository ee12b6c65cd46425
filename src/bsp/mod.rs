//! In-memory BSP tile.
//!
//! This is the input contract of the baker: the upstream compile stages fill
//! in the tables, the baker reads them and writes only the per-pass light
//! lumps and face light offsets.

pub mod flags;

pub use flags::{ContentFlags, SurfaceFlags};

use crate::errors::{BakeError, Result};
use crate::float_types::Real;
use crate::geometry::plane::Plane;
use nalgebra::{Point3, Vector3};

/// Default log2 of world units per lightmap sample.
pub const DEFAULT_LIGHTQUANT: u8 = 4;

/// Coarsest light quantum, 256 world units per lightmap sample.
pub const MAX_LIGHTQUANT: u8 = 8;

/// A child reference in [`BspNode::children`]: `>= 0` is a node index,
/// negative is leaf `-(child + 1)`.
pub type ChildRef = i32;

#[inline]
pub const fn leaf_child(leaf: usize) -> ChildRef {
    -(leaf as ChildRef) - 1
}

#[derive(Debug, Clone, PartialEq)]
pub struct BspNode {
    /// `None` for grouping nodes that only join two subtrees
    pub plane: Option<usize>,
    pub children: [ChildRef; 2],
    pub mins: Point3<Real>,
    pub maxs: Point3<Real>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BspLeaf {
    pub contents: ContentFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BspEdge {
    pub v: [usize; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct BspFace {
    pub plane: usize,
    /// The face looks along the negated plane
    pub side: bool,
    pub first_edge: usize,
    pub num_edges: usize,
    pub texinfo: usize,
    /// Byte offset into each pass's light lump, `None` until lit
    pub light_offset: [Option<usize>; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TexInfo {
    /// `s = dot(p, vecs[0].xyz) + vecs[0][3]`, likewise `t`
    pub vecs: [[Real; 4]; 2],
    pub flags: SurfaceFlags,
    pub value: Real,
    pub texture: String,
}

impl TexInfo {
    #[inline]
    pub fn axis(&self, i: usize) -> Vector3<Real> {
        Vector3::new(self.vecs[i][0], self.vecs[i][1], self.vecs[i][2])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BspModel {
    pub mins: Point3<Real>,
    pub maxs: Point3<Real>,
    pub head_node: usize,
    pub first_face: usize,
    pub num_faces: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub planes: Vec<Plane>,
    pub nodes: Vec<BspNode>,
    pub leafs: Vec<BspLeaf>,
    pub faces: Vec<BspFace>,
    pub edges: Vec<BspEdge>,
    pub surfedges: Vec<i32>,
    pub vertexes: Vec<Point3<Real>>,
    pub models: Vec<BspModel>,
    pub texinfo: Vec<TexInfo>,
    pub entity_string: String,
    pub light_quant: u8,
    /// Light lumps indexed by [`crate::config::LightPass::index`]
    pub light_data: [Vec<u8>; 2],
}

impl Default for Tile {
    fn default() -> Self {
        Tile {
            planes: Vec::new(),
            nodes: Vec::new(),
            leafs: Vec::new(),
            faces: Vec::new(),
            edges: Vec::new(),
            surfedges: Vec::new(),
            vertexes: Vec::new(),
            models: Vec::new(),
            texinfo: Vec::new(),
            entity_string: String::new(),
            light_quant: DEFAULT_LIGHTQUANT,
            light_data: [Vec::new(), Vec::new()],
        }
    }
}

fn corrupt(what: &str, index: usize, len: usize) -> BakeError {
    BakeError::CorruptTile(format!("{what} {index} out of range ({len} entries)"))
}

impl Tile {
    pub fn face(&self, face: usize) -> Result<&BspFace> {
        self.faces
            .get(face)
            .ok_or_else(|| corrupt("face", face, self.faces.len()))
    }

    pub fn plane(&self, plane: usize) -> Result<&Plane> {
        self.planes
            .get(plane)
            .ok_or_else(|| corrupt("plane", plane, self.planes.len()))
    }

    pub fn leaf(&self, leaf: usize) -> Result<&BspLeaf> {
        self.leafs
            .get(leaf)
            .ok_or_else(|| corrupt("leaf", leaf, self.leafs.len()))
    }

    pub fn texinfo_of(&self, face: &BspFace) -> Result<&TexInfo> {
        self.texinfo
            .get(face.texinfo)
            .ok_or_else(|| corrupt("texinfo", face.texinfo, self.texinfo.len()))
    }

    /// Plane the face looks along, negated for back sided faces.
    pub fn face_plane(&self, face: &BspFace) -> Result<Plane> {
        let plane = self.plane(face.plane)?;
        Ok(if face.side { plane.flipped() } else { *plane })
    }

    /// Vertex index of the `k`th corner of `face`.
    pub fn face_vertex_index(&self, face: &BspFace, k: usize) -> Result<usize> {
        let slot = face.first_edge + k;
        let e = *self
            .surfedges
            .get(slot)
            .ok_or_else(|| corrupt("surfedge", slot, self.surfedges.len()))?;
        let edge_index = e.unsigned_abs() as usize;
        let edge = self
            .edges
            .get(edge_index)
            .ok_or_else(|| corrupt("edge", edge_index, self.edges.len()))?;
        let v = if e >= 0 { edge.v[0] } else { edge.v[1] };
        if v >= self.vertexes.len() {
            return Err(corrupt("vertex", v, self.vertexes.len()));
        }
        Ok(v)
    }

    /// Corner vertex indices of `face` in loop order.
    pub fn face_vertex_indices(&self, face: &BspFace) -> Result<Vec<usize>> {
        if face.num_edges < 3 {
            return Err(BakeError::CorruptTile(format!(
                "face with {} edges at surfedge {}",
                face.num_edges, face.first_edge
            )));
        }
        (0..face.num_edges)
            .map(|k| self.face_vertex_index(face, k))
            .collect()
    }

    /// Corner positions of face `face` in loop order.
    pub fn face_points(&self, face: usize) -> Result<Vec<Point3<Real>>> {
        let face = self.face(face)?;
        Ok(self
            .face_vertex_indices(face)?
            .into_iter()
            .map(|v| self.vertexes[v])
            .collect())
    }
}
