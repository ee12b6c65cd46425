use crate::bsp::{SurfaceFlags, Tile};
use crate::errors::Result;
use crate::float_types::{EQUAL_EPSILON, Real};
use nalgebra::{Point3, Vector3};

/// Averaged normals at every vertex touched by a phong shaded face.
#[derive(Debug, Clone, Default)]
pub struct VertexNormals {
    normals: Vec<Vector3<Real>>,
}

impl VertexNormals {
    /// Vertices shared by reference or position with phong faces get the
    /// mean of those faces' normals. Other vertices stay zero.
    pub fn build(tile: &Tile) -> Result<Self> {
        let mut corners: Vec<(usize, Vector3<Real>)> = Vec::new();
        for face in &tile.faces {
            if !tile.texinfo_of(face)?.flags.contains(SurfaceFlags::PHONG) {
                continue;
            }
            let normal = tile.face_plane(face)?.normal;
            for v in tile.face_vertex_indices(face)? {
                corners.push((v, normal));
            }
        }

        let mut normals = vec![Vector3::zeros(); tile.vertexes.len()];
        if corners.is_empty() {
            return Ok(VertexNormals { normals });
        }

        for (vert, normal) in normals.iter_mut().enumerate() {
            let point = tile.vertexes[vert];
            let sum = corners
                .iter()
                .filter(|(v, _)| *v == vert || same_point(&tile.vertexes[*v], &point))
                .fold(Vector3::zeros(), |acc, (_, n)| acc + n);
            *normal = sum.try_normalize(Real::EPSILON).unwrap_or_else(Vector3::zeros);
        }

        Ok(VertexNormals { normals })
    }

    pub fn is_empty(&self) -> bool {
        self.normals.iter().all(|n| *n == Vector3::zeros())
    }

    pub fn get(&self, vertex: usize) -> Option<Vector3<Real>> {
        self.normals
            .get(vertex)
            .copied()
            .filter(|n| *n != Vector3::zeros())
    }

    /// Normal of the face vertex nearest to `pos`, or `fallback` when that
    /// vertex has none.
    pub fn sample_normal(
        &self,
        tile: &Tile,
        vertices: &[usize],
        pos: &Point3<Real>,
        fallback: Vector3<Real>,
    ) -> Vector3<Real> {
        vertices
            .iter()
            .min_by(|a, b| {
                let da = (tile.vertexes[**a] - pos).norm_squared();
                let db = (tile.vertexes[**b] - pos).norm_squared();
                da.total_cmp(&db)
            })
            .and_then(|&v| self.get(v))
            .unwrap_or(fallback)
    }
}

fn same_point(a: &Point3<Real>, b: &Point3<Real>) -> bool {
    (0..3).all(|i| (a[i] - b[i]).abs() <= EQUAL_EPSILON)
}
