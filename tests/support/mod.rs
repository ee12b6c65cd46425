//! Test support library
//! Builds small hand-made tiles for the integration tests.
#![allow(dead_code)]

use nalgebra::{Point3, Vector3};
use radlight::{
    bsp::{
        BspEdge, BspFace, BspLeaf, BspModel, BspNode, ChildRef, ContentFlags, SurfaceFlags, TexInfo,
        Tile, leaf_child,
    },
    float_types::Real,
    geometry::plane::Plane,
};

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

pub fn p(x: Real, y: Real, z: Real) -> Point3<Real> {
    Point3::new(x, y, z)
}

/// Corners of the axial rectangle `min..max` on `z`, wound to face up.
pub fn floor_quad(min: (Real, Real), max: (Real, Real), z: Real) -> Vec<Point3<Real>> {
    vec![
        p(min.0, min.1, z),
        p(min.0, max.1, z),
        p(max.0, max.1, z),
        p(max.0, min.1, z),
    ]
}

/// Incrementally assembled [`Tile`].
#[derive(Default)]
pub struct TileBuilder {
    pub tile: Tile,
}

impl TileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `plane`, reusing an identical one.
    pub fn plane(&mut self, plane: Plane) -> usize {
        if let Some(i) = self
            .tile
            .planes
            .iter()
            .position(|q| q.normal == plane.normal && q.dist == plane.dist)
        {
            return i;
        }
        self.tile.planes.push(plane);
        self.tile.planes.len() - 1
    }

    pub fn leaf(&mut self, contents: ContentFlags) -> ChildRef {
        self.tile.leafs.push(BspLeaf { contents });
        leaf_child(self.tile.leafs.len() - 1)
    }

    /// A node splitting on `plane`, children given as node indices or
    /// [`leaf_child`] refs.
    pub fn node(&mut self, plane: Plane, front: ChildRef, back: ChildRef) -> usize {
        let plane = self.plane(plane);
        self.tile.nodes.push(BspNode {
            plane: Some(plane),
            children: [front, back],
            mins: p(-4096.0, -4096.0, -4096.0),
            maxs: p(4096.0, 4096.0, 4096.0),
        });
        self.tile.nodes.len() - 1
    }

    /// A node without a plane, bounded by `mins..maxs`.
    pub fn grouping_node(&mut self, children: [ChildRef; 2], mins: Point3<Real>, maxs: Point3<Real>) -> usize {
        self.tile.nodes.push(BspNode {
            plane: None,
            children,
            mins,
            maxs,
        });
        self.tile.nodes.len() - 1
    }

    pub fn set_children(&mut self, node: usize, children: [ChildRef; 2]) {
        self.tile.nodes[node].children = children;
    }

    /// Add a face through `points`, texture axes projected along its
    /// dominant axis like the map compiler does.
    pub fn face(&mut self, points: &[Point3<Real>], flags: SurfaceFlags, value: Real, texture: &str) -> usize {
        let facing = Plane::from_points(&points[0], &points[1], &points[2]).expect("degenerate test face");
        let (plane, side) = match self
            .tile
            .planes
            .iter()
            .position(|q| q.normal == -facing.normal && q.dist == -facing.dist)
        {
            Some(i) => (i, true),
            None => (self.plane(facing), false),
        };

        let (s, t) = match facing.kind.dominant_axis() {
            0 => (Vector3::y(), Vector3::z()),
            1 => (Vector3::x(), Vector3::z()),
            _ => (Vector3::x(), Vector3::y()),
        };
        self.tile.texinfo.push(TexInfo {
            vecs: [[s.x, s.y, s.z, 0.0], [t.x, t.y, t.z, 0.0]],
            flags,
            value,
            texture: texture.to_owned(),
        });

        let first_edge = self.tile.surfedges.len();
        let base = self.tile.vertexes.len();
        self.tile.vertexes.extend_from_slice(points);
        for i in 0..points.len() {
            self.tile.edges.push(BspEdge {
                v: [base + i, base + (i + 1) % points.len()],
            });
            self.tile.surfedges.push((self.tile.edges.len() - 1) as i32);
        }

        self.tile.faces.push(BspFace {
            plane,
            side,
            first_edge,
            num_edges: points.len(),
            texinfo: self.tile.texinfo.len() - 1,
            light_offset: [None, None],
        });
        self.tile.faces.len() - 1
    }

    /// Close a model over the faces added since the previous one.
    pub fn model(&mut self, head_node: usize) -> usize {
        let first_face = self
            .tile
            .models
            .last()
            .map_or(0, |m| m.first_face + m.num_faces);
        self.tile.models.push(BspModel {
            mins: p(-4096.0, -4096.0, -4096.0),
            maxs: p(4096.0, 4096.0, 4096.0),
            head_node,
            first_face,
            num_faces: self.tile.faces.len() - first_face,
        });
        self.tile.models.len() - 1
    }

    pub fn entities(&mut self, text: &str) {
        self.tile.entity_string = text.to_owned();
    }

    pub fn build(self) -> Tile {
        self.tile
    }
}

/// Solid below `z = 0`, and a solid slab between `x = 100` and `x = 110`.
///
/// Face 0 is a floor on `0..96 x 0..128`, face 1 a floor behind the slab on
/// `112..176 x 0..128`. A point light hangs over face 0 at `(48, 64, 32)`.
pub fn slab_room() -> Tile {
    let mut b = TileBuilder::new();
    let solid = b.leaf(ContentFlags::SOLID);
    let open = b.leaf(ContentFlags::empty());
    let slab = b.leaf(ContentFlags::SOLID);
    let beyond = b.leaf(ContentFlags::empty());

    let root = b.node(Plane::axial(2, 0.0), 0, solid);
    let near = b.node(Plane::axial(0, 100.0), 0, open);
    let far = b.node(Plane::axial(0, 110.0), beyond, slab);
    b.set_children(root, [near as ChildRef, solid]);
    b.set_children(near, [far as ChildRef, open]);

    b.face(&floor_quad((0.0, 0.0), (96.0, 128.0), 0.0), SurfaceFlags::empty(), 0.0, "floor");
    b.face(&floor_quad((112.0, 0.0), (176.0, 128.0), 0.0), SurfaceFlags::empty(), 0.0, "floor");
    b.model(root);
    b.entities(
        "{\n\"classname\" \"worldspawn\"\n}\n{\n\"classname\" \"light\"\n\"origin\" \"48 64 32\"\n}\n",
    );
    b.build()
}

/// A solid cube on `-32..32` on every axis, open everywhere else.
pub fn solid_cube() -> Tile {
    let mut b = TileBuilder::new();
    let open = b.leaf(ContentFlags::empty());
    let solid = b.leaf(ContentFlags::SOLID);

    let mut child = solid;
    for (axis, sign) in [(0, 1.0), (0, -1.0), (1, 1.0), (1, -1.0), (2, 1.0), (2, -1.0)]
        .into_iter()
        .rev()
    {
        let mut normal = Vector3::zeros();
        normal[axis] = sign;
        let node = b.node(Plane::new(normal, 32.0), open, child);
        child = node as ChildRef;
    }

    // top face of the cube
    b.face(&floor_quad((-32.0, -32.0), (32.0, 32.0), 32.0), SurfaceFlags::empty(), 0.0, "cube");
    b.model(child as usize);
    b.entities("{\n\"classname\" \"worldspawn\"\n}\n");
    b.build()
}

/// A floor on `0..128 x 0..128` and a wall on `x = 0` facing it, solid
/// below the floor and behind the wall. A light hangs near the wall.
pub fn lit_wall_room() -> Tile {
    let mut b = TileBuilder::new();
    let solid = b.leaf(ContentFlags::SOLID);
    let open = b.leaf(ContentFlags::empty());

    let wall = b.node(Plane::axial(0, 0.0), open, solid);
    let root = b.node(Plane::axial(2, 0.0), wall as ChildRef, solid);

    b.face(&floor_quad((0.0, 0.0), (128.0, 128.0), 0.0), SurfaceFlags::empty(), 0.0, "floor");
    b.face(
        &[p(0.0, 0.0, 0.0), p(0.0, 0.0, 128.0), p(0.0, 128.0, 128.0), p(0.0, 128.0, 0.0)],
        SurfaceFlags::empty(),
        0.0,
        "wall",
    );
    b.model(root);
    b.entities(
        "{\n\"classname\" \"worldspawn\"\n}\n{\n\"classname\" \"light\"\n\"light\" \"200\"\n\"origin\" \"16 64 64\"\n}\n",
    );
    b.build()
}

/// Every texture is one flat color.
pub struct FlatTextures(pub [u8; 3]);

impl radlight::patch::TextureSource for FlatTextures {
    fn load(&self, _name: &str) -> Result<radlight::patch::Texels, radlight::errors::TextureError> {
        Ok(radlight::patch::Texels {
            width: 1,
            height: 1,
            rgb: vec![self.0],
        })
    }
}
