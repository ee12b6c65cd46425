//! Interpolation of patch light across a plane.
//!
//! Patch origins on one plane are joined into triangles, greedily picking
//! for every open edge the point that sees it under the widest angle.
//! Samples then read the bounced light off the triangle they fall in.

use crate::float_types::{ON_EPSILON, Real};
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

/// A directed edge. Points in front of it lie to its left, looking along
/// the plane normal.
#[derive(Debug, Clone)]
struct TriEdge {
    p0: usize,
    p1: usize,
    normal: Vector3<Real>,
    dist: Real,
    tri: Option<usize>,
}

impl TriEdge {
    #[inline]
    fn distance(&self, point: &Point3<Real>) -> Real {
        point.coords.dot(&self.normal) - self.dist
    }
}

#[derive(Debug, Clone)]
pub struct Triangulation {
    normal: Vector3<Real>,
    points: Vec<Point3<Real>>,
    lights: Vec<Vector3<Real>>,
    edges: Vec<TriEdge>,
    edge_map: HashMap<(usize, usize), usize>,
    /// Edge indices of each triangle
    tris: Vec<[usize; 3]>,
}

impl Triangulation {
    pub fn new(normal: Vector3<Real>) -> Self {
        Triangulation {
            normal,
            points: Vec::new(),
            lights: Vec::new(),
            edges: Vec::new(),
            edge_map: HashMap::new(),
            tris: Vec::new(),
        }
    }

    pub fn add_point(&mut self, origin: Point3<Real>, light: Vector3<Real>) {
        self.points.push(origin);
        self.lights.push(light);
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.tris.len()
    }

    fn find_edge(&mut self, p0: usize, p1: usize) -> usize {
        if let Some(&e) = self.edge_map.get(&(p0, p1)) {
            return e;
        }

        let v1 = (self.points[p1] - self.points[p0])
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros);
        let normal = v1.cross(&self.normal);
        let dist = self.points[p0].coords.dot(&normal);

        let e = self.edges.len();
        self.edges.push(TriEdge {
            p0,
            p1,
            normal,
            dist,
            tri: None,
        });
        self.edges.push(TriEdge {
            p0: p1,
            p1: p0,
            normal: -normal,
            dist: -dist,
            tri: None,
        });
        self.edge_map.insert((p0, p1), e);
        self.edge_map.insert((p1, p0), e + 1);
        e
    }

    /// Connect the points, starting from the closest pair.
    pub fn triangulate(&mut self) {
        let n = self.points.len();
        if n < 2 {
            return;
        }

        let mut best = (Real::MAX, 0, 1);
        for i in 0..n {
            for j in i + 1..n {
                let d = (self.points[j] - self.points[i]).norm();
                if d < best.0 {
                    best = (d, i, j);
                }
            }
        }

        let e = self.find_edge(best.1, best.2);
        let e2 = self.find_edge(best.2, best.1);
        let mut stack = vec![e2, e];
        while let Some(edge) = stack.pop() {
            self.tri_edge(edge, &mut stack);
        }
    }

    fn tri_edge(&mut self, e: usize, stack: &mut Vec<usize>) {
        if self.edges[e].tri.is_some() {
            return; // already connected
        }

        let (ep0, ep1) = (self.edges[e].p0, self.edges[e].p1);
        let p0 = self.points[ep0];
        let p1 = self.points[ep1];

        // the point with the widest angle
        let mut best: Real = 1.1;
        let mut best_point = None;
        for (i, p) in self.points.iter().enumerate() {
            // a 0 dist will form a degenerate triangle
            if self.edges[e].distance(p) <= 0.0 {
                continue;
            }
            let (Some(v1), Some(v2)) = ((p0 - p).try_normalize(0.0), (p1 - p).try_normalize(0.0)) else {
                continue;
            };
            let ang = v1.dot(&v2);
            if ang < best {
                best = ang;
                best_point = Some(i);
            }
        }
        let Some(bp) = best_point.filter(|_| best < 1.0) else {
            return; // edge doesn't match anything
        };

        let tri = self.tris.len();
        let e1 = self.find_edge(ep1, bp);
        let e2 = self.find_edge(bp, ep0);
        self.tris.push([e, e1, e2]);
        for edge in [e, e1, e2] {
            self.edges[edge].tri = Some(tri);
        }

        let outer1 = self.find_edge(bp, ep1);
        let outer2 = self.find_edge(ep0, bp);
        stack.push(outer2);
        stack.push(outer1);
    }

    fn point_in_triangle(&self, point: &Point3<Real>, tri: &[usize; 3]) -> bool {
        tri.iter().all(|&e| self.edges[e].distance(point) >= 0.0)
    }

    fn lerp_triangle(&self, tri: &[usize; 3], point: &Point3<Real>) -> Vector3<Real> {
        let e0 = &self.edges[tri[0]];
        let e2 = &self.edges[tri[2]];
        let (p1, p2, p3) = (e0.p0, self.edges[tri[1]].p0, e2.p0);

        let base = self.lights[p1];
        let d1 = self.lights[p2] - base;
        let d2 = self.lights[p3] - base;

        let x = e0.distance(point);
        let y = e2.distance(point);
        let y1 = e2.distance(&self.points[p2]);
        let x2 = e0.distance(&self.points[p3]);

        if y1.abs() < ON_EPSILON || x2.abs() < ON_EPSILON {
            return base;
        }
        base + d2 * (x / x2) + d1 * (y / y1)
    }

    /// Interpolated light at `point`: from its triangle, else along the
    /// nearest open edge it projects onto, else from the nearest point.
    pub fn sample(&self, point: &Point3<Real>) -> Vector3<Real> {
        match self.points.len() {
            0 => return Vector3::zeros(),
            1 => return self.lights[0],
            _ => {},
        }

        if let Some(tri) = self.tris.iter().find(|t| self.point_in_triangle(point, t)) {
            return self.lerp_triangle(tri, point);
        }

        for edge in self.edges.iter().filter(|e| e.tri.is_none()) {
            if edge.distance(point) < 0.0 {
                continue; // not in front of the edge
            }
            let (a, b) = (self.points[edge.p0], self.points[edge.p1]);
            let span = b - a;
            let len2 = span.norm_squared();
            if len2 <= 0.0 {
                continue;
            }
            let t = (point - a).dot(&span) / len2;
            if !(0.0..=1.0).contains(&t) {
                continue;
            }
            return self.lights[edge.p0] + (self.lights[edge.p1] - self.lights[edge.p0]) * t;
        }

        let nearest = self
            .points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - point).norm_squared().total_cmp(&(*b - point).norm_squared())
            })
            .map_or(0, |(i, _)| i);
        self.lights[nearest]
    }
}
