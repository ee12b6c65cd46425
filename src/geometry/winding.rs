//! Convex planar polygons.
//!
//! A [`Winding`] is the unit of geometry the radiosity pass works on: faces
//! become windings, windings are clipped into patches, and patch windings
//! give areas, centers and bounds.
//!
//! Points are wound so that `Plane::from_points(p0, p1, p2)` yields the
//! winding's facing plane, matching face vertex order in a tile.

use crate::bsp::Tile;
use crate::errors::{BakeError, Result};
use crate::float_types::{EDGE_LENGTH, Real};
use crate::geometry::bounds::Bounds;
use crate::geometry::plane::{BACK, FRONT, ON, Plane, side_of};
use nalgebra::{Point3, Vector3};

/// Hard per-winding point limit.
pub const MAX_POINTS_ON_WINDING: usize = 64;

/// Half size of the quad [`Winding::base_for_plane`] seeds.
pub const BASE_WINDING_SIZE: Real = 16384.0;

/// Consecutive edge directions with a dot product above this are one edge.
const COLINEAR_EPSILON: Real = 0.999;

/// Points closer than this are welded by [`Winding::repair`].
const DEGENERATE_EPSILON: Real = 0.1;

/// A welded coordinate this close to an integer becomes that integer.
const SNAP_EPSILON: Real = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Winding {
    points: Vec<Point3<Real>>,
}

impl Winding {
    pub fn new(points: Vec<Point3<Real>>) -> Self {
        Winding { points }
    }

    #[inline]
    pub fn points(&self) -> &[Point3<Real>] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Walk the face's edge loop and drop colinear points.
    pub fn from_face(tile: &Tile, face: usize) -> Result<Self> {
        let mut winding = Winding::new(tile.face_points(face)?);
        winding.remove_colinear_points();
        if winding.len() > MAX_POINTS_ON_WINDING {
            return Err(BakeError::WindingOverflow {
                points: winding.len(),
                max: MAX_POINTS_ON_WINDING,
            });
        }
        Ok(winding)
    }

    /// A huge quad lying on `plane`, oriented along its dominant axis.
    pub fn base_for_plane(plane: &Plane) -> Self {
        let mut vup = Vector3::zeros();
        match plane.kind.dominant_axis() {
            0 | 1 => vup.z = 1.0,
            _ => vup.x = 1.0,
        }

        let v = vup.dot(&plane.normal);
        vup -= plane.normal * v;
        vup = vup.normalize();

        let org = plane.origin();
        let mut vright = vup.cross(&plane.normal);

        vup *= BASE_WINDING_SIZE;
        vright *= BASE_WINDING_SIZE;

        Winding::new(vec![
            org - vright + vup,
            org + vright + vup,
            org + vright - vup,
            org - vright - vup,
        ])
    }

    /// Merge points whose neighbouring edges run in the same direction.
    ///
    /// Repeats until nothing changes, so a second call is a no-op. Never
    /// drops below three points.
    pub fn remove_colinear_points(&mut self) {
        loop {
            let n = self.points.len();
            if n <= 3 {
                return;
            }

            let kept: Vec<Point3<Real>> = (0..n)
                .filter(|&i| {
                    let next = self.points[(i + 1) % n];
                    let prev = self.points[(i + n - 1) % n];
                    let v1 = (next - self.points[i])
                        .try_normalize(0.0)
                        .unwrap_or_else(Vector3::zeros);
                    let v2 = (self.points[i] - prev)
                        .try_normalize(0.0)
                        .unwrap_or_else(Vector3::zeros);
                    v1.dot(&v2) < COLINEAR_EPSILON
                })
                .map(|i| self.points[i])
                .collect();

            if kept.len() == n || kept.len() < 3 {
                return;
            }
            self.points = kept;
        }
    }

    /// Split by `plane`, consuming the winding.
    ///
    /// A winding with no point in front goes to the back untouched (this
    /// includes a winding lying on the plane); one with no point behind goes
    /// to the front untouched.
    pub fn clip(self, plane: &Plane, epsilon: Real) -> Result<(Option<Winding>, Option<Winding>)> {
        let (dists, sides, counts) = self.classify(plane, epsilon);

        if counts[FRONT as usize] == 0 {
            return Ok((None, Some(self)));
        }
        if counts[BACK as usize] == 0 {
            return Ok((Some(self), None));
        }

        let (front, back) = self.split(plane, &dists, &sides, true)?;
        Ok((Some(front), back))
    }

    /// Keep only the part of `slot` in front of `plane`.
    ///
    /// The back fragment is never built. `slot` becomes `None` when nothing
    /// survives.
    pub fn chop_in_place(slot: &mut Option<Winding>, plane: &Plane, epsilon: Real) -> Result<()> {
        let Some(winding) = slot.take() else {
            return Ok(());
        };

        let (dists, sides, counts) = winding.classify(plane, epsilon);
        if counts[FRONT as usize] == 0 {
            return Ok(());
        }
        if counts[BACK as usize] == 0 {
            *slot = Some(winding);
            return Ok(());
        }

        let (front, _) = winding.split(plane, &dists, &sides, false)?;
        *slot = Some(front);
        Ok(())
    }

    fn classify(&self, plane: &Plane, epsilon: Real) -> (Vec<Real>, Vec<i8>, [usize; 3]) {
        let mut counts = [0usize; 3];
        let mut dists = Vec::with_capacity(self.points.len() + 1);
        let mut sides = Vec::with_capacity(self.points.len() + 1);

        for point in &self.points {
            let d = plane.distance(point);
            let side = side_of(d, epsilon);
            dists.push(d);
            sides.push(side);
            counts[side as usize] += 1;
        }
        // close the loop so edge i runs from i to i + 1
        if let (Some(&d), Some(&s)) = (dists.first(), sides.first()) {
            dists.push(d);
            sides.push(s);
        }

        (dists, sides, counts)
    }

    fn split(
        &self,
        plane: &Plane,
        dists: &[Real],
        sides: &[i8],
        keep_back: bool,
    ) -> Result<(Winding, Option<Winding>)> {
        let n = self.points.len();
        let mut front = Vec::with_capacity(n + 4);
        let mut back = Vec::with_capacity(if keep_back { n + 4 } else { 0 });

        for i in 0..n {
            let p1 = self.points[i];

            match sides[i] {
                ON => {
                    front.push(p1);
                    if keep_back {
                        back.push(p1);
                    }
                    continue;
                },
                FRONT => front.push(p1),
                _ => {
                    if keep_back {
                        back.push(p1);
                    }
                },
            }

            if sides[i + 1] == ON || sides[i + 1] == sides[i] {
                continue;
            }

            // generate a split point
            let p2 = self.points[(i + 1) % n];
            let dot = dists[i] / (dists[i] - dists[i + 1]);
            let mut mid = Point3::origin();
            for j in 0..3 {
                // avoid round off error when possible
                mid[j] = if plane.normal[j] == 1.0 {
                    plane.dist
                } else if plane.normal[j] == -1.0 {
                    -plane.dist
                } else {
                    p1[j] + dot * (p2[j] - p1[j])
                };
            }

            front.push(mid);
            if keep_back {
                back.push(mid);
            }
        }

        let points = front.len().max(back.len());
        if points > MAX_POINTS_ON_WINDING {
            return Err(BakeError::WindingOverflow {
                points,
                max: MAX_POINTS_ON_WINDING,
            });
        }

        let back = keep_back.then(|| Winding::new(back));
        Ok((Winding::new(front), back))
    }

    /// Fan area from the first point.
    pub fn area(&self) -> Real {
        let Some(p0) = self.points.first() else {
            return 0.0;
        };
        self.points
            .windows(2)
            .skip(1)
            .map(|pair| 0.5 * (pair[0] - p0).cross(&(pair[1] - p0)).norm())
            .sum()
    }

    /// Unweighted average of the points.
    pub fn center(&self) -> Point3<Real> {
        if self.points.is_empty() {
            return Point3::origin();
        }
        let sum = self
            .points
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.points.len() as Real)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.points)
    }

    /// Facing plane from the first three points.
    pub fn plane(&self) -> Option<Plane> {
        match self.points.as_slice() {
            [p0, p1, p2, ..] => Plane::from_points(p0, p1, p2),
            _ => None,
        }
    }

    /// Fewer than three edges longer than [`EDGE_LENGTH`].
    pub fn is_tiny(&self) -> bool {
        let n = self.points.len();
        let mut edges = 0;
        for i in 0..n {
            let len = (self.points[(i + 1) % n] - self.points[i]).norm();
            if len > EDGE_LENGTH {
                edges += 1;
                if edges == 3 {
                    return false;
                }
            }
        }
        true
    }

    /// Any coordinate at or past `extent`.
    pub fn is_huge(&self, extent: Real) -> bool {
        self.points
            .iter()
            .any(|p| p.iter().any(|&c| c <= -extent || c >= extent))
    }

    /// Weld runs of nearly coincident points.
    ///
    /// Returns whether the winding still has at least three points.
    pub fn repair(&mut self) -> bool {
        let mut out: Vec<Point3<Real>> = Vec::with_capacity(self.points.len());
        for &point in &self.points {
            match out.last_mut() {
                Some(last) if (point - *last).norm() < DEGENERATE_EPSILON => {
                    *last = snap_weld(last, &point);
                },
                _ => out.push(point),
            }
        }
        while out.len() > 1 {
            let (first, last) = (out[0], out[out.len() - 1]);
            if (last - first).norm() >= DEGENERATE_EPSILON {
                break;
            }
            out.pop();
            out[0] = snap_weld(&first, &last);
        }

        self.points = out;
        self.points.len() >= 3
    }

    pub fn reversed(&self) -> Self {
        Winding::new(self.points.iter().rev().copied().collect())
    }

    pub fn translate(&mut self, offset: &Vector3<Real>) {
        for point in &mut self.points {
            *point += offset;
        }
    }
}

/// Pick one point out of two near duplicates, per axis.
///
/// A coordinate that is already integral wins, the first point's first.
/// Otherwise the coordinate nearer to an integer wins, and is snapped onto
/// it when within [`SNAP_EPSILON`].
pub fn snap_weld(a: &Point3<Real>, b: &Point3<Real>) -> Point3<Real> {
    let mut out = Point3::origin();
    for i in 0..3 {
        out[i] = if a[i] == a[i].round() {
            a[i]
        } else if b[i] == b[i].round() {
            b[i]
        } else {
            let ai = (a[i] - a[i].round()).abs();
            let bi = (b[i] - b[i].round()).abs();
            if ai < bi { a[i] } else { b[i] }
        };

        let rounded = out[i].round();
        if (rounded - out[i]).abs() <= SNAP_EPSILON {
            out[i] = rounded;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_weld_prefers_integral_coordinates() {
        let a = Point3::new(1.03, 2.0, 5.3);
        let b = Point3::new(1.0, 2.04, 5.45);
        let welded = snap_weld(&a, &b);
        assert_eq!(welded.x, 1.0);
        assert_eq!(welded.y, 2.0);
        // neither is integral, the first is nearer to one
        assert_eq!(welded.z, 5.3);
    }

    #[test]
    fn snap_weld_snaps_near_integers() {
        let a = Point3::new(3.005, 0.5, 0.0);
        let b = Point3::new(3.02, 0.5, 0.0);
        assert_eq!(snap_weld(&a, &b).x, 3.0);
    }
}
