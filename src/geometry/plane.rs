use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

// Point classification against a plane
pub const ON: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;

/// [`FRONT`], [`BACK`] or [`ON`] for a signed plane distance.
#[inline]
pub fn side_of(distance: Real, epsilon: Real) -> i8 {
    if distance > epsilon {
        FRONT
    } else if distance < -epsilon {
        BACK
    } else {
        ON
    }
}

/// Axial classification of a plane normal.
///
/// `X`/`Y`/`Z` planes are exactly axis aligned; the `Any*` kinds name the
/// dominant axis of a general plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    X,
    Y,
    Z,
    AnyX,
    AnyY,
    AnyZ,
}

impl PlaneKind {
    pub fn for_normal(normal: &Vector3<Real>) -> Self {
        if normal.x == 1.0 || normal.x == -1.0 {
            return PlaneKind::X;
        }
        if normal.y == 1.0 || normal.y == -1.0 {
            return PlaneKind::Y;
        }
        if normal.z == 1.0 || normal.z == -1.0 {
            return PlaneKind::Z;
        }

        let ax = normal.x.abs();
        let ay = normal.y.abs();
        let az = normal.z.abs();
        if ax >= ay && ax >= az {
            PlaneKind::AnyX
        } else if ay >= ax && ay >= az {
            PlaneKind::AnyY
        } else {
            PlaneKind::AnyZ
        }
    }

    /// The axis index for exactly axial planes.
    pub const fn axis(self) -> Option<usize> {
        match self {
            PlaneKind::X => Some(0),
            PlaneKind::Y => Some(1),
            PlaneKind::Z => Some(2),
            _ => None,
        }
    }

    /// Index of the largest normal component.
    pub const fn dominant_axis(self) -> usize {
        match self {
            PlaneKind::X | PlaneKind::AnyX => 0,
            PlaneKind::Y | PlaneKind::AnyY => 1,
            PlaneKind::Z | PlaneKind::AnyZ => 2,
        }
    }
}

/// A plane `dot(normal, p) == dist` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<Real>,
    pub dist: Real,
    pub kind: PlaneKind,
}

impl Plane {
    pub fn new(normal: Vector3<Real>, dist: Real) -> Self {
        Plane {
            normal,
            dist,
            kind: PlaneKind::for_normal(&normal),
        }
    }

    /// Axis aligned plane facing `+axis` at `dist`.
    pub fn axial(axis: usize, dist: Real) -> Self {
        let mut normal = Vector3::zeros();
        normal[axis] = 1.0;
        Plane::new(normal, dist)
    }

    /// Plane through three points with the normal `(p2 - p0) x (p1 - p0)`,
    /// the winding order every face in a tile uses.
    ///
    /// Returns `None` when the points are colinear.
    pub fn from_points(p0: &Point3<Real>, p1: &Point3<Real>, p2: &Point3<Real>) -> Option<Self> {
        let normal = (p2 - p0).cross(&(p1 - p0)).try_normalize(Real::EPSILON)?;
        Some(Plane::new(normal, normal.dot(&p0.coords)))
    }

    #[inline]
    pub fn distance(&self, point: &Point3<Real>) -> Real {
        match self.kind.axis() {
            Some(axis) => point[axis] * self.normal[axis] - self.dist,
            None => self.normal.dot(&point.coords) - self.dist,
        }
    }

    /// The same plane facing the other way.
    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            dist: -self.dist,
            kind: self.kind,
        }
    }

    /// The plane moved by `offset`.
    pub fn translated(&self, offset: &Vector3<Real>) -> Self {
        Plane {
            normal: self.normal,
            dist: self.dist + offset.dot(&self.normal),
            kind: self.kind,
        }
    }

    /// Closest point of the plane to the origin.
    pub fn origin(&self) -> Point3<Real> {
        Point3::from(self.normal * self.dist)
    }
}
