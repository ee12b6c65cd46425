use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// Axis aligned bounding box.
///
/// [`Bounds::empty`] starts inverted so the first [`Bounds::add_point`]
/// collapses it onto that point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub mins: Point3<Real>,
    pub maxs: Point3<Real>,
}

impl Bounds {
    #[inline]
    pub const fn new(mins: Point3<Real>, maxs: Point3<Real>) -> Self {
        Self { mins, maxs }
    }

    pub fn empty() -> Self {
        Self {
            mins: Point3::new(Real::MAX, Real::MAX, Real::MAX),
            maxs: Point3::new(Real::MIN, Real::MIN, Real::MIN),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<Real>>) -> Self {
        let mut bounds = Self::empty();
        for point in points {
            bounds.add_point(point);
        }
        bounds
    }

    pub fn is_empty(&self) -> bool {
        self.mins.x > self.maxs.x || self.mins.y > self.maxs.y || self.mins.z > self.maxs.z
    }

    #[inline]
    pub fn add_point(&mut self, point: &Point3<Real>) {
        self.mins = self.mins.inf(point);
        self.maxs = self.maxs.sup(point);
    }

    #[inline]
    pub fn contains_point(&self, point: &Point3<Real>) -> bool {
        (0..3).all(|i| point[i] >= self.mins[i] && point[i] <= self.maxs[i])
    }

    /// Grown by `amount` on every side.
    pub fn expanded(&self, amount: Real) -> Self {
        let grow = Vector3::repeat(amount);
        Self::new(self.mins - grow, self.maxs + grow)
    }

    #[inline]
    pub fn center(&self) -> Point3<Real> {
        nalgebra::center(&self.mins, &self.maxs)
    }

    #[inline]
    pub fn size(&self) -> Vector3<Real> {
        self.maxs - self.mins
    }
}
