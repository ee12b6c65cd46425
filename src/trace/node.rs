use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// What a segment reaching a leaf finds there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafClass {
    Blocking,
    Passing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceChild {
    Node(usize),
    Leaf(LeafClass),
}

/// How a trace node divides space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKind {
    /// Plane along one axis, only that coordinate is read
    Axial(usize),
    /// Arbitrary plane
    General,
    /// No plane, both children are tested
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceNode {
    pub kind: SplitKind,
    pub normal: Vector3<Real>,
    pub dist: Real,
    /// Front then back
    pub children: [TraceChild; 2],
}

impl TraceNode {
    /// Signed distance of `p` to the split plane, 0 for [`SplitKind::None`].
    #[inline]
    pub fn distance(&self, p: &Point3<Real>) -> Real {
        match self.kind {
            SplitKind::Axial(axis) => p[axis] * self.normal[axis] - self.dist,
            SplitKind::General => self.normal.dot(&p.coords) - self.dist,
            SplitKind::None => 0.0,
        }
    }
}
