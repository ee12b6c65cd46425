use crate::bsp::{ChildRef, Tile};
use crate::errors::{BakeError, Result};
use crate::float_types::Real;
use crate::trace::node::{LeafClass, SplitKind, TraceChild, TraceNode};
use nalgebra::{Point3, Vector3};

/// Read-only occlusion tree mirroring the world's BSP.
#[derive(Debug, Clone)]
pub struct TraceTree {
    nodes: Vec<TraceNode>,
    epsilon: Real,
}

impl TraceTree {
    /// Mirror the node tree of model 0.
    pub fn build(tile: &Tile, epsilon: Real) -> Result<Self> {
        if tile.nodes.is_empty() {
            return Err(BakeError::EmptyWorld);
        }
        let head = tile.models.first().map_or(0, |m| m.head_node);

        let mut nodes: Vec<TraceNode> = Vec::with_capacity(tile.nodes.len());
        // (bsp node, slot in the parent to patch)
        let mut stack: Vec<(usize, Option<(usize, usize)>)> = vec![(head, None)];

        while let Some((bsp_index, parent)) = stack.pop() {
            let (node, pending) = mirror_node(tile, bsp_index)?;
            // a tree visits each node once, anything more is a cycle
            if nodes.len() >= tile.nodes.len() {
                return Err(BakeError::CorruptTraceNode {
                    node: bsp_index,
                    reason: "node reached twice",
                });
            }

            let index = nodes.len();
            nodes.push(node);
            if let Some((p, side)) = parent {
                nodes[p].children[side] = TraceChild::Node(index);
            }
            // back first, so the front subtree is laid out first
            for (side, child) in pending.into_iter().rev().flatten() {
                stack.push((child, Some((index, side))));
            }
        }

        log::debug!("trace tree: {} nodes from {} bsp nodes", nodes.len(), tile.nodes.len());
        Ok(TraceTree { nodes, epsilon })
    }

    pub fn nodes(&self) -> &[TraceNode] {
        &self.nodes
    }

    /// Whether a blocking leaf lies on the segment `start..stop`.
    ///
    /// Front halves are walked before back halves, so identical queries
    /// always visit the same leaves.
    pub fn test_line(&self, start: &Point3<Real>, stop: &Point3<Real>) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        let eps = self.epsilon;
        let mut stack: Vec<(TraceChild, Point3<Real>, Point3<Real>)> =
            vec![(TraceChild::Node(0), *start, *stop)];

        while let Some((child, start, stop)) = stack.pop() {
            let node = match child {
                TraceChild::Leaf(LeafClass::Blocking) => return true,
                TraceChild::Leaf(LeafClass::Passing) => continue,
                TraceChild::Node(i) => &self.nodes[i],
            };

            if node.kind == SplitKind::None {
                stack.push((node.children[1], start, stop));
                stack.push((node.children[0], start, stop));
                continue;
            }

            let front = node.distance(&start);
            let back = node.distance(&stop);

            if front >= -eps && back >= -eps {
                stack.push((node.children[0], start, stop));
                continue;
            }
            if front < eps && back < eps {
                stack.push((node.children[1], start, stop));
                continue;
            }

            let side = usize::from(front < 0.0);
            let frac = front / (front - back);
            let mid = start + (stop - start) * frac;

            stack.push((node.children[side ^ 1], mid, stop));
            stack.push((node.children[side], start, mid));
        }

        false
    }
}

type Pending = [Option<(usize, usize)>; 2];

/// One trace node for BSP node `index`, plus the BSP nodes its children
/// still have to be built from.
fn mirror_node(tile: &Tile, index: usize) -> Result<(TraceNode, Pending)> {
    let bsp = tile.nodes.get(index).ok_or(BakeError::CorruptTraceNode {
        node: index,
        reason: "node index out of range",
    })?;

    match bsp.plane {
        None => grouping_node(tile, index),
        Some(plane_index) => {
            let plane = tile.plane(plane_index)?;
            let kind = match plane.kind.axis() {
                Some(axis) => SplitKind::Axial(axis),
                None => SplitKind::General,
            };

            let mut children = [TraceChild::Leaf(LeafClass::Passing); 2];
            let mut pending: Pending = [None, None];
            for side in 0..2 {
                match child_target(bsp.children[side]) {
                    Target::Node(n) => pending[side] = Some((side, n)),
                    Target::Leaf(l) => {
                        let leaf = tile.leaf(l)?;
                        children[side] = TraceChild::Leaf(if leaf.contents.blocks_light() {
                            LeafClass::Blocking
                        } else {
                            LeafClass::Passing
                        });
                    },
                }
            }

            Ok((
                TraceNode {
                    kind,
                    normal: plane.normal,
                    dist: plane.dist,
                    children,
                },
                pending,
            ))
        },
    }
}

/// A node without a plane only groups two subtrees. Use a separating axis
/// between the children's bounds when there is one.
fn grouping_node(tile: &Tile, index: usize) -> Result<(TraceNode, Pending)> {
    let bsp = &tile.nodes[index];
    let mut targets = [0usize; 2];
    for side in 0..2 {
        match child_target(bsp.children[side]) {
            Target::Node(n) if n < tile.nodes.len() => targets[side] = n,
            Target::Node(_) => {
                return Err(BakeError::CorruptTraceNode {
                    node: index,
                    reason: "child index out of range",
                });
            },
            Target::Leaf(_) => {
                return Err(BakeError::CorruptTraceNode {
                    node: index,
                    reason: "grouping node with a leaf child",
                });
            },
        }
    }

    let a = &tile.nodes[targets[0]];
    let b = &tile.nodes[targets[1]];
    let placeholder = [TraceChild::Leaf(LeafClass::Passing); 2];

    for axis in 0..3 {
        // front child holds the larger coordinates
        let (lower, upper, dist) = if a.maxs[axis] <= b.mins[axis] {
            (0, 1, (a.maxs[axis] + b.mins[axis]) * 0.5)
        } else if b.maxs[axis] <= a.mins[axis] {
            (1, 0, (b.maxs[axis] + a.mins[axis]) * 0.5)
        } else {
            continue;
        };

        let mut normal = Vector3::zeros();
        normal[axis] = 1.0;
        return Ok((
            TraceNode {
                kind: SplitKind::Axial(axis),
                normal,
                dist,
                children: placeholder,
            },
            [Some((0, targets[upper])), Some((1, targets[lower]))],
        ));
    }

    Ok((
        TraceNode {
            kind: SplitKind::None,
            normal: Vector3::zeros(),
            dist: 0.0,
            children: placeholder,
        },
        [Some((0, targets[0])), Some((1, targets[1]))],
    ))
}

enum Target {
    Node(usize),
    Leaf(usize),
}

#[inline]
fn child_target(child: ChildRef) -> Target {
    if child < 0 {
        Target::Leaf((-(child + 1)) as usize)
    } else {
        Target::Node(child as usize)
    }
}
