use crate::errors::Result;
use crate::float_types::Real;
use crate::geometry::plane::Plane;
use crate::geometry::winding::Winding;
use crate::patch::PatchTable;

/// Slack keeping a patch that merely touches a grid line from splitting.
const GRID_SLOP: Real = 0.01;

enum Split {
    Done,
    /// The patch lost a tiny fragment and must be looked at again
    Shrunk,
    Split(usize),
}

/// Split every patch along grid lines until none spans more than one cell
/// of `grid` on any axis. `grid < 1` leaves the patches alone.
pub fn subdivide_patches(table: &mut PatchTable, grid: Real, epsilon: Real) -> Result<()> {
    if grid < 1.0 {
        return Ok(());
    }

    let before = table.len();
    let mut work: Vec<usize> = (0..table.len()).rev().collect();
    while let Some(index) = work.pop() {
        match subdivide_once(table, index, grid, epsilon)? {
            Split::Done => {},
            Split::Shrunk => work.push(index),
            Split::Split(sibling) => {
                work.push(sibling);
                work.push(index);
            },
        }
    }

    log::info!("subdivided {before} patches into {} on a {grid} grid", table.len());
    Ok(())
}

fn subdivide_once(table: &mut PatchTable, index: usize, grid: Real, epsilon: Real) -> Result<Split> {
    let bounds = table.get(index).bounds();

    for axis in 0..3 {
        let low = ((bounds.mins[axis] + GRID_SLOP) / grid).floor();
        let high = ((bounds.maxs[axis] - GRID_SLOP) / grid).floor();

        // a line the winding only grazes within epsilon cuts nothing, try the next
        let mut line = low + 1.0;
        while line <= high {
            let plane = Plane::axial(axis, grid * line);
            line += 1.0;

            let winding = table.get(index).winding.clone();
            let (Some(front), Some(back)) = winding.clip(&plane, epsilon)? else {
                continue;
            };

            return match (usable(front), usable(back)) {
                (Some(front), Some(back)) => {
                    let sibling = table.get(index).sibling(back);
                    let patch = table.get_mut(index);
                    patch.winding = front;
                    patch.recompute();
                    Ok(Split::Split(table.insert_after(index, sibling)?))
                },
                (Some(keep), None) | (None, Some(keep)) => {
                    let patch = table.get_mut(index);
                    patch.winding = keep;
                    patch.recompute();
                    Ok(Split::Shrunk)
                },
                (None, None) => Ok(Split::Done),
            };
        }
    }

    Ok(Split::Done)
}

/// A clip fragment with near duplicate points welded, or `None` when it is
/// too small to keep.
fn usable(mut winding: Winding) -> Option<Winding> {
    (winding.repair() && !winding.is_tiny()).then_some(winding)
}
