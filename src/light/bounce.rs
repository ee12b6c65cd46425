use crate::float_types::{PI, Real};
use crate::patch::PatchTable;
use crate::scheduler::JobRunner;
use crate::trace::TraceTree;
use nalgebra::Vector3;

/// Form factors below this carry no visible light and are dropped.
pub const MIN_TRANSFER: Real = 1e-6;

/// Fraction of a patch's light reaching another patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transfer {
    pub patch: usize,
    pub factor: Real,
}

/// Form factors from every patch to every other patch it can see.
///
/// `transfers[i]` lists what patch `i` gathers from. A receiver never
/// gathers more than everything, so each list sums to at most 1. Every
/// patch pair is considered, callers keep the patch count bounded.
pub fn make_transfers<R: JobRunner>(patches: &PatchTable, trace: &TraceTree, runner: &R) -> Vec<Vec<Transfer>> {
    let count = patches.len();
    let transfers = runner.run("transfers", count, |i| {
        let receiver = patches.get(i);
        let mut list = Vec::new();
        let mut total = 0.0;

        for (j, emitter) in patches.iter().enumerate() {
            if j == i {
                continue;
            }
            let delta = emitter.origin - receiver.origin;
            let dist2 = delta.norm_squared();
            if dist2 <= Real::EPSILON {
                continue;
            }
            let dir = delta / dist2.sqrt();

            let dot_i = dir.dot(&receiver.plane.normal);
            if dot_i <= 0.0 {
                continue;
            }
            let dot_j = -dir.dot(&emitter.plane.normal);
            if dot_j <= 0.0 {
                continue;
            }
            // cull before the trace, which is the expensive part
            let factor = dot_i * dot_j * emitter.area / (PI * dist2);
            if factor < MIN_TRANSFER {
                continue;
            }
            if trace.test_line(&receiver.origin, &emitter.origin) {
                continue;
            }

            total += factor;
            list.push(Transfer { patch: j, factor });
        }

        if total > 1.0 {
            for transfer in &mut list {
                transfer.factor /= total;
            }
        }
        list
    });

    log::info!(
        "{} transfers between {count} patches",
        transfers.iter().map(Vec::len).sum::<usize>()
    );
    transfers
}

/// Bounce the direct light gathered on the patches `num_bounce` times,
/// adding every bounce into `totallight`.
pub fn bounce_light<R: JobRunner>(
    patches: &mut PatchTable,
    transfers: &[Vec<Transfer>],
    num_bounce: usize,
    runner: &R,
) {
    let mut emit: Vec<Vector3<Real>> = patches
        .iter()
        .map(|p| p.samplelight.component_mul(&p.reflectivity))
        .collect();

    for bounce in 0..num_bounce {
        let gathered = runner.run("bounce", patches.len(), |i| {
            transfers[i]
                .iter()
                .fold(Vector3::zeros(), |acc, t| acc + emit[t.patch] * t.factor)
        });

        let mut added = 0.0;
        for ((patch, light), emitted) in patches.iter_mut().zip(&gathered).zip(&mut emit) {
            patch.totallight += light;
            *emitted = light.component_mul(&patch.reflectivity);
            added += light.sum() * patch.area;
        }
        log::debug!("bounce {}: added {added:.1}", bounce + 1);
    }
}
