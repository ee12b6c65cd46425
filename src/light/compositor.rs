use crate::config::RadConfig;
use crate::float_types::Real;
use crate::light::facelight::FaceLight;
use crate::light::triangulation::Triangulation;
use nalgebra::Vector3;

/// Quantize one face's light into RGB bytes, row major.
///
/// Bounced light is read off `indirect` when given. Every channel ends up
/// at least 1, and a sample brighter than `max_light` is scaled down as a
/// whole so its hue survives.
pub fn final_light_face(
    facelight: &FaceLight,
    indirect: Option<&Triangulation>,
    ambient: &Vector3<Real>,
    config: &RadConfig,
) -> Vec<u8> {
    let max_light = config.byte_max_light();
    let mut out = Vec::with_capacity(facelight.samples.len() * 3);

    for (sample, origin) in facelight.samples.iter().zip(&facelight.origins) {
        let mut lb = *sample;
        if let Some(trian) = indirect {
            lb += trian.sample(origin);
        }
        lb += ambient;
        lb *= config.light_scale;

        for c in lb.iter_mut() {
            if *c < 1.0 {
                *c = 1.0;
            }
        }
        let max = lb.max();
        let newmax = max.min(max_light);
        for c in lb.iter() {
            out.push((c * newmax / max) as u8);
        }
    }

    out
}
