use std::cmp::Ordering;

use rand::Rng;

use crate::lights::PointLight;

/// Uniform sample in `[min, max)`; collapses to `min` for empty, NaN,
/// infinite, or overflowing ranges.
pub fn random_float<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if !(min.is_finite() && max.is_finite() && (max - min).is_finite()) {
        return min;
    }
    match max.partial_cmp(&min) {
        Some(Ordering::Greater) => rng.gen_range(min..max),
        _ => min,
    }
}

/// Scatters `count` lights over a `[-extent, extent]` square on the XZ plane,
/// slightly above the ground, with random colours.
pub fn random_lights<R: Rng + ?Sized>(rng: &mut R, count: u32, extent: f32) -> Vec<PointLight> {
    (0..count)
        .map(|_| {
            let position = [
                random_float(rng, -extent, extent),
                random_float(rng, 0.0, extent * 0.25),
                random_float(rng, -extent, extent),
            ];
            let color = [
                random_float(rng, 0.2, 1.0),
                random_float(rng, 0.2, 1.0),
                random_float(rng, 0.2, 1.0),
            ];
            PointLight::new(position, color)
        })
        .collect()
}
