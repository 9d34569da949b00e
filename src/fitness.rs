// Incremental fitness evaluation.
//
// Committing a shape only changes pixels inside its mask, so the change in
// global summed squared error can be computed over the masked region alone:
// sum of (post-blend error^2 - pre-blend error^2) per channel. Negative is
// better. This is the quantity the search ranks candidates and mutants by,
// and it avoids re-rendering the whole canvas per candidate.

use crate::canvas::{Canvas, Color};
use crate::raster::MaskBuffer;
use crate::shape::Shape;

/// Exact change in global summed squared error (R,G,B, unnormalized) that
/// committing `shape` with `color` would cause. Re-renders the mask; the
/// mask state from any earlier call is not assumed to survive.
pub fn compute_fitness_delta(
    current: &Canvas,
    target: &Canvas,
    shape: &Shape,
    color: Color,
    mask: &mut MaskBuffer,
) -> f64 {
    profiling::scope!("compute_fitness_delta");
    let Some((left, top, right, bottom)) = mask.render(shape) else {
        return 0.0;
    };

    let a = shape.alpha as f64;
    let inv = 1.0 - a;
    let src = [color.r as f64, color.g as f64, color.b as f64];
    let mut sum = 0.0f64;

    for y in top..=bottom {
        for x in left..=right {
            if !mask.is_member(x, y) {
                continue;
            }
            let idx = current.pixel_index(x as u32, y as u32);
            for ch in 0..3 {
                let t = target.data()[idx + ch] as f64;
                let c = current.data()[idx + ch] as f64;
                let pre = t - c;
                let post = t - (src[ch] * a + c * inv);
                sum += post * post - pre * pre;
            }
        }
    }
    sum
}
