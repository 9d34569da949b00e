// Closed-form optimal fill color for a shape at a fixed alpha.
//
// For a uniform fill c blended as c*a + dst*(1-a) over exactly the masked
// pixels, the summed-squared-error minimizer per channel is the mean of
// (target - current)/a + current. The search engine depends on this being
// exact: both color assignment and fitness ranking use it.

use crate::canvas::{Canvas, Color};
use crate::raster::MaskBuffer;
use crate::shape::Shape;

/// Solve for the fill color minimizing squared error over the shape's masked
/// region. Re-renders the mask. Returns opaque black as a sentinel when the
/// clipped bounding box is empty or the shape covers no pixels.
pub fn compute_optimal_color(
    current: &Canvas,
    target: &Canvas,
    shape: &Shape,
    mask: &mut MaskBuffer,
) -> Color {
    profiling::scope!("compute_optimal_color");
    let Some((left, top, right, bottom)) = mask.render(shape) else {
        return Color::opaque(0, 0, 0);
    };

    let alpha = shape.alpha as f64;
    let mut sums = [0.0f64; 3];
    let mut count = 0u64;

    for y in top..=bottom {
        for x in left..=right {
            if !mask.is_member(x, y) {
                continue;
            }
            let idx = current.pixel_index(x as u32, y as u32);
            for ch in 0..3 {
                let t = target.data()[idx + ch] as f64;
                let c = current.data()[idx + ch] as f64;
                sums[ch] += (t - c) / alpha + c;
            }
            count += 1;
        }
    }

    if count == 0 {
        return Color::opaque(0, 0, 0);
    }

    Color::opaque(
        clamp_channel(sums[0] / count as f64),
        clamp_channel(sums[1] / count as f64),
        clamp_channel(sums[2] / count as f64),
    )
}

/// Nearest representable channel value: rounding keeps the result the best
/// integer color, not just the best real one truncated.
#[inline]
fn clamp_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::compute_fitness_delta;
    use crate::shape::Geometry;

    fn full_rect(w: i32, h: i32, alpha: f32) -> Shape {
        Shape::from_geometry(
            Geometry::Rectangle {
                x1: 0,
                y1: 0,
                x2: w - 1,
                y2: h - 1,
            },
            Color::opaque(0, 0, 0),
            alpha,
        )
    }

    #[test]
    fn solid_red_target_yields_red_fill() {
        let mut target = Canvas::new(2, 2);
        target.fill(Color::opaque(255, 0, 0));
        let mut current = Canvas::new(2, 2);
        current.fill(Color::opaque(0, 0, 0));
        let mut mask = MaskBuffer::new(2, 2);

        let shape = full_rect(2, 2, 1.0);
        let color = compute_optimal_color(&current, &target, &shape, &mut mask);
        assert_eq!(color, Color::opaque(255, 0, 0));
    }

    #[test]
    fn overshooting_mean_clamps_to_channel_range() {
        // alpha 0.5 over black: (255 - 0)/0.5 + 0 = 510, clamped to 255
        let mut target = Canvas::new(2, 2);
        target.fill(Color::opaque(255, 0, 0));
        let mut current = Canvas::new(2, 2);
        current.fill(Color::opaque(0, 0, 0));
        let mut mask = MaskBuffer::new(2, 2);

        let shape = full_rect(2, 2, 0.5);
        let color = compute_optimal_color(&current, &target, &shape, &mut mask);
        assert_eq!(color, Color::opaque(255, 0, 0));
    }

    #[test]
    fn offscreen_shape_returns_black_sentinel() {
        let target = Canvas::new(4, 4);
        let current = Canvas::new(4, 4);
        let mut mask = MaskBuffer::new(4, 4);
        let shape = Shape::from_geometry(
            Geometry::Rectangle {
                x1: 100,
                y1: 100,
                x2: 102,
                y2: 102,
            },
            Color::opaque(9, 9, 9),
            0.5,
        );
        let color = compute_optimal_color(&current, &target, &shape, &mut mask);
        assert_eq!(color, Color::opaque(0, 0, 0));
    }

    #[test]
    fn solved_color_beats_neighboring_colors() {
        let target = Canvas::from_rgba(
            2,
            2,
            vec![
                10, 200, 30, 255, //
                40, 60, 80, 255, //
                90, 120, 150, 255, //
                200, 20, 250, 255,
            ],
        )
        .unwrap();
        let mut current = Canvas::new(2, 2);
        current.fill(Color::opaque(100, 100, 100));
        let mut mask = MaskBuffer::new(2, 2);

        let shape = full_rect(2, 2, 0.5);
        let best = compute_optimal_color(&current, &target, &shape, &mut mask);
        let best_delta = compute_fitness_delta(&current, &target, &shape, best, &mut mask);

        for dr in [-1i32, 0, 1] {
            for dg in [-1i32, 0, 1] {
                for db in [-1i32, 0, 1] {
                    let rival = Color::opaque(
                        (best.r as i32 + dr).clamp(0, 255) as u8,
                        (best.g as i32 + dg).clamp(0, 255) as u8,
                        (best.b as i32 + db).clamp(0, 255) as u8,
                    );
                    let delta = compute_fitness_delta(&current, &target, &shape, rival, &mut mask);
                    assert!(
                        delta >= best_delta - 1e-9,
                        "{rival:?} beat the solved color: {delta} < {best_delta}"
                    );
                }
            }
        }
    }
}
