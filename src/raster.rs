// Rasterization: pixel membership tests, alpha-composited rendering into a
// canvas, and mask rendering into a reusable scratch buffer.
//
// Membership is exact per pixel center (no anti-aliasing): the color solver
// and the fitness delta both assume every masked pixel receives exactly
// src*a + dst*(1-a).

use crate::canvas::Canvas;
use crate::shape::{Geometry, Shape};

/// Sign-consistent barycentric test. A zero-area triangle contains nothing.
pub fn point_in_triangle(x: i32, y: i32, x1: i32, y1: i32, x2: i32, y2: i32, x3: i32, y3: i32) -> bool {
    let area = (x2 - x1) as i64 * (y3 - y1) as i64 - (x3 - x1) as i64 * (y2 - y1) as i64;
    if area == 0 {
        return false;
    }
    let area = area as f64;

    let s = ((y1 - y3) as i64 * (x - x3) as i64 + (x3 - x1) as i64 * (y - y3) as i64) as f64 / area;
    if !(0.0..=1.0).contains(&s) {
        return false;
    }
    let t = ((y3 - y2) as i64 * (x - x3) as i64 + (x2 - x3) as i64 * (y - y3) as i64) as f64 / -area;
    t >= 0.0 && s + t <= 1.0
}

/// Normalized distance test: ((x-cx)/rx)^2 + ((y-cy)/ry)^2 <= 1.
pub fn point_in_ellipse(x: i32, y: i32, cx: i32, cy: i32, rx: i32, ry: i32) -> bool {
    if rx <= 0 || ry <= 0 {
        return false;
    }
    let dx = (x - cx) as f64 / rx as f64;
    let dy = (y - cy) as f64 / ry as f64;
    dx * dx + dy * dy <= 1.0
}

/// Per-pixel membership, dispatched on the geometry variant.
#[inline]
pub fn contains(geometry: &Geometry, x: i32, y: i32) -> bool {
    match *geometry {
        Geometry::Triangle {
            x1,
            y1,
            x2,
            y2,
            x3,
            y3,
        } => point_in_triangle(x, y, x1, y1, x2, y2, x3, y3),
        Geometry::Rectangle { x1, y1, x2, y2 } => x >= x1 && x <= x2 && y >= y1 && y <= y2,
        Geometry::Ellipse { cx, cy, rx, ry } => point_in_ellipse(x, y, cx, cy, rx, ry),
    }
}

/// Composite a shape into the canvas over its clipped bounding box.
/// R,G,B receive round(clamp(src*a + dst*(1-a), 0, 255)); the canvas alpha
/// byte is left untouched. Empty clipped box is a no-op.
pub fn render_to_canvas(canvas: &mut Canvas, shape: &Shape) {
    profiling::scope!("render_to_canvas");
    let Some((left, top, right, bottom)) = shape.bbox.clipped(canvas.width(), canvas.height()) else {
        return;
    };

    let a = shape.alpha;
    let inv = 1.0 - a;
    let src = [shape.color.r as f32, shape.color.g as f32, shape.color.b as f32];
    let width = canvas.width();
    let data = canvas.data_mut();

    for y in top..=bottom {
        for x in left..=right {
            if !contains(&shape.geometry, x, y) {
                continue;
            }
            let idx = ((y as u32 * width + x as u32) * 4) as usize;
            for ch in 0..3 {
                let blended = src[ch] * a + data[idx + ch] as f32 * inv;
                data[idx + ch] = blended.clamp(0.0, 255.0).round() as u8;
            }
        }
    }
}

/// Reusable pixel-membership scratch buffer. Same dimensions and RGBA stride
/// as the canvas, but only the alpha byte is meaningful: 0 = outside the
/// shape, 255 = inside. The buffer survives across calls, so the region under
/// a shape's clipped bounding box is cleared before each render to drop stale
/// membership bits.
pub struct MaskBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl MaskBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Whether the pixel at (x, y) was flagged by the last render.
    #[inline]
    pub fn is_member(&self, x: i32, y: i32) -> bool {
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.data[idx + 3] > 0
    }

    fn clear_region(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        for y in top..=bottom {
            let start = ((y as u32 * self.width + left as u32) * 4) as usize;
            let end = ((y as u32 * self.width + right as u32 + 1) * 4) as usize;
            self.data[start..end].fill(0);
        }
    }

    /// Render a shape's membership into the buffer: clear the clipped
    /// bounding box, then flag member pixels. Returns the clipped inclusive
    /// bounds, or None when the shape misses the canvas entirely.
    pub fn render(&mut self, shape: &Shape) -> Option<(i32, i32, i32, i32)> {
        profiling::scope!("mask_render");
        let (left, top, right, bottom) = shape.bbox.clipped(self.width, self.height)?;
        self.clear_region(left, top, right, bottom);

        for y in top..=bottom {
            for x in left..=right {
                if contains(&shape.geometry, x, y) {
                    let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
                    self.data[idx + 3] = 255;
                }
            }
        }
        Some((left, top, right, bottom))
    }
}
