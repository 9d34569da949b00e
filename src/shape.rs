// Geometric primitives: random generation and local mutation.
//
// A shape is a tagged geometry variant plus a cached tight bounding box,
// a fill color and a uniform alpha. The bounding box is recomputed after
// every geometry change; rectangles keep x1 <= x2 and y1 <= y2.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::canvas::Color;

/// Axis-aligned integer box in canvas pixel space. May extend outside the
/// canvas; callers clip before touching pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    /// Clip against canvas bounds. Returns inclusive (left, top, right,
    /// bottom) pixel coordinates, or None when the clipped box is empty.
    pub fn clipped(&self, canvas_w: u32, canvas_h: u32) -> Option<(i32, i32, i32, i32)> {
        let left = self.left.max(0);
        let top = self.top.max(0);
        let right = (self.left + self.width - 1).min(canvas_w as i32 - 1);
        let bottom = (self.top + self.height - 1).min(canvas_h as i32 - 1);
        if left > right || top > bottom {
            None
        } else {
            Some((left, top, right, bottom))
        }
    }
}

/// Which primitive kinds the generator may pick from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeKinds {
    pub triangles: bool,
    pub rectangles: bool,
    pub ellipses: bool,
}

impl ShapeKinds {
    pub fn all() -> Self {
        Self {
            triangles: true,
            rectangles: true,
            ellipses: true,
        }
    }

    /// Permissive default: disabling every kind re-enables all three.
    pub fn normalized(self) -> Self {
        if !self.triangles && !self.rectangles && !self.ellipses {
            Self::all()
        } else {
            self
        }
    }

    fn pick<R: Rng>(self, rng: &mut R) -> usize {
        let kinds = self.normalized();
        let enabled = [kinds.triangles, kinds.rectangles, kinds.ellipses];
        let count = enabled.iter().filter(|&&e| e).count();
        let index = rng.random_range(0..count);
        let mut seen = 0;
        for (kind, &on) in enabled.iter().enumerate() {
            if on {
                if seen == index {
                    return kind;
                }
                seen += 1;
            }
        }
        unreachable!("at least one shape kind is enabled after normalization")
    }
}

/// Tagged geometry of a primitive, integer coordinates in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Geometry {
    Triangle {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
    },
    Rectangle {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    },
    Ellipse {
        cx: i32,
        cy: i32,
        rx: i32,
        ry: i32,
    },
}

impl Geometry {
    /// Tight axis-aligned enclosure of the current geometry.
    pub fn bounds(&self) -> BoundingBox {
        match *self {
            Geometry::Triangle {
                x1,
                y1,
                x2,
                y2,
                x3,
                y3,
            } => {
                let min_x = x1.min(x2).min(x3);
                let min_y = y1.min(y2).min(y3);
                let max_x = x1.max(x2).max(x3);
                let max_y = y1.max(y2).max(y3);
                BoundingBox {
                    left: min_x,
                    top: min_y,
                    width: max_x - min_x + 1,
                    height: max_y - min_y + 1,
                }
            }
            Geometry::Rectangle { x1, y1, x2, y2 } => BoundingBox {
                left: x1,
                top: y1,
                width: x2 - x1 + 1,
                height: y2 - y1 + 1,
            },
            Geometry::Ellipse { cx, cy, rx, ry } => BoundingBox {
                left: cx - rx,
                top: cy - ry,
                width: 2 * rx + 1,
                height: 2 * ry + 1,
            },
        }
    }
}

/// A primitive with its cached bounding box, fill color and alpha in (0, 1].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Shape {
    pub geometry: Geometry,
    pub bbox: BoundingBox,
    pub color: Color,
    pub alpha: f32,
}

impl Shape {
    /// Build a shape from geometry, computing the bounding box.
    pub fn from_geometry(geometry: Geometry, color: Color, alpha: f32) -> Self {
        Self {
            bbox: geometry.bounds(),
            geometry,
            color,
            alpha,
        }
    }

    /// Random shape of a uniformly chosen enabled kind, geometry sampled
    /// within canvas bounds. The color is a placeholder; the solver assigns
    /// the real fill before the shape is ever evaluated.
    pub fn random<R: Rng>(rng: &mut R, width: u32, height: u32, alpha: f32, kinds: ShapeKinds) -> Self {
        let w = width as i32;
        let h = height as i32;
        let geometry = match kinds.pick(rng) {
            0 => Geometry::Triangle {
                x1: rng.random_range(0..w),
                y1: rng.random_range(0..h),
                x2: rng.random_range(0..w),
                y2: rng.random_range(0..h),
                x3: rng.random_range(0..w),
                y3: rng.random_range(0..h),
            },
            1 => {
                let ax = rng.random_range(0..w);
                let ay = rng.random_range(0..h);
                let bx = rng.random_range(0..w);
                let by = rng.random_range(0..h);
                Geometry::Rectangle {
                    x1: ax.min(bx),
                    y1: ay.min(by),
                    x2: ax.max(bx),
                    y2: ay.max(by),
                }
            }
            _ => Geometry::Ellipse {
                cx: rng.random_range(0..w),
                cy: rng.random_range(0..h),
                rx: rng.random_range(1..=(w / 4).max(1)),
                ry: rng.random_range(1..=(h / 4).max(1)),
            },
        };
        Shape::from_geometry(geometry, Color::opaque(0, 0, 0), alpha)
    }

    /// Type-specific local perturbation. Returns a new shape; the original
    /// is left untouched. Bounding box and rectangle ordering invariants
    /// hold on the result.
    pub fn mutated<R: Rng>(&self, rng: &mut R) -> Self {
        let mut next = *self;
        match &mut next.geometry {
            Geometry::Triangle {
                x1,
                y1,
                x2,
                y2,
                x3,
                y3,
            } => {
                let (dx, dy) = polar_offset(rng);
                match rng.random_range(0..3) {
                    0 => {
                        *x1 += dx;
                        *y1 += dy;
                    }
                    1 => {
                        *x2 += dx;
                        *y2 += dy;
                    }
                    _ => {
                        *x3 += dx;
                        *y3 += dy;
                    }
                }
            }
            Geometry::Rectangle { x1, y1, x2, y2 } => {
                let amount = scalar_delta(rng);
                match rng.random_range(0..4) {
                    0 => *x1 += amount,
                    1 => *y1 += amount,
                    2 => *x2 += amount,
                    _ => *y2 += amount,
                }
                if *x1 > *x2 {
                    std::mem::swap(x1, x2);
                }
                if *y1 > *y2 {
                    std::mem::swap(y1, y2);
                }
            }
            Geometry::Ellipse { cx, cy, rx, ry } => match rng.random_range(0..3) {
                0 => {
                    let (dx, dy) = polar_offset(rng);
                    *cx += dx;
                    *cy += dy;
                }
                1 => *rx = (*rx + scalar_delta(rng)).max(1),
                _ => *ry = (*ry + scalar_delta(rng)).max(1),
            },
        }
        next.bbox = next.geometry.bounds();

        // occasional alpha wiggle, clamped away from fully transparent
        if rng.random::<f32>() < 0.2 {
            next.alpha = (next.alpha + (rng.random::<f32>() - 0.5) * 0.08).clamp(0.1, 1.0);
        }
        next
    }
}

/// Random polar offset: angle in [0, 2pi), magnitude in [0, 20).
fn polar_offset<R: Rng>(rng: &mut R) -> (i32, i32) {
    let angle = rng.random::<f32>() * std::f32::consts::TAU;
    let radius = rng.random::<f32>() * 20.0;
    ((radius * angle.cos()) as i32, (radius * angle.sin()) as i32)
}

/// Uniform delta in [-10, 10).
fn scalar_delta<R: Rng>(rng: &mut R) -> i32 {
    ((rng.random::<f32>() - 0.5) * 20.0) as i32
}
