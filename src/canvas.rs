// RGBA pixel buffers and the RMS error metric.
//
// Two canvases exist per optimization run: the immutable target and the
// current canvas that shapes are composited into. The error metric only
// looks at R,G,B; the current canvas keeps its alpha pinned at 255.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A plain RGBA color value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Fully opaque color from RGB channels.
    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// A width x height RGBA byte buffer, row-major, 4 bytes per pixel.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    /// Create a zeroed canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Wrap an existing RGBA byte buffer (e.g. a decoded target image).
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> anyhow::Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            anyhow::bail!(
                "pixel buffer is {} bytes, expected {} for {}x{} RGBA",
                data.len(),
                expected,
                width,
                height
            );
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Byte offset of the pixel at (x, y).
    #[inline]
    pub fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Set every pixel's RGB to `color` and alpha to 255.
    pub fn fill(&mut self, color: Color) {
        for px in self.data.chunks_exact_mut(4) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
            px[3] = 255;
        }
    }

    /// Normalized RMS error against another canvas of the same dimensions,
    /// over R,G,B only: sqrt(sum(delta^2) / (3 * 255^2 * pixels)). In [0, 1].
    pub fn distance_to(&self, other: &Canvas) -> f64 {
        profiling::scope!("distance_to");
        debug_assert_eq!(self.width, other.width);
        debug_assert_eq!(self.height, other.height);

        let sum: f64 = self
            .data
            .par_chunks_exact(4)
            .zip(other.data.par_chunks_exact(4))
            .with_min_len(4096)
            .map(|(a, b)| {
                let dr = a[0] as f64 - b[0] as f64;
                let dg = a[1] as f64 - b[1] as f64;
                let db = a[2] as f64 - b[2] as f64;
                dr * dr + dg * dg + db * db
            })
            .sum();

        let pixels = (self.width as f64) * (self.height as f64);
        (sum / (3.0 * 255.0 * 255.0 * pixels)).sqrt()
    }
}

/// User-facing similarity percentage for a given distance.
#[inline]
pub fn similarity(distance: f64) -> f64 {
    (1.0 - distance) * 100.0
}
