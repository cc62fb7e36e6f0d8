// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Stack blur
//!
//! Mario Klingemann's stack blur: a two-pass (rows, then columns)
//! sliding window whose weights rise linearly to the centre and fall
//! off again.  Each pass keeps a running weighted sum plus the sums
//! of the incoming and outgoing halves of the window, so a pixel
//! costs the same whatever the radius.  The final division by
//! `(radius + 1)²` is a multiply and a shift from precomputed tables.
//!
//! The energy grid is run through the RGBA blur as an opaque gray
//! image and read back with the colour divided by the blurred alpha,
//! which keeps the weight channel and the value channel consistent.

use crate::energy::EnergyGrid;
use crate::twodmap::TwoDimensionalMap;
use image::{Rgba, RgbaImage};
use num_traits::clamp;

/// The largest radius the multiply/shift tables cover.  Larger radii
/// are clamped to this.
pub const MAX_RADIUS: u32 = 254;

#[rustfmt::skip]
static MUL_TABLE: [u64; 255] = [
    512, 512, 456, 512, 328, 456, 335, 512, 405, 328, 271, 456, 388, 335, 292, 512,
    454, 405, 364, 328, 298, 271, 496, 456, 420, 388, 360, 335, 312, 292, 273, 512,
    482, 454, 428, 405, 383, 364, 345, 328, 312, 298, 284, 271, 259, 496, 475, 456,
    437, 420, 404, 388, 374, 360, 347, 335, 323, 312, 302, 292, 282, 273, 265, 512,
    497, 482, 468, 454, 441, 428, 417, 405, 394, 383, 373, 364, 354, 345, 337, 328,
    320, 312, 305, 298, 291, 284, 278, 271, 265, 259, 507, 496, 485, 475, 465, 456,
    446, 437, 428, 420, 412, 404, 396, 388, 381, 374, 367, 360, 354, 347, 341, 335,
    329, 323, 318, 312, 307, 302, 297, 292, 287, 282, 278, 273, 269, 265, 261, 512,
    505, 497, 489, 482, 475, 468, 461, 454, 447, 441, 435, 428, 422, 417, 411, 405,
    399, 394, 389, 383, 378, 373, 368, 364, 359, 354, 350, 345, 341, 337, 332, 328,
    324, 320, 316, 312, 309, 305, 301, 298, 294, 291, 287, 284, 281, 278, 274, 271,
    268, 265, 262, 259, 257, 507, 501, 496, 491, 485, 480, 475, 470, 465, 460, 456,
    451, 446, 442, 437, 433, 428, 424, 420, 416, 412, 408, 404, 400, 396, 392, 388,
    385, 381, 377, 374, 370, 367, 363, 360, 357, 354, 350, 347, 344, 341, 338, 335,
    332, 329, 326, 323, 320, 318, 315, 312, 310, 307, 304, 302, 299, 297, 294, 292,
    289, 287, 285, 282, 280, 278, 275, 273, 271, 269, 267, 265, 263, 261, 259,
];

#[rustfmt::skip]
static SHG_TABLE: [u32; 255] = [
    9, 11, 12, 13, 13, 14, 14, 15, 15, 15, 15, 16, 16, 16, 16, 17,
    17, 17, 17, 17, 17, 17, 18, 18, 18, 18, 18, 18, 18, 18, 18, 19,
    19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 20, 20, 20,
    20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 21,
    21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21,
    21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 22, 22, 22, 22, 22, 22,
    22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22,
    22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
    24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
    24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
    24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
    24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
];

type Sample = [u64; 4];

// One pass over one line of pixels.  `line` is read-only; results go
// into `out`, which must be as long as `line`.
fn blur_line(line: &[Sample], out: &mut [Sample], radius: usize) {
    let last = line.len() - 1;
    let div = radius * 2 + 1;
    let mul = MUL_TABLE[radius];
    let shg = SHG_TABLE[radius];

    let mut stack: Vec<Sample> = vec![[0; 4]; div];
    let mut sum: Sample = [0; 4];
    let mut sum_in: Sample = [0; 4];
    let mut sum_out: Sample = [0; 4];

    let first = line[0];
    for (i, slot) in stack.iter_mut().take(radius + 1).enumerate() {
        *slot = first;
        for c in 0..4 {
            sum[c] += first[c] * (i as u64 + 1);
            sum_out[c] += first[c];
        }
    }
    for i in 1..=radius {
        let p = line[i.min(last)];
        stack[i + radius] = p;
        for c in 0..4 {
            sum[c] += p[c] * (radius + 1 - i) as u64;
            sum_in[c] += p[c];
        }
    }

    let mut sp = radius;
    for (x, target) in out.iter_mut().enumerate() {
        for c in 0..4 {
            target[c] = (sum[c] * mul) >> shg;
            sum[c] -= sum_out[c];
        }

        let start = (sp + div - radius) % div;
        let incoming = line[(x + radius + 1).min(last)];
        for c in 0..4 {
            sum_out[c] -= stack[start][c];
            sum_in[c] += incoming[c];
            sum[c] += sum_in[c];
        }
        stack[start] = incoming;

        sp = (sp + 1) % div;
        for c in 0..4 {
            sum_out[c] += stack[sp][c];
            sum_in[c] -= stack[sp][c];
        }
    }
}

/// Blur an RGBA image with the given radius, returning a new image.
/// A radius of 0 is a plain copy; radii beyond `MAX_RADIUS` are
/// clamped.  Fully transparent results have their colour zeroed.
pub fn stack_blur(image: &RgbaImage, radius: u32) -> RgbaImage {
    let radius = radius.min(MAX_RADIUS) as usize;
    let (width, height) = image.dimensions();
    if radius == 0 || width == 0 || height == 0 {
        return image.clone();
    }
    let (w, h) = (width as usize, height as usize);

    let mut samples: Vec<Sample> = image
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            [u64::from(r), u64::from(g), u64::from(b), u64::from(a)]
        })
        .collect();

    let mut line: Vec<Sample> = vec![[0; 4]; w];
    for row in samples.chunks_mut(w) {
        line.copy_from_slice(row);
        blur_line(&line, row, radius);
    }

    let mut column: Vec<Sample> = vec![[0; 4]; h];
    let mut blurred: Vec<Sample> = vec![[0; 4]; h];
    for x in 0..w {
        for (y, slot) in column.iter_mut().enumerate() {
            *slot = samples[y * w + x];
        }
        blur_line(&column, &mut blurred, radius);
        for (y, value) in blurred.iter().enumerate() {
            samples[y * w + x] = *value;
        }
    }

    RgbaImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = samples[y as usize * w + x as usize];
        let a = a.min(255) as u8;
        if a == 0 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([r.min(255) as u8, g.min(255) as u8, b.min(255) as u8, a])
        }
    })
}

/// Low-pass filter an energy grid.  Radius 0 returns the grid
/// unchanged.
pub fn smooth(grid: &EnergyGrid, radius: u32) -> EnergyGrid {
    if radius == 0 {
        return grid.clone();
    }
    let (width, height) = grid.dimensions();
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let e = clamp(grid[(x, y)], 0.0, 255.0) as u8;
        Rgba([e, e, e, 255])
    });
    let blurred = stack_blur(&image, radius);

    let mut out = TwoDimensionalMap::new(width, height);
    for (x, y, p) in blurred.enumerate_pixels() {
        let [r, _, _, a] = p.0;
        out[(x, y)] = if a == 0 {
            0.0
        } else {
            f64::from(r) * 255.0 / f64::from(a)
        };
    }
    out
}
