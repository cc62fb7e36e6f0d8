// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calculate the energy of an image
//!
//! Given an image, reduce it to a luma plane and run a Sobel operator
//! over it.  The gradient magnitude of every pixel, clamped to the
//! 8-bit range and with sub-threshold texture zeroed out, is that
//! pixel's importance: the edge map that every later stage refines.

use crate::cq;
use crate::error::{ensure_nonempty, CarveError, Result};
use crate::twodmap::TwoDimensionalMap;
use image::{GenericImageView, GrayImage, ImageBuffer, Luma, Pixel, Primitive};
use itertools::iproduct;
use num_traits::{cast, clamp};

/// Per-pixel importance, non-negative.  Values coming out of the
/// estimator are integral and lie in [0, 255]; the mask compositor
/// may push protected pixels far above that.
pub type EnergyGrid = TwoDimensionalMap<f64>;

/// An 8-bit grayscale plane.
pub type LumaPlane = TwoDimensionalMap<u8>;

const KERNEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const KERNEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// (Pixel) -> Luma
///
/// Rec. 601 weighting of the colour channels, rescaled to 8 bits
/// whatever the subpixel type of the source.
pub fn luma<P, S>(p: &P) -> u8
where
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let channels = p.channels();
    let max: f64 = cast(S::DEFAULT_MAX_VALUE).unwrap_or(255.0);
    let channel = |i: usize| -> f64 {
        let c: f64 = cast(channels[i]).unwrap_or(0.0);
        c * 255.0 / max
    };
    // Gray and gray-alpha pixels carry their luma in the first channel.
    if P::CHANNEL_COUNT < 3 {
        return clamp(channel(0).round(), 0.0, 255.0) as u8;
    }
    let lum = 0.299 * channel(0) + 0.587 * channel(1) + 0.114 * channel(2);
    clamp(lum.round(), 0.0, 255.0) as u8
}

/// Image -> Luma plane
pub fn grayscale<I, P, S>(image: &I) -> Result<LumaPlane>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let (width, height) = image.dimensions();
    ensure_nonempty((width, height))?;
    let data = iproduct!(0..height, 0..width)
        .map(|(y, x)| luma(&image.get_pixel(x, y)))
        .collect();
    TwoDimensionalMap::from_vec(width, height, data)
        .ok_or_else(|| CarveError::dimensions((width, height)))
}

// The three taps along one axis, with the border pixel standing in
// for its missing neighbour.
#[inline]
fn taps(i: u32, max: u32) -> [u32; 3] {
    [cq!(i == 0, 0, i - 1), i, cq!(i >= max, max, i + 1)]
}

/// Luma plane -> Edge map
///
/// Applies the two 3×3 Sobel kernels, combines them as
/// `sqrt(gx² + gy²)`, and keeps only magnitudes strictly above
/// `threshold`.
pub fn sobel(plane: &LumaPlane, threshold: f64) -> Result<EnergyGrid> {
    let (width, height) = plane.dimensions();
    ensure_nonempty((width, height))?;
    let (mw, mh) = (width - 1, height - 1);

    let data = iproduct!(0..height, 0..width)
        .map(|(y, x)| {
            let (mut gx, mut gy) = (0i32, 0i32);
            for (ky, sy) in taps(y, mh).iter().enumerate() {
                for (kx, sx) in taps(x, mw).iter().enumerate() {
                    let v = i32::from(plane[(*sx, *sy)]);
                    gx += v * KERNEL_X[ky][kx];
                    gy += v * KERNEL_Y[ky][kx];
                }
            }
            let magnitude = clamp(f64::from(gx * gx + gy * gy).sqrt(), 0.0, 255.0);
            cq!(magnitude > threshold, magnitude.trunc(), 0.0)
        })
        .collect();
    TwoDimensionalMap::from_vec(width, height, data)
        .ok_or_else(|| CarveError::dimensions((width, height)))
}

/// Compute the energy of every pixel in an image.  A pure function
/// of the image and the threshold.
pub fn estimate<I, P, S>(image: &I, threshold: f64) -> Result<EnergyGrid>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    sobel(&grayscale(image)?, threshold)
}

/// Render an energy grid as a grayscale image, scaled so the largest
/// value is white.  Handy for seeing what the carver sees.
pub fn energy_to_image(energy: &EnergyGrid) -> GrayImage {
    let (width, height) = energy.dimensions();
    let factor = energy
        .as_slice()
        .iter()
        .cloned()
        .filter(|e| e.is_finite())
        .fold(0.0f64, f64::max);
    ImageBuffer::from_fn(width, height, |x, y| {
        let e = energy[(x, y)];
        let scaled = cq!(factor > 0.0, e * 255.0 / factor, 0.0);
        Luma([clamp(scaled, 0.0, 255.0) as u8])
    })
}
