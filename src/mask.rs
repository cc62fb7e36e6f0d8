// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mask compositing
//!
//! The energy map only knows about edges.  Callers know more: that a
//! region must survive (a protect mask, a detected face), that a
//! region should go (a remove mask), or, while enlarging, that a
//! seam has already been duplicated once.  The compositor writes that
//! knowledge into the energy grid by pinning pixels to the top or
//! the bottom of the energy range.

use crate::energy::EnergyGrid;
use crate::error::{CarveError, Result};
use image::{GenericImageView, Pixel, Rgba, RgbaImage};
use itertools::iproduct;
use serde::{Deserialize, Serialize};

/// A binary protect or remove mask, the same size as the image it
/// belongs to.  White (R, G and B all at 0xFF) means masked.
pub type MaskBuffer = RgbaImage;

/// Energy of a protected pixel.  This is the largest value for which
/// a seam through `u32::MAX` protected rows still sums to a finite
/// cost.
pub const PROTECTED_ENERGY: f64 = f64::MAX / 4_294_967_296.0;

/// Energy of a pixel flagged for removal.
pub const REMOVED_ENERGY: f64 = 0.0;

/// Added to every pixel outside the remove mask while one is
/// attached, so that only masked pixels sit at `REMOVED_ENERGY`.
pub const REMOVAL_MARGIN: f64 = 1.0;

/// A face reported by an external detector: the centre of the
/// detection, the side of its square, and the detector's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceRect {
    pub col: i32,
    pub row: i32,
    pub scale: i32,
    pub confidence: f32,
}

impl FaceRect {
    pub fn new(col: i32, row: i32, scale: i32, confidence: f32) -> Self {
        FaceRect {
            col,
            row,
            scale,
            confidence,
        }
    }

    /// The protected square, as half-open pixel ranges clipped to an
    /// image of the given size.  `None` if nothing of it is inside.
    pub fn region(&self, (width, height): (u32, u32)) -> Option<(std::ops::Range<u32>, std::ops::Range<u32>)> {
        let half = f64::from(self.scale.max(0)) / 1.7;
        let clip = |centre: i32, limit: u32| {
            let lo = (f64::from(centre) - half).floor().max(0.0);
            let hi = (f64::from(centre) + half).ceil().min(f64::from(limit));
            if lo < hi {
                Some(lo as u32..hi as u32)
            } else {
                None
            }
        };
        Some((clip(self.col, width)?, clip(self.row, height)?))
    }
}

/// True if a mask pixel marks its position.
#[inline]
pub fn is_masked(p: &Rgba<u8>) -> bool {
    let [r, g, b, _] = p.0;
    r == 0xff && g == 0xff && b == 0xff
}

/// Turn an arbitrary image into a binary mask: bright pixels become
/// opaque white, everything else fully transparent.
pub fn dither<I, P>(image: &I) -> MaskBuffer
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = image.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        let rgb = image.get_pixel(x, y).to_rgb();
        if rgb.channels().iter().all(|c| *c > 127) {
            Rgba([0xff, 0xff, 0xff, 0xff])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Check that a mask lines up with a buffer of the given size.
pub fn ensure_aligned(what: &'static str, expected: (u32, u32), mask: Option<&MaskBuffer>) -> Result<()> {
    match mask {
        Some(mask) if mask.dimensions() != expected => Err(CarveError::DimensionMismatch {
            what,
            expected,
            found: mask.dimensions(),
        }),
        _ => Ok(()),
    }
}

/// Everything the compositor folds into one iteration's energy grid.
/// All coordinates are in the grid's own frame.
#[derive(Debug, Default)]
pub struct Compositor<'a> {
    protect: Option<&'a MaskBuffer>,
    remove: Option<&'a MaskBuffer>,
    faces: Vec<FaceRect>,
    face_threshold: f32,
    guarded: Vec<(u32, u32)>,
}

impl<'a> Compositor<'a> {
    pub fn new() -> Self {
        Compositor::default()
    }

    pub fn protect(mut self, mask: Option<&'a MaskBuffer>) -> Self {
        self.protect = mask;
        self
    }

    pub fn remove(mut self, mask: Option<&'a MaskBuffer>) -> Self {
        self.remove = mask;
        self
    }

    /// Faces scoring above `threshold` are protected.
    pub fn faces(mut self, faces: Vec<FaceRect>, threshold: f32) -> Self {
        self.faces = faces;
        self.face_threshold = threshold;
        self
    }

    /// Pixels already used by earlier insertions.
    pub fn guard(mut self, points: Vec<(u32, u32)>) -> Self {
        self.guarded = points;
        self
    }

    /// Check the masks against the grid they'll be composited onto.
    pub fn ensure_aligned(&self, grid: &EnergyGrid) -> Result<()> {
        ensure_aligned("protect mask", grid.dimensions(), self.protect)?;
        ensure_aligned("remove mask", grid.dimensions(), self.remove)
    }

    /// Energy grid -> Energy grid
    ///
    /// With a remove mask attached, every other pixel is raised by
    /// `REMOVAL_MARGIN` and remove-masked pixels drop to
    /// `REMOVED_ENERGY`.  Protect-masked
    /// pixels, faces and guarded pixels rise to `PROTECTED_ENERGY`.
    /// Where both masks claim a pixel, protection wins.
    pub fn composite(&self, grid: &EnergyGrid) -> Result<EnergyGrid> {
        self.ensure_aligned(grid)?;
        let (width, height) = grid.dimensions();
        let mut out = grid.clone();

        if let Some(mask) = self.remove {
            out.as_mut_slice().iter_mut().for_each(|e| *e += REMOVAL_MARGIN);
            for (x, y, _) in mask.enumerate_pixels().filter(|(_, _, p)| is_masked(p)) {
                out[(x, y)] = REMOVED_ENERGY;
            }
        }
        if let Some(mask) = self.protect {
            for (x, y, _) in mask.enumerate_pixels().filter(|(_, _, p)| is_masked(p)) {
                out[(x, y)] = PROTECTED_ENERGY;
            }
        }
        for face in self.faces.iter().filter(|f| f.confidence > self.face_threshold) {
            if let Some((cols, rows)) = face.region((width, height)) {
                for (y, x) in iproduct!(rows, cols) {
                    out[(x, y)] = PROTECTED_ENERGY;
                }
            }
        }
        for (x, y) in self.guarded.iter().filter(|(x, y)| *x < width && *y < height) {
            out[(*x, *y)] = PROTECTED_ENERGY;
        }
        Ok(out)
    }
}
