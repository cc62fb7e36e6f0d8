// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Target sizes
//!
//! Callers rarely think in raw pixel counts.  `TargetSize` turns a
//! request into the dimensions a session should carve to, and
//! `fit` works out how far a conventional rescale can take an image
//! before seam carving has to do the rest.

use crate::error::{ensure_nonempty, CarveError, Result};
use crate::mask::MaskBuffer;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// What size the caller wants.  A zero in any field means "leave
/// this dimension alone".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSize {
    /// Exact pixel dimensions.
    Exact { width: u32, height: u32 },
    /// A percentage of the current dimensions.  Shrink only.
    Percent { width: u32, height: u32 },
    /// A square whose side is the smaller of the two.  Both must be
    /// given.
    Square { width: u32, height: u32 },
}

fn keep_or(target: u32, current: u32) -> u32 {
    if target == 0 {
        current
    } else {
        target
    }
}

impl TargetSize {
    /// The concrete dimensions to carve an image of `current` size to.
    pub fn resolve(&self, current: (u32, u32)) -> Result<(u32, u32)> {
        ensure_nonempty(current)?;
        let (cw, ch) = current;
        match *self {
            TargetSize::Exact { width, height } => Ok((keep_or(width, cw), keep_or(height, ch))),
            TargetSize::Percent { width, height } => {
                if width > 100 || height > 100 {
                    return Err(CarveError::InvalidTarget(format!(
                        "{}% x {}% would enlarge the image",
                        width, height
                    )));
                }
                let scale = |pct: u32, dim: u32| {
                    if pct == 0 {
                        dim
                    } else {
                        ((u64::from(dim) * u64::from(pct) / 100) as u32).max(1)
                    }
                };
                Ok((scale(width, cw), scale(height, ch)))
            }
            TargetSize::Square { width, height } => {
                if width == 0 || height == 0 {
                    return Err(CarveError::InvalidTarget(
                        "a square target needs both a width and a height".to_string(),
                    ));
                }
                let side = width.min(height);
                Ok((side, side))
            }
        }
    }
}

/// When both dimensions shrink, the aspect-preserving size an image
/// can be rescaled to while staying at least as large as the target
/// on both axes.  `None` if a rescale would not help.
pub fn fit(current: (u32, u32), target: (u32, u32)) -> Option<(u32, u32)> {
    let ((cw, ch), (tw, th)) = (current, target);
    if tw == 0 || th == 0 || tw >= cw || th >= ch {
        return None;
    }
    let factor = (f64::from(tw) / f64::from(cw)).max(f64::from(th) / f64::from(ch));
    let sw = ((f64::from(cw) * factor).round() as u32).max(tw).min(cw);
    let sh = ((f64::from(ch) * factor).round() as u32).max(th).min(ch);
    if (sw, sh) == current {
        None
    } else {
        Some((sw, sh))
    }
}

/// Rescale an image with a Lanczos filter.
pub fn rescale_image(image: &RgbaImage, (width, height): (u32, u32)) -> RgbaImage {
    imageops::resize(image, width, height, FilterType::Lanczos3)
}

/// Rescale a mask.  Nearest-neighbour sampling keeps it binary.
pub fn rescale_mask(mask: &MaskBuffer, (width, height): (u32, u32)) -> MaskBuffer {
    imageops::resize(mask, width, height, FilterType::Nearest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn exact_keeps_zero_axes() {
        let target = TargetSize::Exact { width: 0, height: 50 };
        assert_eq!(target.resolve((80, 60)), Ok((80, 50)));
    }

    #[test]
    fn percent_scales_down() {
        let target = TargetSize::Percent { width: 50, height: 0 };
        assert_eq!(target.resolve((81, 60)), Ok((40, 60)));
        let target = TargetSize::Percent { width: 1, height: 100 };
        assert_eq!(target.resolve((10, 60)), Ok((1, 60)));
    }

    #[test]
    fn percent_refuses_to_enlarge() {
        let target = TargetSize::Percent { width: 150, height: 0 };
        assert!(matches!(
            target.resolve((10, 10)),
            Err(CarveError::InvalidTarget(_))
        ));
    }

    #[test]
    fn square_uses_the_shorter_side() {
        let target = TargetSize::Square { width: 40, height: 30 };
        assert_eq!(target.resolve((100, 80)), Ok((30, 30)));
        let target = TargetSize::Square { width: 40, height: 0 };
        assert!(target.resolve((100, 80)).is_err());
    }

    #[test]
    fn fit_preserves_aspect_and_stays_above_target() {
        assert_eq!(fit((5000, 2500), (1920, 1080)), Some((2160, 1080)));
        assert_eq!(fit((100, 100), (50, 80)), Some((80, 80)));
        assert_eq!(fit((100, 100), (120, 80)), None);
        assert_eq!(fit((100, 100), (0, 80)), None);
    }

    #[test]
    fn masks_stay_binary_when_rescaled() {
        let mask = RgbaImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let small = rescale_mask(&mask, (4, 4));
        assert_eq!(small.dimensions(), (4, 4));
        assert!(small
            .pixels()
            .all(|p| p.0 == [255, 255, 255, 255] || p.0 == [0, 0, 0, 0]));
        assert_eq!(rescale_image(&mask, (3, 5)).dimensions(), (3, 5));
    }
}
