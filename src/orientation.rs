// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Image rotation
//!
//! The seam machinery only knows how to find and mutate vertical
//! (top-to-bottom) seams.  Rotating the image a quarter turn counter
//! clockwise turns its rows into columns, so the same code carves
//! horizontal seams; a three-quarter turn puts it back.  Both
//! rotations are plain pixel copies and exact inverses of each other.

use image::{GenericImageView, ImageBuffer, Pixel, Primitive};

/// Which dimension a carving step changes.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Carve {
    Width,
    Height,
}

impl Carve {
    /// The other axis.
    pub fn turn(self) -> Self {
        if self == Carve::Width {
            Carve::Height
        } else {
            Carve::Width
        }
    }

    /// The orientation the working buffers need for vertical seams
    /// to change this dimension.
    pub fn orientation(self) -> Orientation {
        match self {
            Carve::Width => Orientation::Upright,
            Carve::Height => Orientation::Rotated,
        }
    }
}

/// How the working buffers of a session currently sit relative to
/// the caller's image.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Orientation {
    Upright,
    /// Turned 90° counter clockwise by `rotate90`.
    Rotated,
}

/// Rotate an image 90° counter clockwise.  A W×H image becomes H×W.
pub fn rotate90<I, P, S>(image: &I) -> ImageBuffer<P, Vec<S>>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let (width, height) = image.dimensions();
    ImageBuffer::from_fn(height, width, |x, y| image.get_pixel(width - 1 - y, x))
}

/// Rotate an image 270° counter clockwise, undoing `rotate90`.
pub fn rotate270<I, P, S>(image: &I) -> ImageBuffer<P, Vec<S>>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let (width, height) = image.dimensions();
    ImageBuffer::from_fn(height, width, |x, y| image.get_pixel(y, height - 1 - x))
}

/// Where an upright pixel lands after `rotate90`.  `upright_width` is
/// the width of the upright image.  Returns `None` for points outside
/// it.
pub fn to_rotated((x, y): (u32, u32), upright_width: u32) -> Option<(u32, u32)> {
    if x >= upright_width {
        return None;
    }
    Some((y, upright_width - 1 - x))
}

/// Where a pixel of the rotated buffer came from in the upright
/// image.
pub fn to_upright((x, y): (u32, u32), upright_width: u32) -> Option<(u32, u32)> {
    if y >= upright_width {
        return None;
    }
    Some((upright_width - 1 - y, x))
}
