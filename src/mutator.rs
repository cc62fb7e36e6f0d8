// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seam removal and insertion
//!
//! Both operations build a fresh buffer one column narrower or wider
//! than the one they're given.  They're generic on the pixel type so
//! the very same code rewrites the image and any masks riding along
//! with it.

use crate::cq;
use crate::error::{ensure_nonempty, CarveError, Result};
use crate::seamfinder::Seam;
use image::{GenericImage, GenericImageView, ImageBuffer, Pixel, Primitive};
use num_traits::NumCast;

/// Remove a vertical seam.  Pixels left of the seam keep their
/// column, pixels right of it move one column left, and the seam
/// pixel itself is dropped.
pub fn remove_seam<I, P, S>(image: &I, seam: &Seam) -> Result<ImageBuffer<P, Vec<S>>>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let (width, height) = image.dimensions();
    ensure_nonempty((width, height))?;
    seam.check_against((width, height))?;
    if width < 2 {
        return Err(CarveError::dimensions((width - 1, height)));
    }

    let mut imgbuf = ImageBuffer::new(width - 1, height);
    for (x, y) in seam.points() {
        for sx in 0..x {
            imgbuf.put_pixel(sx, y, image.get_pixel(sx, y));
        }
        for sx in (x + 1)..width {
            imgbuf.put_pixel(sx - 1, y, image.get_pixel(sx, y));
        }
    }
    Ok(imgbuf)
}

// (Pixel, Pixel) -> Pixel, channel by channel.
fn average<P, S>(p1: &P, p2: &P) -> P
where
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    p1.map2(p2, |c1, c2| {
        let a: f64 = NumCast::from(c1).unwrap_or(0.0);
        let b: f64 = NumCast::from(c2).unwrap_or(0.0);
        NumCast::from((a + b) / 2.0).unwrap_or(c1)
    })
}

/// Insert a vertical seam.  Every row gains a pixel at the seam's
/// column, synthesized by averaging the pixels either side of it;
/// the pixel that was there and everything right of it move one
/// column right.  On the left and right borders, where one side is
/// missing, the pixel above (or below) stands in for it.
///
/// Returns the new buffer and the synthesized pixels, top to bottom.
pub fn insert_seam<I, P, S>(image: &I, seam: &Seam) -> Result<(ImageBuffer<P, Vec<S>>, Vec<P>)>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let (width, height) = image.dimensions();
    ensure_nonempty((width, height))?;
    seam.check_against((width, height))?;
    let (mw, mh) = (width - 1, height - 1);

    let mut imgbuf = ImageBuffer::new(width + 1, height);
    let mut synthesized = Vec::with_capacity(height as usize);
    for (x, y) in seam.points() {
        let left = cq!(
            x > 0,
            image.get_pixel(x - 1, y),
            image.get_pixel(x, cq!(y > 0, y - 1, y))
        );
        let right = cq!(
            x < mw,
            image.get_pixel(x + 1, y),
            image.get_pixel(x, cq!(y < mh, y + 1, y))
        );
        let pixel = average(&left, &right);

        for sx in 0..x {
            imgbuf.put_pixel(sx, y, image.get_pixel(sx, y));
        }
        imgbuf.put_pixel(x, y, pixel);
        for sx in x..width {
            imgbuf.put_pixel(sx + 1, y, image.get_pixel(sx, y));
        }
        synthesized.push(pixel);
    }
    Ok((imgbuf, synthesized))
}

/// Paint a seam onto an image, for debugging.  Columns past the right
/// edge are clamped onto it, so a seam can be drawn on the narrower
/// image it was just removed from.
pub fn paint_seam<I, P>(image: &mut I, seam: &Seam, pixel: P)
where
    I: GenericImage<Pixel = P>,
    P: Pixel + 'static,
{
    let (width, height) = image.dimensions();
    if width == 0 {
        return;
    }
    for (x, y) in seam.points().filter(|(_, y)| *y < height) {
        image.put_pixel(x.min(width - 1), y, pixel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba, RgbaImage};

    type Gray = ImageBuffer<Luma<u8>, Vec<u8>>;

    fn numbered(width: u32, height: u32) -> Gray {
        ImageBuffer::from_fn(width, height, |x, y| Luma([(y * 10 + x) as u8 * 2]))
    }

    #[test]
    fn removal_drops_one_pixel_per_row() {
        let image = numbered(4, 3);
        let seam = Seam::from_columns(vec![1, 2, 3], 4).unwrap();
        let carved = remove_seam(&image, &seam).unwrap();
        assert_eq!(carved.dimensions(), (3, 3));
        assert_eq!(
            carved.into_raw(),
            vec![0, 4, 6, 20, 22, 26, 40, 42, 44]
        );
    }

    #[test]
    fn insertion_averages_neighbours() {
        let image = numbered(4, 3);
        let seam = Seam::from_columns(vec![1, 2, 2], 4).unwrap();
        let (grown, synthesized) = insert_seam(&image, &seam).unwrap();
        assert_eq!(grown.dimensions(), (5, 3));
        assert_eq!(
            grown.into_raw(),
            vec![0, 2, 2, 4, 6, 20, 22, 24, 24, 26, 40, 42, 44, 44, 46]
        );
        assert_eq!(synthesized, vec![Luma([2]), Luma([24]), Luma([44])]);
    }

    #[test]
    fn insertion_on_the_borders_looks_up_and_down() {
        let image = numbered(3, 3);
        let seam = Seam::from_columns(vec![0, 1, 2], 3).unwrap();
        let (grown, synthesized) = insert_seam(&image, &seam).unwrap();
        // row 0: left missing, above missing -> self (0) with right (2)
        // row 2: right missing -> below missing -> self (44) with left (42)
        assert_eq!(synthesized, vec![Luma([1]), Luma([22]), Luma([43])]);
        assert_eq!(grown.get_pixel(0, 0), &Luma([1]));
        assert_eq!(grown.get_pixel(1, 0), &Luma([0]));
        assert_eq!(grown.get_pixel(2, 2), &Luma([43]));
        assert_eq!(grown.get_pixel(3, 2), &Luma([44]));
    }

    #[test]
    fn left_border_uses_pixel_above() {
        let image = numbered(3, 2);
        let seam = Seam::from_columns(vec![0, 0], 3).unwrap();
        let (_, synthesized) = insert_seam(&image, &seam).unwrap();
        // row 1: above (0) and right (22)
        assert_eq!(synthesized[1], Luma([11]));
    }

    #[test]
    fn insert_then_remove_restores_dimensions() {
        let image = RgbaImage::from_fn(6, 5, |x, y| Rgba([x as u8 * 40, y as u8 * 50, 7, 255]));
        let seam = Seam::from_columns(vec![2, 3, 3, 4, 5], 6).unwrap();
        let (grown, _) = insert_seam(&image, &seam).unwrap();
        let back = remove_seam(&grown, &seam).unwrap();
        assert_eq!(back.dimensions(), image.dimensions());
        assert_eq!(back, image);
    }

    #[test]
    fn wrong_length_seam_is_malformed() {
        let image = numbered(4, 3);
        let seam = Seam::from_columns(vec![1, 1], 4).unwrap();
        assert!(matches!(
            remove_seam(&image, &seam),
            Err(CarveError::MalformedSeam(_))
        ));
        assert!(matches!(
            insert_seam(&image, &seam),
            Err(CarveError::MalformedSeam(_))
        ));
    }

    #[test]
    fn single_column_cannot_shrink() {
        let image = numbered(1, 2);
        let seam = Seam::from_columns(vec![0, 0], 1).unwrap();
        assert_eq!(
            remove_seam(&image, &seam),
            Err(CarveError::InvalidDimensions {
                width: 0,
                height: 2
            })
        );
    }

    #[test]
    fn paint_clamps_to_the_right_edge() {
        let mut image = numbered(2, 2);
        let seam = Seam::from_columns(vec![2, 1], 3).unwrap();
        paint_seam(&mut image, &seam, Luma([255]));
        assert_eq!(image.get_pixel(1, 0), &Luma([255]));
        assert_eq!(image.get_pixel(1, 1), &Luma([255]));
        assert_eq!(image.get_pixel(0, 0), &Luma([0]));
    }
}
