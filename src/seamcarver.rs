// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seamcarve - The resize session
//!
//! A `SeamCarver` owns everything one resize needs: the working image,
//! the masks that ride along with it, the history of inserted seams,
//! and whoever is watching.  Nothing here is shared between sessions,
//! so independent images can be carved on independent threads.
//!
//! Only vertical seams are ever searched for.  To change the height,
//! the image and its masks are turned a quarter turn (see
//! `orientation`), carved, and turned back when the caller next looks
//! at them.  Consecutive height operations stay rotated in between.

use crate::config::Config;
use crate::energy::{estimate, EnergyGrid};
use crate::error::{ensure_nonempty, CarveError, Result};
use crate::history::SeamHistory;
use crate::mask::{ensure_aligned, Compositor, FaceRect, MaskBuffer};
use crate::mutator::{insert_seam, paint_seam, remove_seam};
use crate::observer::{Observer, Snapshot};
use crate::orientation::{rotate270, rotate90, Carve, Orientation};
use crate::seamfinder::{find_seam, Seam};
use crate::stackblur::smooth;
use crate::target::{fit, rescale_image, rescale_mask};
use image::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Something that finds faces in the working buffer.  Rectangles are
/// in the coordinates of the buffer it's handed, and are used for one
/// iteration only.
pub type FaceDetector = Box<dyn FnMut(&RgbaImage) -> Vec<FaceRect> + Send>;

/// Aborts a running session between two iterations.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One resize session.
pub struct SeamCarver {
    config: Config,
    image: RgbaImage,
    protect: Option<MaskBuffer>,
    remove: Option<MaskBuffer>,
    orientation: Orientation,
    history: SeamHistory,
    faces: Option<FaceDetector>,
    observer: Option<Box<dyn Observer + Send>>,
    cancel: Arc<AtomicBool>,
    iterations: usize,
}

impl SeamCarver {
    /// Start a session on an image.  Fails on an empty image.
    pub fn new(image: RgbaImage, config: Config) -> Result<Self> {
        ensure_nonempty(image.dimensions())?;
        Ok(SeamCarver {
            config,
            image,
            protect: None,
            remove: None,
            orientation: Orientation::Upright,
            history: SeamHistory::new(),
            faces: None,
            observer: None,
            cancel: Arc::new(AtomicBool::new(false)),
            iterations: 0,
        })
    }

    /// Attach a protect mask.  It must be the size of the image.
    pub fn with_protect_mask(mut self, mask: MaskBuffer) -> Result<Self> {
        self.orient(Orientation::Upright);
        ensure_aligned("protect mask", self.image.dimensions(), Some(&mask))?;
        self.protect = Some(mask);
        Ok(self)
    }

    /// Attach a remove mask.  It must be the size of the image.
    pub fn with_remove_mask(mut self, mask: MaskBuffer) -> Result<Self> {
        self.orient(Orientation::Upright);
        ensure_aligned("remove mask", self.image.dimensions(), Some(&mask))?;
        self.remove = Some(mask);
        Ok(self)
    }

    pub fn with_face_detector<F>(mut self, detector: F) -> Self
    where
        F: FnMut(&RgbaImage) -> Vec<FaceRect> + Send + 'static,
    {
        self.faces = Some(Box::new(detector));
        self
    }

    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: Observer + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancel))
    }

    pub fn history(&self) -> &SeamHistory {
        &self.history
    }

    /// Iterations run so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// The current size of the image, the right way up.
    pub fn dimensions(&self) -> (u32, u32) {
        let (width, height) = self.image.dimensions();
        match self.orientation {
            Orientation::Upright => (width, height),
            Orientation::Rotated => (height, width),
        }
    }

    fn upright_width(&self) -> u32 {
        self.dimensions().0
    }

    /// A copy of the current image, the right way up.
    pub fn to_image(&self) -> RgbaImage {
        match self.orientation {
            Orientation::Upright => self.image.clone(),
            Orientation::Rotated => rotate270(&self.image),
        }
    }

    /// End the session, returning the image and its masks upright.
    pub fn into_parts(mut self) -> (RgbaImage, Option<MaskBuffer>, Option<MaskBuffer>) {
        self.orient(Orientation::Upright);
        (self.image, self.protect, self.remove)
    }

    pub fn into_image(self) -> RgbaImage {
        self.into_parts().0
    }

    fn orient(&mut self, orientation: Orientation) {
        if self.orientation == orientation {
            return;
        }
        let f: fn(&MaskBuffer) -> MaskBuffer = match orientation {
            Orientation::Rotated => rotate90,
            Orientation::Upright => rotate270,
        };
        self.image = f(&self.image);
        self.protect = self.protect.as_ref().map(f);
        self.remove = self.remove.as_ref().map(f);
        self.orientation = orientation;
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.load(Ordering::SeqCst) {
            debug!(iterations = self.iterations, "resize cancelled");
            return Err(CarveError::Cancelled {
                iterations: self.iterations,
            });
        }
        Ok(())
    }

    fn check_alignment(&self) -> Result<()> {
        ensure_aligned("protect mask", self.image.dimensions(), self.protect.as_ref())?;
        ensure_aligned("remove mask", self.image.dimensions(), self.remove.as_ref())
    }

    // Edge map, smoothed, with masks, faces and (when enlarging) the
    // seam history written in.  Always for the current working frame.
    fn composite_energy(&mut self, enlarging: bool) -> Result<EnergyGrid> {
        let edges = estimate(&self.image, self.config.sobel_threshold)?;
        let smoothed = smooth(&edges, self.config.blur_radius);
        let faces = match self.faces.as_mut() {
            Some(detect) => detect(&self.image),
            None => Vec::new(),
        };
        let guarded = if enlarging {
            self.history
                .guarded_points(self.orientation, self.upright_width())
        } else {
            Vec::new()
        };
        Compositor::new()
            .protect(self.protect.as_ref())
            .remove(self.remove.as_ref())
            .faces(faces, self.config.face_threshold)
            .guard(guarded)
            .composite(&smoothed)
    }

    /// The energy grid the next seam search on `axis` would see.  For
    /// `Carve::Height` it's in rotated coordinates: its columns are
    /// the image's rows.
    pub fn energy(&mut self, axis: Carve, enlarging: bool) -> Result<EnergyGrid> {
        self.orient(axis.orientation());
        self.composite_energy(enlarging)
    }

    fn notify(&mut self, seam: &Seam, axis: Carve, enlarged: bool) {
        self.iterations += 1;
        if let Some(observer) = self.observer.as_mut() {
            observer.on_iteration(Snapshot {
                image: &self.image,
                orientation: self.orientation,
                seam,
                axis,
                iteration: self.iterations,
                enlarged,
            });
        }
    }

    /// Remove the cheapest seam on `axis`, making the image one pixel
    /// narrower (or shorter).  Returns the seam, in the frame it was
    /// found in.
    pub fn shrink(&mut self, axis: Carve) -> Result<Seam> {
        self.check_cancelled()?;
        let (width, height) = self.dimensions();
        match axis {
            Carve::Width if width < 2 => return Err(CarveError::dimensions((width - 1, height))),
            Carve::Height if height < 2 => return Err(CarveError::dimensions((width, height - 1))),
            _ => {}
        }

        self.orient(axis.orientation());
        let energy = self.composite_energy(false)?;
        let seam = find_seam(&energy)?;
        let upright_width = self.upright_width();

        self.image = remove_seam(&self.image, &seam)?;
        self.protect = self.protect.as_ref().map(|m| remove_seam(m, &seam)).transpose()?;
        self.remove = self.remove.as_ref().map(|m| remove_seam(m, &seam)).transpose()?;
        self.check_alignment()?;
        self.history.record_removal(axis, &seam, upright_width);

        if self.config.debug {
            paint_seam(&mut self.image, &seam, Rgba(self.config.seam_color));
        }
        trace!(
            iteration = self.iterations + 1,
            ?axis,
            cost = seam.cost(&energy),
            width = self.dimensions().0,
            height = self.dimensions().1,
            "removed seam"
        );
        self.notify(&seam, axis, false);
        Ok(seam)
    }

    /// Insert a seam on `axis`, making the image one pixel wider (or
    /// taller).  Pixels synthesized by earlier insertions are avoided.
    pub fn enlarge(&mut self, axis: Carve) -> Result<Seam> {
        self.check_cancelled()?;
        self.orient(axis.orientation());
        let energy = self.composite_energy(true)?;
        let seam = find_seam(&energy)?;
        let upright_width = self.upright_width();

        let (image, synthesized) = insert_seam(&self.image, &seam)?;
        self.image = image;
        self.protect = self
            .protect
            .as_ref()
            .map(|m| insert_seam(m, &seam).map(|(m, _)| m))
            .transpose()?;
        self.remove = self
            .remove
            .as_ref()
            .map(|m| insert_seam(m, &seam).map(|(m, _)| m))
            .transpose()?;
        self.check_alignment()?;
        self.history
            .record_insertion(axis, &seam, &synthesized, upright_width);

        if self.config.debug {
            paint_seam(&mut self.image, &seam, Rgba(self.config.seam_color));
        }
        trace!(
            iteration = self.iterations + 1,
            ?axis,
            cost = seam.cost(&energy),
            width = self.dimensions().0,
            height = self.dimensions().1,
            "inserted seam"
        );
        self.notify(&seam, axis, true);
        Ok(seam)
    }

    /// Rescale, aspect preserved, as close to `target` as possible
    /// without going under it on either axis.  Only applies when both
    /// dimensions shrink.  Returns true if the image was rescaled.
    ///
    /// The seam history is cleared, since rescaling moves every pixel.
    pub fn prescale(&mut self, target: (u32, u32)) -> Result<bool> {
        self.check_cancelled()?;
        let current = self.dimensions();
        let scaled = match fit(current, target) {
            Some(scaled) => scaled,
            None => return Ok(false),
        };
        debug!(?current, ?scaled, "rescaling before carving");
        self.orient(Orientation::Upright);
        self.image = rescale_image(&self.image, scaled);
        self.protect = self.protect.as_ref().map(|m| rescale_mask(m, scaled));
        self.remove = self.remove.as_ref().map(|m| rescale_mask(m, scaled));
        self.history.clear();
        Ok(true)
    }

    /// Carve or grow the image until it is `width` by `height`.  When
    /// both dimensions need to change, the two axes take turns.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(CarveError::InvalidTarget(format!(
                "cannot resize to {}x{}",
                width, height
            )));
        }
        debug!(from = ?self.dimensions(), to = ?(width, height), "resize");

        let mut axis = Carve::Width;
        loop {
            let (cw, ch) = self.dimensions();
            let pending = |a: Carve| match a {
                Carve::Width => cw != width,
                Carve::Height => ch != height,
            };
            if !pending(Carve::Width) && !pending(Carve::Height) {
                break;
            }
            if !pending(axis) {
                axis = axis.turn();
            }
            let grow = match axis {
                Carve::Width => cw < width,
                Carve::Height => ch < height,
            };
            if grow {
                self.enlarge(axis)?;
            } else {
                self.shrink(axis)?;
            }
            axis = axis.turn();
        }

        self.orient(Orientation::Upright);
        debug!(iterations = self.iterations, "resize finished");
        Ok(())
    }
}
