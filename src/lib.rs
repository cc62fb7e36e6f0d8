// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Content-aware image resizing.
//!
//! An image is narrowed by repeatedly removing the connected
//! top-to-bottom path of pixels that matters least, and widened by
//! duplicating such paths.  Heights are handled by rotating the image
//! a quarter turn.  `SeamCarver` drives the whole thing; the stages it
//! strings together are public for callers who want them one at a
//! time.

// #![deny(missing_docs)]

mod ternary;

pub mod config;
pub mod energy;
pub mod error;
pub mod history;
pub mod mask;
pub mod mutator;
pub mod observer;
pub mod orientation;
pub mod seamcarver;
pub mod seamfinder;
pub mod stackblur;
pub mod target;
pub mod twodmap;

pub use config::Config;
pub use energy::{energy_to_image, estimate, EnergyGrid};
pub use error::{CarveError, Result};
pub use history::SeamHistory;
pub use mask::{dither, is_masked, Compositor, FaceRect, MaskBuffer};
pub use mutator::{insert_seam, paint_seam, remove_seam};
pub use observer::{mailbox, Frame, Mailbox, Observer, Snapshot};
pub use orientation::{rotate270, rotate90, Carve, Orientation};
pub use seamcarver::{CancelHandle, SeamCarver};
pub use seamfinder::{find_seam, Seam};
pub use stackblur::{smooth, stack_blur};
pub use target::TargetSize;
pub use twodmap::TwoDimensionalMap;
