// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tunables for a carving session.

use serde::{Deserialize, Serialize};

/// Knobs shared by every stage of one resize session.  All fields
/// have defaults, so a TOML file only needs to name the ones it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gradient magnitudes at or below this value are treated as
    /// flat texture and zeroed.
    pub sobel_threshold: f64,

    /// Stack blur radius applied to the edge map; 0 disables it.
    pub blur_radius: u32,

    /// Detections scoring at or below this are ignored.
    pub face_threshold: f32,

    /// Paint carved and inserted seams instead of hiding them.
    pub debug: bool,

    /// RGBA colour used by `debug`.
    pub seam_color: [u8; 4],
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sobel_threshold: 10.0,
            blur_radius: 1,
            face_threshold: 5.0,
            debug: false,
            seam_color: [0xff, 0x00, 0x00, 0xff],
        }
    }
}

impl Config {
    pub fn with_sobel_threshold(mut self, threshold: f64) -> Self {
        self.sobel_threshold = threshold;
        self
    }

    pub fn with_blur_radius(mut self, radius: u32) -> Self {
        self.blur_radius = radius;
        self
    }

    pub fn with_face_threshold(mut self, threshold: f32) -> Self {
        self.face_threshold = threshold;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
