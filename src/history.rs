// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seam history
//!
//! When an image is enlarged one seam at a time, the cheapest seam of
//! the grown image is very often the seam that was just duplicated.
//! The history remembers every synthesized pixel so that the
//! compositor can make those pixels expensive on later passes.
//!
//! Points are kept in upright image coordinates and are moved along
//! whenever a later seam, on either axis, is inserted in front of
//! them or removed from in front of them.

use crate::orientation::{to_rotated, to_upright, Carve, Orientation};
use crate::seamfinder::Seam;
use image::Rgba;
use std::collections::HashMap;

/// One synthesized pixel: where it sits now, and the colour it was
/// given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePoint {
    pub x: u32,
    pub y: u32,
    pub color: Rgba<u8>,
}

/// The pixels written by one insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSeam {
    pub axis: Carve,
    pub points: Vec<ActivePoint>,
}

/// Every seam inserted during one resize session.
#[derive(Debug, Clone, Default)]
pub struct SeamHistory {
    seams: Vec<RecordedSeam>,
}

// A seam, mapped back onto the upright image, as "line -> position
// along the line".  For width seams the lines are rows and positions
// are columns; for height seams it's the other way round.
fn cuts(axis: Carve, seam: &Seam, upright_width: u32) -> HashMap<u32, u32> {
    match axis {
        Carve::Width => seam.points().map(|(x, y)| (y, x)).collect(),
        Carve::Height => seam
            .points()
            .filter_map(|p| to_upright(p, upright_width))
            .collect(),
    }
}

fn split(axis: Carve, p: &ActivePoint) -> (u32, u32) {
    match axis {
        Carve::Width => (p.y, p.x),
        Carve::Height => (p.x, p.y),
    }
}

fn join(axis: Carve, p: &mut ActivePoint, pos: u32) {
    match axis {
        Carve::Width => p.x = pos,
        Carve::Height => p.y = pos,
    }
}

impl SeamHistory {
    pub fn new() -> Self {
        SeamHistory::default()
    }

    pub fn len(&self) -> usize {
        self.seams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seams.is_empty()
    }

    pub fn seams(&self) -> &[RecordedSeam] {
        &self.seams
    }

    pub fn clear(&mut self) {
        self.seams.clear();
    }

    /// Record a seam just inserted on `axis`.  `seam` is in the
    /// working frame for that axis, `colors` are the synthesized
    /// pixels top to bottom, and `upright_width` is the width of the
    /// upright image before the insertion.
    pub fn record_insertion(&mut self, axis: Carve, seam: &Seam, colors: &[Rgba<u8>], upright_width: u32) {
        let cuts = cuts(axis, seam, upright_width);
        for point in self.seams.iter_mut().flat_map(|s| s.points.iter_mut()) {
            let (line, pos) = split(axis, point);
            if let Some(cut) = cuts.get(&line) {
                if pos >= *cut {
                    join(axis, point, pos + 1);
                }
            }
        }

        let points = seam
            .points()
            .zip(colors.iter())
            .filter_map(|(p, color)| {
                let (x, y) = match axis {
                    Carve::Width => p,
                    Carve::Height => to_upright(p, upright_width)?,
                };
                Some(ActivePoint { x, y, color: *color })
            })
            .collect();
        self.seams.push(RecordedSeam { axis, points });
    }

    /// Account for a seam just removed on `axis`: points on it are
    /// forgotten, points past it move back by one.
    pub fn record_removal(&mut self, axis: Carve, seam: &Seam, upright_width: u32) {
        if self.seams.is_empty() {
            return;
        }
        let cuts = cuts(axis, seam, upright_width);
        for recorded in self.seams.iter_mut() {
            recorded.points.retain(|p| {
                let (line, pos) = split(axis, p);
                cuts.get(&line) != Some(&pos)
            });
            for point in recorded.points.iter_mut() {
                let (line, pos) = split(axis, point);
                if let Some(cut) = cuts.get(&line) {
                    if pos > *cut {
                        join(axis, point, pos - 1);
                    }
                }
            }
        }
        self.seams.retain(|s| !s.points.is_empty());
    }

    /// Every recorded point, in the coordinates of a working buffer
    /// in the given orientation.
    pub fn guarded_points(&self, orientation: Orientation, upright_width: u32) -> Vec<(u32, u32)> {
        let points = self.seams.iter().flat_map(|s| s.points.iter());
        match orientation {
            Orientation::Upright => points.map(|p| (p.x, p.y)).collect(),
            Orientation::Rotated => points
                .filter_map(|p| to_rotated((p.x, p.y), upright_width))
                .collect(),
        }
    }
}
