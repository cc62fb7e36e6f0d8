// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Watching a session work
//!
//! A session reports every iteration to an optional observer.  The
//! observer sees the working buffer as it is, which may be rotated;
//! `Snapshot` knows how to put it back the right way up.
//!
//! `Mailbox` is an observer for another thread: it holds at most one
//! frame, and a new frame replaces an unread one rather than making
//! the carving thread wait for a slow consumer.

use crate::orientation::{rotate270, to_upright, Carve, Orientation};
use crate::seamfinder::Seam;
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use image::RgbaImage;

/// One iteration, as seen from inside the session.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// The working buffer after the seam was applied.
    pub image: &'a RgbaImage,
    pub orientation: Orientation,
    /// The seam, in the coordinates of the buffer it was found in.
    pub seam: &'a Seam,
    pub axis: Carve,
    /// Counts from 1 within a session.
    pub iteration: usize,
    /// True if the seam was inserted, false if it was removed.
    pub enlarged: bool,
}

impl<'a> Snapshot<'a> {
    /// The working buffer, the right way up.
    pub fn upright_image(&self) -> RgbaImage {
        match self.orientation {
            Orientation::Upright => self.image.clone(),
            Orientation::Rotated => rotate270(self.image),
        }
    }

    /// The seam's pixels in upright coordinates.
    pub fn upright_points(&self) -> Vec<(u32, u32)> {
        match self.orientation {
            Orientation::Upright => self.seam.points().collect(),
            Orientation::Rotated => {
                let upright_width = self.image.height();
                self.seam
                    .points()
                    .filter_map(|p| to_upright(p, upright_width))
                    .collect()
            }
        }
    }
}

/// Receives every iteration of a session.
pub trait Observer {
    fn on_iteration(&mut self, snapshot: Snapshot<'_>);
}

impl<F> Observer for F
where
    F: FnMut(Snapshot<'_>),
{
    fn on_iteration(&mut self, snapshot: Snapshot<'_>) {
        self(snapshot)
    }
}

/// An owned, upright copy of one iteration, suitable for sending to
/// another thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub image: RgbaImage,
    pub seam: Vec<(u32, u32)>,
    pub axis: Carve,
    pub iteration: usize,
}

impl<'a> From<Snapshot<'a>> for Frame {
    fn from(snapshot: Snapshot<'a>) -> Self {
        Frame {
            image: snapshot.upright_image(),
            seam: snapshot.upright_points(),
            axis: snapshot.axis,
            iteration: snapshot.iteration,
        }
    }
}

/// The sending half of a single-slot frame hand-off.
#[derive(Debug, Clone)]
pub struct Mailbox {
    tx: Sender<Frame>,
    // Kept so a stale frame can be pulled back out of the slot.
    rx: Receiver<Frame>,
}

/// Create a mailbox and the receiver that reads from it.
pub fn mailbox() -> (Mailbox, Receiver<Frame>) {
    let (tx, rx) = bounded(1);
    (Mailbox { tx, rx: rx.clone() }, rx)
}

impl Mailbox {
    /// Leave a frame in the slot, replacing any frame nobody has
    /// picked up yet.  Never blocks.
    pub fn post(&self, frame: Frame) {
        match self.tx.try_send(frame) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(frame)) => {
                let _ = self.rx.try_recv();
                let _ = self.tx.try_send(frame);
            }
        }
    }
}

impl Observer for Mailbox {
    fn on_iteration(&mut self, snapshot: Snapshot<'_>) {
        self.post(Frame::from(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::rotate90;
    use image::Rgba;

    fn frame(iteration: usize) -> Frame {
        Frame {
            image: RgbaImage::new(1, 1),
            seam: vec![(0, 0)],
            axis: Carve::Width,
            iteration,
        }
    }

    #[test]
    fn mailbox_keeps_only_the_latest_frame() {
        let (mailbox, rx) = mailbox();
        mailbox.post(frame(1));
        mailbox.post(frame(2));
        mailbox.post(frame(3));
        assert_eq!(rx.try_recv().map(|f| f.iteration), Ok(3));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn rotated_snapshots_come_out_upright() {
        let upright = RgbaImage::from_fn(4, 3, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let rotated = rotate90(&upright);
        // rotated is 3 wide, 4 tall; column 2 is upright row 2
        let seam = Seam::from_columns(vec![2, 2, 2, 2], 3).unwrap();
        let snapshot = Snapshot {
            image: &rotated,
            orientation: Orientation::Rotated,
            seam: &seam,
            axis: Carve::Height,
            iteration: 1,
            enlarged: false,
        };
        let frame = Frame::from(snapshot);
        assert_eq!(frame.image, upright);
        assert_eq!(frame.seam, vec![(3, 2), (2, 2), (1, 2), (0, 2)]);
    }

    #[test]
    fn closures_are_observers() {
        let image = RgbaImage::new(2, 2);
        let seam = Seam::from_columns(vec![0, 1], 2).unwrap();
        let mut seen = Vec::new();
        {
            let mut observer = |s: Snapshot<'_>| seen.push(s.iteration);
            let snapshot = Snapshot {
                image: &image,
                orientation: Orientation::Upright,
                seam: &seam,
                axis: Carve::Width,
                iteration: 7,
                enlarged: true,
            };
            observer.on_iteration(snapshot);
        }
        assert_eq!(seen, vec![7]);
    }
}
