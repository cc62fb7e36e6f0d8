// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Find the cheapest seam
//!
//! The classic dynamic program: every cell of the cost table holds
//! its own energy plus the cheapest of the (up to) three cells above
//! it that could lead to it.  The cheapest cell of the bottom row is
//! the end of the cheapest seam, and walking back up through the
//! cheapest parents recovers the rest of it.

use crate::cq;
use crate::energy::EnergyGrid;
use crate::error::{ensure_nonempty, CarveError, Result};
use crate::twodmap::TwoDimensionalMap;

/// The cumulative minimum energy of reaching each cell from row 0.
pub type CostTable = TwoDimensionalMap<f64>;

/// A connected top-to-bottom path, one column per row, starting at
/// row 0.  Consecutive columns differ by at most one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seam(Vec<u32>);

impl Seam {
    /// Build a seam from its columns, checking that it is connected
    /// and stays inside an image of the given width.
    pub fn from_columns(columns: Vec<u32>, width: u32) -> Result<Seam> {
        let seam = Seam(columns);
        seam.check_path(width)?;
        Ok(seam)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The column of the seam in every row, top to bottom.
    pub fn columns(&self) -> &[u32] {
        &self.0
    }

    /// The seam as `(x, y)` coordinates, top to bottom.
    pub fn points(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().enumerate().map(|(y, x)| (*x, y as u32))
    }

    fn check_path(&self, width: u32) -> Result<()> {
        if let Some((y, x)) = self.0.iter().enumerate().find(|(_, x)| **x >= width) {
            return Err(CarveError::MalformedSeam(format!(
                "column {} in row {} is outside a width of {}",
                x, y, width
            )));
        }
        if let Some(y) = self
            .0
            .windows(2)
            .position(|w| (i64::from(w[0]) - i64::from(w[1])).abs() > 1)
        {
            return Err(CarveError::MalformedSeam(format!(
                "rows {} and {} are not connected",
                y,
                y + 1
            )));
        }
        Ok(())
    }

    /// Check that this seam can be applied to a buffer of the given
    /// dimensions.
    pub fn check_against(&self, (width, height): (u32, u32)) -> Result<()> {
        if self.0.len() != height as usize {
            return Err(CarveError::MalformedSeam(format!(
                "seam has {} rows, buffer has {}",
                self.0.len(),
                height
            )));
        }
        self.check_path(width)
    }

    /// The total energy of the cells the seam passes through.
    pub fn cost(&self, energy: &EnergyGrid) -> f64 {
        self.points().map(|p| energy[p]).sum()
    }
}

fn ensure_finite(table: &CostTable) -> Result<()> {
    let width = table.width() as usize;
    match table.as_slice().iter().position(|e| !e.is_finite()) {
        None => Ok(()),
        Some(i) => Err(CarveError::InvalidEnergy {
            x: (i % width) as u32,
            y: (i / width) as u32,
            value: table.as_slice()[i],
        }),
    }
}

/// Energy grid -> Cost table
///
/// Row 0 is copied; every later cell adds the cheapest of its
/// in-bounds neighbours above.  Fails on any non-finite energy, or
/// on sums that overflow to infinity.
pub fn cumulative_energy(energy: &EnergyGrid) -> Result<CostTable> {
    let (width, height) = energy.dimensions();
    ensure_nonempty((width, height))?;
    ensure_finite(energy)?;

    let mut cost = energy.clone();
    let mw = width - 1;
    for y in 1..height {
        for x in 0..width {
            let lo = cq!(x == 0, 0, x - 1);
            let hi = cq!(x == mw, mw, x + 1);
            let parent = (lo..=hi)
                .map(|px| cost[(px, y - 1)])
                .fold(f64::INFINITY, f64::min);
            cost[(x, y)] += parent;
        }
    }
    ensure_finite(&cost)?;
    Ok(cost)
}

// Among the cells above `px`, pick the one the seam came from.  Ties
// go to the left, then to the right, and only then straight up; on
// the borders the seam only moves when the in-bounds diagonal is
// strictly cheaper.
fn parent_column(row: &[f64], px: usize) -> usize {
    let last = row.len() - 1;
    let middle = row[px];
    if last == 0 {
        px
    } else if px == 0 {
        cq!(row[1] < middle, 1, 0)
    } else if px == last {
        cq!(row[last - 1] < middle, last - 1, last)
    } else {
        let (left, right) = (row[px - 1], row[px + 1]);
        if left <= middle && left <= right {
            px - 1
        } else if right <= middle {
            px + 1
        } else {
            px
        }
    }
}

/// Cost table -> Seam
///
/// Starts at the first cheapest cell of the bottom row (zero is a
/// perfectly good minimum) and walks back up.
pub fn trace_seam(cost: &CostTable) -> Result<Seam> {
    ensure_nonempty(cost.dimensions())?;
    let height = cost.height();
    let bottom = cost.row(height - 1);
    let mut px = bottom
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(bx, be), (x, e)| {
            cq!(*e < be, (x, *e), (bx, be))
        })
        .0;

    let mut columns = vec![0u32; height as usize];
    columns[height as usize - 1] = px as u32;
    for y in (0..height - 1).rev() {
        px = parent_column(cost.row(y), px);
        columns[y as usize] = px as u32;
    }
    Ok(Seam(columns))
}

/// Given an energy grid, return the globally cheapest vertical seam
/// through it.
pub fn find_seam(energy: &EnergyGrid) -> Result<Seam> {
    trace_seam(&cumulative_energy(energy)?)
}
