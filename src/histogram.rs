// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The hit counters.  Every worker may land on every cell, so each
//! cell is its own atomic counter; an increment never waits on anything
//! but the cache line it touches.  Increments commute, so the final
//! counts do not depend on how the workers interleave.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::errors::{allocate, BrotError};
use crate::grid::cell_count;

/// The most layers a render can carry; layer `dim` stops counting at
/// step `depth >> dim`, and past this the cutoffs are no longer useful.
pub const MAX_LAYERS: usize = 8;

/// A width × height plane of hit counts.
///
/// Counts are 32 bits wide, as the raw dump is, and wrap past
/// `u32::MAX`.  A cell can be hit at most once per orbit step, so a
/// render stays below the ceiling while `depth × orbits` does; deep
/// renders of large planes can exceed it on the brightest cells.
#[derive(Debug)]
pub struct Histogram {
    width: usize,
    height: usize,
    cells: Vec<AtomicU32>,
}

impl Histogram {
    /// A zeroed histogram.
    pub fn new(width: usize, height: usize) -> Result<Histogram, BrotError> {
        let len = cell_count(width, height)?;
        let mut cells = allocate(len, "histogram")?;
        cells.extend((0..len).map(|_| AtomicU32::new(0)));
        Ok(Histogram {
            width,
            height,
            cells,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if the histogram has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Count one visit to the cell at `offset`.  Wraps at `u32::MAX`.
    #[inline]
    pub fn increment(&self, offset: usize) {
        self.cells[offset].fetch_add(1, Ordering::Relaxed);
    }

    /// The count at `offset`.
    pub fn get(&self, offset: usize) -> u32 {
        self.cells[offset].load(Ordering::Relaxed)
    }

    /// A copy of every count, in row-major order.
    pub fn counts(&self) -> Vec<u32> {
        self.cells
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .collect()
    }

    /// The largest count.  Only meaningful once every worker has been
    /// joined.
    pub fn amplitude(&self) -> u32 {
        self.cells
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .max()
            .unwrap_or(0)
    }

    /// Dump the counts as row-major little-endian u32s, with no header.
    pub fn write_data<W: Write>(&self, output: &mut W) -> io::Result<()> {
        for cell in &self.cells {
            output.write_all(&cell.load(Ordering::Relaxed).to_le_bytes())?;
        }
        output.flush()
    }
}

/// The histograms of a multi-layer render.  Layer 0 counts every step
/// of every orbit; layer `dim` counts only the steps taken before
/// `depth >> dim`, so higher layers show the early part of the orbits.
#[derive(Debug)]
pub struct Layers {
    depth: usize,
    layers: Vec<Histogram>,
}

impl Layers {
    /// `count` zeroed histograms, for orbits traced to `depth` steps.
    pub fn new(
        width: usize,
        height: usize,
        depth: usize,
        count: usize,
    ) -> Result<Layers, BrotError> {
        if count == 0 || count > MAX_LAYERS {
            return Err(BrotError::Config(format!(
                "layer count must be between 1 and {}",
                MAX_LAYERS
            )));
        }
        let layers = (0..count)
            .map(|_| Histogram::new(width, height))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Layers { depth, layers })
    }

    /// Record that step `step` (zero-based) of an orbit landed on `offset`.
    #[inline]
    pub fn record(&self, offset: usize, step: usize) {
        for (dim, layer) in self.layers.iter().enumerate() {
            if dim == 0 || step < self.depth >> dim {
                layer.increment(offset);
            } else {
                break;
            }
        }
    }

    /// The histogram of one layer.
    pub fn layer(&self, dim: usize) -> Option<&Histogram> {
        self.layers.get(dim)
    }

    /// All layers, starting with the full-depth one.
    pub fn iter(&self) -> std::slice::Iter<Histogram> {
        self.layers.iter()
    }

    /// How many layers there are.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Never true for a constructed value; here for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The amplitude of each layer.
    pub fn amplitudes(&self) -> Vec<u32> {
        self.layers.iter().map(Histogram::amplitude).collect()
    }
}
