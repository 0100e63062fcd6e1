// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A flat, row-major buffer with a stride, standing in for the
//! two-dimensional arrays the renderer needs.  Offsets into a Grid
//! and offsets produced by `PlaneMapper::point_to_offset` agree.

use itertools::iproduct;
use std::ops::Index;

use crate::errors::{allocate, BrotError};
use crate::planes::Pixel;

/// A width × height collection of cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

/// The number of cells in a width × height plane, if it is addressable.
pub(crate) fn cell_count(width: usize, height: usize) -> Result<usize, BrotError> {
    width.checked_mul(height).ok_or_else(|| {
        BrotError::Config(format!("a {}x{} plane is too large", width, height))
    })
}

impl<T> Grid<T> {
    /// Builds a grid by visiting every pixel in scan order.  `what`
    /// names the buffer if it cannot be allocated.
    pub fn from_fn<F>(
        width: usize,
        height: usize,
        what: &'static str,
        mut f: F,
    ) -> Result<Grid<T>, BrotError>
    where
        F: FnMut(Pixel) -> T,
    {
        let mut cells = allocate(cell_count(width, height)?, what)?;
        cells.extend(iproduct!(0..height, 0..width).map(|(row, column)| f(Pixel(column, row))));
        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    /// Wraps an existing row-major buffer.
    pub fn from_cells(width: usize, height: usize, cells: Vec<T>) -> Result<Grid<T>, BrotError> {
        if cell_count(width, height)? != cells.len() {
            return Err(BrotError::Config(format!(
                "{} cells cannot fill a {}x{} grid",
                cells.len(),
                width,
                height
            )));
        }
        Ok(Grid {
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

    /// True if the grid has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The flat offset of a pixel, if it lies on the grid.
    pub fn offset(&self, pixel: Pixel) -> Option<usize> {
        if pixel.0 < self.width && pixel.1 < self.height {
            Some(pixel.1 * self.width + pixel.0)
        } else {
            None
        }
    }

    /// The pixel at a flat offset.
    pub fn pixel(&self, offset: usize) -> Pixel {
        Pixel(offset % self.width, offset / self.width)
    }

    /// The cell under a pixel.
    pub fn get(&self, pixel: Pixel) -> Option<&T> {
        self.offset(pixel).map(|offset| &self.cells[offset])
    }

    /// All cells, in scan order.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// All cells, mutably, in scan order.
    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }
}

impl<T: Clone> Grid<T> {
    /// A grid with every cell set to `value`.
    pub fn filled(
        width: usize,
        height: usize,
        what: &'static str,
        value: T,
    ) -> Result<Grid<T>, BrotError> {
        let len = cell_count(width, height)?;
        let mut cells = allocate(len, what)?;
        cells.resize(len, value);
        Ok(Grid {
            width,
            height,
            cells,
        })
    }
}

impl<T> Index<usize> for Grid<T> {
    type Output = T;

    fn index(&self, offset: usize) -> &T {
        &self.cells[offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fn_visits_in_row_major_order() {
        let grid = Grid::from_fn(3, 2, "test grid", |p| (p.0, p.1)).unwrap();
        assert_eq!(
            grid.cells(),
            &[(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn offsets_and_pixels_agree() {
        let grid = Grid::filled(5, 4, "test grid", 0u8).unwrap();
        for offset in 0..grid.len() {
            assert_eq!(grid.offset(grid.pixel(offset)), Some(offset));
        }
        assert_eq!(grid.offset(Pixel(5, 0)), None);
        assert_eq!(grid.offset(Pixel(0, 4)), None);
    }

    #[test]
    fn get_and_index_read_the_same_cell() {
        let grid = Grid::from_fn(4, 3, "test grid", |p| p.1 * 10 + p.0).unwrap();
        assert_eq!(grid.get(Pixel(2, 1)), Some(&12));
        assert_eq!(grid[grid.offset(Pixel(2, 1)).unwrap()], 12);
        assert_eq!(grid.get(Pixel(4, 1)), None);
    }

    #[test]
    fn from_cells_checks_the_shape() {
        assert!(Grid::from_cells(2, 2, vec![true; 4]).is_ok());
        assert!(Grid::from_cells(2, 2, vec![true; 5]).is_err());
    }

    #[test]
    fn oversized_planes_are_a_configuration_error() {
        match Grid::filled(usize::max_value(), 2, "test grid", 0u8) {
            Err(BrotError::Config(_)) => (),
            other => panic!("expected a configuration error, got {:?}", other.map(|g| g.len())),
        }
    }
}
