// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane with an arbitrary pair of
//! corners defining the leftlower and rightupper corners of the real
//! plane.
use num::Complex;

use crate::errors::BrotError;
use crate::grid::Grid;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the lower-left corner and upper-right corner of the
/// Complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.
#[derive(Copy, Clone, Debug)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

/// The column and row of a cell on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Contains the definitions of two planes: an integral cartesian plane,
/// and a complex cartesian plane.  Maps points from one to the other.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The right-upper hand corner of the integral cartesian plane.
    /// The left-lower is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    /// The two coordinates defining the complex cartesian plane,
    /// left-lower and right-upper
    pub complex_plane: ComplexPlane,
    // Cells per unit along the real and imaginary axes.
    grid_factors: (f64, f64),
}

impl PlaneMapper {
    /// Takes the size of the integral plane, and two points describing
    /// the complex plane.
    pub fn new(
        width: usize,
        height: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<PlaneMapper, BrotError> {
        if width == 0 || height == 0 {
            return Err(BrotError::Config(format!(
                "the integral plane {}x{} is empty",
                width, height
            )));
        }

        if !(rightupper.re > leftlower.re) {
            return Err(BrotError::Config(
                "the left lower corner is not to the left of the right upper corner".to_string(),
            ));
        }

        if !(rightupper.im > leftlower.im) {
            return Err(BrotError::Config(
                "the left lower corner is not lower than the right upper corner".to_string(),
            ));
        }

        let grid_factors = (
            (width as f64) / (rightupper.re - leftlower.re),
            (height as f64) / (rightupper.im - leftlower.im),
        );

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            complex_plane: ComplexPlane(leftlower, rightupper),
            grid_factors,
        })
    }

    /// The conventional canvas: `size` cells per unit, spanning the
    /// real axis from -2 to 1 and the imaginary axis from -1 to 1, so
    /// the plane is 3·size wide and 2·size high.
    pub fn canvas(size: usize) -> Result<PlaneMapper, BrotError> {
        let sides = size.checked_mul(3).map(|width| (width, size * 2));
        let (width, height) = sides.ok_or_else(|| {
            BrotError::Config(format!("a canvas of size {} is too large", size))
        })?;
        PlaneMapper::new(
            width,
            height,
            Complex::new(-2.0, -1.0),
            Complex::new(1.0, 1.0),
        )
    }

    /// Width of the integral plane.
    pub fn width(&self) -> usize {
        self.integral_plane.0
    }

    /// Height of the integral plane.
    pub fn height(&self) -> usize {
        self.integral_plane.1
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Given a complex number corresponding to a location on the
    /// complex cartesian plane, map that as closely as possible to a
    /// point on the integral cartesian plane.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Pixel {
        let (left, top) = self.scale(point);
        Pixel(left as usize, top as usize)
    }

    /// Given a pixel on the integral cartesian plane, map that as
    /// closely as possible to a point on the complex cartesian plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            ((pixel.0 as f64) / self.grid_factors.0) + self.complex_plane.0.re,
            ((pixel.1 as f64) / self.grid_factors.1) + self.complex_plane.0.im,
        )
    }

    /// Since the Buddhabrot tracks the progress of a complex number as
    /// it orbits, we have to map those complex numbers back to the
    /// pixel plane, and then increment those points on the pixel plane
    /// as the orbit passes through them.  This function takes a point,
    /// maps it to pixel coordinates, then returns the linear offset
    /// from the root of the image buffer in memory, or None if the
    /// point is off the canvas.
    ///
    /// Cell indices truncate toward zero, so a point less than one cell
    /// left of or above the canvas still lands in column or row 0.
    pub fn point_to_offset(&self, point: &Complex<f64>) -> Option<usize> {
        let (left, top) = self.scale(point);
        // Comparisons with NaN are false, so diverged orbits fall out here.
        if !(left > -1.0 && top > -1.0) || !left.is_finite() || !top.is_finite() {
            return None;
        }
        let (col, row) = (left.trunc() as usize, top.trunc() as usize);
        if col < self.integral_plane.0 && row < self.integral_plane.1 {
            Some(row * self.integral_plane.0 + col)
        } else {
            None
        }
    }

    /// The coordinate of every cell of the integral plane, computed once.
    pub fn coordinates(&self) -> Result<Grid<Complex<f64>>, BrotError> {
        Grid::from_fn(self.width(), self.height(), "coordinate grid", |pixel| {
            self.pixel_to_point(&pixel)
        })
    }

    fn scale(&self, point: &Complex<f64>) -> (f64, f64) {
        (
            (point.re - self.complex_plane.0.re) * self.grid_factors.0,
            (point.im - self.complex_plane.0.im) * self.grid_factors.1,
        )
    }
}
