// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot membership.  A point is "in" if it lies in one of the
//! two big bulbs, or if its orbit does not escape within the given
//! number of iterations.  The second test is only an approximation of
//! true membership: a deeper test may find that the point escapes
//! after all.  We keep that approximation; the Buddhabrot pass only
//! traces points this classifier rejects.

use log::debug;
use num::Complex;

use crate::errors::BrotError;
use crate::grid::Grid;

const D4: f64 = 1.0 / 4.0;
const D16: f64 = D4 / 4.0;

/// The squared escape radius.
pub const ESCAPE: f64 = 4.0;

/// True if the point is inside the main cardioid or the period-2
/// bulb, which between them cover most of the set and would otherwise
/// cost a full-depth iteration each.
#[inline]
pub fn in_main_bulbs(point: Complex<f64>) -> bool {
    let (x, y) = (point.re, point.im);
    let p = ((x - D4) * (x - D4) + y * y).sqrt();
    x < p - 2.0 * p * p + D4 || (x + 1.0) * (x + 1.0) + y * y < D16
}

/// This is our classic iterator function, which either returns the
/// (zero-based) iteration at which the orbit of 0 under z² + c first
/// left the escape radius, or nothing at all.
pub fn escape_time(point: Complex<f64>, depth: usize) -> Option<usize> {
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    for i in 0..depth {
        z = z * z + point;
        if z.norm_sqr() > ESCAPE {
            return Some(i);
        }
    }
    None
}

/// Is `point` in the Mandelbrot set, as far as `depth` iterations can tell?
#[inline]
pub fn classify(point: Complex<f64>, depth: usize) -> bool {
    in_main_bulbs(point) || escape_time(point, depth).is_none()
}

/// Classify every coordinate of the plane.  The rows are split into
/// one horizontal band per thread.
pub fn membership(
    coordinates: &Grid<Complex<f64>>,
    depth: usize,
    threads: usize,
) -> Result<Grid<bool>, BrotError> {
    let mut membership = Grid::filled(
        coordinates.width(),
        coordinates.height(),
        "membership grid",
        false,
    )?;
    if membership.is_empty() {
        return Ok(membership);
    }

    let threads = threads.max(1);
    let band = ((coordinates.height() + threads - 1) / threads) * coordinates.width();
    crossbeam::scope(|spawner| {
        let bands = membership
            .cells_mut()
            .chunks_mut(band)
            .zip(coordinates.cells().chunks(band));
        for (index, (cells, points)) in bands.enumerate() {
            spawner.spawn(move |_| {
                debug!("classifying band {} ({} cells)", index, cells.len());
                for (cell, point) in cells.iter_mut().zip(points) {
                    *cell = classify(*point, depth);
                }
            });
        }
    })
    .map_err(|_| BrotError::Worker)?;

    Ok(membership)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planes::{Pixel, PlaneMapper};

    #[test]
    fn origin_is_in_the_set_at_every_depth() {
        for depth in 0..64 {
            assert!(classify(Complex::new(0.0, 0.0), depth));
        }
    }

    #[test]
    fn bulbs_short_circuit_regardless_of_depth() {
        let bulb_points = [
            Complex::new(0.0, 0.0),
            Complex::new(-0.5, 0.3),
            Complex::new(0.2, -0.1),
            Complex::new(-1.0, 0.0),
            Complex::new(-1.1, 0.1),
            Complex::new(-0.9, -0.2),
        ];
        for point in &bulb_points {
            assert!(in_main_bulbs(*point), "{} should be in a bulb", point);
            assert!(classify(*point, 0));
            assert!(classify(*point, 1));
        }
    }

    #[test]
    fn escape_is_strictly_greater_than_the_radius() {
        // |2|² is exactly 4, which has not escaped yet; 6 has.
        let two = Complex::new(2.0, 0.0);
        assert!(!in_main_bulbs(two));
        assert_eq!(escape_time(two, 1), None);
        assert!(classify(two, 1));
        assert_eq!(escape_time(two, 2), Some(1));
        for depth in 2..32 {
            assert!(!classify(two, depth));
        }
    }

    #[test]
    fn escape_is_monotonic_in_depth() {
        let samples = [
            Complex::new(0.3, 0.5),
            Complex::new(-0.75, 0.1),
            Complex::new(-1.8, 0.01),
            Complex::new(0.26, 0.0),
            Complex::new(-0.1, 0.9),
        ];
        for point in &samples {
            let mut first = None;
            for depth in 0..512 {
                match escape_time(*point, depth) {
                    Some(step) => {
                        let seen = *first.get_or_insert(step);
                        assert_eq!(step, seen);
                        assert!(!classify(*point, depth));
                    }
                    None => assert!(first.is_none(), "{} stopped escaping", point),
                }
            }
        }
    }

    #[test]
    fn far_points_are_not_in_the_set() {
        assert!(!classify(Complex::new(-2.0, -1.0), 16));
        assert!(!classify(Complex::new(0.9, 0.9), 16));
    }

    #[test]
    fn membership_matches_classify_for_any_thread_count() {
        let pm = PlaneMapper::canvas(8).unwrap();
        let coordinates = pm.coordinates().unwrap();
        let single = membership(&coordinates, 32, 1).unwrap();
        for threads in &[2, 3, 7, 64] {
            assert_eq!(membership(&coordinates, 32, *threads).unwrap(), single);
        }
        for (offset, cell) in single.cells().iter().enumerate() {
            assert_eq!(*cell, classify(coordinates[offset], 32));
        }
        assert_eq!(single.get(Pixel(16, 8)), Some(&true));
        assert_eq!(single.get(Pixel(0, 0)), Some(&false));
    }
}
