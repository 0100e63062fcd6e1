// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turning grids into grayscale images, and writing them out.
//!
//! Both images use the same orientation: x runs along the real axis
//! (grid columns), y along the imaginary axis (grid rows), so pixel
//! (x, y) of either image is cell (x, y) of the plane and the two can
//! be laid over each other.

use image::GrayImage;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::errors::{allocate, BrotError};
use crate::grid::Grid;
use crate::histogram::Histogram;

const BLACK: u8 = 0;
const WHITE: u8 = 255;

/// Map a hit count to a gray level.  The square root compresses the
/// range so the few very bright cells do not wash out everything else.
pub fn intensity(count: u32, amplitude: u32) -> u8 {
    if amplitude == 0 {
        return BLACK;
    }
    let level = (255.0 * (f64::from(count) / f64::from(amplitude)).sqrt()).round();
    num::clamp(level, 0.0, 255.0) as u8
}

fn gray_image(width: usize, height: usize, pixels: Vec<u8>) -> Result<GrayImage, BrotError> {
    let (width, height) = (width as u32, height as u32);
    GrayImage::from_raw(width, height, pixels).ok_or(BrotError::Image { width, height })
}

/// Members of the set are black, everything else white.
pub fn mandelbrot_image(membership: &Grid<bool>) -> Result<GrayImage, BrotError> {
    let mut pixels = allocate(membership.len(), "mandelbrot image")?;
    pixels.extend(
        membership
            .cells()
            .iter()
            .map(|member| if *member { BLACK } else { WHITE }),
    );
    gray_image(membership.width(), membership.height(), pixels)
}

/// The histogram, normalized against `amplitude`.
pub fn buddhabrot_image(histogram: &Histogram, amplitude: u32) -> Result<GrayImage, BrotError> {
    let mut pixels = allocate(histogram.len(), "buddhabrot image")?;
    pixels.extend(
        histogram
            .counts()
            .into_iter()
            .map(|count| intensity(count, amplitude)),
    );
    gray_image(histogram.width(), histogram.height(), pixels)
}

/// Save an image; the format follows the file extension.
pub fn write_image(path: &Path, image: &GrayImage) -> Result<(), BrotError> {
    image.save(path).map_err(|e| BrotError::io(path, e))
}

/// Save the raw counts of a histogram.
pub fn write_data(path: &Path, histogram: &Histogram) -> Result<(), BrotError> {
    let file = File::create(path).map_err(|e| BrotError::io(path, e))?;
    histogram
        .write_data(&mut BufWriter::new(file))
        .map_err(|e| BrotError::io(path, e))
}
