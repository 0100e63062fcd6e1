// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The knobs of a render.  Once validated, a Config should not change.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::BrotError;
use crate::histogram::MAX_LAYERS;

/// Parameters of one render job.
#[derive(Clone, Debug)]
pub struct Config {
    /// Cells per unit of the complex plane; the canvas is 3·size by 2·size.
    pub size: usize,
    /// Orbit steps traced per point, and the base classification depth.
    pub depth: usize,
    /// The Mandelbrot pass iterates `depth × detail` steps.  It is much
    /// cheaper than the orbit pass, so it can afford to go deeper.
    pub detail: usize,
    /// Number of accumulation workers.
    pub threads: usize,
    /// Number of Buddhabrot layers; see `histogram::Layers`.
    pub layers: usize,
    /// Directory the images are written to.
    pub output: PathBuf,
    /// Also write the raw hit counts of every layer.
    pub data: bool,
    /// How often the progress monitor reports.
    pub interval: Duration,
}

impl Config {
    /// A configuration with one worker per core, a single layer, and a
    /// report every second.
    pub fn new<P: Into<PathBuf>>(size: usize, depth: usize, output: P) -> Config {
        Config {
            size,
            depth,
            detail: 1,
            threads: num_cpus::get(),
            layers: 1,
            output: output.into(),
            data: false,
            interval: Duration::from_secs(1),
        }
    }

    /// Columns of the canvas.
    pub fn width(&self) -> usize {
        self.size * 3
    }

    /// Rows of the canvas.
    pub fn height(&self) -> usize {
        self.size * 2
    }

    /// Iteration limit of the Mandelbrot pass.
    pub fn mandelbrot_depth(&self) -> usize {
        self.depth * self.detail
    }

    /// Reject anything that cannot be rendered, before any plane-sized
    /// buffer exists.
    pub fn validate(&self) -> Result<(), BrotError> {
        let fail = |msg: String| Err(BrotError::Config(msg));
        if self.size == 0 {
            return fail("size must be at least 1".to_string());
        }
        if self.depth == 0 {
            return fail("depth must be at least 1".to_string());
        }
        if self.detail == 0 {
            return fail("detail must be at least 1".to_string());
        }
        if self.threads == 0 {
            return fail("thread count must be at least 1".to_string());
        }
        if self.layers == 0 || self.layers > MAX_LAYERS {
            return fail(format!("layer count must be between 1 and {}", MAX_LAYERS));
        }
        if self.depth.checked_mul(self.detail).is_none() {
            return fail(format!(
                "depth {} with detail {} is too deep",
                self.depth, self.detail
            ));
        }
        let width = match self.size.checked_mul(3) {
            Some(w) if w <= u32::max_value() as usize => w,
            _ => return fail(format!("size {} is too large for an image", self.size)),
        };
        if width.checked_mul(self.height()).is_none() {
            return fail(format!("size {} is too large for memory", self.size));
        }
        Ok(())
    }
}
