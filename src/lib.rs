#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot and Buddhabrot renderer
//!
//! The Mandelbrot set is the set of points on the complex plane whose
//! orbit under z² + c, starting at zero, stays bounded.  We lay a grid
//! over the plane and classify every cell with an escape-time test.
//!
//! The Buddhabrot takes the cells that are *not* in the set and follows
//! their orbits again.  Each iteration creates a new complex number
//! that itself may be used as a coordinate on the complex plane.  By
//! mapping that coordinate to the nearest integral pixel and
//! incrementing that pixel by one, we plot the orbits of every point
//! outside the set; the resulting density image is the Buddhabrot.
//!
//! The orbit pass is the expensive one.  It is split across one worker
//! per core, each owning a contiguous slice of the plane, all of them
//! incrementing the same atomic histogram, while a monitor thread
//! reports how far along they are.

pub mod accumulate;
pub mod config;
pub mod context;
pub mod errors;
pub mod grid;
pub mod histogram;
pub mod mandelbrot;
pub mod monitor;
pub mod planes;
pub mod render;
pub mod schedule;

pub use crate::accumulate::Accumulator;
pub use crate::config::Config;
pub use crate::context::{run, Context, Report};
pub use crate::errors::BrotError;
pub use crate::grid::Grid;
pub use crate::histogram::{Histogram, Layers};
pub use crate::mandelbrot::classify;
pub use crate::planes::{Pixel, PlaneMapper};
pub use crate::schedule::{schedule, WorkSlice};
