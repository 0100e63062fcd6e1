// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Buddhabrot accumulation
//!
//! Every point outside the Mandelbrot set is iterated again, this time
//! starting the orbit at the point itself, and each step of the orbit
//! that lands on the canvas bumps the hit count of the cell it lands
//! on.  There is no escape test here: the orbit is followed for the
//! full depth whatever its magnitude, so what gets plotted is the
//! whole path, not just the part that stays near the set.

use log::debug;
use num::Complex;

use crate::grid::Grid;
use crate::histogram::Layers;
use crate::planes::PlaneMapper;
use crate::schedule::WorkSlice;

/// Everything a worker needs to trace orbits.  The plane, coordinates
/// and membership are read-only; the layers take concurrent increments.
pub struct Accumulator<'a> {
    /// Maps orbit points back onto the canvas.
    pub mapper: &'a PlaneMapper,
    /// The coordinate of every cell.
    pub coordinates: &'a Grid<Complex<f64>>,
    /// Which cells are in the Mandelbrot set.
    pub membership: &'a Grid<bool>,
    /// Where the hits go.
    pub layers: &'a Layers,
    /// How many steps of each orbit to trace.
    pub depth: usize,
}

// Marks a slice finished when the worker leaves `run`, even by
// unwinding, so the monitor never waits on a dead worker.
struct Finisher<'s>(&'s WorkSlice);

impl<'s> Drop for Finisher<'s> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

impl<'a> Accumulator<'a> {
    /// Follow the orbit of `start` for `depth` steps and count every
    /// step that lands on the canvas.
    pub fn trace(&self, start: Complex<f64>) {
        let mut z = start;
        for step in 0..self.depth {
            z = z * z + start;
            if let Some(offset) = self.mapper.point_to_offset(&z) {
                self.layers.record(offset, step);
            } else if !(z.re.is_finite() && z.im.is_finite()) {
                // An overflowed orbit never comes back to the canvas.
                break;
            }
        }
    }

    /// Trace every non-member point of the slice, reporting progress
    /// as we go.
    pub fn run(&self, slice: &WorkSlice) {
        let _finisher = Finisher(slice);
        debug!(
            "worker {} tracing offsets {}..{} ({} points)",
            slice.id, slice.range.start, slice.range.end, slice.target
        );
        for offset in slice.range.clone() {
            if self.membership[offset] {
                continue;
            }
            self.trace(self.coordinates[offset]);
            slice.record();
        }
        debug!("worker {} finished", slice.id);
    }

    /// Trace the non-member points at the given offsets, in whatever
    /// order they come, on the calling thread.
    pub fn run_offsets<I>(&self, offsets: I)
    where
        I: IntoIterator<Item = usize>,
    {
        for offset in offsets {
            if !self.membership[offset] {
                self.trace(self.coordinates[offset]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mandelbrot::membership;
    use crate::schedule::schedule;
    use rand::prelude::*;

    struct Fixture {
        mapper: PlaneMapper,
        coordinates: Grid<Complex<f64>>,
        membership: Grid<bool>,
    }

    fn fixture(size: usize, depth: usize) -> Fixture {
        let mapper = PlaneMapper::canvas(size).unwrap();
        let coordinates = mapper.coordinates().unwrap();
        let membership = membership(&coordinates, depth, 2).unwrap();
        Fixture {
            mapper,
            coordinates,
            membership,
        }
    }

    fn accumulator<'a>(fx: &'a Fixture, layers: &'a Layers, depth: usize) -> Accumulator<'a> {
        Accumulator {
            mapper: &fx.mapper,
            coordinates: &fx.coordinates,
            membership: &fx.membership,
            layers,
            depth,
        }
    }

    fn new_layers(fx: &Fixture, depth: usize, count: usize) -> Layers {
        Layers::new(fx.mapper.width(), fx.mapper.height(), depth, count).unwrap()
    }

    #[test]
    fn trace_counts_each_landing_step() {
        let fx = fixture(8, 16);
        let layers = new_layers(&fx, 4, 1);
        // 0 is a fixed point: every step lands on the origin cell.
        accumulator(&fx, &layers, 4).trace(Complex::new(0.0, 0.0));
        let histogram = layers.layer(0).unwrap();
        assert_eq!(histogram.get(8 * 24 + 16), 4);
        assert_eq!(histogram.counts().iter().sum::<u32>(), 4);
    }

    #[test]
    fn trace_drops_steps_off_the_canvas() {
        let fx = fixture(8, 16);
        let layers = new_layers(&fx, 64, 1);
        accumulator(&fx, &layers, 64).trace(Complex::new(0.9, 0.9));
        // (0.9, 0.9)² + c lands at (0.9, 2.52), off the canvas, and
        // then diverges.
        assert_eq!(layers.layer(0).unwrap().amplitude(), 0);
    }

    #[test]
    fn run_records_progress_and_finishes() {
        let fx = fixture(8, 16);
        let layers = new_layers(&fx, 16, 1);
        let slices = schedule(&fx.membership, 3);
        let acc = accumulator(&fx, &layers, 16);
        for slice in &slices {
            acc.run(slice);
            assert_eq!(slice.processed(), slice.target);
            assert!(slice.is_finished());
        }
    }

    #[test]
    fn accumulation_is_order_independent() {
        let fx = fixture(8, 16);

        let serial = new_layers(&fx, 16, 3);
        accumulator(&fx, &serial, 16).run_offsets(0..fx.coordinates.len());

        let mut offsets: Vec<usize> = (0..fx.coordinates.len()).collect();
        offsets.shuffle(&mut StdRng::seed_from_u64(7));
        let shuffled = new_layers(&fx, 16, 3);
        accumulator(&fx, &shuffled, 16).run_offsets(offsets);

        let threaded = new_layers(&fx, 16, 3);
        {
            let acc = accumulator(&fx, &threaded, 16);
            let slices = schedule(&fx.membership, 4);
            crossbeam::scope(|spawner| {
                for slice in &slices {
                    let acc = &acc;
                    spawner.spawn(move |_| acc.run(slice));
                }
            })
            .unwrap();
        }

        for dim in 0..3 {
            let expected = serial.layer(dim).unwrap().counts();
            assert_eq!(shuffled.layer(dim).unwrap().counts(), expected);
            assert_eq!(threaded.layer(dim).unwrap().counts(), expected);
        }
        assert!(serial.layer(0).unwrap().amplitude() > 0);
    }

    #[test]
    fn member_points_are_skipped() {
        let fx = fixture(8, 16);
        let layers = new_layers(&fx, 16, 1);
        let inside: Vec<usize> = (0..fx.membership.len())
            .filter(|offset| fx.membership[*offset])
            .collect();
        assert!(!inside.is_empty());
        accumulator(&fx, &layers, 16).run_offsets(inside);
        assert_eq!(layers.layer(0).unwrap().amplitude(), 0);
    }
}
