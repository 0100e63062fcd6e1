// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Splits the points outside the Mandelbrot set between the workers.
//! Every such point costs the same number of orbit steps, so giving
//! each worker the same number of points balances the work.  Slices
//! are contiguous runs of flat offsets, taken in scan order.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::grid::Grid;

/// One worker's share of the plane.  The worker is the only writer of
/// the progress fields; the monitor reads them without any ordering
/// guarantee and may see stale values.
#[derive(Debug)]
pub struct WorkSlice {
    /// Which worker owns this slice.
    pub id: usize,
    /// The flat offsets of the plane this slice covers.  Member points
    /// inside the range are not part of the target.
    pub range: Range<usize>,
    /// How many non-member points the range holds.
    pub target: usize,
    processed: AtomicUsize,
    finished: AtomicBool,
}

impl WorkSlice {
    /// A fresh, unstarted slice.
    pub fn new(id: usize, range: Range<usize>, target: usize) -> WorkSlice {
        WorkSlice {
            id,
            range,
            target,
            processed: AtomicUsize::new(0),
            finished: AtomicBool::new(false),
        }
    }

    /// How many points the worker has traced so far.
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    /// Note that one more point has been traced.
    pub fn record(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Note that the worker is done with this slice.
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Release);
    }

    /// True once the worker is done with this slice.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

/// The number of points outside the set, which is the number of orbits
/// the Buddhabrot pass has to trace.
pub fn anti_mandelbrot_size(membership: &Grid<bool>) -> usize {
    membership.cells().iter().filter(|member| !**member).count()
}

/// Partition the non-member points of `membership` into `workers`
/// slices.  Each worker but the last gets `total / workers` points;
/// the last takes whatever remains.  A worker count of zero is taken
/// to mean one.
pub fn schedule(membership: &Grid<bool>, workers: usize) -> Vec<WorkSlice> {
    let workers = workers.max(1);
    let cells = membership.cells();
    let total = anti_mandelbrot_size(membership);
    let share = total / workers;

    let mut cursor = 0;
    (0..workers)
        .map(|id| {
            let start = cursor;
            let target = if id + 1 == workers {
                cursor = cells.len();
                total - share * id
            } else {
                let mut tally = 0;
                while tally < share {
                    if !cells[cursor] {
                        tally += 1;
                    }
                    cursor += 1;
                }
                share
            };
            WorkSlice::new(id, start..cursor, target)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn grid(cells: Vec<bool>) -> Grid<bool> {
        let len = cells.len();
        Grid::from_cells(len, 1, cells).unwrap()
    }

    fn assert_partition(membership: &Grid<bool>, slices: &[WorkSlice]) {
        let total = anti_mandelbrot_size(membership);
        assert_eq!(slices.iter().map(|s| s.target).sum::<usize>(), total);
        assert_eq!(slices.first().unwrap().range.start, 0);
        assert_eq!(slices.last().unwrap().range.end, membership.len());
        for pair in slices.windows(2) {
            assert_eq!(pair[0].range.end, pair[1].range.start);
        }
        for slice in slices {
            let outside = membership.cells()[slice.range.clone()]
                .iter()
                .filter(|m| !**m)
                .count();
            assert_eq!(outside, slice.target, "slice {}", slice.id);
        }
    }

    #[test]
    fn single_worker_takes_everything() {
        let membership = grid(vec![false, true, false, false, true]);
        let slices = schedule(&membership, 1);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].range, 0..5);
        assert_eq!(slices[0].target, 3);
    }

    #[test]
    fn zero_workers_means_one() {
        let membership = grid(vec![false, false]);
        assert_eq!(schedule(&membership, 0).len(), 1);
    }

    #[test]
    fn last_worker_absorbs_the_remainder() {
        let membership = grid(vec![false; 10]);
        let slices = schedule(&membership, 3);
        let targets: Vec<usize> = slices.iter().map(|s| s.target).collect();
        assert_eq!(targets, vec![3, 3, 4]);
        assert_eq!(slices[0].range, 0..3);
        assert_eq!(slices[1].range, 3..6);
        assert_eq!(slices[2].range, 6..10);
    }

    #[test]
    fn more_workers_than_points() {
        let membership = grid(vec![true, false, true, false]);
        let slices = schedule(&membership, 5);
        assert_eq!(slices.len(), 5);
        assert_partition(&membership, &slices);
        assert_eq!(slices[4].target, 2);
    }

    #[test]
    fn everything_inside_the_set() {
        let membership = grid(vec![true; 7]);
        let slices = schedule(&membership, 4);
        assert_partition(&membership, &slices);
        assert!(slices.iter().all(|s| s.target == 0));
    }

    #[test]
    fn slices_partition_random_planes() {
        let mut rng = StdRng::seed_from_u64(0x6275_6464);
        for _ in 0..50 {
            let width = rng.gen_range(1, 40);
            let height = rng.gen_range(1, 40);
            let cells: Vec<bool> = (0..width * height).map(|_| rng.gen_bool(0.4)).collect();
            let membership = Grid::from_cells(width, height, cells).unwrap();
            for workers in 1..12 {
                assert_partition(&membership, &schedule(&membership, workers));
            }
        }
    }

    #[test]
    fn progress_fields_start_clear() {
        let slice = WorkSlice::new(0, 0..4, 4);
        assert_eq!(slice.processed(), 0);
        assert!(!slice.is_finished());
        slice.record();
        slice.record();
        slice.finish();
        assert_eq!(slice.processed(), 2);
        assert!(slice.is_finished());
    }
}
