// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Progress reporting for the accumulation phase.  The monitor only
//! ever reads the slices' counters, so the figure it prints can lag a
//! little behind the workers.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use crate::schedule::WorkSlice;

// How often the monitor wakes to check whether the workers are done.
const POLL: Duration = Duration::from_millis(25);

/// Percentage of the scheduled points traced so far.  An empty
/// schedule is complete.
pub fn completion(slices: &[WorkSlice]) -> u64 {
    let target: usize = slices.iter().map(|s| s.target).sum();
    if target == 0 {
        return 100;
    }
    let processed: usize = slices.iter().map(WorkSlice::processed).sum();
    (processed as u64 * 100) / target as u64
}

/// Prints `NN% complete..` every `interval` until every slice is finished.
#[derive(Copy, Clone, Debug)]
pub struct Monitor {
    interval: Duration,
}

impl Monitor {
    /// A monitor reporting every `interval`.
    pub fn new(interval: Duration) -> Monitor {
        Monitor { interval }
    }

    /// Watch the slices until their workers are done, and return how
    /// many reports were written.
    pub fn watch<W: Write>(&self, slices: &[WorkSlice], output: &mut W) -> io::Result<usize> {
        let mut reports = 0;
        let mut last = Instant::now();
        while !slices.iter().all(WorkSlice::is_finished) {
            thread::sleep(POLL.min(self.interval));
            if last.elapsed() >= self.interval {
                writeln!(output, "{:02}% complete..", completion(slices))?;
                output.flush()?;
                reports += 1;
                last = Instant::now();
            }
        }
        Ok(reports)
    }
}
