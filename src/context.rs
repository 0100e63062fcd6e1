// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The render job: owns every plane-sized buffer, and lends them out
//! to the workers for the length of the accumulation phase.

use log::{debug, info, warn};
use num::Complex;
use std::fs;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use crate::accumulate::Accumulator;
use crate::config::Config;
use crate::errors::BrotError;
use crate::grid::Grid;
use crate::histogram::Layers;
use crate::mandelbrot;
use crate::monitor::Monitor;
use crate::planes::PlaneMapper;
use crate::render;
use crate::schedule::{schedule, WorkSlice};

/// Everything one render needs, built once from a Config.
pub struct Context {
    config: Config,
    mapper: PlaneMapper,
    coordinates: Grid<Complex<f64>>,
    membership: Grid<bool>,
    layers: Layers,
}

/// What a finished render produced.
#[derive(Debug)]
pub struct Report {
    /// The amplitude of each Buddhabrot layer.
    pub amplitudes: Vec<u32>,
    /// Every file written, in the order they were written.
    pub written: Vec<PathBuf>,
}

impl Context {
    /// Validate the configuration, lay out the plane, and classify it.
    pub fn new(config: Config) -> Result<Context, BrotError> {
        config.validate()?;
        let mapper = PlaneMapper::canvas(config.size)?;
        let coordinates = mapper.coordinates()?;

        info!(
            "classifying the {}x{} plane to depth {}",
            mapper.width(),
            mapper.height(),
            config.mandelbrot_depth()
        );
        let membership =
            mandelbrot::membership(&coordinates, config.mandelbrot_depth(), config.threads)?;
        let layers = Layers::new(mapper.width(), mapper.height(), config.depth, config.layers)?;

        Ok(Context {
            config,
            mapper,
            coordinates,
            membership,
            layers,
        })
    }

    /// Which cells are in the Mandelbrot set.
    pub fn membership(&self) -> &Grid<bool> {
        &self.membership
    }

    /// The Buddhabrot hit counts.
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    /// A view of the context for tracing orbits.
    pub fn accumulator(&self) -> Accumulator {
        Accumulator {
            mapper: &self.mapper,
            coordinates: &self.coordinates,
            membership: &self.membership,
            layers: &self.layers,
            depth: self.config.depth,
        }
    }

    /// Split the plane's non-member points between the workers.
    pub fn schedule(&self) -> Vec<WorkSlice> {
        schedule(&self.membership, self.config.threads)
    }

    /// Trace every orbit, one worker per slice, while the monitor writes
    /// progress to `progress`.  Returns each layer's amplitude, taken
    /// after every worker has been joined.
    pub fn accumulate<W: Write + Send>(&self, progress: &mut W) -> Result<Vec<u32>, BrotError> {
        let slices = self.schedule();
        info!(
            "tracing {} orbits of {} steps on {} workers",
            slices.iter().map(|s| s.target).sum::<usize>(),
            self.config.depth,
            slices.len()
        );

        let accumulator = self.accumulator();
        let monitor = Monitor::new(self.config.interval);
        crossbeam::scope(|spawner| {
            let slices = &slices;
            let accumulator = &accumulator;
            spawner.spawn(move |_| match monitor.watch(slices, progress) {
                Ok(reports) => debug!("monitor stopped after {} reports", reports),
                Err(e) => warn!("progress reporting stopped: {}", e),
            });
            match slices.as_slice() {
                [only] => contain(|| accumulator.run(only)),
                _ => {
                    for slice in slices {
                        spawner.spawn(move |_| accumulator.run(slice));
                    }
                    Ok(())
                }
            }
        })
        .map_err(|_| BrotError::Worker)??;

        let amplitudes = self.layers.amplitudes();
        info!("accumulation finished, amplitudes {:?}", amplitudes);
        Ok(amplitudes)
    }

    fn output_dir(&self) -> Result<&PathBuf, BrotError> {
        let dir = &self.config.output;
        fs::create_dir_all(dir).map_err(|e| BrotError::io(dir, e))?;
        Ok(dir)
    }

    /// Write the membership image.
    pub fn write_mandelbrot(&self) -> Result<PathBuf, BrotError> {
        let path = self.output_dir()?.join("mandelbrot.png");
        render::write_image(&path, &render::mandelbrot_image(&self.membership)?)?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    /// Write one image per layer, normalized against `amplitudes`, and
    /// the raw counts if they were asked for.  Layer 0 is
    /// `buddhabrot.png`, layer n is `buddhabrot.n.png`.
    pub fn write_buddhabrot(&self, amplitudes: &[u32]) -> Result<Vec<PathBuf>, BrotError> {
        let dir = self.output_dir()?;
        let mut written = vec![];
        for (dim, (layer, amplitude)) in self.layers.iter().zip(amplitudes).enumerate() {
            let stem = match dim {
                0 => "buddhabrot".to_string(),
                _ => format!("buddhabrot.{}", dim),
            };

            let path = dir.join(format!("{}.png", stem));
            render::write_image(&path, &render::buddhabrot_image(layer, *amplitude)?)?;
            info!("wrote {}", path.display());
            written.push(path);

            if self.config.data {
                let path = dir.join(format!("{}.data", stem));
                render::write_data(&path, layer)?;
                info!("wrote {}", path.display());
                written.push(path);
            }
        }
        Ok(written)
    }
}

// The scope only turns panics in spawned threads into an Err; one on
// the scope's own thread would unwind straight through it.
fn contain<F: FnOnce()>(work: F) -> Result<(), BrotError> {
    panic::catch_unwind(AssertUnwindSafe(work)).map_err(|_| BrotError::Worker)
}

/// The whole batch job: classify, write the Mandelbrot, accumulate the
/// Buddhabrot, and write that too.
pub fn run<W: Write + Send>(config: Config, progress: &mut W) -> Result<Report, BrotError> {
    let context = Context::new(config)?;
    let mut written = vec![context.write_mandelbrot()?];
    let amplitudes = context.accumulate(progress)?;
    written.extend(context.write_buddhabrot(&amplitudes)?);
    Ok(Report {
        amplitudes,
        written,
    })
}
