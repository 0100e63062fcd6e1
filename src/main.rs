// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use brot::histogram::MAX_LAYERS;
use brot::Config;
use clap::{value_t, App, Arg, ArgMatches};
use std::io;
use std::str::FromStr;
use std::time::Duration;

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_positive(s: &str, name: &str) -> Result<(), String> {
    validate_range(
        s,
        1,
        usize::max_value(),
        &format!("Could not parse {}", name),
        &format!("{} must be at least 1", name),
    )
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const DEPTH: &str = "depth";
const DETAIL: &str = "detail";
const THREADS: &str = "threads";
const LAYERS: &str = "layers";
const DATA: &str = "data";
const INTERVAL: &str = "interval";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("brot")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot and Buddhabrot renderer")
        .arg(
            Arg::with_name(SIZE)
                .required(true)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .validator(|s| validate_positive(&s, "size"))
                .help("Grid cells per unit; the images are 3·size by 2·size"),
        )
        .arg(
            Arg::with_name(DEPTH)
                .required(true)
                .long(DEPTH)
                .short("d")
                .takes_value(true)
                .validator(|s| validate_positive(&s, "depth"))
                .help("Iterations per orbit, and the base Mandelbrot depth"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output directory"),
        )
        .arg(
            Arg::with_name(DETAIL)
                .required(false)
                .long(DETAIL)
                .short("m")
                .takes_value(true)
                .default_value("1")
                .validator(|s| validate_positive(&s, "detail"))
                .help("Multiplier on the depth of the Mandelbrot pass"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver [default: one per core]"),
        )
        .arg(
            Arg::with_name(LAYERS)
                .required(false)
                .long(LAYERS)
                .short("l")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        MAX_LAYERS,
                        "Could not parse layer count",
                        &format!("Layer count must be between 1 and {}", MAX_LAYERS),
                    )
                })
                .help("Number of Buddhabrot layers, each with half the cutoff of the last"),
        )
        .arg(
            Arg::with_name(DATA)
                .long(DATA)
                .help("Also write the raw hit counts of every layer"),
        )
        .arg(
            Arg::with_name(INTERVAL)
                .required(false)
                .long(INTERVAL)
                .short("i")
                .takes_value(true)
                .default_value("1")
                .validator(|s| validate_positive(&s, "interval"))
                .help("Seconds between progress reports"),
        )
        .get_matches()
}

fn value(matches: &ArgMatches, name: &str) -> usize {
    value_t!(matches, name, usize).unwrap_or_else(|e| e.exit())
}

fn main() {
    env_logger::init();
    let matches = args();

    let mut config = Config::new(
        value(&matches, SIZE),
        value(&matches, DEPTH),
        matches.value_of(OUTPUT).unwrap_or("."),
    );
    config.detail = value(&matches, DETAIL);
    if matches.is_present(THREADS) {
        config.threads = value(&matches, THREADS);
    }
    config.layers = value(&matches, LAYERS);
    config.data = matches.is_present(DATA);
    config.interval = Duration::from_secs(value(&matches, INTERVAL) as u64);

    match brot::run(config, &mut io::stdout()) {
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
        Ok(report) => println!(
            "Finished. Buddhabrot amplitude {}.",
            report.amplitudes.first().cloned().unwrap_or(0)
        ),
    }
}
