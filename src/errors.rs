// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can stop a render.  None of these are recoverable;
//! the binary reports them and exits.

use failure::Fail;
use std::io;
use std::path::Path;

/// The failure modes of a render job.
#[derive(Debug, Fail)]
pub enum BrotError {
    /// The requested configuration cannot be rendered.
    #[fail(display = "invalid configuration: {}", _0)]
    Config(String),

    /// A plane-sized buffer could not be reserved.
    #[fail(display = "out of memory allocating the {} ({} bytes)", what, bytes)]
    Allocation {
        /// Which buffer we were building.
        what: &'static str,
        /// How much we asked for.
        bytes: usize,
    },

    /// An output file could not be created or written.
    #[fail(display = "could not write {}: {}", path, cause)]
    Io {
        /// The file that failed.
        path: String,
        /// What the operating system said.
        #[cause]
        cause: io::Error,
    },

    /// A pixel buffer did not match the dimensions of its image.
    #[fail(display = "pixel buffer does not fit a {}x{} image", width, height)]
    Image {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// One of the accumulation threads panicked.
    #[fail(display = "a worker thread panicked during accumulation")]
    Worker,
}

impl BrotError {
    pub(crate) fn io(path: &Path, cause: io::Error) -> BrotError {
        BrotError::Io {
            path: path.display().to_string(),
            cause,
        }
    }
}

/// Reserve exactly `len` elements up front, so that a canvas too large
/// for the machine is reported instead of aborting the process.
pub(crate) fn allocate<T>(len: usize, what: &'static str) -> Result<Vec<T>, BrotError> {
    let bytes = len.saturating_mul(std::mem::size_of::<T>());
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| BrotError::Allocation { what, bytes })?;
    Ok(buffer)
}
