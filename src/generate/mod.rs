/// The stochastic stack-shape model shared by all output formats.
pub mod model;

/// Sample generation in the [`perf script`](https://linux.die.net/man/1/perf-script)
/// text format.
///
/// See the [crate-level documentation] for details.
///
///   [crate-level documentation]: ../../index.html
pub mod perf;

/// Sample generation in the simple frame-per-line format.
///
/// See the [crate-level documentation] for details.
///
///   [crate-level documentation]: ../../index.html
pub mod stacks;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use log::info;
use num_format::{Buffer, Locale};
use rand::Rng;

const CAPACITY_WRITER: usize = 128 * 1024;
const PROGRESS_INTERVAL: usize = 1000;

/// The abstract behavior of dataset generation.
///
/// Implementors of this trait know how to write a single synthetic stack
/// sample in some output format; the provided methods turn that into whole
/// datasets with progress reporting. Every random draw goes through the
/// `rng` the caller passes in, so two runs with identically seeded sources
/// and identical options produce byte-identical output.
///
/// See also the [crate-level documentation] for details.
///
///   [crate-level documentation]: ../index.html
pub trait Generate {
    /// Resets any per-dataset state.
    ///
    /// Called once by [`generate`](Generate::generate) before the first
    /// sample of every dataset. Formats without per-dataset state (like the
    /// simple format) can leave the default no-op in place.
    fn start(&mut self) {}

    /// Writes one sample block, including its terminating blank line, to the
    /// provided `writer`.
    fn sample<R, W>(&mut self, rng: &mut R, writer: &mut W) -> io::Result<()>
    where
        R: Rng,
        W: Write;

    /// Writes a dataset of `samples` sample blocks to the provided `writer`.
    ///
    /// A zero sample count is rejected up front with
    /// [`io::ErrorKind::InvalidInput`]. Any mid-generation I/O error aborts
    /// the run and is returned as-is: the sink is left wherever the failure
    /// left it, and rerunning from scratch is the only recovery.
    fn generate<R, W>(&mut self, rng: &mut R, samples: usize, mut writer: W) -> io::Result<()>
    where
        R: Rng,
        W: Write,
    {
        if samples == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "sample count must be positive",
            ));
        }

        self.start();

        let mut count = Buffer::default();
        for i in 0..samples {
            if i > 0 && i % PROGRESS_INTERVAL == 0 {
                let _ = count.write_formatted(&i, &Locale::en);
                info!("generated {} samples", count.as_str());
            }
            self.sample(rng, &mut writer)?;
        }

        writer.flush()
    }

    /// Generates a dataset of `samples` sample blocks into the file at
    /// `path`, truncating any existing file.
    fn generate_file<R, P>(&mut self, rng: &mut R, samples: usize, path: P) -> io::Result<()>
    where
        R: Rng,
        P: AsRef<Path>,
    {
        let file = File::create(path)?;
        let writer = io::BufWriter::with_capacity(CAPACITY_WRITER, file);
        self.generate(rng, samples, writer)
    }
}
