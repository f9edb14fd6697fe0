use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use super::model::{Mode, StackModel};
use super::Generate;

/// Shared objects attributed to synthetic frames.
pub static DSO_PATHS: &[&str] = &[
    "/usr/lib/libc.so.6",
    "/usr/lib/libm.so.6",
    "/usr/lib/libstdc++.so.6",
    "/usr/lib/libssl.so.3",
];

// Synthetic addresses emulate 48-bit userspace pointers, so they always
// format to exactly 12 hex digits; offsets stay small like real symbol
// offsets do.
const ADDR_MIN: u64 = 0x4000_0000_0000;
const ADDR_MAX: u64 = 0x7fff_ffff_ffff;
const OFFSET_MIN: u32 = 0x10;
const OFFSET_MAX: u32 = 0x2ff;

/// Settings for perf-script generation.
///
/// All fields have sensible defaults; construct with
/// `perf::Options::default()` and adjust as needed.
#[derive(Clone, Debug)]
pub struct Options {
    /// Command name reported in every record header.
    pub comm: String,

    /// Process id reported in every record header.
    pub pid: u32,

    /// Per-sample event count (the sampling period).
    pub period: u64,

    /// Event type literal reported in every record header.
    pub event: String,

    /// Seconds between consecutive sample timestamps.
    pub interval: f64,

    /// First sample timestamp, in seconds since the Unix epoch. `None`
    /// captures the wall clock when generation starts; pin it to make a
    /// seeded run byte-reproducible.
    pub epoch: Option<f64>,

    /// Fraction of frames attributed to a [`DSO_PATHS`] entry rather than
    /// `[unknown]`. Must be within `[0, 1]`.
    pub dso_ratio: f64,

    /// Composition of non-hot stacks.
    pub mode: Mode,

    /// Fraction of samples drawn from the hot-path catalog. Must be within
    /// `[0, 1]`.
    pub hot_ratio: f64,

    /// Deepest stack to generate [default: 10].
    pub max_depth: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            comm: "testprog".to_string(),
            pid: 12345,
            period: 250_000,
            event: "cpu-clock:u".to_string(),
            interval: 0.0001,
            epoch: None,
            dso_ratio: 0.6,
            mode: Mode::Simple,
            hot_ratio: 0.3,
            max_depth: None,
        }
    }
}

/// A perf-script sample generator.
///
/// Emits records shaped like `perf script` output, one per sample:
///
/// ```text
/// testprog         12345 1722680000.000100:     250000 cpu-clock:u:
///     7f3acd42b118 execute_query+0x1a4 (/usr/lib/libc.so.6)
///     40ab31e0c2d7 foo+0x2e ([unknown])
///                0 [unknown] ([unknown])
/// ```
///
/// (frame lines are tab-indented in the actual output). The header keeps the
/// exact column widths consumers parse by position: comm left-justified to
/// 16, pid right-aligned to 5, timestamp with six decimals, event count
/// right-aligned to 6. Every record ends with the bottom-of-stack
/// `\t0 [unknown] ([unknown])` frame real profilers emit, then a blank line.
///
/// Timestamps advance by a fixed interval from the epoch resolved at dataset
/// start, so they are strictly increasing and evenly spaced no matter how
/// fast generation actually runs.
///
/// To construct one, either use `perf::Generator::default()` or create an
/// [`Options`] and use `perf::Generator::from(options)`.
pub struct Generator {
    model: StackModel,

    /// Index of the next sample within the current dataset.
    seq: u64,

    /// Resolved first-sample timestamp for the current dataset.
    epoch: f64,

    opt: Options,
}

impl From<Options> for Generator {
    fn from(opt: Options) -> Self {
        let mut model = StackModel::new(opt.mode, opt.hot_ratio);
        model.min_depth = 3;
        model.max_depth = opt.max_depth.unwrap_or(10);
        Generator {
            model,
            seq: 0,
            epoch: 0.0,
            opt,
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Generator::from(Options::default())
    }
}

impl Generate for Generator {
    fn start(&mut self) {
        self.seq = 0;
        self.epoch = match self.opt.epoch {
            Some(epoch) => epoch,
            None => wall_epoch(),
        };
    }

    fn sample<R, W>(&mut self, rng: &mut R, writer: &mut W) -> io::Result<()>
    where
        R: Rng,
        W: Write,
    {
        let ts = self.epoch + self.seq as f64 * self.opt.interval;
        self.seq += 1;

        writeln!(
            writer,
            "{:<16} {:>5} {:.6}:     {:>6} {}:",
            self.opt.comm, self.opt.pid, ts, self.opt.period, self.opt.event
        )?;

        for frame in self.model.stack(rng) {
            let addr = rng.gen_range(ADDR_MIN..=ADDR_MAX);
            let offset = rng.gen_range(OFFSET_MIN..=OFFSET_MAX);
            let dso = if rng.gen_bool(self.opt.dso_ratio) {
                DSO_PATHS[rng.gen_range(0..DSO_PATHS.len())]
            } else {
                "[unknown]"
            };
            writeln!(writer, "\t{:x} {}+0x{:x} ({})", addr, frame, offset, dso)?;
        }

        writer.write_all(b"\t0 [unknown] ([unknown])\n\n")
    }
}

fn wall_epoch() -> f64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs_f64(),
        Err(_) => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample_lines(seed: u64) -> Vec<String> {
        let mut generator = Generator::from(Options {
            epoch: Some(1_722_680_000.0),
            ..Options::default()
        });
        generator.start();
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut out = Vec::new();
        generator.sample(&mut rng, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("\n\n"), "missing blank-line terminator");
        text.trim_end().lines().map(str::to_string).collect()
    }

    #[test]
    fn header_keeps_its_column_widths() {
        let lines = sample_lines(3);
        let header = &lines[0];
        // comm is left-justified to 16 columns, then pid right-aligned to 5.
        assert!(header.starts_with("testprog         12345 "));
        assert!(header.ends_with(" cpu-clock:u:"));
        assert!(header.contains("1722680000.000000:     250000"));
    }

    #[test]
    fn frame_addresses_are_twelve_hex_digits() {
        for _ in 0..64 {
            for line in sample_lines(rand::random()) {
                if let Some(frame) = line.strip_prefix('\t') {
                    if frame.starts_with('0') {
                        continue;
                    }
                    let addr = frame.split(' ').next().unwrap();
                    assert_eq!(addr.len(), 12, "address {} in {}", addr, line);
                    assert!(addr.bytes().all(|b| b.is_ascii_hexdigit()));
                }
            }
        }
    }

    #[test]
    fn every_record_ends_with_the_unknown_frame() {
        let lines = sample_lines(5);
        assert_eq!(lines[lines.len() - 1], "\t0 [unknown] ([unknown])");
    }

    #[test]
    fn timestamps_are_evenly_spaced() {
        let mut generator = Generator::from(Options {
            epoch: Some(1_722_680_000.0),
            ..Options::default()
        });
        let mut rng = SmallRng::seed_from_u64(9);
        let mut out = Vec::new();
        generator.generate(&mut rng, 50, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let timestamps: Vec<f64> = text
            .lines()
            .filter(|l| !l.starts_with('\t') && !l.is_empty())
            .map(|header| {
                let field = header.split_whitespace().nth(2).unwrap();
                field.trim_end_matches(':').parse().unwrap()
            })
            .collect();
        assert_eq!(timestamps.len(), 50);
        for pair in timestamps.windows(2) {
            assert!((pair[1] - pair[0] - 0.0001).abs() < 1e-9);
        }
    }

    #[test]
    fn dataset_restarts_reset_the_timestamp_cursor() {
        let mut generator = Generator::from(Options {
            epoch: Some(1_722_680_000.0),
            ..Options::default()
        });

        let mut first = Vec::new();
        let mut rng = SmallRng::seed_from_u64(21);
        generator.generate(&mut rng, 10, &mut first).unwrap();

        let mut second = Vec::new();
        let mut rng = SmallRng::seed_from_u64(21);
        generator.generate(&mut rng, 10, &mut second).unwrap();

        assert_eq!(first, second);
    }
}
