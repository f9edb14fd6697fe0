use std::fs;
use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use env_logger::Env;
use kindling::generate::model::Mode;
use kindling::generate::stacks::{Generator, Options};
use kindling::generate::Generate;
use log::info;
use num_format::{Buffer, Locale};
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// 1K samples
    Small,
    /// 10K samples
    Medium,
    /// 100K samples
    Large,
    /// 1M samples
    Huge,
}

impl Preset {
    fn samples(self) -> usize {
        match self {
            Preset::Small => 1_000,
            Preset::Medium => 10_000,
            Preset::Large => 100_000,
            Preset::Huge => 1_000_000,
        }
    }

    fn output(self) -> &'static str {
        match self {
            Preset::Small => "small_test.txt",
            Preset::Medium => "medium_test.txt",
            Preset::Large => "large_test.txt",
            Preset::Huge => "huge_test.txt",
        }
    }
}

#[derive(Debug, Parser)]
#[clap(
    name = "kindling-stacks",
    about,
    after_help = "\
The output is one function name per line with samples separated by blank
lines, ready to feed to flame graph builders that consume raw stack lists:

    kindling-stacks --preset medium --seed 42
    flamegraph_main medium_test.txt flame.svg"
)]
struct Opt {
    // ************* //
    // *** FLAGS *** //
    // ************* //
    /// Generate flat stacks instead of layered realistic ones
    #[clap(long = "simple")]
    simple: bool,

    /// Silence all log output
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,

    /// Verbose logging mode (-v, -vv)
    #[clap(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    // *************** //
    // *** OPTIONS *** //
    // *************** //
    /// Fraction of samples drawn from the hot path catalog
    #[clap(
        long = "hot-ratio",
        value_name = "RATIO",
        default_value_t = 0.3,
        value_parser = parse_ratio
    )]
    hot_ratio: f64,

    /// Deepest stack to generate [default: 10, or 8 with --simple]
    #[clap(long = "max-depth", value_name = "UINT")]
    max_depth: Option<usize>,

    /// Number of samples to generate
    #[clap(short = 'n', long = "samples", value_name = "UINT", default_value_t = 1000)]
    samples: usize,

    /// Named dataset size preset; overrides --samples and the default output name
    #[clap(long = "preset", value_enum, value_name = "NAME")]
    preset: Option<Preset>,

    /// Seed for the random source [default: from system entropy]
    #[clap(long = "seed", value_name = "UINT")]
    seed: Option<u64>,

    /// Output file [default: test_data.txt, or the preset's name]
    #[clap(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,
}

impl Opt {
    fn into_parts(self) -> (PathBuf, usize, Option<u64>, Options) {
        let samples = match self.preset {
            Some(preset) => preset.samples(),
            None => self.samples,
        };
        let output = self.output.unwrap_or_else(|| {
            PathBuf::from(match self.preset {
                Some(preset) => preset.output(),
                None => "test_data.txt",
            })
        });
        (
            output,
            samples,
            self.seed,
            Options {
                mode: if self.simple {
                    Mode::Simple
                } else {
                    Mode::Realistic
                },
                hot_ratio: self.hot_ratio,
                max_depth: self.max_depth,
            },
        )
    }
}

fn parse_ratio(s: &str) -> Result<f64, String> {
    let ratio: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(format!("must be within [0, 1], got {}", ratio))
    }
}

fn main() -> io::Result<()> {
    let opt = Opt::parse();

    // Initialize logger
    if !opt.quiet {
        env_logger::Builder::from_env(Env::default().default_filter_or(match opt.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }))
        .format_timestamp(None)
        .init();
    }

    let (output, samples, seed, options) = opt.into_parts();
    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    Generator::from(options).generate_file(&mut rng, samples, &output)?;

    let mut count = Buffer::default();
    let _ = count.write_formatted(&samples, &Locale::en);
    let mut size = Buffer::default();
    let _ = size.write_formatted(&fs::metadata(&output)?.len(), &Locale::en);
    info!(
        "wrote {} samples ({} bytes) to {}",
        count.as_str(),
        size.as_str(),
        output.display()
    );
    Ok(())
}
