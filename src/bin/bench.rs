use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use env_logger::Env;
use indexmap::IndexMap;
use kindling::bench::{self, chart, Dataset, Options, Runner};
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Debug, Parser)]
#[clap(
    name = "kindling-bench",
    about,
    after_help = "\
Each tool is a shell command template; {input} is replaced with the
generated perf-script file and {output} with a per-tool SVG path. Passing
any --tool replaces the default registry (the FlameGraph perl scripts and
the inferno tools), so list every pipeline you want measured:

    kindling-bench \\
        --tool 'perl=stackcollapse-perf.pl {input} | flamegraph.pl > {output}' \\
        --tool 'mine=./flamegraph_main {input} {output}' \\
        --dataset medium=1000 --dataset large=10000

Requires hyperfine and every tool's executable on PATH."
)]
struct Opt {
    // ************* //
    // *** FLAGS *** //
    // ************* //
    /// Silence all log output
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,

    /// Verbose logging mode (-v, -vv)
    #[clap(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    // *************** //
    // *** OPTIONS *** //
    // *************** //
    /// Tool to benchmark as NAME=COMMAND; repeatable, replaces the defaults
    #[clap(long = "tool", value_name = "NAME=CMD")]
    tools: Vec<String>,

    /// Dataset ladder rung as TAG=SAMPLES; repeatable, replaces the defaults
    #[clap(long = "dataset", value_name = "TAG=SAMPLES")]
    datasets: Vec<String>,

    /// Warmup runs per command
    #[clap(long = "warmup", value_name = "UINT", default_value_t = 3)]
    warmup: usize,

    /// Measured runs per command
    #[clap(long = "runs", value_name = "UINT", default_value_t = 10)]
    runs: usize,

    /// Directory for generated datasets and benchmark artifacts
    #[clap(long = "work-dir", value_name = "PATH", default_value = ".")]
    work_dir: PathBuf,

    /// Markdown results table file
    #[clap(long = "table", value_name = "PATH", default_value = "benchmark_result.md")]
    table: PathBuf,

    /// SVG bar chart file
    #[clap(long = "chart", value_name = "PATH", default_value = "benchmark_chart.svg")]
    chart: PathBuf,

    /// Seed for the random source [default: from system entropy]
    #[clap(long = "seed", value_name = "UINT")]
    seed: Option<u64>,
}

fn parse_tools(specs: &[String]) -> io::Result<IndexMap<String, String>> {
    let mut tools = IndexMap::new();
    for spec in specs {
        match spec.split_once('=') {
            Some((name, command)) if !name.is_empty() && !command.trim().is_empty() => {
                tools.insert(name.to_string(), command.to_string());
            }
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid tool spec (want NAME=COMMAND): {}", spec),
                ));
            }
        }
    }
    Ok(tools)
}

fn parse_datasets(specs: &[String]) -> io::Result<Vec<Dataset>> {
    let mut datasets = Vec::with_capacity(specs.len());
    for spec in specs {
        let parsed = spec
            .split_once('=')
            .and_then(|(tag, samples)| samples.parse().ok().map(|samples| (tag, samples)));
        match parsed {
            Some((tag, samples)) if !tag.is_empty() && samples > 0 => {
                datasets.push(Dataset::new(tag, samples));
            }
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid dataset spec (want TAG=SAMPLES): {}", spec),
                ));
            }
        }
    }
    Ok(datasets)
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

    let mut options = Options::default();
    if !opt.tools.is_empty() {
        options.tools = parse_tools(&opt.tools)?;
    }
    if !opt.datasets.is_empty() {
        options.datasets = parse_datasets(&opt.datasets)?;
    }
    options.warmup = opt.warmup;
    options.runs = opt.runs;

    fs::create_dir_all(&opt.work_dir)?;
    let mut rng = match opt.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let rows = Runner::from(options).run(&mut rng, &opt.work_dir)?;

    bench::write_table(&rows, io::stdout().lock())?;
    bench::write_table(&rows, File::create(&opt.table)?)?;
    info!("wrote results table to {}", opt.table.display());

    chart::write_chart(&rows, io::BufWriter::new(File::create(&opt.chart)?))?;
    info!("wrote chart to {}", opt.chart.display());
    Ok(())
}
