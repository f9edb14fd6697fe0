/// SVG bar chart rendering for benchmark results.
pub mod chart;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use indexmap::IndexMap;
use log::{debug, info, warn};
use rand::Rng;
use serde::Deserialize;

use crate::generate::{perf, Generate};

/// One rung of the benchmark ladder: a named dataset size.
#[derive(Clone, Debug)]
pub struct Dataset {
    /// Short name used for file names and table rows.
    pub tag: String,
    /// Number of perf-script samples to generate for this rung.
    pub samples: usize,
}

impl Dataset {
    /// A dataset with the given tag and sample count.
    pub fn new(tag: &str, samples: usize) -> Self {
        Dataset {
            tag: tag.to_string(),
            samples,
        }
    }
}

/// Mean run times for one dataset, in milliseconds, keyed by tool name in
/// registry order.
#[derive(Clone, Debug)]
pub struct Row {
    /// The dataset's tag.
    pub tag: String,
    /// Tool name → mean wall time in milliseconds.
    pub means: IndexMap<String, f64>,
}

/// Settings for a benchmark run.
///
/// Tool commands are templates with `{input}` and `{output}` placeholders,
/// substituted with the generated perf-script file and a per-tool SVG path.
/// hyperfine runs every command through a shell, so pipelines and
/// redirections work as written. Registry order decides both hyperfine
/// invocation order and table column order.
#[derive(Clone, Debug)]
pub struct Options {
    /// Tool name → command template.
    pub tools: IndexMap<String, String>,

    /// Dataset ladder, benchmarked in order.
    pub datasets: Vec<Dataset>,

    /// Warmup runs hyperfine performs per command.
    pub warmup: usize,

    /// Measured runs hyperfine performs per command.
    pub runs: usize,
}

impl Default for Options {
    fn default() -> Self {
        let mut tools = IndexMap::new();
        tools.insert(
            "perl".to_string(),
            "stackcollapse-perf.pl {input} | flamegraph.pl > {output}".to_string(),
        );
        tools.insert(
            "inferno".to_string(),
            "inferno-collapse-perf {input} > inferno.folded && \
             inferno-flamegraph inferno.folded > {output}"
                .to_string(),
        );
        Options {
            tools,
            datasets: vec![
                Dataset::new("cute", 10),
                Dataset::new("small", 100),
                Dataset::new("medium", 1_000),
                Dataset::new("large", 10_000),
                Dataset::new("huge", 100_000),
            ],
            warmup: 3,
            runs: 10,
        }
    }
}

/// Drives one benchmark campaign: dataset generation, hyperfine timing, and
/// result collection.
///
/// To construct one, either use `Runner::default()` or create an [`Options`]
/// and use `Runner::from(options)`.
#[derive(Default)]
pub struct Runner {
    opt: Options,
}

impl From<Options> for Runner {
    fn from(opt: Options) -> Self {
        Runner { opt }
    }
}

impl Runner {
    /// Runs the whole campaign, leaving generated datasets, per-tool SVGs,
    /// and hyperfine JSON exports under `work_dir`.
    ///
    /// Fails up front with [`io::ErrorKind::NotFound`] if hyperfine or any
    /// tool's executable is missing from `PATH`; any later generation or
    /// measurement failure aborts the remaining rungs.
    pub fn run<R: Rng>(&self, rng: &mut R, work_dir: &Path) -> io::Result<Vec<Row>> {
        self.check_programs()?;

        let mut generator = perf::Generator::default();
        let mut rows = Vec::with_capacity(self.opt.datasets.len());
        for dataset in &self.opt.datasets {
            info!(
                "benchmarking dataset {} ({} samples)",
                dataset.tag, dataset.samples
            );
            let input = work_dir.join(format!("{}.perf", dataset.tag));
            generator.generate_file(rng, dataset.samples, &input)?;
            rows.push(self.measure(dataset, &input, work_dir)?);
        }
        Ok(rows)
    }

    /// Verifies that hyperfine and every registered tool resolve to an
    /// executable before any data is generated.
    fn check_programs(&self) -> io::Result<()> {
        let mut missing = Vec::new();
        if which::which("hyperfine").is_err() {
            missing.push("hyperfine".to_string());
        }
        for (name, template) in &self.opt.tools {
            match template.split_whitespace().next() {
                Some(program) => {
                    if which::which(program).is_err() {
                        missing.push(format!("{} (tool {})", program, name));
                    }
                }
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("tool {} has an empty command", name),
                    ));
                }
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("missing required programs: {}", missing.join(", ")),
            ))
        }
    }

    /// Times every tool over one generated dataset and collects the means.
    fn measure(&self, dataset: &Dataset, input: &Path, work_dir: &Path) -> io::Result<Row> {
        let json = work_dir.join(format!("benchmark-{}.json", dataset.tag));

        let mut hyperfine = Command::new("hyperfine");
        hyperfine
            .arg("--warmup")
            .arg(self.opt.warmup.to_string())
            .arg("--runs")
            .arg(self.opt.runs.to_string())
            .arg("--ignore-failure")
            .arg("--export-json")
            .arg(&json);
        for (name, template) in &self.opt.tools {
            let output = work_dir.join(format!("{}-{}.svg", dataset.tag, name));
            hyperfine.arg(substitute(template, input, &output));
        }

        let status = hyperfine.status()?;
        if !status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("hyperfine failed for dataset {}: {}", dataset.tag, status),
            ));
        }

        let report: Report = serde_json::from_reader(File::open(&json)?)?;
        if report.results.len() != self.opt.tools.len() {
            warn!(
                "hyperfine reported {} results for {} tools",
                report.results.len(),
                self.opt.tools.len()
            );
        }

        // hyperfine reports results in invocation order, which is registry
        // order.
        let mut means = IndexMap::new();
        for (name, result) in self.opt.tools.keys().zip(&report.results) {
            let mean_ms = result.mean * 1000.0;
            debug!("{}: {:.1} ms ({})", name, mean_ms, result.command);
            means.insert(name.clone(), mean_ms);
        }
        Ok(Row {
            tag: dataset.tag.clone(),
            means,
        })
    }
}

/// The slice of hyperfine's `--export-json` schema this driver consumes.
#[derive(Debug, Deserialize)]
struct Report {
    results: Vec<RunResult>,
}

#[derive(Debug, Deserialize)]
struct RunResult {
    command: String,
    /// Mean wall time in seconds.
    mean: f64,
}

fn substitute(template: &str, input: &Path, output: &Path) -> String {
    template
        .replace("{input}", &input.to_string_lossy())
        .replace("{output}", &output.to_string_lossy())
}

/// Writes the collected means as a Markdown table, one row per dataset and
/// one column per tool.
pub fn write_table<W: Write>(rows: &[Row], mut writer: W) -> io::Result<()> {
    let tools: Vec<&str> = match rows.first() {
        Some(row) => row.means.keys().map(String::as_str).collect(),
        None => return Ok(()),
    };

    write!(writer, "| Dataset |")?;
    for name in &tools {
        write!(writer, " {} |", name)?;
    }
    writeln!(writer)?;

    write!(writer, "|--------:|")?;
    for name in &tools {
        write!(writer, "{}:|", "-".repeat(name.len() + 1))?;
    }
    writeln!(writer)?;

    for row in rows {
        write!(writer, "| {:>7} |", row.tag)?;
        for name in &tools {
            match row.means.get(*name) {
                Some(mean) => write!(writer, " {:>width$.1} |", mean, width = name.len())?,
                None => write!(writer, " {:>width$} |", "-", width = name.len())?,
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn substitute_fills_both_placeholders() {
        let input = PathBuf::from("data.perf");
        let output = PathBuf::from("out/flame.svg");
        assert_eq!(
            substitute("collapse {input} | plot > {output}", &input, &output),
            "collapse data.perf | plot > out/flame.svg"
        );
    }

    #[test]
    fn report_parses_hyperfine_export() {
        let raw = r#"{"results": [
            {"command": "a --flag", "mean": 0.0129, "stddev": 0.001},
            {"command": "b", "mean": 0.0053, "stddev": 0.0005}
        ]}"#;
        let report: Report = serde_json::from_str(raw).unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].command, "a --flag");
        assert!((report.results[1].mean - 0.0053).abs() < 1e-12);
    }

    #[test]
    fn table_lists_tools_in_registry_order() {
        let mut means = IndexMap::new();
        means.insert("perl".to_string(), 12.94);
        means.insert("inferno".to_string(), 5.31);
        let rows = vec![Row {
            tag: "medium".to_string(),
            means,
        }];

        let mut out = Vec::new();
        write_table(&rows, &mut out).unwrap();
        let table = String::from_utf8(out).unwrap();
        assert_eq!(
            table,
            "| Dataset | perl | inferno |\n\
             |--------:|-----:|--------:|\n\
             |  medium | 12.9 |     5.3 |\n"
        );
    }

    #[test]
    fn empty_results_produce_no_table() {
        let mut out = Vec::new();
        write_table(&[], &mut out).unwrap();
        assert!(out.is_empty());
    }
}
