//! Kindling produces the fuel that flame graph tooling burns: synthetic
//! profiler stack samples, in bulk, with enough repeated structure that the
//! downstream collapse and plotting stages have real aggregation work to do.
//!
//! Sampling profilers record the state of the [call stack] over and over, and
//! flame graph pipelines (the original Perl [flamegraph toolkit], its Rust
//! port [inferno], and friends) spend their time merging those repeated
//! traces. Benchmarking or testing such a pipeline therefore needs input that
//! *looks* like profiler output, with a small set of hot call paths that
//! recur thousands of times layered over a long tail of less structured
//! stacks, without requiring an actual workload to be profiled. Kindling
//! synthesizes that input from a stochastic stack-shape model and writes it
//! in two formats:
//!
//! * a **simple format**: one function name per line, samples separated by
//!   blank lines, consumed directly by flame graph builders that take raw
//!   stack lists; and
//! * a **perf-script format**: text records laid out like the output of
//!   [`perf script`], byte-compatible with `stackcollapse-perf.pl` and
//!   `inferno-collapse-perf` (comm/pid/timestamp header, tab-indented frames
//!   with synthetic addresses, a bottom-of-stack `[unknown]` frame).
//!
//! # Command-line use
//!
//! ## Generating datasets
//!
//! ```console
//! $ kindling-stacks -n 10000 -o medium.stacks
//! $ kindling-perf --preset large --seed 42 -o large.perf
//! ```
//!
//! Both binaries accept `--hot-ratio` to tune how often a sample is drawn
//! from the fixed hot-path catalog, and `--seed` to make a run reproducible.
//!
//! ## Benchmarking flame graph pipelines
//!
//! ```console
//! $ kindling-bench --tool 'mine=./flamegraph_main {input} {output}'
//! ```
//!
//! `kindling-bench` generates a ladder of perf-script datasets, times every
//! configured pipeline over each of them with [hyperfine], and renders the
//! means as a Markdown table and an SVG bar chart.
//!
//! # Programmatic access
//!
//! Dataset generation lives in the [`generate`] module: a [`StackModel`]
//! decides stack shapes, per-format generators in [`generate::stacks`] and
//! [`generate::perf`] emit them, and the [`Generate`] trait drives whole
//! datasets into any [`io::Write`] sink. All randomness flows through a
//! caller-provided [`rand::Rng`], so seeding is entirely in the caller's
//! hands. The benchmark driver is available in the [`bench`] module when the
//! `bench` feature is enabled.
//!
//!   [call stack]: https://en.wikipedia.org/wiki/Call_stack
//!   [flamegraph toolkit]: https://github.com/brendangregg/FlameGraph
//!   [inferno]: https://github.com/jonhoo/inferno
//!   [`perf script`]: https://linux.die.net/man/1/perf-script
//!   [hyperfine]: https://github.com/sharkdp/hyperfine
//!   [`StackModel`]: generate::model::StackModel
//!   [`Generate`]: generate::Generate
//!   [`io::Write`]: std::io::Write

#![deny(missing_docs)]

/// Synthetic stack-sample generation for various output formats.
///
/// See the [crate-level documentation] for details.
///
///   [crate-level documentation]: ../index.html
pub mod generate;

/// Comparative timing of flame graph pipelines over generated datasets.
///
/// See the [crate-level documentation] for details.
///
///   [crate-level documentation]: ../index.html
#[cfg(feature = "bench")]
pub mod bench;
