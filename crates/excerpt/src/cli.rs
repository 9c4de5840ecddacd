//! Command line interface over the codec, the coverage algebra and quota evaluation.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, ensure};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::app::outline::{Outline, OutlineStyle};
use crate::app::slice::{QuotaState, SliceReport};
use crate::domain::codec::{find_fragment, format_fragments, parse_fragments, total_size};
use crate::domain::coverage::{combined_coverage, intersect};
use crate::domain::model::FragmentSet;
use crate::infra::config::Config;

/// Exit status of `check` when the excerpt does not fit the quota.
pub const EXIT_EXCEEDED: u8 = 2;
/// Exit status of `find` when no fragment contains the segment.
pub const EXIT_NOT_FOUND: u8 = 3;

#[derive(Debug, Parser)]
#[command(author, version, about = "Fragment coverage and excerpt quota checks", long_about = None)]
pub struct Cli {
    /// Log evaluation details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read configuration from this file instead of the global and workspace files.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the number of segments in a fragment list
    Size {
        #[arg(value_name = "SET")]
        set: String,
    },
    /// Print the number of segments covered by one or two fragment lists
    Coverage { a: String, b: Option<String> },
    /// Print the fragments shared by two fragment lists
    Intersect { a: String, b: String },
    /// Print the index of the fragment containing a segment
    Find {
        #[arg(value_name = "SET")]
        set: String,
        segment: u64,
    },
    /// Evaluate an excerpt against a quota and a limit
    Check {
        /// Fragments already counted against the quota.
        #[arg(long)]
        quota: Option<String>,
        /// Newly requested fragments.
        #[arg(long)]
        excerpt: String,
        /// Number of segments in the document.
        #[arg(long)]
        segments: u64,
        /// Absolute limit on quota and excerpt together.
        #[arg(long, conflicts_with = "limit_percent")]
        limit: Option<u64>,
        /// Limit as a share of the document, in percent.
        #[arg(long)]
        limit_percent: Option<f64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Outline width in characters; 0 disables the outline.
        #[arg(long)]
        width: Option<usize>,
    },
    /// Generate a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Output formats for `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human readable summary with an outline.
    Text,
    /// The full report as JSON.
    Json,
}

/// Parse the process arguments, initialize logging and run the selected command.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    crate::init(cli.verbose);
    let mut stdout = io::stdout().lock();
    execute(cli, &mut stdout).map(ExitCode::from)
}

/// Run a parsed command, writing its output to `out`. Returns the process exit status.
pub fn execute(cli: Cli, out: &mut impl Write) -> Result<u8> {
    match cli.command {
        Commands::Size { set } => {
            let set = decode("set", &set)?;
            writeln!(out, "{}", total_size(&set))?;
        }
        Commands::Coverage { a, b } => {
            let a = decode("a", &a)?;
            let b = decode("b", b.as_deref().unwrap_or_default())?;
            writeln!(out, "{}", combined_coverage(&a, &b))?;
        }
        Commands::Intersect { a, b } => {
            let (a, b) = (decode("a", &a)?, decode("b", &b)?);
            writeln!(out, "{}", format_fragments(&intersect(&a, &b)))?;
        }
        Commands::Find { set, segment } => {
            let set = decode("set", &set)?;
            match find_fragment(&set, segment, 0, set.len()) {
                Some(index) => writeln!(out, "{index}")?,
                None => {
                    writeln!(out, "not found")?;
                    return Ok(EXIT_NOT_FOUND);
                }
            }
        }
        Commands::Check {
            quota,
            excerpt,
            segments,
            limit,
            limit_percent,
            format,
            width,
        } => {
            let config = match &cli.config {
                Some(path) => Config::load_from(path)?,
                None => Config::load()?,
            };
            let quota = decode("quota", quota.as_deref().unwrap_or_default())?;
            let excerpt = decode("excerpt", &excerpt)?;
            let state = match limit {
                Some(limit) => QuotaState::new(quota, segments, limit),
                None => QuotaState::with_limit_percent(
                    quota,
                    segments,
                    limit_percent.unwrap_or(config.quota.limit_percent),
                ),
            };
            let report = state.evaluate(&excerpt);

            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&report)
                        .context("failed to serialize report")?;
                    writeln!(out, "{json}")?;
                }
                OutputFormat::Text => {
                    let width = width.unwrap_or(config.outline.width);
                    let outline = Outline::new(width, OutlineStyle::from_config(&config));
                    write_text_report(out, &report, &outline)?;
                }
            }

            if report.exceeded {
                return Ok(EXIT_EXCEEDED);
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "excerpt", out);
        }
    }
    Ok(0)
}

/// Decode a fragment list given on the command line, insisting on the sorted, disjoint form.
fn decode(name: &str, text: &str) -> Result<FragmentSet> {
    let set = parse_fragments(text).with_context(|| format!("invalid {name} '{text}'"))?;
    ensure!(
        set.is_normalized(),
        "{name} '{text}' must be sorted and free of overlaps"
    );
    Ok(set)
}

fn write_text_report(out: &mut impl Write, report: &SliceReport, outline: &Outline) -> Result<()> {
    writeln!(
        out,
        "excerpt   {} ({} segments, {:.1}%)",
        display_set(&report.excerpt),
        report.excerpt_size,
        report.excerpt_percent
    )?;
    writeln!(
        out,
        "quota     {} ({} segments)",
        display_set(&report.quota),
        report.quota_size
    )?;
    writeln!(
        out,
        "used      {}/{} ({:.1}% of {})",
        report.used, report.limit, report.used_percent, report.segments
    )?;
    writeln!(out, "overlap   {}", report.overlap)?;
    writeln!(out, "remaining {}", report.remaining)?;
    writeln!(
        out,
        "status    {}",
        if report.exceeded { "exceeded" } else { "ok" }
    )?;

    let bar = outline.render(&report.quota, &report.excerpt, report.segments, report.exceeded);
    if !bar.is_empty() {
        writeln!(out, "[{bar}]")?;
    }
    Ok(())
}

fn display_set(set: &FragmentSet) -> String {
    if set.is_empty() {
        "-".to_owned()
    } else {
        format_fragments(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> (u8, String) {
        let cli = Cli::try_parse_from(std::iter::once("excerpt").chain(args.iter().copied()))
            .expect("valid arguments");
        let mut out = Vec::new();
        let code = execute(cli, &mut out).expect("command succeeds");
        (code, String::from_utf8(out).expect("utf-8 output"))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn size_and_coverage_print_counts() {
        assert_eq!(run_args(&["size", "3,5-8,12"]).1, "6\n");
        assert_eq!(run_args(&["coverage", "1-5", "3-8"]).1, "8\n");
        assert_eq!(run_args(&["coverage", "1-5"]).1, "5\n");
    }

    #[test]
    fn intersect_prints_encoded_set() {
        assert_eq!(run_args(&["intersect", "1-10", "5-15"]).1, "5-10\n");
        assert_eq!(run_args(&["intersect", "1-3", "5-6"]).1, "\n");
    }

    #[test]
    fn find_reports_missing_segment_with_exit_code() {
        let (code, out) = run_args(&["find", "1-3,7-9,20", "8"]);
        assert_eq!(out, "1\n");
        assert_eq!(code, 0);

        let (code, out) = run_args(&["find", "1-3,7-9,20", "15"]);
        assert_eq!(out, "not found\n");
        assert_eq!(code, EXIT_NOT_FOUND);
    }

    #[test]
    fn rejects_unsorted_input() {
        let cli = Cli::try_parse_from(["excerpt", "size", "5-8,1-3"]).unwrap();
        let err = execute(cli, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("sorted"));
    }

    #[test]
    fn limit_options_conflict() {
        let parsed = Cli::try_parse_from([
            "excerpt",
            "check",
            "--excerpt",
            "1",
            "--segments",
            "10",
            "--limit",
            "3",
            "--limit-percent",
            "10",
        ]);
        assert!(parsed.is_err());
    }
}
