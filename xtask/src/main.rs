use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

const CRATE: &str = "excerpt";

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the excerpt test suite with cargo nextest
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Run the coverage property tests with a larger case count
    Props {
        #[arg(long, default_value_t = 10_000)]
        cases: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest { profile, release } => run_nextest(profile, release)?,
        Commands::Props { cases } => run_props(cases)?,
    }
    Ok(())
}

fn run_nextest(profile: Option<String>, release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["nextest", "run", "-p", CRATE]);
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if release {
        cmd.arg("--release");
    }
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("cargo nextest run failed");
    }
    Ok(())
}

fn run_props(cases: u32) -> Result<()> {
    let status = Command::new("cargo")
        .args(["test", "-p", CRATE, "--release", "--test", "coverage_properties"])
        .env("PROPTEST_CASES", cases.to_string())
        .status()?;
    if !status.success() {
        anyhow::bail!("property tests failed with {cases} cases");
    }
    Ok(())
}
