use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    excerpt::cli::run()
}
