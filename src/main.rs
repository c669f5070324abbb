use clap::Parser;
use pairfolio::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
