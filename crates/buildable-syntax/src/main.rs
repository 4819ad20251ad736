use std::process::ExitCode;

use anyhow::Result;
use buildable_syntax::cli::{Cli, run};
use clap::Parser;

fn main() -> Result<ExitCode> {
    pretty_env_logger::init();

    run(Cli::parse())
}
