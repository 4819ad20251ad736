use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    expand::{ExpandOptions, Stage, expand},
    report::{Report, Reporter},
    source::SourceFile,
};

#[derive(Debug, Parser)]
#[command(name = "buildable", about = "Generate fluent setters for annotated declarations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand every annotation and print the rewritten source.
    Expand {
        #[command(flatten)]
        input: InputArgs,
        /// Where to write the expanded source (defaults to stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Stage::Full)]
        stage: Stage,
        /// Spaces per indentation level of generated function bodies.
        #[arg(long, default_value_t = 4)]
        indent_width: usize,
    },
    /// Report misapplied annotations without rewriting anything.
    Check {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Path to the source file (defaults to stdin if not provided).
    pub input: Option<PathBuf>,
    /// How diagnostics are written to stderr.
    #[arg(long, value_enum, default_value_t = Format::Human)]
    pub format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Human,
    Json,
}

impl InputArgs {
    fn read(&self) -> Result<SourceFile> {
        let Some(path) = &self.input else {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;

            return Ok(SourceFile::new("<stdin>", text));
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        Ok(SourceFile::new(path.display().to_string(), text))
    }
}

/// Run the command, returning failure if anything was reported.
pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Expand {
            input,
            output,
            stage,
            indent_width,
        } => {
            let source = input.read()?;
            let reporter = Reporter::new(&source);
            let options = ExpandOptions {
                stage,
                indent: " ".repeat(indent_width),
            };

            let expanded = match expand(&source, &options) {
                Ok(expanded) => expanded,
                Err(error) => {
                    emit(&reporter, input.format, &[reporter.parse_error(&error)])?;
                    return Ok(ExitCode::FAILURE);
                }
            };

            match output {
                Some(path) => fs::write(&path, &expanded.source)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => io::stdout()
                    .write_all(expanded.source.as_bytes())
                    .context("failed to write stdout")?,
            }

            let reports = expanded
                .diagnostics
                .iter()
                .map(|diagnostic| reporter.diagnostic(diagnostic))
                .collect::<Vec<_>>();

            emit(&reporter, input.format, &reports)
        }
        Command::Check { input } => {
            let source = input.read()?;
            let reporter = Reporter::new(&source);

            // Checking is expansion with the output thrown away.
            let reports = match expand(&source, &ExpandOptions::default()) {
                Ok(expanded) => expanded
                    .diagnostics
                    .iter()
                    .map(|diagnostic| reporter.diagnostic(diagnostic))
                    .collect::<Vec<_>>(),
                Err(error) => vec![reporter.parse_error(&error)],
            };

            emit(&reporter, input.format, &reports)
        }
    }
}

fn emit(reporter: &Reporter, format: Format, reports: &[Report]) -> Result<ExitCode> {
    if reports.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    let rendered = match format {
        Format::Human => reporter
            .human(reports)
            .context("failed to render diagnostics")?,
        Format::Json => reporter
            .json(reports)
            .context("failed to serialise diagnostics")?,
    };

    eprintln!("{rendered}");

    Ok(ExitCode::FAILURE)
}

#[cfg(test)]
mod test {
    use super::*;

    use rstest::*;

    #[rstest]
    #[case::defaults(&["buildable", "expand"], Stage::Full, 4, Format::Human)]
    #[case::markers(&["buildable", "expand", "--stage", "markers"], Stage::Markers, 4, Format::Human)]
    #[case::indent(&["buildable", "expand", "in.swift", "--indent-width", "2", "--format", "json"], Stage::Full, 2, Format::Json)]
    fn expand_arguments(
        #[case] args: &[&str],
        #[case] expected_stage: Stage,
        #[case] expected_indent: usize,
        #[case] expected_format: Format,
    ) {
        let Command::Expand {
            input,
            stage,
            indent_width,
            ..
        } = Cli::parse_from(args).command
        else {
            panic!("expected expand");
        };

        assert_eq!(stage, expected_stage);
        assert_eq!(indent_width, expected_indent);
        assert_eq!(input.format, expected_format);
    }

    #[test]
    fn check_reads_input_path() {
        let Command::Check { input } = Cli::parse_from(["buildable", "check", "Sample.swift"]).command
        else {
            panic!("expected check");
        };

        assert_eq!(input.input, Some(PathBuf::from("Sample.swift")));
    }
}
