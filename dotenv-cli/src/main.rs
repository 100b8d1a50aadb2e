//! Implements the command-line interface for `dotenv-parse`.

mod args;
mod events;
mod loader;
mod output;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use dotenv_parser::ProcessEnvironment;

use crate::args::CommandLineArgs;
use crate::loader::{LoadError, Loader};

/// Represents an error that stops the run.
#[derive(Debug, thiserror::Error)]
enum Error {
    /// A file could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The merged variables could not be rendered.
    #[error(transparent)]
    Output(#[from] output::OutputError),

    /// The rendered output could not be written.
    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),
}

/// Main entry point for `dotenv-parse`.
fn main() -> ExitCode {
    let args = match CommandLineArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();

            // clap returns errors for `--help` and `--version` too.
            return match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    ExitCode::SUCCESS
                }
                _ => ExitCode::FAILURE,
            };
        }
    };

    let event_config = events::TraceEventConfig::init(&args.enabled_log_events);
    tracing::debug!(target: "load", "enabled events: {:?}", event_config.enabled_events());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Loads every requested file in order and prints the merged variables.
///
/// # Arguments
///
/// * `args` - The parsed command-line arguments.
fn run(args: &CommandLineArgs) -> Result<(), Error> {
    let process_environment = ProcessEnvironment;
    let mut loader = Loader::new(args.override_existing);
    if args.process_env {
        loader = loader.with_external(&process_environment);
    }

    for (name, value) in &args.assignments {
        loader.preset(name.clone(), value.clone());
    }

    for path in &args.files {
        loader.load(path)?;
    }

    tracing::debug!(target: "load", "loaded names: {}", loader.loaded().to_list());

    let rendered = output::render(&loader.into_environment(), args.format)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;

    Ok(())
}

fn report_error(err: &Error) {
    eprintln!("error: {err}");

    if let Error::Load(LoadError::Parse {
        path,
        source,
        details,
    }) = err
    {
        eprintln!(
            " --> {}:{}:{}",
            path.display(),
            source.position.line,
            source.position.column
        );
        eprintln!("{details}");
    }
}
