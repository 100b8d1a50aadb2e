use std::path::PathBuf;

use clap::{Parser, builder::styling};

use crate::events;

const SHORT_DESCRIPTION: &str = "Parse and merge dotenv files";

const LONG_DESCRIPTION: &str = r"
dotenv-parse reads one or more dotenv files in order, resolves variable references across
them, and prints the merged variables.

The real process environment is never modified.
";

/// Format in which the merged variables are written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// One `NAME=value` declaration per line, quoted as needed.
    #[default]
    Dotenv,
    /// A JSON object, in declaration order.
    Json,
    /// One variable name per line.
    Names,
}

/// Parsed command-line arguments for dotenv-parse.
#[derive(Parser)]
#[clap(name = "dotenv-parse",
       version,
       about = SHORT_DESCRIPTION,
       long_about = LONG_DESCRIPTION,
       styles = help_styles())]
pub(crate) struct CommandLineArgs {
    /// Files to load, in order.
    #[clap(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Let files overwrite variables set before loading, such as `--set` values.
    #[clap(long = "override")]
    pub override_existing: bool,

    /// Output format.
    #[clap(long = "format", value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Resolve references against the process environment as well.
    #[clap(long = "process-env")]
    pub process_env: bool,

    /// Pre-apply a variable before any file is loaded.
    #[clap(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(String, String)>,

    /// Enable debug logging for classes of tracing events.
    #[clap(long = "log-enable", value_name = "EVENT")]
    pub enabled_log_events: Vec<events::TraceEvent>,
}

fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if dotenv_parser::is_valid_name(name) => {
            Ok((name.to_owned(), value.to_owned()))
        }
        Some((name, _)) if !name.is_empty() => Err(format!("invalid variable name '{name}'")),
        _ => Err(format!("expected NAME=VALUE, found '{arg}'")),
    }
}

/// Returns clap styling to be used for command-line help.
fn help_styles() -> clap::builder::Styles {
    styling::Styles::styled()
        .header(
            styling::AnsiColor::Yellow.on_default()
                | styling::Effects::BOLD
                | styling::Effects::UNDERLINE,
        )
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Magenta.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default())
}
