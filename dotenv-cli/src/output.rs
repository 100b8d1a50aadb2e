//! Rendering of the merged variables.

use dotenv_parser::{SerializeError, Variables, format};

use crate::args::OutputFormat;

/// Represents an error that occurred while rendering output.
#[derive(Debug, thiserror::Error)]
pub(crate) enum OutputError {
    /// The variables could not be written as dotenv text.
    #[error(transparent)]
    Dotenv(#[from] SerializeError),

    /// The variables could not be written as JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Renders variables in the requested format.
pub(crate) fn render(
    variables: &Variables,
    output_format: OutputFormat,
) -> Result<String, OutputError> {
    match output_format {
        OutputFormat::Dotenv => Ok(format::to_string(variables)?),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(variables)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Names => Ok(variables.keys().map(|name| format!("{name}\n")).collect()),
    }
}
