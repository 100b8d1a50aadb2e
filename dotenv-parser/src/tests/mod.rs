//! End-to-end parsing tests, grouped by topic.

mod comments;
mod round_trip;

use crate::Variables;

/// Returns the parsed variables as `(name, value)` pairs in map order.
fn pairs(variables: &Variables) -> Vec<(&str, &str)> {
    variables
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect()
}
