//! Expansion of `$NAME`, `${NAME}`, `${NAME:-default}` and `${NAME:=default}` references.
//!
//! A reference is found by locating a `$` (not followed by `(`) together with the run of
//! backslashes immediately before it, then reading an optional `{`, an optional name, an
//! optional default-value suffix, and an optional `}` as discrete steps.

use crate::Variables;
use crate::context::ParseContext;
use crate::error::FormatErrorKind;
use crate::trace_categories;

/// Characters that may not appear in the default text of a reference.
const UNSUPPORTED_DEFAULT_CHARS: [char; 4] = ['\'', '"', '{', '$'];

/// The default-value suffix of a reference.
#[derive(Clone, Debug, PartialEq, Eq)]
struct DefaultValue<'a> {
    /// Whether the suffix was `:=` (assign) rather than `:-` (use).
    assign: bool,
    /// The default text, without the operator.
    text: &'a str,
}

/// A single `$` reference located in a fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Reference<'a> {
    /// Count of backslashes immediately before the `$`.
    backslashes: usize,
    opening_brace: bool,
    name: Option<&'a str>,
    default: Option<DefaultValue<'a>>,
    closing_brace: bool,
    /// The matched text, starting at the `$`.
    text: &'a str,
}

/// Returns the length of the variable name at the start of `text`, or 0 if there is none.
pub(crate) fn variable_name_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    if !bytes.first().is_some_and(u8::is_ascii_alphabetic) {
        return 0;
    }

    1 + bytes[1..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}

/// Reads the reference whose `$` sits at `dollar`.
fn scan_reference(fragment: &str, dollar: usize, backslashes: usize) -> Reference<'_> {
    let bytes = fragment.as_bytes();
    let mut end = dollar + 1;

    let opening_brace = bytes.get(end) == Some(&b'{');
    if opening_brace {
        end += 1;
    }

    let name_len = variable_name_len(&fragment[end..]);
    let name = (name_len > 0).then(|| &fragment[end..end + name_len]);
    end += name_len;

    // The default text must be at least one character long.
    let has_default = bytes.get(end) == Some(&b':')
        && matches!(bytes.get(end + 1), Some(b'-' | b'='))
        && !matches!(bytes.get(end + 2), None | Some(b'}'));
    let default = if has_default {
        let assign = bytes[end + 1] == b'=';
        let text_start = end + 2;
        let text_end = fragment[text_start..]
            .find('}')
            .map_or(fragment.len(), |index| text_start + index);
        end = text_end;

        Some(DefaultValue {
            assign,
            text: &fragment[text_start..text_end],
        })
    } else {
        None
    };

    let closing_brace = bytes.get(end) == Some(&b'}');
    if closing_brace {
        end += 1;
    }

    Reference {
        backslashes,
        opening_brace,
        name,
        default,
        closing_brace,
        text: &fragment[dollar..end],
    }
}

/// Expands every unescaped reference in `fragment`.
///
/// `:=` defaults are written into `values` so that later references observe them.
///
/// # Arguments
///
/// * `fragment` - The text to expand.
/// * `context` - External values available to the expansion.
/// * `values` - Variables assigned so far in the current parse.
pub(crate) fn resolve_variables(
    fragment: &str,
    context: &ParseContext<'_>,
    values: &mut Variables,
) -> Result<String, FormatErrorKind> {
    if !fragment.contains('$') {
        return Ok(fragment.to_owned());
    }

    let bytes = fragment.as_bytes();
    let mut output = String::with_capacity(fragment.len());
    let mut literal_start = 0;
    let mut index = 0;

    while index < bytes.len() {
        let run_start = index;
        while index < bytes.len() && bytes[index] == b'\\' {
            index += 1;
        }

        if bytes.get(index) == Some(&b'$') && bytes.get(index + 1) != Some(&b'(') {
            output.push_str(&fragment[literal_start..run_start]);

            let reference = scan_reference(fragment, index, index - run_start);
            expand_reference(&reference, context, values, &mut output)?;

            index += reference.text.len();
            literal_start = index;
        } else if index == run_start {
            index += 1;
        }
    }

    output.push_str(&fragment[literal_start..]);

    Ok(output)
}

fn expand_reference(
    reference: &Reference<'_>,
    context: &ParseContext<'_>,
    values: &mut Variables,
    output: &mut String,
) -> Result<(), FormatErrorKind> {
    // An odd run of backslashes escapes the `$`.
    if reference.backslashes % 2 == 1 {
        output.push_str(&"\\".repeat(reference.backslashes - 1));
        output.push_str(reference.text);
        return Ok(());
    }

    if reference.opening_brace && !reference.closing_brace {
        return Err(FormatErrorKind::UnclosedBraces);
    }

    let Some(name) = reference.name else {
        output.push_str(&"\\".repeat(reference.backslashes));
        output.push_str(reference.text);
        return Ok(());
    };

    let (resolved, resolved_from) = context.resolve(name, values);
    let mut value = resolved.into_owned();

    tracing::debug!(
        target: trace_categories::EXPANSION,
        "resolved ${name} from {resolved_from:?}"
    );

    if value.is_empty() {
        if let Some(default) = &reference.default {
            let unsupported = default
                .text
                .chars()
                .find(|c| UNSUPPORTED_DEFAULT_CHARS.contains(c));
            if let Some(character) = unsupported {
                return Err(FormatErrorKind::UnsupportedDefaultCharacter {
                    name: name.to_owned(),
                    character,
                });
            }

            default.text.clone_into(&mut value);

            if default.assign {
                tracing::debug!(
                    target: trace_categories::EXPANSION,
                    "assigning default value to ${name}"
                );
                values.insert(name.to_owned(), value.clone());
            }
        }
    }

    // A `}` without a matching `{` is ordinary text.
    if !reference.opening_brace && reference.closing_brace {
        value.push('}');
    }

    output.push_str(&"\\".repeat(reference.backslashes));
    output.push_str(&value);

    Ok(())
}
