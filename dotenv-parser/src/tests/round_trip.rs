//! Tests that serialized variables parse back unchanged.

use crate::{Variables, format, parse};
use anyhow::Result;
use pretty_assertions::assert_eq;

fn variables(pairs: &[(&str, &str)]) -> Variables {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

#[test]
fn double_quoted_lines_parse_back() -> Result<()> {
    let original = variables(&[("A", "one"), ("B", "two words"), ("C", "x.y-z"), ("D", "")]);

    let text: String = original
        .iter()
        .map(|(name, value)| format!("{name}=\"{value}\"\n"))
        .collect();

    let parsed = parse(&text)?;
    assert_eq!(
        parsed.iter().collect::<Vec<_>>(),
        original.iter().collect::<Vec<_>>()
    );
    Ok(())
}

#[test]
fn serialized_text_parses_back() -> Result<()> {
    let cases = [
        variables(&[("EMPTY", "")]),
        variables(&[("SIMPLE", "abc"), ("NUMBER", "42")]),
        variables(&[("QUOTE", "'"), ("QUOTES", "''\"\"")]),
        variables(&[("REFS", "$A ${B} ${C:-d} \\$E")]),
        variables(&[("LINES", "a\nb\r\nc\rd\n")]),
        variables(&[("COMMENT", "value # not a comment"), ("HASH", "#")]),
        variables(&[("UNICODE", "héllo wörld ✓")]),
        variables(&[("TABS", "\ta\tb\t"), ("SPACES", "  padded  ")]),
    ];

    for original in cases {
        let text = format::to_string(&original)?;
        let parsed = parse(&text)?;
        assert_eq!(
            parsed.iter().collect::<Vec<_>>(),
            original.iter().collect::<Vec<_>>(),
            "text: {text:?}"
        );
    }
    Ok(())
}
