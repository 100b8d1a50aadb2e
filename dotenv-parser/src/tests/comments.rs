//! Tests for comments, blank lines, and declaration layout.

use super::pairs;
use crate::parse;
use anyhow::Result;
use pretty_assertions::assert_eq;

#[test]
fn trailing_comment() -> Result<()> {
    let variables = parse("FOO=bar # trailing comment\n")?;
    assert_eq!(pairs(&variables), vec![("FOO", "bar")]);
    Ok(())
}

#[test]
fn comment_only_lines_contribute_nothing() -> Result<()> {
    assert!(parse("# comment\n")?.is_empty());
    assert!(parse("# comment")?.is_empty());

    let variables = parse("# first\nA=1\n   # indented\n\n# last\nB=2\n# end")?;
    assert_eq!(pairs(&variables), vec![("A", "1"), ("B", "2")]);
    Ok(())
}

#[test]
fn hash_without_preceding_blank_is_part_of_value() -> Result<()> {
    let variables = parse("COLOR=x#fff\nTAG=a#b\nBARE=#fff\n")?;
    assert_eq!(
        pairs(&variables),
        vec![("COLOR", "x#fff"), ("TAG", "a#b"), ("BARE", "")]
    );
    Ok(())
}

#[test]
fn comment_after_quoted_value() -> Result<()> {
    let variables = parse("A=\"x y\" # note\nB='z'\t# note\n")?;
    assert_eq!(pairs(&variables), vec![("A", "x y"), ("B", "z")]);
    Ok(())
}

#[test]
fn comment_in_place_of_value() -> Result<()> {
    let variables = parse("A=   # nothing\nB=#also nothing\nC=3")?;
    assert_eq!(pairs(&variables), vec![("A", ""), ("B", ""), ("C", "3")]);
    Ok(())
}

#[test]
fn indented_declarations_and_blank_lines() -> Result<()> {
    let variables = parse("\n\n  A=1\n\t\tB=2\n\n\n")?;
    assert_eq!(pairs(&variables), vec![("A", "1"), ("B", "2")]);
    Ok(())
}

#[test]
fn export_prefix() -> Result<()> {
    let variables = parse("export FOO=bar\nexport\tBAZ=qux\n")?;
    assert_eq!(pairs(&variables), vec![("FOO", "bar"), ("BAZ", "qux")]);
    Ok(())
}

#[test]
fn export_as_a_name() -> Result<()> {
    let variables = parse("export=1\nexportFOO=2\n")?;
    assert_eq!(pairs(&variables), vec![("export", "1"), ("exportFOO", "2")]);
    Ok(())
}

#[test]
fn names_are_case_sensitive() -> Result<()> {
    let variables = parse("foo=1\nFOO=2\nFoo_9=3\n")?;
    assert_eq!(
        pairs(&variables),
        vec![("foo", "1"), ("FOO", "2"), ("Foo_9", "3")]
    );
    Ok(())
}

#[test]
fn plain_values() -> Result<()> {
    let names = ["A", "abc", "Z9", "snake_case_NAME"];
    let values = ["x", "0", "some-value", "a.b/c:d@e,f+g%h=i", "ünïcødé"];

    for name in names {
        for value in values {
            let variables = parse(&format!("{name}={value}\n"))?;
            assert_eq!(pairs(&variables), vec![(name, value)]);
        }
    }
    Ok(())
}
