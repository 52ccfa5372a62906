//! Canonical KDL text output.
//!
//! Everything here writes through `std::fmt::Write`, so the `Display` impls
//! on the document types are thin wrappers. The output is "canonical": one
//! node per line, four-space indentation, arguments before properties,
//! strings in the simplest shape that represents them.

use std::fmt::{self, Write};

use crate::chars::{self, is_bare_identifier};
use crate::{KdlDocument, KdlEntry, KdlNode, KdlValue};

/// How many escapes a single-line string must need before the raw form
/// reads better than the escaped one.
const RAW_STRING_THRESHOLD: usize = 3;

/// Writes a node or property name: bare if possible, quoted otherwise.
pub(crate) fn write_ident(f: &mut impl Write, s: &str) -> fmt::Result {
    if is_bare_identifier(s) {
        f.write_str(s)
    } else {
        write_quoted(f, s)
    }
}

/// Writes a string value in whichever shape suits its content: bare
/// identifier, ordinary quoted, raw, or multi-line.
pub(crate) fn write_string(f: &mut impl Write, s: &str) -> fmt::Result {
    if is_bare_identifier(s) {
        return f.write_str(s);
    }

    let mut quotish = 0usize; // '"' and '\\': fine in raw strings
    let mut newlines = 0usize; // '\n': fine in multi-line strings
    let mut hard = 0usize; // everything else that must be escaped
    for c in s.chars() {
        match c {
            '"' | '\\' => quotish += 1,
            '\n' => newlines += 1,
            c if chars::is_newline(c) || chars::is_disallowed(c) => hard += 1,
            _ => {}
        }
    }

    if hard == 0 && newlines == 0 && quotish >= RAW_STRING_THRESHOLD {
        return write_raw(f, s);
    }
    if hard == 0 && newlines > 0 && block_representable(s) {
        if quotish == 0 {
            return write_block(f, s);
        }
        return write_block_raw(f, s);
    }
    write_quoted(f, s)
}

/// An ordinary `"…"` string with escapes.
fn write_quoted(f: &mut impl Write, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '\\' | '"' => write!(f, "\\{}", c)?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{08}' => f.write_str("\\b")?,
            '\u{0C}' => f.write_str("\\f")?,
            c if chars::is_newline(c) || chars::is_disallowed(c) => {
                write!(f, "\\u{{{:x}}}", c as u32)?
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

/// Number of `#`s needed so that no `"` in the content can close the string.
fn hash_count(s: &str) -> usize {
    let mut max = 0usize;
    let mut run = None::<usize>;
    for c in s.chars() {
        match (c, run) {
            ('"', _) => run = Some(0),
            ('#', Some(n)) => {
                run = Some(n + 1);
                max = max.max(n + 1);
            }
            _ => run = None,
        }
    }
    max + 1
}

/// A single-line raw string: `#"…"#`.
fn write_raw(f: &mut impl Write, s: &str) -> fmt::Result {
    let hashes = "#".repeat(hash_count(s));
    write!(f, "{hashes}\"{s}\"{hashes}")
}

/// Multi-line form only round-trips when no line is whitespace-only but
/// non-empty (such lines dedent to empty on re-parse).
fn block_representable(s: &str) -> bool {
    s.split('\n')
        .all(|line| line.is_empty() || !line.chars().all(chars::is_unicode_space))
}

/// A multi-line quoted string. The closing quote sits at column zero, so no
/// dedent prefix applies.
fn write_block(f: &mut impl Write, s: &str) -> fmt::Result {
    f.write_str("\"\n")?;
    f.write_str(s)?;
    f.write_str("\n\"")
}

/// A multi-line raw string.
fn write_block_raw(f: &mut impl Write, s: &str) -> fmt::Result {
    let hashes = "#".repeat(hash_count(s));
    write!(f, "{hashes}\"\n{s}\n\"{hashes}")
}

/// Writes a single value literal.
pub(crate) fn write_value(f: &mut impl Write, value: &KdlValue) -> fmt::Result {
    match value {
        KdlValue::String(s) => write_string(f, s),
        KdlValue::Integer(i) => write!(f, "{}", i),
        KdlValue::Float(v) if v.is_nan() => f.write_str("#nan"),
        KdlValue::Float(v) if *v == f64::INFINITY => f.write_str("#inf"),
        KdlValue::Float(v) if *v == f64::NEG_INFINITY => f.write_str("#-inf"),
        // {:?} is shortest-round-trip and always keeps a '.' or exponent,
        // so the text re-parses as a float.
        KdlValue::Float(v) => write!(f, "{:?}", v),
        KdlValue::Bool(b) => write!(f, "#{}", b),
        KdlValue::Null => f.write_str("#null"),
    }
}

/// Writes an entry: `(ty)` prefix, then the value.
pub(crate) fn write_entry(f: &mut impl Write, entry: &KdlEntry) -> fmt::Result {
    if let Some(ty) = entry.ty() {
        f.write_char('(')?;
        write_ident(f, ty)?;
        f.write_char(')')?;
    }
    write_value(f, entry.value())
}

/// Writes one node at the given indent depth (four spaces per level).
pub(crate) fn write_node(f: &mut impl Write, node: &KdlNode, indent: usize) -> fmt::Result {
    if let Some(ty) = node.ty() {
        f.write_char('(')?;
        write_ident(f, ty)?;
        f.write_char(')')?;
    }
    write_ident(f, node.name())?;
    for arg in node.args() {
        f.write_char(' ')?;
        write_entry(f, arg)?;
    }
    for (key, entry) in node.props() {
        f.write_char(' ')?;
        write_ident(f, key)?;
        f.write_char('=')?;
        write_entry(f, entry)?;
    }
    if let Some(children) = node.children() {
        f.write_str(" {\n")?;
        for child in children.nodes() {
            write!(f, "{:width$}", "", width = (indent + 1) * 4)?;
            write_node(f, child, indent + 1)?;
            f.write_char('\n')?;
        }
        write!(f, "{:width$}}}", "", width = indent * 4)?;
    }
    Ok(())
}

/// Writes a whole document, one top-level node per line.
pub(crate) fn write_document(f: &mut impl Write, doc: &KdlDocument) -> fmt::Result {
    for node in doc.nodes() {
        write_node(f, node, 0)?;
        f.write_char('\n')?;
    }
    Ok(())
}
