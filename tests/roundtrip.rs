//! The emitter contract: canonical output re-parses to an equal document,
//! emitting is idempotent, property order is preserved, and slashdash only
//! removes what it marks.

use kuddle::KdlDocument;
use pretty_assertions::assert_eq;

const CORPUS: &[&str] = &[
    "",
    "node",
    "node 1 2 three=\"hi\"",
    "a {\n    b 1\n    c two=2\n}",
    "deep {\n    er {\n        est 1 2 3\n    }\n}",
    "empty-children {\n}",
    "types #true #false #null #inf #-inf #nan",
    "floats 1.5 -0.25 1e100 1.0e-3",
    "ints 0xff 0o17 0b101 -12 1_000",
    "(widget)button (u8)1 label=(loc)\"ok\"",
    "\"quoted name\" \"key with spaces\"=1",
    "strings \"with \\\"escapes\\\"\" \"tab\\there\"",
    "raw #\"c:\\path\\to\\thing\"#",
    "multi \"\nline one\nline two\n\"",
    "unicode häuschen größe=1 ノード \"🌻\"",
    "props a=1 b=2 a=3",
    "sign-idents - -- -foo +bar",
    "dotted .well-known 1",
];

fn reparse(doc: &KdlDocument) -> KdlDocument {
    doc.to_string()
        .parse()
        .unwrap_or_else(|e| panic!("canonical output failed to re-parse: {e}\n---\n{doc}"))
}

#[test]
fn semantic_round_trip() {
    for src in CORPUS {
        let parsed: KdlDocument = src.parse().unwrap();
        assert_eq!(reparse(&parsed), parsed, "round-trip failed for {src:?}");
    }
}

#[test]
fn emit_is_idempotent() {
    for src in CORPUS {
        let parsed: KdlDocument = src.parse().unwrap();
        let once = parsed.to_string();
        let twice = reparse(&parsed).to_string();
        assert_eq!(once, twice, "emit not idempotent for {src:?}");
    }
}

#[test]
fn canonical_shape() {
    let doc: KdlDocument = "a   1    b=2 {  c ;  d  }".parse().unwrap();
    assert_eq!(doc.to_string(), "a 1 b=2 {\n    c\n    d\n}\n");
}

#[test]
fn property_order_is_last_occurrence() {
    let doc: KdlDocument = "n first=1 second=2 first=3".parse().unwrap();
    let node = &doc.nodes()[0];
    let keys: Vec<&str> = node.props().keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["second", "first"]);
    assert_eq!(node["first"], 3.into());
    // And the canonical output writes them in that surviving order.
    assert_eq!(doc.to_string(), "n second=2 first=3\n");
}

#[test]
fn slashdash_locality() {
    // Each pair: source with a slashdashed element, and the same source
    // with the element (and its slashdash) deleted outright.
    let pairs: &[(&str, &str)] = &[
        ("a 1 /-2 3", "a 1 3"),
        ("/-gone\nkept 1", "kept 1"),
        ("a /-name=1 other=2", "a other=2"),
        ("a 1 /-{\n x\n}", "a 1"),
        ("a {\n b\n /-c 1\n d\n}", "a {\n b\n d\n}"),
        ("a /-{\n x\n} {\n y\n}", "a {\n y\n}"),
    ];
    for (with, without) in pairs {
        let with: KdlDocument = with.parse().unwrap();
        let without: KdlDocument = without.parse().unwrap();
        assert_eq!(with, without);
    }
}

#[test]
fn structural_equality_ignores_layout() {
    let compact: KdlDocument = "a 1 b=2 {c;d}".parse().unwrap();
    let spread: KdlDocument = "a   1  b = 2 {\n    c\n    d\n}\n".parse().unwrap();
    let continued: KdlDocument = "a 1 \\\n  b=2 \\\n{\n c\n d\n}".parse().unwrap();
    assert_eq!(compact, spread);
    assert_eq!(compact, continued);
}

#[test]
fn multiline_strings_round_trip() {
    for s in [
        "one\ntwo",
        "ends with newline\n",
        "\nstarts with one",
        "quotes \"inside\"\nand lines",
        "a\n  \nb", // whitespace-only interior line: quoted form
    ] {
        let mut node = kuddle::KdlNode::new("n");
        node.push_arg(s);
        let mut doc = KdlDocument::new();
        doc.push(node);
        let reparsed: KdlDocument = doc.to_string().parse().unwrap();
        assert_eq!(
            reparsed.get_arg("n"),
            Some(&s.into()),
            "string {s:?} did not survive"
        );
    }
}
