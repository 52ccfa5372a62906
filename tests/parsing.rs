use kuddle::{
    parse, parse_with, KdlDocument, KdlErrorKind, KdlNode, KdlTransforms, KdlValue,
};
use pretty_assertions::assert_eq;

fn error_kind(src: &str) -> KdlErrorKind {
    src.parse::<KdlDocument>().unwrap_err().kind
}

#[test]
fn args_and_props() -> miette::Result<()> {
    let doc: KdlDocument = "node 1 2 three=\"hi\"".parse()?;
    assert_eq!(doc.len(), 1);
    let node = doc.get("node").unwrap();
    assert_eq!(node[0], KdlValue::Integer(1));
    assert_eq!(node[1], KdlValue::Integer(2));
    assert_eq!(node["three"], KdlValue::String("hi".into()));
    assert!(node.children().is_none());
    Ok(())
}

#[test]
fn slashdash_suppresses_one_child() -> miette::Result<()> {
    let doc: KdlDocument = "a {\n b 1\n /-c 2\n d\n}".parse()?;
    let a = doc.get("a").unwrap();
    let children = a.children().unwrap();
    let names: Vec<&str> = children.nodes().iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["b", "d"]);
    Ok(())
}

#[test]
fn type_transform_replaces_annotated_value() -> miette::Result<()> {
    let transforms = KdlTransforms::new().value("u8", |v| match v {
        KdlValue::Integer(i) if (0..=255).contains(&i) => Ok(KdlValue::Integer(i)),
        other => Err(format!("{other} is not a u8")),
    });
    let doc = parse_with("x (u8)231", &transforms)?;
    let entry = doc.get("x").unwrap().arg_entry(0).unwrap();
    assert_eq!(entry.value(), &KdlValue::Integer(231));
    // The annotation survives as metadata.
    assert_eq!(entry.ty(), Some("u8"));

    let err = parse_with("x (u8)300", &transforms).unwrap_err();
    assert!(matches!(err.kind, KdlErrorKind::TransformError(_)));
    Ok(())
}

#[test]
fn node_transform_substitutes_nodes() -> miette::Result<()> {
    let transforms = KdlTransforms::new().node("sum", |node| {
        let total: i128 = node
            .args()
            .iter()
            .map(|e| e.value().as_integer().ok_or("sum takes integers"))
            .sum::<Result<i128, &str>>()?;
        let mut out = KdlNode::new("sum");
        out.push_arg(total);
        Ok(out)
    });
    let doc = parse_with("sum 1 2 3", &transforms)?;
    assert_eq!(doc.get_arg("sum"), Some(&KdlValue::Integer(6)));

    // Slashdashed nodes are discarded without transforming.
    let doc = parse_with("/-sum oops\nsum 2 2", &transforms)?;
    assert_eq!(doc.get_arg("sum"), Some(&KdlValue::Integer(4)));
    Ok(())
}

#[test]
fn escaped_string_contains_real_newline() -> miette::Result<()> {
    let doc: KdlDocument = r#"n "line1\nline2""#.parse()?;
    assert_eq!(
        doc.get_arg("n"),
        Some(&KdlValue::String("line1\nline2".into()))
    );
    Ok(())
}

#[test]
fn raw_string_keeps_backslashes() -> miette::Result<()> {
    let doc: KdlDocument = r##"n #"raw\nnot-escaped"#"##.parse()?;
    assert_eq!(
        doc.get_arg("n"),
        Some(&KdlValue::String(r"raw\nnot-escaped".into()))
    );
    Ok(())
}

#[test]
fn underscore_next_to_base_prefix_is_malformed() {
    assert_eq!(error_kind("n 0x_FF"), KdlErrorKind::MalformedNumber);
}

#[test]
fn reserved_keyword_as_bare_node_name() {
    assert_eq!(error_kind("true"), KdlErrorKind::ReservedIdentifier);
    assert_eq!(error_kind("null 1"), KdlErrorKind::ReservedIdentifier);
    // Quoted, it's just a string name.
    let doc: KdlDocument = "\"true\" 1".parse().unwrap();
    assert_eq!(doc.nodes()[0].name(), "true");
}

#[test]
fn block_string_dedents_by_closing_line() -> miette::Result<()> {
    let doc: KdlDocument = "n \"\n    first\n    second\n    \"".parse()?;
    assert_eq!(
        doc.get_arg("n"),
        Some(&KdlValue::String("first\nsecond".into()))
    );

    // \r\n normalizes to \n inside block strings.
    let doc: KdlDocument = "n \"\r\n    a\r\n    b\r\n    \"".parse()?;
    assert_eq!(doc.get_arg("n"), Some(&KdlValue::String("a\nb".into())));
    Ok(())
}

#[test]
fn bad_block_string_indentation() {
    assert_eq!(
        error_kind("n \"\n    good\n  bad\n    \""),
        KdlErrorKind::BadBlockStringIndent
    );
}

#[test]
fn keywords_decode_to_values() -> miette::Result<()> {
    let doc: KdlDocument = "n #true #false #null #inf #-inf #nan".parse()?;
    let node = doc.get("n").unwrap();
    assert_eq!(node[0], KdlValue::Bool(true));
    assert_eq!(node[1], KdlValue::Bool(false));
    assert_eq!(node[2], KdlValue::Null);
    assert_eq!(node[3], KdlValue::Float(f64::INFINITY));
    assert_eq!(node[4], KdlValue::Float(f64::NEG_INFINITY));
    assert!(node[5].as_float().unwrap().is_nan());
    Ok(())
}

#[test]
fn number_bases_and_signs() -> miette::Result<()> {
    let doc: KdlDocument = "n 0xdead_beef 0o755 0b1010 -0x10 1.5e3 -2".parse()?;
    let node = doc.get("n").unwrap();
    assert_eq!(node[0], KdlValue::Integer(0xdeadbeef));
    assert_eq!(node[1], KdlValue::Integer(0o755));
    assert_eq!(node[2], KdlValue::Integer(10));
    assert_eq!(node[3], KdlValue::Integer(-16));
    assert_eq!(node[4], KdlValue::Float(1500.0));
    assert_eq!(node[5], KdlValue::Integer(-2));
    Ok(())
}

#[test]
fn annotations_on_nodes_and_values() -> miette::Result<()> {
    let doc: KdlDocument = r#"(widget)button (x)1 label=(loc)"ok""#.parse()?;
    let node = &doc.nodes()[0];
    assert_eq!(node.ty(), Some("widget"));
    assert_eq!(node.arg_entry(0).unwrap().ty(), Some("x"));
    assert_eq!(node.prop_entry("label").unwrap().ty(), Some("loc"));
    Ok(())
}

#[test]
fn multiline_nodes_via_continuation() -> miette::Result<()> {
    let doc: KdlDocument = "node 1 \\\n    2 \\\n    three=4".parse()?;
    let node = doc.get("node").unwrap();
    assert_eq!(node.args().len(), 2);
    assert_eq!(node["three"], KdlValue::Integer(4));
    Ok(())
}

#[test]
fn error_spans_point_into_the_source() {
    let err = "node 1 2 0x_FF".parse::<KdlDocument>().unwrap_err();
    assert_eq!(err.span.offset(), 9);
    assert_eq!(err.kind, KdlErrorKind::MalformedNumber);
}

#[test]
fn first_error_wins_and_nothing_is_returned() {
    let err = "good 1\nbad 0x\nalso-bad {".parse::<KdlDocument>().unwrap_err();
    assert_eq!(err.kind, KdlErrorKind::MalformedNumber);
}

#[test]
fn parse_entry_points_agree() -> miette::Result<()> {
    let source = "a 1 {\n b 2\n}";
    let via_fn = parse(source)?;
    let via_fromstr: KdlDocument = source.parse()?;
    let via_assoc = KdlDocument::parse(source)?;
    assert_eq!(via_fn, via_fromstr);
    assert_eq!(via_fn, via_assoc);
    Ok(())
}
