//! Schema binding: the building/address/person scenario plus the error
//! surface of the binder.

use std::sync::LazyLock;

use chrono::NaiveDate;
use kuddle::{
    BindErrorKind, BoundValue, DocumentSchema, KdlSchemaError, KdlValue, NodeSchema, ValueType,
};
use pretty_assertions::assert_eq;

static ADDRESS: LazyLock<NodeSchema> = LazyLock::new(|| {
    NodeSchema::builder("address")
        .argument("street", ValueType::String)
        .optional_property("city", ValueType::String, "Springfield")
        .build()
});

static PERSON: LazyLock<NodeSchema> = LazyLock::new(|| {
    NodeSchema::builder("person")
        .argument("name", ValueType::String)
        .optional_property("born", ValueType::Date, "1970-01-01")
        .build()
});

static BUILDING: LazyLock<NodeSchema> = LazyLock::new(|| {
    NodeSchema::builder("building")
        .argument("label", ValueType::String)
        .child("address", &ADDRESS)
        .children("people", [&*PERSON])
        .build()
});

static DOC: LazyLock<DocumentSchema> = LazyLock::new(|| DocumentSchema::new([&*BUILDING]));

fn bind_err(source: &str) -> BindErrorKind {
    match DOC.parse_document(source) {
        Err(KdlSchemaError::Bind(e)) => e.kind,
        Err(KdlSchemaError::Parse(e)) => panic!("expected a bind error, got parse error: {e}"),
        Ok(_) => panic!("expected a bind error, got a successful binding"),
    }
}

#[test]
fn binds_the_building_scenario() -> Result<(), KdlSchemaError> {
    let bound = DOC.parse_document(
        "building \"town hall\" {
    address \"1 main st\" city=Shelbyville
    person alice born=\"1990-05-01\"
    person bob
}",
    )?;
    let building = bound.get("building").unwrap();
    assert_eq!(
        building.get_value("label"),
        Some(&KdlValue::String("town hall".into()))
    );

    let address = building.get("address").unwrap().as_node().unwrap();
    assert_eq!(
        address.get_value("street"),
        Some(&KdlValue::String("1 main st".into()))
    );
    assert_eq!(
        address.get_value("city"),
        Some(&KdlValue::String("Shelbyville".into()))
    );

    let people = building.get("people").unwrap().as_nodes().unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(
        people[0].get("born").unwrap().as_date(),
        Some(NaiveDate::from_ymd_opt(1990, 5, 1).unwrap())
    );
    // bob got the default.
    assert_eq!(
        people[1].get("born").unwrap().as_date(),
        Some(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
    );
    Ok(())
}

#[test]
fn missing_argument() {
    let kind = bind_err("building \"x\" {\n    address\n    person a\n}");
    assert_eq!(
        kind,
        BindErrorKind::MissingArgument {
            node: "address".into(),
            field: "street".into()
        }
    );
}

#[test]
fn missing_child() {
    let kind = bind_err("building \"x\" {\n    person a\n}");
    assert_eq!(
        kind,
        BindErrorKind::MissingChild {
            node: "building".into(),
            child: "address".into()
        }
    );
}

#[test]
fn duplicate_child() {
    let kind = bind_err(
        "building \"x\" {\n    address \"a\"\n    address \"b\"\n    person a\n}",
    );
    assert_eq!(
        kind,
        BindErrorKind::DuplicateChild {
            node: "building".into(),
            child: "address".into()
        }
    );
}

#[test]
fn unexpected_child_unless_catch_all() {
    let kind = bind_err("building \"x\" {\n    address \"a\"\n    garage\n}");
    assert_eq!(
        kind,
        BindErrorKind::UnexpectedChild {
            node: "building".into(),
            child: "garage".into()
        }
    );

    // The same document binds once the class declares an OtherChildren slot.
    let lenient_building = NodeSchema::builder("building")
        .argument("label", ValueType::String)
        .child("address", &ADDRESS)
        .children("people", [&*PERSON])
        .other_children("rest")
        .build();
    let schema = DocumentSchema::new([&lenient_building]);
    let bound = schema
        .parse_document("building \"x\" {\n    address \"a\"\n    garage\n}")
        .unwrap();
    let rest = bound.roots()[0].get("rest").unwrap().as_raw_nodes().unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].name(), "garage");
}

#[test]
fn unknown_top_level_node() {
    let kind = bind_err("shed \"x\"");
    assert_eq!(kind, BindErrorKind::UnknownNode("shed".into()));

    let lenient = DocumentSchema::new([&*BUILDING]).allow_other_children();
    let bound = lenient.parse_document("shed \"x\"").unwrap();
    assert!(bound.roots().is_empty());
    assert_eq!(bound.extras().len(), 1);
}

#[test]
fn extra_argument_and_property() {
    let kind = bind_err(
        "building \"x\" extra {\n    address \"a\"\n}",
    );
    assert_eq!(kind, BindErrorKind::ExtraArgument { node: "building".into() });

    let kind = bind_err(
        "building \"x\" color=red {\n    address \"a\"\n}",
    );
    assert_eq!(
        kind,
        BindErrorKind::ExtraProperty {
            node: "building".into(),
            key: "color".into()
        }
    );
}

#[test]
fn catch_all_arguments_and_properties() {
    let tag = NodeSchema::builder("tag")
        .argument("name", ValueType::String)
        .other_arguments("values")
        .other_properties("attrs")
        .build();
    let schema = DocumentSchema::new([&tag]);
    let bound = schema.parse_document("tag heading 1 2 3 a=1 b=2").unwrap();
    let node = &bound.roots()[0];
    assert_eq!(
        node.get("values").unwrap().as_values().unwrap(),
        &[1.into(), 2.into(), 3.into()]
    );
    let attrs = node.get("attrs").unwrap().as_map().unwrap();
    assert_eq!(
        attrs.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );
}

#[test]
fn coercions() {
    let gauge = NodeSchema::builder("gauge")
        .argument("reading", ValueType::Float)
        .property("at", ValueType::DateTime)
        .build();
    let schema = DocumentSchema::new([&gauge]);

    // Integer widens to float.
    let bound = schema
        .parse_document("gauge 42 at=\"2024-06-01T12:30:00\"")
        .unwrap();
    let node = &bound.roots()[0];
    assert_eq!(node.get_value("reading"), Some(&KdlValue::Float(42.0)));
    assert!(node.get("at").unwrap().as_date_time().is_some());

    // A bool does not.
    let err = match schema.parse_document("gauge #true at=\"2024-06-01T12:30:00\"") {
        Err(KdlSchemaError::Bind(e)) => e,
        other => panic!("expected a bind error, got {other:?}"),
    };
    assert_eq!(
        err.kind,
        BindErrorKind::TypeMismatch {
            node: "gauge".into(),
            field: "reading".into(),
            expected: "a float",
            found: "a boolean"
        }
    );

    // A string that is not a date fails the same way.
    let err = match schema.parse_document("gauge 1.0 at=\"whenever\"") {
        Err(KdlSchemaError::Bind(e)) => e.kind,
        other => panic!("expected a bind error, got {other:?}"),
    };
    assert!(matches!(err, BindErrorKind::TypeMismatch { .. }));
}

#[test]
fn bound_graph_serializes_back_to_kdl() -> Result<(), KdlSchemaError> {
    let source = "building \"town hall\" {
    address \"1 main st\"
    person alice born=\"1990-05-01\"
}";
    let bound = DOC.parse_document(source)?;
    let emitted = bound.to_document().to_string();
    // Defaults get materialized, so re-binding the emitted text must agree.
    let rebound = DOC.parse_document(&emitted)?;
    assert_eq!(bound.roots(), rebound.roots());
    Ok(())
}

#[test]
fn node_schema_parses_single_nodes() {
    let bound = PERSON.parse_node("person carol").unwrap();
    assert_eq!(bound.class(), "person");
    assert_eq!(
        bound.get_value("name"),
        Some(&KdlValue::String("carol".into()))
    );
    // Optional property default applied.
    assert_eq!(
        bound.get("born").unwrap(),
        &BoundValue::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
    );
}
