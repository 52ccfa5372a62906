use kuddle::{KdlDocument, KdlValue, PickError};
use pretty_assertions::assert_eq;

fn fixture() -> KdlDocument {
    "config {
    server host=localhost port=8080 {
        tls enabled=#true
    }
    user alice uid=1
    user bob uid=2
}
config {
    server host=fallback port=9090
}"
    .parse()
    .unwrap()
}

#[test]
fn slash_descends_through_all_matches() {
    let doc = fixture();
    let servers = &doc / "config" / "server";
    assert_eq!(servers.len(), 2);
    assert_eq!(
        servers.props("host").unwrap(),
        vec![&KdlValue::String("localhost".into()), &KdlValue::String("fallback".into())]
    );

    let users = &doc / "config" / "user";
    assert_eq!(users.len(), 2);
    assert_eq!(
        users.args(0).unwrap(),
        vec![&KdlValue::String("alice".into()), &KdlValue::String("bob".into())]
    );
    // Projection fails as a whole if any node lacks the key.
    assert_eq!(users.props("missing"), None);

    let none = &doc / "config" / "nothing";
    assert!(none.is_empty());
}

#[test]
fn one_is_strict() {
    let doc = fixture();
    assert_eq!(
        doc.one("config"),
        Err(PickError::Ambiguous {
            name: "config".into(),
            count: 2
        })
    );
    assert_eq!(doc.one("server"), Err(PickError::NotFound("server".into())));

    let first_config = (&doc / "config").get(0).unwrap();
    let server = first_config.one("server").unwrap();
    assert_eq!(server["port"], KdlValue::Integer(8080));
    assert_eq!(server.one("tls").unwrap()["enabled"], KdlValue::Bool(true));
}

#[test]
fn descendants_cover_every_depth() {
    let doc = fixture();
    assert_eq!(doc.descendants("tls").len(), 1);
    assert_eq!(doc.descendants("server").len(), 2);
    assert_eq!(doc.descendants("config").len(), 2);
}

#[test]
fn node_indexing() {
    let doc = fixture();
    let user = (&doc / "config" / "user").get(0).unwrap();
    assert_eq!(user[0], KdlValue::String("alice".into()));
    assert_eq!(user["uid"], KdlValue::Integer(1));
}
