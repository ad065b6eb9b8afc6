#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_cbor::Value;

use peergrant_core::{Access, AccessGrant, ObjectPath};

fn ints(ids: &[i128]) -> Value {
    Value::Array(ids.iter().map(|i| Value::Integer(*i)).collect())
}

#[test]
fn builds_object_and_instance_paths() {
    let g = AccessGrant::from_cbor(&ints(&[3]), &Value::Integer(16)).unwrap();
    assert_eq!(g.path(), ObjectPath::object(3));
    assert!(g.has_create());
    assert!(!g.lacks_required_instance());

    let g = AccessGrant::from_cbor(&ints(&[3, 0]), &Value::Integer(3)).unwrap();
    assert_eq!(g.path(), ObjectPath::instance(3, 0));
    assert!(g.has_read() && g.has_write());
    assert!(!g.has_execute() && !g.has_delete() && !g.has_discover());
}

#[test]
fn rejects_malformed_ids() {
    let mask = Value::Integer(1);
    assert!(AccessGrant::from_cbor(&ints(&[]), &mask).is_err());
    assert!(AccessGrant::from_cbor(&ints(&[1, 2, 3]), &mask).is_err());
    assert!(AccessGrant::from_cbor(&Value::Integer(3), &mask).is_err());
    assert!(AccessGrant::from_cbor(&Value::Array(vec![Value::Text("3".into())]), &mask).is_err());
    assert!(AccessGrant::from_cbor(&Value::Array(vec![Value::Float(3.0)]), &mask).is_err());
    assert!(AccessGrant::from_cbor(&ints(&[-3]), &mask).is_err());
}

#[test]
fn rejects_malformed_masks() {
    assert!(AccessGrant::from_cbor(&ints(&[3, 0]), &Value::Integer(-1)).is_err());
    assert!(AccessGrant::from_cbor(&ints(&[3, 0]), &Value::Integer(70_000)).is_err());
    assert!(AccessGrant::from_cbor(&ints(&[3, 0]), &Value::Bool(true)).is_err());
    // Bits above discover are undefined.
    assert!(AccessGrant::from_cbor(&ints(&[3, 0]), &Value::Integer(0x40)).is_err());
    assert!(AccessGrant::from_cbor(&ints(&[3, 0]), &Value::Integer(0xFFFF)).is_err());

    let all = AccessGrant::from_cbor(&ints(&[3, 0]), &Value::Integer(0x3F)).unwrap();
    assert_eq!(all.access(), Access::ALL);
}

#[test]
fn instance_scoped_rights_need_an_instance() {
    for a in [Access::READ, Access::WRITE, Access::EXECUTE, Access::DELETE] {
        let g = AccessGrant::new(ObjectPath::object(5), a | Access::DISCOVER);
        assert!(g.lacks_required_instance(), "access={a}");
    }
    let g = AccessGrant::new(ObjectPath::object(5), Access::CREATE | Access::DISCOVER);
    assert!(!g.lacks_required_instance());
    let g = AccessGrant::new(ObjectPath::instance(5, 1), Access::READ);
    assert!(!g.lacks_required_instance());
}

#[test]
fn path_parsing_and_display() {
    assert_eq!(ObjectPath::parse("/21/4").unwrap(), ObjectPath::instance(21, 4));
    assert_eq!(ObjectPath::parse("11001").unwrap(), ObjectPath::object(11001));
    assert_eq!(ObjectPath::instance(3, 0).to_string(), "/3/0");
    assert!(ObjectPath::parse("/3/0/1").is_err());
    assert!(ObjectPath::parse("/").is_err());
    assert!(ObjectPath::parse("/x/1").is_err());
}

#[test]
fn access_display_lists_rights() {
    assert_eq!((Access::READ | Access::WRITE).to_string(), "READ|WRITE");
    assert_eq!(Access::NONE.to_string(), "NONE");
}
