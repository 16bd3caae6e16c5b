#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::display::format_number;
use super::*;

#[test]
fn truthiness_table() {
    assert!(!Value::Number(0.0).is_truthy());
    assert!(!Value::Number(-0.0).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(Value::Number(f64::NAN).is_truthy());
    assert!(Value::from("0").is_truthy());
    assert!(Value::array(vec![]).is_truthy());
    assert!(Value::map(FxHashMap::default()).is_truthy());
}

#[test]
fn number_formatting() {
    assert_eq!(format_number(3.0), "3");
    assert_eq!(format_number(-0.0), "0");
    assert_eq!(format_number(2.5), "2.5");
    assert_eq!(format_number(f64::NAN), "NaN");
    assert_eq!(format_number(f64::INFINITY), "Infinity");
    assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
}

#[test]
fn display_is_raw_at_top_level_and_quoted_inside() {
    let v = Value::array(vec![Value::from("a\"b"), Value::Number(1.0), Value::Null]);
    assert_eq!(Value::from("hi").to_string(), "hi");
    assert_eq!(Value::from("hi").inspect(), "\"hi\"");
    assert_eq!(v.to_string(), r#"["a\"b", 1, null]"#);
}

#[test]
fn maps_render_with_sorted_keys() {
    let v = Value::map_from([("b", Value::Bool(true)), ("a", Value::Number(1.0))]);
    assert_eq!(v.inspect(), r#"{"a": 1, "b": true}"#);
}

#[test]
fn self_referential_array_renders_placeholder() {
    let arr = Value::array(vec![Value::Number(1.0)]);
    if let Value::Array(items) = &arr {
        items.write().push(arr.clone());
    }
    assert_eq!(arr.inspect(), "[1, [...]]");
}

#[test]
fn shared_but_acyclic_values_render_fully() {
    let inner = Value::array(vec![Value::Number(1.0)]);
    let outer = Value::array(vec![inner.clone(), inner]);
    assert_eq!(outer.inspect(), "[[1], [1]]");
}

#[test]
fn equality_is_structural_for_scalars_and_identity_for_aggregates() {
    assert_eq!(Value::from("x"), Value::from("x"));
    assert_ne!(Value::Number(1.0), Value::from("1"));
    let a = Value::array(vec![Value::Number(1.0)]);
    let b = Value::array(vec![Value::Number(1.0)]);
    assert_ne!(a, b);
    assert!(a.structural_eq(&b));
    assert_eq!(a, a.clone());
}

#[test]
fn ordered_map_keys_collide_by_content() {
    let mut map = OrderedMap::new();
    map.insert(Value::array(vec![Value::Number(1.0)]), Value::from("first"));
    map.insert(Value::array(vec![Value::Number(1.0)]), Value::from("second"));
    map.insert(Value::Number(-0.0), Value::from("zero"));
    assert_eq!(map.len(), 2);
    assert_eq!(
        map.get(&Value::array(vec![Value::Number(1.0)])),
        Some(&Value::from("second"))
    );
    assert_eq!(map.get(&Value::Number(0.0)), Some(&Value::from("zero")));
    assert!(map.remove(&Value::Number(0.0)));
    assert_eq!(map.len(), 1);
}

#[test]
fn ordered_set_preserves_insertion_order() {
    let mut set = OrderedSet::new();
    assert!(set.insert(Value::from("b")));
    assert!(set.insert(Value::from("a")));
    assert!(!set.insert(Value::from("b")));
    assert!(set.remove(&Value::from("b")));
    assert!(set.insert(Value::from("c")));
    assert_eq!(set.values(), &[Value::from("a"), Value::from("c")]);
    assert_eq!(
        Value::set(set).inspect(),
        r#"Set(2) { "a", "c" }"#
    );
}

#[test]
fn ordered_map_display() {
    let mut map = OrderedMap::new();
    map.insert(Value::from("k"), Value::Number(1.0));
    assert_eq!(Value::ordered_map(map).inspect(), r#"Map(1) { "k" => 1 }"#);
    assert_eq!(Value::ordered_map(OrderedMap::new()).inspect(), "Map(0) {}");
}

#[test]
fn type_names() {
    assert_eq!(Value::Null.type_name(), "NULL");
    assert_eq!(Value::array(vec![]).type_name(), "ARRAY");
    assert_eq!(Value::ordered_map(OrderedMap::new()).type_name(), "ES6MAP");
}
