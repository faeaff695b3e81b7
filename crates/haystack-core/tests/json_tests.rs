use haystack_core::json::{decode, encode, from_json, grid_to_json, to_json};
use haystack_core::{
    Coord, Date, DateTime, Dict, GridBuilder, HaystackError, Number, Ref, Time, Value, Version, XStr,
};
use serde_json::json;

fn enc(v: impl Into<Value>) -> serde_json::Value {
    to_json(&v.into())
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn native_kinds() {
    assert_eq!(enc(Value::Null), json!(null));
    assert_eq!(enc(true), json!(true));
    assert_eq!(enc("hello"), json!("hello"));
    assert_eq!(
        enc(Value::List(vec![Value::from(1.0), Value::from("x")])),
        json!(["n:1", "x"])
    );
}

#[test]
fn prefixed_scalars() {
    assert_eq!(enc(Number::with_unit(42.0, "kW")), json!("n:42 kW"));
    assert_eq!(enc(Number::new(-1.5)), json!("n:-1.5"));
    assert_eq!(enc(f64::INFINITY), json!("n:INF"));
    assert_eq!(enc(Ref::with_dis("site-1", "HQ Main").unwrap()), json!("r:site-1 HQ Main"));
    assert_eq!(enc(Ref::new("site-1").unwrap()), json!("r:site-1"));
    assert_eq!(enc(Value::Uri("http://x/".into())), json!("u:http://x/"));
    assert_eq!(enc(Date::new(2016, 6, 6).unwrap()), json!("d:2016-06-06"));
    assert_eq!(enc(Time::new(8, 30, 0, 0).unwrap()), json!("h:08:30:00"));
    assert_eq!(enc(Coord::new(37.55, 77.45)), json!("c:37.55,77.45"));
    assert_eq!(enc(Value::Marker), json!("m:"));
    assert_eq!(enc(Value::Remove), json!("-:"));
    assert_eq!(enc(Value::NA), json!("z:"));
    assert_eq!(enc(Value::Symbol("site".into())), json!("y:site"));
    assert_eq!(enc(XStr::new("Color", "red").unwrap()), json!("x:Color:red"));
    assert_eq!(enc(Value::bin("text/plain")), json!("b:text/plain"));
}

#[test]
fn datetime_with_tz() {
    let dt = DateTime::new(
        Date::new(2016, 1, 13).unwrap(),
        Time::new(9, 51, 33, 0).unwrap(),
        -18000,
        "New_York",
    )
    .unwrap();
    assert_eq!(enc(dt), json!("t:2016-01-13T09:51:33-05:00 New_York"));
}

#[test]
fn dict_is_an_object() {
    let d = Dict::new()
        .set("site", Value::Marker)
        .unwrap()
        .set("area", Value::from(Number::with_unit(35000.0, "ft²")))
        .unwrap();
    assert_eq!(enc(d), json!({"area": "n:35000 ft²", "site": "m:"}));
}

#[test]
fn grid_layout() {
    let mut gb = GridBuilder::new();
    gb.add_meta("dis", Value::from("Sites")).unwrap();
    gb.add_col_with_meta("id", Dict::new().set("dis", Value::from("Id")).unwrap())
        .unwrap();
    gb.add_col("area").unwrap();
    gb.add_row(vec![Value::from(Ref::new("a").unwrap())]).unwrap();
    let grid = gb.build();
    assert_eq!(
        grid_to_json(&grid),
        json!({
            "meta": {"ver": "3.0", "dis": "Sites"},
            "cols": [{"name": "id", "dis": "Id"}, {"name": "area"}],
            "rows": [{"id": "r:a", "area": null}],
        })
    );
}

#[test]
fn empty_grid_keeps_arrays() {
    let mut gb = GridBuilder::new();
    gb.add_col("a").unwrap();
    let json = grid_to_json(&gb.build());
    assert_eq!(json["cols"], json!([{"name": "a"}]));
    assert_eq!(json["rows"], json!([]));
}

#[test]
fn encode_string_form() {
    assert_eq!(encode(&Value::from(Number::new(3.0))), "\"n:3\"");
}

// ============================================================================
// Decoding
// ============================================================================

#[test]
fn decode_prefixed_scalars() {
    assert_eq!(decode("\"n:42 kW\"").unwrap(), Value::from(Number::with_unit(42.0, "kW")));
    assert_eq!(decode("\"r:a b c\"").unwrap(), Value::from(Ref::with_dis("a", "b c").unwrap()));
    assert_eq!(decode("\"h:08:30\"").unwrap(), Value::from(Time::new(8, 30, 0, 0).unwrap()));
    assert_eq!(decode("\"m:\"").unwrap(), Value::Marker);
    assert_eq!(decode("\"x:Color:red\"").unwrap(), Value::from(XStr::new("Color", "red").unwrap()));
    assert_eq!(decode("\"c:-10.5,20\"").unwrap(), Value::from(Coord::new(-10.5, 20.0)));
}

#[test]
fn decode_datetime_z_without_tz() {
    match decode("\"t:2020-01-01T00:00:00Z\"").unwrap() {
        Value::DateTime(dt) => assert_eq!(dt.tz(), "UTC"),
        other => panic!("expected datetime, got {other:?}"),
    }
}

#[test]
fn decode_plain_json_number() {
    assert_eq!(decode("12.5").unwrap(), Value::from(12.5));
}

#[test]
fn decode_rejects_bad_payloads() {
    assert!(matches!(decode("\"n:abc\""), Err(HaystackError::JsonValue(_))));
    assert!(matches!(decode("\"d:2016-13-01\""), Err(HaystackError::JsonValue(_))));
    assert!(matches!(decode("\"c:1\""), Err(HaystackError::JsonValue(_))));
    assert!(matches!(decode("\"t:2020-01-01T00:00:00-05:00\""), Err(HaystackError::JsonValue(_))));
    assert!(matches!(decode("\"y:a b\""), Err(HaystackError::InvalidValue { .. })));
    assert!(matches!(decode("\"x:color:red\""), Err(HaystackError::InvalidValue { .. })));
}

#[test]
fn decode_rejects_invalid_json() {
    assert!(matches!(decode("{not json"), Err(HaystackError::JsonParse(_))));
}

#[test]
fn decode_rejects_bad_tag_names() {
    assert!(matches!(decode(r#"{"Bad":1}"#), Err(HaystackError::InvalidName(_))));
}

#[test]
fn decode_grid() {
    let json = json!({
        "meta": {"ver": "2.0", "dis": "Sites"},
        "cols": [{"name": "id"}, {"name": "area", "unit": "ft²"}],
        "rows": [{"id": "r:a", "area": "n:10 ft²"}, {"id": "r:b"}],
    });
    let val = from_json(&json).unwrap();
    let grid = val.as_grid().unwrap();
    assert_eq!(grid.version(), Version::V2);
    assert_eq!(grid.meta().get("dis"), Some(&Value::from("Sites")));
    assert_eq!(grid.col("area").unwrap().meta().get("unit"), Some(&Value::from("ft²")));
    assert_eq!(grid.len(), 2);
    assert_eq!(grid.row(1).unwrap().get("area"), Some(&Value::Null));
}

#[test]
fn decode_grid_rows_without_columns() {
    let json = json!({"meta": {"ver": "3.0"}, "cols": [], "rows": [{}, {}]});
    assert!(matches!(from_json(&json), Err(HaystackError::NoColumns)));
}

#[test]
fn object_without_grid_shape_is_a_dict() {
    let val = from_json(&json!({"meta": {"x": 1}, "cols": [], "rows": []})).unwrap();
    assert!(val.as_dict().is_some());
}

#[test]
fn zinc_equal_after_round_trip() {
    let mut gb = GridBuilder::new();
    gb.add_col("id").unwrap().add_col("dis").unwrap().add_col("tags").unwrap();
    gb.add_row(vec![
        Value::from(Ref::with_dis("p1", "Point 1").unwrap()),
        Value::from("a:b"),
        Value::List(vec![Value::Marker, Value::NA]),
    ])
    .unwrap();
    gb.add_row(vec![Value::from(Ref::new("p2").unwrap())]).unwrap();
    let grid = Value::from(gb.build());
    let back = decode(&encode(&grid)).unwrap();
    assert_eq!(back.to_zinc(), grid.to_zinc());
}
