use haystack_core::{
    encode_grid, encode_value, hayson, json, read_grid, read_value, Date, DateTime, HaystackError, Ref, Time, Value,
    XStr,
};

/// Assert that `zinc` parses and re-encodes to the identical text.
fn assert_zinc_roundtrip(zinc: &str) {
    let val = read_value(zinc).unwrap_or_else(|e| panic!("parse failed for {zinc:?}: {e}"));
    assert_eq!(encode_value(&val), zinc, "Zinc roundtrip failed for {zinc:?}");
}

/// Assert that a value survives both JSON encodings, judged by its Zinc form.
fn assert_json_roundtrips(zinc: &str) {
    let val = read_value(zinc).unwrap();
    let via_json = json::decode(&json::encode(&val)).unwrap();
    assert_eq!(via_json.to_zinc(), val.to_zinc(), "prefixed JSON roundtrip failed for {zinc:?}");
    let via_hayson = hayson::decode(&hayson::encode(&val)).unwrap();
    assert_eq!(via_hayson.to_zinc(), val.to_zinc(), "Hayson roundtrip failed for {zinc:?}");
}

const SCALARS: &[&str] = &[
    "N",
    "T",
    "F",
    "M",
    "R",
    "NA",
    "INF",
    "-INF",
    "NaN",
    "0",
    "-12.75",
    "123456789",
    "0.001",
    "42kW",
    "-40ms",
    "12%",
    "72.5°F",
    "\"\"",
    "\"plain\"",
    r#""esc \" \\ \n \t \u0001 é""#,
    "`http://example.com/a?b=c`",
    "@site-1",
    "@site-1 \"Main Site\"",
    "^elec-meter",
    "2016-06-06",
    "08:30:00",
    "01:02:03.123",
    "2016-01-13T09:51:33-05:00 New_York",
    "2021-06-01T12:00:00+02:00 Berlin",
    "2020-01-01T00:00:00Z UTC",
    "2021-03-01T08:00:00+05:00 GMT+5",
    "C(37.55,77.45)",
    "C(-33.9,151.2)",
    "Color(\"red\")",
    "Bin(\"text/plain\")",
];

#[test]
fn scalar_zinc_roundtrips() {
    for zinc in SCALARS {
        assert_zinc_roundtrip(zinc);
    }
}

#[test]
fn scalar_json_roundtrips() {
    for zinc in SCALARS {
        assert_json_roundtrips(zinc);
    }
}

#[test]
fn collection_roundtrips() {
    for zinc in [
        "[]",
        "[1,2,3]",
        "[N,M,\"x\",[@a,{b}]]",
        "{}",
        "{dis:\"HQ\" geoCoord:C(1,2) site}",
        "{list:[1kW,2kW] nested:{deep:{deeper:T}}}",
    ] {
        assert_zinc_roundtrip(zinc);
        assert_json_roundtrips(zinc);
    }
}

#[test]
fn escaped_string_roundtrip() {
    let s = "this 1s A #more \n complex \\one";
    let zinc = encode_value(&Value::from(s));
    assert_eq!(zinc, "\"this 1s A #more \\n complex \\\\one\"");
    assert_eq!(read_value(&zinc).unwrap(), Value::from(s));
}

#[test]
fn version_two_grid_is_byte_identical() {
    let zinc = "ver:\"2.0\"\na,b\n1,2\n3,4\n";
    let grid = read_grid(zinc).unwrap();
    let names: Vec<&str> = grid.cols().iter().map(|c| c.name()).collect();
    assert_eq!(names, ["a", "b"]);
    let rows: Vec<String> = grid.rows().map(|r| r.to_dict().to_zinc()).collect();
    assert_eq!(rows, ["{a:1 b:2}", "{a:3 b:4}"]);
    assert_eq!(encode_grid(&grid), zinc);
}

#[test]
fn grid_with_meta_nulls_and_column_meta() {
    assert_zinc_roundtrip(concat!(
        "ver:\"3.0\" dis:\"Points\" hisEnd:2020-01-02\n",
        "id dis:\"Point\",curVal unit:\"kW\",enabled\n",
        "@p1 \"Fan\",12.5kW,T\n",
        "@p2,,\n",
        ",,F\n",
    ));
}

#[test]
fn single_column_grid_with_null_rows() {
    assert_zinc_roundtrip("ver:\"3.0\"\nval\nN\n1\nN\n");
}

#[test]
fn nested_grids_roundtrip() {
    let zinc = concat!(
        "ver:\"3.0\"\n",
        "a,b\n",
        "1,<<\n",
        "  ver:\"3.0\"\n",
        "  c\n",
        "  <<\n",
        "    ver:\"3.0\"\n",
        "    d\n",
        "    5\n",
        "    >>\n",
        "  >>\n",
        "3,4\n",
    );
    assert_zinc_roundtrip(zinc);
    assert_json_roundtrips(zinc);
}

#[test]
fn nested_grid_in_dict_meta() {
    assert_zinc_roundtrip(concat!(
        "ver:\"3.0\" sub:<<\n",
        "  ver:\"3.0\"\n",
        "  x\n",
        "  1\n",
        "  >>\n",
        "a\n",
        "2\n",
    ));
}

#[test]
fn crlf_input_reads_the_same() {
    let lf = read_grid("ver:\"3.0\"\na,b\n1,2\n").unwrap();
    let crlf = read_grid("ver:\"3.0\"\r\na,b\r\n1,2\r\n").unwrap();
    assert_eq!(lf, crlf);
}

#[test]
fn comments_are_ignored() {
    let grid = read_grid("// header\nver:\"3.0\" /* meta */\na,b // cols\n1,/* x */2\n").unwrap();
    assert_eq!(encode_grid(&grid), "ver:\"3.0\"\na,b\n1,2\n");
}

#[test]
fn constructors_only_build_readable_values() {
    let date = Date::new(2020, 1, 1).unwrap();
    let time = Time::new(1, 2, 3, 0).unwrap();
    for tz in ["", "new_york", "New York"] {
        assert!(
            matches!(DateTime::new(date, time, -18000, tz), Err(HaystackError::InvalidValue { .. })),
            "tz {tz:?}"
        );
    }
    assert!(Ref::new("a b").is_err());
    assert!(Ref::new("").is_err());
    assert!(XStr::new("lower", "p").is_err());
    assert!(Value::symbol("a b").is_err());

    let built = [
        Value::from(DateTime::new(date, time, -18000, "New_York").unwrap()),
        Value::from(DateTime::new(date, time, 18000, "GMT+5").unwrap()),
        Value::from(Ref::with_dis("a:b.c~d-e_f", "Disp").unwrap()),
        Value::from(XStr::new("Span_2", "x").unwrap()),
        Value::symbol("ph::elec-meter").unwrap(),
    ];
    for val in built {
        let zinc = encode_value(&val);
        assert_eq!(read_value(&zinc).unwrap(), val, "reading back {zinc}");
    }
}

#[test]
fn uri_backslashes_roundtrip() {
    for uri in [r"c:\dir\new", r"a\:b\\c", r"trailing\", r"\`tick"] {
        let val = Value::Uri(uri.to_string());
        let zinc = encode_value(&val);
        assert_eq!(read_value(&zinc).unwrap(), val, "reading back {zinc}");
    }
}
