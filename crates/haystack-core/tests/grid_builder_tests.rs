use haystack_core::{Dict, Grid, GridBuilder, HaystackError, Number, Ref, Value};

fn site(id: &str, area: f64) -> Dict {
    Dict::new()
        .set("id", Value::from(Ref::new(id).unwrap()))
        .unwrap()
        .set("site", Value::Marker)
        .unwrap()
        .set("area", Value::from(Number::with_unit(area, "ft²")))
        .unwrap()
}

#[test]
fn snapshot_is_isolated_from_later_mutation() {
    let mut gb = GridBuilder::new();
    gb.add_col("a").unwrap();
    gb.add_row(vec![Value::from(1.0)]).unwrap();

    let first = gb.to_grid();
    let before = first.to_zinc();

    gb.add_row(vec![Value::from(2.0)]).unwrap();
    gb.add_col("b").unwrap();
    gb.add_meta("dis", Value::from("changed")).unwrap();

    assert_eq!(first.to_zinc(), before);
    assert_eq!(first.len(), 1);
    assert_eq!(first.cols().len(), 1);

    let second = gb.to_grid();
    assert_eq!(second.len(), 2);
    assert_eq!(second.cols().len(), 2);
}

#[test]
fn encoding_is_idempotent() {
    let mut gb = GridBuilder::new();
    gb.add_col("id").unwrap().add_col("area").unwrap();
    gb.add_dict_rows([&site("a", 100.0), &site("b", 200.0)]).unwrap();
    let grid = gb.to_grid();
    assert_eq!(grid.to_zinc(), grid.to_zinc());
    assert_eq!(gb.to_grid().to_zinc(), grid.to_zinc());
}

#[test]
fn dict_rows_look_up_by_column_name() {
    let mut gb = GridBuilder::new();
    gb.add_col("area").unwrap().add_col("id").unwrap().add_col("dis").unwrap();
    gb.add_dict_row(&site("a", 100.0)).unwrap();
    let grid = gb.build();
    let row = grid.row(0).unwrap();
    assert_eq!(row.get("id"), Some(&Value::from(Ref::new("a").unwrap())));
    assert_eq!(row.get("dis"), Some(&Value::Null));
    assert!(row.get("site").is_none());
}

#[test]
fn short_rows_are_padded() {
    let mut gb = GridBuilder::new();
    gb.add_col("a").unwrap().add_col("b").unwrap();
    gb.add_row(vec![Value::from(1.0)]).unwrap();
    assert_eq!(gb.num_rows(), 1);
    assert_eq!(gb.to_grid().row(0).unwrap().cells(), &[Value::from(1.0), Value::Null]);
}

#[test]
fn long_rows_are_rejected() {
    let mut gb = GridBuilder::new();
    gb.add_col("a").unwrap();
    let err = gb.add_row(vec![Value::from(1.0), Value::from(2.0)]).unwrap_err();
    assert!(matches!(err, HaystackError::RowLength { expected: 1, found: 2 }));
    assert_eq!(gb.num_rows(), 0);
}

#[test]
fn late_columns_pad_existing_rows() {
    let mut gb = GridBuilder::new();
    gb.add_col("a").unwrap();
    gb.add_row(vec![Value::from(1.0)]).unwrap();
    gb.add_col("b").unwrap();
    assert_eq!(gb.num_cols(), 2);
    assert_eq!(gb.to_grid().to_zinc(), "ver:\"3.0\"\na,b\n1,\n");
}

#[test]
fn column_names_are_validated() {
    let mut gb = GridBuilder::new();
    assert!(matches!(gb.add_col("Bad"), Err(HaystackError::InvalidName(_))));
    assert!(matches!(gb.add_col("9lives"), Err(HaystackError::InvalidName(_))));
    assert!(matches!(gb.add_col(""), Err(HaystackError::InvalidName(_))));
    gb.add_col("ok_name2").unwrap();
    assert!(matches!(gb.add_col("ok_name2"), Err(HaystackError::DuplicateColumn(_))));
}

#[test]
fn meta_names_are_validated() {
    let mut gb = GridBuilder::new();
    assert!(gb.add_meta("Dis", Value::Marker).is_err());
}

#[test]
fn from_dicts_unions_columns_in_first_seen_order() {
    let a = Dict::new().set("id", Value::from(Ref::new("a").unwrap())).unwrap();
    let b = site("b", 5.0).set("dis", Value::from("B")).unwrap();
    let grid = Grid::from_dicts(Dict::new(), [&a, &b]).unwrap();
    let names: Vec<&str> = grid.cols().iter().map(|c| c.name()).collect();
    assert_eq!(names, ["id", "area", "dis", "site"]);
    assert_eq!(grid.row(0).unwrap().get("area"), Some(&Value::Null));
}

#[test]
fn rows_are_rejected_without_columns() {
    let mut gb = GridBuilder::new();
    assert!(matches!(gb.add_row(vec![]), Err(HaystackError::NoColumns)));
    assert!(matches!(gb.add_dict_row(&Dict::new()), Err(HaystackError::NoColumns)));
    assert!(matches!(
        gb.add_dict_rows([&Dict::new(), &Dict::new()]),
        Err(HaystackError::NoColumns)
    ));
    assert_eq!(gb.num_rows(), 0);

    let grid = gb.build();
    assert_eq!(grid.len(), 0);
    assert_eq!(grid.to_zinc(), "ver:\"3.0\"\nempty\n");
    assert_eq!(haystack_core::json::grid_to_json(&grid)["rows"], serde_json::json!([]));
}

#[test]
fn from_dicts_without_any_tags_is_an_error() {
    let empty = Dict::new();
    assert!(matches!(Grid::from_dicts(Dict::new(), [&empty, &empty]), Err(HaystackError::NoColumns)));
    let none: [&Dict; 0] = [];
    assert!(Grid::from_dicts(Dict::new(), none).unwrap().is_empty());
}

#[test]
fn row_to_dict_skips_nulls() {
    let mut gb = GridBuilder::new();
    gb.add_col("a").unwrap().add_col("b").unwrap();
    gb.add_row(vec![Value::Null, Value::from("x")]).unwrap();
    let grid = gb.build();
    let dict = grid.row(0).unwrap().to_dict();
    assert_eq!(dict.len(), 1);
    assert!(dict.missing("a"));
    assert!(dict.has("b"));
}

#[test]
fn empty_grid() {
    let grid = Grid::empty();
    assert!(grid.is_empty());
    assert!(grid.cols().is_empty());
    assert!(grid.row(0).is_none());
    assert_eq!(grid.to_zinc(), "ver:\"3.0\"\nempty\n");
}

#[test]
fn dict_set_and_remove_do_not_alias() {
    let original = site("a", 1.0);
    let changed = original.set("area", Value::from(2.0)).unwrap();
    let removed = original.remove("site");
    assert_eq!(original.get("area"), Some(&Value::from(Number::with_unit(1.0, "ft²"))));
    assert_eq!(changed.get("area"), Some(&Value::from(2.0)));
    assert!(original.has("site"));
    assert!(removed.missing("site"));
    assert_eq!(original.len(), 3);
}
