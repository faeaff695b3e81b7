//! Type-prefixed JSON encoding (Haystack JSON v3).
//!
//! Scalars that JSON has no type for become strings with a one-character
//! type prefix: `"n:42 kW"`, `"r:site-1 HQ"`, `"d:2016-06-06"`, `"m:"`.
//! Null, booleans, strings, lists and dicts use native JSON. A grid is an
//! object with `meta` (carrying `"ver":"3.0"`), `cols` and `rows`.
//!
//! Strings whose second character is `:` would read back as a prefixed
//! scalar, so they are written with an `s:` prefix.

use serde_json::{Map, Value as JsonValue};

use crate::error::{HaystackError, Result};
use crate::grid::{Grid, GridBuilder, Version};
use crate::tokenizer::{parse_date, parse_datetime, parse_time};
use crate::value::{format_float, parse_float, validate_name, Coord, Dict, Number, Ref, Value, XStr};

/// Encode a value as a JSON string.
///
/// ```rust
/// use haystack_core::{json, Number, Value};
///
/// let v = Value::Number(Number::with_unit(42.0, "kW"));
/// assert_eq!(json::encode(&v), r#""n:42 kW""#);
/// ```
pub fn encode(val: &Value) -> String {
    to_json(val).to_string()
}

/// Decode a JSON string into a value.
pub fn decode(json: &str) -> Result<Value> {
    let parsed: JsonValue = serde_json::from_str(json)?;
    from_json(&parsed)
}

pub fn to_json(val: &Value) -> JsonValue {
    match val {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Str(s) => {
            if s.chars().nth(1) == Some(':') {
                JsonValue::String(format!("s:{s}"))
            } else {
                JsonValue::String(s.clone())
            }
        }
        Value::Number(n) => {
            let mut s = format!("n:{}", format_float(n.value()));
            if let Some(unit) = n.unit() {
                s.push(' ');
                s.push_str(unit);
            }
            JsonValue::String(s)
        }
        Value::Uri(u) => JsonValue::String(format!("u:{u}")),
        Value::Ref(r) => {
            let mut s = format!("r:{}", r.id());
            if let Some(dis) = r.dis() {
                s.push(' ');
                s.push_str(dis);
            }
            JsonValue::String(s)
        }
        Value::Date(d) => JsonValue::String(format!("d:{d}")),
        Value::Time(t) => JsonValue::String(format!("h:{t}")),
        Value::DateTime(dt) => JsonValue::String(format!("t:{dt}")),
        Value::Coord(c) => JsonValue::String(format!(
            "c:{},{}",
            format_float(c.lat()),
            format_float(c.lng())
        )),
        Value::Marker => JsonValue::String("m:".to_string()),
        Value::Remove => JsonValue::String("-:".to_string()),
        Value::NA => JsonValue::String("z:".to_string()),
        Value::Symbol(name) => JsonValue::String(format!("y:{name}")),
        Value::XStr(x) if x.is_bin() => JsonValue::String(format!("b:{}", x.value())),
        Value::XStr(x) => JsonValue::String(format!("x:{}:{}", x.type_name(), x.value())),
        Value::List(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        Value::Dict(dict) => JsonValue::Object(dict_to_map(dict)),
        Value::Grid(grid) => grid_to_json(grid),
    }
}

/// Grid as `{"meta": {"ver": "3.0", ...}, "cols": [...], "rows": [...]}`.
/// Every row carries every column; null cells are JSON `null`.
pub fn grid_to_json(grid: &Grid) -> JsonValue {
    let mut meta = Map::new();
    meta.insert("ver".to_string(), JsonValue::String(Version::V3.as_str().to_string()));
    meta.extend(dict_to_map(grid.meta()));

    let cols = grid
        .cols()
        .iter()
        .map(|col| {
            let mut obj = Map::new();
            obj.insert("name".to_string(), JsonValue::String(col.name().to_string()));
            obj.extend(dict_to_map(col.meta()));
            JsonValue::Object(obj)
        })
        .collect();

    let rows = grid
        .rows()
        .map(|row| {
            let obj: Map<String, JsonValue> = row
                .iter()
                .map(|(name, cell)| (name.to_string(), to_json(cell)))
                .collect();
            JsonValue::Object(obj)
        })
        .collect();

    let mut obj = Map::new();
    obj.insert("meta".to_string(), JsonValue::Object(meta));
    obj.insert("cols".to_string(), JsonValue::Array(cols));
    obj.insert("rows".to_string(), JsonValue::Array(rows));
    JsonValue::Object(obj)
}

fn dict_to_map(dict: &Dict) -> Map<String, JsonValue> {
    dict.iter()
        .map(|(name, val)| (name.to_string(), to_json(val)))
        .collect()
}

pub fn from_json(json: &JsonValue) -> Result<Value> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Bool(*b)),
        JsonValue::Number(n) => n
            .as_f64()
            .map(|v| Value::Number(Number::new(v)))
            .ok_or_else(|| invalid(format!("unrepresentable number {n}"))),
        JsonValue::String(s) => decode_prefixed(s),
        JsonValue::Array(items) => items.iter().map(from_json).collect::<Result<Vec<_>>>().map(Value::List),
        JsonValue::Object(obj) => {
            if is_grid(obj) {
                grid_from_json(obj).map(Value::from)
            } else {
                map_to_dict(obj).map(Value::Dict)
            }
        }
    }
}

/// A grid object has a `meta` object with `ver`, plus `cols` and `rows`
/// arrays.
fn is_grid(obj: &Map<String, JsonValue>) -> bool {
    obj.get("meta")
        .and_then(JsonValue::as_object)
        .is_some_and(|meta| meta.contains_key("ver"))
        && obj.get("cols").is_some_and(JsonValue::is_array)
        && obj.get("rows").is_some_and(JsonValue::is_array)
}

fn grid_from_json(obj: &Map<String, JsonValue>) -> Result<Grid> {
    let mut gb = GridBuilder::new();

    if let Some(meta) = obj.get("meta").and_then(JsonValue::as_object) {
        let version = meta
            .get("ver")
            .and_then(JsonValue::as_str)
            .and_then(Version::parse)
            .unwrap_or_default();
        gb.set_version(version);
        let mut tags = Map::new();
        for (name, val) in meta {
            if name != "ver" {
                tags.insert(name.clone(), val.clone());
            }
        }
        gb.set_meta(map_to_dict(&tags)?);
    }

    for col in obj.get("cols").and_then(JsonValue::as_array).into_iter().flatten() {
        let col = col
            .as_object()
            .ok_or_else(|| invalid("grid column must be an object"))?;
        let name = col
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| invalid("grid column without a name"))?;
        let mut meta = Map::new();
        for (tag, val) in col {
            if tag != "name" {
                meta.insert(tag.clone(), val.clone());
            }
        }
        gb.add_col_with_meta(name, map_to_dict(&meta)?)?;
    }

    for row in obj.get("rows").and_then(JsonValue::as_array).into_iter().flatten() {
        let row = row
            .as_object()
            .ok_or_else(|| invalid("grid row must be an object"))?;
        gb.add_dict_row(&map_to_dict(row)?)?;
    }

    let grid = gb.build();
    tracing::debug!(cols = grid.cols().len(), rows = grid.len(), "decoded json grid");
    Ok(grid)
}

fn map_to_dict(obj: &Map<String, JsonValue>) -> Result<Dict> {
    let mut dict = Dict::new();
    for (name, val) in obj {
        validate_name(name)?;
        dict.insert(name.clone(), from_json(val)?);
    }
    Ok(dict)
}

/// Decode a JSON string, honouring a `x:` style type prefix.
fn decode_prefixed(s: &str) -> Result<Value> {
    let mut chars = s.chars();
    let prefix = match (chars.next(), chars.next()) {
        (Some(p), Some(':')) if p.is_ascii() => p,
        _ => return Ok(Value::Str(s.to_string())),
    };
    let body = &s[2..];
    let val = match prefix {
        's' => Value::Str(body.to_string()),
        'm' => Value::Marker,
        '-' => Value::Remove,
        'z' => Value::NA,
        'n' => {
            let (num, unit) = body.split_once(' ').unwrap_or((body, ""));
            let v = parse_float(num).ok_or_else(|| invalid(format!("invalid number {s:?}")))?;
            Value::Number(Number::with_unit(v, unit))
        }
        'r' => match body.split_once(' ') {
            Some((id, dis)) => Value::Ref(Ref::with_dis(id, dis)?),
            None => Value::Ref(Ref::new(body)?),
        },
        'u' => Value::Uri(body.to_string()),
        'y' => Value::symbol(body)?,
        'd' => Value::Date(parse_date(body).map_err(invalid)?),
        'h' => Value::Time(parse_time(body).map_err(invalid)?),
        't' => {
            let (iso, tz) = match body.split_once(' ') {
                Some((iso, tz)) => (iso, tz.to_string()),
                None if body.ends_with('Z') => (body, "UTC".to_string()),
                None => return Err(invalid(format!("datetime without timezone {s:?}"))),
            };
            Value::DateTime(parse_datetime(iso, tz).map_err(invalid)?)
        }
        'c' => {
            let coord = body
                .split_once(',')
                .and_then(|(lat, lng)| Some(Coord::new(lat.parse().ok()?, lng.parse().ok()?)))
                .ok_or_else(|| invalid(format!("invalid coord {s:?}")))?;
            Value::Coord(coord)
        }
        'x' => {
            let (type_name, payload) = body
                .split_once(':')
                .ok_or_else(|| invalid(format!("invalid xstr {s:?}")))?;
            Value::XStr(XStr::new(type_name, payload)?)
        }
        'b' => Value::bin(body),
        _ => Value::Str(s.to_string()),
    };
    Ok(val)
}

fn invalid(message: impl Into<String>) -> HaystackError {
    HaystackError::JsonValue(message.into())
}
