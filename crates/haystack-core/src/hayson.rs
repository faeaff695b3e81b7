//! Hayson: kind-tagged JSON encoding.
//!
//! Every value without a native JSON type becomes an object naming its kind:
//!
//! ```json
//! {"_kind": "number", "val": 42, "unit": "kW"}
//! {"_kind": "ref", "val": "site-1", "dis": "HQ"}
//! {"_kind": "dateTime", "val": "2016-01-13T09:51:33-05:00", "tz": "New_York"}
//! ```
//!
//! Null, booleans, strings and lists use native JSON. Dicts are objects
//! tagged `"_kind": "dict"`. Grids are `"_kind": "grid"` objects with `meta`,
//! `cols` and `rows`, and null cells are left out of row objects. On decode,
//! plain JSON numbers are unitless numbers and objects without `_kind` are
//! dicts.
//!
//! [`Value`] implements serde's `Serialize` and `Deserialize` through this
//! encoding.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::error::{HaystackError, Result};
use crate::grid::{Grid, GridBuilder, Version};
use crate::tokenizer::{parse_date, parse_datetime, parse_time};
use crate::value::{format_float, parse_float, validate_name, Coord, Dict, Kind, Number, Ref, Value, XStr};

const KIND: &str = "_kind";

/// Encode a value as a Hayson JSON string.
///
/// ```rust
/// use haystack_core::{hayson, Value};
///
/// assert_eq!(hayson::encode(&Value::Marker), r#"{"_kind":"marker"}"#);
/// ```
pub fn encode(val: &Value) -> String {
    to_hayson(val).to_string()
}

/// Decode a Hayson JSON string into a value.
pub fn decode(json: &str) -> Result<Value> {
    let parsed: JsonValue = serde_json::from_str(json)?;
    from_hayson(&parsed)
}

pub fn to_hayson(val: &Value) -> JsonValue {
    match val {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Str(s) => JsonValue::String(s.clone()),
        Value::Number(n) => {
            let mut obj = kind_object(Kind::Number);
            let num = serde_json::Number::from_f64(n.value())
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(format_float(n.value())));
            obj.insert("val".to_string(), num);
            if let Some(unit) = n.unit() {
                obj.insert("unit".to_string(), JsonValue::String(unit.to_string()));
            }
            JsonValue::Object(obj)
        }
        Value::Uri(u) => kind_with_val(Kind::Uri, u.clone()),
        Value::Ref(r) => {
            let mut obj = kind_object(Kind::Ref);
            obj.insert("val".to_string(), JsonValue::String(r.id().to_string()));
            if let Some(dis) = r.dis() {
                obj.insert("dis".to_string(), JsonValue::String(dis.to_string()));
            }
            JsonValue::Object(obj)
        }
        Value::Date(d) => kind_with_val(Kind::Date, d.to_string()),
        Value::Time(t) => kind_with_val(Kind::Time, t.to_string()),
        Value::DateTime(dt) => {
            let mut obj = kind_object(Kind::DateTime);
            obj.insert("val".to_string(), JsonValue::String(dt.to_iso()));
            obj.insert("tz".to_string(), JsonValue::String(dt.tz().to_string()));
            JsonValue::Object(obj)
        }
        Value::Coord(c) => {
            let mut obj = kind_object(Kind::Coord);
            obj.insert("lat".to_string(), float(c.lat()));
            obj.insert("lng".to_string(), float(c.lng()));
            JsonValue::Object(obj)
        }
        Value::Marker => JsonValue::Object(kind_object(Kind::Marker)),
        Value::Remove => JsonValue::Object(kind_object(Kind::Remove)),
        Value::NA => JsonValue::Object(kind_object(Kind::NA)),
        Value::Symbol(name) => kind_with_val(Kind::Symbol, name.clone()),
        Value::XStr(x) if x.is_bin() => {
            let mut obj = kind_object(Kind::Bin);
            obj.insert("mime".to_string(), JsonValue::String(x.value().to_string()));
            JsonValue::Object(obj)
        }
        Value::XStr(x) => {
            let mut obj = kind_object(Kind::XStr);
            obj.insert("type".to_string(), JsonValue::String(x.type_name().to_string()));
            obj.insert("val".to_string(), JsonValue::String(x.value().to_string()));
            JsonValue::Object(obj)
        }
        Value::List(items) => JsonValue::Array(items.iter().map(to_hayson).collect()),
        Value::Dict(dict) => {
            let mut obj = kind_object(Kind::Dict);
            obj.extend(tags(dict));
            JsonValue::Object(obj)
        }
        Value::Grid(grid) => grid_to_hayson(grid),
    }
}

pub fn grid_to_hayson(grid: &Grid) -> JsonValue {
    let mut meta = Map::new();
    meta.insert("ver".to_string(), JsonValue::String(Version::V3.as_str().to_string()));
    meta.extend(tags(grid.meta()));

    let cols = grid
        .cols()
        .iter()
        .map(|col| {
            let mut obj = Map::new();
            obj.insert("name".to_string(), JsonValue::String(col.name().to_string()));
            if !col.meta().is_empty() {
                obj.insert("meta".to_string(), JsonValue::Object(tags(col.meta())));
            }
            JsonValue::Object(obj)
        })
        .collect();

    let rows = grid
        .rows()
        .map(|row| {
            JsonValue::Object(tags(&row.to_dict()))
        })
        .collect();

    let mut obj = kind_object(Kind::Grid);
    obj.insert("meta".to_string(), JsonValue::Object(meta));
    obj.insert("cols".to_string(), JsonValue::Array(cols));
    obj.insert("rows".to_string(), JsonValue::Array(rows));
    JsonValue::Object(obj)
}

fn kind_object(kind: Kind) -> Map<String, JsonValue> {
    let mut obj = Map::new();
    obj.insert(KIND.to_string(), JsonValue::String(kind.name().to_string()));
    obj
}

fn kind_with_val(kind: Kind, val: String) -> JsonValue {
    let mut obj = kind_object(kind);
    obj.insert("val".to_string(), JsonValue::String(val));
    JsonValue::Object(obj)
}

fn float(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

/// Untagged `name: value` pairs, alphabetical.
fn tags(dict: &Dict) -> Map<String, JsonValue> {
    dict.iter()
        .map(|(name, val)| (name.to_string(), to_hayson(val)))
        .collect()
}

pub fn from_hayson(json: &JsonValue) -> Result<Value> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Bool(*b)),
        JsonValue::Number(n) => n
            .as_f64()
            .map(|v| Value::Number(Number::new(v)))
            .ok_or_else(|| invalid(format!("unrepresentable number {n}"))),
        JsonValue::String(s) => Ok(Value::Str(s.clone())),
        JsonValue::Array(items) => items
            .iter()
            .map(from_hayson)
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        JsonValue::Object(obj) => from_object(obj),
    }
}

fn from_object(obj: &Map<String, JsonValue>) -> Result<Value> {
    let kind = match obj.get(KIND) {
        None => return object_to_dict(obj).map(Value::Dict),
        Some(JsonValue::String(kind)) => kind.as_str(),
        Some(other) => return Err(invalid(format!("_kind must be a string, not {other}"))),
    };

    let val = match kind {
        "dict" => Value::Dict(object_to_dict(obj)?),
        "grid" => Value::from(grid_from_hayson(obj)?),
        "marker" => Value::Marker,
        "remove" => Value::Remove,
        "na" => Value::NA,
        "number" => {
            let v = match obj.get("val") {
                Some(JsonValue::Number(n)) => n.as_f64(),
                Some(JsonValue::String(s)) => parse_float(s),
                _ => None,
            }
            .ok_or_else(|| invalid("number without a numeric val"))?;
            let unit = opt_str(obj, "unit").unwrap_or("");
            Value::Number(Number::with_unit(v, unit))
        }
        "ref" => {
            let id = req_str(obj, "val", kind)?;
            match opt_str(obj, "dis") {
                Some(dis) => Value::Ref(Ref::with_dis(id, dis)?),
                None => Value::Ref(Ref::new(id)?),
            }
        }
        "uri" => Value::Uri(req_str(obj, "val", kind)?.to_string()),
        "symbol" => Value::symbol(req_str(obj, "val", kind)?)?,
        "date" => Value::Date(parse_date(req_str(obj, "val", kind)?).map_err(invalid)?),
        "time" => Value::Time(parse_time(req_str(obj, "val", kind)?).map_err(invalid)?),
        "dateTime" => {
            let iso = req_str(obj, "val", kind)?;
            let tz = opt_str(obj, "tz").unwrap_or("UTC");
            Value::DateTime(parse_datetime(iso, tz.to_string()).map_err(invalid)?)
        }
        "coord" => {
            let lat = obj.get("lat").and_then(JsonValue::as_f64);
            let lng = obj.get("lng").and_then(JsonValue::as_f64);
            match (lat, lng) {
                (Some(lat), Some(lng)) => Value::Coord(Coord::new(lat, lng)),
                _ => return Err(invalid("coord needs numeric lat and lng")),
            }
        }
        "xstr" => Value::XStr(XStr::new(
            req_str(obj, "type", kind)?,
            req_str(obj, "val", kind)?,
        )?),
        "bin" => Value::bin(req_str(obj, "mime", kind)?),
        other => return Err(invalid(format!("unknown _kind {other:?}"))),
    };
    Ok(val)
}

fn grid_from_hayson(obj: &Map<String, JsonValue>) -> Result<Grid> {
    let mut gb = GridBuilder::new();

    if let Some(meta) = obj.get("meta").and_then(JsonValue::as_object) {
        let version = meta
            .get("ver")
            .and_then(JsonValue::as_str)
            .and_then(Version::parse)
            .unwrap_or_default();
        gb.set_version(version);
        let mut dict = object_to_dict(meta)?;
        dict = dict.remove("ver");
        gb.set_meta(dict);
    }

    for col in obj.get("cols").and_then(JsonValue::as_array).into_iter().flatten() {
        let name = col
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| invalid("grid column without a name"))?;
        let meta = match col.get("meta") {
            Some(JsonValue::Object(meta)) => object_to_dict(meta)?,
            _ => Dict::new(),
        };
        gb.add_col_with_meta(name, meta)?;
    }

    for row in obj.get("rows").and_then(JsonValue::as_array).into_iter().flatten() {
        let row = row
            .as_object()
            .ok_or_else(|| invalid("grid row must be an object"))?;
        gb.add_dict_row(&object_to_dict(row)?)?;
    }

    let grid = gb.build();
    tracing::debug!(cols = grid.cols().len(), rows = grid.len(), "decoded hayson grid");
    Ok(grid)
}

/// Every key except `_kind` becomes a tag.
fn object_to_dict(obj: &Map<String, JsonValue>) -> Result<Dict> {
    let mut dict = Dict::new();
    for (name, val) in obj {
        if name == KIND {
            continue;
        }
        validate_name(name)?;
        dict.insert(name.clone(), from_hayson(val)?);
    }
    Ok(dict)
}

fn opt_str<'a>(obj: &'a Map<String, JsonValue>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(JsonValue::as_str)
}

fn req_str<'a>(obj: &'a Map<String, JsonValue>, key: &str, kind: &str) -> Result<&'a str> {
    opt_str(obj, key).ok_or_else(|| invalid(format!("{kind} needs a string {key}")))
}

fn invalid(message: impl Into<String>) -> HaystackError {
    HaystackError::JsonValue(message.into())
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        to_hayson(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        from_hayson(&json).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        grid_to_hayson(self).serialize(serializer)
    }
}
