//! Haystack value model.
//!
//! [`Value`] is the closed set of kinds that can appear as a tag value, a list
//! element, a dict entry or a grid cell. Every kind has a Zinc literal form
//! (see [`crate::zinc`]), a type-prefixed JSON form (see [`crate::json`]) and a
//! kind-tagged Hayson form (see [`crate::hayson`]).
//!
//! All values are immutable. [`Dict`] shares its storage behind an `Arc`, so
//! cloning a dict is cheap and [`Dict::set`] copies on write.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike};

use crate::error::{HaystackError, Result};
use crate::grid::Grid;
use crate::tokenizer::URI_ESCAPE_IGNORE;

/// A Haystack value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    Str(String),
    Uri(String),
    Ref(Ref),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    Coord(Coord),
    /// Presence-only tag value.
    Marker,
    /// Tag-deletion sentinel.
    Remove,
    /// Not-available sentinel.
    NA,
    /// Namespace-qualified def name, `^elec-meter` in Zinc. Build it with
    /// [`Value::symbol`] so the name stays readable in Zinc.
    Symbol(String),
    /// Extended scalar without first-class support. `Bin` payloads are XStrs
    /// whose type name is `Bin`.
    XStr(XStr),
    List(Vec<Value>),
    Dict(Dict),
    Grid(Arc<Grid>),
}

/// The kind of a [`Value`], named the way Hayson names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Number,
    Str,
    Uri,
    Ref,
    Date,
    Time,
    DateTime,
    Coord,
    Marker,
    Remove,
    NA,
    Symbol,
    XStr,
    Bin,
    List,
    Dict,
    Grid,
}

impl Kind {
    /// The `_kind` name used by Hayson.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::Str => "str",
            Kind::Uri => "uri",
            Kind::Ref => "ref",
            Kind::Date => "date",
            Kind::Time => "time",
            Kind::DateTime => "dateTime",
            Kind::Coord => "coord",
            Kind::Marker => "marker",
            Kind::Remove => "remove",
            Kind::NA => "na",
            Kind::Symbol => "symbol",
            Kind::XStr => "xstr",
            Kind::Bin => "bin",
            Kind::List => "list",
            Kind::Dict => "dict",
            Kind::Grid => "grid",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// A symbol value, checked to use only ref id characters.
    pub fn symbol(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        check_ref_chars(&name, "symbol")?;
        Ok(Value::Symbol(name))
    }

    /// A `Bin` value carrying only its MIME type.
    pub fn bin(mime: impl Into<String>) -> Self {
        Value::XStr(XStr::bin(mime))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::Str(_) => Kind::Str,
            Value::Uri(_) => Kind::Uri,
            Value::Ref(_) => Kind::Ref,
            Value::Date(_) => Kind::Date,
            Value::Time(_) => Kind::Time,
            Value::DateTime(_) => Kind::DateTime,
            Value::Coord(_) => Kind::Coord,
            Value::Marker => Kind::Marker,
            Value::Remove => Kind::Remove,
            Value::NA => Kind::NA,
            Value::Symbol(_) => Kind::Symbol,
            Value::XStr(x) if x.is_bin() => Kind::Bin,
            Value::XStr(_) => Kind::XStr,
            Value::List(_) => Kind::List,
            Value::Dict(_) => Kind::Dict,
            Value::Grid(_) => Kind::Grid,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Value::Marker)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Ref> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_grid(&self) -> Option<&Grid> {
        match self {
            Value::Grid(g) => Some(g),
            _ => None,
        }
    }

    /// Encode this value as a Zinc literal. Grids are written in their
    /// nested `<<` ... `>>` form.
    pub fn to_zinc(&self) -> String {
        crate::zinc::encode_value(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_zinc())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(Number::new(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(Number::new(v as f64))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Ref> for Value {
    fn from(r: Ref) -> Self {
        Value::Ref(r)
    }
}

impl From<Date> for Value {
    fn from(d: Date) -> Self {
        Value::Date(d)
    }
}

impl From<Time> for Value {
    fn from(t: Time) -> Self {
        Value::Time(t)
    }
}

impl From<DateTime> for Value {
    fn from(dt: DateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Coord> for Value {
    fn from(c: Coord) -> Self {
        Value::Coord(c)
    }
}

impl From<XStr> for Value {
    fn from(x: XStr) -> Self {
        Value::XStr(x)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(d)
    }
}

impl From<Grid> for Value {
    fn from(g: Grid) -> Self {
        Value::Grid(Arc::new(g))
    }
}

// ============================================================================
// Number
// ============================================================================

/// A 64-bit float with an optional unit. Infinities and NaN are allowed and
/// have their own textual forms (`INF`, `-INF`, `NaN`).
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    value: f64,
    unit: Option<String>,
}

impl Number {
    pub fn new(value: f64) -> Self {
        Self { value, unit: None }
    }

    /// An empty unit is the same as no unit.
    pub fn with_unit(value: f64, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        Self {
            value,
            unit: if unit.is_empty() { None } else { Some(unit) },
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Zinc form: value immediately followed by the unit (`42kW`). The
    /// keyword forms `INF`, `-INF` and `NaN` cannot carry a unit in Zinc, so
    /// it is left off for them.
    pub fn to_zinc(&self) -> String {
        let mut out = format_float(self.value);
        if let Some(unit) = self.unit.as_deref().filter(|_| self.value.is_finite()) {
            out.push_str(unit);
        }
        out
    }
}

/// Render a float in its shortest round-trippable decimal form, or one of
/// the special forms `INF`, `-INF`, `NaN`.
pub(crate) fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "INF".to_string()
    } else if v == f64::NEG_INFINITY {
        "-INF".to_string()
    } else {
        format!("{}", v)
    }
}

/// Inverse of [`format_float`].
pub(crate) fn parse_float(s: &str) -> Option<f64> {
    match s {
        "INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => s.parse().ok().filter(|v: &f64| v.is_finite()),
    }
}

// ============================================================================
// Ref
// ============================================================================

/// Reference to an entity by id, with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ref {
    id: String,
    dis: Option<String>,
}

impl Ref {
    /// Ids are non-empty and use ASCII letters, digits and `_ - : . ~`.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        check_ref_chars(&id, "ref")?;
        Ok(Self { id, dis: None })
    }

    pub fn with_dis(id: impl Into<String>, dis: impl Into<String>) -> Result<Self> {
        let mut r = Self::new(id)?;
        r.dis = Some(dis.into());
        Ok(r)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dis(&self) -> Option<&str> {
        self.dis.as_deref()
    }

    pub fn to_zinc(&self) -> String {
        let mut out = format!("@{}", self.id);
        if let Some(dis) = &self.dis {
            out.push(' ');
            write_str_literal(dis, &mut out);
        }
        out
    }
}

// ============================================================================
// Date / Time / DateTime
// ============================================================================

/// Calendar date without a timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: i32,
    month: u32,
    day: u32,
}

impl Date {
    /// Validates the date against the proleptic Gregorian calendar. Years
    /// are limited to the four digits Zinc writes.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        if !(0..=9999).contains(&year) || NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(HaystackError::InvalidValue {
                kind: "date",
                message: format!("{year:04}-{month:02}-{day:02}"),
            });
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl TryFrom<NaiveDate> for Date {
    type Error = HaystackError;

    fn try_from(d: NaiveDate) -> Result<Self> {
        Self::new(d.year(), d.month(), d.day())
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Time of day with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    hour: u32,
    min: u32,
    sec: u32,
    ms: u32,
}

impl Time {
    pub fn new(hour: u32, min: u32, sec: u32, ms: u32) -> Result<Self> {
        if ms > 999 || NaiveTime::from_hms_opt(hour, min, sec).is_none() {
            return Err(HaystackError::InvalidValue {
                kind: "time",
                message: format!("{hour:02}:{min:02}:{sec:02}.{ms:03}"),
            });
        }
        Ok(Self {
            hour,
            min,
            sec,
            ms,
        })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn sec(&self) -> u32 {
        self.sec
    }

    pub fn ms(&self) -> u32 {
        self.ms
    }

    pub fn to_naive(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_milli_opt(self.hour, self.min, self.sec, self.ms)
    }
}

impl From<NaiveTime> for Time {
    fn from(t: NaiveTime) -> Self {
        Self {
            hour: t.hour(),
            min: t.minute(),
            sec: t.second(),
            ms: (t.nanosecond() / 1_000_000).min(999),
        }
    }
}

/// `hh:mm:ss`, with `.mmm` only when milliseconds are non-zero.
impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.min, self.sec)?;
        if self.ms != 0 {
            write!(f, ".{:03}", self.ms)?;
        }
        Ok(())
    }
}

/// Timestamp with a UTC offset and a Haystack timezone name.
///
/// The offset and the name are independent: no timezone database lookup is
/// performed, so producers keep them consistent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateTime {
    date: Date,
    time: Time,
    offset_secs: i32,
    tz: String,
}

impl DateTime {
    /// The timezone name must be one Zinc can carry; see [`validate_tz`].
    pub fn new(date: Date, time: Time, offset_secs: i32, tz: impl Into<String>) -> Result<Self> {
        let tz = tz.into();
        validate_tz(&tz)?;
        Ok(Self {
            date,
            time,
            offset_secs,
            tz,
        })
    }

    /// A UTC timestamp named `UTC`.
    pub fn utc(date: Date, time: Time) -> Self {
        Self {
            date,
            time,
            offset_secs: 0,
            tz: "UTC".to_string(),
        }
    }

    pub fn from_chrono(dt: &chrono::DateTime<FixedOffset>, tz: impl Into<String>) -> Result<Self> {
        Self::new(
            Date::try_from(dt.date_naive())?,
            Time::from(dt.time()),
            dt.offset().local_minus_utc(),
            tz,
        )
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn offset_secs(&self) -> i32 {
        self.offset_secs
    }

    pub fn tz(&self) -> &str {
        &self.tz
    }

    pub fn to_chrono(&self) -> Option<chrono::DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.offset_secs)?;
        let naive = self.date.to_naive()?.and_time(self.time.to_naive()?);
        offset.from_local_datetime(&naive).single()
    }

    /// ISO 8601 form without the timezone name: `2016-01-13T09:51:33-05:00`.
    pub fn to_iso(&self) -> String {
        let mut out = format!("{}T{}", self.date, self.time);
        if self.offset_secs == 0 {
            out.push('Z');
        } else {
            let sign = if self.offset_secs < 0 { '-' } else { '+' };
            let abs = self.offset_secs.unsigned_abs();
            out.push_str(&format!("{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60));
        }
        out
    }
}

/// ISO form followed by a space and the timezone name, when there is one.
impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())?;
        if !self.tz.is_empty() {
            write!(f, " {}", self.tz)?;
        }
        Ok(())
    }
}

// ============================================================================
// Coord / XStr
// ============================================================================

/// Geographic coordinate. Latitude is clamped to `[-90, 90]` and longitude
/// to `[0, 180]` on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    lat: f64,
    lng: f64,
}

impl Coord {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat: lat.clamp(-90.0, 90.0),
            lng: lng.clamp(0.0, 180.0),
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn to_zinc(&self) -> String {
        format!("C({},{})", format_float(self.lat), format_float(self.lng))
    }
}

/// Extended scalar: a type name and its string encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XStr {
    type_name: String,
    value: String,
}

impl XStr {
    pub const BIN: &'static str = "Bin";

    /// Type names start with an ASCII uppercase letter and continue with
    /// ASCII letters, digits or `_`.
    pub fn new(type_name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let type_name = type_name.into();
        let mut chars = type_name.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(HaystackError::InvalidValue {
                kind: "xstr",
                message: format!("invalid type name {type_name:?}"),
            });
        }
        Ok(Self {
            type_name,
            value: value.into(),
        })
    }

    pub fn bin(mime: impl Into<String>) -> Self {
        Self {
            type_name: Self::BIN.to_string(),
            value: mime.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_bin(&self) -> bool {
        self.type_name == Self::BIN
    }

    pub fn to_zinc(&self) -> String {
        let mut out = format!("{}(", self.type_name);
        write_str_literal(&self.value, &mut out);
        out.push(')');
        out
    }
}

// ============================================================================
// Dict
// ============================================================================

/// Immutable mapping of tag names to values.
///
/// Iteration is alphabetical by name. Updates return a new dict and leave the
/// receiver untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict {
    tags: Arc<BTreeMap<String, Value>>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dict from name/value pairs, validating every name. Later
    /// pairs replace earlier ones with the same name.
    pub fn from_tags<K, I>(tags: I) -> Result<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut map = BTreeMap::new();
        for (name, val) in tags {
            let name = name.into();
            validate_name(&name)?;
            map.insert(name, val);
        }
        Ok(Self {
            tags: Arc::new(map),
        })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.tags.get(name)
    }

    /// True when the tag is present and not `Null`.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_null())
    }

    pub fn missing(&self, name: &str) -> bool {
        !self.has(name)
    }

    /// Return a copy of this dict with `name` set to `val`.
    pub fn set(&self, name: impl Into<String>, val: Value) -> Result<Dict> {
        let name = name.into();
        validate_name(&name)?;
        let mut copy = self.clone();
        copy.insert(name, val);
        Ok(copy)
    }

    /// Return a copy of this dict without `name`.
    pub fn remove(&self, name: &str) -> Dict {
        if !self.tags.contains_key(name) {
            return self.clone();
        }
        let mut copy = self.clone();
        Arc::make_mut(&mut copy.tags).remove(name);
        copy
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Insert without validating the name. Callers have already checked it.
    pub(crate) fn insert(&mut self, name: String, val: Value) {
        Arc::make_mut(&mut self.tags).insert(name, val);
    }

    pub fn to_zinc(&self) -> String {
        crate::zinc::encode_value(&Value::Dict(self.clone()))
    }
}

/// Tag names start with a lowercase ASCII letter and continue with ASCII
/// letters, digits or `_`.
pub fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(HaystackError::InvalidName(name.to_string()))
    }
}

/// Characters allowed in ref ids and symbol names after the sigil.
pub(crate) fn is_ref_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '~')
}

fn check_ref_chars(s: &str, kind: &'static str) -> Result<()> {
    if s.is_empty() || !s.chars().all(is_ref_char) {
        return Err(HaystackError::InvalidValue {
            kind,
            message: format!("invalid id {s:?}"),
        });
    }
    Ok(())
}

/// Timezone names start with an ASCII uppercase letter and continue with
/// ASCII letters, digits, `_` or `-`. A name ending in `GMT` may carry a
/// signed hour suffix such as `GMT+5`.
pub fn validate_tz(tz: &str) -> Result<()> {
    let (name, suffix) = match tz.find('+') {
        Some(i) => tz.split_at(i),
        None => (tz, ""),
    };
    let name_ok = name.starts_with(|c: char| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    let suffix_ok = suffix.is_empty()
        || (name.ends_with("GMT")
            && suffix[1..].starts_with(|c: char| c.is_ascii_digit())
            && suffix[1..].chars().all(|c| c.is_ascii_digit() || c == '+' || c == '-'));
    if name_ok && suffix_ok {
        Ok(())
    } else {
        Err(HaystackError::InvalidValue {
            kind: "dateTime",
            message: format!("invalid timezone name {tz:?}"),
        })
    }
}

// ============================================================================
// Literal escaping
// ============================================================================

/// Write `s` as a double-quoted Zinc string literal.
pub(crate) fn write_str_literal(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Write `s` as a backtick-quoted Zinc URI literal. Control characters and
/// spaces are dropped. A backslash is kept as-is when it starts one of the
/// pairs the reader copies through verbatim, and written as `\u005c`
/// otherwise.
pub(crate) fn write_uri_literal(s: &str, out: &mut String) {
    out.push('`');
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '`' => out.push_str("\\`"),
            '\\' => match chars.peek() {
                Some(&next) if URI_ESCAPE_IGNORE.contains(&next) => {
                    out.push('\\');
                    out.push(next);
                    chars.next();
                }
                _ => out.push_str("\\u005c"),
            },
            c if (c as u32) <= 0x20 => {}
            c => out.push(c),
        }
    }
    out.push('`');
}
