//! # haystack-core
//!
//! Pure-Rust value model and codecs for **Project Haystack** building data.
//!
//! Haystack describes equipment, points and sites as dicts of tags, and
//! exchanges tables of them as grids. This crate provides the closed set of
//! Haystack value kinds, an immutable grid with a builder, a Zinc tokenizer
//! and parser, and encoders for Zinc, type-prefixed JSON and Hayson.
//!
//! ## Quick start
//!
//! ```rust
//! use haystack_core::{read_grid, read_value, json, Value};
//!
//! // Zinc → Value
//! let v = read_value("[1, 2kW, \"three\"]").unwrap();
//! assert_eq!(v.to_zinc(), "[1,2kW,\"three\"]");
//!
//! // Zinc → Grid → Zinc
//! let zinc = "ver:\"3.0\"\nid,dis\n@site-1,\"HQ\"\n";
//! let grid = read_grid(zinc).unwrap();
//! assert_eq!(grid.to_zinc(), zinc);
//!
//! // Value → prefixed JSON
//! assert_eq!(json::encode(&Value::Marker), r#""m:""#);
//! ```
//!
//! ## Modules
//!
//! - [`value`]: the `Value` enum and its scalar, dict and list kinds
//! - [`grid`]: `Grid`, row views and `GridBuilder`
//! - [`tokenizer`]: Zinc text to tokens
//! - [`parser`]: tokens to values and grids (`read_value`, `read_grid`)
//! - [`zinc`]: values and grids to Zinc text
//! - [`json`]: type-prefixed JSON (`"n:42 kW"`)
//! - [`hayson`]: kind-tagged JSON (`{"_kind":"number",...}`), also used by the serde impls
//! - [`error`]: error type for lex, parse, build and JSON failures

pub mod error;
pub mod grid;
pub mod hayson;
pub mod json;
pub mod parser;
pub mod tokenizer;
pub mod value;
pub mod zinc;

pub use error::{HaystackError, Result};
pub use grid::{Col, Grid, GridBuilder, Row, Version};
pub use parser::{read_grid, read_value, ParseOptions, ZincReader};
pub use tokenizer::{Token, Tokenizer};
pub use value::{validate_name, validate_tz, Coord, Date, DateTime, Dict, Kind, Number, Ref, Time, Value, XStr};
pub use zinc::{encode_grid, encode_value};
