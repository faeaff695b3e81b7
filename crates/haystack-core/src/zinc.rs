//! Zinc writer: converts values and grids into Zinc text.
//!
//! Grids are written line by line: the `ver` header with grid meta, the
//! column line, then one line per row, each terminated by `\n`. A grid that
//! appears as a value (a grid cell, a list item, a dict tag) is wrapped in
//! `<<` / `>>` and every one of its lines is indented two spaces per nesting
//! level, so a doubly nested grid sits at four spaces:
//!
//! ```text
//! ver:"3.0"
//! a,b
//! 1,<<
//!   ver:"3.0"
//!   c
//!   <<
//!     ver:"3.0"
//!     d
//!     5
//!     >>
//!   >>
//! 3,4
//! ```
//!
//! Dict tags are written alphabetically, marker tags as the bare name.

use crate::grid::Grid;
use crate::value::{write_str_literal, write_uri_literal, Dict, Value};

/// Encode a single value as a Zinc literal.
pub fn encode_value(val: &Value) -> String {
    let mut out = String::new();
    write_val(val, 0, &mut out);
    out
}

/// Encode a grid as a top-level Zinc document.
///
/// ```rust
/// use haystack_core::{encode_grid, read_grid};
///
/// let zinc = "ver:\"3.0\" dis:\"Sites\"\nid,area\n@a,3500ft²\n";
/// let grid = read_grid(zinc).unwrap();
/// assert_eq!(encode_grid(&grid), zinc);
/// ```
pub fn encode_grid(grid: &Grid) -> String {
    let mut out = String::new();
    write_grid(grid, 0, &mut out);
    out
}

/// `depth` is the nesting level of the grid enclosing `val`, used only when
/// `val` holds grids.
fn write_val(val: &Value, depth: usize, out: &mut String) {
    match val {
        Value::Null => out.push('N'),
        Value::Bool(true) => out.push('T'),
        Value::Bool(false) => out.push('F'),
        Value::Number(n) => out.push_str(&n.to_zinc()),
        Value::Str(s) => write_str_literal(s, out),
        Value::Uri(u) => write_uri_literal(u, out),
        Value::Ref(r) => out.push_str(&r.to_zinc()),
        Value::Date(d) => out.push_str(&d.to_string()),
        Value::Time(t) => out.push_str(&t.to_string()),
        Value::DateTime(dt) => out.push_str(&dt.to_string()),
        Value::Coord(c) => out.push_str(&c.to_zinc()),
        Value::Marker => out.push('M'),
        Value::Remove => out.push('R'),
        Value::NA => out.push_str("NA"),
        Value::Symbol(name) => {
            out.push('^');
            out.push_str(name);
        }
        Value::XStr(x) => out.push_str(&x.to_zinc()),
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_val(item, depth, out);
            }
            out.push(']');
        }
        Value::Dict(dict) => {
            out.push('{');
            write_tags(dict, depth, out);
            out.push('}');
        }
        Value::Grid(grid) => {
            out.push_str("<<\n");
            write_grid(grid, depth + 1, out);
            out.push_str(&make_indent(depth + 1));
            out.push_str(">>");
        }
    }
}

/// Space-separated `name:val` pairs; markers as the bare name.
fn write_tags(dict: &Dict, depth: usize, out: &mut String) {
    for (i, (name, val)) in dict.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(name);
        if !val.is_marker() {
            out.push(':');
            write_val(val, depth, out);
        }
    }
}

fn write_grid(grid: &Grid, depth: usize, out: &mut String) {
    let indent = make_indent(depth);

    out.push_str(&indent);
    out.push_str("ver:");
    write_str_literal(grid.version().as_str(), out);
    if !grid.meta().is_empty() {
        out.push(' ');
        write_tags(grid.meta(), depth, out);
    }
    out.push('\n');

    out.push_str(&indent);
    // a grid without columns never holds rows
    if grid.cols().is_empty() {
        out.push_str("empty\n");
        return;
    }
    for (i, col) in grid.cols().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(col.name());
        if !col.meta().is_empty() {
            out.push(' ');
            write_tags(col.meta(), depth, out);
        }
    }
    out.push('\n');

    // An all-empty line would read back as the blank line ending the rows.
    let single_col = grid.cols().len() == 1;
    for row in grid.rows() {
        out.push_str(&indent);
        for (i, cell) in row.cells().iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if !cell.is_null() || single_col {
                write_val(cell, depth, out);
            }
        }
        out.push('\n');
    }
}

/// Two spaces per nesting level.
fn make_indent(depth: usize) -> String {
    "  ".repeat(depth)
}
