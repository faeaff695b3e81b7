//! Zinc reader: a recursive-descent parser over the [`Tokenizer`] stream.
//!
//! The reader keeps one token of lookahead (`cur`). A document that starts
//! with the `ver` identifier is a grid; anything else is a single value.
//!
//! # Grammar
//!
//! ```text
//! grid    := ["<<" [nl]] "ver" ":" str [meta] nl cols nl rows [nl] [">>"]
//! cols    := col ("," col)*
//! col     := id [meta]
//! rows    := (row nl)*            until blank line, eof, or ">>" when nested
//! row     := [val] ("," [val])*   exactly one cell per column
//! meta    := (id [":" val])*      bare tag run
//! val     := literal | keyword | id "(" args ")" | "-" "INF"
//!          | "[" [val ("," val)* [","]] "]"
//!          | "{" (id [":" val] [","])* "}"
//!          | "<<" grid ">>"
//! ```
//!
//! Nesting depth (lists, dicts, nested grids) is bounded by
//! [`ParseOptions::max_depth`].

use std::mem;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{HaystackError, Result};
use crate::grid::{Grid, GridBuilder, Version};
use crate::tokenizer::{Token, Tokenizer};
use crate::value::{validate_name, Coord, Dict, Number, Ref, Value, XStr};

/// Reader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Maximum nesting of lists, dicts and grids inside one another.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Parse a Zinc document: a grid when it starts with `ver:`, otherwise a
/// single value.
///
/// ```rust
/// use haystack_core::{read_value, Value};
///
/// let v = read_value("[1, 2kW, \"three\"]").unwrap();
/// assert_eq!(v.to_zinc(), "[1,2kW,\"three\"]");
/// ```
pub fn read_value(zinc: &str) -> Result<Value> {
    ZincReader::new(zinc)?.read_value()
}

/// Parse a Zinc document that must be a grid.
pub fn read_grid(zinc: &str) -> Result<Grid> {
    ZincReader::new(zinc)?.read_grid()
}

/// Zinc parser state: the token stream, one token of lookahead and the
/// current nesting depth.
pub struct ZincReader<'a> {
    tokens: Tokenizer<'a>,
    cur: Token,
    line: usize,
    depth: usize,
    options: ParseOptions,
}

impl<'a> ZincReader<'a> {
    pub fn new(zinc: &'a str) -> Result<Self> {
        Self::with_options(zinc, ParseOptions::default())
    }

    pub fn with_options(zinc: &'a str, options: ParseOptions) -> Result<Self> {
        let mut tokens = Tokenizer::new(zinc);
        let cur = tokens.next_token()?;
        Ok(Self {
            tokens,
            cur,
            line: 1,
            depth: 0,
            options,
        })
    }

    /// Read the whole input as one value (a grid if it starts with `ver`).
    pub fn read_value(&mut self) -> Result<Value> {
        self.skip_newlines()?;
        let val = if self.at_grid_header() {
            Value::from(self.parse_grid(false)?)
        } else {
            self.parse_val()?
        };
        self.finish()?;
        Ok(val)
    }

    /// Read the whole input as one grid.
    pub fn read_grid(&mut self) -> Result<Grid> {
        self.skip_newlines()?;
        let grid = self.parse_grid(false)?;
        self.finish()?;
        Ok(grid)
    }

    fn at_grid_header(&self) -> bool {
        matches!(&self.cur, Token::Id(id) if id == "ver")
    }

    /// Only blank lines may follow the document.
    fn finish(&mut self) -> Result<()> {
        self.skip_newlines()?;
        if self.cur == Token::Eof {
            Ok(())
        } else {
            Err(self.err(format!("expected end of input, not {}", self.cur)))
        }
    }

    fn skip_newlines(&mut self) -> Result<()> {
        while self.cur == Token::Nl {
            self.advance()?;
        }
        Ok(())
    }

    /// Move to the next token and return the previous current one.
    fn advance(&mut self) -> Result<Token> {
        self.line = self.tokens.line();
        let next = self.tokens.next_token()?;
        Ok(mem::replace(&mut self.cur, next))
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.cur != expected {
            return Err(self.err(format!("expected {}, not {}", expected.name(), self.cur)));
        }
        self.advance()?;
        Ok(())
    }

    fn err(&self, message: impl Into<String>) -> HaystackError {
        HaystackError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.options.max_depth {
            return Err(self.err(format!(
                "nesting deeper than {} levels",
                self.options.max_depth
            )));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn parse_val(&mut self) -> Result<Value> {
        match self.advance()? {
            Token::Id(id) => {
                if self.cur == Token::LParen {
                    self.parse_call(id)
                } else {
                    self.parse_keyword(&id)
                }
            }
            Token::Str(s) => Ok(Value::Str(s)),
            Token::Uri(u) => Ok(Value::Uri(u)),
            Token::Ref(id) => {
                if matches!(self.cur, Token::Str(_)) {
                    if let Token::Str(dis) = self.advance()? {
                        return Ok(Value::Ref(Ref::with_dis(id, dis)?));
                    }
                }
                Ok(Value::Ref(Ref::new(id)?))
            }
            Token::Symbol(name) => Value::symbol(name),
            Token::Number(n) => Ok(Value::Number(n)),
            Token::Date(d) => Ok(Value::Date(d)),
            Token::Time(t) => Ok(Value::Time(t)),
            Token::DateTime(dt) => Ok(Value::DateTime(dt)),
            Token::Minus => {
                if !matches!(&self.cur, Token::Id(id) if id == "INF") {
                    return Err(self.err(format!("expected INF after -, not {}", self.cur)));
                }
                self.advance()?;
                Ok(Value::Number(Number::new(f64::NEG_INFINITY)))
            }
            Token::LBracket => self.nested(Self::parse_list),
            Token::LBrace => self.nested(|r| r.parse_dict(true)).map(Value::Dict),
            Token::Lt2 => self
                .nested(|r| r.parse_grid(true))
                .map(|g| Value::Grid(Arc::new(g))),
            other => Err(self.err(format!("unexpected {other}"))),
        }
    }

    fn parse_keyword(&self, id: &str) -> Result<Value> {
        Ok(match id {
            "T" => Value::Bool(true),
            "F" => Value::Bool(false),
            "N" => Value::Null,
            "M" => Value::Marker,
            "NA" => Value::NA,
            "R" => Value::Remove,
            "NaN" => Value::Number(Number::new(f64::NAN)),
            "INF" => Value::Number(Number::new(f64::INFINITY)),
            other => return Err(self.err(format!("unexpected identifier: {other}"))),
        })
    }

    /// `C(lat,lng)` when the first argument is a number, else
    /// `Type("payload")`.
    fn parse_call(&mut self, id: String) -> Result<Value> {
        self.expect(Token::LParen)?;
        if matches!(self.cur, Token::Number(_)) {
            let lat = self.parse_coord_part()?;
            self.expect(Token::Comma)?;
            let lng = self.parse_coord_part()?;
            self.expect(Token::RParen)?;
            return Ok(Value::Coord(Coord::new(lat, lng)));
        }

        if !id.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(self.err(format!("invalid XStr type name: {id}")));
        }
        let payload = match self.advance()? {
            Token::Str(s) => s,
            other => return Err(self.err(format!("expected Str argument to {id}(), not {other}"))),
        };
        self.expect(Token::RParen)?;
        Ok(Value::XStr(XStr::new(id, payload)?))
    }

    fn parse_coord_part(&mut self) -> Result<f64> {
        match self.advance()? {
            Token::Number(n) if n.unit().is_none() => Ok(n.value()),
            other => Err(self.err(format!("expected coord number, not {other}"))),
        }
    }

    /// After `[`.
    fn parse_list(&mut self) -> Result<Value> {
        let mut items = Vec::new();
        while self.cur != Token::RBracket {
            if self.cur == Token::Eof {
                return Err(self.err("unterminated list"));
            }
            items.push(self.parse_val()?);
            if self.cur == Token::Comma {
                self.advance()?;
            } else {
                break;
            }
        }
        self.expect(Token::RBracket)?;
        Ok(Value::List(items))
    }

    /// A run of `name[:val]` tags. When `braced`, the opening `{` has been
    /// consumed, commas may separate tags and the run ends at `}`. Otherwise
    /// the run ends at the first token that is not an identifier.
    fn parse_dict(&mut self, braced: bool) -> Result<Dict> {
        let mut dict = Dict::new();
        loop {
            if braced {
                while self.cur == Token::Comma {
                    self.advance()?;
                }
                if self.cur == Token::RBrace {
                    self.advance()?;
                    break;
                }
            }
            if !matches!(self.cur, Token::Id(_)) {
                if braced {
                    return Err(self.err(format!("expected tag name or }}, not {}", self.cur)));
                }
                break;
            }
            let Token::Id(name) = self.advance()? else {
                return Err(self.err("expected tag name"));
            };
            validate_name(&name).map_err(|e| self.err(e.to_string()))?;
            if dict.get(&name).is_some() {
                return Err(self.err(format!("duplicate tag name: {name}")));
            }
            let val = if self.cur == Token::Colon {
                self.advance()?;
                self.parse_val()?
            } else {
                Value::Marker
            };
            dict.insert(name, val);
        }
        Ok(dict)
    }

    /// A grid body. When `nested`, the opening `<<` has been consumed and a
    /// closing `>>` is required.
    fn parse_grid(&mut self, nested: bool) -> Result<Grid> {
        if nested {
            tracing::trace!(depth = self.depth, "nested grid");
            if self.cur == Token::Nl {
                self.advance()?;
            }
        }

        match self.advance()? {
            Token::Id(id) if id == "ver" => {}
            other => return Err(self.err(format!("expected grid header 'ver', not {other}"))),
        }
        self.expect(Token::Colon)?;
        let version = match self.advance()? {
            Token::Str(s) => Version::parse(&s)
                .ok_or_else(|| self.err(format!("unsupported grid version: {s:?}")))?,
            other => return Err(self.err(format!("expected version Str, not {other}"))),
        };

        let mut gb = GridBuilder::new();
        gb.set_version(version);
        if matches!(self.cur, Token::Id(_)) {
            gb.set_meta(self.parse_dict(false)?);
        }
        self.expect(Token::Nl)?;

        if !matches!(self.cur, Token::Id(_)) {
            return Err(self.err(format!("missing column definitions, found {}", self.cur)));
        }
        loop {
            let name = match self.advance()? {
                Token::Id(name) => name,
                other => return Err(self.err(format!("expected column name, not {other}"))),
            };
            let meta = if matches!(self.cur, Token::Id(_)) {
                self.parse_dict(false)?
            } else {
                Dict::new()
            };
            gb.add_col_with_meta(name, meta)
                .map_err(|e| self.err(e.to_string()))?;
            if self.cur == Token::Comma {
                self.advance()?;
            } else {
                break;
            }
        }
        self.end_line(nested)?;

        let num_cols = gb.num_cols();
        while !self.at_rows_end(nested) {
            let mut cells = Vec::with_capacity(num_cols);
            for i in 0..num_cols {
                if self.at_cell_end(nested) {
                    cells.push(Value::Null);
                } else {
                    cells.push(self.parse_val()?);
                }
                if i + 1 < num_cols {
                    self.expect(Token::Comma)?;
                }
            }
            gb.add_row(cells).map_err(|e| self.err(e.to_string()))?;
            self.end_line(nested)?;
        }

        if self.cur == Token::Nl {
            self.advance()?;
        }
        if nested {
            self.expect(Token::Gt2)?;
        }

        let grid = gb.build();
        tracing::debug!(
            version = grid.version().as_str(),
            cols = grid.cols().len(),
            rows = grid.len(),
            nested,
            "parsed zinc grid"
        );
        Ok(grid)
    }

    /// Consume the newline ending a header or row line. End of input, or
    /// `>>` in a nested grid, also ends the line but is left in place.
    fn end_line(&mut self, nested: bool) -> Result<()> {
        match self.cur {
            Token::Nl => {
                self.advance()?;
                Ok(())
            }
            Token::Eof => Ok(()),
            Token::Gt2 if nested => Ok(()),
            _ => Err(self.err(format!("expected end of line, not {}", self.cur))),
        }
    }

    fn at_rows_end(&self, nested: bool) -> bool {
        match self.cur {
            Token::Eof | Token::Nl => true,
            Token::Gt2 => nested,
            _ => false,
        }
    }

    fn at_cell_end(&self, nested: bool) -> bool {
        match self.cur {
            Token::Comma | Token::Nl | Token::Eof => true,
            Token::Gt2 => nested,
            _ => false,
        }
    }
}
