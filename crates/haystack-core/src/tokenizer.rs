//! Zinc tokenizer.
//!
//! A single-pass lexer over the input's chars holding the current char and
//! one char of lookahead. Literal tokens carry their materialized value
//! (a [`Number`], [`Date`], ...), so the parser never re-reads text.
//!
//! # Numbers, dates and times
//!
//! Numeric-looking input is scanned greedily as one run while counting dashes
//! and colons and remembering where a unit suffix starts. The counts decide
//! the token afterwards:
//!
//! | dashes | colons | token |
//! |---|---|---|
//! | 2 | 0 | `Date` (`2016-06-06`) |
//! | 0 | ≥ 1 | `Time` (`8:30`, `01:02:03.123`) |
//! | ≥ 2 | any | `DateTime` (`2016-01-13T09:51:33-05:00 New_York`) |
//! | otherwise | | `Number`, split into value and unit (`-40ms`, `12%`) |
//!
//! A `0x` prefix lexes a hexadecimal integer instead.

use std::fmt;
use std::str::Chars;

use crate::error::{HaystackError, Result};
use crate::value::{is_ref_char, Date, DateTime, Number, Time};

/// Backslash sequences inside a URI that are kept verbatim instead of being
/// decoded.
pub(crate) const URI_ESCAPE_IGNORE: [char; 11] = [':', '/', '?', '#', '[', ']', '@', '\\', '&', '=', ';'];

/// A Zinc token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Eof,
    Nl,
    Id(String),
    Str(String),
    Uri(String),
    Ref(String),
    Symbol(String),
    Number(Number),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    Colon,
    Comma,
    Semicolon,
    Minus,
    Eq,
    NotEq,
    Lt,
    Lt2,
    LtEq,
    Gt,
    Gt2,
    GtEq,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Arrow,
    Slash,
    Assign,
    Bang,
}

impl Token {
    /// Short name of the token class, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Token::Eof => "eof",
            Token::Nl => "newline",
            Token::Id(_) => "identifier",
            Token::Str(_) => "Str",
            Token::Uri(_) => "Uri",
            Token::Ref(_) => "Ref",
            Token::Symbol(_) => "Symbol",
            Token::Number(_) => "Number",
            Token::Date(_) => "Date",
            Token::Time(_) => "Time",
            Token::DateTime(_) => "DateTime",
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Minus => "-",
            Token::Eq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::Lt2 => "<<",
            Token::LtEq => "<=",
            Token::Gt => ">",
            Token::Gt2 => ">>",
            Token::GtEq => ">=",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Arrow => "->",
            Token::Slash => "/",
            Token::Assign => "=",
            Token::Bang => "!",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Id(s) => write!(f, "identifier {s}"),
            Token::Str(s) => write!(f, "Str {s:?}"),
            Token::Uri(s) => write!(f, "Uri `{s}`"),
            Token::Ref(s) => write!(f, "Ref @{s}"),
            Token::Symbol(s) => write!(f, "Symbol ^{s}"),
            Token::Number(n) => write!(f, "Number {}", n.to_zinc()),
            Token::Date(d) => write!(f, "Date {d}"),
            Token::Time(t) => write!(f, "Time {t}"),
            Token::DateTime(dt) => write!(f, "DateTime {dt}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Lexer over a Zinc string.
pub struct Tokenizer<'a> {
    chars: Chars<'a>,
    cur: Option<char>,
    peek: Option<char>,
    line: usize,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars();
        let cur = chars.next();
        let peek = chars.next();
        Self {
            chars,
            cur,
            peek,
            line: 1,
            done: false,
        }
    }

    /// 1-based line of the current position.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the next token, skipping whitespace and comments. Returns
    /// [`Token::Eof`] once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia()?;

        let c = match self.cur {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        match c {
            '\n' => {
                self.consume();
                Ok(Token::Nl)
            }
            '\r' => {
                self.consume();
                if self.cur == Some('\n') {
                    self.consume();
                }
                Ok(Token::Nl)
            }
            c if c.is_ascii_alphabetic() => Ok(self.lex_id()),
            '"' => self.lex_str(),
            '`' => self.lex_uri(),
            '@' => self.lex_ref(),
            '^' => self.lex_symbol(),
            c if c.is_ascii_digit() => self.lex_num(),
            '-' if self.peek.is_some_and(|p| p.is_ascii_digit()) => self.lex_num(),
            _ => self.lex_punct(),
        }
    }

    fn consume(&mut self) {
        if self.cur == Some('\n') || (self.cur == Some('\r') && self.peek != Some('\n')) {
            self.line += 1;
        }
        self.cur = self.peek;
        self.peek = self.chars.next();
    }

    fn err(&self, message: impl Into<String>) -> HaystackError {
        HaystackError::Lex {
            line: self.line,
            message: message.into(),
        }
    }

    /// Skip spaces, tabs, NBSP, `//` line comments and nested `/* */` block
    /// comments. Newlines are tokens and are left in place.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match (self.cur, self.peek) {
                (Some(' ' | '\t' | '\u{a0}'), _) => self.consume(),
                (Some('/'), Some('/')) => {
                    while !matches!(self.cur, None | Some('\n' | '\r')) {
                        self.consume();
                    }
                }
                (Some('/'), Some('*')) => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        self.consume();
        self.consume();
        let mut depth = 1usize;
        loop {
            match (self.cur, self.peek) {
                (None, _) => return Err(self.err("unterminated block comment")),
                (Some('/'), Some('*')) => {
                    self.consume();
                    self.consume();
                    depth += 1;
                }
                (Some('*'), Some('/')) => {
                    self.consume();
                    self.consume();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => self.consume(),
            }
        }
    }

    fn lex_id(&mut self) -> Token {
        let mut s = String::new();
        while let Some(c) = self.cur.filter(|&c| is_id_part(c)) {
            s.push(c);
            self.consume();
        }
        Token::Id(s)
    }

    fn lex_str(&mut self) -> Result<Token> {
        self.consume();
        let mut s = String::new();
        loop {
            match self.cur {
                None => return Err(self.err("unexpected end of str")),
                Some('\n' | '\r') => return Err(self.err("unexpected newline in str")),
                Some('"') => {
                    self.consume();
                    return Ok(Token::Str(s));
                }
                Some('\\') => s.push(self.lex_escape()?),
                Some(c) => {
                    s.push(c);
                    self.consume();
                }
            }
        }
    }

    fn lex_uri(&mut self) -> Result<Token> {
        self.consume();
        let mut s = String::new();
        loop {
            match self.cur {
                None => return Err(self.err("unexpected end of uri")),
                Some('\n' | '\r') => return Err(self.err("unexpected newline in uri")),
                Some('`') => {
                    self.consume();
                    return Ok(Token::Uri(s));
                }
                Some('\\') => match self.peek {
                    Some(p) if URI_ESCAPE_IGNORE.contains(&p) => {
                        s.push('\\');
                        s.push(p);
                        self.consume();
                        self.consume();
                    }
                    _ => s.push(self.lex_escape()?),
                },
                Some(c) => {
                    s.push(c);
                    self.consume();
                }
            }
        }
    }

    /// Decode one backslash escape, starting at the backslash.
    fn lex_escape(&mut self) -> Result<char> {
        self.consume();
        let c = match self.cur {
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some(c @ ('"' | '$' | '\'' | '`' | '\\')) => c,
            Some('u') => {
                self.consume();
                return self.lex_unicode_escape();
            }
            Some(c) => return Err(self.err(format!("invalid escape sequence: \\{c}"))),
            None => return Err(self.err("unexpected end of escape sequence")),
        };
        self.consume();
        Ok(c)
    }

    /// `\uXXXX`, combining a UTF-16 surrogate pair when one follows.
    fn lex_unicode_escape(&mut self) -> Result<char> {
        let unit = self.lex_hex4()?;
        if let Some(c) = char::from_u32(unit) {
            return Ok(c);
        }
        if (0xD800..0xDC00).contains(&unit) && self.cur == Some('\\') && self.peek == Some('u') {
            self.consume();
            self.consume();
            let low = self.lex_hex4()?;
            if (0xDC00..0xE000).contains(&low) {
                let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                if let Some(c) = char::from_u32(code) {
                    return Ok(c);
                }
            }
        }
        Err(self.err(format!("invalid unicode escape: \\u{unit:04x}")))
    }

    fn lex_hex4(&mut self) -> Result<u32> {
        let mut n = 0u32;
        for _ in 0..4 {
            match self.cur.and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    n = n * 16 + d;
                    self.consume();
                }
                None => return Err(self.err("invalid hex digit in unicode escape")),
            }
        }
        Ok(n)
    }

    fn lex_ref(&mut self) -> Result<Token> {
        self.consume();
        let id = self.lex_qualified_name();
        if id.is_empty() {
            return Err(self.err("empty ref id"));
        }
        Ok(Token::Ref(id))
    }

    fn lex_symbol(&mut self) -> Result<Token> {
        self.consume();
        let name = self.lex_qualified_name();
        if name.is_empty() {
            return Err(self.err("empty symbol name"));
        }
        Ok(Token::Symbol(name))
    }

    /// Id chars plus `- : . ~`, shared by refs and symbols.
    fn lex_qualified_name(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.cur.filter(|&c| is_ref_char(c)) {
            s.push(c);
            self.consume();
        }
        s
    }

    fn lex_num(&mut self) -> Result<Token> {
        if self.cur == Some('0') && self.peek == Some('x') {
            return self.lex_hex();
        }

        let mut s = String::new();
        let mut dashes = 0usize;
        let mut colons = 0usize;
        let mut exponential = false;
        let mut unit_index: Option<usize> = None;

        // leading digit or minus sign
        if let Some(c) = self.cur {
            s.push(c);
            self.consume();
        }

        while let Some(c) = self.cur {
            let peek_digit = self.peek.is_some_and(|p| p.is_ascii_digit());
            if c.is_ascii_digit() {
                s.push(c);
                self.consume();
            } else if (c == 'e' || c == 'E')
                && !exponential
                && unit_index.is_none()
                && (peek_digit || matches!(self.peek, Some('+' | '-')))
            {
                exponential = true;
                s.push(c);
                self.consume();
                if let Some(sign @ ('+' | '-')) = self.cur {
                    s.push(sign);
                    self.consume();
                }
            } else if c == '-' {
                dashes += 1;
                s.push(c);
                self.consume();
            } else if c == '+' && dashes == 2 && unit_index.is_some() && peek_digit {
                // positive UTC offset of a datetime
                s.push(c);
                self.consume();
            } else if c == ':' && peek_digit {
                colons += 1;
                s.push(c);
                self.consume();
            } else if c == '.' && peek_digit {
                s.push(c);
                self.consume();
            } else if c == '_' && unit_index.is_none() && peek_digit {
                // digit grouping
                self.consume();
            } else if is_unit_char(c) || c == '_' {
                if unit_index.is_none() {
                    unit_index = Some(s.len());
                }
                s.push(c);
                self.consume();
            } else {
                break;
            }
        }

        if dashes == 2 && colons == 0 {
            return Ok(Token::Date(parse_date(&s).map_err(|m| self.err(m))?));
        }
        if dashes == 0 && colons >= 1 {
            return Ok(Token::Time(parse_time(&s).map_err(|m| self.err(m))?));
        }
        if dashes >= 2 {
            return self.lex_datetime(&s);
        }

        let (num, unit) = match unit_index {
            Some(i) if i > 0 => s.split_at(i),
            _ => (s.as_str(), ""),
        };
        let value: f64 = num
            .parse()
            .map_err(|_| self.err(format!("invalid number literal: {s}")))?;
        Ok(Token::Number(Number::with_unit(value, unit)))
    }

    fn lex_hex(&mut self) -> Result<Token> {
        self.consume();
        self.consume();
        let mut s = String::new();
        while let Some(c) = self.cur.filter(|c| c.is_ascii_hexdigit() || *c == '_') {
            if c != '_' {
                s.push(c);
            }
            self.consume();
        }
        let value = u64::from_str_radix(&s, 16)
            .map_err(|_| self.err(format!("invalid hex literal: 0x{s}")))?;
        Ok(Token::Number(Number::new(value as f64)))
    }

    /// Finish a datetime whose date/time/offset run is `s`: read the
    /// timezone name that follows, or default it to `UTC` after a `Z`.
    fn lex_datetime(&mut self, s: &str) -> Result<Token> {
        let tz = if self.cur == Some(' ') && self.peek.is_some_and(|c| c.is_ascii_uppercase()) {
            self.consume();
            let mut tz = String::new();
            while let Some(c) = self
                .cur
                .filter(|&c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                tz.push(c);
                self.consume();
            }
            if tz.ends_with("GMT")
                && matches!(self.cur, Some('+' | '-'))
                && self.peek.is_some_and(|c| c.is_ascii_digit())
            {
                while let Some(c) = self
                    .cur
                    .filter(|&c| c.is_ascii_digit() || (c == '+' || c == '-'))
                {
                    tz.push(c);
                    self.consume();
                }
            }
            tz
        } else if s.ends_with('Z') {
            "UTC".to_string()
        } else {
            return Err(self.err(format!("expecting timezone name after {s}")));
        };

        let dt = parse_datetime(s, tz).map_err(|m| self.err(m))?;
        Ok(Token::DateTime(dt))
    }

    fn lex_punct(&mut self) -> Result<Token> {
        let c = match self.cur {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };
        self.consume();
        let tok = match c {
            ':' => Token::Colon,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '/' => Token::Slash,
            '-' => self.follow('>', Token::Arrow, Token::Minus),
            '=' => self.follow('=', Token::Eq, Token::Assign),
            '!' => self.follow('=', Token::NotEq, Token::Bang),
            '<' => match self.cur {
                Some('<') => {
                    self.consume();
                    Token::Lt2
                }
                Some('=') => {
                    self.consume();
                    Token::LtEq
                }
                _ => Token::Lt,
            },
            '>' => match self.cur {
                Some('>') => {
                    self.consume();
                    Token::Gt2
                }
                Some('=') => {
                    self.consume();
                    Token::GtEq
                }
                _ => Token::Gt,
            },
            other => return Err(self.err(format!("unexpected symbol: {other:?}"))),
        };
        Ok(tok)
    }

    /// `two` if the current char is `next` (consuming it), else `one`.
    fn follow(&mut self, next: char, two: Token, one: Token) -> Token {
        if self.cur == Some(next) {
            self.consume();
            two
        } else {
            one
        }
    }
}

/// Yields tokens up to (not including) [`Token::Eof`], stopping after the
/// first error.
impl Iterator for Tokenizer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_token() {
            Ok(Token::Eof) => {
                self.done = true;
                None
            }
            Ok(tok) => Some(Ok(tok)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn is_id_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_unit_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '%' | '$' | '/') || (c as u32) > 127
}

fn parse_int<T: std::str::FromStr>(s: &str, what: &str, literal: &str) -> std::result::Result<T, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid {what} in {literal}"));
    }
    s.parse().map_err(|_| format!("invalid {what} in {literal}"))
}

/// `YYYY-MM-DD`, zero padded.
pub(crate) fn parse_date(s: &str) -> std::result::Result<Date, String> {
    let mut parts = s.splitn(3, '-');
    let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("invalid date: {s}"));
    };
    if y.len() != 4 || m.len() != 2 || d.len() != 2 {
        return Err(format!("date must be YYYY-MM-DD: {s}"));
    }
    let year = parse_int(y, "year", s)?;
    let month = parse_int(m, "month", s)?;
    let day = parse_int(d, "day", s)?;
    Date::new(year, month, day).map_err(|e| e.to_string())
}

/// `h:mm`, `hh:mm:ss` or `hh:mm:ss.fff`. Missing seconds are zero; the
/// fraction is truncated to milliseconds.
pub(crate) fn parse_time(s: &str) -> std::result::Result<Time, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("invalid time: {s}"));
    }
    let hour = parse_int(parts[0], "hour", s)?;
    let min = parse_int(parts[1], "minute", s)?;
    let (sec, ms) = match parts.get(2) {
        None => (0, 0),
        Some(sec_part) => match sec_part.split_once('.') {
            None => (parse_int(sec_part, "second", s)?, 0),
            Some((sec, frac)) => {
                let sec = parse_int(sec, "second", s)?;
                let digits: String = frac.chars().chain("000".chars()).take(3).collect();
                (sec, parse_int(&digits, "fraction", s)?)
            }
        },
    };
    Time::new(hour, min, sec, ms).map_err(|e| e.to_string())
}

/// `YYYY-MM-DDThh:mm:ss[.fff](Z|±hh:mm)`.
pub(crate) fn parse_datetime(s: &str, tz: String) -> std::result::Result<DateTime, String> {
    let (date_part, rest) = s
        .split_once('T')
        .ok_or_else(|| format!("invalid datetime: {s}"))?;
    let date = parse_date(date_part)?;
    let (time_part, offset) = match rest.strip_suffix('Z') {
        Some(time_part) => (time_part, 0),
        None => {
            let i = rest
                .rfind(['+', '-'])
                .ok_or_else(|| format!("missing UTC offset in datetime: {s}"))?;
            (&rest[..i], parse_offset(&rest[i..], s)?)
        }
    };
    let time = parse_time(time_part)?;
    DateTime::new(date, time, offset, tz).map_err(|e| e.to_string())
}

/// `+hh:mm`, `-hh:mm` or `±hh` to seconds east of UTC.
fn parse_offset(s: &str, literal: &str) -> std::result::Result<i32, String> {
    let (sign, body) = s.split_at(1);
    let (h, m) = body.split_once(':').unwrap_or((body, "0"));
    let hours: i32 = parse_int(h, "offset hours", literal)?;
    let mins: i32 = parse_int(m, "offset minutes", literal)?;
    if hours > 23 || mins > 59 {
        return Err(format!("UTC offset out of range in {literal}"));
    }
    let secs = hours * 3600 + mins * 60;
    Ok(if sign == "-" { -secs } else { secs })
}
