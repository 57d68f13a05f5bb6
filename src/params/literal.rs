//! Safe literal grammar for loose parameter values.
//!
//! Accepts the constant subset of Python-style literals: `None`, booleans,
//! integers, floats, quoted strings, lists, tuples and dicts. Names, calls
//! and operators are rejected, so nothing is ever evaluated.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Parse `input` as a single literal. Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Option<Literal> {
        let mut parser = LiteralParser {
            chars: input.char_indices().peekable(),
            src: input,
        };
        parser.skip_ws();
        let literal = parser.value()?;
        parser.skip_ws();
        match parser.chars.peek() {
            None => Some(literal),
            Some(_) => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => write!(f, "None"),
            Literal::Bool(true) => write!(f, "True"),
            Literal::Bool(false) => write!(f, "False"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) if x.is_nan() => write!(f, "nan"),
            Literal::Float(x) if x.is_infinite() => {
                // Overflowing literal, so the text parses back to the same value.
                write!(f, "{}", if *x > 0.0 { "1e999" } else { "-1e999" })
            }
            Literal::Float(x) if x.fract() == 0.0 => write!(f, "{x:.1}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::Str(s) => {
                write!(f, "'")?;
                for c in s.chars() {
                    match c {
                        '\\' => write!(f, "\\\\")?,
                        '\'' => write!(f, "\\'")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        '|' => write!(f, "\\x7c")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "'")
            }
            Literal::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Literal::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

struct LiteralParser<'a> {
    chars: Peekable<CharIndices<'a>>,
    src: &'a str,
}

impl LiteralParser<'_> {
    fn skip_ws(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if(|(_, c)| *c == expected).is_some()
    }

    fn value(&mut self) -> Option<Literal> {
        let &(_, c) = self.chars.peek()?;
        match c {
            '\'' | '"' => self.string().map(Literal::Str),
            '[' => self.sequence('[', ']').map(Literal::List),
            '(' => self.sequence('(', ')').map(Literal::List),
            '{' => self.dict(),
            '+' | '-' | '.' | '0'..='9' => self.number(),
            c if c.is_alphabetic() => self.keyword(),
            _ => None,
        }
    }

    fn keyword(&mut self) -> Option<Literal> {
        let start = self.chars.peek()?.0;
        let mut end = start;
        while let Some((i, c)) = self.chars.next_if(|(_, c)| c.is_alphanumeric() || *c == '_') {
            end = i + c.len_utf8();
        }
        match &self.src[start..end] {
            "None" => Some(Literal::None),
            "True" => Some(Literal::Bool(true)),
            "False" => Some(Literal::Bool(false)),
            _ => None,
        }
    }

    fn number(&mut self) -> Option<Literal> {
        let start = self.chars.peek()?.0;
        let mut end = start;
        while let Some((i, c)) = self
            .chars
            .next_if(|(_, c)| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-'))
        {
            end = i + c.len_utf8();
        }
        parse_number(&self.src[start..end])
    }

    fn string(&mut self) -> Option<String> {
        let (_, quote) = self.chars.next()?;
        let mut out = String::new();
        loop {
            let (_, c) = self.chars.next()?;
            match c {
                c if c == quote => return Some(out),
                '\\' => {
                    let (_, esc) = self.chars.next()?;
                    match esc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        'x' => {
                            let hi = self.chars.next()?.1.to_digit(16)?;
                            let lo = self.chars.next()?.1.to_digit(16)?;
                            out.push(char::from_u32(hi * 16 + lo)?);
                        }
                        '\\' | '\'' | '"' => out.push(esc),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn sequence(&mut self, open: char, close: char) -> Option<Vec<Literal>> {
        if !self.eat(open) {
            return None;
        }
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Some(items);
            }
            items.push(self.value()?);
            self.skip_ws();
            if self.eat(close) {
                return Some(items);
            }
            if !self.eat(',') {
                return None;
            }
        }
    }

    fn dict(&mut self) -> Option<Literal> {
        if !self.eat('{') {
            return None;
        }
        let mut entries = Vec::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Some(Literal::Dict(entries));
            }
            let key = self.value()?;
            self.skip_ws();
            if !self.eat(':') {
                return None;
            }
            self.skip_ws();
            let value = self.value()?;
            entries.push((key, value));
            self.skip_ws();
            if self.eat('}') {
                return Some(Literal::Dict(entries));
            }
            if !self.eat(',') {
                return None;
            }
        }
    }
}

fn parse_number(text: &str) -> Option<Literal> {
    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if body.is_empty() || body.starts_with('_') || body.ends_with('_') || body.contains("__") {
        return None;
    }
    let digits = body.replace('_', "");

    let radix = match digits.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let value = i64::from_str_radix(&digits[2..], radix).ok()?;
        return Some(Literal::Int(if negative { -value } else { value }));
    }

    let sign = if negative { "-" } else { "" };
    if digits.bytes().all(|b| b.is_ascii_digit()) {
        // Leading zeros are not valid integer literals ("007").
        if digits.len() > 1 && digits.starts_with('0') && digits.bytes().any(|b| b != b'0') {
            return None;
        }
        return format!("{sign}{digits}").parse().ok().map(Literal::Int);
    }

    let float_shaped = digits
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
        && digits.bytes().any(|b| b.is_ascii_digit());
    if !float_shaped {
        return None;
    }
    format!("{sign}{digits}").parse().ok().map(Literal::Float)
}
