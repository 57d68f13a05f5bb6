use regex::Regex;
use std::sync::LazyLock;

use crate::error::{QueryError, QueryResult};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)^(?:
            (?P<ws>\s+)
          | (?P<float>(?:\d+\.\d*|\.\d+)(?:[eE][+-]?\d+)?|\d+[eE][+-]?\d+)
          | (?P<int>\d+)
          | (?P<str>'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*")
          | (?P<tick>`[^`]+`)
          | (?P<name>[\p{L}_][\p{L}\p{N}_]*)
          | (?P<op>==|!=|<=|>=|//|[<>+\-*/%&|~()\[\],])
        )"#,
    )
    .expect("token pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Name(String),
    True,
    False,
    None,
    And,
    Or,
    Not,
    In,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    FloorDiv,
    Percent,
    Amp,
    Pipe,
    Tilde,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub fn tokenize(source: &str) -> QueryResult<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];
        let caps = TOKEN
            .captures(rest)
            .ok_or_else(|| QueryError::syntax(pos, format!("unexpected input '{}'", preview(rest))))?;
        let whole = caps.get(0).map_or(0, |m| m.end());
        let offset = pos;
        pos += whole;

        let token = if caps.name("ws").is_some() {
            continue;
        } else if let Some(m) = caps.name("float") {
            let value = m
                .as_str()
                .parse()
                .map_err(|_| QueryError::syntax(offset, "invalid float literal"))?;
            Token::Float(value)
        } else if let Some(m) = caps.name("int") {
            let value = m
                .as_str()
                .parse()
                .map_err(|_| QueryError::syntax(offset, "integer literal out of range"))?;
            Token::Int(value)
        } else if let Some(m) = caps.name("str") {
            Token::Str(unescape(m.as_str()))
        } else if let Some(m) = caps.name("tick") {
            let text = m.as_str();
            Token::Name(text[1..text.len() - 1].to_string())
        } else if let Some(m) = caps.name("name") {
            match m.as_str() {
                "True" | "true" => Token::True,
                "False" | "false" => Token::False,
                "None" => Token::None,
                "and" => Token::And,
                "or" => Token::Or,
                "not" => Token::Not,
                "in" => Token::In,
                other => Token::Name(other.to_string()),
            }
        } else if let Some(m) = caps.name("op") {
            operator(m.as_str()).ok_or_else(|| QueryError::syntax(offset, "unknown operator"))?
        } else {
            return Err(QueryError::syntax(offset, "unrecognised token"));
        };

        tokens.push(Spanned { token, offset });
    }

    Ok(tokens)
}

fn operator(op: &str) -> Option<Token> {
    Some(match op {
        "==" => Token::Eq,
        "!=" => Token::Ne,
        "<=" => Token::Le,
        ">=" => Token::Ge,
        "<" => Token::Lt,
        ">" => Token::Gt,
        "+" => Token::Plus,
        "-" => Token::Minus,
        "*" => Token::Star,
        "/" => Token::Slash,
        "//" => Token::FloorDiv,
        "%" => Token::Percent,
        "&" => Token::Amp,
        "|" => Token::Pipe,
        "~" => Token::Tilde,
        "(" => Token::LParen,
        ")" => Token::RParen,
        "[" => Token::LBracket,
        "]" => Token::RBracket,
        "," => Token::Comma,
        _ => return None,
    })
}

/// Strip the quotes of a string literal and resolve its escapes.
fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn preview(rest: &str) -> String {
    rest.chars().take(10).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_tokenize_comparison() {
        assert_eq!(
            kinds("age >= 18 and `first name` != 'Bob'"),
            vec![
                Token::Name("age".into()),
                Token::Ge,
                Token::Int(18),
                Token::And,
                Token::Name("first name".into()),
                Token::Ne,
                Token::Str("Bob".into()),
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers_and_ops() {
        assert_eq!(
            kinds("x // 2 + .5 * 1e2 - 3.0"),
            vec![
                Token::Name("x".into()),
                Token::FloorDiv,
                Token::Int(2),
                Token::Plus,
                Token::Float(0.5),
                Token::Star,
                Token::Float(100.0),
                Token::Minus,
                Token::Float(3.0),
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(kinds(r#""a\"b""#), vec![Token::Str("a\"b".into())]);
    }

    #[test]
    fn test_offsets_and_errors() {
        let tokens = tokenize("a  == 1").unwrap();
        assert_eq!(tokens[1].offset, 3);
        assert_eq!(
            tokenize("a == $"),
            Err(QueryError::syntax(5, "unexpected input '$'"))
        );
        assert!(tokenize("name == 'open").is_err());
    }
}
