use super::lexer::{Spanned, Token};
use crate::error::{QueryError, QueryResult};
use crate::table::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// Column reference by name, as written.
    Column(String),
    /// Column reference resolved against a table.
    Field(usize),
    List(Vec<Expr>),
    Neg(Box<Expr>),
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    /// `a < b <= c` keeps every link so each operand is evaluated once.
    Compare(Box<Expr>, Vec<(CmpOp, Expr)>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

pub fn parse(tokens: &[Spanned], source_len: usize) -> QueryResult<Expr> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        source_len,
    };
    if tokens.is_empty() {
        return Err(QueryError::syntax(0, "empty expression"));
    }
    let expr = parser.or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(_) => Err(parser.unexpected()),
    }
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    source_len: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_at(&self, ahead: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + ahead).map(|s| &s.token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source_len, |s| s.offset)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos).map(|s| &s.token);
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> QueryResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(QueryError::syntax(self.offset(), format!("expected {what}")))
        }
    }

    fn unexpected(&self) -> QueryError {
        match self.peek() {
            Some(token) => QueryError::syntax(self.offset(), format!("unexpected {token:?}")),
            None => QueryError::syntax(self.source_len, "unexpected end of expression"),
        }
    }

    fn or(&mut self) -> QueryResult<Expr> {
        let mut left = self.and()?;
        while matches!(self.peek(), Some(Token::Or | Token::Pipe)) {
            self.pos += 1;
            let right = self.and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> QueryResult<Expr> {
        let mut left = self.not()?;
        while matches!(self.peek(), Some(Token::And | Token::Amp)) {
            self.pos += 1;
            let right = self.not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not(&mut self) -> QueryResult<Expr> {
        if matches!(self.peek(), Some(Token::Not | Token::Tilde)) {
            self.pos += 1;
            return Ok(Expr::Not(Box::new(self.not()?)));
        }
        self.comparison()
    }

    fn comparison_op(&mut self) -> Option<CmpOp> {
        let op = match self.peek()? {
            Token::Eq => CmpOp::Eq,
            Token::Ne => CmpOp::Ne,
            Token::Lt => CmpOp::Lt,
            Token::Le => CmpOp::Le,
            Token::Gt => CmpOp::Gt,
            Token::Ge => CmpOp::Ge,
            Token::In => CmpOp::In,
            Token::Not if self.peek_at(1) == Some(&Token::In) => {
                self.pos += 1;
                CmpOp::NotIn
            }
            _ => return None,
        };
        self.pos += 1;
        Some(op)
    }

    fn comparison(&mut self) -> QueryResult<Expr> {
        let first = self.additive()?;
        let mut links = Vec::new();
        while let Some(op) = self.comparison_op() {
            let operand = if matches!(self.peek(), Some(Token::LBracket)) {
                self.list()?
            } else {
                self.additive()?
            };
            links.push((op, operand));
        }
        if links.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), links))
        }
    }

    fn additive(&mut self) -> QueryResult<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.multiplicative()?;
            left = Expr::Arith(op, Box::new(left), Box::new(right));
        }
    }

    fn multiplicative(&mut self) -> QueryResult<Expr> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => ArithOp::Mul,
                Some(Token::Slash) => ArithOp::Div,
                Some(Token::FloorDiv) => ArithOp::FloorDiv,
                Some(Token::Percent) => ArithOp::Mod,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Arith(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> QueryResult<Expr> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.primary()
    }

    fn list(&mut self) -> QueryResult<Expr> {
        self.expect(&Token::LBracket, "'['")?;
        let mut items = Vec::new();
        loop {
            if self.eat(&Token::RBracket) {
                return Ok(Expr::List(items));
            }
            items.push(self.additive()?);
            if self.eat(&Token::RBracket) {
                return Ok(Expr::List(items));
            }
            self.expect(&Token::Comma, "',' or ']'")?;
        }
    }

    fn primary(&mut self) -> QueryResult<Expr> {
        let offset = self.offset();
        let expr = match self.advance() {
            Some(Token::Int(i)) => Expr::Literal(Value::Int(*i)),
            Some(Token::Float(x)) => Expr::Literal(Value::Float(*x)),
            Some(Token::Str(s)) => Expr::Literal(Value::Str(s.clone())),
            Some(Token::True) => Expr::Literal(Value::Bool(true)),
            Some(Token::False) => Expr::Literal(Value::Bool(false)),
            Some(Token::None) => Expr::Literal(Value::Null),
            Some(Token::Name(name)) => Expr::Column(name.clone()),
            Some(Token::LParen) => {
                let inner = self.or()?;
                self.expect(&Token::RParen, "')'")?;
                inner
            }
            Some(token) => {
                return Err(QueryError::syntax(offset, format!("unexpected {token:?}")));
            }
            None => return Err(QueryError::syntax(offset, "unexpected end of expression")),
        };
        Ok(expr)
    }
}
