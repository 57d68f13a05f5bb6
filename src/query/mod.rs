//! Row filter expressions.
//!
//! A [`Query`] is parsed once and then applied to any number of tables.
//! Column names are resolved per table, so the same query can run against
//! datasets with different layouts.

mod eval;
pub mod lexer;
pub mod parser;

use std::fmt;
use std::str::FromStr;

use crate::error::{QueryError, QueryResult};
use crate::table::{Table, Value};
use parser::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    source: String,
    expr: Expr,
}

impl Query {
    pub fn parse(source: &str) -> QueryResult<Self> {
        let tokens = lexer::tokenize(source)?;
        let expr = parser::parse(&tokens, source.len())?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// One entry per row: whether the row satisfies the expression.
    ///
    /// A null result drops the row; any other non-boolean result is an error.
    pub fn mask(&self, table: &Table) -> QueryResult<Vec<bool>> {
        let bound = eval::bind(&self.expr, table)?;
        table
            .rows()
            .iter()
            .map(|row| match eval::eval(&bound, row)? {
                Value::Bool(keep) => Ok(keep),
                Value::Null => Ok(false),
                other => Err(QueryError::NotBoolean(other.dtype().to_string())),
            })
            .collect()
    }

    /// The rows of `table` that satisfy the expression, labels kept.
    pub fn apply(&self, table: Table) -> QueryResult<Table> {
        let mask = self.mask(&table)?;
        Ok(table.retain_rows(&mask))
    }
}

impl FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}
