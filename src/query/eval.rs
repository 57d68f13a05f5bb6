use std::cmp::Ordering;

use super::parser::{ArithOp, CmpOp, Expr};
use crate::error::{QueryError, QueryResult};
use crate::table::{Table, Value};

/// Replace column names with positions in `table`.
pub fn bind(expr: &Expr, table: &Table) -> QueryResult<Expr> {
    let bound = match expr {
        Expr::Column(name) => Expr::Field(
            table
                .column_index(name)
                .ok_or_else(|| QueryError::UnknownColumn(name.clone()))?,
        ),
        Expr::Literal(_) | Expr::Field(_) => expr.clone(),
        Expr::List(items) => Expr::List(
            items
                .iter()
                .map(|item| bind(item, table))
                .collect::<QueryResult<_>>()?,
        ),
        Expr::Neg(inner) => Expr::Neg(Box::new(bind(inner, table)?)),
        Expr::Not(inner) => Expr::Not(Box::new(bind(inner, table)?)),
        Expr::Arith(op, l, r) => Expr::Arith(*op, Box::new(bind(l, table)?), Box::new(bind(r, table)?)),
        Expr::And(l, r) => Expr::And(Box::new(bind(l, table)?), Box::new(bind(r, table)?)),
        Expr::Or(l, r) => Expr::Or(Box::new(bind(l, table)?), Box::new(bind(r, table)?)),
        Expr::Compare(first, links) => Expr::Compare(
            Box::new(bind(first, table)?),
            links
                .iter()
                .map(|(op, operand)| Ok((*op, bind(operand, table)?)))
                .collect::<QueryResult<_>>()?,
        ),
    };
    Ok(bound)
}

/// Evaluate a bound expression against one row.
pub fn eval(expr: &Expr, row: &[Value]) -> QueryResult<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Field(idx) => Ok(row[*idx].clone()),
        Expr::Column(name) => Err(QueryError::UnknownColumn(name.clone())),
        Expr::List(_) => Err(QueryError::type_error(
            "a list is only allowed on the right of 'in', '==' or '!='",
        )),
        Expr::Neg(inner) => match eval(inner, row)? {
            Value::Null => Ok(Value::Null),
            Value::Int(i) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| QueryError::type_error("integer overflow")),
            Value::Float(x) => Ok(Value::Float(-x)),
            other => Err(QueryError::type_error(format!(
                "bad operand type for unary -: '{}'",
                other.dtype()
            ))),
        },
        Expr::Arith(op, l, r) => arith(*op, eval(l, row)?, eval(r, row)?),
        Expr::Not(inner) => Ok(Value::Bool(!truthy(&eval(inner, row)?, "not")?)),
        Expr::And(l, r) => {
            if !truthy(&eval(l, row)?, "and")? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(truthy(&eval(r, row)?, "and")?))
        }
        Expr::Or(l, r) => {
            if truthy(&eval(l, row)?, "or")? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(truthy(&eval(r, row)?, "or")?))
        }
        Expr::Compare(first, links) => {
            let mut left = eval(first, row)?;
            for (op, operand) in links {
                let holds = match (op, operand) {
                    (CmpOp::In | CmpOp::Eq, Expr::List(items)) => member(&left, items, row)?,
                    (CmpOp::NotIn | CmpOp::Ne, Expr::List(items)) => !member(&left, items, row)?,
                    (CmpOp::In | CmpOp::NotIn, _) => {
                        return Err(QueryError::type_error(format!(
                            "right operand of '{}' must be a list",
                            op.symbol()
                        )));
                    }
                    _ => {
                        let right = eval(operand, row)?;
                        let holds = compare(*op, &left, &right)?;
                        left = right;
                        holds
                    }
                };
                if !holds {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
    }
}

/// Boolean context: nulls count as false, anything else but a bool is an error.
fn truthy(value: &Value, op: &str) -> QueryResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        other => Err(QueryError::type_error(format!(
            "unsupported operand type for '{op}': '{}'",
            other.dtype()
        ))),
    }
}

fn member(needle: &Value, items: &[Expr], row: &[Value]) -> QueryResult<bool> {
    for item in items {
        if values_equal(needle, &eval(item, row)?) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn values_equal(a: &Value, b: &Value) -> bool {
    matches!(ordering(a, b), Some(Ordering::Equal))
}

/// Ordering between comparable values; `None` for nulls and mismatched types.
fn ordering(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> QueryResult<bool> {
    if left.is_null() || right.is_null() {
        return Ok(op == CmpOp::Ne);
    }
    match ordering(left, right) {
        Some(ord) => Ok(match op {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
            CmpOp::In | CmpOp::NotIn => unreachable!("membership handled by the caller"),
        }),
        // NaN on either side, or values of different kinds.
        None => match op {
            CmpOp::Eq => Ok(false),
            CmpOp::Ne => Ok(true),
            _ if left.dtype() == right.dtype() => Ok(false),
            _ => Err(QueryError::type_error(format!(
                "'{}' not supported between '{}' and '{}'",
                op.symbol(),
                left.dtype(),
                right.dtype()
            ))),
        },
    }
}

fn arith(op: ArithOp, left: Value, right: Value) -> QueryResult<Value> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Str(a), Value::Str(b)) if op == ArithOp::Add => Ok(Value::Str(a + &b)),
        (Value::Int(a), Value::Int(b)) => int_arith(op, a, b),
        (left, right) => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => Ok(float_arith(op, a, b)),
            _ => Err(QueryError::type_error(format!(
                "unsupported operand types for {op:?}: '{}' and '{}'",
                left.dtype(),
                right.dtype()
            ))),
        },
    }
}

fn int_arith(op: ArithOp, a: i64, b: i64) -> QueryResult<Value> {
    let overflow = || QueryError::type_error("integer overflow");
    let value = match op {
        ArithOp::Add => Value::Int(a.checked_add(b).ok_or_else(overflow)?),
        ArithOp::Sub => Value::Int(a.checked_sub(b).ok_or_else(overflow)?),
        ArithOp::Mul => Value::Int(a.checked_mul(b).ok_or_else(overflow)?),
        ArithOp::Div => float_arith(op, a as f64, b as f64),
        ArithOp::FloorDiv | ArithOp::Mod if b == 0 => Value::Null,
        ArithOp::FloorDiv => {
            let q = a.checked_div(b).ok_or_else(overflow)?;
            Value::Int(if a % b != 0 && ((a < 0) != (b < 0)) { q - 1 } else { q })
        }
        ArithOp::Mod => {
            let r = a.checked_rem(b).ok_or_else(overflow)?;
            Value::Int(if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r })
        }
    };
    Ok(value)
}

fn float_arith(op: ArithOp, a: f64, b: f64) -> Value {
    Value::Float(match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
        ArithOp::FloorDiv => (a / b).floor(),
        ArithOp::Mod => {
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) { r + b } else { r }
        }
    })
}
