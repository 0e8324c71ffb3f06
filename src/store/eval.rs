//! Expression evaluation for the in-memory store.
//!
//! Missing values follow three-valued logic: comparisons against a missing
//! operand are missing, `AND`/`OR` short-circuit on a known operand, and a
//! filter only keeps rows whose predicate is truthy.

use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use std::cmp::Ordering;

use super::{StoreError, StoreResult};
use crate::plan::{BinaryOp, Expr, Params, Row, Value};
use crate::schema::records::de::{parse_datetime, NULL_SENTINEL};

/// Evaluate an expression against one row.
pub fn eval(expr: &Expr, row: &Row, params: &Params) -> StoreResult<Value> {
    match expr {
        Expr::Field(name) => Ok(row.value(name)),
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Param(name) => params
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnboundParameter(name.clone())),

        Expr::Binary { left, op, right } => {
            let l = eval(left, row, params)?;
            let r = eval(right, row, params)?;
            binary(*op, &l, &r)
        }

        Expr::Not(inner) => Ok(match truth(&eval(inner, row, params)?) {
            Some(b) => Value::Bool(!b),
            None => Value::Null,
        }),

        Expr::Concat(parts) => {
            let mut out = String::new();
            for part in parts {
                match eval(part, row, params)? {
                    Value::Null => return Ok(Value::Null),
                    v => out.push_str(&v.to_string()),
                }
            }
            Ok(Value::Text(out))
        }

        Expr::IfMissing { expr, default } => {
            let v = eval(expr, row, params)?;
            if is_missing(&v) {
                eval(default, row, params)
            } else {
                Ok(v)
            }
        }

        Expr::IsMissing(inner) => Ok(Value::Bool(is_missing(&eval(inner, row, params)?))),

        Expr::Round { expr, digits } => match eval(expr, row, params)? {
            v @ (Value::Null | Value::Int(_) | Value::Decimal(_)) => Ok(v.round(*digits)),
            other => Err(StoreError::Type(format!("cannot round {:?}", other))),
        },

        Expr::Year(inner) => Ok(match as_datetime(&eval(inner, row, params)?) {
            Some(dt) => Value::Int(dt.year() as i64),
            None => Value::Null,
        }),

        Expr::Month(inner) => Ok(match as_datetime(&eval(inner, row, params)?) {
            Some(dt) => Value::Int(dt.month() as i64),
            None => Value::Null,
        }),

        Expr::DateString(inner) => Ok(match as_datetime(&eval(inner, row, params)?) {
            Some(dt) => Value::Text(dt.format("%Y-%m-%d").to_string()),
            None => Value::Null,
        }),

        Expr::StartsWithAny { expr, chars } => Ok(match eval(expr, row, params)? {
            Value::Null => Value::Null,
            v => {
                let text = v.to_string();
                Value::Bool(text.chars().next().is_some_and(|c| chars.contains(&c)))
            }
        }),

        Expr::CharsAt { expr, positions } => Ok(match eval(expr, row, params)? {
            Value::Null => Value::Null,
            v => {
                let text: Vec<char> = v.to_string().chars().collect();
                let min_len = positions.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
                Value::Bool(
                    text.len() >= min_len
                        && positions.iter().all(|(i, c)| text.get(*i) == Some(c)),
                )
            }
        }),
    }
}

/// Whether a predicate keeps the row.
pub fn passes(expr: &Expr, row: &Row, params: &Params) -> StoreResult<bool> {
    Ok(eval(expr, row, params)?.is_truthy())
}

fn is_missing(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Text(s) => s == NULL_SENTINEL,
        _ => false,
    }
}

fn truth(v: &Value) -> Option<bool> {
    if v.is_null() {
        None
    } else {
        Some(v.is_truthy())
    }
}

fn as_datetime(v: &Value) -> Option<NaiveDateTime> {
    match v {
        Value::DateTime(dt) => Some(*dt),
        Value::Text(s) => parse_datetime(s),
        _ => None,
    }
}

/// Apply a binary operator to two evaluated operands.
pub fn binary(op: BinaryOp, l: &Value, r: &Value) -> StoreResult<Value> {
    match op {
        BinaryOp::And => Ok(match (truth(l), truth(r)) {
            (Some(false), _) | (_, Some(false)) => Value::Bool(false),
            (Some(true), Some(true)) => Value::Bool(true),
            _ => Value::Null,
        }),
        BinaryOp::Or => Ok(match (truth(l), truth(r)) {
            (Some(true), _) | (_, Some(true)) => Value::Bool(true),
            (Some(false), Some(false)) => Value::Bool(false),
            _ => Value::Null,
        }),
        op if op.is_comparison() => Ok(compare(op, l, r)),
        op => arithmetic(op, l, r),
    }
}

fn compare(op: BinaryOp, l: &Value, r: &Value) -> Value {
    if l.is_null() || r.is_null() {
        return Value::Null;
    }
    let ord = l.total_cmp(r);
    Value::Bool(match op {
        BinaryOp::Eq => l.loose_eq(r),
        BinaryOp::Ne => !l.loose_eq(r),
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::Lte => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        BinaryOp::Gte => ord != Ordering::Less,
        _ => false,
    })
}

fn arithmetic(op: BinaryOp, l: &Value, r: &Value) -> StoreResult<Value> {
    if l.is_null() || r.is_null() {
        return Ok(Value::Null);
    }

    if let (Value::Int(a), Value::Int(b)) = (l, r) {
        let exact = match op {
            BinaryOp::Add => a.checked_add(*b),
            BinaryOp::Sub => a.checked_sub(*b),
            BinaryOp::Mul => a.checked_mul(*b),
            _ => None,
        };
        if let Some(n) = exact {
            return Ok(Value::Int(n));
        }
    }

    let (Some(a), Some(b)) = (l.as_decimal(), r.as_decimal()) else {
        return Err(StoreError::Type(format!(
            "cannot apply {:?} to {:?} and {:?}",
            op, l, r
        )));
    };

    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div if b.is_zero() => return Ok(Value::Int(0)),
        BinaryOp::Div => a.checked_div(b),
        _ => None,
    };

    result
        .map(Value::Decimal)
        .ok_or_else(|| StoreError::Type(format!("numeric overflow in {:?}", op)))
}

/// Add a value into a running sum, skipping missing inputs.
pub fn accumulate(sum: Value, v: &Value) -> StoreResult<Value> {
    match v {
        Value::Null => Ok(sum),
        v if v.as_decimal().is_some() => arithmetic(BinaryOp::Add, &sum, v),
        other => Err(StoreError::Type(format!("cannot sum {:?}", other))),
    }
}

/// Mean of a sum over `n` values.
pub fn mean(sum: &Value, n: usize) -> Value {
    match (sum.as_decimal(), n) {
        (_, 0) | (None, _) => Value::Null,
        (Some(s), n) => s
            .checked_div(Decimal::from(n as u64))
            .map(Value::Decimal)
            .unwrap_or(Value::Null),
    }
}
