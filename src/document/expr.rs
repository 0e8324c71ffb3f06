//! Plan expressions as aggregation expressions.
//!
//! The document store holds raw records, so missing-value tests here see
//! absent fields, nulls and the `"NULL"` text sentinel alike.

use serde_json::{json, Value as Json};

use crate::plan::{Aggregate, BinaryOp, Expr, Value};
use crate::schema::records::de::NULL_SENTINEL;

/// Field path for a plan field (`alias.Column` follows the unwound lookup).
pub fn field_path(name: &str) -> Json {
    Json::String(format!("${}", name))
}

/// Render an expression.
pub fn render_expr(expr: &Expr) -> Json {
    match expr {
        Expr::Field(name) => field_path(name),
        Expr::Literal(value) => literal(value),
        Expr::Param(name) => Json::String(format!("$${}", name)),
        Expr::Binary { left, op, right } => binary(*op, render_expr(left), render_expr(right)),
        Expr::Not(inner) => json!({ "$not": [render_expr(inner)] }),
        Expr::Concat(parts) => {
            json!({ "$concat": parts.iter().map(render_expr).collect::<Vec<_>>() })
        }
        Expr::IfMissing { expr, default } => json!({
            "$cond": [is_missing(render_expr(expr)), render_expr(default), render_expr(expr)]
        }),
        Expr::IsMissing(inner) => is_missing(render_expr(inner)),
        Expr::Round { expr, digits } => json!({ "$round": [render_expr(expr), digits] }),
        Expr::Year(inner) => json!({ "$year": to_date(render_expr(inner)) }),
        Expr::Month(inner) => json!({ "$month": to_date(render_expr(inner)) }),
        Expr::DateString(inner) => json!({
            "$dateToString": { "date": to_date(render_expr(inner)), "format": "%Y-%m-%d" }
        }),
        Expr::StartsWithAny { expr, chars } => {
            let class: String = chars
                .iter()
                .map(|c| regex::escape(&c.to_string()))
                .collect();
            regex_match(render_expr(expr), format!("^[{}]", class))
        }
        Expr::CharsAt { expr, positions } => {
            let len = positions.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
            let pattern: String = (0..len)
                .map(|i| match positions.iter().find(|(p, _)| *p == i) {
                    Some((_, c)) => regex::escape(&c.to_string()),
                    None => ".".to_string(),
                })
                .collect();
            regex_match(render_expr(expr), format!("^{}", pattern))
        }
    }
}

/// Render a group accumulator.
pub fn render_accumulator(aggregate: &Aggregate) -> Json {
    match aggregate {
        Aggregate::Count => json!({ "$sum": 1 }),
        Aggregate::CountIf(pred) => json!({ "$sum": { "$cond": [render_expr(pred), 1, 0] } }),
        Aggregate::Sum(e) => json!({ "$sum": render_expr(e) }),
        Aggregate::Avg(e) => json!({ "$avg": render_expr(e) }),
        Aggregate::Max(e) => json!({ "$max": render_expr(e) }),
    }
}

/// Literal value. Text that looks like a field path is quoted with `$literal`.
pub fn literal(value: &Value) -> Json {
    match value {
        Value::Text(s) if s.starts_with('$') => json!({ "$literal": s }),
        other => serde_json::to_value(other).unwrap_or(Json::Null),
    }
}

fn binary(op: BinaryOp, left: Json, right: Json) -> Json {
    let name = match op {
        BinaryOp::Add => "$add",
        BinaryOp::Sub => "$subtract",
        BinaryOp::Mul => "$multiply",
        BinaryOp::Div => {
            return json!({
                "$cond": [{ "$eq": [right.clone(), 0] }, 0, { "$divide": [left, right] }]
            })
        }
        BinaryOp::Eq => "$eq",
        BinaryOp::Ne => "$ne",
        BinaryOp::Lt => "$lt",
        BinaryOp::Lte => "$lte",
        BinaryOp::Gt => "$gt",
        BinaryOp::Gte => "$gte",
        BinaryOp::And => "$and",
        BinaryOp::Or => "$or",
    };
    let mut doc = serde_json::Map::new();
    doc.insert(name.into(), json!([left, right]));
    Json::Object(doc)
}

fn is_missing(value: Json) -> Json {
    json!({ "$in": [{ "$ifNull": [value, null] }, [null, NULL_SENTINEL]] })
}

fn to_date(value: Json) -> Json {
    json!({ "$toDate": value })
}

fn regex_match(input: Json, regex: String) -> Json {
    json!({ "$regexMatch": { "input": input, "regex": regex, "options": "s" } })
}
