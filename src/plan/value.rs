//! Scalar values and rows produced by plan execution.

use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A scalar cell value.
///
/// `Null` is the single representation of "no value": absent fields, JSON
/// nulls and the `"NULL"` text sentinel all normalize to it at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if it is a number.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Int(n) => Some(Decimal::from(*n)),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness used by filters. Missing values never pass a filter.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Decimal(d) => !d.is_zero(),
            Value::Text(s) => !s.is_empty(),
            Value::DateTime(_) => true,
        }
    }

    /// Round half away from zero to `digits` fractional digits.
    ///
    /// Integers pass through unchanged since they have no fraction to drop.
    pub fn round(&self, digits: u32) -> Value {
        match self {
            Value::Decimal(d) => Value::Decimal(
                d.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero),
            ),
            other => other.clone(),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Decimal(_) => 2,
            Value::Text(_) => 3,
            Value::DateTime(_) => 4,
        }
    }

    /// Total order over values: missing < booleans < numbers < text < dates.
    ///
    /// Integers and decimals compare numerically. Text compares by code
    /// point, which is case-sensitive.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (a, b) if a.type_rank() == 2 && b.type_rank() == 2 => {
                match (a.as_decimal(), b.as_decimal()) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    _ => Ordering::Equal,
                }
            }
            (a, b) => a.type_rank().cmp(&b.type_rank()),
        }
    }

    /// Equality as filters see it: numbers compare numerically and a missing
    /// operand is never equal to anything.
    pub fn loose_eq(&self, other: &Value) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        self.type_rank() == other.type_rank() && self.total_cmp(other) == Ordering::Equal
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d.normalize()),
            Value::Text(s) => write!(f, "{}", s),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Decimal(d) => {
                let d = d.normalize();
                match d.to_i64() {
                    Some(n) if d.fract().is_zero() => serializer.serialize_i64(n),
                    _ => match d.to_f64() {
                        Some(f) => serializer.serialize_f64(f),
                        None => serializer.serialize_str(&d.to_string()),
                    },
                }
            }
            Value::Text(s) => serializer.serialize_str(s),
            Value::DateTime(dt) => {
                serializer.serialize_str(&dt.format("%Y-%m-%d %H:%M:%S").to_string())
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// An ordered mapping from column name to value.
///
/// Joined fields are stored flattened under `alias.Column` names so that
/// lookups and nested paths resolve the same way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field. Absent fields read as `None`, which callers treat as missing.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Get a field, reading absent fields as `Value::Null`.
    pub fn value(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Null)
    }

    /// Insert or replace a field, keeping first-insertion order.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Value {
        Value::Decimal(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(dec("2.345").round(2), dec("2.35"));
        assert_eq!(dec("-2.345").round(2), dec("-2.35"));
        assert_eq!(dec("0.125").round(2), dec("0.13"));
        assert_eq!(Value::Int(7).round(2), Value::Int(7));
        assert_eq!(Value::Null.round(2), Value::Null);
    }

    #[test]
    fn test_numeric_ordering_mixes_int_and_decimal() {
        assert_eq!(Value::Int(5).total_cmp(&dec("5.00")), Ordering::Equal);
        assert_eq!(Value::Int(5).total_cmp(&dec("5.01")), Ordering::Less);
        assert!(Value::Int(5).loose_eq(&dec("5.0")));
    }

    #[test]
    fn test_null_sorts_first_and_never_equals() {
        assert_eq!(Value::Null.total_cmp(&Value::Int(-100)), Ordering::Less);
        assert_eq!(Value::Null.total_cmp(&Value::from("a")), Ordering::Less);
        assert!(!Value::Null.loose_eq(&Value::Null));
    }

    #[test]
    fn test_text_ordering_is_case_sensitive() {
        assert_eq!(
            Value::from("Zeta").total_cmp(&Value::from("alpha")),
            Ordering::Less
        );
    }

    #[test]
    fn test_row_insert_replaces_in_place() {
        let mut row = Row::new().with("a", 1).with("b", 2);
        row.insert("a", 3);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(row.get("a"), Some(&Value::Int(3)));
        assert_eq!(row.value("missing"), Value::Null);
    }

    #[test]
    fn test_row_serializes_in_column_order() {
        let row = Row::new()
            .with("Order Id", 10248)
            .with("Order Total Price", dec("440.000"))
            .with("City", Value::Null);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"Order Id":10248,"Order Total Price":440,"City":null}"#
        );
    }
}
