//! Comparison operators and the JSON total order
//!
//! Every filter and every sort goes through [`compare_keys`], so that range
//! filters and sorting agree on how heterogeneous values are ordered.
//!
//! Ascending type order:
//!
//! `null < string < number < boolean < array < object < missing`

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filter comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// Strictly less than
    #[serde(rename = "<")]
    Lt,
    /// Greater than or equal
    #[serde(rename = ">=")]
    Min,
    /// Less than or equal
    #[serde(rename = "<=")]
    Max,
    /// Not equal
    #[serde(rename = "!=")]
    Not,
    /// Equal
    #[serde(rename = "==")]
    Eq,
    /// Strictly greater than
    #[serde(rename = ">")]
    Gt,
    /// Field value is one of the operand values
    #[serde(rename = "in")]
    In,
    /// Field value is none of the operand values
    #[serde(rename = "exclude")]
    Exclude,
    /// Case-insensitive glob match. Only `*` is special; every other
    /// character of the operand, `.` included, matches literally.
    #[serde(rename = "like")]
    Like,
    /// Field presence (operand is the polarity)
    #[serde(rename = "has")]
    Has,
    /// Field array is a superset of the operand array
    #[serde(rename = "contains")]
    Contains,
    /// Field array intersects the operand array
    #[serde(rename = "contains_any")]
    ContainsAny,
}

impl Comparison {
    /// Returns the operator symbol
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Min => ">=",
            Comparison::Max => "<=",
            Comparison::Not => "!=",
            Comparison::Eq => "==",
            Comparison::Gt => ">",
            Comparison::In => "in",
            Comparison::Exclude => "exclude",
            Comparison::Like => "like",
            Comparison::Has => "has",
            Comparison::Contains => "contains",
            Comparison::ContainsAny => "contains_any",
        }
    }

    /// Returns true for operators evaluated with the total order
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Comparison::Lt
                | Comparison::Min
                | Comparison::Max
                | Comparison::Not
                | Comparison::Eq
                | Comparison::Gt
        )
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A value looked up in an object, or the absence of one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// The field exists (possibly holding `null`)
    Present(&'a Value),
    /// The field does not exist at all
    Missing,
}

impl<'a> FieldValue<'a> {
    /// Returns true if the field is absent
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Returns the value if present
    pub fn value(&self) -> Option<&'a Value> {
        match self {
            FieldValue::Present(v) => Some(v),
            FieldValue::Missing => None,
        }
    }
}

impl<'a> From<Option<&'a Value>> for FieldValue<'a> {
    fn from(value: Option<&'a Value>) -> Self {
        match value {
            Some(v) => FieldValue::Present(v),
            None => FieldValue::Missing,
        }
    }
}

/// Rank of a value in the cross-type order
fn type_rank(key: FieldValue<'_>) -> u8 {
    match key {
        FieldValue::Present(Value::Null) => 0,
        FieldValue::Present(Value::String(_)) => 1,
        FieldValue::Present(Value::Number(_)) => 2,
        FieldValue::Present(Value::Bool(_)) => 3,
        FieldValue::Present(Value::Array(_)) => 4,
        FieldValue::Present(Value::Object(_)) => 5,
        FieldValue::Missing => 6,
    }
}

/// Compares two looked-up values under the total order.
pub fn compare_keys(a: FieldValue<'_>, b: FieldValue<'_>) -> Ordering {
    let (a_rank, b_rank) = (type_rank(a), type_rank(b));
    if a_rank != b_rank {
        return a_rank.cmp(&b_rank);
    }
    match (a, b) {
        (FieldValue::Present(a), FieldValue::Present(b)) => compare_values(a, b),
        _ => Ordering::Equal,
    }
}

/// Compares two JSON values under the total order.
///
/// Arrays compare element-wise, objects by their canonical serialization.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let (a_rank, b_rank) = (
        type_rank(FieldValue::Present(a)),
        type_rank(FieldValue::Present(b)),
    );
    if a_rank != b_rank {
        return a_rank.cmp(&b_rank);
    }

    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ordering = compare_values(x, y);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.len().cmp(&b.len())
        }
        (Value::Object(_), Value::Object(_)) => canonical_json(a).cmp(&canonical_json(b)),
        _ => Ordering::Equal,
    }
}

fn compare_numbers(a: &serde_json::Number, b: &serde_json::Number) -> Ordering {
    if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
        return ai.cmp(&bi);
    }
    if let (Some(au), Some(bu)) = (a.as_u64(), b.as_u64()) {
        return au.cmp(&bu);
    }
    let af = a.as_f64().unwrap_or(0.0);
    let bf = b.as_f64().unwrap_or(0.0);
    af.partial_cmp(&bf).unwrap_or(Ordering::Equal)
}

/// Predictable serialization used for structural equality of nested values.
///
/// Object keys come out sorted, so two objects with the same members
/// serialize identically regardless of insertion order.
pub fn canonical_json(value: &Value) -> String {
    value.to_string()
}
