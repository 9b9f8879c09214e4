//! Filter evaluation
//!
//! All filters of a list are combined with AND. Evaluation never fails:
//! a value of the wrong shape simply does not match.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::comparison::{canonical_json, compare_keys, compare_values, Comparison, FieldValue};
use super::nested::find_nested_value;
use super::{Object, DEFAULT_ID_FIELD};

/// Right-hand operand of a filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// A JSON value
    Value(Value),
    /// The "field is absent" sentinel, ranked above every JSON value
    Missing,
}

impl FilterValue {
    fn as_key(&self) -> FieldValue<'_> {
        match self {
            FilterValue::Value(v) => FieldValue::Present(v),
            FilterValue::Missing => FieldValue::Missing,
        }
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        FilterValue::Value(value)
    }
}

/// A single filter: `field <operator> value`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Dotted path of the field
    pub field: String,
    /// Operand
    pub value: FilterValue,
    /// Comparison operator
    pub operator: Comparison,
}

impl Filter {
    /// Creates a filter
    pub fn new(field: impl Into<String>, value: impl Into<FilterValue>, operator: Comparison) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            operator,
        }
    }

    /// Equality filter
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, value, Comparison::Eq)
    }

    /// Strictly-greater filter
    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, value, Comparison::Gt)
    }

    /// Strictly-less filter
    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, value, Comparison::Lt)
    }

    /// Membership filter
    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, Value::Array(values), Comparison::In)
    }

    /// Checks a single object against this filter
    pub fn matches(&self, object: &Object) -> bool {
        CompiledFilter::new(self).matches(object)
    }
}

/// A filter with its operand pre-processed once per evaluation.
struct CompiledFilter<'f> {
    filter: &'f Filter,
    /// Operand after numeric-id coercion
    operand: FilterValue,
    /// Compiled LIKE pattern
    pattern: Option<Regex>,
    /// Canonical operand elements for CONTAINS / CONTAINS_ANY
    search_set: Option<HashSet<String>>,
}

impl<'f> CompiledFilter<'f> {
    fn new(filter: &'f Filter) -> Self {
        let mut operand = filter.value.clone();

        // Ids are strings; integer operands on the id field compare as text.
        if filter.field == DEFAULT_ID_FIELD {
            if let FilterValue::Value(Value::Number(n)) = &operand {
                if n.is_i64() || n.is_u64() {
                    operand = FilterValue::Value(Value::String(n.to_string()));
                }
            }
        }

        let pattern = match (&filter.operator, &operand) {
            (Comparison::Like, FilterValue::Value(Value::String(p))) => like_regex(p),
            _ => None,
        };

        let search_set = match (&filter.operator, &operand) {
            (Comparison::Contains | Comparison::ContainsAny, FilterValue::Value(Value::Array(items))) => {
                Some(items.iter().map(canonical_json).collect())
            }
            _ => None,
        };

        Self {
            filter,
            operand,
            pattern,
            search_set,
        }
    }

    fn matches(&self, object: &Object) -> bool {
        let left = find_nested_value(object, &self.filter.field);

        match self.filter.operator {
            Comparison::Lt => compare_keys(left, self.operand.as_key()) == Ordering::Less,
            Comparison::Min => compare_keys(left, self.operand.as_key()) != Ordering::Less,
            Comparison::Max => compare_keys(left, self.operand.as_key()) != Ordering::Greater,
            Comparison::Gt => compare_keys(left, self.operand.as_key()) == Ordering::Greater,
            Comparison::Eq => compare_keys(left, self.operand.as_key()) == Ordering::Equal,
            Comparison::Not => compare_keys(left, self.operand.as_key()) != Ordering::Equal,
            Comparison::In => self.is_member(left),
            Comparison::Exclude => !self.is_member(left),
            Comparison::Like => match (&self.pattern, left.value()) {
                (Some(pattern), Some(Value::String(s))) => pattern.is_match(s),
                _ => false,
            },
            Comparison::Has => {
                let wanted = match &self.operand {
                    FilterValue::Value(v) => is_truthy(v),
                    FilterValue::Missing => false,
                };
                wanted != left.is_missing()
            }
            Comparison::Contains => match self.field_set(left) {
                Some(values) => self.search_set.as_ref().is_some_and(|s| s.is_subset(&values)),
                None => false,
            },
            Comparison::ContainsAny => match self.field_set(left) {
                Some(values) => self
                    .search_set
                    .as_ref()
                    .is_some_and(|s| !s.is_disjoint(&values)),
                None => false,
            },
        }
    }

    /// Membership of the field value in the operand list.
    ///
    /// A scalar operand behaves as a one-element list.
    fn is_member(&self, left: FieldValue<'_>) -> bool {
        let Some(actual) = left.value() else {
            return false;
        };
        match &self.operand {
            FilterValue::Value(Value::Array(candidates)) => candidates
                .iter()
                .any(|c| compare_values(actual, c) == Ordering::Equal),
            FilterValue::Value(single) => compare_values(actual, single) == Ordering::Equal,
            FilterValue::Missing => false,
        }
    }

    fn field_set(&self, left: FieldValue<'_>) -> Option<HashSet<String>> {
        match left.value() {
            Some(Value::Array(items)) => Some(items.iter().map(canonical_json).collect()),
            _ => None,
        }
    }
}

/// Translates a LIKE glob into an anchored, case-insensitive regex.
///
/// A pattern without `*` matches as a substring.
fn like_regex(pattern: &str) -> Option<Regex> {
    let glob = if pattern.contains('*') {
        pattern.to_string()
    } else {
        format!("*{}*", pattern)
    };
    let body = glob
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    RegexBuilder::new(&format!("^{}$", body))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .ok()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// A list of filters combined with AND, compiled once for repeated use.
pub struct FilterSet<'f> {
    compiled: Vec<CompiledFilter<'f>>,
}

impl<'f> FilterSet<'f> {
    pub fn new(filters: &'f [Filter]) -> Self {
        Self {
            compiled: filters.iter().map(CompiledFilter::new).collect(),
        }
    }

    /// Check if an object matches all filters
    pub fn matches(&self, object: &Object) -> bool {
        self.compiled.iter().all(|f| f.matches(object))
    }
}

/// Returns true if `object` satisfies every filter.
pub fn matches_all(object: &Object, filters: &[Filter]) -> bool {
    FilterSet::new(filters).matches(object)
}

/// Lazily keeps the objects that satisfy every filter.
pub fn apply_filters<'f, I>(objects: I, filters: &'f [Filter]) -> impl Iterator<Item = I::Item> + 'f
where
    I: IntoIterator,
    I::IntoIter: 'f,
    I::Item: Borrow<Object>,
{
    let set = FilterSet::new(filters);
    objects
        .into_iter()
        .filter(move |object| set.matches(object.borrow()))
}
