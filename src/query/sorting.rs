//! Multi-field sorting
//!
//! Criteria are applied from last to first with a stable sort, so the first
//! criterion is the primary key and ties fall back to the next ones.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use super::comparison::compare_keys;
use super::nested::find_nested_value;
use super::Object;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Maps a signed direction (`1` / `-1`) to a direction
    pub fn from_sign(sign: i32) -> Self {
        if sign < 0 {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// Returns `1` or `-1`
    pub fn sign(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Dotted path of the field to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, sign: i32) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::from_sign(sign),
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, 1)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, -1)
    }
}

/// Sorts objects by the given criteria.
///
/// Objects lacking a sorted field use the "missing" rank, which is above
/// every JSON value: they come last ascending and first descending.
pub fn apply_sorting<T>(objects: Vec<T>, sorting: &[Sort]) -> Vec<T>
where
    T: Borrow<Object>,
{
    let mut result = objects;
    if result.is_empty() {
        return result;
    }

    for sort in sorting.iter().rev() {
        result.sort_by(|a, b| {
            let a_key = find_nested_value(a.borrow(), &sort.field);
            let b_key = find_nested_value(b.borrow(), &sort.field);
            match sort.direction {
                SortDirection::Asc => compare_keys(a_key, b_key),
                SortDirection::Desc => compare_keys(b_key, a_key),
            }
        });
    }

    result
}
