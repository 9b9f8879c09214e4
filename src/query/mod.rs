//! Query evaluation over in-memory object sets
//!
//! Pure functions shared by every backend that lists data:
//!
//! 1. Filter the candidate set (AND of filters)
//! 2. Keep the objects matching any pagination rule (OR of rules)
//! 3. Sort by the cumulative sort criteria
//! 4. Count, excluding tombstones
//! 5. Truncate to the limit
//!
//! Nothing in here performs I/O or returns an error.

mod comparison;
mod filters;
mod nested;
mod record_set;
mod sorting;

pub use comparison::{canonical_json, compare_keys, compare_values, Comparison, FieldValue};
pub use filters::{apply_filters, matches_all, Filter, FilterSet, FilterValue};
pub use nested::find_nested_value;
pub use record_set::{extract_record_set, is_tombstone};
pub use sorting::{apply_sorting, Sort, SortDirection};

/// A stored JSON object
pub type Object = serde_json::Map<String, serde_json::Value>;

/// Default identifier field
pub const DEFAULT_ID_FIELD: &str = "id";
/// Default modification timestamp field
pub const DEFAULT_MODIFIED_FIELD: &str = "last_modified";
/// Default tombstone marker field
pub const DEFAULT_DELETED_FIELD: &str = "deleted";

/// Read parameters for list, count and bulk-delete operations
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Filters, combined with AND
    pub filters: Vec<Filter>,
    /// Sort criteria, first is primary
    pub sorting: Vec<Sort>,
    /// Pagination rules, combined with OR
    pub pagination_rules: Vec<Vec<Filter>>,
    /// Maximum number of objects returned
    pub limit: Option<usize>,
    /// Whether tombstones are part of the candidate set
    pub include_deleted: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replaces the filters
    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    /// Adds a sort criterion
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sorting.push(sort);
        self
    }

    /// Adds a pagination rule
    pub fn with_pagination_rule(mut self, rule: Vec<Filter>) -> Self {
        self.pagination_rules.push(rule);
        self
    }

    /// Sets the limit (zero means no limit)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Includes tombstones
    pub fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }
}
