//! Record-set extraction: filter, paginate, sort, count, limit

use std::borrow::Borrow;

use serde_json::Value;

use super::filters::{Filter, FilterSet};
use super::sorting::{apply_sorting, Sort};
use super::Object;

/// Runs the full read pipeline over a candidate set.
///
/// 1. `filters` are applied; the size of the result is the total count.
/// 2. If `pagination_rules` is non-empty, only objects matching at least one
///    rule (each rule being an AND of filters) are kept.
/// 3. `sorting` is applied.
/// 4. Tombstones (objects whose `deleted_field` is `true`) remaining in the
///    sorted set are subtracted from the total count.
/// 5. The sorted set is truncated to `limit`. A limit of zero means no limit.
///
/// Returns the ordered objects and the visible count.
pub fn extract_record_set<T>(
    objects: Vec<T>,
    filters: &[Filter],
    sorting: &[Sort],
    pagination_rules: &[Vec<Filter>],
    limit: Option<usize>,
    deleted_field: &str,
) -> (Vec<T>, usize)
where
    T: Borrow<Object>,
{
    let filter_set = FilterSet::new(filters);
    let filtered: Vec<T> = objects
        .into_iter()
        .filter(|object| filter_set.matches(object.borrow()))
        .collect();
    let total_count = filtered.len();

    let paginated: Vec<T> = if pagination_rules.is_empty() {
        filtered
    } else {
        let rules: Vec<FilterSet<'_>> = pagination_rules.iter().map(|r| FilterSet::new(r)).collect();
        filtered
            .into_iter()
            .filter(|object| rules.iter().any(|rule| rule.matches(object.borrow())))
            .collect()
    };

    let mut sorted = apply_sorting(paginated, sorting);

    let deleted_count = sorted
        .iter()
        .filter(|object| is_tombstone((*object).borrow(), deleted_field))
        .count();

    if let Some(limit) = limit.filter(|&limit| limit > 0) {
        sorted.truncate(limit);
    }

    (sorted, total_count.saturating_sub(deleted_count))
}

/// Returns true if the object is a tombstone
pub fn is_tombstone(object: &Object, deleted_field: &str) -> bool {
    matches!(object.get(deleted_field), Some(Value::Bool(true)))
}
