//! Dotted-path field lookup

use serde_json::{Map, Value};

use super::comparison::FieldValue;

/// Looks up `path` in `object`.
///
/// A key equal to the whole path wins, so keys containing literal dots are
/// reachable. Otherwise the longest dotted prefix that exists and holds an
/// object is taken as the root, and the lookup recurses with the rest of
/// the path.
pub fn find_nested_value<'a>(object: &'a Map<String, Value>, path: &str) -> FieldValue<'a> {
    if let Some(value) = object.get(path) {
        return FieldValue::Present(value);
    }

    // Candidate roots, longest first: "a.b.c" -> ["a.b", "a"]
    let mut split_points: Vec<usize> = path.match_indices('.').map(|(i, _)| i).collect();
    split_points.reverse();

    for split in split_points {
        let root = &path[..split];
        if let Some(Value::Object(child)) = object.get(root) {
            return find_nested_value(child, &path[split + 1..]);
        }
    }

    FieldValue::Missing
}
