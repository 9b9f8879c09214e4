//! Storage namespaces and parent id globs

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::errors::{StorageError, StorageResult};

/// Unit of isolation: a resource under a parent
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Namespace {
    pub parent_id: String,
    pub resource_name: String,
}

impl Namespace {
    pub fn new(resource_name: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            resource_name: resource_name.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.parent_id, self.resource_name)
    }
}

/// Selects the namespaces touched by a bulk operation.
///
/// `*` in the parent id matches any sequence of characters; every other
/// character matches itself and the whole parent id must match. A missing
/// resource name selects every resource under the matching parents.
#[derive(Debug, Clone)]
pub struct NamespaceSelector {
    parent: Regex,
    resource_name: Option<String>,
}

impl NamespaceSelector {
    pub fn new(resource_name: Option<&str>, parent_glob: &str) -> StorageResult<Self> {
        let body = parent_glob
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let parent = Regex::new(&format!("^{}$", body)).map_err(|err| {
            StorageError::backend_with_source(format!("invalid parent id {}", parent_glob), err)
        })?;
        Ok(Self {
            parent,
            resource_name: resource_name.map(str::to_string),
        })
    }

    pub fn matches(&self, namespace: &Namespace) -> bool {
        let resource_ok = match &self.resource_name {
            Some(name) => *name == namespace.resource_name,
            None => true,
        };
        resource_ok && self.parent.is_match(&namespace.parent_id)
    }
}
