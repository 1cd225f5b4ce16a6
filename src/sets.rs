//! Set membership.
//!
//! Which sets an item belongs to is decided by the host (collections, item sets,
//! a vocabulary field, ...). The record assembler only asks a [`SetSpecResolver`]
//! for the ordered set specs of each item and writes them out unchanged.

use lazy_static::lazy_static;
use regex::Regex;

use crate::item::RepositoryItem;
use crate::logging::warn;

lazy_static! {
    static ref SET_SPEC: Regex =
        Regex::new(r"^[A-Za-z0-9\-_.!~*'()]+(:[A-Za-z0-9\-_.!~*'()]+)*$")
            .expect("set spec pattern is valid");
}

/// True if `spec` is a colon-delimited sequence of non-empty unreserved segments.
#[must_use]
pub fn is_valid_set_spec(spec: &str) -> bool {
    SET_SPEC.is_match(spec)
}

/// Resolves the sets an item belongs to.
///
/// Implementations return set specs in the order they should appear in the
/// record header; the list may be empty.
pub trait SetSpecResolver: Send + Sync {
    /// Ordered set specs of `item`.
    fn list_set_specs(&self, item: &dyn RepositoryItem) -> Vec<String>;
}

impl<F> SetSpecResolver for F
where
    F: Fn(&dyn RepositoryItem) -> Vec<String> + Send + Sync,
{
    fn list_set_specs(&self, item: &dyn RepositoryItem) -> Vec<String> {
        self(item)
    }
}

/// Resolver for repositories without sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSets;

impl SetSpecResolver for NoSets {
    fn list_set_specs(&self, _item: &dyn RepositoryItem) -> Vec<String> {
        Vec::new()
    }
}

/// Derives set specs from the values of one item field.
///
/// Each value is prefixed with an optional parent spec (`type:text`), and values
/// that do not form a valid set spec are skipped.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use oai_records::item::Item;
/// use oai_records::sets::{FieldSetResolver, SetSpecResolver};
///
/// let item = Item::builder("1", Utc::now()).literal("dcterms:type", "text").build();
/// let resolver = FieldSetResolver::new("dcterms:type").with_parent("type");
/// assert_eq!(resolver.list_set_specs(&item), vec!["type:text".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct FieldSetResolver {
    term: String,
    parent: Option<String>,
}

impl FieldSetResolver {
    /// Resolve sets from the field named `term`.
    #[must_use]
    pub fn new(term: impl Into<String>) -> Self {
        FieldSetResolver {
            term: term.into(),
            parent: None,
        }
    }

    /// Nest every derived spec under `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

impl SetSpecResolver for FieldSetResolver {
    fn list_set_specs(&self, item: &dyn RepositoryItem) -> Vec<String> {
        let mut specs = Vec::new();
        for value in item.values(&self.term) {
            let segment = value.text().trim();
            let spec = match &self.parent {
                Some(parent) => format!("{parent}:{segment}"),
                None => segment.to_string(),
            };
            if is_valid_set_spec(&spec) {
                specs.push(spec);
            } else {
                warn!(item = item.id(), spec = %spec, "skipping invalid set spec");
            }
        }
        specs
    }
}
