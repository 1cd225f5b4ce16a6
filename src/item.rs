//! Repository items as seen by the record serializer.
//!
//! The host repository owns its items; this crate reads them through the
//! [`RepositoryItem`] trait and never mutates them. [`Item`] is a ready-made
//! implementation with insertion-ordered fields, used by hosts that copy their
//! data into it and throughout the tests.
//!
//! Field names are vocabulary terms such as `dcterms:title`.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use oai_records::item::{FieldValue, Item, RepositoryItem};
//!
//! let created = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
//! let item = Item::builder("42", created)
//!     .literal("dcterms:title", "Moby-Dick")
//!     .value("dcterms:subject", FieldValue::uri("http://id.loc.gov/authorities/subjects/sh85148271"))
//!     .build();
//!
//! assert_eq!(item.id(), "42");
//! assert_eq!(item.values("dcterms:title").len(), 1);
//! ```

use chrono::{DateTime, FixedOffset, TimeZone};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One value of an item field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldValue {
    /// Plain text, optionally language-tagged
    Literal {
        /// Text content
        value: String,
        /// BCP 47 language tag
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
    },
    /// Link to an external resource
    Uri {
        /// Target URI
        uri: String,
        /// Display label
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

impl FieldValue {
    /// Untagged literal.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        FieldValue::Literal {
            value: value.into(),
            lang: None,
        }
    }

    /// Language-tagged literal.
    #[must_use]
    pub fn literal_lang(value: impl Into<String>, lang: impl Into<String>) -> Self {
        FieldValue::Literal {
            value: value.into(),
            lang: Some(lang.into()),
        }
    }

    /// Unlabelled URI.
    #[must_use]
    pub fn uri(uri: impl Into<String>) -> Self {
        FieldValue::Uri {
            uri: uri.into(),
            label: None,
        }
    }

    /// Labelled URI.
    #[must_use]
    pub fn uri_labelled(uri: impl Into<String>, label: impl Into<String>) -> Self {
        FieldValue::Uri {
            uri: uri.into(),
            label: Some(label.into()),
        }
    }

    /// Text written to XML: the literal itself, or the URI for links.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            FieldValue::Literal { value, .. } => value,
            FieldValue::Uri { uri, .. } => uri,
        }
    }

    /// Language tag of a literal.
    #[must_use]
    pub fn lang(&self) -> Option<&str> {
        match self {
            FieldValue::Literal { lang, .. } => lang.as_deref(),
            FieldValue::Uri { .. } => None,
        }
    }

    /// True when there is nothing to write (blank text).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// Read accessors the serializer needs from a host item.
///
/// `created` is required: every item must always have a usable datestamp.
pub trait RepositoryItem {
    /// Stable local identifier.
    fn id(&self) -> &str;

    /// Creation timestamp, in any offset.
    fn created(&self) -> DateTime<FixedOffset>;

    /// Last modification timestamp, if the item was ever modified.
    fn modified(&self) -> Option<DateTime<FixedOffset>>;

    /// Values of one field in stored order; empty if the field is absent.
    fn values(&self, term: &str) -> &[FieldValue];

    /// Names of the populated fields in stored order.
    fn terms(&self) -> Vec<&str>;

    /// Public URL of the item, if the host exposes one.
    fn url(&self) -> Option<&str> {
        None
    }

    /// URLs of the item's media files.
    fn media_urls(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Timestamp the OAI datestamp is derived from: `modified`, else `created`.
    fn datestamp_source(&self) -> DateTime<FixedOffset> {
        self.modified().unwrap_or_else(|| self.created())
    }
}

/// Concrete item with insertion-ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Local identifier
    pub id: String,
    /// Creation time
    pub created: DateTime<FixedOffset>,
    /// Modification time
    #[serde(default)]
    pub modified: Option<DateTime<FixedOffset>>,
    /// Field term -> values, preserves insertion order
    #[serde(default)]
    pub fields: IndexMap<String, Vec<FieldValue>>,
    /// Public URL
    #[serde(default)]
    pub url: Option<String>,
    /// Media file URLs
    #[serde(default)]
    pub media: Vec<String>,
}

impl Item {
    /// Create an item with no fields.
    #[must_use]
    pub fn new<Tz: TimeZone>(id: impl Into<String>, created: DateTime<Tz>) -> Self {
        Item {
            id: id.into(),
            created: created.fixed_offset(),
            modified: None,
            fields: IndexMap::new(),
            url: None,
            media: Vec::new(),
        }
    }

    /// Create a builder for fluently constructing items.
    #[must_use]
    pub fn builder<Tz: TimeZone>(id: impl Into<String>, created: DateTime<Tz>) -> ItemBuilder {
        ItemBuilder {
            item: Item::new(id, created),
        }
    }

    /// Append a value to a field, creating the field if needed.
    pub fn add_value(&mut self, term: impl Into<String>, value: FieldValue) {
        self.fields.entry(term.into()).or_default().push(value);
    }

    /// Set the modification time.
    pub fn set_modified<Tz: TimeZone>(&mut self, modified: DateTime<Tz>) {
        self.modified = Some(modified.fixed_offset());
    }
}

impl RepositoryItem for Item {
    fn id(&self) -> &str {
        &self.id
    }

    fn created(&self) -> DateTime<FixedOffset> {
        self.created
    }

    fn modified(&self) -> Option<DateTime<FixedOffset>> {
        self.modified
    }

    fn values(&self, term: &str) -> &[FieldValue] {
        self.fields.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    fn terms(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(term, _)| term.as_str())
            .collect()
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn media_urls(&self) -> Vec<&str> {
        self.media.iter().map(String::as_str).collect()
    }
}

/// Builder for [`Item`].
#[derive(Debug)]
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    /// Set the modification time.
    #[must_use]
    pub fn modified<Tz: TimeZone>(mut self, modified: DateTime<Tz>) -> Self {
        self.item.set_modified(modified);
        self
    }

    /// Append a value to a field.
    #[must_use]
    pub fn value(mut self, term: &str, value: FieldValue) -> Self {
        self.item.add_value(term, value);
        self
    }

    /// Append an untagged literal to a field.
    #[must_use]
    pub fn literal(self, term: &str, value: &str) -> Self {
        self.value(term, FieldValue::literal(value))
    }

    /// Set the public URL.
    #[must_use]
    pub fn url(mut self, url: &str) -> Self {
        self.item.url = Some(url.to_string());
        self
    }

    /// Append a media file URL.
    #[must_use]
    pub fn media(mut self, url: &str) -> Self {
        self.item.media.push(url.to_string());
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Item {
        self.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_values_preserve_order() {
        let item = Item::builder("1", created())
            .literal("dcterms:subject", "b")
            .literal("dcterms:subject", "a")
            .build();
        let texts: Vec<&str> = item
            .values("dcterms:subject")
            .iter()
            .map(FieldValue::text)
            .collect();
        assert_eq!(texts, vec!["b", "a"]);
    }

    #[test]
    fn test_missing_field_is_empty() {
        let item = Item::new("1", created());
        assert!(item.values("dcterms:title").is_empty());
        assert!(item.terms().is_empty());
    }

    #[test]
    fn test_terms_in_insertion_order() {
        let item = Item::builder("1", created())
            .literal("dcterms:title", "t")
            .literal("dcterms:creator", "c")
            .literal("dcterms:date", "d")
            .build();
        assert_eq!(
            item.terms(),
            vec!["dcterms:title", "dcterms:creator", "dcterms:date"]
        );
    }

    #[test]
    fn test_datestamp_source_prefers_modified() {
        let modified = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        let item = Item::builder("1", created()).modified(modified).build();
        assert_eq!(item.datestamp_source(), modified);

        let item = Item::new("1", created());
        assert_eq!(item.datestamp_source(), created());
    }

    #[test]
    fn test_field_value_text() {
        assert_eq!(FieldValue::literal("x").text(), "x");
        assert_eq!(FieldValue::uri_labelled("http://a", "A").text(), "http://a");
        assert_eq!(FieldValue::literal_lang("chat", "fr").lang(), Some("fr"));
        assert!(FieldValue::literal("  ").is_blank());
    }

    #[test]
    fn test_item_from_json() {
        let json = r#"{
            "id": "7",
            "created": "2020-01-02T05:04:05+02:00",
            "fields": {
                "dcterms:title": [{"type": "literal", "value": "Title", "lang": "en"}],
                "dcterms:relation": [{"type": "uri", "uri": "http://example.org/x"}]
            }
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id(), "7");
        assert_eq!(item.created(), created());
        assert!(item.modified().is_none());
        assert_eq!(item.values("dcterms:title")[0].lang(), Some("en"));
        assert_eq!(item.values("dcterms:relation")[0].text(), "http://example.org/x");
    }
}
