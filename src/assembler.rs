//! Record assembly.
//!
//! The [`RecordAssembler`] combines the identifier codec, the datestamp
//! formatter, the set resolver and a metadata format handler into one OAI-PMH
//! `<record>`:
//!
//! ```xml
//! <record>
//!   <header>
//!     <identifier>oai:library.example.org:42</identifier>
//!     <datestamp>2020-01-02T03:04:05Z</datestamp>
//!     <setSpec>collectionA</setSpec>
//!   </header>
//!   <metadata>
//!     <oai_dc:dc ...>...</oai_dc:dc>
//!   </metadata>
//! </record>
//! ```
//!
//! Records are built detached and attached to the caller's parent element only
//! once complete, so a failure never leaves a partial record in the response.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use oai_records::assembler::RecordAssembler;
//! use oai_records::config::RepositoryConfig;
//! use oai_records::item::Item;
//! use oai_records::sets::NoSets;
//! use oai_records::xml::XmlElement;
//!
//! let assembler = RecordAssembler::new(RepositoryConfig::new("library.example.org"), NoSets)?;
//! let item = Item::builder("42", Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap())
//!     .literal("dcterms:title", "Moby-Dick")
//!     .build();
//!
//! let mut list = XmlElement::new("ListRecords");
//! let record = assembler.append_record_for_prefix(&mut list, &item, "oai_dc")?;
//! let header = record.child("header").unwrap();
//! assert_eq!(header.child("identifier").unwrap().text(), "oai:library.example.org:42");
//! assert_eq!(header.child("datestamp").unwrap().text(), "2020-01-02T03:04:05Z");
//! # Ok::<(), oai_records::OaiError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use crate::config::RepositoryConfig;
use crate::date::format_datestamp;
use crate::error::Result;
use crate::formats::{FormatRegistry, MetadataFormat};
use crate::identifier::IdentifierCodec;
use crate::item::RepositoryItem;
use crate::logging::debug;
use crate::sets::SetSpecResolver;
use crate::xml::{append_new_element, create_element_with_children, XmlElement};

/// Append a `<metadataFormat>` advertisement for `handler` under `parent`.
///
/// The element always has exactly three children, in protocol order:
/// `metadataPrefix`, `schema`, `metadataNamespace`.
pub fn declare_metadata_format<'a, F>(parent: &'a mut XmlElement, handler: &F) -> &'a mut XmlElement
where
    F: MetadataFormat + ?Sized,
{
    create_element_with_children(
        parent,
        "metadataFormat",
        [
            ("metadataPrefix", handler.metadata_prefix()),
            ("schema", handler.schema_uri()),
            ("metadataNamespace", handler.namespace_uri()),
        ],
    )
}

/// Builds `<record>`, `<header>` and `<metadataFormat>` elements for one repository.
///
/// Holds only immutable state and is shared freely between threads; each request
/// appends into its own [`XmlElement`] tree.
#[derive(Clone)]
pub struct RecordAssembler {
    config: Arc<RepositoryConfig>,
    codec: IdentifierCodec,
    sets: Arc<dyn SetSpecResolver>,
    formats: FormatRegistry,
}

impl fmt::Debug for RecordAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordAssembler")
            .field("config", &self.config)
            .field("codec", &self.codec)
            .field("formats", &self.formats)
            .finish_non_exhaustive()
    }
}

impl RecordAssembler {
    /// Assembler with the default format registry (`oai_dc`).
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidConfig`](crate::OaiError::InvalidConfig) if the
    /// configured identifier base is invalid.
    pub fn new(config: RepositoryConfig, sets: impl SetSpecResolver + 'static) -> Result<Self> {
        let formats = FormatRegistry::with_defaults(&config);
        Self::with_formats(config, Arc::new(sets), formats)
    }

    /// Assembler with an explicit format registry.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidConfig`](crate::OaiError::InvalidConfig) if the
    /// configured identifier base is invalid.
    pub fn with_formats(
        config: RepositoryConfig,
        sets: Arc<dyn SetSpecResolver>,
        formats: FormatRegistry,
    ) -> Result<Self> {
        let codec = IdentifierCodec::from_config(&config)?;
        Ok(RecordAssembler {
            config: Arc::new(config),
            codec,
            sets,
            formats,
        })
    }

    /// Repository configuration.
    #[must_use]
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Identifier codec for the configured base.
    #[must_use]
    pub fn codec(&self) -> &IdentifierCodec {
        &self.codec
    }

    /// Registered metadata formats.
    #[must_use]
    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Header datestamp of `item`: its modification time if set, else its creation time.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidDate`](crate::OaiError::InvalidDate) if that
    /// timestamp lies outside the years `0000`-`9999`.
    pub fn datestamp(&self, item: &dyn RepositoryItem) -> Result<String> {
        format_datestamp(&item.datestamp_source())
    }

    /// Append a complete `<record>` for `item` in the format of `handler`.
    ///
    /// The record is appended after any children `parent` already has.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidIdentifier`](crate::OaiError::InvalidIdentifier)
    /// if the item's local id cannot be encoded,
    /// [`OaiError::InvalidDate`](crate::OaiError::InvalidDate) if its datestamp is
    /// out of range, or any error of the handler. On error `parent` is left
    /// untouched.
    pub fn append_record<'a>(
        &self,
        parent: &'a mut XmlElement,
        item: &dyn RepositoryItem,
        handler: &dyn MetadataFormat,
    ) -> Result<&'a mut XmlElement> {
        let record = self.build_record(item, handler)?;
        debug!(
            item = item.id(),
            prefix = handler.metadata_prefix(),
            "appended record"
        );
        Ok(parent.append_child(record))
    }

    /// Append a `<record>` in the format registered under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::UnsupportedFormat`](crate::OaiError::UnsupportedFormat)
    /// for an unregistered prefix, before anything is built, plus the errors of
    /// [`append_record`](Self::append_record).
    pub fn append_record_for_prefix<'a>(
        &self,
        parent: &'a mut XmlElement,
        item: &dyn RepositoryItem,
        prefix: &str,
    ) -> Result<&'a mut XmlElement> {
        let handler = self.formats.get(prefix)?;
        self.append_record(parent, item, handler.as_ref())
    }

    /// Append a standalone `<header>` for `item` (as listed by `ListIdentifiers`).
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidIdentifier`](crate::OaiError::InvalidIdentifier)
    /// if the item's local id cannot be encoded, or
    /// [`OaiError::InvalidDate`](crate::OaiError::InvalidDate) if its datestamp is
    /// out of range; `parent` is then untouched.
    pub fn append_header<'a>(
        &self,
        parent: &'a mut XmlElement,
        item: &dyn RepositoryItem,
    ) -> Result<&'a mut XmlElement> {
        self.build_header(parent, item)
    }

    /// Append the `<metadataFormat>` advertisement of `handler`.
    pub fn declare_metadata_format<'a>(
        &self,
        parent: &'a mut XmlElement,
        handler: &dyn MetadataFormat,
    ) -> &'a mut XmlElement {
        declare_metadata_format(parent, handler)
    }

    /// Append one `<metadataFormat>` per registered format, in registration order
    /// (the body of a `ListMetadataFormats` response).
    pub fn list_metadata_formats(&self, parent: &mut XmlElement) {
        for handler in self.formats.iter() {
            handler.declare_format(parent);
        }
    }

    fn build_record(
        &self,
        item: &dyn RepositoryItem,
        handler: &dyn MetadataFormat,
    ) -> Result<XmlElement> {
        let mut record = XmlElement::new("record");
        self.build_header(&mut record, item)?;

        let metadata = record.append_child(XmlElement::new("metadata"));
        handler.append_metadata(metadata, item)?;
        Ok(record)
    }

    // Everything fallible happens before `parent` is touched.
    fn build_header<'a>(
        &self,
        parent: &'a mut XmlElement,
        item: &dyn RepositoryItem,
    ) -> Result<&'a mut XmlElement> {
        let identifier = self.codec.encode(item.id())?;
        let datestamp = self.datestamp(item)?;

        let header = create_element_with_children(
            parent,
            "header",
            [
                ("identifier", identifier.as_str()),
                ("datestamp", datestamp.as_str()),
            ],
        );
        for spec in self.sets.list_set_specs(item) {
            append_new_element(header, "setSpec", spec);
        }
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OaiError;
    use crate::formats::OaiDc;
    use crate::item::Item;
    use crate::sets::NoSets;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn assembler() -> RecordAssembler {
        RecordAssembler::new(RepositoryConfig::new("repo.example.org"), NoSets).unwrap()
    }

    fn item() -> Item {
        Item::builder("12", Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap())
            .literal("dcterms:title", "Title")
            .build()
    }

    fn child_names(element: &XmlElement) -> Vec<&str> {
        element.child_elements().map(XmlElement::name).collect()
    }

    #[test]
    fn test_record_structure() {
        let mut parent = XmlElement::new("GetRecord");
        let record = assembler()
            .append_record(&mut parent, &item(), &OaiDc::new())
            .unwrap();

        assert_eq!(child_names(record), vec!["header", "metadata"]);
        let header = record.child("header").unwrap();
        assert_eq!(child_names(header), vec!["identifier", "datestamp"]);
        assert_eq!(header.child("identifier").unwrap().text(), "oai:repo.example.org:12");

        let metadata = record.child("metadata").unwrap();
        assert_eq!(child_names(metadata), vec!["oai_dc:dc"]);
    }

    #[test]
    fn test_datestamp_falls_back_to_created() {
        assert_eq!(assembler().datestamp(&item()).unwrap(), "2020-01-02T03:04:05Z");
    }

    #[test]
    fn test_datestamp_uses_modified_in_utc() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let mut item = item();
        item.set_modified(offset.with_ymd_and_hms(2022, 5, 6, 8, 0, 0).unwrap());
        assert_eq!(assembler().datestamp(&item).unwrap(), "2022-05-06T07:00:00Z");
    }

    #[test]
    fn test_out_of_range_datestamp_builds_nothing() {
        let mut far_future = item();
        far_future.set_modified(Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap());

        let mut parent = XmlElement::new("GetRecord");
        let result = assembler().append_record(&mut parent, &far_future, &OaiDc::new());
        assert!(matches!(result, Err(OaiError::InvalidDate(_))));
        assert!(parent.is_empty());

        let result = assembler().append_header(&mut parent, &far_future);
        assert!(matches!(result, Err(OaiError::InvalidDate(_))));
        assert!(parent.is_empty());
    }

    #[test]
    fn test_set_specs_in_resolver_order() {
        let resolver = |_: &dyn RepositoryItem| vec!["b".to_string(), "a".to_string(), "b".to_string()];
        let assembler =
            RecordAssembler::new(RepositoryConfig::new("repo.example.org"), resolver).unwrap();

        let mut parent = XmlElement::new("ListIdentifiers");
        let header = assembler.append_header(&mut parent, &item()).unwrap();
        let specs: Vec<String> = header.find_all("setSpec").map(XmlElement::text).collect();
        assert_eq!(specs, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_unknown_prefix_builds_nothing() {
        let mut parent = XmlElement::new("GetRecord");
        let result = assembler().append_record_for_prefix(&mut parent, &item(), "mods");
        assert!(matches!(result, Err(OaiError::UnsupportedFormat(_))));
        assert!(parent.is_empty());
    }

    #[test]
    fn test_invalid_local_id_builds_nothing() {
        let bad = Item::new("has space", Utc::now());
        let mut parent = XmlElement::new("GetRecord");
        let result = assembler().append_record(&mut parent, &bad, &OaiDc::new());
        assert!(matches!(result, Err(OaiError::InvalidIdentifier(_))));
        assert!(parent.is_empty());

        assert!(assembler().append_header(&mut parent, &bad).is_err());
        assert!(parent.is_empty());
    }

    #[test]
    fn test_declare_metadata_format() {
        let mut parent = XmlElement::new("ListMetadataFormats");
        let format = assembler().declare_metadata_format(&mut parent, &OaiDc::new());
        assert_eq!(
            child_names(format),
            vec!["metadataPrefix", "schema", "metadataNamespace"]
        );
        assert_eq!(format.child("metadataPrefix").unwrap().text(), "oai_dc");
    }

    #[test]
    fn test_list_metadata_formats() {
        let mut parent = XmlElement::new("ListMetadataFormats");
        assembler().list_metadata_formats(&mut parent);
        assert_eq!(parent.find_all("metadataFormat").count(), 1);
    }

    #[test]
    fn test_rejects_invalid_base() {
        let result = RecordAssembler::new(RepositoryConfig::new("no-dots"), NoSets);
        assert!(matches!(result, Err(OaiError::InvalidConfig(_))));
    }
}
