//! Metadata format handler trait.
//!
//! Each supported output schema is one implementation of [`MetadataFormat`].
//! A handler knows its own metadata prefix, schema and namespace, and how to
//! write an item's fields in that schema's XML shape. New formats are added by
//! registering another implementation in a
//! [`FormatRegistry`](crate::formats::FormatRegistry).
//!
//! The trait is object-safe; handlers are shared as `Arc<dyn MetadataFormat>`
//! across concurrent requests, hence the `Send + Sync` bound.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assembler::declare_metadata_format;
use crate::error::Result;
use crate::item::RepositoryItem;
use crate::xml::XmlElement;

/// The `{metadataPrefix, schema, metadataNamespace}` triple advertised for a format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// Lookup key harvesters use (`oai_dc`)
    pub metadata_prefix: String,
    /// XML schema URI
    pub schema: String,
    /// XML namespace URI
    pub metadata_namespace: String,
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.metadata_prefix, self.metadata_namespace)
    }
}

/// A metadata format handler.
///
/// # Implementation Notes
///
/// Implementations must:
/// - return constant values from the three identity methods;
/// - declare their namespace on the root element created by
///   [`append_metadata`](Self::append_metadata);
/// - never modify the item, and treat missing or empty fields as "no output"
///   rather than an error.
pub trait MetadataFormat: fmt::Debug + Send + Sync {
    /// Unique prefix harvesters request the format by.
    fn metadata_prefix(&self) -> &str;

    /// XML schema URI of the format.
    fn schema_uri(&self) -> &str;

    /// XML namespace URI of the format.
    fn namespace_uri(&self) -> &str;

    /// Write the item's metadata under `parent` (normally the record's
    /// `<metadata>` element) and return the root element created.
    ///
    /// # Errors
    ///
    /// Returns an error only for conditions outside the item's data; missing
    /// fields are never errors.
    fn append_metadata<'a>(
        &self,
        parent: &'a mut XmlElement,
        item: &dyn RepositoryItem,
    ) -> Result<&'a mut XmlElement>;

    /// Append this format's `<metadataFormat>` advertisement under `parent`.
    fn declare_format<'a>(&self, parent: &'a mut XmlElement) -> &'a mut XmlElement {
        declare_metadata_format(parent, self)
    }

    /// Owned copy of the format's identity triple.
    fn descriptor(&self) -> FormatDescriptor {
        FormatDescriptor {
            metadata_prefix: self.metadata_prefix().to_string(),
            schema: self.schema_uri().to_string(),
            metadata_namespace: self.namespace_uri().to_string(),
        }
    }
}
