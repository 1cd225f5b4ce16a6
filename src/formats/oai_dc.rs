//! `oai_dc`: unqualified Dublin Core, the format every OAI-PMH repository must
//! support.
//!
//! The payload is an `oai_dc:dc` root carrying the `oai_dc`, `dc` and `xsi`
//! namespace declarations and the schema location, followed by `dc:*` elements
//! in canonical order:
//!
//! ```xml
//! <oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/"
//!            xmlns:dc="http://purl.org/dc/elements/1.1/"
//!            xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
//!            xsi:schemaLocation="http://www.openarchives.org/OAI/2.0/oai_dc/ http://www.openarchives.org/OAI/2.0/oai_dc.xsd">
//!   <dc:title>Moby-Dick</dc:title>
//! </oai_dc:dc>
//! ```

use crate::config::RepositoryConfig;
use crate::dublin_core::{item_to_dublin_core, CrosswalkOptions, DC_NAMESPACE};
use crate::error::Result;
use crate::formats::traits::MetadataFormat;
use crate::identifier::XSI_NAMESPACE;
use crate::item::RepositoryItem;
use crate::xml::XmlElement;

/// Metadata prefix of unqualified Dublin Core.
pub const OAI_DC_PREFIX: &str = "oai_dc";

/// Schema URI of `oai_dc`.
pub const OAI_DC_SCHEMA: &str = "http://www.openarchives.org/OAI/2.0/oai_dc.xsd";

/// Namespace URI of `oai_dc`.
pub const OAI_DC_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";

/// Unqualified Dublin Core handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OaiDc {
    options: CrosswalkOptions,
}

impl OaiDc {
    /// Handler with default crosswalk options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler using the crosswalk switches of the repository configuration.
    #[must_use]
    pub fn from_config(config: &RepositoryConfig) -> Self {
        Self::with_options(CrosswalkOptions::from(config))
    }

    /// Handler with explicit crosswalk options.
    #[must_use]
    pub const fn with_options(options: CrosswalkOptions) -> Self {
        OaiDc { options }
    }

    /// Crosswalk options in use.
    #[must_use]
    pub const fn options(&self) -> &CrosswalkOptions {
        &self.options
    }
}

impl MetadataFormat for OaiDc {
    fn metadata_prefix(&self) -> &str {
        OAI_DC_PREFIX
    }

    fn schema_uri(&self) -> &str {
        OAI_DC_SCHEMA
    }

    fn namespace_uri(&self) -> &str {
        OAI_DC_NAMESPACE
    }

    fn append_metadata<'a>(
        &self,
        parent: &'a mut XmlElement,
        item: &dyn RepositoryItem,
    ) -> Result<&'a mut XmlElement> {
        let dc = item_to_dublin_core(item, &self.options);

        let root = parent.append_child(
            XmlElement::new("oai_dc:dc")
                .with_attribute("xmlns:oai_dc", OAI_DC_NAMESPACE)
                .with_attribute("xmlns:dc", DC_NAMESPACE)
                .with_attribute("xmlns:xsi", XSI_NAMESPACE)
                .with_attribute(
                    "xsi:schemaLocation",
                    format!("{OAI_DC_NAMESPACE} {OAI_DC_SCHEMA}"),
                ),
        );
        dc.append_to(root);
        Ok(root)
    }
}
