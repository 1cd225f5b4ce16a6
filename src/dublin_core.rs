//! Dublin Core crosswalk for repository items.
//!
//! This module maps an item's fields onto the Dublin Core Metadata Element Set
//! (DCMES), the 15-element schema every OAI-PMH repository must support:
//! - **Title** (dc:title)
//! - **Creator** (dc:creator)
//! - **Subject** (dc:subject)
//! - **Description** (dc:description)
//! - **Publisher** (dc:publisher)
//! - **Contributor** (dc:contributor)
//! - **Date** (dc:date)
//! - **Type** (dc:type)
//! - **Format** (dc:format)
//! - **Identifier** (dc:identifier)
//! - **Source** (dc:source)
//! - **Language** (dc:language)
//! - **Relation** (dc:relation)
//! - **Coverage** (dc:coverage)
//! - **Rights** (dc:rights)
//!
//! Element `X` is fed from the item fields `dcterms:X` and `dc:X`, in that order.
//! When refinement mapping is enabled, DCMI refinements (`dcterms:abstract`,
//! `dcterms:issued`, `dcterms:isPartOf`, ...) follow as values of their parent
//! element. Missing fields produce no values; blank values are skipped, as are
//! characters XML 1.0 cannot carry.
//!
//! # Examples
//!
//! ```
//! use chrono::Utc;
//! use oai_records::dublin_core::{item_to_dublin_core, CrosswalkOptions, DcElement};
//! use oai_records::item::Item;
//!
//! let item = Item::builder("1", Utc::now())
//!     .literal("dcterms:title", "Leaves of Grass")
//!     .literal("dcterms:issued", "1855")
//!     .build();
//!
//! let dc = item_to_dublin_core(&item, &CrosswalkOptions::default());
//! assert_eq!(dc.values(DcElement::Title)[0].text, "Leaves of Grass");
//! assert_eq!(dc.values(DcElement::Date)[0].text, "1855");
//! ```

use std::fmt;

use crate::config::RepositoryConfig;
use crate::item::RepositoryItem;
use crate::xml::{append_new_element, strip_invalid_chars, XmlElement};

/// Dublin Core elements namespace.
pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

/// One of the 15 Dublin Core elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DcElement {
    /// Title of the resource
    Title,
    /// Entity primarily responsible for the resource
    Creator,
    /// Topic of the resource
    Subject,
    /// Account of the resource
    Description,
    /// Entity responsible for making the resource available
    Publisher,
    /// Entity responsible for contributions to the resource
    Contributor,
    /// Point or period of time associated with the resource
    Date,
    /// Nature or genre of the resource
    Type,
    /// File format, physical medium, or dimensions
    Format,
    /// Unambiguous reference to the resource
    Identifier,
    /// Related resource from which the resource is derived
    Source,
    /// Language of the resource
    Language,
    /// Related resource
    Relation,
    /// Spatial or temporal topic
    Coverage,
    /// Rights held in and over the resource
    Rights,
}

impl DcElement {
    /// All elements in canonical `oai_dc` order.
    pub const ALL: [DcElement; 15] = [
        DcElement::Title,
        DcElement::Creator,
        DcElement::Subject,
        DcElement::Description,
        DcElement::Publisher,
        DcElement::Contributor,
        DcElement::Date,
        DcElement::Type,
        DcElement::Format,
        DcElement::Identifier,
        DcElement::Source,
        DcElement::Language,
        DcElement::Relation,
        DcElement::Coverage,
        DcElement::Rights,
    ];

    /// Unprefixed element name (`title`).
    #[must_use]
    pub const fn local_name(self) -> &'static str {
        match self {
            DcElement::Title => "title",
            DcElement::Creator => "creator",
            DcElement::Subject => "subject",
            DcElement::Description => "description",
            DcElement::Publisher => "publisher",
            DcElement::Contributor => "contributor",
            DcElement::Date => "date",
            DcElement::Type => "type",
            DcElement::Format => "format",
            DcElement::Identifier => "identifier",
            DcElement::Source => "source",
            DcElement::Language => "language",
            DcElement::Relation => "relation",
            DcElement::Coverage => "coverage",
            DcElement::Rights => "rights",
        }
    }

    /// Prefixed XML tag (`dc:title`).
    #[must_use]
    pub fn tag(self) -> String {
        format!("dc:{}", self.local_name())
    }

    /// DCMI terms that refine this element, by local name.
    #[must_use]
    pub const fn refinements(self) -> &'static [&'static str] {
        match self {
            DcElement::Title => &["alternative"],
            DcElement::Description => &["tableOfContents", "abstract"],
            DcElement::Date => &[
                "created",
                "valid",
                "available",
                "issued",
                "modified",
                "dateAccepted",
                "dateCopyrighted",
                "dateSubmitted",
            ],
            DcElement::Format => &["extent", "medium"],
            DcElement::Identifier => &["bibliographicCitation"],
            DcElement::Relation => &[
                "isVersionOf",
                "hasVersion",
                "isReplacedBy",
                "replaces",
                "isRequiredBy",
                "requires",
                "isPartOf",
                "hasPart",
                "isReferencedBy",
                "references",
                "isFormatOf",
                "hasFormat",
                "conformsTo",
            ],
            DcElement::Coverage => &["spatial", "temporal"],
            DcElement::Rights => &["accessRights", "license"],
            DcElement::Creator
            | DcElement::Subject
            | DcElement::Publisher
            | DcElement::Contributor
            | DcElement::Type
            | DcElement::Source
            | DcElement::Language => &[],
        }
    }

    /// Item field names feeding this element, in precedence order.
    #[must_use]
    pub fn source_terms(self, map_refinements: bool) -> Vec<String> {
        let mut terms = vec![
            format!("dcterms:{}", self.local_name()),
            format!("dc:{}", self.local_name()),
        ];
        if map_refinements {
            terms.extend(
                self.refinements()
                    .iter()
                    .map(|refinement| format!("dcterms:{refinement}")),
            );
        }
        terms
    }
}

impl fmt::Display for DcElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.local_name())
    }
}

/// One value of a Dublin Core element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcValue {
    /// Text content
    pub text: String,
    /// Language tag written as `xml:lang`
    pub lang: Option<String>,
}

impl DcValue {
    /// Untagged value.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        DcValue {
            text: text.into(),
            lang: None,
        }
    }
}

/// Dublin Core metadata record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DublinCoreRecord {
    /// dc:title - Title of the resource
    pub title: Vec<DcValue>,
    /// dc:creator - Entity responsible for the resource
    pub creator: Vec<DcValue>,
    /// dc:subject - Topic of the resource
    pub subject: Vec<DcValue>,
    /// dc:description - Account of the resource
    pub description: Vec<DcValue>,
    /// dc:publisher - Entity responsible for making the resource available
    pub publisher: Vec<DcValue>,
    /// dc:contributor - Entity responsible for making contributions to the resource
    pub contributor: Vec<DcValue>,
    /// dc:date - Point or period of time associated with the resource
    pub date: Vec<DcValue>,
    /// dc:type - Nature or genre of the resource
    pub dc_type: Vec<DcValue>,
    /// dc:format - File format, physical medium, or dimensions of the resource
    pub format: Vec<DcValue>,
    /// dc:identifier - Unambiguous reference to the resource
    pub identifier: Vec<DcValue>,
    /// dc:source - Related resource from which the resource is derived
    pub source: Vec<DcValue>,
    /// dc:language - Language of the resource
    pub language: Vec<DcValue>,
    /// dc:relation - Related resource
    pub relation: Vec<DcValue>,
    /// dc:coverage - Spatial or temporal topic of the resource
    pub coverage: Vec<DcValue>,
    /// dc:rights - Information about rights held in and over the resource
    pub rights: Vec<DcValue>,
}

impl DublinCoreRecord {
    /// Values of one element.
    #[must_use]
    pub fn values(&self, element: DcElement) -> &[DcValue] {
        match element {
            DcElement::Title => &self.title,
            DcElement::Creator => &self.creator,
            DcElement::Subject => &self.subject,
            DcElement::Description => &self.description,
            DcElement::Publisher => &self.publisher,
            DcElement::Contributor => &self.contributor,
            DcElement::Date => &self.date,
            DcElement::Type => &self.dc_type,
            DcElement::Format => &self.format,
            DcElement::Identifier => &self.identifier,
            DcElement::Source => &self.source,
            DcElement::Language => &self.language,
            DcElement::Relation => &self.relation,
            DcElement::Coverage => &self.coverage,
            DcElement::Rights => &self.rights,
        }
    }

    /// Mutable values of one element.
    pub fn values_mut(&mut self, element: DcElement) -> &mut Vec<DcValue> {
        match element {
            DcElement::Title => &mut self.title,
            DcElement::Creator => &mut self.creator,
            DcElement::Subject => &mut self.subject,
            DcElement::Description => &mut self.description,
            DcElement::Publisher => &mut self.publisher,
            DcElement::Contributor => &mut self.contributor,
            DcElement::Date => &mut self.date,
            DcElement::Type => &mut self.dc_type,
            DcElement::Format => &mut self.format,
            DcElement::Identifier => &mut self.identifier,
            DcElement::Source => &mut self.source,
            DcElement::Language => &mut self.language,
            DcElement::Relation => &mut self.relation,
            DcElement::Coverage => &mut self.coverage,
            DcElement::Rights => &mut self.rights,
        }
    }

    /// True when no element has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        DcElement::ALL
            .iter()
            .all(|element| self.values(*element).is_empty())
    }

    /// Append `dc:*` elements under `parent` in canonical order, one per value.
    pub fn append_to(&self, parent: &mut XmlElement) {
        for element in DcElement::ALL {
            let tag = element.tag();
            for value in self.values(element) {
                let written = append_new_element(parent, &tag, value.text.as_str());
                if let Some(lang) = &value.lang {
                    written.set_attribute("xml:lang", lang.as_str());
                }
            }
        }
    }
}

/// Switches controlling the crosswalk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct CrosswalkOptions {
    /// Feed DCMI refinements into their parent element.
    pub map_refinements: bool,
    /// Append the item's public URL as a `dc:identifier`.
    pub append_item_url: bool,
    /// Append media file URLs as `dc:identifier` values.
    pub expose_media: bool,
    /// Carry literal language tags over as `xml:lang`.
    pub keep_language_tags: bool,
}

impl Default for CrosswalkOptions {
    fn default() -> Self {
        Self {
            map_refinements: true,
            append_item_url: false,
            expose_media: false,
            keep_language_tags: true,
        }
    }
}

impl From<&RepositoryConfig> for CrosswalkOptions {
    fn from(config: &RepositoryConfig) -> Self {
        Self {
            map_refinements: config.map_refinements,
            append_item_url: config.append_item_url,
            expose_media: config.expose_media,
            ..Self::default()
        }
    }
}

/// Map an item onto the 15 Dublin Core elements. Never fails; the item is only read.
#[must_use]
pub fn item_to_dublin_core(item: &dyn RepositoryItem, options: &CrosswalkOptions) -> DublinCoreRecord {
    let mut dc = DublinCoreRecord::default();

    for element in DcElement::ALL {
        let values = dc.values_mut(element);
        for term in element.source_terms(options.map_refinements) {
            for value in item.values(&term) {
                let Some(text) = clean_text(value.text()) else {
                    continue;
                };
                values.push(DcValue {
                    text,
                    lang: value
                        .lang()
                        .filter(|_| options.keep_language_tags)
                        .and_then(clean_text),
                });
            }
        }
    }

    extract_links(item, options, &mut dc);
    dc
}

fn extract_links(item: &dyn RepositoryItem, options: &CrosswalkOptions, dc: &mut DublinCoreRecord) {
    if options.append_item_url {
        if let Some(url) = item.url().and_then(clean_text) {
            dc.identifier.push(DcValue::new(url));
        }
    }

    if options.expose_media {
        for url in item.media_urls().into_iter().filter_map(clean_text) {
            dc.identifier.push(DcValue::new(url));
        }
    }
}

// Trimmed text with non-XML characters removed; `None` if nothing is left.
fn clean_text(raw: &str) -> Option<String> {
    let text = strip_invalid_chars(raw);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
