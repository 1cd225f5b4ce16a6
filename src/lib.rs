#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # oai-records: OAI-PMH record serialization
//!
//! Builds the protocol-conformant pieces of an OAI-PMH response that depend on
//! repository data: `<record>` elements (header plus metadata payload),
//! standalone `<header>` elements, and `<metadataFormat>` advertisements.
//! HTTP handling, verb dispatch and resumption tokens belong to the host.
//!
//! ## Quick Start
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use oai_records::{Item, MapSettings, RecordAssembler, RepositoryConfig, XmlElement};
//! use oai_records::config::SETTING_NAMESPACE_ID;
//! use oai_records::sets::FieldSetResolver;
//!
//! # fn main() -> oai_records::Result<()> {
//! let settings = MapSettings::new().with(SETTING_NAMESPACE_ID, "library.example.org");
//! let config = RepositoryConfig::from_settings(&settings)?;
//! let assembler = RecordAssembler::new(config, FieldSetResolver::new("dcterms:type"))?;
//!
//! let item = Item::builder("42", Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap())
//!     .literal("dcterms:title", "Moby-Dick")
//!     .literal("dcterms:type", "text")
//!     .build();
//!
//! let mut list_records = XmlElement::new("ListRecords");
//! assembler.append_record_for_prefix(&mut list_records, &item, "oai_dc")?;
//! println!("{}", list_records.to_xml_string_pretty()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`assembler`]: `<record>`, `<header>` and `<metadataFormat>` assembly
//! - [`formats`]: Metadata format trait, `oai_dc` handler and prefix registry
//! - [`dublin_core`]: Item to Dublin Core crosswalk
//! - [`identifier`]: `oai:<base>:<local-id>` identifiers
//! - [`date`]: UTC datestamps and harvesting ranges
//! - [`sets`]: Set membership resolution
//! - [`item`]: Repository item trait and concrete item type
//! - [`xml`]: XML element tree and serialization
//! - [`config`]: Repository configuration and settings access
//! - [`error`]: Error types and result type

pub mod assembler;
pub mod config;
pub mod date;
pub mod dublin_core;
pub mod error;
pub mod formats;
pub mod identifier;
pub mod item;
mod logging;
pub mod sets;
pub mod xml;

pub use assembler::{declare_metadata_format, RecordAssembler};
pub use config::{MapSettings, RepositoryConfig, SettingsAccessor};
pub use date::{format_datestamp, parse_datestamp, DateRange, Granularity};
pub use dublin_core::{DcElement, DublinCoreRecord};
pub use error::{OaiError, Result};
pub use formats::{FormatDescriptor, FormatRegistry, MetadataFormat, OaiDc};
pub use identifier::{IdentifierCodec, OaiIdentifier};
pub use item::{FieldValue, Item, RepositoryItem};
pub use sets::{FieldSetResolver, NoSets, SetSpecResolver};
pub use xml::{
    append_new_element, create_element_with_children, strip_invalid_chars, XmlElement, XmlNode,
};
