//! OAI identifiers.
//!
//! Every item is exposed to harvesters under a globally scoped identifier of the
//! form `oai:<base>:<local-id>`, where `<base>` is the repository's namespace
//! identifier (a domain-like name fixed per repository) and `<local-id>` is the
//! item's local identifier. Local ids may themselves contain colons; the base may
//! not, so decoding splits on the first colon after the scheme.
//!
//! # Examples
//!
//! ```
//! use oai_records::identifier::IdentifierCodec;
//!
//! let codec = IdentifierCodec::new("library.example.org")?;
//! let oai_id = codec.encode("book/123")?;
//! assert_eq!(oai_id.as_str(), "oai:library.example.org:book/123");
//! assert_eq!(codec.decode(oai_id.as_str())?, "book/123");
//! # Ok::<(), oai_records::OaiError>(())
//! ```

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::RepositoryConfig;
use crate::error::{OaiError, Result};
use crate::xml::{create_element_with_children, XmlElement};

/// Identifier scheme name.
pub const OAI_SCHEME: &str = "oai";

/// Separator between scheme, base and local id.
pub const DELIMITER: char = ':';

/// Namespace of the `oai-identifier` description block.
pub const OAI_IDENTIFIER_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/oai-identifier";

/// Schema of the `oai-identifier` description block.
pub const OAI_IDENTIFIER_SCHEMA: &str = "http://www.openarchives.org/OAI/2.0/oai-identifier.xsd";

/// XML Schema instance namespace.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

lazy_static! {
    static ref NAMESPACE_ID: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9\-]*(\.[A-Za-z][A-Za-z0-9\-]*)+$")
            .expect("namespace identifier pattern is valid");
    static ref LOCAL_ID: Regex = Regex::new(r"^[A-Za-z0-9\-_.!~*'();/?:@&=+$,%]+$")
        .expect("local identifier pattern is valid");
}

/// True if `base` is a syntactically valid OAI namespace identifier.
#[must_use]
pub fn is_valid_namespace_identifier(base: &str) -> bool {
    NAMESPACE_ID.is_match(base)
}

/// True if `local_id` is non-empty and uses only characters legal in an OAI identifier.
#[must_use]
pub fn is_valid_local_id(local_id: &str) -> bool {
    LOCAL_ID.is_match(local_id)
}

/// A complete `oai:<base>:<local-id>` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OaiIdentifier(String);

impl OaiIdentifier {
    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the identifier text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OaiIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OaiIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<OaiIdentifier> for String {
    fn from(id: OaiIdentifier) -> Self {
        id.0
    }
}

/// Converts between local item ids and OAI identifiers for one repository base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierCodec {
    base: String,
}

impl IdentifierCodec {
    /// Create a codec for the given namespace identifier.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidConfig`] if `base` is not a valid namespace identifier.
    pub fn new(base: impl Into<String>) -> Result<Self> {
        let base = base.into();
        if !is_valid_namespace_identifier(&base) {
            return Err(OaiError::InvalidConfig(format!(
                "'{base}' is not a valid OAI namespace identifier"
            )));
        }
        Ok(IdentifierCodec { base })
    }

    /// Create a codec from the repository configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidConfig`] if the configured base is invalid.
    pub fn from_config(config: &RepositoryConfig) -> Result<Self> {
        Self::new(config.base_identifier.clone())
    }

    /// The namespace identifier this codec encodes with.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Wrap a local id into an OAI identifier.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidIdentifier`] if the local id is empty or contains
    /// characters outside the OAI identifier character set.
    pub fn encode(&self, local_id: &str) -> Result<OaiIdentifier> {
        if !is_valid_local_id(local_id) {
            return Err(OaiError::InvalidIdentifier(format!(
                "'{local_id}' is not a valid local identifier"
            )));
        }
        Ok(self.wrap(local_id))
    }

    /// Wrap a numeric local id. Never fails.
    #[must_use]
    pub fn encode_numeric(&self, local_id: u64) -> OaiIdentifier {
        self.wrap(&local_id.to_string())
    }

    /// Extract the local id from an OAI identifier issued by this repository.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidIdentifier`] when the string is not of the form
    /// `oai:<base>:<local-id>`, or the base belongs to another repository.
    pub fn decode<'a>(&self, identifier: &'a str) -> Result<&'a str> {
        let invalid = || OaiError::InvalidIdentifier(identifier.to_string());

        let rest = identifier
            .strip_prefix(OAI_SCHEME)
            .and_then(|rest| rest.strip_prefix(DELIMITER))
            .ok_or_else(invalid)?;
        let (base, local_id) = rest.split_once(DELIMITER).ok_or_else(invalid)?;

        if base != self.base || !is_valid_local_id(local_id) {
            return Err(invalid());
        }
        Ok(local_id)
    }

    /// Decode an identifier whose local part must be an unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidIdentifier`] if decoding fails or the local id is
    /// not numeric.
    pub fn decode_numeric(&self, identifier: &str) -> Result<u64> {
        let local_id = self.decode(identifier)?;
        local_id
            .parse()
            .map_err(|_| OaiError::InvalidIdentifier(identifier.to_string()))
    }

    /// Example identifier advertised in `Identify` (`oai:<base>:1`).
    #[must_use]
    pub fn sample_identifier(&self) -> OaiIdentifier {
        self.encode_numeric(1)
    }

    /// Append the `oai-identifier` description block used in `Identify` responses.
    pub fn append_description<'a>(&self, parent: &'a mut XmlElement) -> &'a mut XmlElement {
        let sample = self.sample_identifier();
        let delimiter = DELIMITER.to_string();
        let description = create_element_with_children(
            parent,
            "oai-identifier",
            [
                ("scheme", OAI_SCHEME),
                ("repositoryIdentifier", self.base.as_str()),
                ("delimiter", delimiter.as_str()),
                ("sampleIdentifier", sample.as_str()),
            ],
        );
        description
            .set_attribute("xmlns", OAI_IDENTIFIER_NAMESPACE)
            .set_attribute("xmlns:xsi", XSI_NAMESPACE)
            .set_attribute(
                "xsi:schemaLocation",
                format!("{OAI_IDENTIFIER_NAMESPACE} {OAI_IDENTIFIER_SCHEMA}"),
            );
        description
    }

    fn wrap(&self, local_id: &str) -> OaiIdentifier {
        OaiIdentifier(format!(
            "{OAI_SCHEME}{DELIMITER}{}{DELIMITER}{local_id}",
            self.base
        ))
    }
}
