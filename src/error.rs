//! Error types for OAI-PMH record serialization.
//!
//! This module provides the [`OaiError`] type for all library operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all OAI record operations.
///
/// Every failure is reported as a typed error before any XML is attached to the
/// caller's tree, so a failed call never leaves a partially built record behind.
#[derive(Error, Debug)]
pub enum OaiError {
    /// Malformed OAI identifier, foreign repository base, or illegal local id.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Datestamp that matches neither day nor seconds granularity.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Metadata prefix with no registered format handler.
    #[error("Unsupported metadata format: {0}")]
    UnsupportedFormat(String),

    /// A second handler was registered under an existing metadata prefix.
    #[error("Duplicate metadata format: {0}")]
    DuplicateFormat(String),

    /// Repository configuration that fails validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// XML serialization or parse failure.
    #[error("XML error: {0}")]
    Xml(String),

    /// IO error from the underlying destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for OaiError {
    fn from(err: quick_xml::Error) -> Self {
        OaiError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OaiError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OaiError::Xml(err.to_string())
    }
}

/// Convenience type alias for [`std::result::Result`] with [`OaiError`].
pub type Result<T> = std::result::Result<T, OaiError>;
