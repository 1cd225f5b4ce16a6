//! Metadata formats and the prefix registry.
//!
//! Every output schema implements [`MetadataFormat`]. The repository keeps one
//! [`FormatRegistry`] mapping metadata prefixes to handlers; `GetRecord` and
//! `ListRecords` resolve the requested prefix through it and
//! `ListMetadataFormats` walks it in registration order.
//!
//! # Supported Formats
//!
//! | Prefix | Module | Description |
//! |--------|--------|-------------|
//! | `oai_dc` | [`oai_dc`] | Unqualified Dublin Core (mandatory for every repository) |
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use oai_records::formats::{FormatRegistry, MetadataFormat, OaiDc};
//!
//! let mut registry = FormatRegistry::new();
//! registry.register(Arc::new(OaiDc::new()))?;
//!
//! let handler = registry.get("oai_dc")?;
//! assert_eq!(handler.namespace_uri(), "http://www.openarchives.org/OAI/2.0/oai_dc/");
//! assert!(registry.get("marc21").is_err());
//! # Ok::<(), oai_records::OaiError>(())
//! ```

mod traits;

pub mod oai_dc;

pub use oai_dc::OaiDc;
pub use traits::{FormatDescriptor, MetadataFormat};

use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::RepositoryConfig;
use crate::error::{OaiError, Result};
use crate::logging::debug;

/// Read-only-after-startup map from metadata prefix to handler.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    handlers: IndexMap<String, Arc<dyn MetadataFormat>>,
}

impl FormatRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the formats every repository supports, configured from `config`.
    #[must_use]
    pub fn with_defaults(config: &RepositoryConfig) -> Self {
        let mut handlers: IndexMap<String, Arc<dyn MetadataFormat>> = IndexMap::new();
        let oai_dc = OaiDc::from_config(config);
        handlers.insert(oai_dc.metadata_prefix().to_string(), Arc::new(oai_dc));
        FormatRegistry { handlers }
    }

    /// Add a handler under its own metadata prefix.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::DuplicateFormat`] if the prefix is already registered.
    pub fn register(&mut self, handler: Arc<dyn MetadataFormat>) -> Result<()> {
        let prefix = handler.metadata_prefix().to_string();
        if self.handlers.contains_key(&prefix) {
            return Err(OaiError::DuplicateFormat(prefix));
        }
        debug!(prefix = %prefix, namespace = handler.namespace_uri(), "registered metadata format");
        self.handlers.insert(prefix, handler);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::DuplicateFormat`] if the prefix is already registered.
    pub fn with_format(mut self, handler: Arc<dyn MetadataFormat>) -> Result<Self> {
        self.register(handler)?;
        Ok(self)
    }

    /// Look up the handler for a requested prefix.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::UnsupportedFormat`] if no handler uses `prefix`.
    pub fn get(&self, prefix: &str) -> Result<&Arc<dyn MetadataFormat>> {
        self.handlers
            .get(prefix)
            .ok_or_else(|| OaiError::UnsupportedFormat(prefix.to_string()))
    }

    /// True if a handler uses `prefix`.
    #[must_use]
    pub fn contains(&self, prefix: &str) -> bool {
        self.handlers.contains_key(prefix)
    }

    /// Registered prefixes in registration order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Registered handlers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn MetadataFormat>> {
        self.handlers.values()
    }

    /// Descriptors of all registered formats, in registration order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<FormatDescriptor> {
        self.iter().map(|handler| handler.descriptor()).collect()
    }

    /// Number of registered formats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
