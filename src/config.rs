//! Repository-wide configuration.
//!
//! The host application owns its settings storage; this crate only reads it once
//! through [`SettingsAccessor`] and freezes the result into an immutable
//! [`RepositoryConfig`] shared by the identifier codec, the format handlers and
//! the record assembler.

use std::collections::HashMap;
use std::hash::BuildHasher;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{OaiError, Result};
use crate::identifier::is_valid_namespace_identifier;

/// Settings key holding the OAI namespace identifier (the identifier base).
pub const SETTING_NAMESPACE_ID: &str = "oai_namespace_id";
/// Settings key holding the human-readable repository name.
pub const SETTING_REPOSITORY_NAME: &str = "oai_repository_name";
/// Settings key: append the item's public URL as an extra `dc:identifier`.
pub const SETTING_APPEND_ITEM_URL: &str = "oai_append_item_url";
/// Settings key: expose media file URLs as extra `dc:identifier` values.
pub const SETTING_EXPOSE_MEDIA: &str = "oai_expose_media";
/// Settings key: feed DCMI refinements into their parent Dublin Core element.
pub const SETTING_MAP_REFINEMENTS: &str = "oai_map_refinements";

/// Namespace identifier used when the host has not configured one.
pub const DEFAULT_NAMESPACE_ID: &str = "default.must.change";
/// Repository name used when the host has not configured one.
pub const DEFAULT_REPOSITORY_NAME: &str = "Repository";

/// Read access to the host application's settings store.
pub trait SettingsAccessor {
    /// Return the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
}

impl<S: BuildHasher> SettingsAccessor for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl<S: BuildHasher> SettingsAccessor for IndexMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        IndexMap::get(self, key).cloned()
    }
}

impl<T: SettingsAccessor + ?Sized> SettingsAccessor for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// In-memory settings store, convenient for tests and static deployments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSettings {
    values: IndexMap<String, String>,
}

impl MapSettings {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl SettingsAccessor for MapSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Immutable repository configuration.
///
/// # Examples
///
/// ```
/// use oai_records::config::RepositoryConfig;
///
/// let config = RepositoryConfig::new("library.example.org")
///     .with_repository_name("Example Library")
///     .with_item_url(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Namespace identifier used as the `<base>` of every OAI identifier.
    pub base_identifier: String,

    /// Human-readable repository name.
    pub repository_name: String,

    /// Append each item's public URL as a `dc:identifier`.
    pub append_item_url: bool,

    /// Append each item's media file URLs as `dc:identifier` values.
    pub expose_media: bool,

    /// Feed DCMI refinements (`dcterms:abstract`, `dcterms:issued`, ...) into
    /// their parent Dublin Core element.
    pub map_refinements: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_identifier: DEFAULT_NAMESPACE_ID.to_string(),
            repository_name: DEFAULT_REPOSITORY_NAME.to_string(),
            append_item_url: false,
            expose_media: false,
            map_refinements: true,
        }
    }
}

impl RepositoryConfig {
    /// Create a configuration with the given identifier base and defaults elsewhere.
    #[must_use]
    pub fn new(base_identifier: impl Into<String>) -> Self {
        Self {
            base_identifier: base_identifier.into(),
            ..Self::default()
        }
    }

    /// Read the configuration from the host's settings store and validate it.
    ///
    /// Missing or blank keys fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidConfig`] if the stored namespace identifier is not
    /// a valid OAI namespace identifier or a boolean key holds an unknown value.
    pub fn from_settings<S: SettingsAccessor + ?Sized>(settings: &S) -> Result<Self> {
        let defaults = Self::default();
        let text = |key: &str| {
            settings
                .get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let flag = |key: &str, default: bool| match text(key) {
            Some(value) => parse_flag(key, &value),
            None => Ok(default),
        };

        let config = Self {
            base_identifier: text(SETTING_NAMESPACE_ID).unwrap_or(defaults.base_identifier),
            repository_name: text(SETTING_REPOSITORY_NAME).unwrap_or(defaults.repository_name),
            append_item_url: flag(SETTING_APPEND_ITEM_URL, defaults.append_item_url)?,
            expose_media: flag(SETTING_EXPOSE_MEDIA, defaults.expose_media)?,
            map_refinements: flag(SETTING_MAP_REFINEMENTS, defaults.map_refinements)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the repository name.
    #[must_use]
    pub fn with_repository_name(mut self, name: impl Into<String>) -> Self {
        self.repository_name = name.into();
        self
    }

    /// Enables appending item URLs as identifiers.
    #[must_use]
    pub const fn with_item_url(mut self, enabled: bool) -> Self {
        self.append_item_url = enabled;
        self
    }

    /// Enables exposing media URLs as identifiers.
    #[must_use]
    pub const fn with_media(mut self, enabled: bool) -> Self {
        self.expose_media = enabled;
        self
    }

    /// Enables or disables DCMI refinement mapping.
    #[must_use]
    pub const fn with_refinements(mut self, enabled: bool) -> Self {
        self.map_refinements = enabled;
        self
    }

    /// Check the identifier base against the OAI namespace-identifier syntax.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidConfig`] if the base is empty or malformed.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_namespace_identifier(&self.base_identifier) {
            return Err(OaiError::InvalidConfig(format!(
                "'{}' is not a valid OAI namespace identifier",
                self.base_identifier
            )));
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(OaiError::InvalidConfig(format!(
            "setting {key} has non-boolean value '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RepositoryConfig::default();
        assert_eq!(config.base_identifier, "default.must.change");
        assert_eq!(config.repository_name, "Repository");
        assert!(!config.append_item_url);
        assert!(!config.expose_media);
        assert!(config.map_refinements);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_settings() {
        let settings = MapSettings::new()
            .with(SETTING_NAMESPACE_ID, "archive.example.edu")
            .with(SETTING_REPOSITORY_NAME, "Example Archive")
            .with(SETTING_EXPOSE_MEDIA, "yes")
            .with(SETTING_MAP_REFINEMENTS, "0");

        let config = RepositoryConfig::from_settings(&settings).unwrap();
        assert_eq!(config.base_identifier, "archive.example.edu");
        assert_eq!(config.repository_name, "Example Archive");
        assert!(config.expose_media);
        assert!(!config.append_item_url);
        assert!(!config.map_refinements);
    }

    #[test]
    fn test_from_settings_blank_falls_back() {
        let mut settings = HashMap::new();
        settings.insert(SETTING_NAMESPACE_ID.to_string(), "   ".to_string());
        let config = RepositoryConfig::from_settings(&settings).unwrap();
        assert_eq!(config.base_identifier, DEFAULT_NAMESPACE_ID);
    }

    #[test]
    fn test_from_settings_rejects_bad_base() {
        let settings = MapSettings::new().with(SETTING_NAMESPACE_ID, "not a domain");
        assert!(matches!(
            RepositoryConfig::from_settings(&settings),
            Err(OaiError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_settings_rejects_bad_flag() {
        let settings = MapSettings::new().with(SETTING_APPEND_ITEM_URL, "maybe");
        assert!(matches!(
            RepositoryConfig::from_settings(&settings),
            Err(OaiError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_namespace_identifier() {
        for good in ["example.org", "lib.uni-x.de", "a.b.c"] {
            assert!(RepositoryConfig::new(good).validate().is_ok(), "{good}");
        }
        for bad in ["", "localhost", "1abc.org", "has:colon.org", "trailing.", "a..b"] {
            assert!(RepositoryConfig::new(bad).validate().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_builder_methods() {
        let config = RepositoryConfig::new("example.org")
            .with_repository_name("Name")
            .with_item_url(true)
            .with_media(true)
            .with_refinements(false);
        assert_eq!(config.repository_name, "Name");
        assert!(config.append_item_url);
        assert!(config.expose_media);
        assert!(!config.map_refinements);
    }

    #[test]
    fn test_serde_roundtrip_with_defaults() {
        let config: RepositoryConfig =
            serde_json::from_str(r#"{"base_identifier": "example.org"}"#).unwrap();
        assert_eq!(config.base_identifier, "example.org");
        assert_eq!(config.repository_name, DEFAULT_REPOSITORY_NAME);
        assert!(config.map_refinements);
    }
}
