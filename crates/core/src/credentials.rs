//! Section-grouped credential lookup.
//!
//! Reads every section of the credential file as plain strings, for callers
//! that need values outside the typed [`AppConfig`](crate::AppConfig).

use crate::error::{CoreError, Result};
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Key/value pairs of one credential section.
pub type Section = BTreeMap<String, String>;

/// Result of a credential selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSelection {
    /// Exactly one value was requested.
    Single(String),
    /// Several values, grouped by section.
    Sections(BTreeMap<String, Section>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl RawValue {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialStore {
    sections: BTreeMap<String, Section>,
}

impl CredentialStore {
    /// Reads all sections of a TOML credential file.
    ///
    /// # Errors
    /// Returns an error if the file does not exist or is not a table of tables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CoreError::Config(format!(
                "credential file not found: {}",
                path.display()
            )));
        }
        Self::from_figment(Figment::new().merge(Toml::file(path)))
    }

    /// Parses credentials from TOML text.
    ///
    /// # Errors
    /// Returns an error if the text is not a table of tables.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Self::from_figment(Figment::new().merge(Toml::string(toml)))
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, RawValue>> = figment.extract()?;
        let sections = raw
            .into_iter()
            .map(|(name, values)| {
                let section = values
                    .into_iter()
                    .map(|(key, value)| (key, value.into_string()))
                    .collect();
                (name, section)
            })
            .collect();
        Ok(Self { sections })
    }

    /// Returns every section.
    #[must_use]
    pub fn all(&self) -> &BTreeMap<String, Section> {
        &self.sections
    }

    /// Returns one section.
    ///
    /// # Errors
    /// Returns `CoreError::MissingSection` if the section is absent.
    pub fn section(&self, name: &str) -> Result<&Section> {
        self.sections
            .get(name)
            .ok_or_else(|| CoreError::missing_section(name))
    }

    /// Returns one value.
    ///
    /// # Errors
    /// Returns an error if the section or key is absent.
    pub fn get(&self, section: &str, key: &str) -> Result<&str> {
        self.section(section)?
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| CoreError::missing_credential(section, key))
    }

    /// Selects values by section and key.
    ///
    /// A request naming a single value returns it directly; anything else is
    /// returned grouped by section.
    ///
    /// # Errors
    /// Returns an error if any requested section or key is absent.
    pub fn select(&self, request: &[(&str, &[&str])]) -> Result<CredentialSelection> {
        if let [(section, [key])] = request {
            return Ok(CredentialSelection::Single(self.get(section, key)?.to_string()));
        }

        let mut selected = BTreeMap::new();
        for (section, keys) in request {
            let mut values = Section::new();
            for key in *keys {
                values.insert((*key).to_string(), self.get(section, key)?.to_string());
            }
            selected.insert((*section).to_string(), values);
        }
        Ok(CredentialSelection::Sections(selected))
    }
}
