// File: src/config.rs
// Purpose: Navigation configuration parsing from navigation.toml / .json

use anyhow::{Context, Result};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::ops::Index;
use std::path::Path;

use crate::params::Params;

/// Top-level configuration key holding navigation sections
pub const CONFIG_KEY: &str = "navigation";

/// Application configuration as seen by the navigation layer
///
/// ```toml
/// [[navigation.default]]
/// label = "Home"
/// route = "home"
///
/// [[navigation.default.pages]]
/// label = "Profile"
/// route = "user.show"
/// params = { id = 1 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Named navigation sections; each is a list of top-level pages
    #[serde(default)]
    pub navigation: Sections,
}

/// Navigation sections in the order the config file lists them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    entries: Vec<(String, Vec<PageConfig>)>,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a section; a replaced section keeps its position
    pub fn insert(&mut self, name: impl Into<String>, pages: Vec<PageConfig>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = pages,
            None => self.entries.push((name, pages)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Vec<PageConfig>> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, pages)| pages)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PageConfig])> {
        self.entries
            .iter()
            .map(|(key, pages)| (key.as_str(), pages.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Index<&str> for Sections {
    type Output = Vec<PageConfig>;

    fn index(&self, name: &str) -> &Self::Output {
        self.get(name)
            .unwrap_or_else(|| panic!("no navigation section named {:?}", name))
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<PageConfig>)> for Sections {
    fn from_iter<I: IntoIterator<Item = (K, Vec<PageConfig>)>>(iter: I) -> Self {
        let mut sections = Sections::new();
        for (name, pages) in iter {
            sections.insert(name, pages);
        }
        sections
    }
}

impl Serialize for Sections {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, pages) in &self.entries {
            map.serialize_entry(name, pages)?;
        }
        map.end()
    }
}

struct SectionsVisitor;

impl<'de> Visitor<'de> for SectionsVisitor {
    type Value = Sections;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a table of navigation sections")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Sections, A::Error> {
        let mut sections = Sections::new();
        while let Some((name, pages)) = access.next_entry::<String, Vec<PageConfig>>()? {
            sections.insert(name, pages);
        }
        Ok(sections)
    }
}

impl<'de> Deserialize<'de> for Sections {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(SectionsVisitor)
    }
}

/// Configuration for a single page and its children
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageConfig {
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    /// Named route; makes this a route-bound page
    #[serde(default)]
    pub route: Option<String>,

    #[serde(default)]
    pub params: Params,

    #[serde(default)]
    pub query: Params,

    #[serde(default)]
    pub fragment: Option<String>,

    /// Fixed link for pages without a route
    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default)]
    pub active: Option<bool>,

    #[serde(default = "default_true")]
    pub visible: bool,

    #[serde(default)]
    pub pages: Vec<PageConfig>,
}

fn default_true() -> bool {
    true
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            label: None,
            id: None,
            title: None,
            route: None,
            params: Params::new(),
            query: Params::new(),
            fragment: None,
            uri: None,
            active: None,
            visible: true,
            pages: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML or JSON file
    ///
    /// The format is picked by extension (`.json`, anything else is TOML).
    /// A missing or empty file yields the default (empty) configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("navigation config {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read navigation config: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
        .with_context(|| format!("Failed to parse navigation config: {:?}", path))?;

        tracing::debug!(
            sections = config.navigation.len(),
            "loaded navigation config from {:?}",
            path
        );

        Ok(config)
    }

    /// Load configuration from the default path (./navigation.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("navigation.toml")
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Named navigation sections, or `None` when there are none
    pub fn sections(&self) -> Option<&Sections> {
        (!self.navigation.is_empty()).then_some(&self.navigation)
    }
}
