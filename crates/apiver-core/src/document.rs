//! In-memory view of one extension config file.

use std::str::FromStr;

use toml::{Table, Value};

use crate::version::ApiVersion;

/// Key rewritten by the updater.
pub const API_VERSION_KEY: &str = "api_version";

/// Parsed `shopify.extension.toml`.
///
/// Keys keep their source order. Only the top-level `api_version` key is ever
/// touched; every other value, nested tables and arrays included, round-trips
/// unchanged in meaning. Comments and whitespace do not survive.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    table: Table,
}

impl ConfigDocument {
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        text.parse()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.table.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn as_table(&self) -> &Table {
        &self.table
    }

    /// Current `api_version`, if present and a string.
    pub fn api_version(&self) -> Option<&str> {
        self.table.get(API_VERSION_KEY).and_then(Value::as_str)
    }

    /// Set `api_version`, inserting it when absent. Returns the previous value.
    pub fn set_api_version(&mut self, version: &ApiVersion) -> Option<Value> {
        self.table
            .insert(API_VERSION_KEY.to_string(), Value::String(version.to_string()))
    }

    /// Render as TOML text. Plain values come before tables and arrays of
    /// tables, as the format requires; otherwise source order is kept.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(&Value::Table(self.table.clone()))
    }
}

impl FromStr for ConfigDocument {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            table: s.parse::<Table>()?,
        })
    }
}

impl From<Table> for ConfigDocument {
    fn from(table: Table) -> Self {
        Self { table }
    }
}
