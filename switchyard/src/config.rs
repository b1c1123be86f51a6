//! Hierarchical configuration tree consumed by the router.
//!
//! The router never parses configuration text itself; it reads a parsed
//! tree through the typed accessors below. The tree is TOML-backed and
//! keys may be dotted paths (`server.port`). A direct child always wins
//! over dotted traversal, so keys containing literal dots still resolve.

use std::fs::read_to_string;
use std::path::Path;

use toml::value::Table;
use toml::Value;

use crate::error::Error;

/// Parsed configuration document.
///
/// A profile scopes all subsequent reads to a subtree, mirroring how
/// the loader walks `domains.*` without repeating the prefix.
#[derive(Debug, Clone, Default)]
pub struct Config {
    root: Table,
    profile: Option<String>,
}

impl Config {
    /// Parse a configuration document from a string.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let root: Table = toml::from_str(text)?;
        Ok(Self {
            root,
            profile: None,
        })
    }

    /// Load a configuration document from a file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = read_to_string(path)?;
        Self::parse(&text)
    }

    /// String value for the given key.
    ///
    /// Integers are stringified, which keeps `port = 8080` and
    /// `port = "8080"` equivalent.
    pub fn string(&self, key: &str) -> Option<String> {
        match self.node(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            _ => None,
        }
    }

    pub fn string_default(&self, key: &str, default: &str) -> String {
        self.string(key).unwrap_or_else(|| default.to_string())
    }

    pub fn bool_default(&self, key: &str, default: bool) -> bool {
        match self.node(key) {
            Some(Value::Boolean(b)) => *b,
            _ => default,
        }
    }

    /// String list value. A scalar string reads as a one-element list.
    pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
        match self.node(key)? {
            Value::String(s) => Some(vec![s.clone()]),
            Value::Array(values) => Some(
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Child keys of the current (profile-scoped) node, sorted.
    pub fn keys(&self) -> Vec<String> {
        match self.current() {
            Some(table) => table.keys().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Subtree rooted at the given key, as its own configuration.
    pub fn sub(&self, key: &str) -> Option<Config> {
        let table = self.node(key)?.as_table()?;
        Some(Config {
            root: table.clone(),
            profile: None,
        })
    }

    pub fn is_exists(&self, key: &str) -> bool {
        self.node(key).is_some()
    }

    /// Scope all subsequent reads to the subtree at `key`. Returns
    /// false (leaving the profile unset) when the key doesn't resolve
    /// to a table.
    pub fn set_profile(&mut self, key: &str) -> bool {
        match resolve(&self.root, key) {
            Some(Value::Table(_)) => {
                self.profile = Some(key.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn clear_profile(&mut self) {
        self.profile = None;
    }

    /// Deep-merge another document over this one. Tables merge
    /// recursively; any other value is overwritten.
    pub fn merge(&mut self, other: &Config) {
        merge_tables(&mut self.root, &other.root);
    }

    fn current(&self) -> Option<&Table> {
        match &self.profile {
            None => Some(&self.root),
            Some(profile) => resolve(&self.root, profile)?.as_table(),
        }
    }

    fn node(&self, key: &str) -> Option<&Value> {
        resolve(self.current()?, key)
    }
}

fn resolve<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    if let Some(value) = table.get(key) {
        return Some(value);
    }

    let (head, rest) = key.split_once('.')?;
    resolve(table.get(head)?.as_table()?, rest)
}

fn merge_tables(base: &mut Table, overlay: &Table) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}
