//! Schema Registry
//!
//! Maps tag signatures, type signatures and logical type names to schema
//! definitions or `$ref` aliases. Resolved definitions are memoized per
//! requested key behind a lock, so one registry can serve decodes on many
//! threads.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::{debug, trace};

use super::SchemaDefinition;
use super::loader::parse_table;
use crate::error::{Error, Result};

/// Default ICC schema table shipped with the crate
const BUILTIN_TABLE: &str = include_str!("../../schemas/icc.json");

/// A registry value: a definition or a link to another key
#[derive(Debug, Clone)]
pub enum SchemaEntry {
    Definition(Arc<SchemaDefinition>),
    Alias(String),
}

/// Key -> schema lookup with alias resolution
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: HashMap<String, SchemaEntry>,
    /// Final definition per requested key
    resolved: RwLock<HashMap<String, Arc<SchemaDefinition>>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with the bundled ICC table
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_TABLE)
    }

    /// Load a JSON schema table
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut registry = Self::new();
        for (key, entry) in parse_table(json)? {
            registry.insert(key, entry);
        }
        debug!(entries = registry.len(), "loaded schema table");
        Ok(registry)
    }

    /// Load a JSON schema table from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Register (or replace) a definition under `key`
    pub fn insert_definition(&mut self, key: impl Into<String>, definition: SchemaDefinition) {
        self.insert(key.into(), SchemaEntry::Definition(Arc::new(definition)));
    }

    /// Register (or replace) an alias from `key` to `target`
    pub fn insert_alias(&mut self, key: impl Into<String>, target: impl Into<String>) {
        self.insert(key.into(), SchemaEntry::Alias(target.into()));
    }

    fn insert(&mut self, key: String, entry: SchemaEntry) {
        self.entries.insert(key, entry);
        // Any cached chain may pass through the replaced key
        self.resolved
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Check if `key` has an entry (definition or alias)
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Raw entry for `key`, without resolving aliases
    pub fn entry(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.get(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered keys, sorted for determinism
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Resolve `key` to a concrete definition
    ///
    /// Returns `Ok(None)` when the key, or the end of its alias chain, is not
    /// registered. An alias chain that revisits a key fails with
    /// [`Error::SchemaCycle`].
    pub fn resolve(&self, key: &str) -> Result<Option<Arc<SchemaDefinition>>> {
        if let Some(hit) = self.cached(key) {
            trace!(key, "schema cache hit");
            return Ok(Some(hit));
        }

        let mut chain: Vec<&str> = vec![key];
        let mut current = key;
        let definition = loop {
            match self.entries.get(current) {
                None => {
                    debug!(key, missing = current, "no schema for key");
                    return Ok(None);
                }
                Some(SchemaEntry::Definition(def)) => break Arc::clone(def),
                Some(SchemaEntry::Alias(target)) => {
                    if chain.contains(&target.as_str()) {
                        let mut chain: Vec<String> = chain.iter().map(|k| k.to_string()).collect();
                        chain.push(target.clone());
                        return Err(Error::SchemaCycle {
                            key: key.to_string(),
                            chain,
                        });
                    }
                    trace!(from = current, to = %target, "following schema alias");
                    chain.push(target.as_str());
                    current = target.as_str();
                }
            }
        };

        self.resolved
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), Arc::clone(&definition));
        Ok(Some(definition))
    }

    fn cached(&self, key: &str) -> Option<Arc<SchemaDefinition>> {
        self.resolved
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    /// Number of memoized resolutions
    pub fn cached_len(&self) -> usize {
        self.resolved
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType};

    fn definition(name: &str) -> SchemaDefinition {
        SchemaDefinition::new(name, vec![FieldSpec::new("value", FieldType::U32)]).unwrap()
    }

    #[test]
    fn test_resolve_direct() {
        let mut registry = SchemaRegistry::new();
        registry.insert_definition("XYZ ", definition("XYZType"));

        let def = registry.resolve("XYZ ").unwrap().unwrap();
        assert_eq!(def.name(), "XYZType");
    }

    #[test]
    fn test_resolve_alias_chain_and_cache() {
        let mut registry = SchemaRegistry::new();
        registry.insert_definition("matrix3x3Type", definition("matrix3x3Type"));
        registry.insert_alias("sf32", "matrix");
        registry.insert_alias("matrix", "matrix3x3Type");

        assert_eq!(registry.cached_len(), 0);
        let first = registry.resolve("sf32").unwrap().unwrap();
        assert_eq!(first.name(), "matrix3x3Type");
        assert_eq!(registry.cached_len(), 1);

        let second = registry.resolve("sf32").unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.cached_len(), 1);
    }

    #[test]
    fn test_missing_and_dangling() {
        let mut registry = SchemaRegistry::new();
        registry.insert_alias("mft1", "lut8Type");

        assert!(registry.resolve("nope").unwrap().is_none());
        assert!(registry.resolve("mft1").unwrap().is_none());
        assert_eq!(registry.cached_len(), 0);
    }

    #[test]
    fn test_two_entry_cycle() {
        let mut registry = SchemaRegistry::new();
        registry.insert_alias("A", "B");
        registry.insert_alias("B", "A");

        match registry.resolve("A") {
            Err(Error::SchemaCycle { key, chain }) => {
                assert_eq!(key, "A");
                assert_eq!(chain, vec!["A", "B", "A"]);
            }
            other => panic!("Expected SchemaCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_alias_cycle() {
        let mut registry = SchemaRegistry::new();
        registry.insert_alias("loop", "loop");
        assert!(matches!(
            registry.resolve("loop"),
            Err(Error::SchemaCycle { .. })
        ));
    }

    #[test]
    fn test_insert_invalidates_cache() {
        let mut registry = SchemaRegistry::new();
        registry.insert_definition("a", definition("first"));
        registry.insert_alias("b", "a");
        assert_eq!(registry.resolve("b").unwrap().unwrap().name(), "first");

        registry.insert_definition("a", definition("second"));
        assert_eq!(registry.cached_len(), 0);
        assert_eq!(registry.resolve("b").unwrap().unwrap().name(), "second");
    }

    #[test]
    fn test_builtin_table_loads() {
        let registry = SchemaRegistry::builtin().unwrap();
        for key in [
            "ICCHeader",
            "XYZ ",
            "text",
            "descType",
            "mluc",
            "curv",
            "para",
            "sf32",
            "lut8Type",
            "lut16Type",
            "vcgt",
        ] {
            assert!(
                registry.resolve(key).unwrap().is_some(),
                "builtin table lacks {:?}",
                key
            );
        }
        assert_eq!(
            registry.resolve("sf32").unwrap().unwrap().name(),
            "matrix3x3Type"
        );
        assert_eq!(
            registry.resolve("ICCHeader").unwrap().unwrap().fixed_size(),
            Some(128)
        );
        // `desc` is also a tag signature; keying the type layout there would
        // shadow v4 `mluc` descriptions
        assert!(!registry.contains("desc"));
    }
}
