//! Shared test fixtures

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use cfgtree::{ConfigStore, EnvSource, MemoryStorage};

/// Environment source backed by a fixed map, so tests never touch the
/// process environment.
pub struct StaticEnv {
    vars: HashMap<String, String>,
}

impl StaticEnv {
    pub fn new(vars: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            vars: vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::new(&[])
    }
}

impl EnvSource for StaticEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned().filter(|v| !v.is_empty())
    }
}

/// A store over the full declared schema, backed by inspectable in-memory
/// storage and an empty environment.
pub struct TestFixture {
    pub store: ConfigStore,
    pub storage: Arc<MemoryStorage>,
}

impl TestFixture {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let storage = Arc::new(MemoryStorage::new());
        let store = ConfigStore::new(storage.clone()).with_env(StaticEnv::empty());
        Self { store, storage }
    }

    /// A store with no declared schema, everything auto-vivifies.
    pub fn empty_schema() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let storage = Arc::new(MemoryStorage::new());
        let store = ConfigStore::with_schema(Vec::new(), storage.clone()).with_env(StaticEnv::empty());
        Self { store, storage }
    }

    /// Parse the last persisted document.
    pub fn document(&self) -> serde_json::Value {
        serde_json::from_slice(&self.storage.contents().expect("nothing persisted yet"))
            .expect("persisted document is not valid JSON")
    }
}
