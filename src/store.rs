//! The configuration store: settings tree, resolution cache and connection
//! records, with the load/initialise/save lifecycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use log::{LevelFilter, error};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::handle::ElementHandle;
use crate::hooks::HookRegistry;
use crate::schema::{Element, ElementCell, Group, declared_schema};
use crate::storage::ConfigStorage;
use crate::sync::{MutexExt, RwLockExt};
use crate::tree;
use crate::value::ConfigValue;

/// Source of environment variables, injectable for tests.
pub trait EnvSource: Send + Sync {
    /// The variable's value, `None` when unset or empty.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads from the process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

/// Hierarchical, concurrency-safe, dynamically-extensible configuration
/// store.
///
/// Owns the root group sequence, a full-path resolution cache and a
/// schema-less list of backend connection records. Constructed once at
/// process start; `load` then `initialise` must complete before request
/// serving begins (a bootstrap responsibility, not enforced here).
///
/// Any caller may `get` any dot-path at any time; unknown paths are
/// materialized as hidden leaves, so plugins can register settings the core
/// never heard of. When two callers race to vivify the same path, the first
/// writer's declaration wins and later callers silently reuse it.
pub struct ConfigStore {
    pub(crate) tree: RwLock<Vec<Group>>,
    pub(crate) connections: RwLock<Vec<Map<String, Value>>>,
    cache: RwLock<HashMap<String, ElementCell>>,
    /// Serializes marshal+write pairs so a slower save can never overwrite
    /// a newer document with a stale snapshot.
    save_lock: Mutex<()>,
    storage: Arc<dyn ConfigStorage>,
    hooks: Arc<HookRegistry>,
    env: Arc<dyn EnvSource>,
}

impl ConfigStore {
    /// Store over the full declared schema.
    pub fn new(storage: Arc<dyn ConfigStorage>) -> Self {
        Self::with_schema(declared_schema(), storage)
    }

    /// Store over a caller-provided schema.
    pub fn with_schema(roots: Vec<Group>, storage: Arc<dyn ConfigStorage>) -> Self {
        Self {
            tree: RwLock::new(roots),
            connections: RwLock::new(Vec::new()),
            cache: RwLock::new(HashMap::new()),
            save_lock: Mutex::new(()),
            storage,
            hooks: Arc::new(HookRegistry::new()),
            env: Arc::new(ProcessEnv),
        }
    }

    /// Replace the environment source (tests inject a fixed map here).
    #[must_use]
    pub fn with_env(mut self, env: Arc<dyn EnvSource>) -> Self {
        self.env = env;
        self
    }

    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    /// Snapshot of the configured backend connection records.
    pub fn connections(&self) -> Vec<Map<String, Value>> {
        self.connections.read_recovered().clone()
    }

    /// Resolve a dot-separated path to a leaf handle, creating any missing
    /// groups and a hidden leaf on first use.
    pub fn get(&self, path: &str) -> ElementHandle<'_> {
        if let Some(cell) = self.cache.read_recovered().get(path) {
            return ElementHandle {
                cell: Some(cell.clone()),
                store: self,
            };
        }

        let segments: Vec<&str> = path.split('.').collect();
        let mut tree = self.tree.write_recovered();
        let resolution = tree::resolve(&mut tree, &segments);
        {
            let mut cache = self.cache.write_recovered();
            if resolution.created {
                // Structural change: every cached resolution is dropped
                // before the tree lock is released.
                cache.clear();
            }
            if let Some(cell) = &resolution.cell {
                cache.insert(path.to_string(), cell.clone());
            }
        }
        drop(tree);

        ElementHandle {
            cell: resolution.cell,
            store: self,
        }
    }

    pub(crate) fn clear_cache(&self) {
        self.cache.write_recovered().clear();
    }

    /// Hydrate leaf values and connection records from the persisted
    /// document, then notify collaborators.
    ///
    /// An absent document is an empty store; malformed bytes are fatal and
    /// surface to the caller (startup aborts there).
    pub fn load(&self) -> Result<()> {
        let document: Value = match self.storage.load()? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                error!("config::load {e}");
                crate::error::Error::Parse(e)
            })?,
            None => Value::Object(Map::new()),
        };

        // Extract configured backends, verbatim
        let connections = document
            .get("connections")
            .and_then(Value::as_array)
            .map(|records| {
                records
                    .iter()
                    .filter_map(|record| record.as_object().cloned())
                    .collect()
            })
            .unwrap_or_default();
        *self.connections.write_recovered() = connections;

        // Hydrate leaf values from the flattened document
        if let Some(map) = document.as_object() {
            let mut flat = Vec::new();
            tree::flatten_json("", map, &mut flat);
            for (path, value) in flat {
                self.get(&path).hydrate(value);
            }
        }

        self.clear_cache();
        self.apply_log_level();
        self.hooks.fire_config_loaded();
        Ok(())
    }

    /// Apply environment overrides and guarantee a secret key exists, saving
    /// once if anything changed, then hand the secret key to the derivation
    /// collaborators.
    pub fn initialise(&self) {
        let mut should_save = false;
        if let Some(password) = self.env.var("ADMIN_PASSWORD") {
            self.get("auth.admin").hydrate(password.into());
            should_save = true;
        }
        if let Some(host) = self.env.var("APPLICATION_URL") {
            self.get("general.host").hydrate(host.into());
            should_save = true;
        }
        if self.get("general.secret_key").string().is_empty() {
            self.get("general.secret_key")
                .hydrate(random_key(16).into());
            should_save = true;
        }
        if should_save {
            self.save();
        }
        self.hooks
            .derive_secrets(&self.get("general.secret_key").string());
    }

    /// Serialize the whole store (set values plus the `connections` array)
    /// and hand it to the storage collaborator.
    ///
    /// Persistence is fire-and-forget: a failed write is logged, the
    /// in-memory state stays authoritative.
    pub fn save(&self) {
        let _write_turn = self.save_lock.lock_recovered();
        let mut document = {
            let tree = self.tree.read_recovered();
            tree::forest_to_json(&tree, &|el: &Element| {
                el.value.as_ref().map(ConfigValue::to_json)
            })
        };

        let connections: Vec<Value> = self
            .connections
            .read_recovered()
            .iter()
            .cloned()
            .map(Value::Object)
            .collect();
        if let Some(object) = document.as_object_mut() {
            object.insert("connections".to_string(), Value::Array(connections));
        }

        let bytes = match serde_json::to_vec_pretty(&document) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("config::save marshal {e}");
                return;
            }
        };
        if let Err(e) = self.storage.save(&bytes) {
            error!("config::save {e}");
        }
    }

    /// Propagate the effective `log.level` leaf to the logging facade.
    fn apply_log_level(&self) {
        let level = match self.get("log.level").string().as_str() {
            "DEBUG" => LevelFilter::Debug,
            "WARNING" => LevelFilter::Warn,
            "ERROR" => LevelFilter::Error,
            _ => LevelFilter::Info,
        };
        log::set_max_level(level);
    }
}

/// Random alphanumeric secret key.
fn random_key(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn empty_store() -> (ConfigStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (
            ConfigStore::with_schema(Vec::new(), storage.clone()),
            storage,
        )
    }

    #[test]
    fn test_get_is_idempotent_in_identity() {
        let (store, _) = empty_store();

        let first = store.get("x.y.z").cell.clone().unwrap();
        let second = store.get("x.y.z").cell.clone().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cached_path_survives_unrelated_growth() {
        let (store, _) = empty_store();

        let original = store.get("a.b.c").cell.clone().unwrap();
        // Structural growth elsewhere clears the cache
        store.get("d.e.f");
        let resolved = store.get("a.b.c").cell.clone().unwrap();

        assert!(Arc::ptr_eq(&original, &resolved));
    }

    #[test]
    fn test_degenerate_path_yields_inert_handle() {
        let (store, storage) = empty_store();

        let handle = store.get("general");
        assert_eq!(handle.string(), "");
        assert_eq!(handle.int(), 0);
        assert!(!handle.bool());
        handle.set("ignored");
        assert!(storage.contents().is_none());
    }

    #[test]
    fn test_set_persists_and_unchanged_set_skips_write() {
        let (store, storage) = empty_store();

        store.get("general.editor").set("vim");
        let after_first = storage.contents().unwrap();

        // Idempotent re-set must not rewrite
        storage.save(b"sentinel").unwrap();
        store.get("general.editor").set("vim");
        assert_eq!(storage.contents().unwrap(), b"sentinel");

        let document: Value = serde_json::from_slice(&after_first).unwrap();
        assert_eq!(document["general"]["editor"], "vim");
    }

    #[test]
    fn test_default_once_policy() {
        let (store, _) = empty_store();

        store.get("x.y").set_default("a").set_default("b");
        assert_eq!(store.get("x.y").string(), "a");
    }

    #[test]
    fn test_port_scenario() {
        let storage = Arc::new(MemoryStorage::new());
        let store = ConfigStore::new(storage.clone());

        assert_eq!(store.get("general.port").int(), 8334);

        store.get("general.port").set(9000);
        assert_eq!(store.get("general.port").int(), 9000);

        let document: Value = serde_json::from_slice(&storage.contents().unwrap()).unwrap();
        assert_eq!(document["general"]["port"], 9000);
    }

    #[test]
    fn test_load_rejects_malformed_bytes() {
        let storage = Arc::new(MemoryStorage::with_contents(&b"not json"[..]));
        let store = ConfigStore::with_schema(Vec::new(), storage);
        assert!(store.load().is_err());
    }

    #[test]
    fn test_load_absent_document_is_empty_store() {
        let (store, _) = empty_store();
        store.load().unwrap();
        assert!(store.connections().is_empty());
    }

    #[test]
    fn test_schema_edit_after_vivification() {
        let (store, _) = empty_store();
        use crate::schema::ElementKind;

        store.get("plugin.widget.size").schema(|el| {
            el.kind = ElementKind::Number;
            el.description = "Widget size".to_string();
        });

        let cell = store.get("plugin.widget.size").cell.clone().unwrap();
        let element = cell.read_recovered();
        assert_eq!(element.kind, ElementKind::Number);
        assert_eq!(element.description, "Widget size");
    }
}
