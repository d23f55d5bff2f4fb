//! Hook registry: collaborators notified around the configuration lifecycle.
//!
//! Plugins use this to run post-load side effects, contribute thumbnailer
//! identifiers, advertise a metadata-extraction capability and derive
//! secondary secret material from the secret key.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::sync::RwLockExt;

type LoadedCallback = Box<dyn Fn() + Send + Sync>;
type SecretCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Registry of lifecycle collaborators shared by one [`crate::ConfigStore`].
#[derive(Default)]
pub struct HookRegistry {
    on_loaded: RwLock<Vec<LoadedCallback>>,
    on_secret_key: RwLock<Vec<SecretCallback>>,
    thumbnailers: RwLock<Vec<String>>,
    metadata_capability: AtomicBool,
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked after every successful load.
    pub fn on_config_loaded<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_loaded.write_recovered().push(Box::new(callback));
    }

    pub(crate) fn fire_config_loaded(&self) {
        for callback in self.on_loaded.read_recovered().iter() {
            callback();
        }
    }

    /// Register a collaborator deriving secondary secret material from the
    /// secret key. Invoked at the end of `initialise`.
    pub fn on_secret_key<F>(&self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_secret_key.write_recovered().push(Box::new(callback));
    }

    pub(crate) fn derive_secrets(&self, key: &str) {
        for callback in self.on_secret_key.read_recovered().iter() {
            callback(key);
        }
    }

    /// Advertise a thumbnailer implementation.
    pub fn register_thumbnailer(&self, id: impl Into<String>) {
        self.thumbnailers.write_recovered().push(id.into());
    }

    /// Identifiers of all registered thumbnailers.
    pub fn thumbnailers(&self) -> Vec<String> {
        self.thumbnailers.read_recovered().clone()
    }

    /// Advertise a metadata-extraction capability.
    pub fn set_metadata_capability(&self) {
        self.metadata_capability.store(true, Ordering::Relaxed);
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata_capability.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_config_loaded_callbacks() {
        let hooks = HookRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        hooks.on_config_loaded(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        hooks.fire_config_loaded();
        hooks.fire_config_loaded();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_secret_key_derivation_receives_key() {
        let hooks = HookRegistry::new();
        let seen = Arc::new(RwLock::new(String::new()));
        let seen_clone = seen.clone();

        hooks.on_secret_key(move |key| {
            *seen_clone.write().unwrap() = key.to_string();
        });

        hooks.derive_secrets("abcd1234");
        assert_eq!(&*seen.read().unwrap(), "abcd1234");
    }

    #[test]
    fn test_thumbnailers_and_metadata() {
        let hooks = HookRegistry::new();
        assert!(hooks.thumbnailers().is_empty());
        assert!(!hooks.has_metadata());

        hooks.register_thumbnailer("image");
        hooks.register_thumbnailer("pdf");
        hooks.set_metadata_capability();

        assert_eq!(hooks.thumbnailers(), ["image", "pdf"]);
        assert!(hooks.has_metadata());
    }
}
