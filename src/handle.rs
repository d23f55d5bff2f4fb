//! Transient accessor over one resolved leaf element.

use log::debug;

use crate::schema::{Element, ElementCell};
use crate::store::ConfigStore;
use crate::sync::RwLockExt;
use crate::value::ConfigValue;

/// Short-lived handle pairing a resolved leaf with its store.
///
/// Created fresh by every [`ConfigStore::get`]; carries no state across
/// calls. Reads take the element's shared lock; writes take its exclusive
/// lock, and a changed write triggers a synchronous save of the whole store.
///
/// A handle over a degenerate path (fewer than two segments) is inert: reads
/// yield zero values and writes are no-ops.
pub struct ElementHandle<'a> {
    pub(crate) cell: Option<ElementCell>,
    pub(crate) store: &'a ConfigStore,
}

impl ElementHandle<'_> {
    /// The effective value: the live value if set, else the declared default.
    pub fn value(&self) -> Option<ConfigValue> {
        let cell = self.cell.as_ref()?;
        let element = cell.read_recovered();
        element.effective().cloned()
    }

    /// Effective value as a string; `""` when unset or not a string.
    pub fn string(&self) -> String {
        self.value().map(|v| v.as_string()).unwrap_or_default()
    }

    /// Effective value as an integer; `0` when unset or not numeric.
    pub fn int(&self) -> i64 {
        self.value().map(|v| v.as_int()).unwrap_or_default()
    }

    /// Effective value as a boolean; `false` when unset or not a boolean.
    pub fn bool(&self) -> bool {
        self.value().map(|v| v.as_bool()).unwrap_or_default()
    }

    /// Store a new value. No-op (and no persistence) when the value is
    /// unchanged; otherwise the cache is invalidated and the whole store is
    /// saved synchronously.
    pub fn set(&self, value: impl Into<ConfigValue>) -> &Self {
        let Some(cell) = &self.cell else { return self };
        let value = value.into();
        let changed = {
            let mut element = cell.write_recovered();
            if element.value.as_ref() == Some(&value) {
                false
            } else {
                element.value = Some(value);
                true
            }
        };
        if changed {
            self.store.clear_cache();
            self.store.save();
        }
        self
    }

    /// Declare the default value. First declaration wins: a later, different
    /// declaration is logged and ignored. Persists only when a default was
    /// actually set.
    pub fn set_default(&self, value: impl Into<ConfigValue>) -> &Self {
        let Some(cell) = &self.cell else { return self };
        let value = value.into();
        let declared = {
            let mut element = cell.write_recovered();
            if element.default.is_none() {
                element.default = Some(value);
                true
            } else {
                if element.default.as_ref() != Some(&value) {
                    debug!(
                        "attempt to declare a second default for '{}'",
                        element.name
                    );
                }
                false
            }
        };
        if declared {
            self.store.save();
        }
        self
    }

    /// Apply an arbitrary metadata edit to the underlying element, then
    /// invalidate the resolution cache. Used to attach full UI metadata to an
    /// auto-vivified hidden leaf after the fact.
    pub fn schema<F>(&self, edit: F) -> &Self
    where
        F: FnOnce(&mut Element),
    {
        if let Some(cell) = &self.cell {
            edit(&mut cell.write_recovered());
            self.store.clear_cache();
        }
        self
    }

    /// Set the value without persisting or invalidating anything. Load-path
    /// hydration only.
    pub(crate) fn hydrate(&self, value: ConfigValue) {
        if let Some(cell) = &self.cell {
            let mut element = cell.write_recovered();
            if element.value.as_ref() != Some(&value) {
                element.value = Some(value);
            }
        }
    }
}
