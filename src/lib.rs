//! # cfgtree - Hierarchical Configuration Store
//!
//! A hierarchical, concurrency-safe, dynamically-extensible configuration
//! store: a tree of named settings groups and leaf settings, addressable by
//! dot-separated paths, backing both a persisted settings file and a live,
//! self-describing schema consumable by a rendering layer.
//!
//! ## Features
//!
//! - **Auto-vivification**: any caller can register a setting path on first
//!   use: `get("plugin.widget.size")` creates missing groups and a hidden
//!   leaf on the spot, so plugins contribute settings unknown at compile time
//! - **Typed-but-dynamic leaves**: values are loosely-typed scalars with
//!   zero-value fallback at the accessor boundary, never an error
//! - **Order-preserving persistence**: the settings file mirrors declaration
//!   order, not alphabetical order, for stable diffs and faithful UI layout
//! - **Concurrency-safe**: structural mutation is exclusive and atomic, the
//!   resolution cache is invalidated wholesale before anyone can observe a
//!   stale tree shape
//! - **Self-describing schema**: one call marshals the whole tree (types,
//!   descriptions, options, current/default values) for an admin UI
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cfgtree::{ConfigStore, FileStorage};
//!
//! # fn main() -> cfgtree::Result<()> {
//! let storage = Arc::new(FileStorage::new(FileStorage::default_path("my-app")));
//! let store = ConfigStore::new(storage);
//!
//! // Bootstrap: hydrate from disk, then apply env overrides
//! store.load()?;
//! store.initialise();
//!
//! // Typed reads fall back to declared defaults
//! let port = store.get("general.port").int();
//!
//! // Writes persist the whole store synchronously
//! store.get("general.editor").set("vim");
//!
//! // Plugins register settings lazily and attach metadata after the fact
//! store.get("plugin.widget.size")
//!     .schema(|el| {
//!         el.kind = cfgtree::ElementKind::Number;
//!         el.description = "Widget size in pixels".into();
//!     })
//!     .set_default(32);
//! # Ok(())
//! # }
//! ```

mod constants;
mod error;
mod export;
mod handle;
mod hooks;
mod schema;
mod storage;
mod store;
mod sync;
mod tree;
mod value;

pub use constants::{APP_NAME, BUILD_REF, LICENSE};
pub use error::{Error, Result};
pub use export::ExportView;
pub use handle::ElementHandle;
pub use hooks::HookRegistry;
pub use schema::{Element, ElementCell, ElementKind, Group, declared_schema};
pub use storage::{ConfigStorage, FileStorage, MemoryStorage};
pub use store::{ConfigStore, EnvSource, ProcessEnv};
pub use value::ConfigValue;
