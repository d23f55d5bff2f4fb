//! UI-facing snapshots: the export view and the self-describing schema
//! document.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::{BUILD_REF, LICENSE};
use crate::schema::{Element, ElementKind, Group};
use crate::store::ConfigStore;
use crate::sync::RwLockExt;
use crate::tree;

/// Read-only snapshot consumed by the frontend. Rebuilt fresh on every call
/// since it aggregates values that may have changed since the last one.
#[derive(Debug, Serialize)]
pub struct ExportView {
    pub editor: String,
    pub license: String,
    pub display_hidden: bool,
    pub name: String,
    pub upload_button: bool,
    pub connections: Vec<Map<String, Value>>,
    pub share_default_access: String,
    pub share_redirect: String,
    pub logout: String,
    pub upload_pool_size: i64,
    pub upload_chunk_size: i64,
    pub refresh_after_upload: bool,
    pub default_sort: String,
    pub default_view: String,
    pub auth: Vec<String>,
    pub thumbnailer: Vec<String>,
    pub origin: String,
    pub version: String,
    pub enable_chromecast: bool,
    pub enable_share: bool,
    pub enable_tags: bool,
}

fn schema_projection(element: &Element) -> Option<Value> {
    serde_json::to_value(element).ok()
}

impl ConfigStore {
    /// Assemble the export snapshot from specific leaf paths plus a few
    /// derivations (origin URL, enabled auth backends, hook-registered
    /// capabilities).
    pub fn export(&self) -> ExportView {
        ExportView {
            editor: self.get("general.editor").string(),
            license: LICENSE.to_string(),
            display_hidden: self.get("general.display_hidden").bool(),
            name: self.get("general.name").string(),
            upload_button: self.get("general.upload_button").bool(),
            connections: self.connections(),
            share_default_access: self.get("features.share.default_access").string(),
            share_redirect: self.get("features.share.redirect").string(),
            logout: self.get("general.logout").string(),
            upload_pool_size: self.get("general.upload_pool_size").int(),
            upload_chunk_size: self.get("general.upload_chunk_size").int(),
            refresh_after_upload: self.get("general.refresh_after_upload").bool(),
            default_sort: self.get("general.filepage_default_sort").string(),
            default_view: self.get("general.filepage_default_view").string(),
            auth: self.enabled_auth_backends(),
            thumbnailer: self.hooks().thumbnailers(),
            origin: self.origin(),
            version: BUILD_REF.to_string(),
            enable_chromecast: self.get("features.protection.enable_chromecast").bool(),
            enable_share: self.get("features.share.enable").bool(),
            enable_tags: self.hooks().has_metadata(),
        }
    }

    /// Marshal the full declared schema (types, descriptions, options,
    /// current and default values) plus a synthesized `constant` group, for a
    /// rendering layer to build form controls from.
    pub fn schema_document(&self) -> Value {
        let username = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "n/a".to_string());

        let constant = Group::new("constant")
            .element(
                Element::new("user", ElementKind::Text)
                    .readonly()
                    .value(username),
            )
            .element(
                Element::new("license", ElementKind::Text)
                    .readonly()
                    .value(LICENSE),
            );

        let mut document = {
            let tree = self.tree.read_recovered();
            tree::forest_to_json(&tree, &schema_projection)
        };
        if let Some(object) = document.as_object_mut() {
            object.insert(
                "constant".to_string(),
                tree::group_to_json(&constant, &schema_projection),
            );
        }
        document
    }

    /// Scheme plus host, derived from `general.host` and `general.force_ssl`;
    /// empty when no host is configured.
    fn origin(&self) -> String {
        let host = self.get("general.host").string();
        if host.is_empty() {
            return String::new();
        }
        if self.get("general.force_ssl").bool() {
            format!("https://{host}")
        } else {
            format!("http://{host}")
        }
    }

    /// Backends named by the comma-separated attribute-mapping leaf, present
    /// only when an identity provider is configured.
    fn enabled_auth_backends(&self) -> Vec<String> {
        if self
            .get("middleware.identity_provider.type")
            .string()
            .is_empty()
        {
            return Vec::new();
        }
        static SEPARATOR: OnceLock<Regex> = OnceLock::new();
        let separator = SEPARATOR.get_or_init(|| {
            Regex::new(r"\s*,\s*").expect("static pattern")
        });
        separator
            .split(
                &self
                    .get("middleware.attribute_mapping.related_backend")
                    .string(),
            )
            .map(ToString::to_string)
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
