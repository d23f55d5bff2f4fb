//! Tree traversal: auto-vivifying path resolution, ordered serialization and
//! flattening of persisted documents.
//!
//! Resolution is total: a missing path is materialized on the spot (missing
//! groups, then a hidden leaf) so any caller can register a setting on first
//! use. The caller holds the exclusive tree lock for the whole walk, so no
//! one observes a half-built subtree.

use serde_json::{Map, Value};

use crate::schema::{Element, ElementCell, ElementKind, Group};
use crate::sync::RwLockExt;
use crate::value::ConfigValue;

/// Outcome of a path resolution.
pub(crate) struct Resolution {
    /// The addressed leaf. `None` for degenerate paths (fewer than two
    /// segments, a group with no leaf name).
    pub cell: Option<ElementCell>,
    /// Whether the walk had to create a group or leaf.
    pub created: bool,
}

/// Locate the leaf addressed by `path` inside `groups`, creating any missing
/// groups and a hidden zero-metadata leaf as needed.
pub(crate) fn resolve(groups: &mut Vec<Group>, path: &[&str]) -> Resolution {
    if path.is_empty() {
        return Resolution {
            cell: None,
            created: false,
        };
    }

    for i in 0..groups.len() {
        if groups[i].title != path[0] {
            continue;
        }
        if path.len() == 2 {
            // On a leaf: find it, or append a hidden one.
            for cell in &groups[i].elements {
                if cell.read_recovered().name == path[1] {
                    return Resolution {
                        cell: Some(cell.clone()),
                        created: false,
                    };
                }
            }
            let group = &mut groups[i];
            let mut element = Element::new(path[1], ElementKind::Hidden);
            element.order = group.elements.len();
            let cell: ElementCell = std::sync::Arc::new(std::sync::RwLock::new(element));
            group.elements.push(cell.clone());
            return Resolution {
                cell: Some(cell),
                created: true,
            };
        }
        if path.len() == 1 {
            // The path names a group, not a leaf.
            return Resolution {
                cell: None,
                created: false,
            };
        }
        return resolve(&mut groups[i].children, &path[1..]);
    }

    // No group matches the current segment: vivify it, then retry this level.
    groups.push(Group::new(path[0]));
    let mut resolution = resolve(groups, path);
    resolution.created = true;
    resolution
}

/// Serialize a group into a JSON object whose key order equals declaration
/// order. `project` decides what to emit per leaf; leaves projected to `None`
/// and empty subgroups are omitted.
pub(crate) fn group_to_json<F>(group: &Group, project: &F) -> Value
where
    F: Fn(&Element) -> Option<Value>,
{
    let mut out = Map::new();
    for cell in &group.elements {
        let element = cell.read_recovered();
        if let Some(value) = project(&element) {
            out.insert(element.name.replace(' ', "_"), value);
        }
    }
    for child in &group.children {
        let sub = group_to_json(child, project);
        if sub.as_object().is_some_and(|m| !m.is_empty()) {
            out.insert(child.title.replace(' ', "_"), sub);
        }
    }
    Value::Object(out)
}

/// Serialize a sequence of root groups into one JSON object, in order.
pub(crate) fn forest_to_json<F>(groups: &[Group], project: &F) -> Value
where
    F: Fn(&Element) -> Option<Value>,
{
    let mut out = Map::new();
    for group in groups {
        let sub = group_to_json(group, project);
        if sub.as_object().is_some_and(|m| !m.is_empty()) {
            out.insert(group.title.replace(' ', "_"), sub);
        }
    }
    Value::Object(out)
}

/// Flatten a nested JSON object into dot-path/scalar pairs.
///
/// Arrays and nulls are dropped: arrays are not representable as leaf values
/// and a null already means "unset".
pub(crate) fn flatten_json(
    prefix: &str,
    map: &Map<String, Value>,
    out: &mut Vec<(String, ConfigValue)>,
) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(nested) => flatten_json(&path, nested, out),
            Value::Array(_) | Value::Null => {}
            scalar => {
                if let Some(v) = ConfigValue::from_json(scalar) {
                    out.push((path, v));
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn value_projection(el: &Element) -> Option<Value> {
        el.value.as_ref().map(ConfigValue::to_json)
    }

    #[test]
    fn test_resolve_existing_leaf() {
        let mut groups = vec![
            Group::new("general")
                .element(Element::new("port", ElementKind::Number).default_value(8334)),
        ];

        let res = resolve(&mut groups, &["general", "port"]);
        assert!(!res.created);
        assert_eq!(res.cell.unwrap().read_recovered().name, "port");
        assert_eq!(groups[0].elements.len(), 1);
    }

    #[test]
    fn test_resolve_vivifies_missing_path() {
        let mut groups: Vec<Group> = Vec::new();

        let res = resolve(&mut groups, &["x", "y", "z"]);
        assert!(res.created);

        let cell = res.cell.unwrap();
        let leaf = cell.read_recovered();
        assert_eq!(leaf.name, "z");
        assert_eq!(leaf.kind, ElementKind::Hidden);
        assert!(leaf.default.is_none());

        // Exactly two nested groups and one leaf were created
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].title, "x");
        assert_eq!(groups[0].children.len(), 1);
        assert_eq!(groups[0].children[0].title, "y");
        assert_eq!(groups[0].children[0].elements.len(), 1);
    }

    #[test]
    fn test_resolve_is_idempotent_in_shape() {
        let mut groups: Vec<Group> = Vec::new();

        let first = resolve(&mut groups, &["a", "b", "c"]).cell.unwrap();
        let second = resolve(&mut groups, &["a", "b", "c"]).cell.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].children[0].elements.len(), 1);
    }

    #[test]
    fn test_resolve_degenerate_path() {
        let mut groups = vec![Group::new("general")];
        assert!(resolve(&mut groups, &["general"]).cell.is_none());
        assert!(resolve(&mut groups, &[]).cell.is_none());
    }

    #[test]
    fn test_serialization_preserves_declaration_order() {
        let group = Group::new("general")
            .element(Element::new("a", ElementKind::Text).value("1"))
            .element(Element::new("b", ElementKind::Text).value("2"))
            .element(Element::new("c", ElementKind::Text).value("3"));

        let json = group_to_json(&group, &value_projection);
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn test_serialization_omits_empty_subgroups() {
        let group = Group::new("root")
            .element(Element::new("kept", ElementKind::Text).value("v"))
            .child(Group::new("empty").element(Element::new("unset", ElementKind::Text)));

        let json = group_to_json(&group, &value_projection);
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("kept"));
        assert!(!obj.contains_key("empty"));
    }

    #[test]
    fn test_spaces_become_underscores() {
        let group =
            Group::new("root").element(Element::new("my setting", ElementKind::Text).value("v"));

        let json = group_to_json(&group, &value_projection);
        assert!(json.as_object().unwrap().contains_key("my_setting"));
    }

    #[test]
    fn test_flatten_drops_arrays_and_nulls() {
        let doc = json!({
            "general": {"port": 9000, "host": null},
            "connections": [{"type": "local"}],
            "log": {"level": "DEBUG"}
        });

        let mut flat = Vec::new();
        flatten_json("", doc.as_object().unwrap(), &mut flat);
        flat.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(
            flat,
            vec![
                ("general.port".to_string(), ConfigValue::Int(9000)),
                ("log.level".to_string(), ConfigValue::Str("DEBUG".into())),
            ]
        );
    }
}
