//! Configuration source abstraction.
//!
//! The gateway reads its policy tables, tenant set and cluster registry from a
//! tree of nested sections addressed by dotted key paths
//! (`VolumeAccess.ActionRoles.List`). File formats and loading live in infra;
//! this module only knows how to walk the tree.

use serde_json::Value;

/// Read-only view over nested configuration sections.
pub trait ConfigSource: Send + Sync {
    /// Look up the node at a dotted key path.
    fn get(&self, path: &str) -> Option<&Value>;

    /// Names of the direct children of a section, sorted.
    fn child_keys(&self, path: &str) -> Vec<String> {
        match self.get(path) {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn string(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn boolean(&self, path: &str) -> Option<bool> {
        match self.get(path)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn integer(&self, path: &str) -> Option<i64> {
        match self.get(path)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A list of strings; a single scalar is treated as a one-element list.
    ///
    /// Absent paths yield an empty list.
    fn string_list(&self, path: &str) -> Vec<String> {
        match self.get(path) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(other) => scalar_to_string(other).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// A list of integers; entries that are not integers are skipped.
    fn integer_list(&self, path: &str) -> Vec<i64> {
        match self.get(path) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| match v {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Configuration tree held in memory.
#[derive(Debug, Clone, Default)]
pub struct ConfigTree {
    root: Value,
}

impl ConfigTree {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }
}

impl ConfigSource for ConfigTree {
    fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(&self.root);
        }
        path.split('.')
            .try_fold(&self.root, |node, segment| node.as_object()?.get(segment))
    }
}
