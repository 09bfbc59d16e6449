//! API binding - joins the path/operation table to group/version/kind keys.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::Value;

use crate::document::{OperationNode, PathItem};
use crate::error::UnboundOperation;
use crate::types::{json_type_name, ApiAction, Gvk, PARAMETERS_VERB};

/// Paths bound to each action of one group/version/kind.
pub type ActionPaths = BTreeMap<ApiAction, BTreeSet<String>>;

/// Binding table plus the operations that could not be bound.
#[derive(Debug, Clone, Default)]
pub struct ApiBindings {
    table: BTreeMap<Gvk, ActionPaths>,
    skipped: Vec<UnboundOperation>,
}

impl ApiBindings {
    pub fn get(&self, gvk: &Gvk) -> Option<&ActionPaths> {
        self.table.get(gvk)
    }

    /// Bound kinds in (group, version, kind) order.
    pub fn iter(&self) -> impl Iterator<Item = (&Gvk, &ActionPaths)> {
        self.table.iter()
    }

    /// Number of bound kinds.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Operations dropped because they lack a kind or action annotation.
    pub fn skipped(&self) -> &[UnboundOperation] {
        &self.skipped
    }

    fn insert(&mut self, gvk: Gvk, action: ApiAction, path: &str) {
        self.table
            .entry(gvk)
            .or_default()
            .entry(action)
            .or_default()
            .insert(path.to_string());
    }

    fn skip(&mut self, path: &str, verb: &str, reason: impl Into<String>) {
        let operation = UnboundOperation {
            path: path.to_string(),
            verb: verb.to_string(),
            reason: reason.into(),
        };
        tracing::debug!(%operation, "skipping operation");
        self.skipped.push(operation);
    }
}

/// Build the binding table from a document's `paths`.
///
/// Every operation needs both an `x-kubernetes-group-version-kind` and an
/// `x-kubernetes-action` annotation. Operations missing either are recorded
/// in [`ApiBindings::skipped`] and otherwise ignored.
pub fn bind_operations(paths: &BTreeMap<String, PathItem>) -> ApiBindings {
    let mut bindings = ApiBindings::default();

    for (path, verbs) in paths {
        for (verb, node) in verbs {
            if verb == PARAMETERS_VERB {
                continue;
            }
            if !node.is_object() {
                bindings.skip(
                    path,
                    verb,
                    format!("expected an operation object, found {}", json_type_name(node)),
                );
                continue;
            }

            let operation = match OperationNode::deserialize(node) {
                Ok(operation) => operation,
                Err(e) => {
                    bindings.skip(path, verb, format!("malformed operation: {}", e));
                    continue;
                }
            };
            let Some(gvk) = operation.group_version_kind else {
                bindings.skip(path, verb, "no group-version-kind annotation");
                continue;
            };
            let Some(action) = operation.action.as_deref() else {
                bindings.skip(path, verb, "no action annotation");
                continue;
            };

            bindings.insert(gvk, ApiAction::parse(action), path);
        }
    }

    bindings
}
