//! In-memory form of a parsed schema document.
//!
//! Only the parts the compiler reads are modeled; everything else in the
//! document is ignored during deserialization.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::Value;

use crate::error::LoadError;
use crate::types::{Gvk, DEFINITIONS_PREFIX};

/// Verb table of one path: verb → raw operation node.
pub type PathItem = BTreeMap<String, Value>;

/// Schema document: definitions plus the path/operation table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub definitions: BTreeMap<String, DefinitionNode>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
}

impl SchemaDocument {
    /// Build a document from generic JSON.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidDocument` if `definitions` or `paths`
    /// don't have the expected shape.
    pub fn from_value(value: Value) -> Result<Self, LoadError> {
        serde_json::from_value(value).map_err(|source| LoadError::InvalidDocument { source })
    }
}

/// One named entry of `definitions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DefinitionNode {
    pub description: Option<String>,
    pub properties: BTreeMap<String, PropertyNode>,
    pub required: BTreeSet<String>,
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "x-kubernetes-group-version-kind")]
    pub group_version_kind: Vec<Gvk>,
}

impl DefinitionNode {
    /// A pure alias carries a `$ref` and declares no properties of its own.
    pub fn alias_target(&self) -> Option<&str> {
        match &self.reference {
            Some(reference) if self.properties.is_empty() => Some(reference_name(reference)),
            _ => None,
        }
    }
}

/// Schema of one property, array item, or map value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertyNode {
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub format: Option<String>,
    pub items: Option<Box<PropertyNode>>,
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "x-kubernetes-patch-strategy", alias = "x-merge-strategy")]
    pub patch_strategy: Option<String>,
    #[serde(rename = "x-kubernetes-patch-merge-key", alias = "x-merge-key")]
    pub patch_merge_key: Option<String>,
    #[serde(rename = "x-kubernetes-int-or-string")]
    pub int_or_string: bool,
}

/// `additionalProperties`: either a value schema or a plain flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<PropertyNode>),
}

/// The annotations the binder needs from one operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperationNode {
    pub operation_id: Option<String>,
    #[serde(rename = "x-kubernetes-action")]
    pub action: Option<String>,
    #[serde(rename = "x-kubernetes-group-version-kind")]
    pub group_version_kind: Option<Gvk>,
}

/// Definition name targeted by a `$ref` value.
pub fn reference_name(reference: &str) -> &str {
    reference
        .strip_prefix(DEFINITIONS_PREFIX)
        .unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_definitions_and_paths() {
        let doc = SchemaDocument::from_value(json!({
            "swagger": "2.0",
            "definitions": {
                "io.k8s.api.core.v1.Pod": {
                    "description": "Pod is a collection of containers.",
                    "required": ["spec"],
                    "properties": {
                        "spec": { "$ref": "#/definitions/io.k8s.api.core.v1.PodSpec" }
                    },
                    "x-kubernetes-group-version-kind": [
                        { "group": "", "kind": "Pod", "version": "v1" }
                    ]
                }
            },
            "paths": {
                "/api/v1/pods": {
                    "get": { "x-kubernetes-action": "list" },
                    "parameters": [{ "name": "pretty" }]
                }
            }
        }))
        .unwrap();

        let pod = &doc.definitions["io.k8s.api.core.v1.Pod"];
        assert!(pod.required.contains("spec"));
        assert_eq!(pod.group_version_kind[0], Gvk::new("", "v1", "Pod"));
        assert!(pod.alias_target().is_none());
        assert_eq!(doc.paths["/api/v1/pods"].len(), 2);
    }

    #[test]
    fn alias_target_requires_no_properties() {
        let doc = SchemaDocument::from_value(json!({
            "definitions": {
                "old.v1.Thing": { "$ref": "#/definitions/new.v1.Thing" }
            }
        }))
        .unwrap();
        assert_eq!(
            doc.definitions["old.v1.Thing"].alias_target(),
            Some("new.v1.Thing")
        );
    }

    #[test]
    fn merge_extension_aliases() {
        let node: PropertyNode = serde_json::from_value(json!({
            "type": "array",
            "x-merge-strategy": "merge,retainKeys",
            "x-merge-key": "name"
        }))
        .unwrap();
        assert_eq!(node.patch_strategy.as_deref(), Some("merge,retainKeys"));
        assert_eq!(node.patch_merge_key.as_deref(), Some("name"));
    }

    #[test]
    fn additional_properties_forms() {
        let node: PropertyNode =
            serde_json::from_value(json!({ "type": "object", "additionalProperties": true }))
                .unwrap();
        assert!(matches!(
            node.additional_properties,
            Some(AdditionalProperties::Allowed(true))
        ));

        let node: PropertyNode = serde_json::from_value(json!({
            "type": "object",
            "additionalProperties": { "type": "string" }
        }))
        .unwrap();
        assert!(matches!(
            node.additional_properties,
            Some(AdditionalProperties::Schema(_))
        ));
    }

    #[test]
    fn malformed_document_is_rejected() {
        let result = SchemaDocument::from_value(json!({ "definitions": [] }));
        assert!(matches!(result, Err(LoadError::InvalidDocument { .. })));
    }

    #[test]
    fn reference_name_strips_prefix() {
        assert_eq!(reference_name("#/definitions/a.v1.B"), "a.v1.B");
        assert_eq!(reference_name("a.v1.B"), "a.v1.B");
    }
}
