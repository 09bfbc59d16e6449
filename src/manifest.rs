//! Serializable projections of a compiled schema.
//!
//! The manifest is what generators consume: one entry per model, in
//! generated-name order, with types rendered as strings and the model's bound
//! operations attached.

use serde::Serialize;

use crate::binder::{ActionPaths, ApiBindings};
use crate::compiler::CompiledSchema;
use crate::model::{Model, ModelId};
use crate::types::MergeStrategy;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEntry {
    pub definition: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub kind: String,
    pub group: String,
    pub api_version: String,
    pub generated_name: String,
    pub file_name: String,
    pub summary: String,
    pub is_kube_object: bool,
    pub is_kube_resource: bool,
    pub is_kube_resource_list: bool,
    pub has_list_items: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_item_type: Option<String>,
    pub properties: Vec<PropertyEntry>,
    #[serde(skip_serializing_if = "ActionPaths::is_empty")]
    pub operations: ActionPaths,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyEntry {
    pub name: String,
    pub wire_name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub optional: bool,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_strategy: Option<MergeStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_key: Option<String>,
}

/// One row of the binding table.
#[derive(Debug, Clone, Serialize)]
pub struct BindingEntry {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub actions: ActionPaths,
}

/// Project a compiled schema to its manifest.
///
/// `extension` is the artifact file extension used for `fileName`.
pub fn build_manifest(compiled: &CompiledSchema, extension: &str) -> Manifest {
    let models = compiled
        .models()
        .into_iter()
        .map(|(id, model)| model_entry(compiled, id, model, extension))
        .collect();
    Manifest { models }
}

/// Project the binding table, in (group, version, kind) order.
pub fn build_binding_table(bindings: &ApiBindings) -> Vec<BindingEntry> {
    bindings
        .iter()
        .map(|(gvk, actions)| BindingEntry {
            group: gvk.group.clone(),
            version: gvk.version.clone(),
            kind: gvk.kind.clone(),
            actions: actions.clone(),
        })
        .collect()
}

fn model_entry(compiled: &CompiledSchema, id: ModelId, model: &Model, extension: &str) -> ModelEntry {
    let graph = compiled.graph();
    let classification = model.classification;

    let properties = model
        .properties
        .values()
        .map(|property| PropertyEntry {
            name: property.name.clone(),
            wire_name: property.wire_name.clone(),
            type_name: compiled.describe_type(property.data_type),
            optional: property.is_optional,
            summary: property.summary.clone(),
            merge_strategy: match property.merge_strategy {
                MergeStrategy::None => None,
                strategy => Some(strategy),
            },
            merge_key: property.merge_key.clone(),
        })
        .collect();

    ModelEntry {
        definition: model.definition_name.clone(),
        aliases: graph.aliases_of(id).into_iter().map(str::to_string).collect(),
        kind: model.name.clone(),
        group: model.group.clone(),
        api_version: model.gvk().api_version(),
        generated_name: model.generated_name.clone(),
        file_name: model.file_name(extension),
        summary: model.summary.clone(),
        is_kube_object: classification.is_kube_object,
        is_kube_resource: classification.is_kube_resource,
        is_kube_resource_list: classification.is_kube_resource_list,
        has_list_items: classification.has_list_items,
        list_item_type: classification
            .list_item_type
            .map(|item| graph.get(item).generated_name.clone()),
        properties,
        operations: compiled.operations_for(model).cloned().unwrap_or_default(),
    }
}
