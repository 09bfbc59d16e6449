//! Structural classification of compiled models.
//!
//! Every predicate here is a pure function of a model's resolved properties.

use crate::error::CompileError;
use crate::model::{Model, ModelGraph, ModelId};
use crate::registry::{DataType, DataTypeId, Intrinsic, TypeRegistry};
use crate::types::CompileOptions;

/// Role flags derived from a model's shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    /// Has string `kind` and `apiVersion` properties.
    pub is_kube_object: bool,
    /// Object whose `metadata` is the object metadata model.
    pub is_kube_resource: bool,
    /// Object whose `metadata` is the list metadata model.
    pub is_kube_resource_list: bool,
    /// Has an array-typed `items` property.
    pub has_list_items: bool,
    /// Model of the `items` elements.
    pub list_item_type: Option<ModelId>,
}

/// The metadata models that mark resources and resource lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct WellKnownModels {
    pub object_meta: Option<ModelId>,
    pub list_meta: Option<ModelId>,
}

impl WellKnownModels {
    /// Look up the configured metadata definitions in a graph.
    pub fn from_graph(graph: &ModelGraph, options: &CompileOptions) -> Self {
        Self {
            object_meta: graph.id_of(&options.object_meta),
            list_meta: graph.id_of(&options.list_meta),
        }
    }
}

pub fn is_kube_object(model: &Model, registry: &TypeRegistry) -> bool {
    has_string_property(model, registry, "kind") && has_string_property(model, registry, "apiVersion")
}

pub fn is_kube_resource(
    model: &Model,
    registry: &TypeRegistry,
    well_known: &WellKnownModels,
) -> bool {
    is_kube_object(model, registry)
        && well_known.object_meta.is_some()
        && metadata_model(model, registry) == well_known.object_meta
}

pub fn is_kube_resource_list(
    model: &Model,
    registry: &TypeRegistry,
    well_known: &WellKnownModels,
) -> bool {
    is_kube_object(model, registry)
        && well_known.list_meta.is_some()
        && metadata_model(model, registry) == well_known.list_meta
}

/// Element type of an array-typed `items` property.
pub fn list_items(model: &Model, registry: &TypeRegistry) -> Option<DataTypeId> {
    let items = model.property("items")?;
    match registry.get(items.data_type) {
        DataType::Array(element) => Some(*element),
        _ => None,
    }
}

/// Classify a compiled model.
///
/// # Errors
///
/// Returns `CompileError::ClassificationConflict` if the model is both a
/// resource and a resource list, or if a resource list's `items` elements are
/// not model references.
pub fn classify(
    model: &Model,
    registry: &TypeRegistry,
    well_known: &WellKnownModels,
) -> Result<Classification, CompileError> {
    let is_kube_object = is_kube_object(model, registry);
    let is_kube_resource = is_kube_resource(model, registry, well_known);
    let is_kube_resource_list = is_kube_resource_list(model, registry, well_known);

    if is_kube_resource && is_kube_resource_list {
        return Err(conflict(
            model,
            "metadata matches both object metadata and list metadata",
        ));
    }

    let element = list_items(model, registry);
    let list_item_type = match element {
        Some(element) => {
            let item_model = registry.get(element).model();
            if item_model.is_none() && is_kube_resource_list {
                return Err(conflict(
                    model,
                    "resource list 'items' elements are not a model reference",
                ));
            }
            item_model
        }
        None => None,
    };

    Ok(Classification {
        is_kube_object,
        is_kube_resource,
        is_kube_resource_list,
        has_list_items: element.is_some(),
        list_item_type,
    })
}

fn has_string_property(model: &Model, registry: &TypeRegistry, wire_name: &str) -> bool {
    model
        .property(wire_name)
        .map(|property| registry.get(property.data_type).intrinsic() == Some(Intrinsic::String))
        .unwrap_or(false)
}

fn metadata_model(model: &Model, registry: &TypeRegistry) -> Option<ModelId> {
    let metadata = model.property("metadata")?;
    registry.get(metadata.data_type).model()
}

fn conflict(model: &Model, message: &str) -> CompileError {
    CompileError::ClassificationConflict {
        definition: model.definition_name.clone(),
        message: message.to_string(),
    }
}
