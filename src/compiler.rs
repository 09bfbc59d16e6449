//! Model compilation - second pass plus the end-to-end pipeline.
//!
//! Properties are compiled only after every model shell exists, so references
//! to models defined later in the document (or to the model itself) resolve
//! without depending on definition order.

use std::collections::HashMap;

use crate::binder::{bind_operations, ActionPaths, ApiBindings};
use crate::classify::{classify, WellKnownModels};
use crate::document::{DefinitionNode, SchemaDocument};
use crate::error::CompileError;
use crate::model::{Model, ModelGraph, ModelId, Property};
use crate::naming::{property_sort_key, sanitize_property_name};
use crate::registry::{DataTypeId, ResolveContext, TypeRegistry};
use crate::resolver::{resolve_all, NO_SUMMARY};
use crate::types::{CompileOptions, MergeStrategy};

/// Result of one compilation run.
#[derive(Debug)]
pub struct CompiledSchema {
    graph: ModelGraph,
    registry: TypeRegistry,
    bindings: ApiBindings,
}

impl CompiledSchema {
    pub fn graph(&self) -> &ModelGraph {
        &self.graph
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn bindings(&self) -> &ApiBindings {
        &self.bindings
    }

    /// Model bound to a definition or alias name.
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.graph.by_name(name)
    }

    /// Models in generated-name order.
    pub fn models(&self) -> Vec<(ModelId, &Model)> {
        let mut models: Vec<_> = self.graph.iter().collect();
        models.sort_by(|(_, a), (_, b)| a.generated_name.cmp(&b.generated_name));
        models
    }

    /// Operations bound to a model's group/version/kind.
    pub fn operations_for(&self, model: &Model) -> Option<&ActionPaths> {
        self.bindings.get(&model.gvk())
    }

    /// Render a data type for display.
    pub fn describe_type(&self, id: DataTypeId) -> String {
        self.registry.describe(id, &self.graph)
    }
}

/// Compile a schema document into a classified model graph.
///
/// # Errors
///
/// Returns the first fatal `CompileError`; nothing is returned on failure.
pub fn compile(
    document: &SchemaDocument,
    options: &CompileOptions,
) -> Result<CompiledSchema, CompileError> {
    let mut graph = resolve_all(&document.definitions, options)?;
    tracing::debug!(models = graph.len(), "resolved definitions");

    let mut registry = TypeRegistry::new();
    let names: Vec<(String, ModelId)> = graph
        .names()
        .map(|(name, id)| (name.to_string(), id))
        .collect();
    for (name, id) in &names {
        registry.bind_model(name, *id);
    }

    let ids: Vec<ModelId> = graph.ids().collect();
    for &id in &ids {
        let model = graph.get_mut(id);
        let Some(definition) = document.definitions.get(&model.definition_name) else {
            continue;
        };
        compile_properties(model, definition, &mut registry)?;
    }
    registry.seal()?;
    tracing::debug!(types = registry.len(), "compiled properties");

    let well_known = WellKnownModels::from_graph(&graph, options);
    for &id in &ids {
        let classification = classify(graph.get(id), &registry, &well_known)?;
        graph.get_mut(id).classification = classification;
    }

    let bindings = bind_operations(&document.paths);
    tracing::debug!(
        kinds = bindings.len(),
        skipped = bindings.skipped().len(),
        "bound operations"
    );

    Ok(CompiledSchema {
        graph,
        registry,
        bindings,
    })
}

/// Fill in a model's properties from its definition.
///
/// Properties are ordered by derived kind-name, ties broken by wire name.
/// A property is optional exactly when its wire name is not in the
/// definition's `required` list.
///
/// # Errors
///
/// Returns `CompileError` if a property's type cannot be resolved, or
/// `CompileError::InvalidDefinition` if two properties sanitize to the same name.
pub fn compile_properties(
    model: &mut Model,
    definition: &DefinitionNode,
    registry: &mut TypeRegistry,
) -> Result<(), CompileError> {
    let mut wire_names: Vec<&String> = definition.properties.keys().collect();
    wire_names.sort_by(|a, b| property_sort_key(a).cmp(&property_sort_key(b)));

    model.properties.clear();
    let mut claimed: HashMap<String, &str> = HashMap::new();
    for wire_name in wire_names {
        let name = sanitize_property_name(wire_name);
        if let Some(first) = claimed.insert(name.clone(), wire_name) {
            return Err(CompileError::InvalidDefinition {
                definition: model.definition_name.clone(),
                message: format!(
                    "properties '{}' and '{}' both map to '{}'",
                    first, wire_name, name
                ),
            });
        }

        let node = &definition.properties[wire_name];
        let ctx = ResolveContext {
            definition: &model.definition_name,
            property: wire_name,
        };
        let data_type = registry.resolve(node, ctx)?;

        let merge_strategy = match node.patch_strategy.as_deref() {
            Some(raw) => {
                let (strategy, unknown) = MergeStrategy::parse(raw);
                if !unknown.is_empty() {
                    tracing::warn!(
                        definition = %model.definition_name,
                        property = %wire_name,
                        tokens = ?unknown,
                        "ignoring unknown patch strategy tokens"
                    );
                }
                strategy
            }
            None => MergeStrategy::None,
        };

        let property = Property {
            name,
            wire_name: wire_name.clone(),
            summary: node
                .description
                .clone()
                .unwrap_or_else(|| NO_SUMMARY.to_string()),
            data_type,
            is_optional: !definition.required.contains(wire_name.as_str()),
            merge_strategy,
            merge_key: node.patch_merge_key.clone(),
        };
        model.properties.insert(wire_name.clone(), property);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DataType, Intrinsic};
    use serde_json::{json, Value};

    fn doc(value: Value) -> SchemaDocument {
        SchemaDocument::from_value(value).unwrap()
    }

    #[test]
    fn properties_sorted_by_kind_name() {
        let document = doc(json!({
            "definitions": {
                "a.v1.Thing": {
                    "properties": {
                        "status": { "type": "string" },
                        "apiVersion": { "type": "string" },
                        "a.spec": { "type": "string" },
                        "spec": { "type": "string" },
                        "kind": { "type": "string" }
                    }
                }
            }
        }));
        let compiled = compile(&document, &CompileOptions::new()).unwrap();
        let thing = compiled.model("a.v1.Thing").unwrap();
        let order: Vec<&str> = thing.properties.keys().map(String::as_str).collect();
        assert_eq!(order, ["apiVersion", "kind", "a.spec", "spec", "status"]);
    }

    #[test]
    fn optional_follows_required_set() {
        let document = doc(json!({
            "definitions": {
                "a.v1.Thing": {
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string", "description": "Optional in prose, required in schema." },
                        "note": { "type": "string", "description": "Name of the thing." }
                    }
                }
            }
        }));
        let compiled = compile(&document, &CompileOptions::new()).unwrap();
        let thing = compiled.model("a.v1.Thing").unwrap();
        assert!(!thing.property("name").unwrap().is_optional);
        assert!(thing.property("note").unwrap().is_optional);
    }

    #[test]
    fn merge_metadata() {
        let document = doc(json!({
            "definitions": {
                "io.k8s.api.core.v1.PodSpec": {
                    "properties": {
                        "containers": {
                            "type": "array",
                            "items": { "type": "string" },
                            "x-kubernetes-patch-strategy": "merge",
                            "x-kubernetes-patch-merge-key": "name"
                        },
                        "volumes": {
                            "type": "array",
                            "items": { "type": "string" },
                            "x-kubernetes-patch-strategy": "merge,retainKeys",
                            "x-kubernetes-patch-merge-key": "name"
                        },
                        "strategy": {
                            "type": "string",
                            "x-kubernetes-patch-strategy": "retainKeys"
                        },
                        "ports": {
                            "type": "array",
                            "items": { "type": "string" },
                            "x-kubernetes-patch-merge-key": "containerPort"
                        }
                    }
                }
            }
        }));
        let compiled = compile(&document, &CompileOptions::new()).unwrap();
        let spec = compiled.model("io.k8s.api.core.v1.PodSpec").unwrap();

        let containers = spec.property("containers").unwrap();
        assert_eq!(containers.merge_strategy, MergeStrategy::Merge);
        assert_eq!(containers.merge_key.as_deref(), Some("name"));

        let volumes = spec.property("volumes").unwrap();
        assert_eq!(volumes.merge_strategy, MergeStrategy::MergeRetainKeys);
        assert_eq!(volumes.merge_key.as_deref(), Some("name"));

        let strategy = spec.property("strategy").unwrap();
        assert_eq!(strategy.merge_strategy, MergeStrategy::RetainKeys);
        assert!(!strategy.merge_strategy.is_merge());
        assert_eq!(strategy.merge_key, None);

        let ports = spec.property("ports").unwrap();
        assert_eq!(ports.merge_strategy, MergeStrategy::None);
        assert_eq!(ports.merge_key.as_deref(), Some("containerPort"));
    }

    #[test]
    fn sanitized_property_names() {
        let document = doc(json!({
            "definitions": {
                "io.k8s.apiextensions.v1.JSONSchemaProps": {
                    "properties": {
                        "$ref": { "type": "string" },
                        "x-kubernetes-list-type": { "type": "string" }
                    }
                }
            }
        }));
        let compiled = compile(&document, &CompileOptions::new()).unwrap();
        let props = compiled.model("io.k8s.apiextensions.v1.JSONSchemaProps").unwrap();
        assert_eq!(props.property("$ref").unwrap().name, "Ref");
        assert_eq!(
            props.property("x-kubernetes-list-type").unwrap().name,
            "KubernetesListType"
        );
    }

    #[test]
    fn plain_names_keep_their_separators() {
        let document = doc(json!({
            "definitions": {
                "a.v1.T": {
                    "properties": {
                        "external_id": { "type": "string" },
                        "externalId": { "type": "string" }
                    }
                }
            }
        }));
        let compiled = compile(&document, &CompileOptions::new()).unwrap();
        let t = compiled.model("a.v1.T").unwrap();
        assert_eq!(t.property("external_id").unwrap().name, "External_id");
        assert_eq!(t.property("externalId").unwrap().name, "ExternalId");
    }

    #[test]
    fn clashing_property_names_fail() {
        let document = doc(json!({
            "definitions": {
                "a.v1.T": {
                    "properties": {
                        "$ref": { "type": "string" },
                        "ref": { "type": "string" }
                    }
                }
            }
        }));
        let err = compile(&document, &CompileOptions::new()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::InvalidDefinition { ref definition, ref message }
                if definition == "a.v1.T" && message.contains("'Ref'")
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn forward_and_self_references() {
        let document = doc(json!({
            "definitions": {
                "a.v1.Early": {
                    "properties": {
                        "later": { "$ref": "#/definitions/a.v1.Late" }
                    }
                },
                "a.v1.Late": {
                    "properties": {
                        "children": { "type": "array", "items": { "$ref": "#/definitions/a.v1.Late" } }
                    }
                }
            }
        }));
        let compiled = compile(&document, &CompileOptions::new()).unwrap();
        let late_id = compiled.graph().id_of("a.v1.Late");
        let early = compiled.model("a.v1.Early").unwrap();
        let later = early.property("later").unwrap();
        assert_eq!(compiled.registry().get(later.data_type).model(), late_id);

        let late = compiled.model("a.v1.Late").unwrap();
        let children = late.property("children").unwrap();
        assert_eq!(compiled.describe_type(children.data_type), "array<LateV1>");
    }

    #[test]
    fn references_through_aliases_share_the_model() {
        let document = doc(json!({
            "definitions": {
                "a.v1.Target": { "properties": { "x": { "type": "string" } } },
                "a.v1.Alias": { "$ref": "#/definitions/a.v1.Target" },
                "a.v1.User": {
                    "properties": {
                        "direct": { "$ref": "#/definitions/a.v1.Target" },
                        "aliased": { "$ref": "#/definitions/a.v1.Alias" }
                    }
                }
            }
        }));
        let compiled = compile(&document, &CompileOptions::new()).unwrap();
        let user = compiled.model("a.v1.User").unwrap();
        let direct = user.property("direct").unwrap().data_type;
        let aliased = user.property("aliased").unwrap().data_type;
        assert_eq!(direct, aliased);
    }

    #[test]
    fn ignored_well_known_definitions_become_intrinsics() {
        let document = doc(json!({
            "definitions": {
                "io.k8s.apimachinery.pkg.apis.meta.v1.Time": { "type": "string", "format": "date-time" },
                "a.v1.Thing": {
                    "properties": {
                        "created": { "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.Time" },
                        "limits": {
                            "type": "object",
                            "additionalProperties": {
                                "$ref": "#/definitions/io.k8s.apimachinery.pkg.api.resource.Quantity"
                            }
                        }
                    }
                }
            }
        }));
        let compiled = compile(&document, &CompileOptions::new()).unwrap();
        let thing = compiled.model("a.v1.Thing").unwrap();
        let created = thing.property("created").unwrap();
        assert_eq!(
            compiled.registry().get(created.data_type),
            &DataType::Intrinsic(Intrinsic::DateTime)
        );
        let limits = thing.property("limits").unwrap();
        assert_eq!(compiled.describe_type(limits.data_type), "map<string, string>");
    }

    #[test]
    fn delete_options_is_never_a_model() {
        let document = doc(json!({
            "definitions": {
                "io.k8s.apimachinery.pkg.apis.meta.v1.DeleteOptions": {
                    "properties": { "dryRun": { "type": "array", "items": { "type": "string" } } }
                },
                "a.v1.User": {
                    "properties": {
                        "opts": { "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.DeleteOptions" }
                    }
                }
            }
        }));
        let compiled = compile(&document, &CompileOptions::new()).unwrap();
        assert!(compiled
            .model("io.k8s.apimachinery.pkg.apis.meta.v1.DeleteOptions")
            .is_none());
        assert_eq!(compiled.graph().len(), 1);

        let user = compiled.model("a.v1.User").unwrap();
        let opts = user.property("opts").unwrap();
        assert_eq!(
            compiled.registry().get(opts.data_type),
            &DataType::Intrinsic(Intrinsic::DeleteOptions)
        );
        assert_eq!(compiled.describe_type(opts.data_type), "delete-options");
    }

    #[test]
    fn dangling_reference_names_its_definition() {
        let document = doc(json!({
            "definitions": {
                "a.v1.Thing": {
                    "properties": {
                        "spec": { "$ref": "#/definitions/a.v1.Missing" }
                    }
                }
            }
        }));
        let err = compile(&document, &CompileOptions::new()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnresolvableReference { ref definition, ref target }
                if definition == "a.v1.Thing" && target == "a.v1.Missing"
        ));
    }

    #[test]
    fn reference_to_ignored_definition_is_dangling() {
        let document = doc(json!({
            "definitions": {
                "a.v1.Old": { "properties": { "x": { "type": "string" } } },
                "a.v1.Thing": {
                    "properties": {
                        "old": { "$ref": "#/definitions/a.v1.Old" }
                    }
                }
            }
        }));
        let options = CompileOptions::new().ignore("a.v1.Old");
        let err = compile(&document, &options).unwrap_err();
        assert!(matches!(err, CompileError::UnresolvableReference { .. }));
    }

    #[test]
    fn operations_join_by_gvk() {
        let document = doc(json!({
            "definitions": {
                "io.k8s.api.core.v1.Pod": {
                    "properties": { "kind": { "type": "string" } },
                    "x-kubernetes-group-version-kind": [
                        { "group": "", "kind": "Pod", "version": "v1" }
                    ]
                }
            },
            "paths": {
                "/api/v1/pods": {
                    "get": {
                        "x-kubernetes-action": "list",
                        "x-kubernetes-group-version-kind": { "group": "", "kind": "Pod", "version": "v1" }
                    }
                }
            }
        }));
        let compiled = compile(&document, &CompileOptions::new()).unwrap();
        let pod = compiled.model("io.k8s.api.core.v1.Pod").unwrap();
        let operations = compiled.operations_for(pod).unwrap();
        assert_eq!(operations.len(), 1);
    }
}
