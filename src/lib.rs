//! Kubernetes Model Compiler
//!
//! Resolves and classifies the definitions of a Kubernetes API schema
//! (Swagger 2.0 / OpenAPI v2) into a typed model graph.
//!
//! Compilation runs in two passes so that properties can refer to models
//! declared later in the document, or to the model that contains them. The
//! result carries one model per retained definition, a registry of resolved
//! property types, and the table of API operations bound to each kind.
//!
//! # Example
//!
//! ```
//! use kube_model_compiler::{compile, CompileOptions, SchemaDocument};
//! use serde_json::json;
//!
//! let document = SchemaDocument::from_value(json!({
//!     "definitions": {
//!         "io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta": {
//!             "properties": { "name": { "type": "string" } }
//!         },
//!         "io.k8s.api.core.v1.Pod": {
//!             "required": ["kind"],
//!             "properties": {
//!                 "kind": { "type": "string" },
//!                 "apiVersion": { "type": "string" },
//!                 "metadata": {
//!                     "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"
//!                 }
//!             }
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! let compiled = compile(&document, &CompileOptions::new()).unwrap();
//! let pod = compiled.model("io.k8s.api.core.v1.Pod").unwrap();
//!
//! assert_eq!(pod.generated_name, "PodV1");
//! assert!(pod.classification.is_kube_resource);
//! assert!(!pod.property("kind").unwrap().is_optional);
//! assert!(pod.property("apiVersion").unwrap().is_optional);
//! ```
//!
//! # Classification
//!
//! | Role | Shape |
//! |------|-------|
//! | object | string `kind` and string `apiVersion` |
//! | resource | object whose `metadata` is `ObjectMeta` |
//! | resource list | object whose `metadata` is `ListMeta` |
//! | list items | array-typed `items`, element model is the list item type |
//!
//! # Well-known definitions
//!
//! `Time`, `MicroTime`, `Quantity`, `IntOrString` and `DeleteOptions` are
//! skipped by default and references to them resolve to intrinsic types. See [`CompileOptions`].

mod binder;
mod classify;
mod compiler;
mod document;
mod error;
mod loader;
mod manifest;
mod model;
mod naming;
mod registry;
mod resolver;
mod types;

pub use binder::{bind_operations, ActionPaths, ApiBindings};
pub use classify::{
    classify, is_kube_object, is_kube_resource, is_kube_resource_list, list_items, Classification,
    WellKnownModels,
};
pub use compiler::{compile, compile_properties, CompiledSchema};
pub use document::{
    reference_name, AdditionalProperties, DefinitionNode, OperationNode, PathItem, PropertyNode,
    SchemaDocument,
};
pub use error::{CompileError, LoadError, UnboundOperation};
pub use loader::{is_url, load_document, load_document_auto, load_document_str, SchemaFormat};
pub use manifest::{
    build_binding_table, build_manifest, BindingEntry, Manifest, ModelEntry, PropertyEntry,
};
pub use model::{Model, ModelGraph, ModelId, Property};
pub use naming::{capitalize_name, sanitize_property_name, version_qualifier};
pub use registry::{DataType, DataTypeId, Intrinsic, ModelLink, ResolveContext, TypeRegistry};
pub use resolver::{derive_identity, resolve_all, Identity, NO_SUMMARY};
pub use types::{
    ApiAction, CompileOptions, Gvk, MergeStrategy, DEFAULT_IGNORED, LIST_META, OBJECT_META,
};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
