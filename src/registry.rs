//! Type registry - one shared descriptor per intrinsic and per referenced name.
//!
//! Descriptors live in an arena and are addressed by [`DataTypeId`]. Model
//! references hold a [`ModelId`] rather than a copy of the model, so a property
//! can point at a model whose own properties are not compiled yet.
//!
//! A reference to a name with no model yet becomes a pending placeholder. It is
//! filled in place by [`TypeRegistry::bind_model`], and [`TypeRegistry::seal`]
//! rejects any placeholder that was never bound.

use std::collections::{BTreeMap, HashMap};

use crate::document::{reference_name, AdditionalProperties, PropertyNode};
use crate::error::CompileError;
use crate::model::{ModelGraph, ModelId};
use crate::types::{DELETE_OPTIONS, INT_OR_STRING, MICRO_TIME, QUANTITY, TIME};

/// Well-known definitions mapped to hand-authored intrinsics.
const WELL_KNOWN: &[(&str, Intrinsic)] = &[
    (TIME, Intrinsic::DateTime),
    (MICRO_TIME, Intrinsic::DateTime),
    (INT_OR_STRING, Intrinsic::IntOrString),
    (QUANTITY, Intrinsic::String),
    (DELETE_OPTIONS, Intrinsic::DeleteOptions),
];

/// Handle to a descriptor in a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataTypeId(usize);

/// Built-in value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    String,
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    DateTime,
    /// Integer-or-string union.
    IntOrString,
    /// Free-form JSON object.
    Object,
    /// Hand-authored delete options, never generated from the schema.
    DeleteOptions,
}

impl Intrinsic {
    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::String => "string",
            Intrinsic::Boolean => "boolean",
            Intrinsic::Int32 => "int32",
            Intrinsic::Int64 => "int64",
            Intrinsic::Float => "float",
            Intrinsic::Double => "double",
            Intrinsic::DateTime => "date-time",
            Intrinsic::IntOrString => "int-or-string",
            Intrinsic::Object => "object",
            Intrinsic::DeleteOptions => "delete-options",
        }
    }

    /// Intrinsic for a primitive type name and optional format.
    ///
    /// Unknown formats fall back to the primitive's default width.
    /// Returns `None` if `type_name` is not a primitive.
    pub fn from_primitive(type_name: &str, format: Option<&str>) -> Option<Self> {
        let intrinsic = match (type_name, format) {
            ("integer", Some("int64")) => Intrinsic::Int64,
            ("integer", _) => Intrinsic::Int32,
            ("number", Some("float")) => Intrinsic::Float,
            ("number", _) => Intrinsic::Double,
            ("string", Some("date-time")) => Intrinsic::DateTime,
            ("string", Some("int-or-string")) => Intrinsic::IntOrString,
            ("string", _) => Intrinsic::String,
            ("boolean", _) => Intrinsic::Boolean,
            _ => return None,
        };
        Some(intrinsic)
    }
}

/// Link from a data type to a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLink {
    Bound(ModelId),
    /// Referenced before any model was bound to `name`.
    Pending { name: String, referenced_by: String },
}

/// Resolved type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Intrinsic(Intrinsic),
    Array(DataTypeId),
    /// Map with string keys.
    Map(DataTypeId),
    Model(ModelLink),
}

impl DataType {
    pub fn is_intrinsic(&self) -> bool {
        matches!(self, DataType::Intrinsic(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, DataType::Array(_) | DataType::Map(_))
    }

    pub fn intrinsic(&self) -> Option<Intrinsic> {
        match self {
            DataType::Intrinsic(intrinsic) => Some(*intrinsic),
            _ => None,
        }
    }

    /// Element type of an array, or value type of a map.
    pub fn element_type(&self) -> Option<DataTypeId> {
        match self {
            DataType::Array(element) | DataType::Map(element) => Some(*element),
            _ => None,
        }
    }

    /// Bound model, if this is a model reference.
    pub fn model(&self) -> Option<ModelId> {
        match self {
            DataType::Model(ModelLink::Bound(id)) => Some(*id),
            _ => None,
        }
    }
}

/// Origin of a type expression, carried into error messages.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub definition: &'a str,
    pub property: &'a str,
}

impl ResolveContext<'_> {
    fn invalid(&self, message: impl Into<String>) -> CompileError {
        CompileError::InvalidDefinition {
            definition: self.definition.to_string(),
            message: format!("property '{}': {}", self.property, message.into()),
        }
    }
}

/// Memoizing pool of data types for one compilation run.
#[derive(Debug)]
pub struct TypeRegistry {
    types: Vec<DataType>,
    intrinsics: HashMap<Intrinsic, DataTypeId>,
    names: BTreeMap<String, DataTypeId>,
    models: HashMap<ModelId, DataTypeId>,
    sealed: bool,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry pre-seeded with the well-known intrinsic mappings.
    pub fn new() -> Self {
        let mut registry = Self {
            types: Vec::new(),
            intrinsics: HashMap::new(),
            names: BTreeMap::new(),
            models: HashMap::new(),
            sealed: false,
        };
        for (name, intrinsic) in WELL_KNOWN {
            let id = registry.intrinsic(*intrinsic);
            registry.names.insert(name.to_string(), id);
        }
        registry
    }

    pub fn get(&self, id: DataTypeId) -> &DataType {
        &self.types[id.0]
    }

    /// Number of descriptors in the pool.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Descriptor bound to a schema name, if any.
    pub fn lookup(&self, name: &str) -> Option<DataTypeId> {
        self.names.get(name).copied()
    }

    /// The shared descriptor for an intrinsic.
    pub fn intrinsic(&mut self, intrinsic: Intrinsic) -> DataTypeId {
        if let Some(id) = self.intrinsics.get(&intrinsic) {
            return *id;
        }
        let id = self.push(DataType::Intrinsic(intrinsic));
        self.intrinsics.insert(intrinsic, id);
        id
    }

    /// Bind a schema name to a model.
    ///
    /// Fills a pending placeholder in place. Names already bound (including the
    /// well-known intrinsic names) keep their descriptor. Several names bound to
    /// the same model share one descriptor.
    pub fn bind_model(&mut self, name: &str, model: ModelId) -> DataTypeId {
        if let Some(&id) = self.names.get(name) {
            if let DataType::Model(link) = &mut self.types[id.0] {
                if matches!(link, ModelLink::Pending { .. }) {
                    *link = ModelLink::Bound(model);
                    self.models.entry(model).or_insert(id);
                }
            }
            return id;
        }

        let id = match self.models.get(&model) {
            Some(&id) => id,
            None => {
                let id = self.push(DataType::Model(ModelLink::Bound(model)));
                self.models.insert(model, id);
                id
            }
        };
        self.names.insert(name.to_string(), id);
        id
    }

    /// Resolve a property schema to a descriptor.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::InvalidDefinition` for arrays without `items` and
    /// unsupported primitive types, and `CompileError::UnresolvableReference`
    /// for unknown names once the registry is sealed.
    pub fn resolve(
        &mut self,
        node: &PropertyNode,
        ctx: ResolveContext<'_>,
    ) -> Result<DataTypeId, CompileError> {
        if let Some(reference) = &node.reference {
            return self.resolve_reference(reference_name(reference), ctx);
        }
        if node.int_or_string {
            return Ok(self.intrinsic(Intrinsic::IntOrString));
        }

        // No declared type: free-form value
        let Some(type_name) = node.type_name.as_deref() else {
            return Ok(self.intrinsic(Intrinsic::Object));
        };

        match type_name {
            "array" => {
                let items = node
                    .items
                    .as_deref()
                    .ok_or_else(|| ctx.invalid("array without items"))?;
                let element = self.resolve(items, ctx)?;
                Ok(self.push(DataType::Array(element)))
            }
            "object" => match &node.additional_properties {
                Some(AdditionalProperties::Schema(value)) => {
                    let element = self.resolve(value, ctx)?;
                    Ok(self.push(DataType::Map(element)))
                }
                Some(AdditionalProperties::Allowed(true)) => {
                    let element = self.intrinsic(Intrinsic::Object);
                    Ok(self.push(DataType::Map(element)))
                }
                _ => Ok(self.intrinsic(Intrinsic::Object)),
            },
            other => match Intrinsic::from_primitive(other, node.format.as_deref()) {
                Some(intrinsic) => Ok(self.intrinsic(intrinsic)),
                None => Err(ctx.invalid(format!("unsupported type '{}'", other))),
            },
        }
    }

    /// Resolve a definition name to its shared descriptor.
    ///
    /// Unknown names get a pending placeholder until the registry is sealed.
    pub fn resolve_reference(
        &mut self,
        name: &str,
        ctx: ResolveContext<'_>,
    ) -> Result<DataTypeId, CompileError> {
        if let Some(id) = self.lookup(name) {
            return Ok(id);
        }
        if self.sealed {
            return Err(CompileError::UnresolvableReference {
                definition: ctx.definition.to_string(),
                target: name.to_string(),
            });
        }

        tracing::trace!(target = name, definition = ctx.definition, "pending reference");
        let id = self.push(DataType::Model(ModelLink::Pending {
            name: name.to_string(),
            referenced_by: ctx.definition.to_string(),
        }));
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Close the registry. Every reference must be bound to a model by now.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::UnresolvableReference` for the first placeholder
    /// that was never bound.
    pub fn seal(&mut self) -> Result<(), CompileError> {
        let pending = self.types.iter().find_map(|data_type| match data_type {
            DataType::Model(ModelLink::Pending {
                name,
                referenced_by,
            }) => Some((name, referenced_by)),
            _ => None,
        });
        if let Some((name, referenced_by)) = pending {
            return Err(CompileError::UnresolvableReference {
                definition: referenced_by.clone(),
                target: name.clone(),
            });
        }

        self.sealed = true;
        Ok(())
    }

    /// Render a descriptor for display ("array<PodV1>", "map<string, string>").
    pub fn describe(&self, id: DataTypeId, graph: &ModelGraph) -> String {
        match self.get(id) {
            DataType::Intrinsic(intrinsic) => intrinsic.name().to_string(),
            DataType::Array(element) => format!("array<{}>", self.describe(*element, graph)),
            DataType::Map(element) => format!("map<string, {}>", self.describe(*element, graph)),
            DataType::Model(ModelLink::Bound(model)) => graph.get(*model).generated_name.clone(),
            DataType::Model(ModelLink::Pending { name, .. }) => name.clone(),
        }
    }

    fn push(&mut self, data_type: DataType) -> DataTypeId {
        let id = DataTypeId(self.types.len());
        self.types.push(data_type);
        id
    }
}
