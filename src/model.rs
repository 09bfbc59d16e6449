//! Compiled model entities and the arena that owns them.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::classify::Classification;
use crate::registry::DataTypeId;
use crate::types::{Gvk, MergeStrategy};

/// Handle to a model in a [`ModelGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(usize);

impl ModelId {
    pub fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Compiled, classified representation of one retained definition.
#[derive(Debug, Clone)]
pub struct Model {
    /// Canonical schema name of the definition this model was built from.
    pub definition_name: String,
    /// Kind name ("Pod").
    pub name: String,
    /// API group; empty for the core group.
    pub group: String,
    /// Raw API version ("v1beta1").
    pub api_version: String,
    /// Display form of the version ("V1Beta1").
    pub version_qualifier: String,
    /// Unique name for generated artifacts ("PodV1").
    pub generated_name: String,
    pub summary: String,
    /// Properties keyed by wire name, in emission order.
    pub properties: IndexMap<String, Property>,
    pub required_keys: BTreeSet<String>,
    pub classification: Classification,
}

impl Model {
    pub fn gvk(&self) -> Gvk {
        Gvk::new(&self.group, &self.api_version, &self.name)
    }

    /// Property by wire name.
    pub fn property(&self, wire_name: &str) -> Option<&Property> {
        self.properties.get(wire_name)
    }

    /// File name of this model's generated artifact.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.generated_name, extension.trim_start_matches('.'))
    }
}

/// One resolved property of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Identifier-safe name.
    pub name: String,
    /// Key used on the wire.
    pub wire_name: String,
    pub summary: String,
    pub data_type: DataTypeId,
    pub is_optional: bool,
    pub merge_strategy: MergeStrategy,
    /// Field identifying list elements during a merge patch.
    pub merge_key: Option<String>,
}

/// Arena of models plus the name table that maps definitions (and aliases) to them.
#[derive(Debug, Clone, Default)]
pub struct ModelGraph {
    models: Vec<Model>,
    names: BTreeMap<String, ModelId>,
}

impl ModelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model and bind its definition name.
    pub fn insert(&mut self, model: Model) -> ModelId {
        let id = ModelId(self.models.len());
        self.names.insert(model.definition_name.clone(), id);
        self.models.push(model);
        id
    }

    /// Bind an extra name (an alias) to an existing model.
    pub fn bind(&mut self, name: impl Into<String>, id: ModelId) {
        self.names.insert(name.into(), id);
    }

    pub fn get(&self, id: ModelId) -> &Model {
        &self.models[id.0]
    }

    pub fn get_mut(&mut self, id: ModelId) -> &mut Model {
        &mut self.models[id.0]
    }

    /// Model bound to a definition or alias name.
    pub fn id_of(&self, name: &str) -> Option<ModelId> {
        self.names.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Model> {
        self.id_of(name).map(|id| self.get(id))
    }

    /// Number of distinct models (aliases not counted).
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ModelId> {
        (0..self.models.len()).map(ModelId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelId, &Model)> {
        self.models.iter().enumerate().map(|(i, m)| (ModelId(i), m))
    }

    /// Every bound name with its model, in name order.
    pub fn names(&self) -> impl Iterator<Item = (&str, ModelId)> {
        self.names.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Names other than the definition name that denote this model.
    pub fn aliases_of(&self, id: ModelId) -> Vec<&str> {
        let canonical = self.get(id).definition_name.as_str();
        self.names()
            .filter(|(name, bound)| *bound == id && *name != canonical)
            .map(|(name, _)| name)
            .collect()
    }
}
