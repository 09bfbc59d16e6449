//! Definition resolution - first pass, builds model shells from definitions.
//!
//! Every retained, non-alias definition becomes one [`Model`] with its identity
//! (kind, group, version, generated name) filled in and no properties yet.
//! Alias definitions are bound to the model of their final target.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use indexmap::IndexMap;

use crate::classify::Classification;
use crate::document::DefinitionNode;
use crate::error::CompileError;
use crate::model::{Model, ModelGraph};
use crate::naming::{capitalize_name, full_group_qualifier, group_qualifier, version_qualifier};
use crate::types::CompileOptions;

/// Summary used when a definition has no description.
pub const NO_SUMMARY: &str = "No summary provided";

/// Kind, group and version of a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub kind: String,
    pub group: String,
    pub api_version: String,
}

/// Build the model graph for all retained definitions.
///
/// # Errors
///
/// Returns `CompileError::UnresolvableReference` for an alias to a missing
/// definition, `CompileError::AmbiguousAlias` for an alias to an ignored one,
/// `CompileError::CircularAlias` for alias cycles, and
/// `CompileError::DuplicateGeneratedName` when two models cannot be given
/// distinct generated names.
pub fn resolve_all(
    definitions: &BTreeMap<String, DefinitionNode>,
    options: &CompileOptions,
) -> Result<ModelGraph, CompileError> {
    let mut graph = ModelGraph::new();
    let mut claimed: HashMap<String, String> = HashMap::new();
    let mut aliases = Vec::new();

    for (name, definition) in definitions {
        if options.is_ignored(name) {
            tracing::debug!(definition = %name, "ignoring definition");
            continue;
        }
        if definition.alias_target().is_some() {
            aliases.push(name.as_str());
            continue;
        }

        let model = model_shell(name, definition, &mut claimed)?;
        graph.insert(model);
    }

    for alias in aliases {
        let target = alias_target(alias, definitions, options)?;
        let Some(id) = graph.id_of(target) else {
            return Err(CompileError::UnresolvableReference {
                definition: alias.to_string(),
                target: target.to_string(),
            });
        };
        tracing::debug!(alias, target, "binding alias");
        graph.bind(alias, id);
    }

    Ok(graph)
}

/// Derive kind, group and version from a definition's name and extensions.
///
/// `io.k8s.api.apps.v1beta1.Deployment` gives kind `Deployment`, version
/// `v1beta1` and group `apps`. A `core` group segment means the empty group.
/// An `x-kubernetes-group-version-kind` entry takes precedence.
pub fn derive_identity(definition_name: &str, definition: &DefinitionNode) -> Identity {
    if let Some(gvk) = definition.group_version_kind.first() {
        return Identity {
            kind: gvk.kind.clone(),
            group: gvk.group.clone(),
            api_version: gvk.version.clone(),
        };
    }

    let segments: Vec<&str> = definition_name.split('.').collect();
    let kind = capitalize_name(segments[segments.len() - 1]);
    if segments.len() < 2 {
        return Identity {
            kind,
            group: String::new(),
            api_version: String::new(),
        };
    }

    let api_version = segments[segments.len() - 2].to_string();
    let group = match segments.len() {
        0..=2 => String::new(),
        n => match segments[n - 3] {
            "core" => String::new(),
            group => group.to_string(),
        },
    };

    Identity {
        kind,
        group,
        api_version,
    }
}

fn model_shell(
    name: &str,
    definition: &DefinitionNode,
    claimed: &mut HashMap<String, String>,
) -> Result<Model, CompileError> {
    let identity = derive_identity(name, definition);
    let qualifier = version_qualifier(&identity.api_version);

    let mut generated_name = format!("{}{}", identity.kind, qualifier);
    if let Some(first) = claimed.get(&generated_name) {
        let first = first.clone();
        let short = group_qualifier(&identity.group);
        let full = full_group_qualifier(&identity.group);
        let mut candidates = vec![format!("{}{}{}", identity.kind, short, qualifier)];
        if full != short {
            candidates.push(format!("{}{}{}", identity.kind, full, qualifier));
        }

        let free = candidates
            .iter()
            .find(|candidate| !claimed.contains_key(*candidate))
            .cloned();
        let Some(qualified) = free else {
            let generated_name = candidates.pop().unwrap_or(generated_name);
            let first = claimed.get(&generated_name).cloned().unwrap_or(first);
            return Err(CompileError::DuplicateGeneratedName {
                generated_name,
                first,
                second: name.to_string(),
            });
        };

        tracing::debug!(
            definition = name,
            taken_by = %first,
            generated_name = %qualified,
            "generated name collision, adding group qualifier"
        );
        generated_name = qualified;
    }
    claimed.insert(generated_name.clone(), name.to_string());

    Ok(Model {
        definition_name: name.to_string(),
        name: identity.kind,
        group: identity.group,
        api_version: identity.api_version,
        version_qualifier: qualifier,
        generated_name,
        summary: definition
            .description
            .clone()
            .unwrap_or_else(|| NO_SUMMARY.to_string()),
        properties: IndexMap::new(),
        required_keys: definition.required.clone(),
        classification: Classification::default(),
    })
}

/// Follow an alias chain to the first definition that is not an alias.
fn alias_target<'a>(
    alias: &'a str,
    definitions: &'a BTreeMap<String, DefinitionNode>,
    options: &CompileOptions,
) -> Result<&'a str, CompileError> {
    let mut visited = BTreeSet::from([alias]);
    let mut current = alias;

    loop {
        let Some(target) = definitions.get(current).and_then(DefinitionNode::alias_target) else {
            return Ok(current);
        };
        if options.is_ignored(target) {
            return Err(CompileError::AmbiguousAlias {
                alias: alias.to_string(),
                target: target.to_string(),
            });
        }
        let Some((target, _)) = definitions.get_key_value(target) else {
            return Err(CompileError::UnresolvableReference {
                definition: alias.to_string(),
                target: target.to_string(),
            });
        };
        if !visited.insert(target.as_str()) {
            return Err(CompileError::CircularAlias {
                alias: alias.to_string(),
            });
        }
        current = target.as_str();
    }
}
