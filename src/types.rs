//! Core types shared by the compilation passes.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::naming::capitalize_name;

/// Prefix of internal definition references (`#/definitions/<name>`).
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Pseudo-verb in a path item that holds shared parameters, not an operation.
pub const PARAMETERS_VERB: &str = "parameters";

/// Well-known definition for object metadata (marks a resource).
pub const OBJECT_META: &str = "io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta";

/// Well-known definition for list metadata (marks a resource list).
pub const LIST_META: &str = "io.k8s.apimachinery.pkg.apis.meta.v1.ListMeta";

/// Definition for timestamps (maps to the date-time intrinsic).
pub const TIME: &str = "io.k8s.apimachinery.pkg.apis.meta.v1.Time";

/// Definition for microsecond timestamps (maps to the date-time intrinsic).
pub const MICRO_TIME: &str = "io.k8s.apimachinery.pkg.apis.meta.v1.MicroTime";

/// Definition for integer-or-string values.
pub const INT_OR_STRING: &str = "io.k8s.apimachinery.pkg.util.intstr.IntOrString";

/// Definition for arbitrary-precision quantities (serialized as strings).
pub const QUANTITY: &str = "io.k8s.apimachinery.pkg.api.resource.Quantity";

/// Definition for delete options (hand-authored, never generated).
pub const DELETE_OPTIONS: &str = "io.k8s.apimachinery.pkg.apis.meta.v1.DeleteOptions";

/// Definitions skipped by default. Their references resolve to intrinsics.
pub const DEFAULT_IGNORED: &[&str] = &[
    TIME,
    MICRO_TIME,
    QUANTITY,
    INT_OR_STRING,
    DELETE_OPTIONS,
];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Group, version and kind identifying one API object type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gvk {
    /// API group; empty for the core group.
    #[serde(default)]
    pub group: String,
    /// API version (e.g. "v1", "v1beta1").
    #[serde(default)]
    pub version: String,
    /// Resource kind (e.g. "Pod").
    #[serde(default)]
    pub kind: String,
}

impl Gvk {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// The `apiVersion` value objects of this type carry ("apps/v1", or "v1" for core).
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for Gvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.kind)
    }
}

/// Normalized API action of an operation.
///
/// Ordering is by action name so binding tables sort the same way they print.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApiAction {
    Connect,
    Create,
    Delete,
    DeleteCollection,
    Get,
    List,
    Patch,
    Proxy,
    Update,
    Watch,
    WatchList,
    /// Unrecognized action tag, capitalized.
    Other(String),
}

impl ApiAction {
    /// Normalize a raw `x-kubernetes-action` tag.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "connect" => ApiAction::Connect,
            "post" | "create" => ApiAction::Create,
            "delete" => ApiAction::Delete,
            "deletecollection" => ApiAction::DeleteCollection,
            "get" => ApiAction::Get,
            "list" => ApiAction::List,
            "patch" => ApiAction::Patch,
            "proxy" => ApiAction::Proxy,
            "put" | "update" => ApiAction::Update,
            "watch" => ApiAction::Watch,
            "watchlist" => ApiAction::WatchList,
            _ => ApiAction::Other(capitalize_name(raw)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ApiAction::Connect => "Connect",
            ApiAction::Create => "Create",
            ApiAction::Delete => "Delete",
            ApiAction::DeleteCollection => "DeleteCollection",
            ApiAction::Get => "Get",
            ApiAction::List => "List",
            ApiAction::Patch => "Patch",
            ApiAction::Proxy => "Proxy",
            ApiAction::Update => "Update",
            ApiAction::Watch => "Watch",
            ApiAction::WatchList => "WatchList",
            ApiAction::Other(name) => name,
        }
    }
}

impl Ord for ApiAction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for ApiAction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ApiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ApiAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// How a list-valued property is combined during a strategic merge patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Replace the whole value.
    #[default]
    None,
    /// Merge list elements by merge key.
    Merge,
    /// Merge, and drop keys absent from the patch.
    MergeRetainKeys,
    /// Drop keys absent from the patch without merging.
    RetainKeys,
}

impl MergeStrategy {
    /// Parse a patch-strategy extension value (comma-separated tokens, any order).
    ///
    /// Returns the strategy plus any tokens that were not understood.
    pub fn parse(raw: &str) -> (Self, Vec<String>) {
        let mut merge = false;
        let mut retain_keys = false;
        let mut unknown = Vec::new();

        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token {
                "merge" => merge = true,
                "retainKeys" => retain_keys = true,
                other => unknown.push(other.to_string()),
            }
        }

        let strategy = match (merge, retain_keys) {
            (true, true) => MergeStrategy::MergeRetainKeys,
            (true, false) => MergeStrategy::Merge,
            (false, true) => MergeStrategy::RetainKeys,
            (false, false) => MergeStrategy::None,
        };
        (strategy, unknown)
    }

    pub fn is_merge(&self) -> bool {
        matches!(self, MergeStrategy::Merge | MergeStrategy::MergeRetainKeys)
    }

    pub fn is_retain_keys(&self) -> bool {
        matches!(self, MergeStrategy::RetainKeys | MergeStrategy::MergeRetainKeys)
    }
}

/// Options for one compilation run.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Definition names skipped entirely.
    pub ignore: BTreeSet<String>,
    /// Definition whose use as `metadata` marks a resource.
    pub object_meta: String,
    /// Definition whose use as `metadata` marks a resource list.
    pub list_meta: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            ignore: DEFAULT_IGNORED.iter().map(|name| name.to_string()).collect(),
            object_meta: OBJECT_META.to_string(),
            list_meta: LIST_META.to_string(),
        }
    }
}

impl CompileOptions {
    /// Create options with the stock ignore list and metadata definitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the ignore list, including the defaults.
    pub fn without_default_ignores(mut self) -> Self {
        self.ignore.clear();
        self
    }

    /// Skip an additional definition.
    pub fn ignore(mut self, name: impl Into<String>) -> Self {
        self.ignore.insert(name.into());
        self
    }

    /// Override the object metadata definition.
    pub fn object_meta(mut self, name: impl Into<String>) -> Self {
        self.object_meta = name.into();
        self
    }

    /// Override the list metadata definition.
    pub fn list_meta(mut self, name: impl Into<String>) -> Self {
        self.list_meta = name.into();
        self
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.contains(name)
    }
}
