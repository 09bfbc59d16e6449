//! Error types for schema loading and model compilation.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors while reading a schema document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("malformed schema document: {source}")]
    InvalidDocument {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Fatal errors during compilation. Each names the definition it came from.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("definition '{definition}' references unknown definition '{target}'")]
    UnresolvableReference { definition: String, target: String },

    #[error("alias '{alias}' points to ignored definition '{target}'")]
    AmbiguousAlias { alias: String, target: String },

    #[error("alias '{alias}' is part of a reference cycle")]
    CircularAlias { alias: String },

    #[error("cannot classify '{definition}': {message}")]
    ClassificationConflict { definition: String, message: String },

    #[error("generated name '{generated_name}' used by both '{first}' and '{second}'")]
    DuplicateGeneratedName {
        generated_name: String,
        first: String,
        second: String,
    },

    #[error("invalid definition '{definition}': {message}")]
    InvalidDefinition { definition: String, message: String },
}

impl CompileError {
    /// The definition this error originated from.
    pub fn definition(&self) -> &str {
        match self {
            CompileError::UnresolvableReference { definition, .. }
            | CompileError::ClassificationConflict { definition, .. }
            | CompileError::InvalidDefinition { definition, .. } => definition,
            CompileError::AmbiguousAlias { alias, .. } | CompileError::CircularAlias { alias } => {
                alias
            }
            CompileError::DuplicateGeneratedName { second, .. } => second,
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// An operation skipped by the API binder. Not fatal.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UnboundOperation {
    /// Path string from the schema's path table.
    pub path: String,
    /// HTTP verb under that path.
    pub verb: String,
    /// Why the operation could not be bound.
    pub reason: String,
}

impl fmt::Display for UnboundOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.verb, self.path, self.reason)
    }
}
