//! Schema document loading from files, strings, and HTTP URLs.
//!
//! Documents may be JSON or YAML. Either way they are parsed to generic JSON
//! first and then shaped into a [`SchemaDocument`].

use std::path::Path;

use serde_json::Value;

use crate::document::SchemaDocument;
use crate::error::LoadError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds; full API schemas are large).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Wire format of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaFormat {
    #[default]
    Json,
    Yaml,
}

impl SchemaFormat {
    /// Guess the format from a file extension. Anything but `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                SchemaFormat::Yaml
            }
            _ => SchemaFormat::Json,
        }
    }
}

/// Load a schema document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist, a parse error
/// if the content isn't valid JSON/YAML, or `LoadError::InvalidDocument` if
/// it isn't shaped like a schema document.
pub fn load_document(path: &Path) -> Result<SchemaDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "loaded schema file");
    load_document_str(&content, SchemaFormat::from_path(path))
}

/// Load a schema document from a string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` / `LoadError::InvalidYaml` if the string
/// doesn't parse, or `LoadError::InvalidDocument` if the shape is wrong.
pub fn load_document_str(content: &str, format: SchemaFormat) -> Result<SchemaDocument, LoadError> {
    let value: Value = match format {
        SchemaFormat::Json => {
            serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?
        }
        SchemaFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml { source })?
        }
    };
    SchemaDocument::from_value(value)
}

/// Load a JSON schema document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the server
/// answers with an error status, and a parse error if the body isn't a
/// schema document.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<SchemaDocument, LoadError> {
    let network_error = |source: reqwest::Error| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    let response = client.get(url).send().map_err(network_error)?;

    // Check for HTTP errors before parsing
    let response = response.error_for_status().map_err(network_error)?;

    let body = response.text().map_err(network_error)?;
    tracing::debug!(url, bytes = body.len(), "fetched schema document");
    load_document_str(&body, SchemaFormat::Json)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a schema document from a file path or URL.
///
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_document_auto(source: &str) -> Result<SchemaDocument, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}
