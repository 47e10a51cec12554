//! A project document on disk.
//!
//! The results framework is stored as one field of a larger project record
//! whose other attributes (budget, dates, team, ...) belong to the
//! surrounding application. Those attributes are carried through untouched.

use std::{
    fs::File,
    io::{self, BufReader},
    path::Path,
};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{IdSource, ResultsFramework, normalize};

/// Key under which the framework is stored in the project record.
pub const FRAMEWORK_KEY: &str = "resultsFramework";

/// A project record with its embedded results framework.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectDocument {
    #[serde(rename = "resultsFramework")]
    framework: ResultsFramework,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

/// Errors that can occur when loading a project document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentLoadError {
    /// The document file does not exist.
    #[error("project document not found")]
    NotFound,
    /// The document could not be read.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The document is not valid JSON.
    #[error("invalid project document: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProjectDocument {
    /// A document holding only a framework.
    #[must_use]
    pub fn new(framework: ResultsFramework) -> Self {
        Self {
            framework,
            attributes: Map::new(),
        }
    }

    /// Builds a document from a loosely typed project record.
    ///
    /// The embedded framework passes through the normalization gate. A
    /// record that is not a JSON object yields a document with no other
    /// attributes.
    #[must_use]
    pub fn from_value<I: IdSource + ?Sized>(value: Value, ids: &mut I) -> Self {
        let mut attributes = match value {
            Value::Object(map) => map,
            other => {
                tracing::warn!("project document is not an object ({other}), ignoring it");
                Map::new()
            }
        };
        let raw = attributes.remove(FRAMEWORK_KEY).unwrap_or(Value::Null);
        Self {
            framework: normalize::normalize(&raw, ids),
            attributes,
        }
    }

    /// Reads and normalizes a document from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be read, or is
    /// not valid JSON.
    pub fn load<I: IdSource + ?Sized>(path: &Path, ids: &mut I) -> Result<Self, DocumentLoadError> {
        let file = File::open(path).map_err(|io_error| match io_error.kind() {
            io::ErrorKind::NotFound => DocumentLoadError::NotFound,
            _ => DocumentLoadError::Io(io_error),
        })?;
        let value: Value = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self::from_value(value, ids))
    }

    /// The embedded framework.
    #[must_use]
    pub const fn framework(&self) -> &ResultsFramework {
        &self.framework
    }

    /// Replaces the embedded framework.
    pub fn set_framework(&mut self, framework: ResultsFramework) {
        self.framework = framework;
    }

    /// The project attributes other than the framework.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// The full project record as JSON.
    ///
    /// # Panics
    ///
    /// Panics if serialization fails, which cannot happen for this data
    /// structure.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("this must never fail")
    }
}
