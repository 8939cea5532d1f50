//! Schema validation of SCP documents backed by the `jsonschema` crate.
//!
//! Validation is exhaustive: every violation in the document is collected,
//! not only the first one. Violations are sorted by their location in the
//! document so repeated runs over the same input produce the same report.
//!
//! A schema that does not compile is a configuration problem rather than a
//! property of the document, so it surfaces as
//! [`TrustGuardError::InvalidSchema`] before any document is looked at.

use std::cmp::Ordering;
use std::fmt;

use jsonschema::{Draft, Validator};
use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::error::{TrustGuardError, TrustGuardResult};
use crate::scp::schema::scp_schema;

/// Location marker used for violations on the document root.
pub const ROOT_LOCATION: &str = "<root>";

/// One step of a path into a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum PathSegment {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

/// Split a JSON Pointer (`/Statement/0/Effect`) into its segments.
fn pointer_segments(pointer: &str) -> Vec<PathSegment> {
    pointer
        .split('/')
        .skip(1)
        .map(|raw| {
            let token = raw.replace("~1", "/").replace("~0", "~");
            match token.parse::<usize>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => PathSegment::Key(token),
            }
        })
        .collect()
}

/// A single structural violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationError {
    /// Dot-joined path from the document root, or `<root>`.
    pub location: String,
    pub message: String,
    #[serde(skip)]
    path: Vec<PathSegment>,
}

impl ValidationError {
    fn from_pointer(pointer: &str, message: String) -> Self {
        let path = pointer_segments(pointer);
        let location = if path.is_empty() {
            ROOT_LOCATION.to_string()
        } else {
            path.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(".")
        };
        Self {
            location,
            message,
            path,
        }
    }

    fn cmp_path(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Outcome of validating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Violations ordered by location.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// One-line verdict for the report.
    pub fn summary(&self) -> String {
        if self.is_valid() {
            "Validation successful: JSON structure is valid.".to_string()
        } else {
            format!("Validation failed: {} issue(s) found.", self.errors.len())
        }
    }
}

/// A compiled SCP schema.
///
/// Compilation happens once; the validator can then be reused for any number
/// of documents and shared across threads.
pub struct ScpValidator {
    validator: Validator,
}

impl ScpValidator {
    /// Compile the built-in SCP schema.
    pub fn new() -> TrustGuardResult<Self> {
        Self::with_schema(&scp_schema())
    }

    /// Compile an arbitrary Draft 7 schema.
    ///
    /// # Errors
    ///
    /// Returns [`TrustGuardError::InvalidSchema`] if the schema itself is not
    /// a valid Draft 7 schema.
    pub fn with_schema(schema: &Value) -> TrustGuardResult<Self> {
        let mut opts = jsonschema::options();
        opts.with_draft(Draft::Draft7);
        let validator = opts
            .build(schema)
            .map_err(|e| TrustGuardError::InvalidSchema(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Validate a raw JSON document and collect every violation.
    pub fn validate(&self, document: &Value) -> ValidationReport {
        let mut errors: Vec<ValidationError> = self
            .validator
            .iter_errors(document)
            .map(|e| ValidationError::from_pointer(&e.instance_path.to_string(), e.to_string()))
            .collect();
        errors.sort_by(ValidationError::cmp_path);
        debug!("SCP validation produced {} violation(s)", errors.len());
        ValidationReport { errors }
    }
}

/// Validate a document against the built-in SCP schema.
pub fn validate_scp(document: &Value) -> TrustGuardResult<ValidationReport> {
    Ok(ScpValidator::new()?.validate(document))
}
