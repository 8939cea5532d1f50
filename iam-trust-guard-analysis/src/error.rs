//! Error handling module

use std::path::PathBuf;
use thiserror::Error;

use crate::aws::AwsError;

/// Result type alias for operations that can fail with `TrustGuardError`
pub type TrustGuardResult<T> = std::result::Result<T, TrustGuardError>;

/// Fatal errors raised at the edges of the analysis pipelines.
///
/// Data-shape variations inside a policy document are never reported through
/// this type: the classifier normalizes them and the validator reports them as
/// [`ValidationError`](crate::ValidationError) values. Everything here means the
/// input could not be analyzed at all.
#[derive(Error, Debug)]
pub enum TrustGuardError {
    /// File system operation errors with detailed context
    #[error("File system error during {operation} on path '{path}': {source}")]
    FileSystem {
        /// The operation that failed (e.g., "read")
        operation: String,
        /// The file path involved in the operation
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing errors with context
    #[error("JSON parsing error in {context}: {source}")]
    JsonParsing {
        /// What was being parsed (e.g., "trust policy for role 'deploy'")
        context: String,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The schema handed to the structural validator is itself malformed
    #[error("Schema error: the provided schema is invalid: {0}")]
    InvalidSchema(String),

    /// Failure talking to AWS
    #[error(transparent)]
    Aws(#[from] AwsError),
}

impl TrustGuardError {
    /// Create a file system error with context
    pub fn file_system(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a JSON parsing error with context
    pub fn json_parsing(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonParsing {
            context: context.into(),
            source,
        }
    }
}
