//! Native filesystem provider using `tokio::fs`.

use std::path::Path;
use tokio::fs;

use crate::error::{TrustGuardError, TrustGuardResult};

/// Native filesystem provider using `tokio::fs` for async file operations.
#[derive(Debug, Clone)]
pub struct NativeFileSystemProvider;

impl NativeFileSystemProvider {
    /// Read the entire contents of a file as a UTF-8 string.
    pub async fn read_file(path: impl AsRef<Path>) -> TrustGuardResult<String> {
        fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| TrustGuardError::file_system("read", path.as_ref(), e))
    }
}
