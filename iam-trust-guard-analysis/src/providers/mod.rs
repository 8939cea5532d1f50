//! Document loading: reading policy files and decoding JSON.

pub(crate) mod filesystem;
pub(crate) mod json;

/// Type alias for the filesystem provider implementation.
pub type FileSystemProvider = filesystem::NativeFileSystemProvider;

/// Type alias for the JSON provider implementation.
pub type JsonProvider = json::NativeJsonProvider;
