//! Trust policy principal risk classification (pure Rust)

pub mod classifier;

pub use classifier::{classify, classify_roles, filter_findings};
