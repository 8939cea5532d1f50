//! Commands module - service layer for IAM Trust Guard operations

mod audit;
mod files;
pub(crate) mod service;

pub use files::{analyze_trust_policy_file, load_scp_file, validate_scp_file};
pub use service::{AwsOptions, TrustGuardService};
