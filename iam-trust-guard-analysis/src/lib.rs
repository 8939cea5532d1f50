//! This crate provides the core business logic for IAM Trust Guard:
//! - Risk classification of the principals allowed to assume a role
//! - Structural validation of Service Control Policies
//! - Role enumeration and caller identity through the AWS SDK
//!

mod aws;
pub mod commands;
mod error;
mod providers;
pub mod scp;
pub mod trust;
mod types;

// Re-exports for a small, focused public API
pub use aws::{
    decode_trust_policy, AccountIdentity, AwsError, AwsIamClient, AwsResult, AwsStsClient,
    RoleSource,
};
pub use commands::{
    analyze_trust_policy_file, load_scp_file, validate_scp_file, AwsOptions, TrustGuardService,
};
pub use error::{TrustGuardError, TrustGuardResult};
pub use providers::{FileSystemProvider, JsonProvider};
pub use scp::{scp_schema, validate_scp, ScpValidator, ValidationError, ValidationReport};
pub use trust::{classify, classify_roles, filter_findings};
pub use types::{
    AuditReport, Effect, Finding, PolicyDocument, Principal, PrincipalEntry, PrincipalType,
    RiskLevel, RoleReport, RoleTrustPolicy, Statement, ASSUME_ROLE_ACTION,
};
