//! AWS SDK integration: IAM role enumeration and caller identity.
//!
//! The SDK clients are wrapped behind two small traits so the service layer
//! and its tests never depend on ambient credentials.

pub(crate) mod iam_client;
pub(crate) mod sts;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::RoleTrustPolicy;

pub use iam_client::{decode_trust_policy, AwsIamClient};
pub use sts::AwsStsClient;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("AWS configuration error: {0}")]
    ConfigError(String),
    #[error("IAM client error: {0}")]
    IamError(String),
    #[error("Policy document error: {0}")]
    PolicyError(String),
    #[error("AWS SDK error: {0}")]
    SdkError(String),
}

pub type AwsResult<T> = Result<T, AwsError>;

/// Source of the roles to audit.
#[async_trait]
pub trait RoleSource: Send + Sync {
    /// Every role in the account together with its decoded trust policy.
    async fn list_role_trust_policies(&self) -> AwsResult<Vec<RoleTrustPolicy>>;
}

/// Identity of the account the audit runs in.
#[async_trait]
pub trait AccountIdentity: Send + Sync {
    async fn caller_account_id(&self) -> AwsResult<String>;
}
