//! IAM Trust Guard Service Layer
//!
//! The service holds the collaborators that talk to AWS and exposes the
//! account-level operations used by the CLI. Collaborators are injected, so
//! callers (and tests) decide where roles and the account identity come from.

use aws_config::{BehaviorVersion, Region};
use log::debug;

use crate::aws::{AccountIdentity, AwsError, AwsIamClient, AwsStsClient, RoleSource};
use crate::error::TrustGuardResult;

/// Overrides applied on top of the standard AWS configuration chain.
#[derive(Debug, Clone, Default)]
pub struct AwsOptions {
    /// Named profile from the shared config files.
    pub profile: Option<String>,
    /// Region to send IAM and STS requests to.
    pub region: Option<String>,
}

/// Main service struct that holds AWS collaborators and provides business logic operations
pub struct TrustGuardService {
    pub(crate) role_source: Box<dyn RoleSource>,
    pub(crate) identity: Box<dyn AccountIdentity>,
}

impl TrustGuardService {
    /// Create a new service instance backed by the AWS SDK.
    ///
    /// The configuration is loaded using the default credential provider
    /// chain, with the profile and region overrides from `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is empty.
    pub async fn new(options: &AwsOptions) -> TrustGuardResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &options.profile {
            if profile.is_empty() {
                return Err(AwsError::ConfigError("profile name must not be empty".into()).into());
            }
            debug!("Using AWS profile '{profile}'");
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &options.region {
            if region.is_empty() {
                return Err(AwsError::ConfigError("region must not be empty".into()).into());
            }
            debug!("Using AWS region '{region}'");
            loader = loader.region(Region::new(region.clone()));
        }
        let config = loader.load().await;

        Ok(Self::with_collaborators(
            Box::new(AwsIamClient::new(aws_sdk_iam::Client::new(&config))),
            Box::new(AwsStsClient::new(aws_sdk_sts::Client::new(&config))),
        ))
    }

    /// Create a service from explicit collaborators.
    pub fn with_collaborators(
        role_source: Box<dyn RoleSource>,
        identity: Box<dyn AccountIdentity>,
    ) -> Self {
        Self {
            role_source,
            identity,
        }
    }

    // audit_account() and resolve_account_id() are implemented in audit.rs
}
