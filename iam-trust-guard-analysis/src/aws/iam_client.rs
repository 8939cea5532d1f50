//! AWS IAM client wrapper for role enumeration

use async_trait::async_trait;
use aws_sdk_iam::types::Role;
use aws_sdk_iam::Client as IamClient;
use log::{debug, warn};

use crate::aws::{AwsError, AwsResult, RoleSource};
use crate::types::{PolicyDocument, RoleTrustPolicy};

pub struct AwsIamClient {
    client: IamClient,
}

impl AwsIamClient {
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }

    /// List all roles in the account, following `Marker` until IAM reports
    /// the listing is no longer truncated.
    pub async fn list_roles(&self) -> AwsResult<Vec<Role>> {
        let mut roles = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let out = self
                .client
                .list_roles()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| AwsError::IamError(format!("Failed to list roles: {e}")))?;

            roles.extend(out.roles().iter().cloned());
            debug!("Listed {} roles so far", roles.len());

            match out.marker() {
                Some(next) if out.is_truncated() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(roles)
    }
}

#[async_trait]
impl RoleSource for AwsIamClient {
    async fn list_role_trust_policies(&self) -> AwsResult<Vec<RoleTrustPolicy>> {
        role_trust_policies(self.list_roles().await?)
    }
}

/// Decode the trust policy of every listed role, keeping the listing order.
///
/// Roles IAM returns without a trust policy document are skipped; a document
/// that cannot be decoded fails the whole listing.
fn role_trust_policies(roles: Vec<Role>) -> AwsResult<Vec<RoleTrustPolicy>> {
    let mut policies = Vec::with_capacity(roles.len());

    for role in roles {
        let Some(encoded) = role.assume_role_policy_document() else {
            warn!(
                "Role '{}' has no trust policy document, skipping",
                role.role_name()
            );
            continue;
        };
        policies.push(RoleTrustPolicy {
            role_name: role.role_name().to_string(),
            arn: Some(role.arn().to_string()),
            document: decode_trust_policy(role.role_name(), encoded)?,
        });
    }

    Ok(policies)
}

/// Decode a trust policy as returned by IAM.
///
/// IAM returns policy documents URL-encoded; the decoded text is parsed into
/// the policy model.
pub fn decode_trust_policy(role_name: &str, encoded: &str) -> AwsResult<PolicyDocument> {
    let decoded = percent_encoding::percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|e| {
            AwsError::PolicyError(format!(
                "Failed to URL decode trust policy of role '{role_name}': {e}"
            ))
        })?;

    serde_json::from_str(&decoded).map_err(|e| {
        AwsError::PolicyError(format!(
            "Failed to parse trust policy JSON of role '{role_name}': {e}"
        ))
    })
}
