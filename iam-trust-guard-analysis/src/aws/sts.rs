use async_trait::async_trait;
use aws_sdk_sts::operation::get_caller_identity::GetCallerIdentityOutput;
use aws_sdk_sts::Client as StsClient;

use crate::aws::{AccountIdentity, AwsError, AwsResult};

/// Account id of the credentials in use, via STS GetCallerIdentity.
///
/// Root principals of this account are trusted by the audit.
pub async fn caller_account_id(client: &StsClient) -> AwsResult<String> {
    let identity = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| AwsError::SdkError(format!("STS GetCallerIdentity failed: {e}")))?;
    account_from_identity(&identity)
}

fn account_from_identity(identity: &GetCallerIdentityOutput) -> AwsResult<String> {
    identity
        .account()
        .map(str::to_string)
        .ok_or_else(|| AwsError::SdkError("GetCallerIdentity response has no Account".to_string()))
}

/// [`AccountIdentity`] backed by STS.
pub struct AwsStsClient {
    client: StsClient,
}

impl AwsStsClient {
    pub fn new(client: StsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccountIdentity for AwsStsClient {
    async fn caller_account_id(&self) -> AwsResult<String> {
        caller_account_id(&self.client).await
    }
}
