//! Account-wide trust policy audit

use log::info;

use crate::error::TrustGuardResult;
use crate::trust::classify_roles;
use crate::types::AuditReport;

impl super::service::TrustGuardService {
    /// Determine the account the audit treats as its own.
    ///
    /// An explicit account id wins; otherwise the caller identity is asked
    /// once for the whole run.
    pub async fn resolve_account_id(&self, explicit: Option<&str>) -> TrustGuardResult<String> {
        match explicit {
            Some(account_id) => Ok(account_id.to_string()),
            None => Ok(self.identity.caller_account_id().await?),
        }
    }

    /// Classify the trust policy of every role the role source returns.
    pub async fn audit_account(
        &self,
        explicit_account_id: Option<&str>,
    ) -> TrustGuardResult<AuditReport> {
        let account_id = self.resolve_account_id(explicit_account_id).await?;
        let roles = self.role_source.list_role_trust_policies().await?;
        info!(
            "Auditing trust policies of {} role(s) in account {}",
            roles.len(),
            account_id
        );

        let reports = classify_roles(&roles, &account_id);
        Ok(AuditReport {
            account_id,
            roles: reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::aws::{AccountIdentity, AwsError, AwsResult, RoleSource};
    use crate::commands::TrustGuardService;
    use crate::error::TrustGuardError;
    use crate::types::{PolicyDocument, RiskLevel, RoleTrustPolicy};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StaticRoles(Vec<RoleTrustPolicy>);

    #[async_trait]
    impl RoleSource for StaticRoles {
        async fn list_role_trust_policies(&self) -> AwsResult<Vec<RoleTrustPolicy>> {
            Ok(self.0.clone())
        }
    }

    struct FailingRoles;

    #[async_trait]
    impl RoleSource for FailingRoles {
        async fn list_role_trust_policies(&self) -> AwsResult<Vec<RoleTrustPolicy>> {
            Err(AwsError::IamError("Failed to list roles: AccessDenied".to_string()))
        }
    }

    struct CountingIdentity {
        account_id: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AccountIdentity for CountingIdentity {
        async fn caller_account_id(&self) -> AwsResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.account_id.to_string())
        }
    }

    fn role(name: &str, trust_policy: &str) -> RoleTrustPolicy {
        let document: PolicyDocument = serde_json::from_str(trust_policy).unwrap();
        RoleTrustPolicy {
            role_name: name.to_string(),
            arn: Some(format!("arn:aws:iam::123456789012:role/{name}")),
            document,
        }
    }

    fn sample_roles() -> Vec<RoleTrustPolicy> {
        vec![
            role(
                "admin-from-org",
                r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Principal":{"AWS":"arn:aws:iam::123456789012:root"},"Action":"sts:AssumeRole"}]}"#,
            ),
            role(
                "vendor-access",
                r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Principal":{"AWS":"arn:aws:iam::999988887777:root"},"Action":"sts:AssumeRole"}]}"#,
            ),
            role(
                "open-door",
                r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Principal":"*","Action":"sts:AssumeRole"}]}"#,
            ),
        ]
    }

    fn service(roles: Vec<RoleTrustPolicy>, calls: Arc<AtomicUsize>) -> TrustGuardService {
        TrustGuardService::with_collaborators(
            Box::new(StaticRoles(roles)),
            Box::new(CountingIdentity {
                account_id: "123456789012",
                calls,
            }),
        )
    }

    #[tokio::test]
    async fn test_audit_account_uses_caller_identity_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service(sample_roles(), calls.clone());

        let report = service.audit_account(None).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.account_id, "123456789012");
        assert_eq!(report.roles.len(), 3);
        assert!(report.roles[0].findings.is_empty());
        assert_eq!(
            report.roles[1].findings[0].reason,
            "External AWS account: 999988887777"
        );
        assert_eq!(report.roles[2].findings[0].risk, RiskLevel::High);
        assert_eq!(report.highest_risk(), Some(RiskLevel::High));
    }

    #[tokio::test]
    async fn test_explicit_account_id_skips_identity_lookup() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service(sample_roles(), calls.clone());

        let report = service.audit_account(Some("999988887777")).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.account_id, "999988887777");
        // The org root is now foreign, the vendor root is trusted.
        assert_eq!(
            report.roles[0].findings[0].reason,
            "External AWS account: 123456789012"
        );
        assert!(report.roles[1].findings.is_empty());
    }

    #[tokio::test]
    async fn test_role_source_failure_is_fatal() {
        let service = TrustGuardService::with_collaborators(
            Box::new(FailingRoles),
            Box::new(CountingIdentity {
                account_id: "123456789012",
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        );

        let result = service.audit_account(None).await;
        assert!(matches!(result, Err(TrustGuardError::Aws(AwsError::IamError(_)))));
    }
}
