//! Operations over policy documents stored on disk.

use std::path::Path;

use log::info;
use serde_json::Value;

use crate::error::TrustGuardResult;
use crate::providers::{FileSystemProvider, JsonProvider};
use crate::scp::{ScpValidator, ValidationReport};
use crate::trust::classify;
use crate::types::RoleReport;

/// Read and decode an SCP file without assuming anything about its shape.
pub async fn load_scp_file(path: &Path) -> TrustGuardResult<Value> {
    let content = FileSystemProvider::read_file(path).await?;
    JsonProvider::parse_to_value(&content, &format!("policy file '{}'", path.display()))
}

/// Validate an SCP file against the built-in schema.
///
/// The schema is compiled before the file is read, so a broken schema is
/// reported even when the file is also unreadable.
pub async fn validate_scp_file(path: &Path) -> TrustGuardResult<ValidationReport> {
    let validator = ScpValidator::new()?;
    let document = load_scp_file(path).await?;
    let report = validator.validate(&document);
    info!("{}: {}", path.display(), report.summary());
    Ok(report)
}

/// Classify a trust policy stored in a file.
///
/// `role_name` defaults to the file stem (`deploy-role.json` -> `deploy-role`).
pub async fn analyze_trust_policy_file(
    path: &Path,
    role_name: Option<&str>,
    own_account_id: &str,
) -> TrustGuardResult<RoleReport> {
    let content = FileSystemProvider::read_file(path).await?;
    let document =
        JsonProvider::parse_document(&content, &format!("trust policy file '{}'", path.display()))?;

    let role_name = role_name.map(str::to_string).unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    });

    let findings = classify(&document, &role_name, own_account_id);
    info!("{}: {} finding(s)", role_name, findings.len());
    Ok(RoleReport {
        role_name,
        arn: None,
        findings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrustGuardError;
    use crate::types::RiskLevel;
    use tempfile::TempDir;

    async fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_validate_scp_file() {
        let dir = TempDir::new().unwrap();
        let valid = write(
            &dir,
            "valid.json",
            r#"{"Version": "2012-10-17", "Statement": [{"Effect": "Deny", "Action": "*", "Resource": "*"}]}"#,
        )
        .await;
        let invalid = write(&dir, "invalid.json", r#"{"Statement": "nope"}"#).await;

        assert!(validate_scp_file(&valid).await.unwrap().is_valid());
        let report = validate_scp_file(&invalid).await.unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.errors()[0].location, "<root>");
    }

    #[tokio::test]
    async fn test_malformed_json_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.json", "{\"Version\": ").await;

        let err = validate_scp_file(&path).await.unwrap_err();
        assert!(matches!(err, TrustGuardError::JsonParsing { .. }));
    }

    #[tokio::test]
    async fn test_analyze_trust_policy_file_defaults_role_name_to_stem() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "deploy-role.json",
            r#"{"Version": "2012-10-17", "Statement": [{"Effect": "Allow", "Principal": {"Service": "codebuild.amazonaws.com"}, "Action": "sts:AssumeRole"}]}"#,
        )
        .await;

        let report = analyze_trust_policy_file(&path, None, "123456789012")
            .await
            .unwrap();
        assert_eq!(report.role_name, "deploy-role");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].role, "deploy-role");
        assert_eq!(report.findings[0].risk, RiskLevel::Low);

        let named = analyze_trust_policy_file(&path, Some("ci"), "123456789012")
            .await
            .unwrap();
        assert_eq!(named.findings[0].role, "ci");
    }
}
