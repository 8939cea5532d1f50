//! Risk classification of the principals allowed to assume a role.
//!
//! Only `Allow` statements granting `sts:AssumeRole` are considered. Each
//! principal in such a statement is classified independently:
//!
//! | Principal                              | Risk   |
//! | -------------------------------------- | ------ |
//! | `*` (whole principal or an identifier) | HIGH   |
//! | AWS value that is not an IAM ARN       | MEDIUM |
//! | Root of another account                | MEDIUM |
//! | Specific IAM user or role              | LOW    |
//! | Service or federated principal         | LOW    |
//! | Root of the caller's own account       | none   |
//!
//! Findings come out in statement order, then principal key order, then
//! identifier order. Nothing is deduplicated.

use log::debug;
use rayon::prelude::*;

use crate::types::{
    Finding, PolicyDocument, Principal, PrincipalType, RiskLevel, RoleReport, RoleTrustPolicy,
    Statement,
};

const IAM_ARN_PREFIX: &str = "arn:aws:iam::";
const ROOT_SUFFIX: &str = ":root";
const WILDCARD: &str = "*";
const WILDCARD_REASON: &str = "Principal is wildcard '*'";

/// Classify every assumable principal of a trust policy.
///
/// `own_account_id` is the account the audit runs in; its root principal is
/// trusted and produces no finding.
pub fn classify(document: &PolicyDocument, role: &str, own_account_id: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (index, statement) in document.statements.iter().enumerate() {
        if !statement.allows_assume_role() {
            debug!("{role}: statement {index} does not allow sts:AssumeRole, skipping");
            continue;
        }
        classify_statement(statement, role, own_account_id, &mut findings);
    }
    findings
}

fn classify_statement(
    statement: &Statement,
    role: &str,
    own_account_id: &str,
    findings: &mut Vec<Finding>,
) {
    match &statement.principal {
        Some(Principal::Wildcard) => {
            findings.push(Finding::new(role, RiskLevel::High, WILDCARD_REASON));
        }
        Some(Principal::Typed(entries)) => {
            for entry in entries {
                for identifier in &entry.identifiers {
                    if let Some((risk, reason)) =
                        classify_principal(&entry.principal_type, identifier, own_account_id)
                    {
                        findings.push(Finding::new(role, risk, reason));
                    }
                }
            }
        }
        Some(Principal::Unrecognized(value)) => {
            debug!("{role}: unrecognized principal value '{value}', not classified");
        }
        None => {
            debug!("{role}: assume role statement without a principal");
        }
    }
}

/// Classify a single principal identifier. `None` means the principal is
/// trusted or of a type this audit does not rate.
fn classify_principal(
    principal_type: &PrincipalType,
    identifier: &str,
    own_account_id: &str,
) -> Option<(RiskLevel, String)> {
    if identifier == WILDCARD {
        return Some((RiskLevel::High, WILDCARD_REASON.to_string()));
    }

    match principal_type {
        PrincipalType::Aws => classify_aws_principal(identifier, own_account_id),
        PrincipalType::Service | PrincipalType::Federated => Some((
            RiskLevel::Low,
            format!("{principal_type} principal: {identifier}"),
        )),
        // Principal types such as CanonicalUser are left unrated.
        PrincipalType::Other(key) => {
            debug!("principal type '{key}' is not classified: {identifier}");
            None
        }
    }
}

fn classify_aws_principal(identifier: &str, own_account_id: &str) -> Option<(RiskLevel, String)> {
    if !identifier.starts_with(IAM_ARN_PREFIX) {
        return Some((
            RiskLevel::Medium,
            format!("Unusual AWS principal format: {identifier}"),
        ));
    }

    if !identifier.ends_with(ROOT_SUFFIX) {
        return Some((
            RiskLevel::Low,
            format!("Specific user or role in AWS principal: {identifier}"),
        ));
    }

    let account_id = root_account_id(identifier);
    if account_id == own_account_id {
        None
    } else {
        Some((
            RiskLevel::Medium,
            format!("External AWS account: {account_id}"),
        ))
    }
}

/// `arn:aws:iam::123456789012:root` -> `123456789012`
fn root_account_id(arn: &str) -> &str {
    arn.split("::")
        .nth(1)
        .and_then(|rest| rest.split(':').next())
        .unwrap_or_default()
}

/// Classify a batch of roles. Roles are independent, so the work is spread
/// across the rayon pool; reports keep the input order.
pub fn classify_roles(roles: &[RoleTrustPolicy], own_account_id: &str) -> Vec<RoleReport> {
    roles
        .par_iter()
        .map(|role| RoleReport {
            role_name: role.role_name.clone(),
            arn: role.arn.clone(),
            findings: classify(&role.document, &role.role_name, own_account_id),
        })
        .collect()
}

/// Keep findings whose risk is at least `min_risk`.
pub fn filter_findings(findings: &[Finding], min_risk: RiskLevel) -> Vec<Finding> {
    findings
        .iter()
        .filter(|f| f.risk >= min_risk)
        .cloned()
        .collect()
}
