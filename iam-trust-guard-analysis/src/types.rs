//! Shared data model: policy documents as read from IAM, and the findings
//! produced by the trust policy audit.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The action that makes a trust policy statement relevant to the audit.
pub const ASSUME_ROLE_ACTION: &str = "sts:AssumeRole";

/// IAM accepts either a single value or a list for several fields. Both forms
/// are collapsed into a `Vec` at deserialization time.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(values) => values,
            OneOrMany::One(value) => vec![value],
        }
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    OneOrMany::deserialize(deserializer).map(Vec::from)
}

/// A parsed IAM policy document (trust policy or SCP).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    #[serde(default)]
    pub version: Option<String>,
    /// Missing `Statement` deserializes to no statements.
    #[serde(default, rename = "Statement", deserialize_with = "one_or_many")]
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// A single policy statement. Fields not used by either pipeline
/// (`NotAction`, `NotPrincipal`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub effect: Option<Effect>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub action: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub resource: Vec<String>,
    #[serde(default)]
    pub condition: Option<serde_json::Value>,
    #[serde(default)]
    pub principal: Option<Principal>,
}

impl Statement {
    /// True when this statement grants `sts:AssumeRole`.
    pub fn allows_assume_role(&self) -> bool {
        self.effect == Some(Effect::Allow) && self.action.iter().any(|a| a == ASSUME_ROLE_ACTION)
    }
}

/// Principal type keys of a `Principal` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrincipalType {
    Aws,
    Service,
    Federated,
    /// Any other key (e.g. `CanonicalUser`), kept verbatim.
    Other(String),
}

impl From<&str> for PrincipalType {
    fn from(key: &str) -> Self {
        match key {
            "AWS" => Self::Aws,
            "Service" => Self::Service,
            "Federated" => Self::Federated,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aws => f.write_str("AWS"),
            Self::Service => f.write_str("Service"),
            Self::Federated => f.write_str("Federated"),
            Self::Other(key) => f.write_str(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalEntry {
    pub principal_type: PrincipalType,
    pub identifiers: Vec<String>,
}

/// The `Principal` element of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// `"Principal": "*"`
    Wildcard,
    /// `"Principal": {"AWS": ..., "Service": ...}` in document key order.
    Typed(Vec<PrincipalEntry>),
    /// A bare string other than `"*"`. IAM rejects these, so they carry no risk
    /// classification.
    Unrecognized(String),
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PrincipalVisitor;

        impl<'de> Visitor<'de> for PrincipalVisitor {
            type Value = Principal;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("\"*\" or a map of principal type to principal identifiers")
            }

            fn visit_str<E>(self, value: &str) -> Result<Principal, E>
            where
                E: de::Error,
            {
                if value == "*" {
                    Ok(Principal::Wildcard)
                } else {
                    Ok(Principal::Unrecognized(value.to_string()))
                }
            }

            // Finding order follows key order, so entries are kept as a list.
            fn visit_map<A>(self, mut map: A) -> Result<Principal, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(key) = map.next_key::<String>()? {
                    let identifiers: OneOrMany<String> = map.next_value()?;
                    entries.push(PrincipalEntry {
                        principal_type: PrincipalType::from(key.as_str()),
                        identifiers: identifiers.into(),
                    });
                }
                Ok(Principal::Typed(entries))
            }
        }

        deserializer.deserialize_any(PrincipalVisitor)
    }
}

/// Severity of a trust policy finding, ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.pad("LOW"),
            Self::Medium => f.pad("MEDIUM"),
            Self::High => f.pad("HIGH"),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "invalid risk level '{other}', expected one of: low, medium, high"
            )),
        }
    }
}

/// One risk classification for one principal of one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Finding {
    pub role: String,
    pub risk: RiskLevel,
    pub reason: String,
}

impl Finding {
    pub fn new(role: impl Into<String>, risk: RiskLevel, reason: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            risk,
            reason: reason.into(),
        }
    }
}

/// A role together with its decoded trust policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleTrustPolicy {
    pub role_name: String,
    pub arn: Option<String>,
    pub document: PolicyDocument,
}

/// Findings for a single role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleReport {
    pub role_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    pub findings: Vec<Finding>,
}

/// Result of auditing every role in an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuditReport {
    pub account_id: String,
    pub roles: Vec<RoleReport>,
}

impl AuditReport {
    /// All findings in role order.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.roles.iter().flat_map(|r| r.findings.iter())
    }

    pub fn count_by_risk(&self, risk: RiskLevel) -> usize {
        self.findings().filter(|f| f.risk == risk).count()
    }

    pub fn highest_risk(&self) -> Option<RiskLevel> {
        self.findings().map(|f| f.risk).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_statement_object_is_normalized() {
        let doc: PolicyDocument = serde_json::from_value(json!({
            "Version": "2012-10-17",
            "Statement": {
                "Effect": "Allow",
                "Principal": {"Service": "ec2.amazonaws.com"},
                "Action": "sts:AssumeRole"
            }
        }))
        .unwrap();

        assert_eq!(doc.statements.len(), 1);
        assert_eq!(doc.statements[0].action, vec!["sts:AssumeRole"]);
        assert!(doc.statements[0].allows_assume_role());
    }

    #[test]
    fn test_missing_statement_is_empty() {
        let doc: PolicyDocument = serde_json::from_value(json!({"Version": "2012-10-17"})).unwrap();
        assert!(doc.statements.is_empty());
    }

    #[test]
    fn test_unused_top_level_fields_are_ignored() {
        let doc: PolicyDocument = serde_json::from_value(json!({
            "Version": "2012-10-17",
            "Id": "trust-policy-1",
            "Statement": []
        }))
        .unwrap();
        assert_eq!(doc, PolicyDocument {
            version: Some("2012-10-17".to_string()),
            statements: vec![],
        });
    }

    #[test]
    fn test_principal_keeps_document_order() {
        let principal: Principal = serde_json::from_str(
            r#"{"Service": "lambda.amazonaws.com", "AWS": ["arn:aws:iam::111122223333:root", "*"], "Federated": "cognito-identity.amazonaws.com"}"#,
        )
        .unwrap();

        let Principal::Typed(entries) = principal else {
            panic!("expected typed principal");
        };
        let types: Vec<_> = entries.iter().map(|e| e.principal_type.clone()).collect();
        assert_eq!(
            types,
            vec![PrincipalType::Service, PrincipalType::Aws, PrincipalType::Federated]
        );
        assert_eq!(entries[1].identifiers.len(), 2);
        assert_eq!(entries[0].identifiers, vec!["lambda.amazonaws.com"]);
    }

    #[test]
    fn test_wildcard_and_unrecognized_principal_strings() {
        let wildcard: Principal = serde_json::from_str(r#""*""#).unwrap();
        assert_eq!(wildcard, Principal::Wildcard);

        let odd: Principal = serde_json::from_str(r#""arn:aws:iam::111122223333:root""#).unwrap();
        assert!(matches!(odd, Principal::Unrecognized(_)));
    }

    #[test]
    fn test_other_principal_type_is_preserved() {
        assert_eq!(
            PrincipalType::from("CanonicalUser"),
            PrincipalType::Other("CanonicalUser".to_string())
        );
        assert_eq!(PrincipalType::from("CanonicalUser").to_string(), "CanonicalUser");
        assert_eq!(PrincipalType::Aws.to_string(), "AWS");
    }

    #[test]
    fn test_deny_never_allows_assume_role() {
        let stmt: Statement = serde_json::from_value(json!({
            "Effect": "Deny",
            "Principal": "*",
            "Action": ["sts:AssumeRole"]
        }))
        .unwrap();
        assert!(!stmt.allows_assume_role());

        let no_effect: Statement =
            serde_json::from_value(json!({"Action": "sts:AssumeRole"})).unwrap();
        assert!(!no_effect.allows_assume_role());
    }

    #[test]
    fn test_risk_level_ordering_and_parsing() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!("HIGH".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert_eq!("medium".parse::<RiskLevel>().unwrap(), RiskLevel::Medium);
        assert!("critical".parse::<RiskLevel>().is_err());
        assert_eq!(serde_json::to_string(&RiskLevel::Low).unwrap(), r#""LOW""#);
    }

    #[test]
    fn test_audit_report_counts() {
        let report = AuditReport {
            account_id: "123456789012".to_string(),
            roles: vec![
                RoleReport {
                    role_name: "a".to_string(),
                    arn: None,
                    findings: vec![
                        Finding::new("a", RiskLevel::Low, "x"),
                        Finding::new("a", RiskLevel::High, "y"),
                    ],
                },
                RoleReport {
                    role_name: "b".to_string(),
                    arn: None,
                    findings: vec![Finding::new("b", RiskLevel::Low, "z")],
                },
            ],
        };

        assert_eq!(report.count_by_risk(RiskLevel::Low), 2);
        assert_eq!(report.count_by_risk(RiskLevel::Medium), 0);
        assert_eq!(report.highest_risk(), Some(RiskLevel::High));
        assert_eq!(report.findings().count(), 3);
    }
}
