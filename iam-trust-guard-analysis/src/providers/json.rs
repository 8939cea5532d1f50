//! Native JSON provider implementation using `serde_json`.

use serde::{Deserialize, Serialize};

use crate::error::{TrustGuardError, TrustGuardResult};
use crate::types::PolicyDocument;

/// Native JSON provider. All operations are stateless.
#[derive(Debug, Clone)]
pub struct NativeJsonProvider;

impl NativeJsonProvider {
    /// Parse JSON to a generic `serde_json::Value`.
    ///
    /// The structural validator works on raw values, so nothing about the
    /// document's shape is assumed here.
    pub fn parse_to_value(json_str: &str, context: &str) -> TrustGuardResult<serde_json::Value> {
        Self::parse(json_str, context)
    }

    /// Parse a trust policy or SCP into the typed policy model.
    pub fn parse_document(json_str: &str, context: &str) -> TrustGuardResult<PolicyDocument> {
        Self::parse(json_str, context)
    }

    /// Parse a JSON string into a typed value.
    pub fn parse<T>(json_str: &str, context: &str) -> TrustGuardResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        serde_json::from_str(json_str).map_err(|e| TrustGuardError::json_parsing(context, e))
    }

    /// Serialize a value to compact JSON.
    pub fn stringify<T>(value: &T) -> TrustGuardResult<String>
    where
        T: ?Sized + Serialize,
    {
        serde_json::to_string(value).map_err(|e| TrustGuardError::json_parsing("serialization", e))
    }

    /// Serialize a value to pretty-printed JSON.
    pub fn stringify_pretty<T>(value: &T) -> TrustGuardResult<String>
    where
        T: ?Sized + Serialize,
    {
        serde_json::to_string_pretty(value)
            .map_err(|e| TrustGuardError::json_parsing("serialization", e))
    }
}

#[cfg(test)]
mod tests {
    use crate::providers::JsonProvider;
    use crate::types::{Finding, RiskLevel};

    use super::*;

    #[test]
    fn test_parse_document() {
        let doc = JsonProvider::parse_document(
            r#"{"Version": "2012-10-17", "Statement": [{"Effect": "Allow", "Principal": "*", "Action": "sts:AssumeRole"}]}"#,
            "test",
        )
        .unwrap();
        assert_eq!(doc.version.as_deref(), Some("2012-10-17"));
        assert_eq!(doc.statements.len(), 1);
    }

    #[test]
    fn test_invalid_json_carries_context() {
        let err = JsonProvider::parse_to_value("{not json", "policy file 'scp.json'").unwrap_err();
        assert!(matches!(err, TrustGuardError::JsonParsing { .. }));
        assert!(err.to_string().contains("policy file 'scp.json'"));
    }

    #[test]
    fn test_stringify_finding() {
        let finding = Finding::new("deploy", RiskLevel::Medium, "External AWS account: 444455556666");
        let compact = JsonProvider::stringify(&finding).unwrap();
        assert_eq!(
            compact,
            r#"{"Role":"deploy","Risk":"MEDIUM","Reason":"External AWS account: 444455556666"}"#
        );
        let pretty = JsonProvider::stringify_pretty(&finding).unwrap();
        assert!(pretty.contains('\n'));
    }
}
