//! Built-in JSON Schema for SCP documents.
//!
//! Reference: <https://docs.aws.amazon.com/organizations/latest/userguide/orgs_manage_policies_scps_syntax.html>

use serde_json::{json, Value};

/// The only policy language version SCPs accept.
pub const SCP_POLICY_VERSION: &str = "2012-10-17";

/// Draft 7 schema describing the structure of an SCP.
pub fn scp_schema() -> Value {
    let string_or_string_list = json!({
        "oneOf": [
            {"type": "string"},
            {"type": "array", "items": {"type": "string"}}
        ]
    });

    json!({
        "type": "object",
        "properties": {
            "Version": {
                "type": "string",
                "enum": [SCP_POLICY_VERSION]
            },
            "Statement": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "Sid": {"type": "string"},
                        "Effect": {"type": "string", "enum": ["Deny", "Allow"]},
                        "Action": string_or_string_list.clone(),
                        "Resource": string_or_string_list,
                        "Condition": {"type": "object"}
                    },
                    "required": ["Effect", "Action", "Resource"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["Version", "Statement"],
        "additionalProperties": false
    })
}
