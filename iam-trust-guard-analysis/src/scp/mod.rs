//! Structural validation of Service Control Policy documents.

pub mod schema;
pub mod validator;

pub use schema::scp_schema;
pub use validator::{validate_scp, ScpValidator, ValidationError, ValidationReport};
