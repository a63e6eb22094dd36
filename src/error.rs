//! Error types for form construction and field access

use thiserror::Error;

/// Result type alias for formflow operations
pub type Result<T> = std::result::Result<T, FormError>;

/// Errors raised while building a form or addressing its fields.
///
/// Validation failures are not errors: they live in the errors store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("no validator configured: call `validate` or `validate_fx`")]
    MissingValidator,

    #[error("`validate` and `validate_fx` are mutually exclusive")]
    ConflictingValidators,

    #[error("async effects need a Tokio runtime, but none is running")]
    RuntimeUnavailable,

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field `{field}` cannot accept a value tagged for `{value_field}`")]
    FieldMismatch {
        field: &'static str,
        value_field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            FormError::UnknownField("email".to_string()).to_string(),
            "unknown field: email"
        );
        assert_eq!(
            FormError::FieldMismatch {
                field: "age",
                value_field: "fullname"
            }
            .to_string(),
            "field `age` cannot accept a value tagged for `fullname`"
        );
    }
}
