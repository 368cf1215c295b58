//! Error types for stmtkit

use crate::qb::StatementType;
use thiserror::Error;

/// Result type alias for stmtkit operations
pub type QbResult<T> = Result<T, QbError>;

/// Error types for statement construction and execution
#[derive(Debug, Error)]
pub enum QbError {
    /// Two joins (or two FROM sources) resolve to the same alias
    #[error("Alias \"{0}\" is not unique")]
    DuplicateAlias(String),

    /// A join is attached to an alias no FROM source or join introduces
    #[error("Alias of {0} does not exist")]
    UnknownAlias(String),

    /// INSERT/UPDATE/DELETE rendered without a target table
    #[error("{0:?} statement has no target table")]
    MissingTarget(StatementType),

    /// Prepare/execute failure reported by the connection
    #[error("Execution error{}: {message}", format_code(.code))]
    Execution { code: Option<i64>, message: String },

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// A bound value could not be serialized during coercion
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl QbError {
    /// Create an execution error, optionally carrying the driver error code
    pub fn execution(code: Option<i64>, message: impl Into<String>) -> Self {
        Self::Execution {
            code,
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this error was raised while rendering SQL
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateAlias(_) | Self::UnknownAlias(_) | Self::MissingTarget(_)
        )
    }

    /// Check if this error came from the connection
    pub fn is_execution_error(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// The alias carried by a build error, if any
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::DuplicateAlias(alias) | Self::UnknownAlias(alias) => Some(alias),
            _ => None,
        }
    }
}

fn format_code(code: &Option<i64>) -> String {
    code.map(|c| format!(" [{c}]")).unwrap_or_default()
}

impl From<serde_json::Error> for QbError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_error_display_includes_code() {
        let err = QbError::execution(Some(1146), "Table 'app.nope' doesn't exist");
        assert_eq!(
            err.to_string(),
            "Execution error [1146]: Table 'app.nope' doesn't exist"
        );
        assert!(err.is_execution_error());
        assert!(!err.is_build_error());
    }

    #[test]
    fn execution_error_display_without_code() {
        let err = QbError::execution(None, "gone away");
        assert_eq!(err.to_string(), "Execution error: gone away");
    }

    #[test]
    fn build_errors_carry_alias() {
        let dup = QbError::DuplicateAlias("o".into());
        let unknown = QbError::UnknownAlias("x".into());
        assert!(dup.is_build_error());
        assert_eq!(dup.alias(), Some("o"));
        assert_eq!(unknown.alias(), Some("x"));
        assert_eq!(dup.to_string(), "Alias \"o\" is not unique");
        assert_eq!(unknown.to_string(), "Alias of x does not exist");
    }

    #[test]
    fn serde_failures_become_serialization_errors() {
        let err: QbError = serde_json::from_str::<u8>("not json").unwrap_err().into();
        assert!(matches!(err, QbError::Serialization(_)));
        assert!(!err.is_build_error());
        assert!(err.to_string().starts_with("Serialization error: "));
    }
}
