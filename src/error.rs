//! Error types for medir.

use std::path::PathBuf;

/// Result type alias for medir operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in medir operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// The path where the error occurred, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Arrow error during data processing.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error during file operations.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Dataset has no rows or no batches.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Schema mismatch between batches.
    #[error("Schema mismatch: {message}")]
    SchemaMismatch {
        /// Description of the schema mismatch.
        message: String,
    },

    /// Columns supplied to a dataset load have differing lengths.
    #[error("Column '{column}' has length {actual}, expected {expected}")]
    InconsistentColumnLength {
        /// The offending column name.
        column: String,
        /// The length established by the first column.
        expected: usize,
        /// The offending column's actual length.
        actual: usize,
    },

    /// A column name appears more than once in a dataset load.
    #[error("Duplicate column name '{name}'")]
    DuplicateColumn {
        /// The repeated column name.
        name: String,
    },

    /// Referenced column does not exist in the dataset.
    #[error("Column '{name}' not found in dataset")]
    ColumnNotFound {
        /// The name of the missing column.
        name: String,
    },

    /// Group-by column does not exist in the dataset.
    #[error("Group column '{name}' not found in dataset")]
    UnknownGroupColumn {
        /// The name of the missing group column.
        name: String,
    },

    /// Rule name rejected at bind time (empty or already bound).
    #[error("Invalid rule name '{name}': {reason}")]
    InvalidRuleName {
        /// The rejected rule name.
        name: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// Expression references a name found neither in the dataset's columns
    /// nor in the rule's captured scope.
    #[error("Rule '{rule}': unresolved identifier '{identifier}'")]
    UnresolvedIdentifier {
        /// The rule whose expression failed to resolve.
        rule: String,
        /// The identifier that could not be resolved.
        identifier: String,
    },

    /// Expression cannot be evaluated (type mismatch, unsupported operation,
    /// kernel failure).
    #[error("Rule '{rule}': malformed expression: {message}")]
    MalformedExpression {
        /// The rule whose expression failed to evaluate.
        rule: String,
        /// Description of the evaluation failure.
        message: String,
    },

    /// Rule evaluation exceeded the configured per-rule budget.
    #[error("Rule '{rule}': evaluation timed out after {timeout_ms}ms")]
    EvaluationTimeout {
        /// The rule that timed out.
        rule: String,
        /// The configured budget in milliseconds.
        timeout_ms: u64,
    },

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },
}

impl Error {
    /// Create an I/O error with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Create an I/O error without path context.
    pub fn io_no_path(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }

    /// Create a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Create a column not found error.
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    /// Create an invalid rule name error.
    pub fn invalid_rule_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRuleName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an unresolved identifier error.
    pub fn unresolved_identifier(rule: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::UnresolvedIdentifier {
            rule: rule.into(),
            identifier: identifier.into(),
        }
    }

    /// Create a malformed expression error.
    pub fn malformed_expression(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedExpression {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}
