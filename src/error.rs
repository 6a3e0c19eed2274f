// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Error types shared by the scanner and the anonymizer

use thiserror::Error;

use crate::dataset::ColumnKind;

/// Result alias used across the crate
pub type AnonymizeResult<T> = Result<T, AnonymizeError>;

#[derive(Error, Debug)]
pub enum AnonymizeError {
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("unsupported anonymization method '{0}'")]
    UnsupportedMethod(String),

    #[error("invalid parameter for column '{column}': {message}")]
    InvalidParameter { column: String, message: String },

    #[error("method '{method}' cannot be applied to {kind} column '{column}'")]
    UnsupportedColumnType {
        column: String,
        method: String,
        kind: ColumnKind,
    },

    #[error("column '{column}' holds a non-finite number at row {row}")]
    NonFiniteValue { column: String, row: usize },

    #[error("insecure salt rejected in strict mode: {0}")]
    InsecureSalt(String),

    /// Every invalid column of a batch configuration, reported together
    #[error("invalid anonymization config: {}", format_issues(.0))]
    InvalidConfig(Vec<ConfigIssue>),

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RaggedDataset {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("pattern compilation error: {0}")]
    PatternCompilation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnonymizeError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "ANON_COLUMN_NOT_FOUND",
            Self::UnsupportedMethod(_) => "ANON_UNSUPPORTED_METHOD",
            Self::InvalidParameter { .. } => "ANON_INVALID_PARAMETER",
            Self::UnsupportedColumnType { .. } => "ANON_UNSUPPORTED_COLUMN_TYPE",
            Self::NonFiniteValue { .. } => "ANON_NON_FINITE_VALUE",
            Self::InsecureSalt(_) => "ANON_INSECURE_SALT",
            Self::InvalidConfig(_) => "ANON_INVALID_CONFIG",
            Self::RaggedDataset { .. } => "ANON_RAGGED_DATASET",
            Self::PatternCompilation(_) => "ANON_PATTERN_COMPILATION",
            Self::Json(_) => "ANON_JSON",
        }
    }

    /// Issues carried by an aggregated config error, empty otherwise
    pub fn issues(&self) -> &[ConfigIssue] {
        match self {
            Self::InvalidConfig(issues) => issues,
            _ => &[],
        }
    }
}

impl From<regex::Error> for AnonymizeError {
    fn from(e: regex::Error) -> Self {
        Self::PatternCompilation(e.to_string())
    }
}

/// One rejected entry of an anonymization config
#[derive(Debug)]
pub struct ConfigIssue {
    pub column: String,
    pub error: AnonymizeError,
}

impl ConfigIssue {
    pub fn new(column: impl Into<String>, error: AnonymizeError) -> Self {
        Self {
            column: column.into(),
            error,
        }
    }
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("[{}] {}", issue.column, issue.error))
        .collect::<Vec<_>>()
        .join("; ")
}
