//! Error types.
//!
//! - `PipelineError`: typed failures of the data-preparation pipeline
//! - `AppError`: what the binary reports (message + process exit code)

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::Column;

/// Failures of the load → merge → index → derive pipeline.
///
/// Every variant aborts the derivation that raised it; nothing partial is
/// returned alongside an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("Input file not found: '{}'", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Failed to parse '{}': {message}", path.display())]
    InputParse { path: PathBuf, message: String },

    #[error("'{}' is missing required column(s): {}", path.display(), missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },

    #[error("Invalid date '{value}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY, DD/MM/YYYY (day above 12).")]
    DateParse { value: String },

    #[error("Duplicate date '{key}' in {input} input")]
    DuplicateDate { input: String, key: String },

    #[error("Column `{column}` has no values")]
    EmptyColumn { column: Column },

    #[error(
        "Not enough `{column}` observations to decompose: need {required} (two periods of {period}), have {available}"
    )]
    InsufficientData {
        column: Column,
        period: usize,
        required: usize,
        available: usize,
    },

    #[error("`{column}` is not regularly sampled at {at}: {reason}")]
    IrregularSeries {
        column: Column,
        at: NaiveDate,
        reason: String,
    },
}

impl PipelineError {
    /// Exit code used when this error terminates the binary.
    ///
    /// 2 = input/config problem, 3 = the data cannot support the derivation.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::InputNotFound { .. }
            | PipelineError::InputParse { .. }
            | PipelineError::Schema { .. } => 2,
            PipelineError::DateParse { .. }
            | PipelineError::DuplicateDate { .. }
            | PipelineError::EmptyColumn { .. }
            | PipelineError::InsufficientData { .. }
            | PipelineError::IrregularSeries { .. } => 3,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
