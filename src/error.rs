//! Error types and exit codes for flagtune

use std::process::ExitCode;
use thiserror::Error;

/// Main error type for flagtune operations
#[derive(Error, Debug)]
pub enum FlagTuneError {
    #[error("Project directory not found: {path}")]
    ProjectNotFound { path: String },

    #[error("No configure script in {path}")]
    ConfigureMissing { path: String },

    #[error("Required tool not found on PATH: {tool}")]
    ToolMissing { tool: String },

    #[error("Invalid flag catalog: {message}")]
    Catalog { message: String },

    #[error("Invalid arguments: {message}")]
    InvalidArgs { message: String },

    #[error("Build step '{step}' failed{}", exit_status_suffix(.status))]
    BuildFailed { step: String, status: Option<i32> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_status_suffix(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!(" with exit code {}", code),
        None => " (terminated by signal)".to_string(),
    }
}

impl FlagTuneError {
    /// Convert error to appropriate exit code:
    /// - 0: Success
    /// - 1: Project not found / IO error
    /// - 2: Missing external tool
    /// - 3: Invalid catalog or arguments
    /// - 4: Final build failure
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::ProjectNotFound { .. } => ExitCode::from(1),
            Self::ConfigureMissing { .. } => ExitCode::from(1),
            Self::Io(_) => ExitCode::from(1),
            Self::ToolMissing { .. } => ExitCode::from(2),
            Self::Catalog { .. } => ExitCode::from(3),
            Self::InvalidArgs { .. } => ExitCode::from(3),
            Self::BuildFailed { .. } => ExitCode::from(4),
        }
    }
}

/// Result type alias for flagtune operations
pub type Result<T> = std::result::Result<T, FlagTuneError>;
