//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Io { .. } => crate::exitcode::IOERR,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::Script { .. }
                | ApplicationError::UnknownKey(_)
                | ApplicationError::DuplicateKey(_) => crate::exitcode::DATAERR,
                ApplicationError::Domain(DomainError::Inconsistent { .. }) => {
                    crate::exitcode::SOFTWARE
                }
                ApplicationError::Domain(_) => crate::exitcode::DATAERR,
            },
        }
    }
}
