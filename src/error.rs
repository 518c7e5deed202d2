//! Error handling for the appctl application.
//! Defines custom error types and results used throughout the application.

use thiserror::Error;

/// Custom error types for appctl operations.
///
/// Dispatch misses and runner declines are not errors; they are reported
/// through [`crate::dispatch::Dispatch`].
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    /// Represents errors raised while cloning a template repository
    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),

    /// Represents errors raised while traversing a project tree
    #[error("Walk error: {0}.")]
    WalkError(#[from] walkdir::Error),

    /// Represents invalid exclusion patterns
    #[error("Glob error: {0}.")]
    GlobError(#[from] globset::Error),

    /// Represents errors that occur during configuration loading or resolution
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents errors that occur while templating a project tree
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// Represents a subprocess that could not be spawned or exited unsuccessfully
    #[error("Process '{program}' failed: {reason}.")]
    SubprocessError { program: String, reason: String },

    /// Scaffolding refuses to write into an existing directory
    #[error("Output directory '{output_dir}' already exists.")]
    OutputDirectoryExistsError { output_dir: String },
}

/// Convenience type alias for Results with appctl's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("{err}");
    std::process::exit(1);
}
