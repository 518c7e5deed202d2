use std::io;

use appctl::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid config".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid config.");

    let err = Error::TemplateError("rename failed".to_string());
    assert_eq!(err.to_string(), "Template error: rename failed.");

    let err = Error::SubprocessError {
        program: "npm install".to_string(),
        reason: "exited with exit status: 1".to_string(),
    };
    assert_eq!(err.to_string(), "Process 'npm install' failed: exited with exit status: 1.");

    let err = Error::OutputDirectoryExistsError { output_dir: "./demo".to_string() };
    assert_eq!(err.to_string(), "Output directory './demo' already exists.");
}

#[test]
fn test_glob_error_conversion() {
    let glob_err = globset::Glob::new("a[b").unwrap_err();
    let err: Error = glob_err.into();
    assert!(matches!(err, Error::GlobError(_)));
}
