//! appctl is the command front-end of a hosted application.
//! It dispatches command-line input to the commands a project exposes and
//! scaffolds new projects from template repositories.

/// Hosting application and command descriptors
pub mod application;

/// Command-line interface module for the appctl application
pub mod cli;

/// Project configuration and invocation settings
/// Supports JSON and YAML formats (.appctl.json, .appctl.yml, .appctl.yaml)
pub mod config;

/// Scoped argument context
pub mod context;

/// Command selection
pub mod dispatch;

/// Runs a project command end to end
pub mod entry;

/// Error types and handling for the appctl application
pub mod error;

/// Help documents and rendering
pub mod help;

/// Help document and dispatch table construction
pub mod registry;

/// Project creation from template repositories
pub mod scaffold;

/// In-place rewriting of a project tree
pub mod template;

/// `__NAME__` and `<<<NAME>>>` token substitution
pub mod tokens;

/// Project tree traversal
pub mod walker;
