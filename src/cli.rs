//! Command-line interface implementation for appctl.
//! Global options are parsed with clap; the command words that follow are
//! handed verbatim to the dispatcher. Help output is rendered from help
//! documents rather than by clap.

use crate::help::HelpDocument;
use crate::scaffold::DEFAULT_INSTALL_COMMAND;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Binary name used in usage lines
pub const PROGRAM: &str = "appctl";

/// Command-line arguments structure for appctl.
#[derive(Parser, Debug)]
#[command(
    name = PROGRAM,
    author,
    version,
    about = "appctl: run project commands and scaffold new projects",
    long_about = None,
    disable_help_flag = true,
    disable_help_subcommand = true
)]
pub struct Args {
    /// Path to the project configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Environment the command runs in
    #[arg(short = 'e', long = "env", value_name = "ENVIRONMENT")]
    pub environment: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Show help
    #[arg(short, long)]
    pub help: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new application from a template repository
    #[command(disable_help_flag = true)]
    Create(CreateArgs),

    /// Any project command
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Name of the new application
    #[arg(value_name = "APP_NAME")]
    pub app_name: Option<String>,

    /// Directory to create the application in
    #[arg(short, long, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Git repository URL of the template, optionally suffixed with #branch
    #[arg(short, long, value_name = "URL")]
    pub template: Option<String>,

    /// Command installing the new project's dependencies
    #[arg(long, value_name = "COMMAND")]
    pub install: Option<String>,

    /// Do not install dependencies
    #[arg(long)]
    pub skip_install: bool,

    /// Show help
    #[arg(short, long)]
    pub help: bool,
}

impl CreateArgs {
    /// Install command line, empty when installation is skipped.
    pub fn install_command(&self) -> Vec<String> {
        if self.skip_install {
            return Vec::new();
        }
        match &self.install {
            Some(install) => install.split_whitespace().map(String::from).collect(),
            None => DEFAULT_INSTALL_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With clap's default error handling for invalid arguments and `--version`
pub fn get_args() -> Args {
    Args::try_parse().unwrap_or_else(|e| e.exit())
}

/// Help for the `create` command.
pub fn create_help() -> HelpDocument {
    HelpDocument::new()
        .with_usage(format!("{PROGRAM} create [app name] [options]"))
        .with_title("Initialize a new application from a template")
        .with_see(format!("See: '{PROGRAM} create --help' for more help"))
        .with_option(
            "-d {path} | --dir {path}",
            "Directory to create the application in. Default = current directory.",
        )
        .with_option(
            "-t {url} | --template {url}",
            "Git repository URL of the template. Append #{branch} to select a branch.",
        )
        .with_option(
            "--install {command}",
            "Command installing dependencies. Default = \"npm install\".",
        )
        .with_option("--skip-install", "Do not install dependencies.")
}

/// Global help, before project commands are added.
pub fn global_help() -> HelpDocument {
    HelpDocument::new()
        .with_usage(format!("{PROGRAM} [command] [options]"))
        .with_title("Run a project command")
        .with_option(
            "--config {path}",
            "Path to the project configuration file. Default = \"{CWD}/.appctl.json\".",
        )
        .with_option(
            "-e {environment} | --env {environment}",
            "Environment to run in. Default = \"development\".",
        )
        .with_option("-v | --verbose", "Enable verbose logging output.")
        .with_option("-V | --version", "Print version.")
        .with_section("create", create_help())
}
