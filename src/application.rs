//! The hosting application and the commands it exposes.
//!
//! [`ProjectApplication`] is the host used by the `appctl` binary: it turns
//! every command of the project configuration into a [`ShellCommand`].

use crate::config::{CommandConfig, ProjectConfig, Settings};
use crate::context::{ArgContext, Match, Values, ARGS_KEY};
use crate::dispatch::{Outcome, Runner};
use crate::error::{Error, Result};
use crate::help::HelpDocument;
use indexmap::IndexMap;
use log::{debug, info};
use serde_json::Value;
use std::path::PathBuf;
use std::process::Command;

/// What a descriptor is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescribeMode {
    Help,
    Runner,
}

/// Optional capabilities of a command. `None` means the capability is absent.
#[derive(Default)]
pub struct CommandArguments {
    pub help: Option<HelpDocument>,
    pub runner: Option<Box<dyn Runner>>,
}

/// Everything a command needs to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: String,
    pub environment: String,
    /// Values lexed into the command's scope.
    pub arguments: Values,
    /// Raw command tokens, starting with the command name.
    pub raw_args: Vec<String>,
}

impl Invocation {
    pub fn positionals(&self) -> Vec<&str> {
        match self.arguments.get(ARGS_KEY) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Option values of the invocation, rendered as strings.
    pub fn options(&self) -> impl Iterator<Item = (&str, String)> {
        self.arguments.iter().filter(|(key, _)| key.as_str() != ARGS_KEY).map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.as_str(), value)
        })
    }
}

/// A command the hosting application can run.
pub trait CommandDescriptor {
    /// Returns the help fragment or the runner, depending on `mode`.
    fn command_arguments(
        &self,
        _mode: DescribeMode,
        _app: &dyn Application,
    ) -> Result<CommandArguments> {
        Ok(CommandArguments::default())
    }

    fn execute(&self, invocation: &Invocation) -> Result<()>;
}

/// Commands keyed by name, in registration order.
pub type CommandMap = IndexMap<String, Box<dyn CommandDescriptor>>;

pub trait Application {
    fn commands(&self) -> &CommandMap;

    /// Releases whatever the application acquired. Called after command
    /// execution whether it succeeded or not.
    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A command defined by a shell command line in the project configuration.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    name: String,
    config: CommandConfig,
    working_dir: PathBuf,
}

impl ShellCommand {
    pub fn new<S: Into<String>>(name: S, config: CommandConfig, working_dir: PathBuf) -> Self {
        Self { name: name.into(), config, working_dir }
    }

    fn help(&self) -> Option<HelpDocument> {
        let config = &self.config;
        if config.usage.is_none() && config.title.is_none() && config.options.is_empty() {
            return None;
        }

        let mut help = HelpDocument::new();
        if let Some(usage) = &config.usage {
            help = help.with_usage(usage);
        }
        if let Some(title) = &config.title {
            help = help.with_title(title);
        }
        if let Some(see) = &config.see {
            help = help.with_see(see);
        }
        for (usage, description) in &config.options {
            help = help.with_option(usage, description);
        }
        Some(help)
    }

    fn runner(&self) -> Option<Box<dyn Runner>> {
        let required = self.config.args;
        if required == 0 {
            return None;
        }

        let name = self.name.clone();
        let runner = move |context: &mut ArgContext, _: &Match| -> Result<Outcome> {
            let given = context.positionals().len();
            if given < required {
                debug!("'{}' requires {} argument(s), got {}.", name, required, given);
            }
            Ok(Outcome::from(given >= required))
        };
        Some(Box::new(runner))
    }

    fn shell(&self, positionals: &[&str]) -> Command {
        if cfg!(windows) {
            let mut command = Command::new("cmd");
            command.arg("/C").arg(&self.config.run).args(positionals);
            command
        } else {
            let mut command = Command::new("sh");
            command
                .arg("-c")
                .arg(format!("{} \"$@\"", self.config.run))
                .arg(&self.name)
                .args(positionals);
            command
        }
    }
}

fn option_env_name(key: &str) -> String {
    format!("APPCTL_OPT_{}", key.to_uppercase().replace('-', "_"))
}

impl CommandDescriptor for ShellCommand {
    fn command_arguments(
        &self,
        mode: DescribeMode,
        _app: &dyn Application,
    ) -> Result<CommandArguments> {
        Ok(match mode {
            DescribeMode::Help => CommandArguments { help: self.help(), runner: None },
            DescribeMode::Runner => CommandArguments { help: None, runner: self.runner() },
        })
    }

    fn execute(&self, invocation: &Invocation) -> Result<()> {
        let positionals = invocation.positionals();
        let mut command = self.shell(&positionals);
        command
            .current_dir(&self.working_dir)
            .envs(&self.config.env)
            .env("APPCTL_ENV", &invocation.environment)
            .env("APPCTL_COMMAND", &invocation.command);
        for (key, value) in invocation.options() {
            command.env(option_env_name(key), value);
        }

        info!("Running '{}': {}", self.name, self.config.run);
        let status = command.status().map_err(|e| Error::SubprocessError {
            program: self.config.run.clone(),
            reason: e.to_string(),
        })?;

        if !status.success() {
            return Err(Error::SubprocessError {
                program: self.config.run.clone(),
                reason: format!("exited with {status}"),
            });
        }
        Ok(())
    }
}

/// Hosting application built from the project configuration.
pub struct ProjectApplication {
    commands: CommandMap,
    environment: String,
    stopped: bool,
}

impl ProjectApplication {
    pub fn new(config: ProjectConfig, settings: &Settings) -> Self {
        let environment = settings.environment(&config);
        let commands = config
            .commands
            .into_iter()
            .map(|(name, command)| {
                let descriptor = ShellCommand::new(&name, command, settings.working_dir.clone());
                (name, Box::new(descriptor) as Box<dyn CommandDescriptor>)
            })
            .collect();

        debug!("Application created for environment '{}'.", environment);
        Self { commands, environment, stopped: false }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Application for ProjectApplication {
    fn commands(&self) -> &CommandMap {
        &self.commands
    }

    fn stop(&mut self) -> Result<()> {
        if !self.stopped {
            debug!("Stopping application.");
            self.stopped = true;
        }
        Ok(())
    }
}
