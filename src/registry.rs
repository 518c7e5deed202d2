//! Builds the global help document and the dispatch table from the
//! application's commands.

use crate::application::{Application, CommandMap, DescribeMode};
use crate::dispatch::CommandHandler;
use crate::error::Result;
use crate::help::HelpDocument;
use log::debug;

pub struct Registry {
    pub help: HelpDocument,
    pub handlers: Vec<CommandHandler>,
}

fn default_see(program: &str, name: &str) -> String {
    format!("See: '{program} {name} --help' for more help")
}

/// Help fragment used for commands that do not describe themselves.
pub fn default_command_help(program: &str, name: &str) -> HelpDocument {
    HelpDocument::new()
        .with_usage(format!("{program} {name}"))
        .with_title(format!("Invoke the \"{name}\" command"))
        .with_see(default_see(program, name))
}

impl Registry {
    /// Builds the registry.
    ///
    /// `help` is the global document; one section per command is added to
    /// it. Calling this twice with the same inputs yields equal documents.
    pub fn build(
        app: &dyn Application,
        commands: &CommandMap,
        program: &str,
        mut help: HelpDocument,
    ) -> Result<Self> {
        let mut handlers = Vec::with_capacity(commands.len());

        for (name, descriptor) in commands {
            let mut fragment = descriptor
                .command_arguments(DescribeMode::Help, app)?
                .help
                .unwrap_or_else(|| default_command_help(program, name));
            fragment.ensure_see(default_see(program, name));
            help.insert_section(name, fragment);

            let runner = descriptor.command_arguments(DescribeMode::Runner, app)?.runner;
            debug!("Registered '{}' (runner: {}).", name, runner.is_some());
            handlers.push(CommandHandler { name: name.clone(), runner });
        }

        Ok(Self { help, handlers })
    }
}
