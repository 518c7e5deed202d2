//! Runs a project command from raw command tokens: builds the registry,
//! dispatches, executes the selected command and stops the application.

use crate::application::{Application, Invocation};
use crate::context::{ArgContext, Values, HELP_KEY};
use crate::dispatch::{dispatch, Dispatch};
use crate::error::{Error, Result};
use crate::help::{HelpDocument, HelpPrinter, HelpSink};
use crate::registry::Registry;
use log::debug;
use std::io::Write;

/// Process exit code of a successful run
pub const EXIT_SUCCESS: i32 = 0;
/// Process exit code when no command ran
pub const EXIT_FAILURE: i32 = 1;

/// Options shared by every project command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub program: String,
    pub environment: String,
    /// Help requested before the command word.
    pub help: bool,
}

/// Dispatches `tokens` against the application's commands and executes the
/// selected command. Help is written to `out` at most once.
///
/// Returns the process exit code.
///
/// # Errors
/// Errors from descriptors, runners, command execution or `stop` are
/// propagated. `stop` is attempted after dispatch even when execution fails.
pub fn run_command<W: Write>(
    app: &mut dyn Application,
    options: &RunOptions,
    help: HelpDocument,
    tokens: Vec<String>,
    out: W,
) -> Result<i32> {
    let registry = Registry::build(&*app, app.commands(), &options.program, help)?;

    let mut context = ArgContext::new(tokens.iter().cloned());
    context.store(HELP_KEY, options.help);
    context.store("environment", options.environment.as_str());

    let mut printer = HelpPrinter::new(registry.help, out);
    let outcome = dispatch(&registry.handlers, &mut context, &mut printer)?;

    let Dispatch::Matched(command) = outcome else {
        printer.show(None)?;
        app.stop()?;
        return Ok(EXIT_FAILURE);
    };

    let arguments: Values = context
        .scope_values(&command)
        .map(|map| map.clone().into_iter().collect())
        .unwrap_or_default();
    let invocation = Invocation {
        command,
        environment: options.environment.clone(),
        arguments,
        raw_args: tokens,
    };
    debug!("Executing {:?}", invocation);

    let executed = match app.commands().get(&invocation.command) {
        Some(descriptor) => descriptor.execute(&invocation),
        None => Err(Error::ConfigError(format!(
            "Command '{}' disappeared after dispatch",
            invocation.command
        ))),
    };
    let stopped = app.stop();

    executed?;
    stopped?;
    Ok(EXIT_SUCCESS)
}
