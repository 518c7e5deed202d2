//! Scoped command dispatch.
//!
//! Commands are tried in registration order. The first one whose name
//! matches the next positional token is selected: its name is recorded
//! under [`COMMAND_KEY`], a scope named after it is entered, and its runner
//! (if any) decides whether execution may proceed. Once a name has matched,
//! no other command is tried.

use crate::context::{ArgContext, Match, COMMAND_KEY, HELP_KEY};
use crate::error::Result;
use crate::help::HelpSink;
use log::debug;
use std::fmt;

/// Continuation of a runner that has not decided yet.
pub type Deferred = Box<dyn FnOnce(&mut ArgContext) -> Result<Outcome>>;

/// Result of a command's pre-check.
pub enum Outcome {
    /// The command may execute.
    Proceed,
    /// The command rejects this invocation; its help is shown instead.
    Decline,
    /// The decision needs more work, resumed by the dispatcher.
    Defer(Deferred),
}

impl Outcome {
    pub fn defer<F>(next: F) -> Self
    where
        F: FnOnce(&mut ArgContext) -> Result<Outcome> + 'static,
    {
        Outcome::Defer(Box::new(next))
    }

    /// Drives deferred continuations until a final answer is reached.
    pub fn resolve(self, context: &mut ArgContext) -> Result<bool> {
        let mut outcome = self;
        loop {
            match outcome {
                Outcome::Proceed => return Ok(true),
                Outcome::Decline => return Ok(false),
                Outcome::Defer(next) => outcome = next(context)?,
            }
        }
    }
}

impl From<bool> for Outcome {
    fn from(proceed: bool) -> Self {
        if proceed {
            Outcome::Proceed
        } else {
            Outcome::Decline
        }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Proceed => f.write_str("Proceed"),
            Outcome::Decline => f.write_str("Decline"),
            Outcome::Defer(_) => f.write_str("Defer(..)"),
        }
    }
}

/// A command's pre-check, run inside the command's scope.
pub trait Runner {
    fn run(&self, context: &mut ArgContext, matched: &Match) -> Result<Outcome>;
}

impl<F> Runner for F
where
    F: Fn(&mut ArgContext, &Match) -> Result<Outcome>,
{
    fn run(&self, context: &mut ArgContext, matched: &Match) -> Result<Outcome> {
        self(context, matched)
    }
}

/// One entry of the dispatch table.
pub struct CommandHandler {
    pub name: String,
    pub runner: Option<Box<dyn Runner>>,
}

impl CommandHandler {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into(), runner: None }
    }

    pub fn with_runner<F>(mut self, runner: F) -> Self
    where
        F: Fn(&mut ArgContext, &Match) -> Result<Outcome> + 'static,
    {
        self.runner = Some(Box::new(runner));
        self
    }
}

impl fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandler")
            .field("name", &self.name)
            .field("runner", &self.runner.is_some())
            .finish()
    }
}

/// Terminal state of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The command matched and may execute.
    Matched(String),
    /// The command matched but its runner declined; its help was shown.
    Declined(String),
    /// The command matched and help was requested; its help was shown.
    HelpRequested(String),
    /// No command name matched.
    NoMatch,
}

impl Dispatch {
    pub fn is_matched(&self) -> bool {
        matches!(self, Dispatch::Matched(_))
    }

    /// Name of the command whose literal matched, whatever the outcome.
    pub fn command(&self) -> Option<&str> {
        match self {
            Dispatch::Matched(name) | Dispatch::Declined(name) | Dispatch::HelpRequested(name) => {
                Some(name)
            }
            Dispatch::NoMatch => None,
        }
    }
}

/// Selects the command to execute.
///
/// # Errors
/// Errors raised by a runner or by the help sink are propagated unchanged.
pub fn dispatch(
    handlers: &[CommandHandler],
    context: &mut ArgContext,
    help: &mut dyn HelpSink,
) -> Result<Dispatch> {
    for handler in handlers {
        let Some(matched) = context.match_literal(&handler.name) else {
            continue;
        };

        debug!("Selected command '{}'.", handler.name);
        context.store(COMMAND_KEY, handler.name.as_str());

        return context.scope(&handler.name, |scope| {
            if let Some(runner) = &handler.runner {
                if !runner.run(scope, &matched)?.resolve(scope)? {
                    debug!("Runner of '{}' declined.", handler.name);
                    help.show(Some(&handler.name))?;
                    return Ok(Dispatch::Declined(handler.name.clone()));
                }
            }

            if scope.fetch_bool(HELP_KEY, false) {
                help.show(Some(&handler.name))?;
                return Ok(Dispatch::HelpRequested(handler.name.clone()));
            }

            Ok(Dispatch::Matched(handler.name.clone()))
        });
    }

    debug!("No command matched {:?}.", context.tokens());
    Ok(Dispatch::NoMatch)
}
