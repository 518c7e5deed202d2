//! Scoped argument context used by the dispatcher.
//!
//! Values live in a stack of frames. `store` writes into the innermost frame
//! (copy-on-write, so snapshots taken with `clone` never observe later
//! writes), and `fetch` searches from the innermost frame outwards.
//!
//! Tokens are lexed generically when a scope is entered:
//! - `--key=value` stores the string `value` under `key`
//! - `--key` and `-k` store `true`
//! - `--` ends option lexing
//! - anything else is appended to the positional list under `args`
//!
//! When a scope exits, its values are kept under [`SCOPES_KEY`] in the
//! enclosing frame, so a scope name never shadows a reserved key.

use crate::error::Result;
use indexmap::IndexMap;
use log::trace;
use serde_json::{Map, Value};
use std::rc::Rc;

/// Key under which the selected command name is recorded.
pub const COMMAND_KEY: &str = "command";
/// Key of the help-requested flag.
pub const HELP_KEY: &str = "help";
/// Key of the positional argument list of a scope.
pub const ARGS_KEY: &str = "args";
/// Key holding the values of finished scopes, by scope name.
pub const SCOPES_KEY: &str = "scopes";

const END_OF_OPTIONS: &str = "--";

pub type Values = IndexMap<String, Value>;

#[derive(Debug, Clone)]
struct Frame {
    name: Option<String>,
    values: Rc<Values>,
}

/// A positional token consumed by [`ArgContext::match_literal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub token: String,
    /// Index of the token in the raw argument list.
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct ArgContext {
    tokens: Vec<String>,
    consumed: Vec<bool>,
    frames: Vec<Frame>,
}

fn is_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

fn lex_option(token: &str) -> (String, Value) {
    let stripped = token.trim_start_matches('-');
    match stripped.split_once('=') {
        Some((key, value)) => (key.to_string(), Value::String(value.to_string())),
        None => (stripped.to_string(), Value::Bool(true)),
    }
}

/// Interprets a stored value as a flag.
pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

impl ArgContext {
    /// Creates a context over raw tokens with an empty root frame.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        Self {
            consumed: vec![false; tokens.len()],
            tokens,
            frames: vec![Frame { name: None, values: Rc::default() }],
        }
    }

    /// Writes into the current frame.
    pub fn store<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        if let Some(frame) = self.frames.last_mut() {
            Rc::make_mut(&mut frame.values).insert(key.into(), value.into());
        }
    }

    /// Reads the nearest value for `key`, searching outwards.
    pub fn fetch(&self, key: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.values.get(key))
    }

    pub fn fetch_or(&self, key: &str, default: Value) -> Value {
        self.fetch(key).cloned().unwrap_or(default)
    }

    pub fn fetch_bool(&self, key: &str, default: bool) -> bool {
        self.fetch(key).and_then(value_as_bool).unwrap_or(default)
    }

    /// Name of the innermost scope, `None` at the root.
    pub fn scope_name(&self) -> Option<&str> {
        self.frames.last().and_then(|frame| frame.name.as_deref())
    }

    /// Values stored in the innermost frame only.
    pub fn values(&self) -> &Values {
        // The root frame is never popped.
        &self.frames[self.frames.len() - 1].values
    }

    pub fn selected_command(&self) -> Option<&str> {
        self.fetch(COMMAND_KEY).and_then(Value::as_str)
    }

    /// Positional arguments lexed into the current scope.
    pub fn positionals(&self) -> Vec<&str> {
        match self.fetch(ARGS_KEY) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn next_positional(&self) -> Option<usize> {
        let mut options_done = false;
        for (index, token) in self.tokens.iter().enumerate() {
            if self.consumed[index] {
                continue;
            }
            if !options_done && token == END_OF_OPTIONS {
                options_done = true;
                continue;
            }
            if options_done || !is_option(token) {
                return Some(index);
            }
        }
        None
    }

    /// Consumes the next positional token if it equals `literal`.
    ///
    /// Nothing is mutated when the token does not match.
    pub fn match_literal(&mut self, literal: &str) -> Option<Match> {
        let index = self.next_positional()?;
        if self.tokens[index] != literal {
            return None;
        }
        self.consumed[index] = true;
        trace!("Matched '{}' at position {}.", literal, index);
        Some(Match { token: literal.to_string(), position: index })
    }

    fn lex_remaining(&self) -> Values {
        let mut values = Values::new();
        let mut positionals = Vec::new();
        let mut options_done = false;

        for (index, token) in self.tokens.iter().enumerate() {
            if self.consumed[index] {
                continue;
            }
            if !options_done && token == END_OF_OPTIONS {
                options_done = true;
                continue;
            }
            if options_done || !is_option(token) {
                positionals.push(Value::String(token.clone()));
            } else {
                let (key, value) = lex_option(token);
                values.insert(key, value);
            }
        }

        values.insert(ARGS_KEY.to_string(), Value::Array(positionals));
        values
    }

    /// Values left behind by the finished scope `name`, searched outwards.
    pub fn scope_values(&self, name: &str) -> Option<&Map<String, Value>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.values.get(SCOPES_KEY)?.get(name)?.as_object())
    }

    fn store_scope(&mut self, name: &str, values: Values) {
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        let scopes = Rc::make_mut(&mut frame.values)
            .entry(SCOPES_KEY.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !scopes.is_object() {
            *scopes = Value::Object(Map::new());
        }
        if let Value::Object(scopes) = scopes {
            scopes.insert(name.to_string(), Value::Object(values.into_iter().collect()));
        }
    }

    /// Runs `body` inside a new frame named `name`.
    ///
    /// The frame starts with the tokens not consumed so far. When `body`
    /// returns, the frame is popped and its values are kept in the parent
    /// frame, readable through [`ArgContext::scope_values`].
    pub fn scope<T, F>(&mut self, name: &str, body: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let values = self.lex_remaining();
        trace!("Entering scope '{}' with {:?}.", name, values);
        self.frames.push(Frame { name: Some(name.to_string()), values: Rc::new(values) });

        let result = body(self);

        if let Some(frame) = self.frames.pop() {
            self.store_scope(name, Rc::unwrap_or_clone(frame.values));
        }
        result
    }

    /// Returns the root frame's values.
    pub fn into_values(mut self) -> Values {
        self.frames.truncate(1);
        self.frames
            .pop()
            .map(|frame| Rc::unwrap_or_clone(frame.values))
            .unwrap_or_default()
    }
}
