//! Token substitution for template file names and file contents.
//!
//! Two grammars are supported and never share resolution logic beyond the
//! lookup-and-call step:
//! - file and directory names use `__NAME__`; unknown names stay visible
//! - file contents use `<<<NAME>>>`; unknown names vanish
//!
//! Each pass is single: a producer's output is never re-scanned.

use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

// Word boundaries are ASCII-only: `é__NAME__` still carries a token.
static FILE_NAME_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)__([A-Z0-9_-]+)__(?-u:\b)").expect("valid file name token regex")
});

static CONTENT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<<([A-Z0-9_]+)>>>").expect("valid content token regex"));

/// Position marker left over after the primary file name pass.
const FILE_NAME_MARKER: &str = "__";

type Producer = Box<dyn Fn() -> String>;

/// Named zero-argument producers used to expand template tokens.
///
/// Built once per scaffolding run; the builder methods consume `self`, so a
/// context handed to the template engine can no longer change.
#[derive(Default)]
pub struct TokenContext {
    producers: IndexMap<String, Producer>,
}

impl TokenContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a producer, replacing any previous one with the same name.
    pub fn with<S, F>(mut self, name: S, producer: F) -> Self
    where
        S: Into<String>,
        F: Fn() -> String + 'static,
    {
        self.producers.insert(name.into(), Box::new(producer));
        self
    }

    /// Registers a constant value.
    pub fn with_value<S: Into<String>, V: Into<String>>(self, name: S, value: V) -> Self {
        let value = value.into();
        self.with(name, move || value.clone())
    }

    /// Registers a constant value only if no producer exists under that name.
    pub fn with_fallback<S: Into<String>, V: Into<String>>(self, name: S, value: V) -> Self {
        let name = name.into();
        if self.contains(&name) {
            return self;
        }
        self.with_value(name, value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.producers.contains_key(name)
    }

    /// Invokes the producer registered under `name`.
    pub fn produce(&self, name: &str) -> Option<String> {
        self.producers.get(name).map(|producer| producer())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.producers.keys().map(String::as_str)
    }
}

impl fmt::Debug for TokenContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenContext").field("tokens", &self.producers.keys()).finish()
    }
}

/// Expands `__NAME__` tokens in a file or directory base name.
///
/// Unknown tokens are replaced by their bare name. Any `__` marker that
/// survives the first pass is then removed.
pub fn substitute_file_name(name: &str, context: &TokenContext) -> String {
    let expanded = FILE_NAME_TOKEN.replace_all(name, |caps: &Captures| {
        let token = &caps[1];
        context.produce(token).unwrap_or_else(|| token.to_string())
    });

    expanded.replace(FILE_NAME_MARKER, "")
}

/// Expands `<<<NAME>>>` tokens in file content.
///
/// Unknown tokens are replaced by the empty string. Returns
/// `Cow::Borrowed` when the input contains no token, so callers can skip
/// writing unchanged files.
pub fn substitute_content<'a>(content: &'a str, context: &TokenContext) -> Cow<'a, str> {
    CONTENT_TOKEN.replace_all(content, |caps: &Captures| {
        context.produce(&caps[1]).unwrap_or_default()
    })
}
