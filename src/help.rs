//! Nested help documents and their terminal rendering.
//!
//! A help document maps either usage lines to descriptions or, at the top
//! level, command names to per-command documents. Keys starting with `@` are
//! reserved metadata.

use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Write;

pub const USAGE_KEY: &str = "@usage";
pub const TITLE_KEY: &str = "@title";
pub const SEE_KEY: &str = "@see";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HelpNode {
    Text(String),
    Section(HelpDocument),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HelpDocument(IndexMap<String, HelpNode>);

impl HelpDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_usage<S: Into<String>>(self, usage: S) -> Self {
        self.with_text(USAGE_KEY, usage)
    }

    pub fn with_title<S: Into<String>>(self, title: S) -> Self {
        self.with_text(TITLE_KEY, title)
    }

    pub fn with_see<S: Into<String>>(self, see: S) -> Self {
        self.with_text(SEE_KEY, see)
    }

    /// Adds an option line such as `--dir {path}` with its description.
    pub fn with_option<K: Into<String>, V: Into<String>>(self, usage: K, description: V) -> Self {
        self.with_text(usage, description)
    }

    pub fn with_section<S: Into<String>>(mut self, name: S, section: HelpDocument) -> Self {
        self.insert_section(name, section);
        self
    }

    fn with_text<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.0.insert(key.into(), HelpNode::Text(value.into()));
        self
    }

    pub fn insert_section<S: Into<String>>(&mut self, name: S, section: HelpDocument) {
        self.0.insert(name.into(), HelpNode::Section(section));
    }

    /// Sets `@see` unless one is already present.
    pub fn ensure_see<S: Into<String>>(&mut self, see: S) {
        if self.see().is_none() {
            self.0.insert(SEE_KEY.to_string(), HelpNode::Text(see.into()));
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(HelpNode::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn usage(&self) -> Option<&str> {
        self.text(USAGE_KEY)
    }

    pub fn title(&self) -> Option<&str> {
        self.text(TITLE_KEY)
    }

    pub fn see(&self) -> Option<&str> {
        self.text(SEE_KEY)
    }

    pub fn section(&self, name: &str) -> Option<&HelpDocument> {
        match self.0.get(name) {
            Some(HelpNode::Section(section)) => Some(section),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Option lines, excluding reserved metadata.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter_map(|(key, node)| match node {
            HelpNode::Text(text) if !key.starts_with('@') => Some((key.as_str(), text.as_str())),
            _ => None,
        })
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &HelpDocument)> {
        self.0.iter().filter_map(|(key, node)| match node {
            HelpNode::Section(section) => Some((key.as_str(), section)),
            _ => None,
        })
    }
}

fn push_table(out: &mut String, heading: &str, rows: &[(String, String)]) {
    if rows.is_empty() {
        return;
    }
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

    out.push_str(heading);
    out.push('\n');
    for (key, value) in rows {
        let mut lines = value.lines();
        out.push_str(&format!("  {key:<width$}  {}\n", lines.next().unwrap_or_default()));
        for line in lines {
            out.push_str(&format!("  {:<width$}  {line}\n", ""));
        }
    }
    out.push('\n');
}

/// Renders a document as plain text.
pub fn render(document: &HelpDocument) -> String {
    let mut out = String::new();

    if let Some(usage) = document.usage() {
        out.push_str(&format!("Usage: {usage}\n\n"));
    }
    if let Some(title) = document.title() {
        out.push_str(&format!("{title}\n\n"));
    }

    let options: Vec<(String, String)> =
        document.options().map(|(key, value)| (key.to_string(), value.to_string())).collect();
    push_table(&mut out, "Options:", &options);

    let commands: Vec<(String, String)> = document
        .sections()
        .map(|(name, section)| {
            let mut description = section.title().unwrap_or_default().to_string();
            if let Some(see) = section.see() {
                description.push('\n');
                description.push_str(see);
            }
            (name.to_string(), description)
        })
        .collect();
    push_table(&mut out, "Commands:", &commands);

    out
}

/// Receiver of help requests raised during dispatch.
pub trait HelpSink {
    /// Shows help for the named command, or the global help when `None`.
    fn show(&mut self, section: Option<&str>) -> Result<()>;
}

/// Prints help to a writer at most once per invocation.
pub struct HelpPrinter<W: Write> {
    document: HelpDocument,
    writer: W,
    shown: bool,
}

impl<W: Write> HelpPrinter<W> {
    pub fn new(document: HelpDocument, writer: W) -> Self {
        Self { document, writer, shown: false }
    }

    pub fn was_shown(&self) -> bool {
        self.shown
    }

    pub fn document(&self) -> &HelpDocument {
        &self.document
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> HelpSink for HelpPrinter<W> {
    fn show(&mut self, section: Option<&str>) -> Result<()> {
        if self.shown {
            return Ok(());
        }
        self.shown = true;

        let document = section
            .and_then(|name| self.document.section(name))
            .unwrap_or(&self.document);
        self.writer.write_all(render(document).as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}
