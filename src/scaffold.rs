//! Project creation from a template repository.
//!
//! The pipeline is strictly sequential: clone, drop the template's git
//! history, rewrite the tree with the template engine, then install
//! dependencies. Nothing is rolled back on failure.

use crate::error::{Error, Result};
use crate::template::{TemplateEngine, TemplateReport, DEFAULT_EXCLUDED_DIRS};
use crate::tokens::TokenContext;
use cruet::Inflector;
use indexmap::IndexMap;
use log::{debug, warn};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;
use url::Url;

/// Dependency install command run in the new project
pub const DEFAULT_INSTALL_COMMAND: [&str; 2] = ["npm", "install"];

/// Files a template may ship to define its own tokens
pub const TOKEN_FILES: [&str; 3] =
    ["template-tokens.json", "template-tokens.yml", "template-tokens.yaml"];

static NON_WORD: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[^A-Za-z0-9_-]+").expect("valid regex"));

static NON_ALNUM: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[^a-zA-Z0-9]+").expect("valid regex"));

/// Normalizes an application name for use in paths and package names.
///
/// `" My App! "` becomes `"my-app"`.
pub fn format_app_name(app_name: &str) -> String {
    let dashed = NON_WORD.replace_all(app_name.trim(), "-");
    dashed
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_lowercase()
}

/// Human readable application name, `"my-app"` becoming `"My App"`.
pub fn format_app_display_name(app_name: &str) -> String {
    let formatted = format_app_name(app_name);
    let spaced = NON_ALNUM.replace_all(&formatted, " ");
    spaced.trim().to_title_case()
}

/// SHA-256 hex digest of 128 random bytes.
pub fn random_sha256() -> String {
    let mut bytes = [0u8; 128];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(Sha256::digest(bytes))
}

/// Reads the template's own token file, if any, and removes it.
///
/// A file that cannot be parsed is reported and left in place.
pub fn take_project_tokens<P: AsRef<Path>>(project_dir: P) -> Result<IndexMap<String, String>> {
    let project_dir = project_dir.as_ref();
    let Some(path) = TOKEN_FILES.iter().map(|f| project_dir.join(f)).find(|p| p.is_file())
    else {
        debug!("No template token file found.");
        return Ok(IndexMap::new());
    };

    let content = fs::read_to_string(&path)?;
    let parsed = serde_json::from_str::<IndexMap<String, String>>(&content)
        .or_else(|_| serde_yaml::from_str(&content));

    match parsed {
        Ok(tokens) => {
            fs::remove_file(&path)?;
            Ok(tokens)
        }
        Err(e) => {
            warn!("Unable to load template tokens from '{}': {}", path.display(), e);
            Ok(IndexMap::new())
        }
    }
}

/// Builds the token context for a new project.
///
/// Built-in tokens take precedence over tokens defined by the template.
pub fn build_token_context(app_name: &str, project_tokens: IndexMap<String, String>) -> TokenContext {
    let name = format_app_name(app_name);
    let display_name = format_app_display_name(app_name);

    let context = TokenContext::new()
        .with_value("APP_NAME", name)
        .with_value("APP_DISPLAY_NAME", display_name)
        .with("RANDOM_SHA256", random_sha256);

    project_tokens
        .into_iter()
        .fold(context, |context, (token, value)| context.with_fallback(token, value))
}

/// Splits an optional `#ref` suffix off a template URL.
pub fn split_template_ref(template: &str) -> (&str, Option<&str>) {
    match template.rsplit_once('#') {
        Some((url, reference)) if !reference.trim().is_empty() => (url, Some(reference)),
        Some((url, _)) => (url, None),
        None => (template, None),
    }
}

/// Returns true for URLs git2 should clone over the network.
pub fn is_git_url(template: &str) -> bool {
    if template.starts_with("git@") {
        return true;
    }
    Url::parse(template)
        .map(|url| matches!(url.scheme(), "https" | "http" | "git" | "ssh" | "file"))
        .unwrap_or(false)
}

/// Options of a `create` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOptions {
    pub app_name: String,
    /// Parent directory of the new project.
    pub dir: PathBuf,
    pub template: String,
    /// Empty to skip dependency installation.
    pub install: Vec<String>,
}

impl CreateOptions {
    pub fn project_dir(&self) -> PathBuf {
        self.dir.join(format_app_name(&self.app_name))
    }
}

fn clone_template(template: &str, target: &Path) -> Result<()> {
    let (url, reference) = split_template_ref(template);
    if !is_git_url(url) && !Path::new(url).exists() {
        return Err(Error::TemplateError(format!("invalid template source: {template}")));
    }

    debug!("Cloning '{}' into '{}'.", url, target.display());
    let mut builder = git2::build::RepoBuilder::new();
    if let Some(reference) = reference {
        builder.branch(reference);
    }
    builder.clone(url, target)?;

    let git_dir = target.join(".git");
    if git_dir.exists() {
        fs::remove_dir_all(git_dir)?;
    }
    Ok(())
}

fn run_install(install: &[String], project_dir: &Path) -> Result<()> {
    let Some((program, args)) = install.split_first() else {
        debug!("Skipping dependency installation.");
        return Ok(());
    };

    let status = Command::new(program)
        .args(args)
        .current_dir(project_dir)
        .env("PWD", project_dir)
        .status()
        .map_err(|e| Error::SubprocessError { program: program.clone(), reason: e.to_string() })?;

    if !status.success() {
        return Err(Error::SubprocessError {
            program: program.clone(),
            reason: format!("exited with {status}"),
        });
    }
    Ok(())
}

/// Rewrites an already cloned project directory.
pub fn template_project<P: AsRef<Path>>(project_dir: P, app_name: &str) -> Result<TemplateReport> {
    let project_dir = project_dir.as_ref();
    let context = build_token_context(app_name, take_project_tokens(project_dir)?);
    TemplateEngine::with_excluded_dirs(&context, &DEFAULT_EXCLUDED_DIRS)?.apply(project_dir)
}

/// Creates a new project and returns its directory.
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if the project directory exists
/// * `Error::Git2Error` if cloning fails
/// * `Error::SubprocessError` if the install command fails
/// * any I/O error raised while templating
pub fn create_project(options: &CreateOptions) -> Result<PathBuf> {
    let project_dir = options.project_dir();
    if project_dir.exists() {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: project_dir.display().to_string(),
        });
    }

    clone_template(&options.template, &project_dir)?;

    let report = template_project(&project_dir, &options.app_name)?;
    debug!("{:?}", report);

    run_install(&options.install, &project_dir)?;
    Ok(project_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_template_ref() {
        assert_eq!(split_template_ref("https://host/repo.git#v2"), ("https://host/repo.git", Some("v2")));
        assert_eq!(split_template_ref("https://host/repo.git#"), ("https://host/repo.git", None));
        assert_eq!(split_template_ref("https://host/repo.git"), ("https://host/repo.git", None));
    }

    #[test]
    fn test_is_git_url() {
        assert!(is_git_url("https://github.com/user/template.git"));
        assert!(is_git_url("git@github.com:user/template.git"));
        assert!(!is_git_url("./local/template"));
    }

    #[test]
    fn test_run_install_skips_empty_command() {
        assert!(run_install(&[], Path::new(".")).is_ok());
    }
}
