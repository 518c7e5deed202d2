use appctl::error::Error;
use appctl::scaffold::{
    build_token_context, create_project, format_app_display_name, format_app_name,
    random_sha256, take_project_tokens, template_project, CreateOptions,
};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Creates a git repository holding a small project template.
fn template_repo(root: &Path) -> PathBuf {
    let repo_dir = root.join("template");
    write(&repo_dir, "package.json", "{ \"name\": \"<<<APP_NAME>>>\" }\n");
    write(&repo_dir, "src/__APP_NAME__.js", "// <<<APP_DISPLAY_NAME>>> by <<<AUTHOR>>>\n");
    write(&repo_dir, "template-tokens.json", r#"{ "AUTHOR": "Jane", "APP_NAME": "ignored" }"#);

    let repo = git2::Repository::init(&repo_dir).unwrap();
    let mut index = repo.index().unwrap();
    index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let signature = git2::Signature::now("Template", "template@example.com").unwrap();
    repo.commit(Some("HEAD"), &signature, &signature, "Initial template", &tree, &[])
        .unwrap();

    repo_dir
}

#[test]
fn test_format_app_name() {
    assert_eq!(format_app_name(" My App! "), "my-app");
    assert_eq!(format_app_name("my_app"), "my_app");
    assert_eq!(format_app_name("--Demo--"), "demo");
}

#[test]
fn test_format_app_display_name() {
    assert_eq!(format_app_display_name(" My App! "), "My App");
    assert_eq!(format_app_display_name("shop_front"), "Shop Front");
}

#[test]
fn test_random_sha256() {
    let first = random_sha256();
    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(first, random_sha256());
}

#[test]
fn test_take_project_tokens_removes_file() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "template-tokens.yml", "AUTHOR: Jane\nLICENSE: MIT\n");

    let tokens = take_project_tokens(temp_dir.path()).unwrap();

    assert_eq!(tokens["AUTHOR"], "Jane");
    assert_eq!(tokens["LICENSE"], "MIT");
    assert!(!temp_dir.path().join("template-tokens.yml").exists());
}

#[test]
fn test_take_project_tokens_without_file() {
    let temp_dir = TempDir::new().unwrap();
    assert!(take_project_tokens(temp_dir.path()).unwrap().is_empty());
}

#[test]
fn test_unreadable_token_file_is_kept() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "template-tokens.json", "[not: a, map");

    assert!(take_project_tokens(temp_dir.path()).unwrap().is_empty());
    assert!(temp_dir.path().join("template-tokens.json").exists());
}

#[test]
fn test_built_in_tokens_take_precedence() {
    let mut tokens = IndexMap::new();
    tokens.insert("APP_NAME".to_string(), "other".to_string());
    tokens.insert("AUTHOR".to_string(), "Jane".to_string());

    let context = build_token_context("My App", tokens);

    assert_eq!(context.produce("APP_NAME").as_deref(), Some("my-app"));
    assert_eq!(context.produce("APP_DISPLAY_NAME").as_deref(), Some("My App"));
    assert_eq!(context.produce("AUTHOR").as_deref(), Some("Jane"));
    assert_eq!(context.produce("RANDOM_SHA256").map(|s| s.len()), Some(64));
}

#[test]
fn test_template_project() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "__APP_NAME__.config.js", "export default '<<<APP_NAME>>>';\n");
    write(root, "template-tokens.json", r#"{ "PORT": "8080" }"#);
    write(root, "server.js", "listen(<<<PORT>>>);\n");

    let report = template_project(root, "Shop Front").unwrap();

    assert_eq!(report.renamed.len(), 1);
    assert_eq!(
        fs::read_to_string(root.join("shop-front.config.js")).unwrap(),
        "export default 'shop-front';\n"
    );
    assert_eq!(fs::read_to_string(root.join("server.js")).unwrap(), "listen(8080);\n");
    assert!(!root.join("template-tokens.json").exists());
}

#[test]
fn test_create_project_from_local_repository() {
    let temp_dir = TempDir::new().unwrap();
    let template = template_repo(temp_dir.path());
    let parent = temp_dir.path().join("projects");
    fs::create_dir_all(&parent).unwrap();

    let options = CreateOptions {
        app_name: "My App".to_string(),
        dir: parent.clone(),
        template: template.display().to_string(),
        install: Vec::new(),
    };
    let project_dir = create_project(&options).unwrap();

    assert_eq!(project_dir, parent.join("my-app"));
    assert!(!project_dir.join(".git").exists());
    assert!(!project_dir.join("template-tokens.json").exists());
    assert_eq!(
        fs::read_to_string(project_dir.join("package.json")).unwrap(),
        "{ \"name\": \"my-app\" }\n"
    );
    assert_eq!(
        fs::read_to_string(project_dir.join("src/my-app.js")).unwrap(),
        "// My App by Jane\n"
    );
}

#[test]
fn test_create_project_refuses_existing_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("demo")).unwrap();

    let options = CreateOptions {
        app_name: "demo".to_string(),
        dir: temp_dir.path().to_path_buf(),
        template: "https://example.com/template.git".to_string(),
        install: Vec::new(),
    };

    assert!(matches!(
        create_project(&options),
        Err(Error::OutputDirectoryExistsError { .. })
    ));
}

#[test]
fn test_create_project_with_missing_template() {
    let temp_dir = TempDir::new().unwrap();

    let options = CreateOptions {
        app_name: "demo".to_string(),
        dir: temp_dir.path().to_path_buf(),
        template: temp_dir.path().join("nowhere").display().to_string(),
        install: Vec::new(),
    };

    assert!(matches!(create_project(&options), Err(Error::TemplateError(_))));
    assert!(!temp_dir.path().join("demo").exists());
}

#[test]
fn test_failing_install_command() {
    let temp_dir = TempDir::new().unwrap();
    let template = template_repo(temp_dir.path());

    let options = CreateOptions {
        app_name: "demo".to_string(),
        dir: temp_dir.path().to_path_buf(),
        template: template.display().to_string(),
        install: vec!["appctl-no-such-installer".to_string()],
    };

    assert!(matches!(create_project(&options), Err(Error::SubprocessError { .. })));
    assert!(temp_dir.path().join("demo/package.json").exists());
}
