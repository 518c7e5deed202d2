use appctl::application::{Application, ProjectApplication};
use appctl::config::{parse_config, Settings};
use appctl::entry::{run_command, RunOptions, EXIT_FAILURE, EXIT_SUCCESS};
use appctl::error::Error;
use appctl::help::HelpDocument;
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"{
    "environment": "staging",
    "commands": {
        "greet": {
            "run": "printf '%s\\n' \"$APPCTL_ENV\" \"$APPCTL_OPT_NAME\" \"$APPCTL_COMMAND\" \"$GREETING\" > out.txt && printf '%s\\n' >> out.txt",
            "title": "Write a greeting",
            "args": 1,
            "env": { "GREETING": "hello" }
        },
        "fail": { "run": "exit 3" }
    }
}"#;

fn application(root: &TempDir, environment: Option<&str>) -> ProjectApplication {
    let settings = Settings::new(
        root.path().to_path_buf(),
        None,
        None,
        environment.map(String::from),
    );
    ProjectApplication::new(parse_config(CONFIG).unwrap(), &settings)
}

fn options(app: &ProjectApplication) -> RunOptions {
    RunOptions {
        program: "appctl".to_string(),
        environment: app.environment().to_string(),
        help: false,
    }
}

fn tokens(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|token| token.to_string()).collect()
}

#[test]
fn test_environment_precedence() {
    let temp_dir = TempDir::new().unwrap();
    assert_eq!(application(&temp_dir, None).environment(), "staging");
    assert_eq!(application(&temp_dir, Some("production")).environment(), "production");
}

#[test]
fn test_commands_keep_configuration_order() {
    let temp_dir = TempDir::new().unwrap();
    let app = application(&temp_dir, None);
    let names: Vec<&str> = app.commands().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["greet", "fail"]);
}

#[cfg(unix)]
#[test]
fn test_shell_command_receives_arguments_and_environment() {
    let temp_dir = TempDir::new().unwrap();
    let mut app = application(&temp_dir, None);
    let options = options(&app);
    let mut out: Vec<u8> = Vec::new();

    let code = run_command(
        &mut app,
        &options,
        HelpDocument::new(),
        tokens(&["greet", "--name=bob", "world"]),
        &mut out,
    )
    .unwrap();

    assert_eq!(code, EXIT_SUCCESS);
    assert!(app.is_stopped());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("out.txt")).unwrap(),
        "staging\nbob\ngreet\nhello\nworld\n"
    );
}

#[cfg(unix)]
#[test]
fn test_failing_shell_command() {
    let temp_dir = TempDir::new().unwrap();
    let mut app = application(&temp_dir, None);
    let options = options(&app);

    let result = run_command(&mut app, &options, HelpDocument::new(), tokens(&["fail"]), Vec::<u8>::new());

    assert!(matches!(result, Err(Error::SubprocessError { .. })));
    assert!(app.is_stopped());
}

#[test]
fn test_missing_arguments_show_command_help() {
    let temp_dir = TempDir::new().unwrap();
    let mut app = application(&temp_dir, None);
    let options = options(&app);
    let mut out: Vec<u8> = Vec::new();

    let code =
        run_command(&mut app, &options, HelpDocument::new(), tokens(&["greet"]), &mut out).unwrap();

    assert_eq!(code, EXIT_FAILURE);
    assert!(app.is_stopped());
    assert!(!temp_dir.path().join("out.txt").exists());

    assert_eq!(String::from_utf8(out).unwrap(), "Write a greeting\n\n");
}
