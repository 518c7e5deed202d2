//! appctl's main application entry point and orchestration logic.
//! Handles command-line argument parsing, project creation and the
//! dispatch of project commands.

use appctl::{
    application::ProjectApplication,
    cli::{create_help, get_args, global_help, Args, Command, CreateArgs, PROGRAM},
    config::{load_config, Settings},
    entry::{run_command, RunOptions, EXIT_FAILURE, EXIT_SUCCESS},
    error::{default_error_handler, Error, Result},
    help::{HelpPrinter, HelpSink},
    scaffold::{create_project, CreateOptions},
};
use std::io;

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Off
        })
        .init();

    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(err) => default_error_handler(err),
    }
}

/// Main application logic execution.
///
/// # Returns
/// * `Result<i32>` - Process exit code
///
/// # Flow
/// 1. `create` scaffolds a new project and never loads a configuration
/// 2. Anything else resolves settings, loads the project configuration and
///    dispatches the command words to the project's commands
fn run(args: Args) -> Result<i32> {
    match args.command {
        Some(Command::Create(create)) => run_create(create),
        Some(Command::External(tokens)) => {
            run_project_command(args.config, args.environment, args.help, tokens)
        }
        None => run_project_command(args.config, args.environment, args.help, Vec::new()),
    }
}

fn run_create(args: CreateArgs) -> Result<i32> {
    let (Some(app_name), Some(template), false) = (&args.app_name, &args.template, args.help)
    else {
        HelpPrinter::new(create_help(), io::stdout()).show(None)?;
        return Ok(EXIT_FAILURE);
    };
    if app_name.trim().is_empty() {
        HelpPrinter::new(create_help(), io::stdout()).show(None)?;
        return Ok(EXIT_FAILURE);
    }

    let dir = match &args.dir {
        Some(dir) => std::path::absolute(dir)?,
        None => std::env::current_dir()?,
    };
    let options = CreateOptions {
        app_name: app_name.clone(),
        dir,
        template: template.clone(),
        install: args.install_command(),
    };

    println!("Using template {}", options.template);
    let project_dir = create_project(&options)?;

    println!("Application created at {}", project_dir.display());
    println!("To finalize setup you need to:");
    println!("  1) Review the generated configuration files");
    println!("  2) Declare your project commands in {}", project_dir.join(".appctl.json").display());
    println!("  3) Run them with: `{PROGRAM} [command]`");
    Ok(EXIT_SUCCESS)
}

fn run_project_command(
    config: Option<std::path::PathBuf>,
    environment: Option<String>,
    help: bool,
    tokens: Vec<String>,
) -> Result<i32> {
    let settings = Settings::from_env(config, environment)?;

    let project = match load_config(&settings) {
        Ok(project) => project,
        Err(err @ Error::ConfigError(_)) => {
            eprintln!("{err}");
            HelpPrinter::new(global_help(), io::stdout()).show(None)?;
            return Ok(EXIT_FAILURE);
        }
        Err(err) => return Err(err),
    };

    let mut app = ProjectApplication::new(project, &settings);
    let options = RunOptions {
        program: PROGRAM.to_string(),
        environment: app.environment().to_string(),
        help,
    };
    run_command(&mut app, &options, global_help(), tokens, io::stdout())
}
