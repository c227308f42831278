use anyhow::{Context, Result};
use clap::Parser;
use shrun_lib::executor::{split_arguments, Target, TargetType};
use shrun_lib::{Config, Engine, ErrorPreference, ExecutionRequest};
use std::path::PathBuf;
use std::process;
use tracing::{error, Level};

#[derive(Parser)]
#[command(name = "shrun")]
#[command(about = "A predictable execution wrapper for shell scripts and inline commands")]
#[command(version)]
struct Cli {
    /// What to execute: 'inlineScript' or 'filePath'
    #[arg(long)]
    target_type: String,

    /// Inline script text (targetType = inlineScript)
    #[arg(long)]
    script: Option<String>,

    /// Script file to execute (targetType = filePath)
    #[arg(long)]
    file_path: Option<PathBuf>,

    /// Whitespace-delimited arguments passed to the script file
    #[arg(long)]
    arguments: Option<String>,

    /// Directory to execute in, defaults to the current directory
    #[arg(long)]
    working_folder: Option<PathBuf>,

    /// Failure policy: 'stop' or 'continue'
    #[arg(long)]
    error_preference: Option<String>,

    /// Treat a non-zero script exit code as success
    #[arg(long)]
    ignore_exit_code: bool,

    /// Override config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show what would be executed without running
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet output
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(err) => {
            error!("{err:#}");
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose > 0 {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // Logs go to stderr so script output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let config = Config::load_with_override(cli.config.clone())?;
    let request = build_request(&cli, &config)?;
    let engine = Engine::new(&config);

    match engine.execute(&request, cli.dry_run).await {
        Ok(disposition) => Ok(disposition.exit_code()),
        Err(err) => {
            error!("{err}");
            Ok(err.exit_code())
        }
    }
}

fn build_request(cli: &Cli, config: &Config) -> Result<ExecutionRequest> {
    let target = match cli.target_type.parse::<TargetType>()? {
        TargetType::InlineScript => {
            let script = cli
                .script
                .clone()
                .context("targetType 'inlineScript' requires --script")?;
            Target::Inline { script }
        }
        TargetType::FilePath => {
            let path = cli
                .file_path
                .clone()
                .context("targetType 'filePath' requires --file-path")?;
            let arguments = split_arguments(cli.arguments.as_deref().unwrap_or(""));
            Target::File { path, arguments }
        }
    };

    let error_preference = match &cli.error_preference {
        Some(raw) => raw.parse::<ErrorPreference>()?,
        None => config.core.error_preference,
    };

    Ok(ExecutionRequest::new(
        target,
        cli.working_folder.clone(),
        error_preference,
        cli.ignore_exit_code || config.core.ignore_exit_code,
    ))
}
