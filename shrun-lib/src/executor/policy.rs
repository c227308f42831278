use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::executor::request::{ErrorPreference, ExecutionRequest, Target};
use crate::executor::runner::{ScriptRunner, ShellRunner};

/// Fatal conditions, each mapped to a process exit code.
///
/// `DirectoryNotFound`, `UnknownTargetType` and `ScriptFileNotFound` are
/// setup errors and fire regardless of the error preference. The rest
/// only surface as errors under `ErrorPreference::Stop`; under
/// `Continue` the engine degrades them to warnings instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Working folder does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Invalid targetType provided: '{0}'")]
    UnknownTargetType(String),

    #[error("Script file not found: {}", .0.display())]
    ScriptFileNotFound(PathBuf),

    #[error("Inline script execution failed with error: {0}")]
    InlineScriptFailed(String),

    #[error("Script execution failed with error: {0}")]
    FileScriptFaulted(String),

    #[error("Script exited with a non-zero exit code: {0}")]
    NonZeroExit(i32),
}

impl EngineError {
    /// Every fatal condition exits 1, except a non-zero script exit
    /// which propagates the script's own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NonZeroExit(code) => *code,
            _ => 1,
        }
    }
}

/// Non-fatal result of an invocation; both variants exit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    WarnAndContinue,
}

impl Disposition {
    pub fn exit_code(&self) -> i32 {
        0
    }
}

/// The execution-policy engine: validates the working folder, dispatches
/// on the target, and translates the runner's outcome into a disposition
/// or a fatal error. Strictly sequential; every fault is evaluated
/// exactly once against the error preference, never retried.
pub struct Engine<R> {
    runner: R,
}

impl Engine<ShellRunner> {
    pub fn new(config: &Config) -> Self {
        Self::with_runner(ShellRunner::new(config.core.shell.clone()))
    }
}

impl<R: ScriptRunner> Engine<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub async fn execute(
        &self,
        request: &ExecutionRequest,
        dry_run: bool,
    ) -> Result<Disposition, EngineError> {
        let cwd = &request.working_folder;
        if !cwd.is_dir() {
            return Err(EngineError::DirectoryNotFound(cwd.clone()));
        }

        match &request.target {
            Target::Inline { script } => {
                info!("Running inline script...");

                if dry_run {
                    println!(
                        "Would execute: inline script ({} bytes) (cwd: {})",
                        script.len(),
                        cwd.display()
                    );
                    return Ok(Disposition::Continue);
                }

                let outcome = self.runner.evaluate_inline(script, cwd).await;
                if !outcome.raised {
                    return Ok(Disposition::Continue);
                }

                let detail = outcome.detail.unwrap_or_else(|| "unknown error".to_string());
                match request.error_preference {
                    ErrorPreference::Stop => Err(EngineError::InlineScriptFailed(detail)),
                    ErrorPreference::Continue => {
                        warn!("Inline script execution encountered an error: {detail}");
                        Ok(Disposition::WarnAndContinue)
                    }
                }
            }
            Target::File { path, arguments } => {
                info!("Running script from file path...");

                let resolved = if path.is_absolute() {
                    path.clone()
                } else {
                    cwd.join(path)
                };
                if !resolved.is_file() {
                    return Err(EngineError::ScriptFileNotFound(resolved));
                }

                if dry_run {
                    println!(
                        "Would execute: {} {} (cwd: {})",
                        resolved.display(),
                        arguments.join(" "),
                        cwd.display()
                    );
                    return Ok(Disposition::Continue);
                }

                let outcome = self.runner.execute_file(&resolved, arguments, cwd).await;
                if outcome.raised {
                    let detail = outcome.detail.unwrap_or_else(|| "unknown error".to_string());
                    return match request.error_preference {
                        ErrorPreference::Stop => Err(EngineError::FileScriptFaulted(detail)),
                        ErrorPreference::Continue => {
                            warn!("Script execution encountered an error: {detail}");
                            Ok(Disposition::WarnAndContinue)
                        }
                    };
                }

                if request.ignore_exit_code {
                    return Ok(Disposition::Continue);
                }

                if outcome.exit_code != 0 {
                    return match request.error_preference {
                        ErrorPreference::Stop => Err(EngineError::NonZeroExit(outcome.exit_code)),
                        ErrorPreference::Continue => {
                            warn!(
                                "Script exited with a non-zero exit code: {}",
                                outcome.exit_code
                            );
                            Ok(Disposition::WarnAndContinue)
                        }
                    };
                }

                Ok(Disposition::Continue)
            }
        }
    }
}
