use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::executor::policy::EngineError;

/// How the wrapper is asked to execute: literal script text or a file.
///
/// Parsed once at the CLI boundary; past that point dispatch is an
/// exhaustive match and no invalid-value branch exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    InlineScript,
    FilePath,
}

impl FromStr for TargetType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("inlineScript") {
            Ok(Self::InlineScript)
        } else if s.eq_ignore_ascii_case("filePath") {
            Ok(Self::FilePath)
        } else {
            Err(EngineError::UnknownTargetType(s.to_string()))
        }
    }
}

/// What to do when the script faults or exits non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPreference {
    #[default]
    Stop,
    Continue,
}

impl FromStr for ErrorPreference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("stop") {
            Ok(Self::Stop)
        } else if s.eq_ignore_ascii_case("continue") {
            Ok(Self::Continue)
        } else {
            bail!("Invalid errorPreference provided: '{s}'")
        }
    }
}

/// Execution target with its payload. Carrying the script text or the
/// file path inside the variant keeps "exactly one of the two is
/// relevant" structural rather than an invariant to re-check.
#[derive(Debug, Clone)]
pub enum Target {
    Inline { script: String },
    File { path: PathBuf, arguments: Vec<String> },
}

/// Immutable inputs for one engine invocation.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub target: Target,
    pub working_folder: PathBuf,
    pub error_preference: ErrorPreference,
    pub ignore_exit_code: bool,
}

impl ExecutionRequest {
    /// An absent or empty working folder resolves to the current directory.
    pub fn new(
        target: Target,
        working_folder: Option<PathBuf>,
        error_preference: ErrorPreference,
        ignore_exit_code: bool,
    ) -> Self {
        let working_folder = match working_folder {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => PathBuf::from("."),
        };

        Self {
            target,
            working_folder,
            error_preference,
            ignore_exit_code,
        }
    }
}

/// Split a raw argument string into positional tokens. Runs of
/// whitespace never produce empty tokens.
pub fn split_arguments(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}
