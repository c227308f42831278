use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Outcome of evaluating inline script text. Inline mode reports only
/// fault/no-fault; the shell's numeric code is folded into `detail`.
#[derive(Debug, Clone)]
pub struct InlineOutcome {
    pub raised: bool,
    pub detail: Option<String>,
}

/// Outcome of executing a script file. `raised` is true only when the
/// process could not be launched; otherwise `exit_code` carries the
/// script's own result.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub raised: bool,
    pub detail: Option<String>,
    pub exit_code: i32,
}

/// The external capability that actually runs scripts. The policy
/// engine only sees these two operations.
#[async_trait]
pub trait ScriptRunner {
    async fn evaluate_inline(&self, script: &str, cwd: &Path) -> InlineOutcome;
    async fn execute_file(&self, path: &Path, args: &[String], cwd: &Path) -> FileOutcome;
}

/// Runs scripts through a shell subprocess with inherited stdio, so
/// script output streams straight to the caller's terminal.
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

#[async_trait]
impl ScriptRunner for ShellRunner {
    async fn evaluate_inline(&self, script: &str, cwd: &Path) -> InlineOutcome {
        debug!(shell = %self.shell, "evaluating inline script");

        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(script)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => InlineOutcome {
                raised: false,
                detail: None,
            },
            Ok(status) => InlineOutcome {
                raised: true,
                detail: Some(format!(
                    "{} exited with code {}",
                    self.shell,
                    status.code().unwrap_or(1)
                )),
            },
            Err(err) => InlineOutcome {
                raised: true,
                detail: Some(format!("failed to spawn {}: {err}", self.shell)),
            },
        }
    }

    async fn execute_file(&self, path: &Path, args: &[String], cwd: &Path) -> FileOutcome {
        debug!(
            shell = %self.shell,
            script = %path.display(),
            argc = args.len(),
            "executing script file"
        );

        let status = Command::new(&self.shell)
            .arg(path)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await;

        match status {
            Ok(status) => {
                // A signal-killed child reports no code; treat it as 1.
                let exit_code = status.code().unwrap_or(1);
                debug!(exit_code, "script file completed");
                FileOutcome {
                    raised: false,
                    detail: None,
                    exit_code,
                }
            }
            Err(err) => FileOutcome {
                raised: true,
                detail: Some(format!("failed to spawn {}: {err}", self.shell)),
                exit_code: 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn runner() -> ShellRunner {
        ShellRunner::new("/bin/sh")
    }

    #[tokio::test]
    async fn inline_success_is_not_raised() {
        let temp = TempDir::new().unwrap();
        let outcome = runner().evaluate_inline("true", temp.path()).await;
        assert!(!outcome.raised);
        assert!(outcome.detail.is_none());
    }

    #[tokio::test]
    async fn inline_nonzero_exit_is_raised() {
        let temp = TempDir::new().unwrap();
        let outcome = runner().evaluate_inline("exit 1", temp.path()).await;
        assert!(outcome.raised);
        assert!(outcome.detail.unwrap().contains("exited with code 1"));
    }

    #[tokio::test]
    async fn inline_runs_in_the_given_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("marker"), "").unwrap();
        let outcome = runner().evaluate_inline("test -f marker", temp.path()).await;
        assert!(!outcome.raised);
    }

    #[tokio::test]
    async fn file_exit_code_is_reported() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("fail.sh");
        fs::write(&script, "exit 7\n").unwrap();

        let outcome = runner().execute_file(&script, &[], temp.path()).await;
        assert!(!outcome.raised);
        assert_eq!(outcome.exit_code, 7);
    }

    #[tokio::test]
    async fn file_receives_positional_arguments() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("count.sh");
        fs::write(&script, "[ \"$#\" -eq 3 ] || exit 9\n[ \"$2\" = b ] || exit 8\n").unwrap();

        let args = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let outcome = runner().execute_file(&script, &args, temp.path()).await;
        assert!(!outcome.raised);
        assert_eq!(outcome.exit_code, 0);
    }

    #[tokio::test]
    async fn missing_shell_is_raised() {
        let temp = TempDir::new().unwrap();
        let runner = ShellRunner::new("/nonexistent/shell");
        let outcome = runner.evaluate_inline("true", temp.path()).await;
        assert!(outcome.raised);
        assert!(outcome.detail.unwrap().contains("failed to spawn"));
    }
}
