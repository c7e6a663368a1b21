//! Subprocess execution.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context;

use super::extract::OutputPattern;
use crate::error::OnboardError;

const SHELL_SPECIAL: &str = "\"'{}[]$&|;<>()*?`\\";

/// A fully described external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables. Values are never logged.
    pub envs: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Whether any argument equals `needle`.
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|arg| arg == needle)
    }

    /// Human-readable command line (environment omitted).
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                let needs_quotes = part.is_empty()
                    || part.contains(|c: char| c.is_whitespace() || SHELL_SPECIAL.contains(c));
                if needs_quotes {
                    format!("'{}'", part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured outcome of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalCommandResult {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub extracted: Option<String>,
}

impl ExternalCommandResult {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stderr: stderr.into(),
            ..Default::default()
        }
    }

    /// Zero exit and nothing on stderr.
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0) && self.stderr.trim().is_empty()
    }

    fn status_label(&self) -> String {
        match self.exit_code {
            Some(0) => "exit code 0 with stderr output".to_string(),
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs external commands. Implemented by [`SystemRunner`] and by test fakes.
pub trait CommandRunner {
    fn run(&self, command: &ToolCommand) -> anyhow::Result<ExternalCommandResult>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> anyhow::Result<ExternalCommandResult> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        for (key, value) in &command.envs {
            cmd.env(key, value);
        }
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd.output().map_err(|err| {
            anyhow::Error::new(OnboardError::Subprocess {
                command: command.display(),
                status: "failed to start".to_string(),
                stderr: err.to_string(),
            })
        })?;

        Ok(ExternalCommandResult {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            extracted: None,
        })
    }
}

/// Runs commands and enforces the no-partial-success rule.
#[derive(Clone, Copy)]
pub struct ToolInvoker<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> ToolInvoker<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Run `command`; a non-zero exit or any stderr output is a `Subprocess` error.
    pub fn run(&self, command: &ToolCommand) -> anyhow::Result<ExternalCommandResult> {
        let line = command.display();
        tracing::debug!("Running: {}", line);

        let result = self
            .runner
            .run(command)
            .with_context(|| format!("Failed to run {}", command.program))?;

        if !result.is_success() {
            return Err(OnboardError::Subprocess {
                command: line,
                status: result.status_label(),
                stderr: result.stderr.trim().to_string(),
            }
            .into());
        }

        tracing::debug!(stdout = %result.stdout.trim(), "command finished");
        Ok(result)
    }

    /// Run `command` and pull one value out of its stdout.
    pub fn run_extract(
        &self,
        command: &ToolCommand,
        pattern: &OutputPattern,
    ) -> anyhow::Result<ExternalCommandResult> {
        let result = self.run(command)?;
        extract(result, pattern, &command.display())
    }
}

/// Apply `pattern` to a successful result.
///
/// A missing match is an `Extraction` error, distinct from a failed process.
pub fn extract(
    mut result: ExternalCommandResult,
    pattern: &OutputPattern,
    command: &str,
) -> anyhow::Result<ExternalCommandResult> {
    match pattern.apply(&result.stdout) {
        Some(value) => {
            result.extracted = Some(value);
            Ok(result)
        }
        None => Err(OnboardError::Extraction {
            command: command.to_string(),
            pattern: pattern.name().to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Canned {
        result: ExternalCommandResult,
        seen: RefCell<Vec<ToolCommand>>,
    }

    impl CommandRunner for Canned {
        fn run(&self, command: &ToolCommand) -> anyhow::Result<ExternalCommandResult> {
            self.seen.borrow_mut().push(command.clone());
            Ok(self.result.clone())
        }
    }

    fn canned(result: ExternalCommandResult) -> Canned {
        Canned {
            result,
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_display_quotes_whitespace_and_hides_env() {
        let cmd = ToolCommand::new("ts-node")
            .args(["submit-proposal.js", "-t", "Register foo-1"])
            .env("PRIVATE_KEY", "0xsecret");

        let line = cmd.display();
        assert_eq!(line, "ts-node submit-proposal.js -t 'Register foo-1'");
        assert!(!line.contains("0xsecret"));
    }

    #[test]
    fn test_display_quotes_json_arguments() {
        let cmd = ToolCommand::new("axelard").args(["tx", r#"{"add_rewards":{}}"#]);
        assert_eq!(cmd.display(), r#"axelard tx '{"add_rewards":{}}'"#);
    }

    #[test]
    fn test_non_zero_exit_is_subprocess_error() {
        let runner = canned(ExternalCommandResult::failure(2, "boom"));
        let err = ToolInvoker::new(&runner)
            .run(&ToolCommand::new("axelard"))
            .unwrap_err();

        assert!(OnboardError::is_subprocess(&err));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_stderr_output_is_fatal_even_on_zero_exit() {
        let runner = canned(ExternalCommandResult {
            exit_code: Some(0),
            stdout: "ok".to_string(),
            stderr: "warning: something".to_string(),
            extracted: None,
        });
        let err = ToolInvoker::new(&runner)
            .run(&ToolCommand::new("axelard"))
            .unwrap_err();

        assert!(OnboardError::is_subprocess(&err));
    }

    #[test]
    fn test_missing_pattern_is_extraction_error() {
        let runner = canned(ExternalCommandResult::success("nothing useful here"));
        let pattern = OutputPattern::line("tx hash", r"txhash: ([0-9A-F]+)");
        let err = ToolInvoker::new(&runner)
            .run_extract(&ToolCommand::new("axelard"), &pattern)
            .unwrap_err();

        assert!(OnboardError::is_extraction(&err));
        assert!(!OnboardError::is_subprocess(&err));
    }

    #[test]
    fn test_extracted_value_is_attached() {
        let runner = canned(ExternalCommandResult::success("txhash: ABC123\n"));
        let pattern = OutputPattern::line("tx hash", r"txhash: ([0-9A-F]+)");
        let result = ToolInvoker::new(&runner)
            .run_extract(&ToolCommand::new("axelard"), &pattern)
            .unwrap();

        assert_eq!(result.extracted.as_deref(), Some("ABC123"));
        assert_eq!(runner.seen.borrow().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_stdout() {
        let result = SystemRunner
            .run(&ToolCommand::new("sh").args(["-c", "echo hello"]))
            .unwrap();
        assert!(result.is_success());
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn test_system_runner_missing_binary_is_subprocess_error() {
        let err = SystemRunner
            .run(&ToolCommand::new("definitely-not-a-real-binary-onboard"))
            .unwrap_err();
        assert!(OnboardError::is_subprocess(&err));
    }
}
