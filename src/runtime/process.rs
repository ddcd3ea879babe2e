//! Subprocess execution described by explicit command values.

use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::RealRuntime;

/// A subprocess invocation: program, arguments, and working directory.
///
/// The working directory travels with the command instead of being mutated
/// process-wide, so invocations stay composable and testable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        command
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl RealRuntime {
    pub(crate) fn run_impl(&self, cmd: &CommandSpec) -> Result<ExecOutput> {
        let output = cmd
            .command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run '{}'", cmd))?;

        Ok(ExecOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    pub(crate) fn run_interactive_impl(&self, cmd: &CommandSpec) -> Result<Option<i32>> {
        let status = cmd
            .command()
            .status()
            .with_context(|| format!("Failed to run '{}'", cmd))?;
        Ok(status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_command_spec_builder() {
        let cmd = CommandSpec::new("git")
            .arg("clone")
            .arg("--quiet")
            .cwd("/tmp");

        assert_eq!(cmd.program, "git");
        assert_eq!(cmd.args, vec!["clone".to_string(), "--quiet".to_string()]);
        assert_eq!(cmd.cwd.as_deref(), Some(Path::new("/tmp")));
    }

    #[test]
    fn test_command_spec_display() {
        let cmd = CommandSpec::new("pacman").arg("-Q").arg("foo");
        assert_eq!(cmd.to_string(), "pacman -Q foo");
    }

    #[test]
    fn test_exec_output_success() {
        let ok = ExecOutput {
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(ok.success());

        let failed = ExecOutput {
            code: Some(1),
            ..ok.clone()
        };
        assert!(!failed.success());

        let killed = ExecOutput { code: None, ..ok };
        assert!(!killed.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_output_and_code() {
        let rt = RealRuntime;

        let cmd = CommandSpec::new("sh").arg("-c").arg("echo out; echo err >&2");
        let output = rt.run_impl(&cmd).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");

        let failing = CommandSpec::new("sh").arg("-c").arg("exit 3");
        let output = rt.run_impl(&failing).unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_respects_cwd() {
        let rt = RealRuntime;
        let dir = tempfile::tempdir().unwrap();

        let cmd = CommandSpec::new("pwd").cwd(dir.path());
        let output = rt.run_impl(&cmd).unwrap();
        let reported = Path::new(output.stdout.trim()).canonicalize().unwrap();
        assert_eq!(reported, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_run_missing_program_is_error() {
        let rt = RealRuntime;
        let cmd = CommandSpec::new("aursmith-no-such-program");
        assert!(rt.run_impl(&cmd).is_err());
        assert!(rt.run_interactive_impl(&cmd).is_err());
    }
}
