use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::trace;

use crate::{command::CommandSpec, error::ExecError};

/// Captured result of a finished program
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub status: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Narrow seam between the collector and the operating system
pub trait ProcessExecutor {
    /// Resolves a program the way a shell would, `None` if it cannot be run
    fn which(&self, program: &Path) -> Option<PathBuf>;

    /// Runs the command to completion and captures its output
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, ExecError>;
}

/// Runs programs with [`std::process::Command`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl ProcessExecutor for SystemExecutor {
    fn which(&self, program: &Path) -> Option<PathBuf> {
        if program.components().count() > 1 {
            return program.is_file().then(|| program.to_path_buf());
        }
        let paths = env::var_os("PATH")?;
        env::split_paths(&paths)
            .map(|dir| dir.join(program))
            .find(|candidate| candidate.is_file())
    }

    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, ExecError> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(if command.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if let (Some(input), Some(mut stdin)) = (&command.stdin, child.stdin.take()) {
            stdin
                .write_all(input.as_bytes())
                .map_err(|source| ExecError::Stdin {
                    program: command.program.clone(),
                    source,
                })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|source| ExecError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let output = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status.code(),
        };
        trace!("stdout: {}", output.stdout);
        trace!("stderr: {}", output.stderr);
        Ok(output)
    }
}
