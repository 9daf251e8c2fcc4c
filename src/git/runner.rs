//! Process runner for the external git executable
//!
//! Spawns git with piped stdio, streams its stderr line by line to a
//! caller-supplied sink while the process is still running, and checks
//! the exit code against the allowed set the operation declared. Lines
//! reach the sink synchronously in arrival order: the next line is not
//! read until the sink returns for the current one.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::error::{RemoraError, Result};

/// Captured outcome of a completed git invocation.
#[derive(Debug)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl GitOutput {
    /// Both streams as one text, stdout first. Git reports ref updates
    /// and transfer summaries on stderr, so parsers that only care about
    /// "what did git say" read this.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// One git invocation: program, arguments, working directory, extra
/// environment and the set of exit codes treated as success.
pub struct GitCommand {
    program: PathBuf,
    args: Vec<String>,
    cwd: PathBuf,
    envs: Vec<(String, String)>,
    /// Empty means any exit code is acceptable. Only the fast-forward
    /// batch and refspec fetches opt into widened sets; everything else
    /// declares `[0]`.
    allowed_exit_codes: Vec<i32>,
}

impl GitCommand {
    pub fn new(cwd: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: PathBuf::from("git"),
            args,
            cwd: cwd.into(),
            envs: Vec::new(),
            allowed_exit_codes: vec![0],
        }
    }

    /// Use a specific git executable instead of whatever `git` resolves
    /// to on the PATH.
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn allowed_exit_codes(mut self, codes: &[i32]) -> Self {
        self.allowed_exit_codes = codes.to_vec();
        self
    }

    /// Run to completion without observing output lines.
    pub async fn run(self) -> Result<GitOutput> {
        self.run_with_progress(|_| {}).await
    }

    /// Run to completion, feeding every stderr line to `on_line` before
    /// the next one is read. The callback sees lines exactly once, in
    /// the order the process emitted them.
    pub async fn run_with_progress<F>(self, mut on_line: F) -> Result<GitOutput>
    where
        F: FnMut(&str),
    {
        tracing::debug!(program = %self.program.display(), args = ?self.args, "spawning git");

        let mut child = create_command(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Both pipes are drained while the process runs so neither side
        // can fill its buffer and deadlock the child.
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let stdout_task = async {
            let mut buf = String::new();
            if let Some(mut stdout) = stdout_pipe {
                stdout.read_to_string(&mut buf).await?;
            }
            Ok::<String, std::io::Error>(buf)
        };

        let stderr_task = async {
            let mut stderr_text = String::new();
            if let Some(stderr) = stderr_pipe {
                let mut lines = BufReader::new(stderr).lines();
                while let Some(line) = lines.next_line().await? {
                    on_line(&line);
                    stderr_text.push_str(&line);
                    stderr_text.push('\n');
                }
            }
            Ok::<String, std::io::Error>(stderr_text)
        };

        let (stdout, stderr) = tokio::try_join!(stdout_task, stderr_task)?;
        let status = child.wait().await?;

        let Some(code) = status.code() else {
            return Err(RemoraError::Terminated);
        };

        if !self.allowed_exit_codes.is_empty() && !self.allowed_exit_codes.contains(&code) {
            tracing::warn!(code, "git exited outside the allowed set");
            return Err(RemoraError::UnexpectedExit {
                code,
                stderr: stderr.trim_end().to_string(),
            });
        }

        Ok(GitOutput {
            stdout,
            stderr,
            exit_code: code,
        })
    }
}

/// Creates a Command with platform-specific settings to hide console
/// windows on Windows, and with git's interactive credential prompting
/// disabled so a missing credential fails instead of hanging.
fn create_command(program: &Path) -> Command {
    let mut cmd = Command::new(program);

    #[cfg(target_os = "windows")]
    {
        // CREATE_NO_WINDOW = 0x08000000, prevents CMD popups
        cmd.creation_flags(0x08000000);
    }

    if program.file_stem() == Some(OsStr::new("git")) {
        cmd.env("GIT_TERMINAL_PROMPT", "0");
    }

    cmd
}
