// src/services/process.rs

//! External tool invocation.
//!
//! Runs a tool to completion, forwards its output to the log line by line
//! while it runs and checks the exit code against the tool's allow-list.
//! There is no retry: one invocation, and a failure ends the run.

use std::collections::VecDeque;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use log::Level;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::error::{AppError, Result};

/// Trailing stderr lines repeated in the log when a tool fails.
const STDERR_TAIL_LINES: usize = 20;

/// A single external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    acceptable_exit_codes: Vec<i32>,
    output_level: Level,
}

impl ToolCommand {
    /// Create a command that only accepts exit code 0.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            acceptable_exit_codes: vec![0],
            output_level: Level::Debug,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Replace the allow-list of exit codes treated as success.
    pub fn acceptable_exit_codes(mut self, codes: &[i32]) -> Self {
        self.acceptable_exit_codes = codes.to_vec();
        self
    }

    /// Level the tool's output lines are logged at (debug by default).
    pub fn output_level(mut self, level: Level) -> Self {
        self.output_level = level;
        self
    }

    pub fn program(&self) -> String {
        self.program.display().to_string()
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn is_acceptable(&self, code: Option<i32>) -> bool {
        code.is_some_and(|c| self.acceptable_exit_codes.contains(&c))
    }
}

/// Runs [`ToolCommand`]s as subprocesses.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run the command to completion.
    ///
    /// Fails with [`AppError::Process`] if the tool cannot be started and with
    /// [`AppError::UnacceptableExitCode`] if it exits outside its allow-list.
    pub async fn run(&self, command: &ToolCommand) -> Result<ExitStatus> {
        let program = command.program();
        log::info!("Running `{}` with arguments {:?}", program, command.args);

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::process(&program, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::process(&program, "stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AppError::process(&program, "stderr was not captured"))?;

        let level = command.output_level;
        let (stdout_result, stderr_result) = tokio::join!(
            forward_lines(&program, "stdout", stdout, level),
            forward_lines(&program, "stderr", stderr, level),
        );
        let status = child
            .wait()
            .await
            .map_err(|e| AppError::process(&program, e))?;
        stdout_result.map_err(|e| AppError::process(&program, e))?;
        let stderr_tail = stderr_result.map_err(|e| AppError::process(&program, e))?;

        let code = status.code();
        if !command.is_acceptable(code) {
            if !stderr_tail.is_empty() {
                log::warn!("`{program}` stderr:\n{}", stderr_tail.join("\n"));
            }
            return Err(AppError::UnacceptableExitCode {
                program,
                code,
                acceptable: command.acceptable_exit_codes.clone(),
            });
        }

        log::info!("`{program}` finished with {status}");
        Ok(status)
    }
}

/// Log every line of `reader` as it arrives and return the last few.
async fn forward_lines<R: AsyncRead + Unpin>(
    program: &str,
    stream: &str,
    reader: R,
    level: Level,
) -> std::io::Result<Vec<String>> {
    let mut segments = BufReader::new(reader).split(b'\n');
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);

    while let Some(segment) = segments.next_segment().await? {
        let line = String::from_utf8_lossy(&segment);
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        log::log!(level, "[{program} {stream}] {line}");

        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line.to_string());
    }

    Ok(tail.into())
}
