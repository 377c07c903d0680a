//! `kingest exec -- <program> [args...]` – run a command under the retry engine.
//!
//! The command is the operation: exit 0 is success, a retryable exit code (or
//! death by signal) is a transient failure, anything else is permanent.
//! Ctrl-C cancels pending retries and interrupts a backoff wait.

use anyhow::{Context, Result};
use kingest_core::control::CancelToken;
use kingest_core::retry::{self, Classification, Completed, RetryError, RetryPolicy};
use std::fmt;
use std::io;
use std::process::{Command, ExitStatus};

use super::runner::{exit_code, run_cancellable};

/// `EX_TEMPFAIL` from sysexits.h: "temporary failure, try again later".
pub const DEFAULT_RETRY_EXIT_CODE: i32 = 75;

/// Why one run of the command failed.
#[derive(Debug)]
pub enum CommandError {
    /// The program could not be started.
    Spawn(io::Error),
    /// The program exited with a non-zero code.
    Exit(i32),
    /// The program was killed by a signal.
    Terminated,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Spawn(e) => write!(f, "failed to start: {}", e),
            CommandError::Exit(code) => write!(f, "exited with code {}", code),
            CommandError::Terminated => write!(f, "terminated by signal"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Spawn(e) => Some(e),
            CommandError::Exit(_) | CommandError::Terminated => None,
        }
    }
}

/// Program, arguments and the exit codes that count as transient.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub retry_exit_codes: Vec<i32>,
}

impl CommandSpec {
    /// Build from `program args...`; an empty code list means the default (75).
    pub fn new(command: Vec<String>, retry_exit_codes: Vec<i32>) -> Result<Self> {
        let mut parts = command.into_iter();
        let program = parts.next().context("no command given")?;
        let retry_exit_codes = if retry_exit_codes.is_empty() {
            vec![DEFAULT_RETRY_EXIT_CODE]
        } else {
            retry_exit_codes
        };
        Ok(Self {
            program,
            args: parts.collect(),
            retry_exit_codes,
        })
    }

    pub fn classify(&self, e: &CommandError) -> Classification {
        match e {
            CommandError::Spawn(io_err) => Classification::from_retryable(matches!(
                io_err.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
            )),
            CommandError::Exit(code) => {
                Classification::from_retryable(self.retry_exit_codes.contains(code))
            }
            CommandError::Terminated => Classification::Retryable,
        }
    }

    /// A `Command` for the program and its fixed arguments.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Run the program once, inheriting stdio.
    pub fn run_once(&self) -> Result<(), CommandError> {
        let status = self.command().status().map_err(CommandError::Spawn)?;
        check_status(status)
    }
}

/// Exit 0 is success; a code or a signal is a `CommandError`.
pub fn check_status(status: ExitStatus) -> Result<(), CommandError> {
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(CommandError::Exit(code)),
        None => Err(CommandError::Terminated),
    }
}

/// Run `spec` under `policy` on the current thread. Retries are reported by
/// the engine's own log events.
pub fn run_command_with_retries(
    spec: &CommandSpec,
    policy: &RetryPolicy,
    cancel: &CancelToken,
) -> Result<Completed<()>, RetryError<CommandError>> {
    tracing::debug!(
        program = %spec.program,
        args = ?spec.args,
        retry_exit_codes = ?spec.retry_exit_codes,
        max_retries = policy.max_retries,
        max_timeout = ?policy.max_timeout,
        "exec settings"
    );
    let classify = |e: &CommandError| spec.classify(e);
    retry::invoke_with_retries(
        policy,
        cancel,
        &classify,
        |_| {},
        || spec.run_once(),
    )
}

pub async fn run_exec(
    policy: RetryPolicy,
    retry_exit_codes: Vec<i32>,
    command: Vec<String>,
) -> Result<i32> {
    let spec = CommandSpec::new(command, retry_exit_codes)?;

    let worker_spec = spec.clone();
    let result =
        run_cancellable(move |cancel| run_command_with_retries(&worker_spec, &policy, cancel))
            .await?;

    match &result {
        Ok(done) => {
            tracing::info!(program = %spec.program, attempts = done.attempts, "command succeeded");
        }
        Err(e) => eprintln!("kingest: {}: {}", spec.program, e),
    }
    Ok(exit_code(&result))
}
