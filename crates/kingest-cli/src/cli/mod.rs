//! CLI for kingest: run operations under the shared retry engine.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kingest_core::config::{self, KingestConfig};
use kingest_core::logging;
use kingest_core::retry::RetryPolicy;
use kingest_core::target::ServiceTarget;
use std::path::PathBuf;
use std::time::Duration;

use commands::{
    run_backoff, run_config, run_exec, run_file, run_management, CommandBackend, CommandSpec,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "kingest")]
#[command(about = "kingest: retry remote ingestion operations with jittered exponential backoff", long_about = None)]
pub struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read configuration from this file instead of ~/.config/kingest/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also write logs to ~/.local/state/kingest/kingest.log.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Retry settings; each flag overrides the `[retry]` section of the config.
#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct RetryArgs {
    /// Retries after the first attempt (3 = up to 4 attempts).
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Total time budget in seconds, retries included.
    #[arg(long, value_name = "SECS")]
    pub max_timeout: Option<u64>,

    /// Delay before the first retry, in milliseconds; doubles on every retry.
    #[arg(long, value_name = "MS")]
    pub base_delay_ms: Option<u64>,

    /// Cap on a single backoff delay, in seconds.
    #[arg(long, value_name = "SECS")]
    pub max_delay: Option<f64>,
}

impl RetryArgs {
    /// Overlay these flags on `policy` and validate the result.
    pub fn apply(&self, mut policy: RetryPolicy) -> Result<RetryPolicy> {
        if let Some(n) = self.max_retries {
            policy.max_retries = n;
        }
        if let Some(secs) = self.max_timeout {
            policy.max_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.base_delay_ms {
            policy.base_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = self.max_delay {
            let max = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid --max-delay {}", secs))?;
            policy.max_delay = Some(max);
        }
        policy.validate().context("invalid retry settings")?;
        Ok(policy)
    }
}

/// Service endpoint and database.
#[derive(Debug, Clone, PartialEq, Args)]
pub struct TargetArgs {
    /// Service endpoint URL (http or https).
    #[arg(long, value_name = "URL")]
    pub endpoint: String,

    /// Database to operate on.
    #[arg(long, value_name = "NAME")]
    pub database: String,
}

impl TargetArgs {
    pub fn target(&self) -> Result<ServiceTarget> {
        ServiceTarget::new(&self.endpoint, &self.database).context("invalid target")
    }
}

/// External program that performs the service call.
#[derive(Debug, Clone, PartialEq, Args)]
pub struct BackendArgs {
    /// Backend program; gets the target in KINGEST_* environment variables.
    #[arg(long, value_name = "PROGRAM")]
    pub backend: String,

    /// Extra argument for the backend program (repeatable).
    #[arg(long = "backend-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub backend_args: Vec<String>,

    /// Backend exit code that marks a transient failure (repeatable; default 75).
    #[arg(long = "retry-exit-code", value_name = "CODE")]
    pub retry_exit_codes: Vec<i32>,
}

impl BackendArgs {
    pub fn backend(&self, target: &ServiceTarget) -> Result<CommandBackend> {
        let command = std::iter::once(self.backend.clone())
            .chain(self.backend_args.iter().cloned())
            .collect();
        let spec = CommandSpec::new(command, self.retry_exit_codes.clone())?;
        Ok(CommandBackend::new(spec, target.clone()))
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Ingest data from a local file.
    File {
        #[command(flatten)]
        target: TargetArgs,

        /// Table to ingest into.
        #[arg(long, value_name = "NAME")]
        table: String,

        #[command(flatten)]
        backend: BackendArgs,

        #[command(flatten)]
        retry: RetryArgs,

        /// The source file to ingest.
        #[arg(value_name = "SOURCE")]
        source: PathBuf,
    },

    /// Run management commands read from a file.
    #[command(visible_alias = "mgmt")]
    Management {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        backend: BackendArgs,

        #[command(flatten)]
        retry: RetryArgs,

        /// File holding the management commands.
        #[arg(value_name = "SCRIPT_FILE")]
        script: PathBuf,
    },

    /// Run an external command, retrying it on transient failure.
    Exec {
        #[command(flatten)]
        retry: RetryArgs,

        /// Exit code that marks a transient failure (repeatable; default 75).
        #[arg(long = "retry-exit-code", value_name = "CODE")]
        retry_exit_codes: Vec<i32>,

        /// Program and arguments to run.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Show the backoff schedule a retry policy produces.
    Backoff {
        #[command(flatten)]
        retry: RetryArgs,

        /// Number of attempts to show (default: every attempt the policy allows).
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,
    },

    /// Show the config file location and the effective retry policy.
    Config,
}

impl Cli {
    /// Load config, set up logging and dispatch. Returns the process exit code.
    pub async fn run(self) -> Result<i32> {
        let (cfg, cfg_path) = match &self.config {
            Some(path) => (config::load_from(path)?, path.clone()),
            None => (config::load_or_init()?, config::config_path()?),
        };

        init_logging(self.verbose, self.log_file || cfg.log_to_file);
        tracing::debug!("loaded config from {}: {:?}", cfg_path.display(), cfg);

        match self.command {
            CliCommand::File {
                target,
                table,
                backend,
                retry,
                source,
            } => {
                let policy = effective_policy(&cfg, &retry)?;
                let target = target.target()?.with_table(&table).context("invalid target")?;
                let backend = backend.backend(&target)?;
                run_file(policy, backend, target, source).await
            }
            CliCommand::Management {
                target,
                backend,
                retry,
                script,
            } => {
                let policy = effective_policy(&cfg, &retry)?;
                let target = target.target()?;
                let backend = backend.backend(&target)?;
                run_management(policy, backend, target, &script).await
            }
            CliCommand::Exec {
                retry,
                retry_exit_codes,
                command,
            } => {
                let policy = effective_policy(&cfg, &retry)?;
                run_exec(policy, retry_exit_codes, command).await
            }
            CliCommand::Backoff { retry, attempts } => {
                let policy = effective_policy(&cfg, &retry)?;
                run_backoff(&policy, attempts)?;
                Ok(0)
            }
            CliCommand::Config => {
                run_config(&cfg, &cfg_path)?;
                Ok(0)
            }
        }
    }
}

fn effective_policy(cfg: &KingestConfig, retry: &RetryArgs) -> Result<RetryPolicy> {
    let base = cfg.retry_policy().context("config [retry] section")?;
    retry.apply(base)
}

fn init_logging(verbose: bool, to_file: bool) {
    if to_file {
        if let Err(e) = logging::init_logging(verbose) {
            logging::init_logging_stderr(verbose);
            tracing::warn!("file logging unavailable, using stderr: {:#}", e);
        }
    } else {
        logging::init_logging_stderr(verbose);
    }
}

#[cfg(test)]
mod tests;
