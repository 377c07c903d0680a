//! CLI command handlers, one per file.

mod backend;
mod backoff;
mod config;
mod exec;
mod file;
mod management;
mod runner;

pub use backend::CommandBackend;
pub use backoff::run_backoff;
pub use config::run_config;
pub use exec::{run_exec, CommandSpec};
pub use file::run_file;
pub use management::run_management;
