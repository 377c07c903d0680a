//! `kingest config` – show where config lives and what policy it yields.

use anyhow::Result;
use kingest_core::config::KingestConfig;
use std::path::Path;

pub fn run_config(cfg: &KingestConfig, path: &Path) -> Result<()> {
    let policy = cfg.retry_policy()?;
    println!("config file: {}", path.display());
    println!("max retries: {}", policy.max_retries);
    println!("max timeout: {:?}", policy.max_timeout);
    println!("base delay:  {:?}", policy.base_delay);
    match policy.max_delay {
        Some(max) => println!("max delay:   {:?}", max),
        None => println!("max delay:   uncapped"),
    }
    println!("log to file: {}", cfg.log_to_file);
    Ok(())
}
