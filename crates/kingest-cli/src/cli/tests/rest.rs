//! Tests for backoff, config, global flags and retry flag overlay.

use super::{parse, parse_cli};
use crate::cli::{CliCommand, RetryArgs};
use kingest_core::retry::RetryPolicy;
use std::path::Path;
use std::time::Duration;

#[test]
fn cli_parse_backoff() {
    match parse(&["kingest", "backoff", "--attempts", "6", "--base-delay-ms", "100"]) {
        CliCommand::Backoff { retry, attempts } => {
            assert_eq!(attempts, Some(6));
            assert_eq!(retry.base_delay_ms, Some(100));
        }
        _ => panic!("expected Backoff"),
    }
}

#[test]
fn cli_parse_config() {
    assert!(matches!(parse(&["kingest", "config"]), CliCommand::Config));
}

#[test]
fn cli_parse_global_flags_after_subcommand() {
    let cli = parse_cli(&["kingest", "config", "-v", "--config", "/tmp/k.toml", "--log-file"]);
    assert!(cli.verbose);
    assert!(cli.log_file);
    assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/k.toml")));
}

#[test]
fn retry_args_override_policy() {
    let args = RetryArgs {
        max_retries: Some(7),
        max_timeout: Some(5),
        base_delay_ms: Some(200),
        max_delay: Some(1.5),
    };
    let policy = args.apply(RetryPolicy::default()).unwrap();
    assert_eq!(policy.max_retries, 7);
    assert_eq!(policy.max_timeout, Duration::from_secs(5));
    assert_eq!(policy.base_delay, Duration::from_millis(200));
    assert_eq!(policy.max_delay, Some(Duration::from_millis(1500)));
}

#[test]
fn retry_args_keep_unset_fields() {
    let base = RetryPolicy::new(2, 30, Duration::from_secs(1));
    assert_eq!(RetryArgs::default().apply(base).unwrap(), base);
}

#[test]
fn retry_args_reject_invalid_values() {
    let zero_base = RetryArgs {
        base_delay_ms: Some(0),
        ..RetryArgs::default()
    };
    assert!(zero_base.apply(RetryPolicy::default()).is_err());

    let negative_cap = RetryArgs {
        max_delay: Some(-1.0),
        ..RetryArgs::default()
    };
    assert!(negative_cap.apply(RetryPolicy::default()).is_err());

    let cap_below_base = RetryArgs {
        base_delay_ms: Some(2000),
        max_delay: Some(1.0),
        ..RetryArgs::default()
    };
    assert!(cap_below_base.apply(RetryPolicy::default()).is_err());
}
