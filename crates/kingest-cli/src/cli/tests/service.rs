//! Tests for the file and management subcommands.

use super::parse;
use crate::cli::{BackendArgs, Cli, CliCommand, RetryArgs, TargetArgs};
use clap::Parser;
use std::path::Path;

fn target_args() -> TargetArgs {
    TargetArgs {
        endpoint: "https://example.kusto.windows.net".into(),
        database: "TestDatabase".into(),
    }
}

#[test]
fn cli_parse_file() {
    match parse(&[
        "kingest",
        "file",
        "--endpoint",
        "https://example.kusto.windows.net",
        "--database",
        "TestDatabase",
        "--table",
        "Events",
        "--backend",
        "kusto-upload",
        "--backend-arg",
        "--format=csv",
        "--max-retries",
        "4",
        "rows.csv",
    ]) {
        CliCommand::File {
            target,
            table,
            backend,
            retry,
            source,
        } => {
            assert_eq!(target, target_args());
            assert_eq!(table, "Events");
            assert_eq!(backend.backend, "kusto-upload");
            assert_eq!(backend.backend_args, vec!["--format=csv"]);
            assert!(backend.retry_exit_codes.is_empty());
            assert_eq!(retry.max_retries, Some(4));
            assert_eq!(source, Path::new("rows.csv"));
        }
        _ => panic!("expected File"),
    }
}

#[test]
fn cli_parse_file_requires_table() {
    let res = Cli::try_parse_from([
        "kingest",
        "file",
        "--endpoint",
        "https://example.kusto.windows.net",
        "--database",
        "TestDatabase",
        "--backend",
        "kusto-upload",
        "rows.csv",
    ]);
    assert!(res.is_err());
}

#[test]
fn cli_parse_management_and_alias() {
    for name in ["management", "mgmt"] {
        match parse(&[
            "kingest",
            name,
            "--endpoint",
            "https://example.kusto.windows.net",
            "--database",
            "TestDatabase",
            "--backend",
            "kusto-mgmt",
            "--retry-exit-code",
            "9",
            "setup.kql",
        ]) {
            CliCommand::Management {
                target,
                backend,
                retry,
                script,
            } => {
                assert_eq!(target, target_args());
                assert_eq!(backend.retry_exit_codes, vec![9]);
                assert_eq!(retry, RetryArgs::default());
                assert_eq!(script, Path::new("setup.kql"));
            }
            _ => panic!("expected Management"),
        }
    }
}

#[test]
fn cli_parse_management_requires_target() {
    let res = Cli::try_parse_from(["kingest", "mgmt", "--backend", "kusto-mgmt", "setup.kql"]);
    assert!(res.is_err());
}

#[test]
fn target_args_validate_endpoint() {
    let target = target_args().target().unwrap();
    assert_eq!(target.database, "TestDatabase");
    assert_eq!(target.table, None);

    let bad = TargetArgs {
        endpoint: "ftp://example.com".into(),
        ..target_args()
    };
    assert!(bad.target().is_err());
}

#[test]
fn backend_args_build_backend() {
    let args = BackendArgs {
        backend: "kusto-upload".into(),
        backend_args: vec!["--quiet".into()],
        retry_exit_codes: vec![],
    };
    assert!(args.backend(&target_args().target().unwrap()).is_ok());
}
