pub mod config;
pub mod control;
pub mod ingest;
pub mod logging;
pub mod management;
pub mod retry;
pub mod service;
pub mod target;
