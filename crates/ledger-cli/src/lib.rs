//! Library components for the `ledger-report` command-line tool.

#![allow(missing_docs)]

pub mod config;
pub mod filters;
pub mod loader;
pub mod logging;
pub mod report;
pub mod summary;
