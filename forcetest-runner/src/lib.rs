#![warn(missing_docs)]

//! Core orchestration logic for remote unit-test runs.
//!
//! A test run is a chain of dependent remote calls: resolve an artifact in
//! the remote registry, extract its test methods from the attached symbol
//! table, submit them to the test-execution endpoint, then fan the structured
//! result back out to local surfaces (a report channel, a status indicator,
//! per-document diagnostics, and a log buffer). The coordinator in
//! [`runner`] drives that chain; everything the host editor owns is reached
//! through the trait seams in [`surfaces`].

pub mod client;
pub mod config;
pub mod correlate;
pub mod coverage;
pub mod errors;
pub mod list;
pub mod logs;
pub mod reporter;
pub mod runner;
pub mod surfaces;
