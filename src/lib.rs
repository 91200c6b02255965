//! # k8s-debug-collector
//!
//! Collects a best-effort debug snapshot of a Kubernetes cluster running
//! Percona database operators into a single `tar.gz` archive.
//!
//! ## Overview
//!
//! The collector drives the cluster CLI (`kubectl` or a compatible binary)
//! to dump resource manifests, pod logs, colocated secrets, selected files
//! from database containers, and a database diagnostic report per workload
//! pod. Every partial failure is recorded in `errors.txt` inside the archive
//! instead of aborting the run.
//!
//! ## Features
//!
//! - **Workload discovery**: `--resource auto` inspects the API server for
//!   operator custom resources
//! - **Workload profiles**: PXC, Percona Server for MySQL, MongoDB and both
//!   PostgreSQL operator generations
//! - **Diagnostic reports**: `pt-mysql-summary`, `pt-mongodb-summary` or
//!   pg_gather, reached through a scoped port-forward
//! - **Streaming output**: entries go straight into a gzip-compressed tar
//!
//! ## Usage
//!
//! ```no_run
//! use k8s_debug_collector::collectors::collector::ClusterDumper;
//! use k8s_debug_collector::config::CollectorOptions;
//! use k8s_debug_collector::utils::process::SystemRunner;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dumper = ClusterDumper::new(CollectorOptions::default(), Box::new(SystemRunner))?;
//! let archive = dumper.dump_cluster()?;
//! println!("Wrote {}", archive.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions
//! - [`models`]: Serde models of the cluster JSON the collector reads
//! - [`collectors`]: The collection pipeline
//! - [`config`]: Run options, resolved configuration and workload profiles
//! - [`utils`]: Process invocation and archive writing
//! - [`security`]: Credential scrubbing for log output
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Data models decoded from cluster CLI output
pub mod models;

/// Cluster collection pipeline
pub mod collectors;

/// Process invocation and archive writing
pub mod utils;

/// Run options, resolved configuration and workload profiles
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Credential protection for log output
pub mod security;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;
