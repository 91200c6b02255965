//! Cluster collection pipeline.
//!
//! One [`collector::ClusterDumper`] run walks the cluster strictly in
//! sequence:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ ClusterDumper                                │
//! │   namespaces ─► pods ─► resource kinds       │
//! │                  │                           │
//! │                  ├─ logs                     │
//! │                  ├─ colocated secret         │
//! │                  ├─ summary (port-forward)   │
//! │                  └─ container files          │
//! │   nodes                                      │
//! ├──────────────────────────────────────────────┤
//! │ DumpSink: ArchiveWriter + ErrorLedger        │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Every step writes through a [`sink::DumpSink`]. A failed step is recorded
//! in the run's [`error_ledger::ErrorLedger`] and, when it was producing an
//! artifact, its error text is archived at the artifact's path.
//!
//! ## Usage Example
//!
//! ```no_run
//! use k8s_debug_collector::collectors::collector::ClusterDumper;
//! use k8s_debug_collector::config::CollectorOptions;
//! use k8s_debug_collector::utils::process::SystemRunner;
//!
//! # fn example() -> anyhow::Result<()> {
//! let options = CollectorOptions {
//!     resource: "pxc".to_string(),
//!     namespace: "databases".to_string(),
//!     ..CollectorOptions::default()
//! };
//! let dumper = ClusterDumper::new(options, Box::new(SystemRunner))?;
//! let archive = dumper.dump_cluster()?;
//! println!("Wrote {}", archive.display());
//! # Ok(())
//! # }
//! ```

/// Cluster walk orchestration
pub mod collector;

/// Run-scoped failure record rendered into `errors.txt`
pub mod error_ledger;

/// Cluster CLI facade
pub mod kubectl;

/// Per-pod logs, secrets, summaries and files
pub mod pods;

/// Resource manifests and API-resource discovery
pub mod resources;

/// Archive plus ledger pairing
pub mod sink;

/// Workload diagnostic reports
pub mod summary;

/// Scoped port-forward tunnel
pub mod tunnel;
