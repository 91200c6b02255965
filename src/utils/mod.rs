//! Low-level plumbing shared by the collectors.
//!
//! - [`process`]: running the cluster CLI and diagnostic tools
//! - [`archive`]: the streaming `tar.gz` output
//!
//! ## Writing an archive
//!
//! ```no_run
//! use k8s_debug_collector::utils::archive::ArchiveWriter;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut archive = ArchiveWriter::create(Path::new("cluster-dump.tar.gz"), 0o777)?;
//! archive.append("cluster-dump/nodes.yaml", b"items: []\n")?;
//! archive.finalize("cluster-dump/errors.txt", b"")?;
//! # Ok(())
//! # }
//! ```

/// Streaming tar-in-gzip archive writer
pub mod archive;

/// External process invocation
pub mod process;
