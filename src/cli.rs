use std::time::Duration;

use clap::Parser;

use crate::config::CollectorOptions;
use crate::constants::{AUTO_SELECTOR, DEFAULT_ARCHIVE_ROOT, DEFAULT_KUBECTL_COMMAND};

/// Command-line arguments for the k8s-debug-collector tool.
///
/// Every option has a default, so running without arguments collects all
/// namespaces of the current kubeconfig context with workload auto-discovery.
#[derive(Parser, Debug)]
#[clap(
    name = "k8s-debug-collector",
    version,
    about = "Collect a debug snapshot of a Kubernetes cluster into a tar.gz archive"
)]
pub struct Args {
    /// Workload to collect: auto, none, pxc, ps, psmdb, pg, pgv2, optionally as <type>/<cluster>
    #[clap(long, default_value = AUTO_SELECTOR)]
    pub resource: String,

    /// Namespace to collect (default: every namespace)
    #[clap(long, default_value = "")]
    pub namespace: String,

    /// Path to the kubeconfig file passed to every cluster CLI call
    #[clap(long, default_value = "")]
    pub kubeconfig: String,

    /// Local port for the database port-forward (default: the database's own port)
    #[clap(long)]
    pub forwardport: Option<u16>,

    /// Archive location; the output file is <output>.tar.gz
    #[clap(short, long, default_value = DEFAULT_ARCHIVE_ROOT)]
    pub output: String,

    /// Cluster CLI binary (kubectl or a compatible tool such as oc)
    #[clap(long, default_value = DEFAULT_KUBECTL_COMMAND)]
    pub kubectl: String,

    /// Seconds to wait for a port-forward to accept connections
    #[clap(long, default_value = "3")]
    pub tunnel_timeout: u64,

    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn to_options(&self) -> CollectorOptions {
        CollectorOptions {
            kubectl: self.kubectl.clone(),
            kubeconfig: self.kubeconfig.clone(),
            namespace: self.namespace.clone(),
            resource: self.resource.clone(),
            location: self.output.clone(),
            forward_port: self.forwardport,
            tunnel_timeout: Duration::from_secs(self.tunnel_timeout),
        }
    }
}
