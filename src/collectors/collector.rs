use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};

use crate::collectors::kubectl::{args, Kubectl};
use crate::collectors::pods::PodCollector;
use crate::collectors::resources::{collect_resource, discover_workload_resources};
use crate::collectors::sink::DumpSink;
use crate::config::{CollectionConfig, CollectorOptions};
use crate::constants::{ERRORS_FILE_NAME, NODES_RESOURCE};
use crate::models::{Namespace, NamespaceList, Pod, PodList};
use crate::utils::archive::ArchiveWriter;
use crate::utils::process::CommandRunner;

/// Walks a cluster and writes everything it finds into one archive
pub struct ClusterDumper {
    config: CollectionConfig,
    kubectl: Kubectl,
}

impl ClusterDumper {
    /// Resolve the run configuration. With `--resource auto` this asks the
    /// API server which workload resources exist; failing that is fatal.
    pub fn new(options: CollectorOptions, runner: Box<dyn CommandRunner>) -> Result<Self> {
        let kubectl = Kubectl::new(runner, &options.kubectl, &options.kubeconfig);

        let config = if options.is_auto() {
            let discovered = discover_workload_resources(&kubectl)?;
            CollectionConfig::for_discovery(options, discovered)
        } else {
            CollectionConfig::for_selector(options)
        };

        Ok(Self { config, kubectl })
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Collect every namespace into `<location>.tar.gz`.
    ///
    /// Per-item failures are recorded in `errors.txt` and collection moves
    /// on. An error is returned only when the archive cannot be written or
    /// the namespaces cannot be listed; in the latter case the archive is
    /// still finalized first.
    pub fn dump_cluster(&self) -> Result<PathBuf> {
        let archive_file = PathBuf::from(self.config.archive_file());
        let archive = ArchiveWriter::create(&archive_file, self.config.mode)
            .with_context(|| format!("create archive {}", archive_file.display()))?;
        let mut sink = DumpSink::new(archive);

        info!(
            "Collecting {} resources into {}",
            self.config.selector,
            archive_file.display()
        );

        let outcome = self.collect_namespaces(&mut sink);
        if outcome.is_ok() {
            collect_resource(&self.kubectl, &self.config, &mut sink, NODES_RESOURCE, None, false);
        }

        let errors_path = self.config.entry_path(&[ERRORS_FILE_NAME]);
        sink.finalize(&errors_path)
            .with_context(|| format!("finalize archive {}", archive_file.display()))?;

        outcome?;
        info!("Cluster dump written to {}", archive_file.display());
        Ok(archive_file)
    }

    fn collect_namespaces(&self, sink: &mut DumpSink) -> Result<()> {
        let namespaces = self.namespaces(sink)?;
        info!("Collecting {} namespace(s)", namespaces.len());

        for namespace in &namespaces {
            let ns = namespace.name();
            info!("Collecting namespace {}", ns);

            let pods = self.pods(ns, sink);
            PodCollector::new(&self.config, &self.kubectl, ns).collect_pods(&pods, sink);

            for kind in &self.config.resources {
                collect_resource(&self.kubectl, &self.config, sink, kind, Some(ns), false);
            }
        }
        Ok(())
    }

    fn namespaces(&self, sink: &mut DumpSink) -> Result<Vec<Namespace>> {
        if let Some(ns) = &self.config.namespace {
            return Ok(vec![Namespace::named(ns)]);
        }

        let cmd_args = args(&["get", "namespaces", "-o", "json"]);
        let output = match self.kubectl.run(&cmd_args) {
            Ok(output) => output,
            Err(e) => {
                let text = e.to_string();
                error!("Error: get namespaces: {}", text);
                sink.fail(&text, self.kubectl.command(), &cmd_args, None);
                return Err(anyhow!("get namespaces: {}", text));
            }
        };

        match serde_json::from_slice::<NamespaceList>(&output) {
            Ok(list) => Ok(list.items),
            Err(e) => {
                let text = format!("unmarshal namespaces: {}", e);
                error!("Error: {}", text);
                sink.fail(&text, self.kubectl.command(), &cmd_args, None);
                Err(anyhow!(text))
            }
        }
    }

    /// Pods of one namespace; failures are recorded and yield no pods
    fn pods(&self, namespace: &str, sink: &mut DumpSink) -> Vec<Pod> {
        let cmd_args = args(&["get", "pods", "-o", "json", "--namespace", namespace]);
        let output = match self.kubectl.run(&cmd_args) {
            Ok(output) => output,
            Err(e) => {
                let text = e.to_string();
                warn!("Error: get pods in namespace {}: {}", namespace, text);
                sink.fail(&text, self.kubectl.command(), &cmd_args, None);
                return Vec::new();
            }
        };

        match serde_json::from_slice::<PodList>(&output) {
            Ok(list) => list.items,
            Err(e) => {
                let text = format!("unmarshal pods: {}", e);
                warn!("Error: {} in namespace {}", text, namespace);
                sink.fail(&text, self.kubectl.command(), &cmd_args, None);
                Vec::new()
            }
        }
    }
}
