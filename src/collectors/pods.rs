use std::collections::HashSet;

use anyhow::{anyhow, Result};
use log::{debug, error, info, warn};

use crate::collectors::kubectl::{args, Kubectl};
use crate::collectors::resources::collect_resource;
use crate::collectors::sink::DumpSink;
use crate::collectors::summary::SummaryGenerator;
use crate::config::CollectionConfig;
use crate::constants::{LABEL_COMPONENT, LABEL_INSTANCE, LOGS_FILE_NAME, SUMMARY_FILE_NAME};
use crate::models::Pod;

/// Collects logs, colocated secrets, diagnostics and files for the pods of
/// one namespace
pub struct PodCollector<'a> {
    config: &'a CollectionConfig,
    kubectl: &'a Kubectl,
    namespace: String,
    seen_secrets: HashSet<String>,
}

impl<'a> PodCollector<'a> {
    pub fn new(config: &'a CollectionConfig, kubectl: &'a Kubectl, namespace: &str) -> Self {
        Self {
            config,
            kubectl,
            namespace: namespace.to_string(),
            seen_secrets: HashSet::new(),
        }
    }

    pub fn collect_pods(&mut self, pods: &[Pod], sink: &mut DumpSink) {
        for pod in pods {
            self.collect_pod(pod, sink);
        }
    }

    pub fn collect_pod(&mut self, pod: &Pod, sink: &mut DumpSink) {
        let pod_name = pod.name();
        debug!("Collecting pod {}/{}", self.namespace, pod_name);

        self.collect_logs(pod_name, sink);

        if !pod.has_labels() {
            return;
        }

        if let (Some(instance), Some(component)) = (pod.label(LABEL_INSTANCE), pod.label(LABEL_COMPONENT)) {
            let secret = format!("secret/{}-{}", instance, component);
            if self.seen_secrets.insert(secret.clone()) {
                collect_resource(self.kubectl, self.config, sink, &secret, Some(&self.namespace), true);
            }
        }

        if !self.config.workload.matches_pod(pod) {
            return;
        }

        self.collect_summary(pod, sink);
        for path in &self.config.file_paths {
            self.collect_file(pod_name, path, sink);
        }
    }

    fn collect_logs(&self, pod_name: &str, sink: &mut DumpSink) {
        let cmd_args = args(&["logs", pod_name, "--namespace", &self.namespace, "--all-containers"]);
        let location = self.config.entry_path(&[&self.namespace, pod_name, LOGS_FILE_NAME]);

        match self.kubectl.run(&cmd_args) {
            Ok(output) => sink.store(&location, &output),
            Err(e) => {
                let text = e.to_string();
                warn!("Error: get logs for pod {}/{}: {}", self.namespace, pod_name, text);
                sink.fail(&text, self.kubectl.command(), &cmd_args, Some(&location));
            }
        }
    }

    fn collect_summary(&self, pod: &Pod, sink: &mut DumpSink) {
        let pod_name = pod.name();
        let location = self.config.entry_path(&[&self.namespace, pod_name, SUMMARY_FILE_NAME]);
        let cr_name = self.config.workload.cr_name(pod).unwrap_or_default();

        let generator = SummaryGenerator::new(self.config, self.kubectl);
        match generator.generate(pod_name, cr_name, &self.namespace, sink.ledger_mut()) {
            Ok(output) => {
                info!("Collected {} summary for pod {}/{}", self.config.workload, self.namespace, pod_name);
                sink.store(&location, &output);
            }
            Err(e) => {
                let text = format!("{:#}", e);
                error!("Error: get {} summary for pod {}/{}: {}", self.config.workload, self.namespace, pod_name, text);
                let ledger_args = vec![self.config.selector.clone(), pod_name.to_string()];
                sink.fail(&text, self.kubectl.command(), &ledger_args, Some(&location));
            }
        }
    }

    fn collect_file(&self, pod_name: &str, path: &str, sink: &mut DumpSink) {
        let location = self.config.entry_path(&[&self.namespace, pod_name, path]);
        let cmd_args = self.copy_args(pod_name, path);

        let result = match &cmd_args {
            Ok(cmd_args) => self.kubectl.run(cmd_args).map_err(anyhow::Error::from),
            Err(e) => Err(anyhow!("{}", e)),
        };

        match result {
            Ok(output) if output.is_empty() => {
                debug!("Skipping empty file {} in pod {}/{}", path, self.namespace, pod_name);
            }
            Ok(output) => sink.store(&location, &output),
            Err(e) => {
                let text = format!("{:#}", e);
                warn!("Error: get file {} from pod {}/{}: {}", path, self.namespace, pod_name, text);
                let ledger_args = cmd_args.unwrap_or_else(|_| vec![pod_name.to_string(), path.to_string()]);
                sink.fail(&text, self.kubectl.command(), &ledger_args, Some(&location));
            }
        }
    }

    /// `-n <ns> -c <container> cp <pod>:<path> /dev/stdout`
    fn copy_args(&self, pod_name: &str, path: &str) -> Result<Vec<String>> {
        let container = self
            .config
            .file_container
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow!("Logs container name is not specified for resource {}", self.config.workload))?;

        Ok(args(&[
            "-n",
            &self.namespace,
            "-c",
            container,
            "cp",
            &format!("{}:{}", pod_name, path),
            "/dev/stdout",
        ]))
    }
}
