use std::path::Path;
use std::time::Duration;

use log::{debug, info};

use crate::config::workload_types::WorkloadType;
use crate::constants::{
    ARCHIVE_EXTENSION, AUTO_SELECTOR, BASE_RESOURCES, DEFAULT_ARCHIVE_ROOT, DEFAULT_ENTRY_MODE,
    DEFAULT_KUBECTL_COMMAND, NONE_SELECTOR, TUNNEL_READY_TIMEOUT,
};

/// Collection settings as requested by the user, before the workload type is known
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    pub kubectl: String,
    pub kubeconfig: String,
    /// Empty means every namespace in the cluster
    pub namespace: String,
    /// `auto`, a workload name, or `name/<cluster>`
    pub resource: String,
    pub location: String,
    pub forward_port: Option<u16>,
    pub tunnel_timeout: Duration,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            kubectl: DEFAULT_KUBECTL_COMMAND.to_string(),
            kubeconfig: String::new(),
            namespace: String::new(),
            resource: AUTO_SELECTOR.to_string(),
            location: DEFAULT_ARCHIVE_ROOT.to_string(),
            forward_port: None,
            tunnel_timeout: TUNNEL_READY_TIMEOUT,
        }
    }
}

impl CollectorOptions {
    pub fn is_auto(&self) -> bool {
        self.resource == AUTO_SELECTOR
    }
}

/// Resource kinds found through API discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredResources {
    pub kinds: Vec<String>,
    /// Workload name of the last matching resource, if any matched
    pub selector: Option<String>,
}

/// Immutable run-wide settings
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub namespace: Option<String>,
    /// Effective selector after discovery (`none` when nothing was found)
    pub selector: String,
    pub workload: WorkloadType,
    /// Output location; the archive file is `<location>.tar.gz`
    pub location: String,
    /// Top-level directory of every archive entry (last component of `location`)
    pub archive_root: String,
    pub mode: u32,
    pub resources: Vec<String>,
    pub file_paths: Vec<String>,
    pub file_container: Option<String>,
    pub forward_port: Option<u16>,
    pub tunnel_timeout: Duration,
}

impl CollectionConfig {
    /// Resolve an explicit selector through the workload table
    pub fn for_selector(options: CollectorOptions) -> Self {
        let workload = WorkloadType::from_selector(&options.resource);
        let mut resources = base_resources();
        resources.extend(workload.profile().extra_resources.iter().map(|r| r.to_string()));

        let selector = options.resource.clone();
        Self::build(options, selector, workload, resources)
    }

    /// Resolve `auto` from what the API server advertises
    pub fn for_discovery(options: CollectorOptions, discovered: DiscoveredResources) -> Self {
        let selector = discovered
            .selector
            .unwrap_or_else(|| NONE_SELECTOR.to_string());
        let workload = WorkloadType::from_selector(&selector);

        let mut resources = base_resources();
        for kind in discovered.kinds {
            if !resources.contains(&kind) {
                resources.push(kind);
            }
        }

        info!("Discovered workload type: {}", selector);
        Self::build(options, selector, workload, resources)
    }

    fn build(
        options: CollectorOptions,
        selector: String,
        workload: WorkloadType,
        resources: Vec<String>,
    ) -> Self {
        let profile = workload.profile();
        let namespace = Some(options.namespace).filter(|ns| !ns.is_empty());
        let archive_root = archive_root(&options.location);

        let config = Self {
            namespace,
            selector,
            workload,
            location: options.location,
            archive_root,
            mode: DEFAULT_ENTRY_MODE,
            resources,
            file_paths: profile.file_paths.iter().map(|p| p.to_string()).collect(),
            file_container: profile.file_container.map(str::to_string),
            forward_port: options.forward_port,
            tunnel_timeout: options.tunnel_timeout,
        };

        debug!(
            "Collection config: workload={}, {} resource kinds, {} file paths",
            config.workload,
            config.resources.len(),
            config.file_paths.len()
        );
        config
    }

    /// Path of the archive file on disk
    pub fn archive_file(&self) -> String {
        format!("{}{}", self.location, ARCHIVE_EXTENSION)
    }

    /// Archive entry path rooted under the archive root
    pub fn entry_path(&self, segments: &[&str]) -> String {
        let mut path = self.archive_root.clone();
        for segment in segments {
            let segment = segment.trim_matches('/');
            if segment.is_empty() {
                continue;
            }
            path.push('/');
            path.push_str(segment);
        }
        path
    }
}

/// Entry paths must be relative, so only the final component of the output
/// location names the archive root
fn archive_root(location: &str) -> String {
    Path::new(location)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_ARCHIVE_ROOT.to_string())
}

fn base_resources() -> Vec<String> {
    BASE_RESOURCES.iter().map(|r| r.to_string()).collect()
}
