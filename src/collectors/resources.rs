use anyhow::{Context, Result};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;

use crate::collectors::kubectl::{args, Kubectl};
use crate::collectors::sink::DumpSink;
use crate::config::{CollectionConfig, DiscoveredResources};

lazy_static! {
    /// `<kind>.<workload>.percona.com` entries of `api-resources -o name`
    static ref WORKLOAD_RESOURCE_RE: Regex = Regex::new(r"(\w+)\.(\w+).percona\.com").unwrap();
}

/// Extract workload resource kinds from `api-resources -o name` output.
///
/// Every match contributes its kind once, even when two API groups serve
/// the same kind; the workload name of the last match becomes the
/// effective selector.
pub fn parse_api_resources(output: &str) -> DiscoveredResources {
    let mut discovered = DiscoveredResources::default();
    for captures in WORKLOAD_RESOURCE_RE.captures_iter(output) {
        let kind = &captures[1];
        if !discovered.kinds.iter().any(|k| k == kind) {
            discovered.kinds.push(kind.to_string());
        }
        discovered.selector = Some(captures[2].to_string());
    }
    discovered
}

/// Ask the API server which workload resources it serves
pub fn discover_workload_resources(kubectl: &Kubectl) -> Result<DiscoveredResources> {
    info!("Discovering workload resources from the API server");
    let output = kubectl
        .run(&args(&["api-resources", "-o", "name"]))
        .context("Cannot get API resources and option --resource=auto specified")?;

    let discovered = parse_api_resources(&String::from_utf8_lossy(&output));
    debug!("Discovered resource kinds: {:?}", discovered.kinds);
    Ok(discovered)
}

/// Dump one resource kind as YAML at `<root>[/<namespace>]/<kind>.yaml`.
///
/// A failed invocation archives its error text at the same path. With
/// `ignore_not_found`, empty output means there is nothing to collect and no
/// entry is written.
pub fn collect_resource(
    kubectl: &Kubectl,
    config: &CollectionConfig,
    sink: &mut DumpSink,
    kind: &str,
    namespace: Option<&str>,
    ignore_not_found: bool,
) {
    let mut cmd_args = args(&["get", kind, "-o", "yaml"]);
    if ignore_not_found {
        cmd_args.push("--ignore-not-found".to_string());
    }
    if let Some(ns) = namespace {
        cmd_args.push("--namespace".to_string());
        cmd_args.push(ns.to_string());
    }

    let file_name = format!("{}.yaml", kind);
    let location = config.entry_path(&[namespace.unwrap_or(""), &file_name]);

    match kubectl.run(&cmd_args) {
        Ok(output) => {
            if ignore_not_found && output.is_empty() {
                debug!("No {} found in namespace {}", kind, namespace.unwrap_or("<cluster>"));
                return;
            }
            sink.store(&location, &output);
        }
        Err(e) => {
            let text = e.to_string();
            warn!(
                "Error: get resource {} in namespace {}: {}",
                kind,
                namespace.unwrap_or(""),
                text
            );
            sink.fail(&text, kubectl.command(), &cmd_args, Some(&location));
        }
    }
}
