use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::utils::process::{BackgroundProcess, CommandError, CommandRunner, StderrPolicy};

/// Build an owned argument vector from string slices
pub fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Cluster control-plane CLI bound to one kubeconfig
pub struct Kubectl {
    runner: Box<dyn CommandRunner>,
    command: String,
    kubeconfig: String,
}

impl Kubectl {
    pub fn new(runner: Box<dyn CommandRunner>, command: &str, kubeconfig: &str) -> Self {
        Self {
            runner,
            command: command.to_string(),
            kubeconfig: kubeconfig.to_string(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn kubeconfig(&self) -> &str {
        &self.kubeconfig
    }

    /// Runner for non-cluster tools (summary executables)
    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    fn with_kubeconfig(&self, args: &[String]) -> Vec<String> {
        let mut full = args.to_vec();
        full.push("--kubeconfig".to_string());
        full.push(self.kubeconfig.clone());
        full
    }

    /// Run with the strict stderr policy and return stdout
    pub fn run(&self, args: &[String]) -> Result<Vec<u8>, CommandError> {
        self.runner
            .run(&self.command, &self.with_kubeconfig(args), StderrPolicy::Strict)
    }

    /// Start a long-lived invocation such as `port-forward`
    pub fn spawn(&self, args: &[String]) -> Result<Box<dyn BackgroundProcess>, CommandError> {
        self.runner.spawn(&self.command, &self.with_kubeconfig(args))
    }

    /// Fetch and decode one data field of a secret
    pub fn secret_field(&self, secret: &str, field: &str, namespace: &str) -> Result<Vec<u8>> {
        let encoded = self
            .run(&args(&[
                "get",
                &format!("secrets/{}", secret),
                &format!("--template={{{{.data.{}}}}}", field),
                "-n",
                namespace,
            ]))
            .context("run get secret cmd")?;

        decode_secret_value(&encoded)
    }
}

/// Decode a base64 secret value as printed by the cluster CLI
pub fn decode_secret_value(encoded: &[u8]) -> Result<Vec<u8>> {
    let trimmed = String::from_utf8_lossy(encoded);
    BASE64.decode(trimmed.trim()).context("decode data")
}
