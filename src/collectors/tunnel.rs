//! Scoped local port-forward to a database pod.
//!
//! A [`PortForward`] owns the background `port-forward` process. It is killed
//! by [`PortForward::close`] or, on any other exit path, when the guard drops.

use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use log::{debug, info, warn};

use crate::collectors::error_ledger::ErrorLedger;
use crate::collectors::kubectl::{args, Kubectl};
use crate::constants::{TUNNEL_CONNECT_TIMEOUT, TUNNEL_HOST, TUNNEL_PROBE_INTERVAL};
use crate::utils::process::BackgroundProcess;

pub struct PortForward {
    process: Option<Box<dyn BackgroundProcess>>,
    pod: String,
    local_port: u16,
}

impl PortForward {
    /// Start `port-forward pod/<pod> <local>:<remote> -n <namespace>` without waiting
    pub fn open(
        kubectl: &Kubectl,
        pod: &str,
        namespace: &str,
        local_port: u16,
        remote_port: u16,
    ) -> Result<Self> {
        let process = kubectl.spawn(&args(&[
            "port-forward",
            &format!("pod/{}", pod),
            &format!("{}:{}", local_port, remote_port),
            "-n",
            namespace,
        ]))?;

        debug!("Port-forward to {} started on local port {}", pod, local_port);
        Ok(Self {
            process: Some(process),
            pod: pod.to_string(),
            local_port,
        })
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Poll the local port until it accepts a connection or `timeout` elapses.
    /// Returns whether the tunnel became ready.
    pub fn wait_until_ready(&self, timeout: Duration) -> bool {
        let ready = wait_for_port(self.local_port, timeout);
        if ready {
            info!("Tunnel to {} ready on port {}", self.pod, self.local_port);
        } else {
            warn!(
                "Tunnel to {} not accepting connections on port {} after {:?}, continuing",
                self.pod, self.local_port, timeout
            );
        }
        ready
    }

    /// Kill the tunnel, recording in the ledger if it died on its own or
    /// could not be killed
    pub fn close(mut self, ledger: &mut ErrorLedger) {
        let Some(mut process) = self.process.take() else {
            return;
        };

        match process.try_wait() {
            Ok(Some(status)) => {
                warn!("Port-forward to {} exited early: {}", self.pod, status);
                ledger.record(
                    format!("port-forward exited before teardown: {}", status),
                    "port-forward",
                    &[format!("pod/{}", self.pod)],
                );
            }
            Ok(None) => {}
            Err(e) => debug!("Cannot query port-forward status: {}", e),
        }

        if let Err(e) = process.kill() {
            warn!("Error: kill port-forward to {}: {}", self.pod, e);
            ledger.record(e.to_string(), "kill port-forward", &[format!("pod/{}", self.pod)]);
        }
    }
}

impl Drop for PortForward {
    fn drop(&mut self) {
        if let Some(mut process) = self.process.take() {
            if let Err(e) = process.kill() {
                warn!("Error: kill port-forward to {}: {}", self.pod, e);
            }
        }
    }
}

/// Whether something accepts TCP connections on the loopback port within `timeout`
pub fn wait_for_port(port: u16, timeout: Duration) -> bool {
    let addr: SocketAddr = match format!("{}:{}", TUNNEL_HOST, port).parse() {
        Ok(addr) => addr,
        Err(_) => return false,
    };

    let deadline = Instant::now() + timeout;
    loop {
        if TcpStream::connect_timeout(&addr, TUNNEL_CONNECT_TIMEOUT).is_ok() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        thread::sleep(TUNNEL_PROBE_INTERVAL.min(deadline - now));
    }
}

/// Local port for a tunnel: the user override, else the protocol port
pub fn local_port(forward_port: Option<u16>, remote_port: u16) -> u16 {
    forward_port.filter(|p| *p != 0).unwrap_or(remote_port)
}

/// Remote port for a workload that opens a tunnel
pub fn remote_port(port: Option<u16>) -> Result<u16> {
    port.ok_or_else(|| anyhow!("workload type has no database port"))
}
