//! Shared helpers for the integration tests: a scripted cluster CLI and an
//! archive reader.

#![allow(dead_code)]

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::{Arc, Mutex};

use flate2::read::GzDecoder;

use k8s_debug_collector::utils::process::{BackgroundProcess, CommandError, CommandRunner, StderrPolicy};

/// Read every entry of a `tar.gz` archive as (path, content)
pub fn read_archive(path: &Path) -> Vec<(String, Vec<u8>)> {
    let file = File::open(path).expect("archive exists");
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive
        .entries()
        .expect("readable tar stream")
        .map(|entry| {
            let mut entry = entry.expect("valid entry");
            let name = entry.path().expect("entry path").to_string_lossy().into_owned();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).expect("entry content");
            (name, content)
        })
        .collect()
}

pub fn entry_text(entries: &[(String, Vec<u8>)], name: &str) -> Option<String> {
    entries
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, content)| String::from_utf8_lossy(content).into_owned())
}

#[derive(Default)]
struct State {
    rules: Vec<(String, Vec<String>, Result<Vec<u8>, String>)>,
    calls: Vec<(String, Vec<String>)>,
    killed: Vec<Arc<Mutex<bool>>>,
}

/// Cluster CLI stand-in answering by program name and argument prefix.
/// Unmatched calls succeed with empty output; later rules win.
#[derive(Clone, Default)]
pub struct ScriptedCluster {
    state: Arc<Mutex<State>>,
}

impl ScriptedCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, program: &str, prefix: &[&str], stdout: &[u8]) {
        self.push(program, prefix, Ok(stdout.to_vec()));
    }

    pub fn fail(&self, program: &str, prefix: &[&str], stderr: &str) {
        self.push(program, prefix, Err(stderr.to_string()));
    }

    fn push(&self, program: &str, prefix: &[&str], response: Result<Vec<u8>, String>) {
        let prefix = prefix.iter().map(|s| s.to_string()).collect();
        self.state
            .lock()
            .unwrap()
            .rules
            .push((program.to_string(), prefix, response));
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn tunnels_started(&self) -> usize {
        self.state.lock().unwrap().killed.len()
    }

    pub fn tunnels_running(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .killed
            .iter()
            .filter(|killed| !*killed.lock().unwrap())
            .count()
    }
}

impl CommandRunner for ScriptedCluster {
    fn run(&self, program: &str, args: &[String], _policy: StderrPolicy) -> Result<Vec<u8>, CommandError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((program.to_string(), args.to_vec()));

        let response = state
            .rules
            .iter()
            .rev()
            .find(|(p, prefix, _)| p == program && args.len() >= prefix.len() && args.iter().zip(prefix).all(|(a, b)| a == b))
            .map(|(_, _, response)| response.clone());

        match response {
            Some(Ok(stdout)) => Ok(stdout),
            Some(Err(stderr)) => Err(CommandError::Failed {
                exit: "exit status: 1".to_string(),
                stderr,
                stdout: String::new(),
            }),
            None => Ok(Vec::new()),
        }
    }

    fn run_os(&self, program: &str, args: &[OsString], policy: StderrPolicy) -> Result<Vec<u8>, CommandError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        self.run(program, &args, policy)
    }

    fn spawn(&self, _program: &str, _args: &[String]) -> Result<Box<dyn BackgroundProcess>, CommandError> {
        let killed = Arc::new(Mutex::new(false));
        self.state.lock().unwrap().killed.push(Arc::clone(&killed));
        Ok(Box::new(Tunnel { killed }))
    }
}

struct Tunnel {
    killed: Arc<Mutex<bool>>,
}

impl BackgroundProcess for Tunnel {
    fn try_wait(&mut self) -> io::Result<Option<String>> {
        Ok(None)
    }

    fn kill(&mut self) -> io::Result<()> {
        *self.killed.lock().unwrap() = true;
        Ok(())
    }
}
