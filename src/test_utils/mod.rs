//! Test utilities for k8s-debug-collector
//!
//! This module provides a scripted [`CommandRunner`] that answers external
//! invocations from a rule table and records every call, plus helpers to read
//! a produced archive back.

#![cfg(test)]

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::{Arc, Mutex};

use flate2::read::GzDecoder;

use crate::utils::process::{BackgroundProcess, CommandError, CommandRunner, StderrPolicy};

/// Read every entry of a `tar.gz` archive as (path, content)
pub fn read_archive(path: &Path) -> Vec<(String, Vec<u8>)> {
    let file = File::open(path).unwrap();
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            (name, content)
        })
        .collect()
}

/// Content of the entry at `name`, if present
pub fn entry<'a>(entries: &'a [(String, Vec<u8>)], name: &str) -> Option<&'a [u8]> {
    entries
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, content)| content.as_slice())
}

/// A failed invocation as the real runner would report it
pub fn failure(stderr: &str) -> CommandError {
    CommandError::Failed {
        exit: "exit status: 1".to_string(),
        stderr: stderr.to_string(),
        stdout: String::new(),
    }
}

type Response = Result<Vec<u8>, String>;

struct Rule {
    program: String,
    prefix: Vec<String>,
    response: Response,
}

/// Observable state of a fake background process
#[derive(Debug, Default)]
pub struct ProcessState {
    pub killed: bool,
    pub exited: Option<String>,
}

#[derive(Default)]
struct FakeState {
    rules: Vec<Rule>,
    calls: Vec<(String, Vec<String>)>,
    os_calls: Vec<(String, Vec<OsString>)>,
    spawns: Vec<(String, Vec<String>)>,
    processes: Vec<Arc<Mutex<ProcessState>>>,
    spawn_error: Option<String>,
    exit_early: Option<String>,
}

/// Scripted [`CommandRunner`]; clones share state
#[derive(Clone, Default)]
pub struct FakeRunner {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer calls of `program` whose arguments start with `prefix` with stdout.
    /// Later rules take precedence.
    pub fn on(&self, program: &str, prefix: &[&str], stdout: &[u8]) -> &Self {
        self.push(program, prefix, Ok(stdout.to_vec()))
    }

    /// Fail calls of `program` whose arguments start with `prefix`
    pub fn fail(&self, program: &str, prefix: &[&str], stderr: &str) -> &Self {
        self.push(program, prefix, Err(stderr.to_string()))
    }

    fn push(&self, program: &str, prefix: &[&str], response: Response) -> &Self {
        self.state.lock().unwrap().rules.push(Rule {
            program: program.to_string(),
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            response,
        });
        self
    }

    /// Make every spawn fail with the given message
    pub fn fail_spawn(&self, message: &str) {
        self.state.lock().unwrap().spawn_error = Some(message.to_string());
    }

    /// Make spawned processes report that they already exited
    pub fn exit_early(&self, status: &str) {
        self.state.lock().unwrap().exit_early = Some(status.to_string());
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls made through `run_os`, with their arguments byte for byte
    pub fn os_calls(&self) -> Vec<(String, Vec<OsString>)> {
        self.state.lock().unwrap().os_calls.clone()
    }

    /// Whether any call ran `program` with arguments starting with `prefix`
    pub fn called(&self, program: &str, prefix: &[&str]) -> bool {
        self.calls()
            .iter()
            .any(|(p, args)| p == program && starts_with(args, prefix))
    }

    pub fn spawns(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().spawns.clone()
    }

    pub fn processes(&self) -> Vec<Arc<Mutex<ProcessState>>> {
        self.state.lock().unwrap().processes.clone()
    }

    /// Whether every spawned process has been killed
    pub fn all_processes_killed(&self) -> bool {
        self.processes().iter().all(|p| p.lock().unwrap().killed)
    }
}

fn starts_with(args: &[String], prefix: &[&str]) -> bool {
    args.len() >= prefix.len() && args.iter().zip(prefix).all(|(a, p)| a == p)
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[String], _policy: StderrPolicy) -> Result<Vec<u8>, CommandError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((program.to_string(), args.to_vec()));

        let prefix_matches = |rule: &&Rule| {
            rule.program == program
                && args.len() >= rule.prefix.len()
                && args.iter().zip(&rule.prefix).all(|(a, p)| a == p)
        };
        match state.rules.iter().rev().find(prefix_matches) {
            Some(rule) => rule.response.clone().map_err(|stderr| failure(&stderr)),
            None => Ok(Vec::new()),
        }
    }

    fn run_os(&self, program: &str, args: &[OsString], policy: StderrPolicy) -> Result<Vec<u8>, CommandError> {
        self.state
            .lock()
            .unwrap()
            .os_calls
            .push((program.to_string(), args.to_vec()));
        let lossy: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        self.run(program, &lossy, policy)
    }

    fn spawn(&self, program: &str, args: &[String]) -> Result<Box<dyn BackgroundProcess>, CommandError> {
        let mut state = self.state.lock().unwrap();
        state.spawns.push((program.to_string(), args.to_vec()));

        if let Some(message) = &state.spawn_error {
            return Err(CommandError::Spawn {
                program: program.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, message.clone()),
            });
        }

        let process = Arc::new(Mutex::new(ProcessState {
            killed: false,
            exited: state.exit_early.clone(),
        }));
        state.processes.push(Arc::clone(&process));
        Ok(Box::new(FakeProcess { state: process }))
    }
}

struct FakeProcess {
    state: Arc<Mutex<ProcessState>>,
}

impl BackgroundProcess for FakeProcess {
    fn try_wait(&mut self) -> io::Result<Option<String>> {
        Ok(self.state.lock().unwrap().exited.clone())
    }

    fn kill(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.killed = true;
        state.exited.get_or_insert_with(|| "signal: 9 (SIGKILL)".to_string());
        Ok(())
    }
}
