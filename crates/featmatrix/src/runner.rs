// src/runner.rs
//! The seam between the driver and real subprocesses.
//!
//! The driver only ever talks to a [`CommandRunner`], so the whole fail-fast
//! control flow can be exercised with a [`ScriptedRunner`] instead of real
//! `cargo` processes.

use std::collections::VecDeque;
use std::io;
use std::process::Command;

use crate::invocation::Invocation;

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The child exited with this code.
    Exit(i32),
    /// The child was terminated without an exit code (killed by a signal).
    Terminated,
}

impl RunStatus {
    pub fn success(self) -> bool {
        self == RunStatus::Exit(0)
    }

    /// Exit code to propagate: the child's own code, or 1 when it had none.
    pub fn code(self) -> i32 {
        match self {
            RunStatus::Exit(code) => code,
            RunStatus::Terminated => 1,
        }
    }
}

/// Runs one invocation to completion.
pub trait CommandRunner {
    /// Spawn the invocation and wait for it synchronously.
    ///
    /// `Err` means the child never ran (spawn failure, e.g. the program is
    /// not installed); a child that ran and failed is `Ok` with a non-zero
    /// [`RunStatus`].
    fn run(&mut self, invocation: &Invocation) -> io::Result<RunStatus>;
}

/// Production runner: spawns via [`std::process::Command`] with inherited
/// stdio, so the child's build trace and test output stream straight through.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<RunStatus> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }
        if let Some(dir) = &invocation.current_dir {
            cmd.current_dir(dir);
        }

        let status = cmd.status()?;
        Ok(match status.code() {
            Some(code) => RunStatus::Exit(code),
            None => RunStatus::Terminated,
        })
    }
}

/// A runner that replays a script instead of spawning processes, recording
/// every invocation it receives.
///
/// Statuses are consumed in order; once the script is exhausted every further
/// invocation reports success. Useful for testing anything built on the
/// driver, including this crate's own tests.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    script: VecDeque<ScriptEntry>,
    /// Every invocation the driver handed us, in order.
    pub invocations: Vec<Invocation>,
}

#[derive(Debug)]
enum ScriptEntry {
    Status(RunStatus),
    SpawnError(io::ErrorKind),
}

impl ScriptedRunner {
    /// A runner where every invocation succeeds.
    pub fn passing() -> Self {
        ScriptedRunner::default()
    }

    /// Queue a status for the next unscripted invocation.
    pub fn push_status(&mut self, status: RunStatus) {
        self.script.push_back(ScriptEntry::Status(status));
    }

    /// Queue a spawn failure for the next unscripted invocation.
    pub fn push_spawn_error(&mut self, kind: io::ErrorKind) {
        self.script.push_back(ScriptEntry::SpawnError(kind));
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<RunStatus> {
        self.invocations.push(invocation.clone());
        match self.script.pop_front() {
            Some(ScriptEntry::Status(status)) => Ok(status),
            Some(ScriptEntry::SpawnError(kind)) => Err(io::Error::from(kind)),
            None => Ok(RunStatus::Exit(0)),
        }
    }
}
