// src/invocation.rs
//! An explicit description of one child process.
//!
//! Environment assignments are part of the invocation itself rather than
//! ambient process state, so a step's full configuration can be inspected
//! (and asserted on in tests) before anything is spawned.

use std::fmt;
use std::path::PathBuf;

/// Program, arguments, environment, and working directory for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to spawn (`cargo`, in practice).
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Environment assignments applied on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// Working directory, or inherit when `None`.
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Look up an environment assignment by key.
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Renders shell-style: `RUST_BACKTRACE=full cargo test --all -- --include-ignored`.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{}={} ", key, shell_word(value))?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", shell_word(arg))?;
        }
        Ok(())
    }
}

/// Quote a word for display if it contains whitespace.
fn shell_word(word: &str) -> String {
    if word.is_empty() || word.chars().any(char::is_whitespace) {
        format!("'{}'", word)
    } else {
        word.to_string()
    }
}
