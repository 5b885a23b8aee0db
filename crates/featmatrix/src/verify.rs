// src/verify.rs
//! The driver loop: walk the plan, fail fast, propagate the exit code.

use tracing::{debug, info};

use crate::config::VerifyConfig;
use crate::plan::{StepKind, build_plan};
use crate::runner::{CommandRunner, RunStatus};

/// Why a step failed.
///
/// The distinction only matters for reporting; control flow treats every
/// variant identically (abort the run, no retries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepFailure {
    /// The child ran and exited non-zero.
    Exit { code: i32 },
    /// The child was killed by a signal before producing an exit code.
    Terminated,
    /// The child could not be spawned at all.
    Spawn { message: String },
}

impl std::fmt::Display for StepFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepFailure::Exit { code } => write!(f, "exited with code {}", code),
            StepFailure::Terminated => f.write_str("terminated by signal"),
            StepFailure::Spawn { message } => write!(f, "could not be spawned: {}", message),
        }
    }
}

/// Result of a whole verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every step exited zero.
    Passed {
        /// Number of steps that ran.
        steps: usize,
    },
    /// A step failed; later steps were never attempted.
    Failed {
        /// The step that failed.
        step: StepKind,
        /// How it failed.
        failure: StepFailure,
        /// Steps that completed successfully before the failure.
        completed: usize,
    },
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Passed { .. })
    }

    /// Exit code for the overall process: 0 on success, otherwise the first
    /// failing child's own code (1 when the child left none behind).
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Passed { .. } => 0,
            Outcome::Failed { failure, .. } => match failure {
                StepFailure::Exit { code } => *code,
                StepFailure::Terminated | StepFailure::Spawn { .. } => 1,
            },
        }
    }
}

/// Run the full matrix described by `config` through `runner`.
///
/// Steps run strictly in plan order, each waited on synchronously. The first
/// failure is terminal: no recovery, no retries, no subsequent steps. Each
/// command line is echoed to stderr before it runs (unless `config.echo` is
/// off) so the trace always shows what was about to execute.
pub fn run(config: &VerifyConfig, runner: &mut dyn CommandRunner) -> Outcome {
    let plan = build_plan(config);
    let mut completed = 0;

    for step in &plan {
        info!(step = %step.kind, "starting");
        if config.echo {
            eprintln!("$ {}", step.invocation);
        }

        let status = match runner.run(&step.invocation) {
            Ok(status) => status,
            Err(e) => {
                return Outcome::Failed {
                    step: step.kind.clone(),
                    failure: StepFailure::Spawn {
                        message: e.to_string(),
                    },
                    completed,
                };
            }
        };

        debug!(step = %step.kind, ?status, "finished");
        if !status.success() {
            let failure = match status {
                RunStatus::Terminated => StepFailure::Terminated,
                RunStatus::Exit(code) => StepFailure::Exit { code },
            };
            return Outcome::Failed {
                step: step.kind.clone(),
                failure,
                completed,
            };
        }

        completed += 1;
    }

    Outcome::Passed { steps: completed }
}
