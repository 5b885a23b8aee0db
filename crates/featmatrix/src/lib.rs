#![deny(unsafe_code)]

//! Feature-matrix build/test verification for Cargo workspaces.
//!
//! `featmatrix` exercises a workspace's build and test targets across an
//! explicit ordered list of feature configurations: one full build with
//! default features, one full test pass with default features, then one test
//! pass per named feature configuration, strictly in declared order. The run
//! is fail-fast — the first step whose child process exits non-zero (or
//! cannot be spawned at all) terminates the run, and the overall exit code
//! is that step's exit code.
//!
//! The plan is pure data and the driver takes the command runner as a trait
//! object, so the whole control flow can be tested without spawning a single
//! real subprocess:
//!
//! ```rust
//! use featmatrix::{build_plan, VerifyConfig};
//!
//! let plan = build_plan(&VerifyConfig::default());
//! // default build, default test, and one test pass for "test-no-std"
//! assert_eq!(plan.len(), 3);
//! ```

pub mod config;
pub mod invocation;
pub mod plan;
pub mod runner;
pub mod verify;

pub use config::{BacktraceStyle, FeatureConfig, Manifest, ManifestError, VerifyConfig};
pub use invocation::Invocation;
pub use plan::{Step, StepKind, build_plan};
pub use runner::{CommandRunner, ProcessRunner, RunStatus, ScriptedRunner};
pub use verify::{Outcome, StepFailure, run};
