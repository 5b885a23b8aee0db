// src/plan.rs
//! Plan construction: the ordered list of steps a run will execute.
//!
//! A plan is pure data. Building one spawns nothing, so the exact command
//! lines, order, and per-step environment can be inspected up front.

use std::fmt;

use crate::config::{FeatureConfig, VerifyConfig};
use crate::invocation::Invocation;

/// What a step does, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    /// Full workspace build with default features.
    BuildDefault,
    /// Full workspace test pass with default features.
    TestDefault,
    /// Full workspace test pass under one named feature configuration.
    TestFeatures(FeatureConfig),
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::BuildDefault => f.write_str("build (default features)"),
            StepKind::TestDefault => f.write_str("test (default features)"),
            StepKind::TestFeatures(features) => write!(f, "test (--features {})", features),
        }
    }
}

/// One step in the plan: its kind and the invocation that performs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    pub invocation: Invocation,
}

/// Build the ordered step list for `config`.
///
/// Order is fixed: default build, default test, then one test step per
/// feature configuration in declared order.
pub fn build_plan(config: &VerifyConfig) -> Vec<Step> {
    let mut plan = Vec::with_capacity(2 + config.feature_sets.len());

    plan.push(Step {
        kind: StepKind::BuildDefault,
        invocation: Invocation::new("cargo")
            .args(["build", "--all", "--verbose"])
            .current_dir(&config.workspace_root),
    });

    plan.push(Step {
        kind: StepKind::TestDefault,
        invocation: test_invocation(config, None),
    });

    for features in &config.feature_sets {
        plan.push(Step {
            kind: StepKind::TestFeatures(features.clone()),
            invocation: test_invocation(config, Some(features)),
        });
    }

    plan
}

fn test_invocation(config: &VerifyConfig, features: Option<&FeatureConfig>) -> Invocation {
    let mut inv = Invocation::new("cargo")
        .args(["test", "--all", "--verbose"])
        .current_dir(&config.workspace_root);

    if let Some(features) = features {
        inv = inv.arg("--features").arg(features.as_str());
    }

    if config.include_ignored {
        // Harness flags go after the `--` separator.
        inv = inv.arg("--").arg("--include-ignored");
    }

    if let Some(value) = config.backtrace.env_value() {
        inv = inv.env("RUST_BACKTRACE", value);
    }

    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BacktraceStyle;
    use std::path::PathBuf;

    #[test]
    fn default_plan_has_build_test_then_feature_tests() {
        let plan = build_plan(&VerifyConfig::default());
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].kind, StepKind::BuildDefault);
        assert_eq!(plan[1].kind, StepKind::TestDefault);
        assert_eq!(
            plan[2].kind,
            StepKind::TestFeatures(FeatureConfig::new("test-no-std"))
        );
    }

    #[test]
    fn empty_feature_list_gives_two_steps() {
        let config = VerifyConfig {
            feature_sets: Vec::new(),
            ..VerifyConfig::default()
        };
        let plan = build_plan(&config);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].kind, StepKind::BuildDefault);
        assert_eq!(plan[1].kind, StepKind::TestDefault);
    }

    #[test]
    fn feature_steps_follow_declared_order() {
        let config = VerifyConfig {
            feature_sets: vec![
                FeatureConfig::new("b-feature"),
                FeatureConfig::new("a-feature"),
            ],
            ..VerifyConfig::default()
        };
        let plan = build_plan(&config);
        assert_eq!(
            plan[2].kind,
            StepKind::TestFeatures(FeatureConfig::new("b-feature"))
        );
        assert_eq!(
            plan[3].kind,
            StepKind::TestFeatures(FeatureConfig::new("a-feature"))
        );
    }

    #[test]
    fn build_step_command_line() {
        let plan = build_plan(&VerifyConfig::default());
        let inv = &plan[0].invocation;
        assert_eq!(inv.program, "cargo");
        assert_eq!(inv.args, vec!["build", "--all", "--verbose"]);
        // The build step inherits the environment untouched.
        assert!(inv.env.is_empty());
    }

    #[test]
    fn test_steps_include_ignored_and_backtrace() {
        let plan = build_plan(&VerifyConfig::default());
        for step in &plan[1..] {
            let inv = &step.invocation;
            assert!(
                inv.args.iter().any(|a| a == "--include-ignored"),
                "{}: missing --include-ignored",
                step.kind
            );
            assert_eq!(
                inv.env_var("RUST_BACKTRACE"),
                Some("full"),
                "{}: missing backtrace",
                step.kind
            );
        }
    }

    #[test]
    fn features_flag_precedes_harness_separator() {
        let plan = build_plan(&VerifyConfig::default());
        let args = &plan[2].invocation.args;
        let features_at = args.iter().position(|a| a == "--features").unwrap();
        let separator_at = args.iter().position(|a| a == "--").unwrap();
        assert_eq!(args[features_at + 1], "test-no-std");
        assert!(features_at < separator_at);
    }

    #[test]
    fn include_ignored_can_be_disabled() {
        let config = VerifyConfig {
            include_ignored: false,
            ..VerifyConfig::default()
        };
        let plan = build_plan(&config);
        for step in &plan[1..] {
            assert!(!step.invocation.args.iter().any(|a| a == "--"));
        }
    }

    #[test]
    fn disabled_backtrace_sets_no_env() {
        let config = VerifyConfig {
            backtrace: BacktraceStyle::Disabled,
            ..VerifyConfig::default()
        };
        let plan = build_plan(&config);
        for step in &plan {
            assert!(step.invocation.env.is_empty());
        }
    }

    #[test]
    fn all_steps_run_in_workspace_root() {
        let config = VerifyConfig {
            workspace_root: PathBuf::from("/some/workspace"),
            ..VerifyConfig::default()
        };
        for step in build_plan(&config) {
            assert_eq!(
                step.invocation.current_dir,
                Some(PathBuf::from("/some/workspace"))
            );
        }
    }

    #[test]
    fn step_kind_display() {
        assert_eq!(
            StepKind::BuildDefault.to_string(),
            "build (default features)"
        );
        assert_eq!(
            StepKind::TestFeatures(FeatureConfig::new("test-no-std")).to_string(),
            "test (--features test-no-std)"
        );
    }
}
