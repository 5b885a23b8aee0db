use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use featmatrix::{Manifest, Outcome, ProcessRunner, VerifyConfig, build_plan, run};

/// Exit code for the tool's own errors (bad flags, unreadable manifest),
/// kept out of the child-exit-code namespace.
const USAGE_ERROR: u8 = 2;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    // A bare `featmatrix` (or one starting with a flag) means `run`.
    let (command, rest) = match args.first().map(String::as_str) {
        None => ("run", &args[..]),
        Some(first) if first.starts_with('-') => match first {
            "--help" | "-h" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            _ => ("run", &args[..]),
        },
        Some(command) => (command, &args[1..]),
    };

    match command {
        "run" => cmd_run(rest),
        "plan" => cmd_plan(rest),
        "help" => {
            print_help();
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {cmd}");
            eprintln!();
            print_help();
            ExitCode::from(USAGE_ERROR)
        }
    }
}

fn print_help() {
    eprintln!(
        r#"featmatrix

USAGE:
    featmatrix [COMMAND] [OPTIONS]

COMMANDS:
    run                        Build the workspace, then run the full test
                               pass under each feature configuration,
                               fail-fast (default command)

    plan                       Print the commands `run` would execute,
                               one per line, without running anything

    help                       Print this help message

OPTIONS:
    --workspace <DIR>          Workspace to verify (default: current dir)
    --manifest <PATH>          Feature-matrix manifest (default:
                               <workspace>/featmatrix.json if present)
    --features <NAME>          Feature configuration to test; repeatable,
                               overrides the manifest list

EXAMPLES:
    featmatrix                                    # verify ./ with its manifest
    featmatrix plan --features test-no-std
    featmatrix run --workspace ../mmap-alloc
"#
    );
}

/// Parsed command-line options, shared by `run` and `plan`.
#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    workspace: Option<PathBuf>,
    manifest: Option<PathBuf>,
    features: Vec<String>,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut opts = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--workspace" => {
                let value = iter.next().ok_or("--workspace requires a directory")?;
                opts.workspace = Some(PathBuf::from(value));
            }
            "--manifest" => {
                let value = iter.next().ok_or("--manifest requires a path")?;
                opts.manifest = Some(PathBuf::from(value));
            }
            "--features" => {
                let value = iter.next().ok_or("--features requires a name")?;
                opts.features.push(value.clone());
            }
            other => return Err(format!("unknown option: {other}")),
        }
    }

    Ok(opts)
}

/// Turn options into a run configuration, loading the manifest if one
/// applies. `--features` flags win over any manifest.
fn load_config(opts: &Options) -> Result<VerifyConfig, String> {
    let mut config = VerifyConfig::default();
    if let Some(workspace) = &opts.workspace {
        config.workspace_root = workspace.clone();
    }

    if !opts.features.is_empty() {
        config.feature_sets = opts
            .features
            .iter()
            .map(featmatrix::FeatureConfig::new)
            .collect();
        return Ok(config);
    }

    let manifest_path = match &opts.manifest {
        Some(path) => Some(path.clone()),
        None => {
            let conventional = config.workspace_root.join(Manifest::FILE_NAME);
            conventional.exists().then_some(conventional)
        }
    };

    if let Some(path) = manifest_path {
        let manifest = Manifest::load(&path).map_err(|e| e.to_string())?;
        config.feature_sets = manifest.feature_sets;
    }

    Ok(config)
}

fn cmd_run(args: &[String]) -> ExitCode {
    let config = match parse_options(args).and_then(|opts| load_config(&opts)) {
        Ok(config) => config,
        Err(message) => return usage_error(&message),
    };
    tracing::debug!(?config, "resolved configuration");

    let mut runner = ProcessRunner;
    let outcome = run(&config, &mut runner);
    match &outcome {
        Outcome::Passed { steps } => {
            eprintln!("{} all {} steps passed", "ok:".green().bold(), steps);
            ExitCode::SUCCESS
        }
        Outcome::Failed { step, failure, .. } => {
            eprintln!("{} step `{}` {}", "error:".red().bold(), step, failure);
            exit_code(outcome.exit_code())
        }
    }
}

fn cmd_plan(args: &[String]) -> ExitCode {
    let config = match parse_options(args).and_then(|opts| load_config(&opts)) {
        Ok(config) => config,
        Err(message) => return usage_error(&message),
    };

    for step in build_plan(&config) {
        println!("{}", step.invocation);
    }
    ExitCode::SUCCESS
}

fn usage_error(message: &str) -> ExitCode {
    eprintln!("{} {message}", "error:".red().bold());
    ExitCode::from(USAGE_ERROR)
}

/// Map a child exit code onto our own. Codes outside u8 range (signals,
/// negative codes) collapse to 1.
fn exit_code(code: i32) -> ExitCode {
    match u8::try_from(code) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::from(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_empty_is_default() {
        assert_eq!(parse_options(&[]).unwrap(), Options::default());
    }

    #[test]
    fn parse_all_options() {
        let opts = parse_options(&strings(&[
            "--workspace",
            "/work",
            "--manifest",
            "matrix.json",
            "--features",
            "test-no-std",
            "--features",
            "huge-pages",
        ]))
        .unwrap();

        assert_eq!(opts.workspace, Some(PathBuf::from("/work")));
        assert_eq!(opts.manifest, Some(PathBuf::from("matrix.json")));
        assert_eq!(opts.features, vec!["test-no-std", "huge-pages"]);
    }

    #[test]
    fn parse_rejects_unknown_option() {
        assert!(parse_options(&strings(&["--retries", "3"])).is_err());
    }

    #[test]
    fn parse_rejects_missing_value() {
        assert!(parse_options(&strings(&["--features"])).is_err());
    }

    #[test]
    fn features_flags_override_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(Manifest::FILE_NAME),
            r#"{ "feature_sets": ["from-manifest"] }"#,
        )
        .unwrap();

        let opts = Options {
            workspace: Some(dir.path().to_path_buf()),
            manifest: None,
            features: vec!["from-flag".to_string()],
        };
        let config = load_config(&opts).unwrap();
        assert_eq!(
            config.feature_sets,
            vec![featmatrix::FeatureConfig::new("from-flag")]
        );
    }

    #[test]
    fn conventional_manifest_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(Manifest::FILE_NAME),
            r#"{ "feature_sets": ["from-manifest"] }"#,
        )
        .unwrap();

        let opts = Options {
            workspace: Some(dir.path().to_path_buf()),
            manifest: None,
            features: Vec::new(),
        };
        let config = load_config(&opts).unwrap();
        assert_eq!(
            config.feature_sets,
            vec![featmatrix::FeatureConfig::new("from-manifest")]
        );
    }

    #[test]
    fn no_manifest_keeps_default_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let opts = Options {
            workspace: Some(dir.path().to_path_buf()),
            manifest: None,
            features: Vec::new(),
        };
        let config = load_config(&opts).unwrap();
        assert_eq!(
            config.feature_sets,
            vec![featmatrix::FeatureConfig::new("test-no-std")]
        );
    }

    #[test]
    fn explicit_manifest_failure_is_reported() {
        let opts = Options {
            workspace: None,
            manifest: Some(PathBuf::from("/definitely/not/here.json")),
            features: Vec::new(),
        };
        let err = load_config(&opts).unwrap_err();
        assert!(err.contains("here.json"), "message: {err}");
    }
}
