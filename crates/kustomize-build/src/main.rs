use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kustomize_build::{generate_manifests, list_directories, KustomizeCommand, Overrides, Settings};

/// Kustomize exec plugin: builds every kustomization selected by the
/// `KustomizeBuild` resource and prints the concatenated documents.
#[derive(Parser, Debug)]
#[command(name = "kustomize-build", version)]
struct Cli {
    /// Path of the KustomizeBuild resource
    config: PathBuf,

    /// Directory `pwd` globs are relative to [default: $KUSTOMIZE_PLUGIN_CONFIG_ROOT]
    #[arg(long, value_name = "DIR")]
    working_dir: Option<PathBuf>,

    /// Number of parallel builds, or `auto` [default: $KUSTOMIZE_BUILD_JOBS or 1]
    #[arg(short, long, value_name = "N")]
    jobs: Option<String>,

    /// Kustomize executable [default: $KUSTOMIZE_BUILD_BIN or kustomize]
    #[arg(long, value_name = "PROGRAM")]
    kustomize: Option<PathBuf>,

    /// Extra argument passed to `kustomize build` (repeatable)
    #[arg(long = "build-arg", value_name = "ARG", allow_hyphen_values = true)]
    build_args: Vec<String>,

    /// Highest directory searched for `.git` [default: $KUSTOMIZE_BUILD_CEILING_DIR]
    #[arg(long, value_name = "DIR")]
    ceiling_dir: Option<PathBuf>,

    /// Print the selected directories instead of building them
    #[arg(long)]
    list: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("warning: {e:#}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", cli.config.display(), e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries the manifest stream.
fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();

    // The build pool logs through the `log` facade.
    tracing_log::LogTracer::init().context("failed to forward log records")?;
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let overrides = Overrides {
        working_dir: cli.working_dir.clone(),
        jobs: cli.jobs.clone(),
        kustomize: cli.kustomize.clone(),
        build_args: cli.build_args.clone(),
        ceiling_dir: cli.ceiling_dir.clone(),
    };
    let settings = Settings::resolve(overrides, |name| std::env::var(name))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.list {
        for dir in list_directories(&cli.config, &settings)? {
            writeln!(out, "{dir}")?;
        }
        out.flush()?;
        return Ok(());
    }

    let runner =
        KustomizeCommand::new(&settings.kustomize).with_args(settings.build_args.iter().cloned());
    let documents = generate_manifests(&cli.config, &settings, &runner, &mut out)?;
    info!(documents, "wrote manifests");

    Ok(())
}
