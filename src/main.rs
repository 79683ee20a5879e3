use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use pycompilecheck::analyzer::ScanOptions;
use pycompilecheck::config::Config;
use pycompilecheck::error::ValidationError;
use pycompilecheck::paths::normalize_path;
use pycompilecheck::report::{self, AnalysisReport};
use pycompilecheck::runner::{AnalysisRunner, LocalRunner};
use pycompilecheck::watcher::ProjectWatcher;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser)]
#[command(
    name = "pycompilecheck",
    version = VERSION,
    about = "Detect and annotate changed Python sources",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(default_value = ".", help = "Project root to analyze")]
    path: PathBuf,

    #[arg(long, help = "Print a JSON report of the run to stdout")]
    report: bool,

    #[arg(long, help = "Config file (default: <root>/.pycompilecheck/config.toml)")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run once, then re-run whenever a source file is modified")]
    Watch {
        #[arg(default_value = ".", help = "Project root to watch")]
        path: PathBuf,

        #[arg(long, help = "Quiet window after a triggered run, in milliseconds")]
        debounce_ms: Option<u64>,

        #[arg(long, help = "Config file (default: <root>/.pycompilecheck/config.toml)")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                err.exit();
            }
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    // stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let result = match cli.command {
        Some(Command::Watch {
            path,
            debounce_ms,
            config,
        }) => watch(&path, debounce_ms, config).await,
        None => run_once(&cli.path, cli.report, cli.config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn resolve_root(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(ValidationError::PathNotFound(path.display().to_string()).into());
    }
    normalize_path(path)
}

async fn run_once(path: &Path, print_report: bool, config_path: Option<PathBuf>) -> Result<()> {
    let root = resolve_root(path)?;
    let config = Config::resolve(&root, config_path)?;

    let summary = LocalRunner::new(config).run(&root).await?;

    if print_report {
        let report = AnalysisReport::from_run(&summary);
        report::emit(&report, std::io::stdout().lock()).context("Failed to write report")?;
    }

    Ok(())
}

async fn watch(path: &Path, debounce_ms: Option<u64>, config_path: Option<PathBuf>) -> Result<()> {
    let root = resolve_root(path)?;
    let mut config = Config::resolve(&root, config_path)?;
    if let Some(ms) = debounce_ms {
        config.watch.debounce_ms = ms;
        config.validate()?;
    }

    let options = ScanOptions::from_config(&config.analysis)?;
    let debounce = config.watch.debounce();
    let runner = LocalRunner::new(config);

    runner.run(&root).await.context("Initial analysis failed")?;

    ProjectWatcher::new(&root, options, debounce, Arc::new(runner))
        .watch()
        .await
}
