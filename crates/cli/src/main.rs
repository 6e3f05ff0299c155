//! jfold CLI — rewrites Java sources in place between Lombok markers and the
//! explicit code they stand for.
//!
//! Calls `jfold-core` directly; every subcommand is one batch over a source tree.

use anyhow::{bail, Context};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use jfold_core::drivers::{Driver, DriverKind};
use jfold_core::loginspect;
use jfold_core::load_jfold_config;
use jfold_core::walk::{run_batch, BatchOptions, BatchReport};

/// jfold — expand, collapse and repair Java boilerplate in place.
#[derive(Parser)]
#[command(name = "jfold", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Args)]
struct TransformArgs {
    /// Source tree root (default: current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Report what would change without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Run corruption repair and glue fixing before the main pass
    #[arg(long)]
    repair_first: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace @RequiredArgsConstructor and @Slf4j with explicit code
    Expand(TransformArgs),
    /// Replace generated-looking constructors and loggers with markers
    Collapse(TransformArgs),
    /// Move misplaced logger fields back into the class body
    Repair(TransformArgs),
    /// Split markers glued onto the following declaration
    FixGlue(TransformArgs),
    /// Print error lines (and context) from a build log
    InspectLog {
        /// Log file (UTF-8 or UTF-16)
        file: PathBuf,

        /// Text that marks an interesting line
        #[arg(long, default_value = loginspect::DEFAULT_MARKER)]
        marker: String,

        /// Lines of context after each match
        #[arg(long, default_value_t = loginspect::DEFAULT_CONTEXT)]
        context: usize,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn resolve_root(root: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir().context("Could not determine current directory")?,
    };
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }
    root.canonicalize().with_context(|| format!("Path not found: {}", root.display()))
}

/// The pipeline for one subcommand. Repair and glue fixing go first when asked.
fn pipeline(main: DriverKind, repair_first: bool) -> Vec<&'static dyn Driver> {
    let mut kinds = Vec::new();
    if repair_first {
        kinds.extend([DriverKind::Repair, DriverKind::GlueFix]);
    }
    if !kinds.contains(&main) {
        kinds.push(main);
    }
    kinds.into_iter().map(DriverKind::driver).collect()
}

fn print_report(report: &BatchReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for path in &report.changed {
        println!("  {path}");
    }
    for failure in &report.failures {
        eprintln!("error: {}: {}", failure.path, failure.error);
    }
    println!("{}", report.summary());
    Ok(())
}

fn transform(kind: DriverKind, args: TransformArgs, json: bool) -> anyhow::Result<ExitCode> {
    let root = resolve_root(args.root)?;
    let config = load_jfold_config(&root);
    let drivers = pipeline(kind, args.repair_first);
    debug!(
        root = %root.display(),
        scan_dirs = ?config.scan_dirs,
        drivers = ?drivers.iter().map(|d| d.name()).collect::<Vec<_>>(),
        "Resolved batch"
    );
    let report = run_batch(&config, &drivers, BatchOptions { dry_run: args.dry_run });
    print_report(&report, json)?;
    Ok(if report.failures.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn inspect_log(file: PathBuf, marker: &str, context: usize, json: bool) -> anyhow::Result<ExitCode> {
    let text = loginspect::read_log(&file)?;
    let excerpts = loginspect::find_excerpts(&text, marker, context);
    debug!(file = %file.display(), marker, matches = excerpts.len(), "Inspected log");
    if json {
        println!("{}", serde_json::to_string_pretty(&excerpts)?);
    } else if excerpts.is_empty() {
        eprintln!("No lines containing '{marker}' in {}", file.display());
    } else {
        print!("{}", loginspect::render_excerpts(&excerpts));
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("jfold=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    match cli.command {
        Commands::Expand(args) => transform(DriverKind::Expand, args, json),
        Commands::Collapse(args) => transform(DriverKind::Collapse, args, json),
        Commands::Repair(args) => transform(DriverKind::Repair, args, json),
        Commands::FixGlue(args) => transform(DriverKind::GlueFix, args, json),
        Commands::InspectLog { file, marker, context } => inspect_log(file, &marker, context, json),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "jfold", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pipeline_order() {
        let names: Vec<_> = pipeline(DriverKind::Expand, true).iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["repair", "fix-glue", "expand"]);
        let names: Vec<_> = pipeline(DriverKind::Repair, true).iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["repair", "fix-glue"]);
        let names: Vec<_> = pipeline(DriverKind::Collapse, false).iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["collapse"]);
    }

    #[test]
    fn test_parse_transform_flags() {
        let cli = Cli::parse_from(["jfold", "collapse", "--dry-run", "--repair-first", "--json"]);
        assert!(cli.json);
        match cli.command {
            Commands::Collapse(args) => {
                assert!(args.dry_run);
                assert!(args.repair_first);
                assert!(args.root.is_none());
            }
            _ => panic!("expected collapse"),
        }
    }

    #[test]
    fn test_parse_inspect_log_defaults() {
        let cli = Cli::parse_from(["jfold", "inspect-log", "build.log"]);
        match cli.command {
            Commands::InspectLog { marker, context, .. } => {
                assert_eq!(marker, "ERROR");
                assert_eq!(context, 2);
            }
            _ => panic!("expected inspect-log"),
        }
    }
}
