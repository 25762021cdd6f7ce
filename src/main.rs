use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use revkit::coverage::{audit_coverage, print_coverage_report};
use revkit::dedup::reconcile_duplicates;
use revkit::placeholder::{
    PlaceholderDetector, delete_placeholders, print_placeholder_report, scan_placeholders,
};
use revkit::remap::remap_content;
use revkit::sql::{DEFAULT_BATCH_SIZE, SqlSplitError, import_file, write_chunks};
use revkit::{ConfigError, ContentKind, ContentStore, StoreConfig, StoreError, SubtopicId};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// revkit - maintenance toolkit for IGCSE revision content
#[derive(Parser)]
#[command(name = "revkit")]
#[command(about = "Audit and repair revision content across the syllabus hierarchy")]
#[command(version)]
struct Cli {
    /// Path to the local SQLite database
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Use the hosted store (SUPABASE_URL / SUPABASE_SERVICE_ROLE_KEY)
    #[arg(long, global = true)]
    remote: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Report subtopics missing required content kinds
    Coverage,
    /// Delete duplicate content, keeping the oldest row of each group
    Dedup(DedupCommand),
    /// Find (and optionally delete) placeholder content
    Placeholders(PlaceholdersCommand),
    /// Move content from superseded subtopics to their replacements
    Remap(RemapCommand),
    /// Split a SQL script into numbered chunk files
    Split(SplitCommand),
    /// Execute a SQL script statement by statement
    Import(ImportCommand),
}

#[derive(Parser)]
struct DedupCommand {
    /// Content kind to reconcile (e.g. flashcards); all kinds when omitted
    #[arg(value_name = "KIND")]
    kind: Option<ContentKind>,

    /// Report duplicates without deleting
    #[arg(long)]
    dry_run: bool,
}

#[derive(Parser)]
struct PlaceholdersCommand {
    /// Delete every matched row
    #[arg(long)]
    delete: bool,
}

#[derive(Parser)]
struct RemapCommand {
    /// Superseded subtopic ids; detected automatically when omitted
    #[arg(value_name = "OLD_SUBTOPIC_ID")]
    old: Vec<String>,
}

#[derive(Parser)]
struct SplitCommand {
    /// SQL script to split
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Statements per chunk
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_batch_size)]
    batch_size: usize,

    /// Directory for chunk files (defaults to the script's directory)
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

#[derive(Parser)]
struct ImportCommand {
    /// SQL script to execute
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Split(cmd) => handle_split(cmd),
        command => {
            let store = StoreConfig::resolve(cli.db.clone(), cli.remote)?.open()?;
            execute(command, store.as_ref())
        }
    }
}

/// Runs a store-backed command.
///
/// Separated from `run` so tests can drive commands against an in-memory database.
fn execute(command: &Commands, store: &dyn ContentStore) -> Result<()> {
    match command {
        Commands::Coverage => {
            let report = audit_coverage(store).context("Coverage audit failed")?;
            print_coverage_report(&report);
        }
        Commands::Dedup(cmd) => handle_dedup(cmd, store)?,
        Commands::Placeholders(cmd) => handle_placeholders(cmd, store)?,
        Commands::Remap(cmd) => handle_remap(cmd, store)?,
        Commands::Import(cmd) => handle_import(cmd, store)?,
        Commands::Split(cmd) => handle_split(cmd)?,
    }
    Ok(())
}

fn handle_dedup(cmd: &DedupCommand, store: &dyn ContentStore) -> Result<()> {
    let kinds = match cmd.kind {
        Some(kind) => vec![kind],
        None => ContentKind::ALL.to_vec(),
    };

    let mut total = 0;
    for kind in kinds {
        match reconcile_duplicates(store, kind, cmd.dry_run) {
            Ok(outcome) => {
                let verb = if cmd.dry_run { "would delete" } else { "deleted" };
                let count = if cmd.dry_run {
                    outcome.duplicates_found
                } else {
                    outcome.deleted
                };
                println!(
                    "{:<20} scanned {:>6}  {} {}",
                    kind.table(),
                    outcome.scanned,
                    verb,
                    count
                );
                total += count;
            }
            Err(e) => {
                error!(kind = %kind, error = %e, "dedup failed");
                println!("{:<20} failed: {e}", kind.table());
            }
        }
    }

    let summary = if cmd.dry_run { "Duplicates found" } else { "Duplicates deleted" };
    println!("{summary}: {total}");
    Ok(())
}

fn handle_placeholders(cmd: &PlaceholdersCommand, store: &dyn ContentStore) -> Result<()> {
    let detector = PlaceholderDetector::new().context("Failed to compile placeholder patterns")?;
    let scan = scan_placeholders(store, &detector).context("Placeholder scan failed")?;
    print_placeholder_report(&scan);

    if cmd.delete && !scan.matches.is_empty() {
        let deletion = delete_placeholders(store, &scan);
        println!();
        println!("Deleted {} placeholder rows", deletion.deleted);
        for e in &deletion.errors {
            println!("  failed: {e}");
        }
    }
    Ok(())
}

fn handle_remap(cmd: &RemapCommand, store: &dyn ContentStore) -> Result<()> {
    let old: Vec<SubtopicId> = cmd.old.iter().map(|id| SubtopicId::new(id.trim())).collect();
    let outcome = remap_content(store, &old).context("Remap failed")?;

    for m in &outcome.moves {
        println!("{} -> {} ({}): {} rows", m.from, m.to, m.path, m.rows_moved);
    }
    println!(
        "Remapped {} subtopics, moved {} rows, {} without a unique replacement",
        outcome.moves.len(),
        outcome.rows_moved(),
        outcome.not_found
    );
    for e in &outcome.errors {
        println!("  failed: {e}");
    }
    Ok(())
}

fn handle_split(cmd: &SplitCommand) -> Result<()> {
    ensure_file_exists(&cmd.file)?;
    let written = write_chunks(&cmd.file, cmd.out_dir.as_deref(), cmd.batch_size)?;
    for path in &written {
        println!("{}", path.display());
    }
    println!("Wrote {} chunk files", written.len());
    Ok(())
}

fn handle_import(cmd: &ImportCommand, store: &dyn ContentStore) -> Result<()> {
    ensure_file_exists(&cmd.file)?;
    let report = import_file(store, &cmd.file)?;

    for failure in report.real_failures() {
        println!("  #{} {}: {}", failure.index + 1, failure.preview, failure.message);
    }
    println!(
        "Executed {} of {} statements ({} already applied, {} failed)",
        report.executed,
        report.total,
        report.benign_failures(),
        report.real_failures().count()
    );
    Ok(())
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("File not found: {}", path.display());
    }
    Ok(())
}

fn parse_batch_size(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("batch size must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are fixable by the operator: bad configuration, missing input
/// files, and scripts that cannot be tokenized.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.is::<ConfigError>()
            || cause.is::<SqlSplitError>()
            || matches!(
                cause.downcast_ref::<StoreError>(),
                Some(StoreError::MissingConfig(_) | StoreError::InvalidUrl(_))
            )
    }) || error.to_string().starts_with("File not found")
}
