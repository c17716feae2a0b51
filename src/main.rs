//! skiff - A fast terminal file manager.
//!
//! Usage:
//!   skiff [PATH]              Launch interactive TUI
//!   skiff list [PATH]         Headless directory listing
//!   skiff scan [PATHS...]     Parallel multi-directory summary
//!   skiff backends            Show scan backend availability
//!   skiff --help              Show help

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};

use skiff_core::{Entry, ListingOptions};
use skiff_scan::{BackendRegistry, DirScanner, ParallelScanner};

#[derive(Parser)]
#[command(
    name = "skiff",
    version,
    about = "A fast terminal file manager",
    long_about = "skiff browses directories through a concurrent scanning engine.\n\n\
                  Launch the interactive TUI by running `skiff [PATH]`, or use \
                  subcommands for headless operations."
)]
struct Cli {
    /// Path to browse (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Scan backend (auto, portable, jwalk, getdents)
    #[arg(short, long, default_value = "auto")]
    backend: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List one directory and exit
    List {
        /// Path to list
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Scan backend (auto, portable, jwalk, getdents)
        #[arg(short, long, default_value = "auto")]
        backend: String,

        /// Stop after this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Include hidden entries
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Scan many directories concurrently and summarize
    Scan {
        /// Paths to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Scan backend (auto, portable, jwalk, getdents)
        #[arg(short, long, default_value = "auto")]
        backend: String,

        /// Maximum concurrent scans
        #[arg(short, long)]
        workers: Option<usize>,

        /// Print one merged listing instead of per-path summaries
        #[arg(short, long)]
        merged: bool,
    },

    /// Show backend availability and version
    Backends,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Some(Command::List {
            path,
            backend,
            limit,
            all,
            format,
        }) => {
            init_logging();
            run_list(&path, &backend, limit, all, format)?;
        }
        Some(Command::Scan {
            paths,
            backend,
            workers,
            merged,
        }) => {
            init_logging();
            run_scan(&paths, &backend, workers, merged)?;
        }
        Some(Command::Backends) => {
            run_backends(&cli.backend);
        }
        None => {
            let path = cli.path.canonicalize().context("Invalid path")?;
            let registry = BackendRegistry::from_mode_str(&cli.backend);
            skiff_tui::run(path, registry)?;
        }
    }

    Ok(())
}

/// Log to stderr for headless commands; the TUI stays quiet.
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Scan one directory and print its listing.
fn run_list(
    path: &PathBuf,
    backend: &str,
    limit: Option<usize>,
    all: bool,
    format: OutputFormat,
) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;
    let registry = BackendRegistry::from_mode_str(backend);

    let mut scanner = DirScanner::new(registry);
    if let Some(limit) = limit {
        scanner = scanner.with_limit(limit);
    }
    scanner.start_async(&path)?;
    let mut entries = scanner.wait(None)?;
    scanner.close();

    let options = ListingOptions::builder()
        .show_hidden(all)
        .build()
        .map_err(|e| color_eyre::eyre::eyre!("{e}"))?;
    options.apply(&mut entries);
    entries.sort_by(|a, b| (!a.is_dir(), &a.name).cmp(&(!b.is_dir(), &b.name)));

    match format {
        OutputFormat::Text => {
            for entry in &entries {
                println!("{}", format_entry_line(entry));
            }
            eprintln!("{} entries", entries.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}

/// Scan many directories under the orchestrator and summarize.
fn run_scan(
    paths: &[PathBuf],
    backend: &str,
    workers: Option<usize>,
    merged: bool,
) -> Result<()> {
    let registry = BackendRegistry::from_mode_str(backend);
    let mut scanner = ParallelScanner::new(registry);
    if let Some(workers) = workers {
        scanner = scanner.with_max_workers(workers);
    }

    if merged {
        let entries = scanner.scan_all_merged(paths, None);
        for entry in &entries {
            println!("{}", format_entry_line(entry));
        }
        eprintln!("{} entries from {} directories", entries.len(), paths.len());
        return Ok(());
    }

    let results = scanner.scan_all_with_progress(paths, |completed, total| {
        eprint!("\r[{completed}/{total}] ");
    });
    eprintln!();

    for result in &results {
        match &result.error {
            None => {
                let total: u64 = result.entries.iter().map(|e| e.size).sum();
                println!(
                    "{:<48} {:>6} entries  {:>10}",
                    result.path.display(),
                    result.entries.len(),
                    format_size(total)
                );
            }
            Some(err) => {
                println!("{:<48} FAILED: {err}", result.path.display());
            }
        }
    }

    let failures = results.iter().filter(|r| !r.success).count();
    if failures > 0 {
        eprintln!("{failures} of {} paths failed", results.len());
    }

    Ok(())
}

/// Print the capability map and diagnostic version string.
fn run_backends(backend: &str) {
    let registry = BackendRegistry::from_mode_str(backend);

    println!("{}", registry.version());
    println!();
    for (id, available) in registry.available_backends() {
        println!(
            "  {:<10} {}",
            id,
            if available { "available" } else { "unavailable" }
        );
    }
}

/// One `ls -l`-ish line for an entry.
fn format_entry_line(entry: &Entry) -> String {
    let marker = match entry.kind {
        k if k.is_dir() => "d",
        k if k.is_symlink() => "l",
        skiff_core::EntryKind::Executable => "x",
        _ => "-",
    };
    let size = if entry.is_dir() {
        "-".to_string()
    } else {
        format_size(entry.size)
    };
    let mtime: chrono::DateTime<chrono::Local> = entry.modified.into();
    format!(
        "{marker} {:>10}  {}  {}",
        size,
        mtime.format("%Y-%m-%d %H:%M"),
        entry.name
    )
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
