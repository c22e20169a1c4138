//! # CLI Module
//!
//! Command-line interface for media-tidy.
//!
//! ## Usage
//! ```bash
//! # Find duplicate photos
//! media-tidy dupes ~/Pictures
//! media-tidy dupes ~/Pictures --output json
//!
//! # Renumber a folder by date taken on disk
//! media-tidy reorder ~/Pictures/trip --width 4
//!
//! # Renumber every album under a folder, five at a time
//! media-tidy reorder-all ~/Pictures/albums
//!
//! # Sort a folder with shortcut keys
//! media-tidy classify ~/Pictures/inbox
//! ```

mod classify;

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_tidy::core::comparator::GroupingStrategy;
use media_tidy::core::organize::{
    move_file, soft_delete, ConflictPolicy, ShortcutConfig, ShortcutStore,
};
use media_tidy::core::pipeline::{DuplicatePipeline, DuplicateReport};
use media_tidy::core::reorder::{ReorderConfig, DEFAULT_BATCH_WIDTH, DEFAULT_JOBS, DEFAULT_WIDTH};
use media_tidy::error::{ConfigError, Result};
use media_tidy::events::{Event, EventChannel, HashEvent, PipelineEvent, ReorderEvent, ScanEvent};
use std::path::{Path, PathBuf};
use std::thread;

/// media-tidy - find duplicate photos and tidy media folders safely
#[derive(Parser, Debug)]
#[command(name = "media-tidy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to a daily file in this folder
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Shortcut file (default: ~/.media-tidy/shortcuts.json)
    #[arg(long, global = true)]
    shortcuts: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find photos with identical fingerprints
    Dupes {
        /// Folder to search
        dir: PathBuf,

        /// Images handed to a hashing worker at once
        #[arg(long, default_value_t = 200)]
        chunk_size: usize,

        /// Hashing worker threads (default: one per core)
        #[arg(long)]
        workers: Option<usize>,

        /// How candidate pairs are found
        #[arg(long, default_value = "pairwise")]
        strategy: Strategy,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Rename files in a folder to 0001.ext, 0002.ext, ... oldest first
    Reorder {
        dir: PathBuf,

        /// Digits in each number
        #[arg(short, long, default_value_t = DEFAULT_WIDTH)]
        width: usize,
    },

    /// Renumber every subfolder of a folder
    ReorderAll {
        root: PathBuf,

        #[arg(short, long, default_value_t = DEFAULT_BATCH_WIDTH)]
        width: usize,

        /// Subfolders processed at once
        #[arg(short, long, default_value_t = DEFAULT_JOBS)]
        jobs: usize,
    },

    /// Move a file into a folder without overwriting anything
    Move { file: PathBuf, dest_dir: PathBuf },

    /// Move a file into the .delete folder beside it
    Trash { file: PathBuf },

    /// Sort a folder interactively with shortcut keys
    Classify { dir: PathBuf },

    /// Show or change shortcut keys
    Shortcuts {
        #[command(subcommand)]
        action: ShortcutAction,
    },
}

#[derive(Subcommand, Debug)]
enum ShortcutAction {
    /// Print every binding
    List,
    /// Bind a key to a folder (absolute, or relative to each file)
    Set {
        key: char,
        target_dir: String,
        #[arg(long, default_value = "")]
        label: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    /// Compare every pair
    Pairwise,
    /// Bucket by fingerprint
    Buckets,
}

impl From<Strategy> for GroupingStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Pairwise => GroupingStrategy::PairwiseScan,
            Strategy::Buckets => GroupingStrategy::ExactBuckets,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let _guard = media_tidy::init_tracing(cli.verbose, cli.log_dir.as_deref());

    let store = || -> Result<ShortcutStore> {
        Ok(match &cli.shortcuts {
            Some(path) => ShortcutStore::open(path),
            None => ShortcutStore::default_location()?,
        })
    };

    match cli.command {
        Commands::Dupes {
            ref dir,
            chunk_size,
            workers,
            strategy,
            output,
        } => run_dupes(dir, chunk_size, workers, strategy.into(), output, cli.verbose),
        Commands::Reorder { ref dir, width } => run_reorder(dir, width),
        Commands::ReorderAll {
            ref root,
            width,
            jobs,
        } => run_reorder_all(root, width, jobs),
        Commands::Move {
            ref file,
            ref dest_dir,
        } => {
            let moved = move_file(file, dest_dir, ConflictPolicy::default())?;
            println!("{} -> {}", file.display(), moved.display());
            Ok(())
        }
        Commands::Trash { ref file } => {
            let moved = soft_delete(file)?;
            println!("{} -> {}", file.display(), moved.display());
            Ok(())
        }
        Commands::Classify { ref dir } => classify::run(dir, store()?),
        Commands::Shortcuts { ref action } => run_shortcuts(action, &store()?),
    }
}

fn run_dupes(
    dir: &Path,
    chunk_size: usize,
    workers: Option<usize>,
    strategy: GroupingStrategy,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("media-tidy").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let mut builder = DuplicatePipeline::builder()
        .root(dir)
        .chunk_size(chunk_size)
        .strategy(strategy);
    if let Some(workers) = workers {
        builder = builder.workers(workers);
    }
    let pipeline = builder.build();

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress_clone.as_ref() else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Scan(ScanEvent::Completed { total_images }) => {
                    pb.set_length(total_images as u64);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let report = result?;

    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &report, verbose),
        OutputFormat::Json => print_json_results(&report)?,
        OutputFormat::Minimal => print_minimal_results(&report),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, report: &DuplicateReport, verbose: bool) {
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} images scanned in {:.1}s",
        style(report.total_images).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate groups found",
        style(report.groups.len()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate images",
        style(report.duplicate_count()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} potential space savings",
        style(format_bytes(report.reclaimable_bytes())).yellow()
    ))
    .ok();
    if !report.failed.is_empty() {
        term.write_line(&format!(
            "  {} images could not be read",
            style(report.failed.len()).red()
        ))
        .ok();
    }
    term.write_line("").ok();

    if report.groups.is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("✓").green()))
            .ok();
    } else {
        term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        let home = dirs::home_dir();
        for group in &report.groups {
            term.write_line(&format!(
                "  {} {} ({} images, {})",
                style(format!("Group {}:", group.id)).bold(),
                style(group.fingerprint).yellow(),
                group.files.len(),
                format_bytes(group.reclaimable_bytes())
            ))
            .ok();

            for (idx, file) in group.files.iter().enumerate() {
                let marker = if idx == 0 {
                    style("★").green().to_string()
                } else {
                    style("○").dim().to_string()
                };
                term.write_line(&format!(
                    "    {} {}",
                    marker,
                    display_path(&file.full_path, home.as_deref())
                ))
                .ok();
            }
            term.write_line("").ok();
        }
    }

    if verbose {
        for path in &report.failed {
            term.write_line(&format!("  {} {}", style("unreadable:").red(), path.display()))
                .ok();
        }
    }

    term.write_line(&format!(
        "{}",
        style("No files were moved or deleted. Review carefully before taking action.").dim()
    ))
    .ok();
}

fn print_json_results(report: &DuplicateReport) -> Result<()> {
    let output = serde_json::json!({
        "total_images": report.total_images,
        "hashed": report.hashed,
        "duplicate_groups": report.groups.len(),
        "duplicate_count": report.duplicate_count(),
        "potential_savings_bytes": report.reclaimable_bytes(),
        "duration_ms": report.duration_ms,
        "failed": report.failed,
        "groups": report.groups.iter().map(|g| {
            serde_json::json!({
                "id": g.id,
                "fingerprint": g.fingerprint.to_hex(),
                "files": g.files.iter().map(|f| &f.full_path).collect::<Vec<_>>(),
                "duplicate_size_bytes": g.reclaimable_bytes(),
            })
        }).collect::<Vec<_>>()
    });

    let text = serde_json::to_string_pretty(&output).map_err(ConfigError::from)?;
    println!("{text}");
    Ok(())
}

fn print_minimal_results(report: &DuplicateReport) {
    for group in &report.groups {
        for file in group.files.iter().skip(1) {
            println!("{}", file.full_path.display());
        }
    }
}

fn run_reorder(dir: &Path, width: usize) -> Result<()> {
    let report = ReorderConfig::new()
        .width(width)
        .run(dir, &media_tidy::events::null_sender())?;
    println!(
        "{} {}: {} renamed, {} already in place",
        style("✓").green().bold(),
        dir.display(),
        report.renamed,
        report.unchanged
    );
    Ok(())
}

fn run_reorder_all(root: &Path, width: usize, jobs: usize) -> Result<()> {
    let (sender, receiver) = EventChannel::new();
    let pb = ProgressBar::new_spinner();

    let pb_clone = pb.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            if let Event::Reorder(ReorderEvent::Completed { dir, .. } | ReorderEvent::Failed { dir, .. }) = event {
                pb_clone.inc(1);
                pb_clone.set_message(dir.display().to_string());
            }
        }
    });

    let result = ReorderConfig::new()
        .width(width)
        .jobs(jobs)
        .run_batch(root, &sender);
    drop(sender);
    event_thread.join().ok();
    pb.finish_and_clear();

    let outcomes = result?;
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => println!(
                "{} {}: {} renamed, {} already in place",
                style("✓").green(),
                outcome.dir.display(),
                report.renamed,
                report.unchanged
            ),
            Err(e) => {
                failed += 1;
                println!("{} {}: {}", style("✗").red(), outcome.dir.display(), e);
            }
        }
    }
    println!(
        "{} folders, {} failed",
        style(outcomes.len()).cyan(),
        style(failed).red()
    );
    Ok(())
}

fn run_shortcuts(action: &ShortcutAction, store: &ShortcutStore) -> Result<()> {
    match action {
        ShortcutAction::List => {
            println!("{}", style(store.path().display()).dim());
            for shortcut in store.load() {
                let target = if shortcut.is_configured() {
                    shortcut.target_dir.clone()
                } else {
                    style("(not set)").dim().to_string()
                };
                println!("  {}  {:<16} {}", style(shortcut.key).bold(), shortcut.label, target);
            }
        }
        ShortcutAction::Set {
            key,
            target_dir,
            label,
        } => {
            store.set(ShortcutConfig::new(*key, target_dir.clone(), label.clone()))?;
            println!("{} '{}' -> {}", style("✓").green(), key, target_dir);
        }
    }
    Ok(())
}

fn display_path(path: &Path, home: Option<&Path>) -> String {
    match home.and_then(|h| path.strip_prefix(h).ok()) {
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn reorder_defaults() {
        let cli = Cli::parse_from(["media-tidy", "reorder-all", "/albums"]);
        match cli.command {
            Commands::ReorderAll { width, jobs, .. } => {
                assert_eq!(width, 5);
                assert_eq!(jobs, 5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn shortcut_key_parses_as_char() {
        let cli = Cli::parse_from(["media-tidy", "shortcuts", "set", "k", "/keep"]);
        assert!(matches!(
            cli.command,
            Commands::Shortcuts {
                action: ShortcutAction::Set { key: 'k', .. }
            }
        ));
    }

    #[test]
    fn bytes_are_human_readable() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn home_is_abbreviated() {
        assert_eq!(
            display_path(Path::new("/home/me/pics/a.jpg"), Some(Path::new("/home/me"))),
            "~/pics/a.jpg"
        );
        assert_eq!(display_path(Path::new("/tmp/a.jpg"), None), "/tmp/a.jpg");
    }
}
