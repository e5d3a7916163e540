use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::output::{self, OutputMode};
use crate::progress;
use crate::reconcile::{ReconcileOptions, Reconciler};
use crate::records::LocalFileRecord;
use crate::remote::{ManifestClient, RepoLocator};
use crate::scan_events::ScanProgressEvent;
use crate::scanner::{CancelToken, InventoryScanner, ScanMode, ScanOptions, ScanStats};

#[derive(Parser)]
#[command(name = "repocheck")]
#[command(version)]
#[command(about = "Check which files of a hosted model repository you already have locally")]
#[command(long_about = "repocheck reconciles a hosted repository's file manifest against your \
    local model directories, matching by content hash first and filename second.\n\n\
    Examples:\n  \
    repocheck dirs add ~/models --mode direct   # Register a local directory\n  \
    repocheck check https://huggingface.co/user/repo\n  \
    repocheck check https://huggingface.co/user/repo --json\n  \
    repocheck scan --force                      # Rebuild the hash cache")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show per-file details for every bucket
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors and JSON
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Parse sidecar metadata JSON files (fast)
    Sidecar,
    /// Hash the model files themselves (slow but self-contained)
    Direct,
}

impl From<ModeArg> for ScanMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Sidecar => ScanMode::Sidecar,
            ModeArg::Direct => ScanMode::Direct,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile a repository against the configured local directories
    #[command(visible_alias = "c")]
    Check {
        /// Repository URL (model, dataset, or space; /tree/<rev> supported)
        url: String,

        /// Scan only this directory instead of the configured ones
        #[arg(long, value_name = "PATH")]
        dir: Option<PathBuf>,

        /// Scan mode for --dir [default: direct]
        #[arg(long, value_enum, default_value = "direct")]
        mode: ModeArg,

        /// Ignore the hash cache and rescan everything
        #[arg(short = 'f', long)]
        force_rescan: bool,

        /// Also list local files absent from the repository
        #[arg(long)]
        missing_remote: bool,

        /// Access token for private repositories (falls back to $HF_TOKEN)
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,

        /// Output the summary as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Scan the configured directories and report cache statistics
    #[command(visible_alias = "s")]
    Scan {
        /// Scan only this directory instead of the configured ones
        #[arg(long, value_name = "PATH")]
        dir: Option<PathBuf>,

        /// Scan mode for --dir [default: direct]
        #[arg(long, value_enum, default_value = "direct")]
        mode: ModeArg,

        /// Ignore the hash cache and rescan everything
        #[arg(short = 'f', long)]
        force: bool,
    },

    /// Manage the configured local directories
    Dirs {
        #[command(subcommand)]
        command: DirsCommands,
    },

    /// Manage the persistent hash cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
pub enum DirsCommands {
    /// Register a directory for scanning
    Add {
        path: PathBuf,

        #[arg(long, value_enum, default_value = "direct")]
        mode: ModeArg,

        /// Filename suffixes to scan (repeatable), e.g. --ext .safetensors
        #[arg(long = "ext", value_name = "EXT")]
        extensions: Vec<String>,
    },

    /// Unregister a directory
    Remove { path: PathBuf },

    /// List configured directories
    List,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Drop cached hashes so the next scan starts fresh
    Clear {
        /// Only clear the cache of this directory
        #[arg(value_name = "PATH")]
        dir: Option<PathBuf>,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let mode = if self.quiet {
            OutputMode::Quiet
        } else if self.verbose {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        };

        match self.command {
            Commands::Check {
                url,
                dir,
                mode: scan_mode,
                force_rescan,
                missing_remote,
                token,
                json,
            } => run_check(
                &url,
                dir,
                scan_mode.into(),
                force_rescan,
                missing_remote,
                token,
                json,
                mode,
            ),
            Commands::Scan {
                dir,
                mode: scan_mode,
                force,
            } => run_scan(dir, scan_mode.into(), force, mode),
            Commands::Dirs { command } => run_dirs(command, mode),
            Commands::Cache { command } => run_cache(command, mode),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_check(
    url: &str,
    dir: Option<PathBuf>,
    dir_mode: ScanMode,
    force_rescan: bool,
    missing_remote: bool,
    token: Option<String>,
    json: bool,
    mode: OutputMode,
) -> Result<()> {
    let locator = RepoLocator::parse(url)?;
    let token = token.or_else(|| std::env::var("HF_TOKEN").ok());

    let spinner = if mode != OutputMode::Quiet {
        Some(progress::manifest_spinner(&locator.repo_id))
    } else {
        None
    };
    let manifest = ManifestClient::new(locator.clone(), token)
        .fetch_manifest()
        .with_context(|| format!("Could not fetch the file list of {}", locator.repo_id))?;
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }

    let (inventory, _) = scan_targets(dir, dir_mode, force_rescan, mode)?;

    let options = ReconcileOptions {
        report_missing_remote: missing_remote,
        ..Default::default()
    };
    let summary = Reconciler::new(&inventory, &manifest, Some(&locator), options).reconcile();

    if json {
        println!("{}", output::summary_to_json(&summary)?);
    } else {
        output::print_summary(&summary, mode);
    }
    Ok(())
}

fn run_scan(
    dir: Option<PathBuf>,
    dir_mode: ScanMode,
    force: bool,
    mode: OutputMode,
) -> Result<()> {
    let (inventory, _totals) = scan_targets(dir, dir_mode, force, mode)?;
    if mode != OutputMode::Quiet {
        let with_hash = inventory.iter().filter(|f| f.sha256.is_some()).count();
        println!(
            "{} local files in inventory ({} with a content hash)",
            inventory.len(),
            with_hash
        );
    }
    Ok(())
}

/// Scan either the explicit directory or every enabled configured root, in
/// configuration order. Roots are independent; one failing root does not
/// stop the others.
fn scan_targets(
    dir: Option<PathBuf>,
    dir_mode: ScanMode,
    force_rescan: bool,
    mode: OutputMode,
) -> Result<(Vec<LocalFileRecord>, ScanStats)> {
    let targets: Vec<(PathBuf, ScanMode, Vec<String>)> = match dir {
        Some(path) => vec![(path, dir_mode, dir_mode.default_extensions())],
        None => {
            let config = Config::load();
            let dirs = config.enabled_directories();
            if dirs.is_empty() {
                anyhow::bail!(
                    "No directories configured. Add one with: repocheck dirs add <path>"
                );
            }
            dirs.into_iter()
                .map(|d| (d.path.clone(), d.scan_mode, d.extensions.clone()))
                .collect()
        }
    };

    let mut inventory = Vec::new();
    let mut totals = ScanStats::default();

    for (root, scan_mode, extensions) in targets {
        match scan_one_root(&root, scan_mode, extensions, force_rescan, mode) {
            Ok((files, stats)) => {
                inventory.extend(files);
                totals.files_scanned += stats.files_scanned;
                totals.cache_hits += stats.cache_hits;
                totals.cache_misses += stats.cache_misses;
                totals.parse_or_hash_errors += stats.parse_or_hash_errors;
                if mode != OutputMode::Quiet {
                    output::print_scan_stats(&root, &stats, mode);
                }
            }
            Err(e) => {
                eprintln!(
                    "{} Skipping {}: {}",
                    "Warning:".yellow(),
                    root.display(),
                    e
                );
            }
        }
    }

    Ok((inventory, totals))
}

fn scan_one_root(
    root: &Path,
    scan_mode: ScanMode,
    extensions: Vec<String>,
    force_rescan: bool,
    mode: OutputMode,
) -> Result<(Vec<LocalFileRecord>, ScanStats)> {
    let mut options = ScanOptions::for_mode(scan_mode);
    options.extensions = extensions;
    options.force_rescan = force_rescan;

    let mut scanner = InventoryScanner::new(root, options)?;

    let bar = if mode == OutputMode::Quiet {
        None
    } else {
        Some(progress::scan_bar())
    };

    let bar_events = bar.clone();
    let progress_cb = move |event: ScanProgressEvent| {
        let Some(bar) = &bar_events else { return };
        progress::apply_event(bar, event);
    };

    let outcome = scanner.scan(Some(&progress_cb), &CancelToken::new())?;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    Ok((outcome.files, outcome.stats))
}

fn run_dirs(command: DirsCommands, mode: OutputMode) -> Result<()> {
    let mut config = Config::load();

    match command {
        DirsCommands::Add {
            path,
            mode: scan_mode,
            extensions,
        } => {
            if !path.is_dir() {
                anyhow::bail!("Not a directory: {}", path.display());
            }
            let extensions = if extensions.is_empty() {
                None
            } else {
                Some(extensions)
            };
            let dir = config.add_directory(&path, scan_mode.into(), extensions);
            let added = dir.path.clone();
            config.save()?;
            if mode != OutputMode::Quiet {
                println!("{} {}", "Added".green().bold(), added.display());
            }
        }
        DirsCommands::Remove { path } => {
            if config.remove_directory(&path) {
                config.save()?;
                if mode != OutputMode::Quiet {
                    println!("{} {}", "Removed".green().bold(), path.display());
                }
            } else {
                anyhow::bail!("Directory was not configured: {}", path.display());
            }
        }
        DirsCommands::List => {
            if config.directories.is_empty() {
                println!("No directories configured.");
                return Ok(());
            }
            for dir in &config.directories {
                let state = if dir.enabled {
                    "enabled".green()
                } else {
                    "disabled".dimmed()
                };
                let scan_mode = match dir.scan_mode {
                    ScanMode::Sidecar => "sidecar",
                    ScanMode::Direct => "direct",
                };
                println!(
                    "{} [{}, {}] {}",
                    dir.path.display().to_string().bold(),
                    scan_mode,
                    state,
                    dir.extensions.join(" ")
                );
            }
        }
    }
    Ok(())
}

fn run_cache(command: CacheCommands, mode: OutputMode) -> Result<()> {
    match command {
        CacheCommands::Clear { dir } => {
            let roots: Vec<PathBuf> = match dir {
                Some(path) => vec![path],
                None => Config::load()
                    .directories
                    .iter()
                    .map(|d| d.path.clone())
                    .collect(),
            };

            for root in roots {
                let mut store = crate::cache::HashStore::for_root(&root)?;
                store.clear()?;
                if mode != OutputMode::Quiet {
                    println!(
                        "Cleared cache for {} ({})",
                        root.display(),
                        store.db_path().display()
                    );
                }
            }
        }
    }
    Ok(())
}
