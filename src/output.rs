//! Presentation of reconciliation summaries and scan statistics
//!
//! The core produces structs; only this layer turns them into text.

use crate::records::{MatchResult, ReconciliationSummary};
use crate::scanner::ScanStats;
use anyhow::Result;
use colored::*;

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Quiet,
    Normal,
    Verbose,
}

fn size_human(size: Option<u64>) -> String {
    match size {
        Some(bytes) => bytesize::to_string(bytes, true),
        None => "?".to_string(),
    }
}

/// Print a reconciliation summary to stdout
pub fn print_summary(summary: &ReconciliationSummary, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }

    println!();
    println!(
        "{} {} remote files vs {} local files",
        "Reconciled".bold(),
        summary.total_remote_files,
        summary.total_local_files
    );
    println!(
        "  {} {}",
        format!("{:>5}", summary.match_count()).green().bold(),
        "matched"
    );
    if summary.mismatch_count() > 0 {
        println!(
            "  {} {}",
            format!("{:>5}", summary.mismatch_count()).red().bold(),
            "mismatched (different content under the same name)"
        );
    }
    if summary.missing_local_count() > 0 {
        println!(
            "  {} {}",
            format!("{:>5}", summary.missing_local_count())
                .yellow()
                .bold(),
            "missing locally"
        );
    }
    if summary.name_match_only_count() > 0 {
        println!(
            "  {} {}",
            format!("{:>5}", summary.name_match_only_count())
                .yellow()
                .bold(),
            "name match only (no hash to verify)"
        );
    }
    if summary.missing_remote_count() > 0 {
        println!(
            "  {} {}",
            format!("{:>5}", summary.missing_remote_count()).cyan().bold(),
            "local files not in the repository"
        );
    }

    if mode == OutputMode::Verbose {
        print_bucket("Mismatches", &summary.mismatches);
        print_bucket("Missing locally", &summary.missing_local);
        print_bucket("Name match only", &summary.name_matches_only);
        print_bucket("Not in repository", &summary.missing_remote);
    } else {
        // Mismatches are actionable even at normal verbosity
        print_bucket("Mismatches", &summary.mismatches);
    }
}

fn print_bucket(title: &str, results: &[MatchResult]) {
    if results.is_empty() {
        return;
    }

    println!();
    println!("{}:", title.bold());
    for result in results {
        println!("  {} ({})", result.file_name, size_human(result.remote_size));
        if let Some(notes) = non_empty(&result.notes) {
            println!("    {}", notes.dimmed());
        }
        if let Some(local_path) = &result.local_path {
            println!("    local:  {}", local_path);
        }
        if let Some(url) = &result.download_url {
            println!("    fetch:  {}", url.underline());
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Print per-root scan statistics
pub fn print_scan_stats(root: &std::path::Path, stats: &ScanStats, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }

    println!(
        "Scanned {}: {} files, {} cached, {} hashed/parsed, {} errors ({:.0}% hit rate)",
        root.display().to_string().bold(),
        stats.files_scanned,
        stats.cache_hits,
        stats.cache_misses,
        stats.parse_or_hash_errors,
        stats.cache_hit_rate()
    );
}

/// Serialize a summary as pretty JSON for scripting
pub fn summary_to_json(summary: &ReconciliationSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}
