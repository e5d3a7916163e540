//! Terminal progress rendering for manifest fetches and scan passes

use crate::scan_events::ScanProgressEvent;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while the remote manifest is being fetched
pub fn manifest_spinner(repo_id: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("-\\|/ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Fetching manifest for {}...", repo_id));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Bar tracking resolution of cache misses during a scan
///
/// Starts at length zero; `apply_event` sets the real length once discovery
/// finishes and the miss count is known.
pub fn scan_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg:<28} [{bar:32.cyan/blue}] {pos}/{len}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message("Scanning...");
    pb
}

/// Drive a scan bar from scanner progress events
pub fn apply_event(pb: &ProgressBar, event: ScanProgressEvent) {
    match event {
        ScanProgressEvent::ResolveStarted { total } => {
            pb.set_length(total);
            pb.set_message("Resolving files...");
        }
        ScanProgressEvent::ResolveProgress {
            completed,
            current_path,
            ..
        } => {
            pb.set_position(completed);
            if let Some(name) = current_path.file_name() {
                pb.set_message(name.to_string_lossy().into_owned());
            }
        }
        ScanProgressEvent::Finished { .. } => {}
    }
}
