//! Progress events emitted during scanning (consumed by the CLI layer)

use std::path::PathBuf;

/// Real-time progress updates during a scan.
///
/// The scanner never formats text; presentation layers turn these into
/// progress bars or log lines.
#[derive(Debug, Clone)]
pub enum ScanProgressEvent {
    /// Discovery finished; hashing/parsing of cache misses is starting.
    ResolveStarted {
        /// Number of files that missed the cache and need resolution
        total: u64,
    },

    /// One cache miss was resolved (hashed or parsed).
    ResolveProgress {
        completed: u64,
        total: u64,
        current_path: PathBuf,
    },

    /// The scan pass is complete, including the cache prune.
    Finished {
        files_scanned: usize,
        cache_hits: usize,
    },
}

/// Callback signature for progress reporting. Must be `Sync` because resolve
/// progress is reported from rayon workers.
pub type ProgressFn = dyn Fn(ScanProgressEvent) + Send + Sync;
