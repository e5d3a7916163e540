//! Local inventory scanner
//!
//! Walks a scan root, resolves every candidate file to a `LocalFileRecord`
//! through the hash cache, and emits the complete inventory plus statistics.
//! Caching is strictly an optimization: any cache failure degrades to a miss
//! and the scan continues.

use crate::cache::HashStore;
use crate::hasher::{ContentHasher, Sha256Hasher};
use crate::records::LocalFileRecord;
use crate::scan_events::{ProgressFn, ScanProgressEvent};
use crate::sidecar;
use anyhow::Result;
use colored::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions scanned in direct-hash mode
pub const MODEL_EXTENSIONS: &[&str] = &[".safetensors", ".ckpt", ".pt", ".bin"];
/// Extensions scanned in sidecar mode
pub const SIDECAR_EXTENSIONS: &[&str] = &[".json"];

/// How a candidate file is resolved to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Parse sidecar metadata JSON files carrying pre-computed digests
    Sidecar,
    /// Hash the model files themselves (slow, but needs no sidecars)
    Direct,
}

impl ScanMode {
    pub fn default_extensions(self) -> Vec<String> {
        let exts = match self {
            ScanMode::Sidecar => SIDECAR_EXTENSIONS,
            ScanMode::Direct => MODEL_EXTENSIONS,
        };
        exts.iter().map(|e| e.to_string()).collect()
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Scan root does not exist or cannot be read: {0}")]
    RootUnreadable(PathBuf),
    #[error("Scan was cancelled")]
    Cancelled,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Cooperative cancellation signal, checked between files
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Counters accumulated over one scan pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Candidate files discovered by traversal
    pub files_scanned: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    /// Files skipped because parsing or hashing failed
    pub parse_or_hash_errors: usize,
}

impl ScanStats {
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64 * 100.0
        }
    }
}

/// Inventory plus statistics produced by one scan pass
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Records in traversal discovery order. Not sorted; callers must not
    /// depend on any particular ordering.
    pub files: Vec<LocalFileRecord>,
    pub stats: ScanStats,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub mode: ScanMode,
    /// Case-insensitive filename suffixes, including the leading dot
    pub extensions: Vec<String>,
    /// Drop all cache entries before scanning
    pub force_rescan: bool,
    /// Override the cache database location (tests); `None` uses the
    /// per-root default under the platform cache directory
    pub cache_db: Option<PathBuf>,
}

impl ScanOptions {
    pub fn for_mode(mode: ScanMode) -> Self {
        Self {
            mode,
            extensions: mode.default_extensions(),
            force_rescan: false,
            cache_db: None,
        }
    }
}

/// Scans one root directory and owns that root's hash cache for the duration
/// of the scan
pub struct InventoryScanner {
    root: PathBuf,
    options: ScanOptions,
    store: Option<HashStore>,
    hasher: Box<dyn ContentHasher>,
}

impl InventoryScanner {
    /// Bind a scanner to a root directory.
    ///
    /// An unreadable root is a configuration error and fails immediately; a
    /// cache that cannot be opened only costs the incremental speedup.
    pub fn new(root: &Path, options: ScanOptions) -> Result<Self, ScanError> {
        // Missing, non-directory, and permission-denied roots all fail here
        // rather than surfacing as per-entry traversal errors
        if std::fs::read_dir(root).is_err() {
            return Err(ScanError::RootUnreadable(root.to_path_buf()));
        }

        let store_result = match &options.cache_db {
            Some(db_path) => HashStore::open(db_path, root),
            None => HashStore::for_root(root),
        };
        let store = match store_result {
            Ok(store) => Some(store),
            Err(e) => {
                eprintln!(
                    "{} Scanning without cache ({}): {}",
                    "Warning:".yellow(),
                    root.display(),
                    e
                );
                None
            }
        };

        Ok(Self {
            root: root.to_path_buf(),
            options,
            store,
            hasher: Box::new(Sha256Hasher),
        })
    }

    /// Substitute the content hasher (tests use a counting wrapper)
    pub fn with_hasher(mut self, hasher: Box<dyn ContentHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Run one full scan pass: discover, resolve through the cache, prune.
    pub fn scan(
        &mut self,
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
    ) -> Result<ScanOutcome, ScanError> {
        let mut stats = ScanStats::default();

        if self.options.force_rescan {
            if let Some(store) = &mut self.store {
                if let Err(e) = store.clear() {
                    eprintln!("{} Failed to clear cache: {}", "Warning:".yellow(), e);
                }
            }
        }

        let discovered = self.discover(&mut stats, cancel)?;
        stats.files_scanned = discovered.len();

        // Split discovered files into cache hits and files needing resolution
        let mut resolved: HashMap<PathBuf, Option<LocalFileRecord>> = HashMap::new();
        let mut to_resolve: Vec<(PathBuf, SystemTime, u64)> = Vec::new();

        for path in &discovered {
            let metadata = match std::fs::metadata(path) {
                Ok(m) => m,
                Err(_) => {
                    stats.parse_or_hash_errors += 1;
                    continue;
                }
            };
            let size = metadata.len();
            let mtime = match metadata.modified() {
                Ok(t) => t,
                Err(_) => {
                    stats.parse_or_hash_errors += 1;
                    continue;
                }
            };

            // A cache read failure is just a miss
            let cached = self
                .store
                .as_ref()
                .and_then(|store| store.lookup(path).ok().flatten());

            match cached {
                Some(entry) if entry.is_hit(mtime, size) => {
                    stats.cache_hits += 1;
                    resolved.insert(path.clone(), entry.record);
                }
                _ => {
                    stats.cache_misses += 1;
                    to_resolve.push((path.clone(), mtime, size));
                }
            }
        }

        if let Some(cb) = progress {
            cb(ScanProgressEvent::ResolveStarted {
                total: to_resolve.len() as u64,
            });
        }

        let results = match self.options.mode {
            ScanMode::Sidecar => self.resolve_sidecars(&to_resolve, progress, cancel, &mut stats)?,
            ScanMode::Direct => self.resolve_direct(&to_resolve, progress, cancel, &mut stats)?,
        };

        // Serialize cache writes after the (possibly parallel) resolve pass
        if let Some(store) = &mut self.store {
            if let Err(e) = store.upsert_batch(&results) {
                eprintln!("{} Failed to update cache: {}", "Warning:".yellow(), e);
            }
        }

        for (path, _, _, record) in results {
            resolved.insert(path, record);
        }

        // Entries for files that vanished since the last scan must not outlive
        // their referent
        if let Some(store) = &mut self.store {
            let live: HashSet<PathBuf> = discovered.iter().cloned().collect();
            if let Err(e) = store.prune_except(&live) {
                eprintln!("{} Failed to prune cache: {}", "Warning:".yellow(), e);
            }
        }

        // Inventory order is traversal discovery order
        let mut files = Vec::new();
        for path in &discovered {
            if let Some(Some(record)) = resolved.get(path) {
                files.push(record.clone());
            }
        }

        if let Some(cb) = progress {
            cb(ScanProgressEvent::Finished {
                files_scanned: stats.files_scanned,
                cache_hits: stats.cache_hits,
            });
        }

        Ok(ScanOutcome { files, stats })
    }

    /// Recursive traversal with a symlink cycle guard: a directory whose
    /// canonical form was already visited is not descended into again.
    /// Entries are sorted by file name so discovery order is stable.
    fn discover(
        &self,
        stats: &mut ScanStats,
        cancel: &CancelToken,
    ) -> Result<Vec<PathBuf>, ScanError> {
        let extensions: Vec<String> = self
            .options
            .extensions
            .iter()
            .map(|e| e.to_lowercase())
            .collect();

        let mut visited_dirs: HashSet<PathBuf> = HashSet::new();
        let mut found = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() {
                    return true;
                }
                match std::fs::canonicalize(entry.path()) {
                    Ok(canonical) => visited_dirs.insert(canonical),
                    // Can't canonicalize: let walkdir surface the error
                    Err(_) => true,
                }
            });

        for entry in walker {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let entry = match entry {
                Ok(e) => e,
                Err(_) => {
                    stats.parse_or_hash_errors += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_lowercase();
            if extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
                found.push(entry.path().to_path_buf());
            }
        }

        Ok(found)
    }

    fn resolve_sidecars(
        &self,
        to_resolve: &[(PathBuf, SystemTime, u64)],
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
        stats: &mut ScanStats,
    ) -> Result<Vec<(PathBuf, SystemTime, u64, Option<LocalFileRecord>)>, ScanError> {
        let total = to_resolve.len() as u64;
        let mut results = Vec::with_capacity(to_resolve.len());

        for (i, (path, mtime, size)) in to_resolve.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let record = match sidecar::parse_sidecar(path) {
                Ok(Some(record)) => Some(record),
                // Empty or unidentifiable descriptions count as parse errors
                Ok(None) | Err(_) => {
                    stats.parse_or_hash_errors += 1;
                    None
                }
            };

            if let Some(cb) = progress {
                cb(ScanProgressEvent::ResolveProgress {
                    completed: i as u64 + 1,
                    total,
                    current_path: path.clone(),
                });
            }

            results.push((path.clone(), *mtime, *size, record));
        }

        Ok(results)
    }

    /// Hash cache misses across rayon workers. The path list is already a
    /// disjoint partition, so no file is hashed twice; counters are atomics.
    fn resolve_direct(
        &self,
        to_resolve: &[(PathBuf, SystemTime, u64)],
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
        stats: &mut ScanStats,
    ) -> Result<Vec<(PathBuf, SystemTime, u64, Option<LocalFileRecord>)>, ScanError> {
        let total = to_resolve.len() as u64;
        let completed = AtomicU64::new(0);
        let errors = AtomicUsize::new(0);
        let hasher: &dyn ContentHasher = &*self.hasher;

        let results: Vec<(PathBuf, SystemTime, u64, Option<LocalFileRecord>)> = to_resolve
            .par_iter()
            .map(|(path, mtime, size)| {
                if cancel.is_cancelled() {
                    return (path.clone(), *mtime, *size, None);
                }

                let record = match hasher.hash(path) {
                    Ok(hashed) => Some(LocalFileRecord {
                        file_name: path
                            .file_stem()
                            .map(|s| s.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        sha256: Some(hashed.sha256),
                        file_path: Some(path.to_string_lossy().into_owned()),
                        size: Some(hashed.size),
                        model_name: None,
                        base_model: None,
                        metadata_path: String::new(),
                    }),
                    Err(_) => {
                        errors.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                };

                if let Some(cb) = progress {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    cb(ScanProgressEvent::ResolveProgress {
                        completed: done,
                        total,
                        current_path: path.clone(),
                    });
                }

                (path.clone(), *mtime, *size, record)
            })
            .collect();

        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        stats.parse_or_hash_errors += errors.into_inner();
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::HashedFile;
    use std::fs;
    use tempfile::TempDir;

    /// Hasher that counts invocations, for cache-coherence assertions
    struct CountingHasher {
        inner: Sha256Hasher,
        calls: Arc<AtomicUsize>,
    }

    impl ContentHasher for CountingHasher {
        fn hash(&self, path: &Path) -> Result<HashedFile> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.hash(path)
        }
    }

    fn direct_options(db_path: &Path) -> ScanOptions {
        let mut options = ScanOptions::for_mode(ScanMode::Direct);
        options.cache_db = Some(db_path.to_path_buf());
        options
    }

    fn counting_scanner(
        root: &Path,
        db_path: &Path,
        calls: Arc<AtomicUsize>,
    ) -> InventoryScanner {
        InventoryScanner::new(root, direct_options(db_path))
            .unwrap()
            .with_hasher(Box::new(CountingHasher {
                inner: Sha256Hasher,
                calls,
            }))
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let result = InventoryScanner::new(
            &temp_dir.path().join("nope"),
            ScanOptions::for_mode(ScanMode::Direct),
        );
        assert!(matches!(result, Err(ScanError::RootUnreadable(_))));
    }

    #[test]
    fn test_file_as_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("model.safetensors");
        fs::write(&file, "bytes").unwrap();

        // Exists and stats fine, but cannot be read as a directory
        let result = InventoryScanner::new(&file, ScanOptions::for_mode(ScanMode::Direct));
        assert!(matches!(result, Err(ScanError::RootUnreadable(_))));
    }

    #[test]
    fn test_direct_scan_finds_models() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("models");
        fs::create_dir_all(root.join("loras")).unwrap();
        fs::write(root.join("base.safetensors"), "base bytes").unwrap();
        fs::write(root.join("loras/style.SAFETENSORS"), "lora bytes").unwrap();
        fs::write(root.join("readme.txt"), "not a model").unwrap();

        let db_path = temp_dir.path().join("cache.db");
        let mut scanner = InventoryScanner::new(&root, direct_options(&db_path)).unwrap();
        let outcome = scanner.scan(None, &CancelToken::new()).unwrap();

        assert_eq!(outcome.stats.files_scanned, 2);
        assert_eq!(outcome.stats.cache_misses, 2);
        assert_eq!(outcome.files.len(), 2);
        for record in &outcome.files {
            assert!(record.sha256.is_some());
            assert!(record.metadata_path.is_empty());
        }
    }

    #[test]
    fn test_cache_coherence_second_scan_never_hashes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("models");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("a.safetensors"), "aaaa").unwrap();
        fs::write(root.join("b.safetensors"), "bbbbbb").unwrap();

        let db_path = temp_dir.path().join("cache.db");
        let calls = Arc::new(AtomicUsize::new(0));

        let mut scanner = counting_scanner(&root, &db_path, calls.clone());
        let first = scanner.scan(None, &CancelToken::new()).unwrap();
        assert_eq!(first.stats.cache_misses, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        drop(scanner);

        let mut scanner = counting_scanner(&root, &db_path, calls.clone());
        let second = scanner.scan(None, &CancelToken::new()).unwrap();
        assert_eq!(second.stats.cache_hits, 2);
        assert_eq!(second.stats.cache_misses, 0);
        // Unchanged files must not reach the hasher again
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(second.files, first.files);
    }

    #[test]
    fn test_content_change_forces_rehash() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("models");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("a.safetensors"), "version one").unwrap();

        let db_path = temp_dir.path().join("cache.db");
        let calls = Arc::new(AtomicUsize::new(0));

        let mut scanner = counting_scanner(&root, &db_path, calls.clone());
        scanner.scan(None, &CancelToken::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        drop(scanner);

        fs::write(root.join("a.safetensors"), "version two, longer").unwrap();

        let mut scanner = counting_scanner(&root, &db_path, calls.clone());
        let outcome = scanner.scan(None, &CancelToken::new()).unwrap();
        assert_eq!(outcome.stats.cache_misses, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_force_rescan_ignores_cache() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("models");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("a.safetensors"), "aaaa").unwrap();

        let db_path = temp_dir.path().join("cache.db");
        let calls = Arc::new(AtomicUsize::new(0));

        let mut scanner = counting_scanner(&root, &db_path, calls.clone());
        scanner.scan(None, &CancelToken::new()).unwrap();
        drop(scanner);

        let mut options = direct_options(&db_path);
        options.force_rescan = true;
        let mut scanner = InventoryScanner::new(&root, options)
            .unwrap()
            .with_hasher(Box::new(CountingHasher {
                inner: Sha256Hasher,
                calls: calls.clone(),
            }));
        let outcome = scanner.scan(None, &CancelToken::new()).unwrap();

        assert_eq!(outcome.stats.cache_hits, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_prune_removes_deleted_files_from_cache() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("models");
        fs::create_dir_all(&root).unwrap();
        let keep = root.join("keep.safetensors");
        let gone = root.join("gone.safetensors");
        fs::write(&keep, "keep").unwrap();
        fs::write(&gone, "gone").unwrap();

        let db_path = temp_dir.path().join("cache.db");
        let mut scanner = InventoryScanner::new(&root, direct_options(&db_path)).unwrap();
        scanner.scan(None, &CancelToken::new()).unwrap();
        drop(scanner);

        fs::remove_file(&gone).unwrap();

        let mut scanner = InventoryScanner::new(&root, direct_options(&db_path)).unwrap();
        scanner.scan(None, &CancelToken::new()).unwrap();
        drop(scanner);

        let store = HashStore::open(&db_path, &root).unwrap();
        assert!(store.lookup(&keep).unwrap().is_some());
        assert!(store.lookup(&gone).unwrap().is_none());
    }

    #[test]
    fn test_sidecar_scan_counts_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("meta");
        fs::create_dir_all(&root).unwrap();
        fs::write(
            root.join("good.json"),
            r#"{"file_name": "lora", "sha256": "aa11"}"#,
        )
        .unwrap();
        fs::write(root.join("broken.json"), "{not json").unwrap();
        fs::write(root.join("empty.json"), r#"{"size": 3}"#).unwrap();

        let mut options = ScanOptions::for_mode(ScanMode::Sidecar);
        options.cache_db = Some(temp_dir.path().join("cache.db"));
        let mut scanner = InventoryScanner::new(&root, options).unwrap();
        let outcome = scanner.scan(None, &CancelToken::new()).unwrap();

        assert_eq!(outcome.stats.files_scanned, 3);
        assert_eq!(outcome.stats.parse_or_hash_errors, 2);
        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.files[0].file_name, "lora");
    }

    #[test]
    fn test_failed_sidecar_is_not_reparsed_when_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("meta");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("broken.json"), "{not json").unwrap();

        let mut options = ScanOptions::for_mode(ScanMode::Sidecar);
        options.cache_db = Some(temp_dir.path().join("cache.db"));

        let mut scanner = InventoryScanner::new(&root, options.clone()).unwrap();
        let first = scanner.scan(None, &CancelToken::new()).unwrap();
        assert_eq!(first.stats.parse_or_hash_errors, 1);
        drop(scanner);

        // The failure marker is a valid hit; no second parse attempt
        let mut scanner = InventoryScanner::new(&root, options).unwrap();
        let second = scanner.scan(None, &CancelToken::new()).unwrap();
        assert_eq!(second.stats.cache_hits, 1);
        assert_eq!(second.stats.parse_or_hash_errors, 0);
        assert!(second.files.is_empty());
    }

    #[test]
    fn test_cancelled_token_aborts_scan() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("models");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("a.safetensors"), "aaaa").unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();

        let db_path = temp_dir.path().join("cache.db");
        let mut scanner = InventoryScanner::new(&root, direct_options(&db_path)).unwrap();
        let result = scanner.scan(None, &cancel);
        assert!(matches!(result, Err(ScanError::Cancelled)));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_terminates() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("models");
        let nested = root.join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join("a.safetensors"), "aaaa").unwrap();
        std::os::unix::fs::symlink(&root, nested.join("loop")).unwrap();

        let db_path = temp_dir.path().join("cache.db");
        let mut scanner = InventoryScanner::new(&root, direct_options(&db_path)).unwrap();
        let outcome = scanner.scan(None, &CancelToken::new()).unwrap();

        // The cycle is not descended into, so the file is seen exactly once
        assert_eq!(outcome.stats.files_scanned, 1);
    }

    #[test]
    fn test_progress_events_cover_all_misses() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("models");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("a.safetensors"), "aaaa").unwrap();
        fs::write(root.join("b.safetensors"), "bbbb").unwrap();

        let resolved = Arc::new(AtomicUsize::new(0));
        let resolved_cb = resolved.clone();
        let progress = move |event: ScanProgressEvent| {
            if matches!(event, ScanProgressEvent::ResolveProgress { .. }) {
                resolved_cb.fetch_add(1, Ordering::SeqCst);
            }
        };

        let db_path = temp_dir.path().join("cache.db");
        let mut scanner = InventoryScanner::new(&root, direct_options(&db_path)).unwrap();
        scanner
            .scan(Some(&progress), &CancelToken::new())
            .unwrap();

        assert_eq!(resolved.load(Ordering::SeqCst), 2);
    }
}
