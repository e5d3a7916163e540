//! Core record types shared between the scanner and the reconciliation engine

use serde::{Deserialize, Serialize};

/// Outcome of reconciling one remote file against the local inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Content hash matches a local file
    Match,
    /// Same name locally but content hash differs
    Mismatch,
    /// File exists remotely but not locally
    MissingLocal,
    /// File exists locally but not in the remote manifest
    MissingRemote,
    /// Name matches but a hash is missing on one side, so content is unverified
    NameMatchOnly,
}

/// A file as described by the remote repository manifest
///
/// Immutable once fetched; one instance per manifest entry per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFileRecord {
    /// Full path within the repository (e.g. "loras/style.safetensors")
    pub path: String,
    /// Lowercase hex sha256, present for LFS-backed files
    pub sha256: Option<String>,
    pub size: Option<u64>,
    /// Whether the file is stored via LFS (only LFS entries carry a sha256)
    pub lfs: bool,
}

impl RemoteFileRecord {
    /// Filename without any repository subdirectory
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A file discovered locally, either by hashing it directly or by parsing
/// a sidecar metadata JSON next to it
///
/// Records are values: every rescan produces fresh ones. Only the cache entry
/// backing a record survives across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFileRecord {
    /// Display name (file name from the sidecar, or the file stem)
    pub file_name: String,
    /// Lowercase hex sha256, when known
    pub sha256: Option<String>,
    /// Absolute path of the asset itself; sidecars do not always record it
    pub file_path: Option<String>,
    pub size: Option<u64>,
    pub model_name: Option<String>,
    pub base_model: Option<String>,
    /// Path of the sidecar this record came from; empty when hashed directly
    pub metadata_path: String,
}

impl LocalFileRecord {
    /// Filename for name-based matching: the asset path's last component,
    /// falling back to the display name
    pub fn basename(&self) -> String {
        match &self.file_path {
            Some(p) => {
                let normalized = p.replace('\\', "/");
                normalized
                    .rsplit('/')
                    .next()
                    .unwrap_or(normalized.as_str())
                    .to_string()
            }
            None => self.file_name.clone(),
        }
    }

    /// Stable key identifying this record within one scan
    pub fn identity(&self) -> &str {
        if !self.metadata_path.is_empty() {
            &self.metadata_path
        } else {
            self.file_path.as_deref().unwrap_or(&self.file_name)
        }
    }
}

/// Result of classifying a single remote file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub file_name: String,
    pub status: MatchStatus,
    pub local_sha256: Option<String>,
    pub remote_sha256: Option<String>,
    pub local_path: Option<String>,
    pub remote_path: Option<String>,
    pub local_size: Option<u64>,
    pub remote_size: Option<u64>,
    /// Direct download link (resolve URL), set when the file must be fetched
    pub download_url: Option<String>,
    /// Page view link (blob URL)
    pub view_url: Option<String>,
    pub notes: String,
}

impl MatchResult {
    pub fn new(file_name: impl Into<String>, status: MatchStatus) -> Self {
        Self {
            file_name: file_name.into(),
            status,
            local_sha256: None,
            remote_sha256: None,
            local_path: None,
            remote_path: None,
            local_size: None,
            remote_size: None,
            download_url: None,
            view_url: None,
            notes: String::new(),
        }
    }
}

/// All classification results for one reconciliation run, partitioned by
/// status. Per-bucket order follows the remote manifest's order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub total_remote_files: usize,
    pub total_local_files: usize,
    pub matches: Vec<MatchResult>,
    pub mismatches: Vec<MatchResult>,
    pub missing_local: Vec<MatchResult>,
    pub missing_remote: Vec<MatchResult>,
    pub name_matches_only: Vec<MatchResult>,
}

impl ReconciliationSummary {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn mismatch_count(&self) -> usize {
        self.mismatches.len()
    }

    pub fn missing_local_count(&self) -> usize {
        self.missing_local.len()
    }

    pub fn missing_remote_count(&self) -> usize {
        self.missing_remote.len()
    }

    pub fn name_match_only_count(&self) -> usize {
        self.name_matches_only.len()
    }
}
