//! Reconciliation engine: classifies every remote manifest entry against the
//! local inventory
//!
//! Classification priority is a contract, not an implementation detail:
//! a hash match beats a name match, and a name match with comparable hashes
//! beats an unverifiable one. Given identical inputs the output is
//! byte-identical; the only tie-break (several local files sharing a name)
//! resolves by stable discovery order, first candidate wins.

use crate::records::{
    LocalFileRecord, MatchResult, MatchStatus, ReconciliationSummary, RemoteFileRecord,
};
use crate::remote::RepoLocator;
use std::collections::{HashMap, HashSet};

/// Tuning knobs for one reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub match_by_hash: bool,
    pub match_by_name: bool,
    /// Also report local files absent from the manifest (off by default)
    pub report_missing_remote: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            match_by_hash: true,
            match_by_name: true,
            report_missing_remote: false,
        }
    }
}

/// Borrows the local inventory and remote manifest read-only; owns nothing
/// but the summary it produces
pub struct Reconciler<'a> {
    local_files: &'a [LocalFileRecord],
    remote_files: &'a [RemoteFileRecord],
    locator: Option<&'a RepoLocator>,
    options: ReconcileOptions,
    local_by_hash: HashMap<String, &'a LocalFileRecord>,
    local_by_name: HashMap<String, Vec<&'a LocalFileRecord>>,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        local_files: &'a [LocalFileRecord],
        remote_files: &'a [RemoteFileRecord],
        locator: Option<&'a RepoLocator>,
        options: ReconcileOptions,
    ) -> Self {
        let mut reconciler = Self {
            local_files,
            remote_files,
            locator,
            options,
            local_by_hash: HashMap::new(),
            local_by_name: HashMap::new(),
        };
        reconciler.build_local_indexes();
        reconciler
    }

    /// Index the local inventory once, O(n).
    ///
    /// Hash collisions keep the first record encountered; a hash match
    /// already proves content equivalence, so which copy wins is irrelevant.
    /// Name buckets keep every candidate in discovery order.
    fn build_local_indexes(&mut self) {
        for record in self.local_files {
            if let Some(sha256) = &record.sha256 {
                self.local_by_hash
                    .entry(sha256.to_lowercase())
                    .or_insert(record);
            }

            let basename = record.basename().to_lowercase();
            self.local_by_name
                .entry(basename.clone())
                .or_default()
                .push(record);

            // Also index by stem to tolerate extension drift
            let stem = strip_extension(&basename);
            if stem != basename {
                let bucket = self.local_by_name.entry(stem).or_default();
                if !bucket
                    .iter()
                    .any(|existing| std::ptr::eq(*existing, record))
                {
                    bucket.push(record);
                }
            }
        }
    }

    /// Classify every remote file. Per-bucket order follows manifest order,
    /// so identical inputs always produce identical summaries.
    pub fn reconcile(&self) -> ReconciliationSummary {
        let mut summary = ReconciliationSummary {
            total_remote_files: self.remote_files.len(),
            total_local_files: self.local_files.len(),
            ..Default::default()
        };

        let mut matched_locals: HashSet<&str> = HashSet::new();

        for remote in self.remote_files {
            let result = self.classify(remote);

            if matches!(
                result.status,
                MatchStatus::Match | MatchStatus::Mismatch | MatchStatus::NameMatchOnly
            ) {
                if let Some(local) = self.find_local_for(remote) {
                    matched_locals.insert(local.identity());
                }
            }

            match result.status {
                MatchStatus::Match => summary.matches.push(result),
                MatchStatus::Mismatch => summary.mismatches.push(result),
                MatchStatus::MissingLocal => summary.missing_local.push(result),
                MatchStatus::NameMatchOnly => summary.name_matches_only.push(result),
                MatchStatus::MissingRemote => {}
            }
        }

        if self.options.report_missing_remote {
            for local in self.local_files {
                if matched_locals.contains(local.identity()) {
                    continue;
                }
                let mut result = MatchResult::new(local.basename(), MatchStatus::MissingRemote);
                result.local_sha256 = local.sha256.clone();
                result.local_path = local.file_path.clone();
                result.local_size = local.size;
                result.notes =
                    "File exists locally but was not found in the remote repository".to_string();
                summary.missing_remote.push(result);
            }
        }

        summary
    }

    /// Classify one remote file, first applicable rule wins:
    /// 1. hash present in the local hash index -> MATCH
    /// 2. name candidate found: comparable hashes decide MATCH/MISMATCH,
    ///    a missing hash on either side is NAME_MATCH_ONLY
    /// 3. otherwise MISSING_LOCAL
    fn classify(&self, remote: &RemoteFileRecord) -> MatchResult {
        if self.options.match_by_hash {
            if let Some(remote_hash) = &remote.sha256 {
                if let Some(local) = self.local_by_hash.get(&remote_hash.to_lowercase()).copied() {
                    let mut result = MatchResult::new(remote.basename(), MatchStatus::Match);
                    self.fill_sides(&mut result, Some(local), remote);
                    result.notes = "SHA256 match".to_string();
                    return result;
                }
            }
        }

        if self.options.match_by_name {
            if let Some(local) = self.find_by_name(remote) {
                return match (&remote.sha256, &local.sha256) {
                    (Some(remote_hash), Some(local_hash)) => {
                        if remote_hash.eq_ignore_ascii_case(local_hash) {
                            let mut result =
                                MatchResult::new(remote.basename(), MatchStatus::Match);
                            self.fill_sides(&mut result, Some(local), remote);
                            result.notes = "SHA256 match (found by name)".to_string();
                            result
                        } else {
                            let mut result =
                                MatchResult::new(remote.basename(), MatchStatus::Mismatch);
                            self.fill_sides(&mut result, Some(local), remote);
                            self.fill_urls(&mut result, remote);
                            result.notes =
                                "Filename matches but SHA256 differs - possible different version"
                                    .to_string();
                            result
                        }
                    }
                    _ => {
                        let mut result =
                            MatchResult::new(remote.basename(), MatchStatus::NameMatchOnly);
                        self.fill_sides(&mut result, Some(local), remote);
                        result.notes =
                            "Filename matches but SHA256 not available for verification"
                                .to_string();
                        result
                    }
                };
            }
        }

        let mut result = MatchResult::new(remote.basename(), MatchStatus::MissingLocal);
        self.fill_sides(&mut result, None, remote);
        self.fill_urls(&mut result, remote);
        result.notes = "File not found locally".to_string();
        result
    }

    /// Reverse lookup: the local record a remote file resolves to, if any
    pub fn find_local_for(&self, remote: &RemoteFileRecord) -> Option<&'a LocalFileRecord> {
        if self.options.match_by_hash {
            if let Some(remote_hash) = &remote.sha256 {
                if let Some(local) = self.local_by_hash.get(&remote_hash.to_lowercase()).copied() {
                    return Some(local);
                }
            }
        }
        if self.options.match_by_name {
            return self.find_by_name(remote);
        }
        None
    }

    /// First name candidate in discovery order: exact basename first, then
    /// the stem without extension
    fn find_by_name(&self, remote: &RemoteFileRecord) -> Option<&'a LocalFileRecord> {
        let basename = remote.basename().to_lowercase();

        if let Some(candidates) = self.local_by_name.get(&basename) {
            if let Some(first) = candidates.first().copied() {
                return Some(first);
            }
        }

        let stem = strip_extension(&basename);
        self.local_by_name
            .get(&stem)
            .and_then(|candidates| candidates.first())
            .copied()
    }

    fn fill_sides(
        &self,
        result: &mut MatchResult,
        local: Option<&LocalFileRecord>,
        remote: &RemoteFileRecord,
    ) {
        if let Some(local) = local {
            result.local_sha256 = local.sha256.clone();
            result.local_path = local.file_path.clone();
            result.local_size = local.size;
        }
        result.remote_sha256 = remote.sha256.clone();
        result.remote_path = Some(remote.path.clone());
        result.remote_size = remote.size;
    }

    fn fill_urls(&self, result: &mut MatchResult, remote: &RemoteFileRecord) {
        if let Some(locator) = self.locator {
            result.download_url = Some(locator.download_url(&remote.path));
            result.view_url = Some(locator.view_url(&remote.path));
        }
    }
}

/// Filename without its last extension, lowercase in == lowercase out
fn strip_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RepoKind;

    fn local(name: &str, path: &str, sha256: Option<&str>) -> LocalFileRecord {
        LocalFileRecord {
            file_name: name.to_string(),
            sha256: sha256.map(str::to_string),
            file_path: Some(path.to_string()),
            size: Some(100),
            model_name: None,
            base_model: None,
            metadata_path: String::new(),
        }
    }

    fn remote(path: &str, sha256: Option<&str>) -> RemoteFileRecord {
        RemoteFileRecord {
            path: path.to_string(),
            sha256: sha256.map(str::to_string),
            size: Some(100),
            lfs: sha256.is_some(),
        }
    }

    fn reconcile(
        locals: &[LocalFileRecord],
        remotes: &[RemoteFileRecord],
    ) -> ReconciliationSummary {
        Reconciler::new(locals, remotes, None, ReconcileOptions::default()).reconcile()
    }

    #[test]
    fn test_hash_match() {
        let locals = vec![local("model", "/x/model.safetensors", Some("aa11"))];
        let remotes = vec![remote("a/model.safetensors", Some("aa11"))];

        let summary = reconcile(&locals, &remotes);
        assert_eq!(summary.match_count(), 1);
        assert_eq!(summary.matches[0].status, MatchStatus::Match);
        assert_eq!(summary.matches[0].notes, "SHA256 match");
    }

    #[test]
    fn test_hash_beats_name() {
        // Same content under a different filename must still be MATCH
        let locals = vec![local("renamed", "/x/renamed-copy.safetensors", Some("aa11"))];
        let remotes = vec![remote("model.safetensors", Some("aa11"))];

        let summary = reconcile(&locals, &remotes);
        assert_eq!(summary.match_count(), 1);
        assert!(summary.name_matches_only.is_empty());
        assert!(summary.missing_local.is_empty());
    }

    #[test]
    fn test_name_match_with_differing_hash_is_mismatch() {
        let locals = vec![local("model", "/x/model.safetensors", Some("bb22"))];
        let remotes = vec![remote("a/model.safetensors", Some("aa11"))];

        let locator = RepoLocator::new("user/repo", "main", RepoKind::Model);
        let summary = Reconciler::new(&locals, &remotes, Some(&locator), ReconcileOptions::default())
            .reconcile();

        assert_eq!(summary.mismatch_count(), 1);
        let result = &summary.mismatches[0];
        assert_eq!(result.local_sha256.as_deref(), Some("bb22"));
        assert_eq!(result.remote_sha256.as_deref(), Some("aa11"));
        assert_eq!(
            result.download_url.as_deref(),
            Some("https://huggingface.co/user/repo/resolve/main/a/model.safetensors")
        );
        assert!(result.view_url.is_some());
    }

    #[test]
    fn test_hash_comparison_is_case_insensitive() {
        let locals = vec![local("model", "/x/model.safetensors", Some("AA11"))];
        let remotes = vec![remote("model.safetensors", Some("aa11"))];

        let summary = reconcile(&locals, &remotes);
        assert_eq!(summary.match_count(), 1);
    }

    #[test]
    fn test_name_match_only_when_hash_unavailable() {
        let locals = vec![local("model", "/x/model.safetensors", None)];
        let remotes = vec![remote("model.safetensors", Some("aa11"))];

        let summary = reconcile(&locals, &remotes);
        assert_eq!(summary.name_match_only_count(), 1);
        assert_eq!(
            summary.name_matches_only[0].status,
            MatchStatus::NameMatchOnly
        );
    }

    #[test]
    fn test_stem_match_tolerates_extension_drift() {
        let locals = vec![local("model", "/x/model.ckpt", None)];
        let remotes = vec![remote("model.safetensors", None)];

        let summary = reconcile(&locals, &remotes);
        assert_eq!(summary.name_match_only_count(), 1);
    }

    #[test]
    fn test_missing_local_with_urls() {
        let locals: Vec<LocalFileRecord> = Vec::new();
        let remotes = vec![remote("sub/new-model.safetensors", Some("aa11"))];

        let locator = RepoLocator::new("user/repo", "main", RepoKind::Model);
        let summary = Reconciler::new(&locals, &remotes, Some(&locator), ReconcileOptions::default())
            .reconcile();

        assert_eq!(summary.missing_local_count(), 1);
        let result = &summary.missing_local[0];
        assert!(result.local_path.is_none());
        assert!(result.local_sha256.is_none());
        assert_eq!(
            result.download_url.as_deref(),
            Some("https://huggingface.co/user/repo/resolve/main/sub/new-model.safetensors")
        );
    }

    #[test]
    fn test_missing_remote_disabled_by_default() {
        let locals = vec![local("extra", "/x/extra.safetensors", Some("cc33"))];
        let remotes: Vec<RemoteFileRecord> = Vec::new();

        let summary = reconcile(&locals, &remotes);
        assert!(summary.missing_remote.is_empty());
    }

    #[test]
    fn test_missing_remote_sweep_when_enabled() {
        let locals = vec![
            local("matched", "/x/matched.safetensors", Some("aa11")),
            local("extra", "/x/extra.safetensors", Some("cc33")),
        ];
        let remotes = vec![remote("matched.safetensors", Some("aa11"))];

        let options = ReconcileOptions {
            report_missing_remote: true,
            ..Default::default()
        };
        let summary = Reconciler::new(&locals, &remotes, None, options).reconcile();

        assert_eq!(summary.match_count(), 1);
        assert_eq!(summary.missing_remote_count(), 1);
        assert_eq!(summary.missing_remote[0].file_name, "extra.safetensors");
    }

    #[test]
    fn test_name_tie_break_takes_first_in_discovery_order() {
        let locals = vec![
            local("model", "/first/model.safetensors", Some("aa11")),
            local("model", "/second/model.safetensors", Some("bb22")),
        ];
        // Remote hash matches neither, so this resolves via the name index
        let remotes = vec![remote("model.safetensors", Some("ff99"))];

        let summary = reconcile(&locals, &remotes);
        assert_eq!(summary.mismatch_count(), 1);
        assert_eq!(
            summary.mismatches[0].local_path.as_deref(),
            Some("/first/model.safetensors")
        );
    }

    #[test]
    fn test_reconcile_is_deterministic() {
        let locals = vec![
            local("a", "/x/a.safetensors", Some("aa11")),
            local("b", "/x/b.safetensors", None),
            local("c", "/x/c.safetensors", Some("cc33")),
        ];
        let remotes = vec![
            remote("a.safetensors", Some("aa11")),
            remote("b.safetensors", Some("bb22")),
            remote("d.safetensors", None),
        ];

        let first = reconcile(&locals, &remotes);
        let second = reconcile(&locals, &remotes);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_bucket_order_follows_manifest_order() {
        let locals: Vec<LocalFileRecord> = Vec::new();
        let remotes = vec![
            remote("z.safetensors", None),
            remote("a.safetensors", None),
            remote("m.safetensors", None),
        ];

        let summary = reconcile(&locals, &remotes);
        let names: Vec<&str> = summary
            .missing_local
            .iter()
            .map(|r| r.file_name.as_str())
            .collect();
        assert_eq!(names, ["z.safetensors", "a.safetensors", "m.safetensors"]);
    }

    #[test]
    fn test_every_remote_is_classified() {
        let locals = vec![local("a", "/x/a.safetensors", Some("aa11"))];
        let remotes = vec![
            remote("a.safetensors", Some("aa11")),
            remote("a.safetensors", Some("zz99")),
            remote("unknown.safetensors", None),
        ];

        let summary = reconcile(&locals, &remotes);
        let classified = summary.match_count()
            + summary.mismatch_count()
            + summary.missing_local_count()
            + summary.name_match_only_count();
        assert_eq!(classified, remotes.len());
    }
}
