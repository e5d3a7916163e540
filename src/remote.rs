//! Remote repository access: URL parsing, link building, manifest fetching
//!
//! The hub API is an external collaborator; everything here stays thin. The
//! reconciliation core only consumes the resulting `RemoteFileRecord` list.

use crate::records::RemoteFileRecord;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

const HUB_BASE: &str = "https://huggingface.co";

/// Kind of hub repository; affects URL layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoKind {
    Model,
    Dataset,
    Space,
}

impl RepoKind {
    /// Path prefix segments before the repo id ("datasets/user/repo" etc.)
    fn url_prefix(self) -> Option<&'static str> {
        match self {
            RepoKind::Model => None,
            RepoKind::Dataset => Some("datasets"),
            RepoKind::Space => Some("spaces"),
        }
    }

    /// Segment used by the tree API ("api/models/...")
    fn api_segment(self) -> &'static str {
        match self {
            RepoKind::Model => "models",
            RepoKind::Dataset => "datasets",
            RepoKind::Space => "spaces",
        }
    }
}

/// Identifies one repository revision on the hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoLocator {
    /// "user/repo"
    pub repo_id: String,
    pub revision: String,
    pub kind: RepoKind,
}

impl RepoLocator {
    pub fn new(repo_id: impl Into<String>, revision: impl Into<String>, kind: RepoKind) -> Self {
        Self {
            repo_id: repo_id.into(),
            revision: revision.into(),
            kind,
        }
    }

    /// Parse a hub URL.
    ///
    /// Accepts plain repo URLs and tree/blob URLs with a revision, for
    /// models, datasets, and spaces:
    /// `https://huggingface.co/user/repo`,
    /// `https://huggingface.co/datasets/user/repo/tree/main`, ...
    pub fn parse(url: &str) -> Result<Self> {
        let trimmed = url.trim().trim_end_matches('/');
        let rest = trimmed
            .split_once("huggingface.co/")
            .map(|(_, rest)| rest)
            .with_context(|| format!("Not a huggingface.co URL: {}", url))?;

        let mut segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

        let kind = match segments.first() {
            Some(&"datasets") => {
                segments.remove(0);
                RepoKind::Dataset
            }
            Some(&"spaces") => {
                segments.remove(0);
                RepoKind::Space
            }
            _ => RepoKind::Model,
        };

        if segments.len() < 2 {
            bail!("Could not parse repository id from URL: {}", url);
        }

        let repo_id = format!("{}/{}", segments[0], segments[1]);

        // Optional "/tree/<rev>" or "/blob/<rev>" suffix
        let revision = match (segments.get(2), segments.get(3)) {
            (Some(&"tree"), Some(rev)) | (Some(&"blob"), Some(rev)) => (*rev).to_string(),
            _ => "main".to_string(),
        };

        Ok(Self {
            repo_id,
            revision,
            kind,
        })
    }

    /// Direct download link for a file in this repository (resolve URL)
    pub fn download_url(&self, file_path: &str) -> String {
        self.file_url("resolve", file_path)
    }

    /// Page view link for a file in this repository (blob URL)
    pub fn view_url(&self, file_path: &str) -> String {
        self.file_url("blob", file_path)
    }

    fn file_url(&self, action: &str, file_path: &str) -> String {
        let mut url = Url::parse(HUB_BASE).expect("hub base URL is valid");
        {
            // extend() percent-encodes each segment while keeping slashes
            // between them intact
            let mut segments = url.path_segments_mut().expect("hub base URL has a path");
            segments.pop_if_empty();
            if let Some(prefix) = self.kind.url_prefix() {
                segments.push(prefix);
            }
            segments.extend(self.repo_id.split('/'));
            segments.push(action);
            segments.push(&self.revision);
            segments.extend(file_path.split('/'));
        }
        url.to_string()
    }

    fn tree_api_url(&self) -> String {
        let mut url = Url::parse(HUB_BASE).expect("hub base URL is valid");
        {
            let mut segments = url.path_segments_mut().expect("hub base URL has a path");
            segments.pop_if_empty();
            segments.push("api");
            segments.push(self.kind.api_segment());
            segments.extend(self.repo_id.split('/'));
            segments.push("tree");
            segments.push(&self.revision);
        }
        url.set_query(Some("recursive=true"));
        url.to_string()
    }
}

#[derive(Deserialize)]
struct TreeEntry {
    #[serde(rename = "type")]
    entry_type: String,
    path: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    lfs: Option<LfsInfo>,
}

#[derive(Deserialize)]
struct LfsInfo {
    #[serde(default)]
    oid: Option<String>,
    #[serde(default)]
    sha256: Option<String>,
}

/// Fetches the file manifest of one repository revision over the hub API
pub struct ManifestClient {
    locator: RepoLocator,
    token: Option<String>,
}

impl ManifestClient {
    pub fn new(locator: RepoLocator, token: Option<String>) -> Self {
        Self { locator, token }
    }

    /// Fetch all files in the repository tree, in the order the API returns
    /// them. LFS entries carry their sha256 oid; other entries have no
    /// usable content hash.
    pub fn fetch_manifest(&self) -> Result<Vec<RemoteFileRecord>> {
        let url = self.locator.tree_api_url();

        let mut request = ureq::get(&url).set("User-Agent", "repocheck");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        let response = request
            .call()
            .with_context(|| format!("Failed to fetch manifest for {}", self.locator.repo_id))?;

        let entries: Vec<TreeEntry> = response
            .into_json()
            .with_context(|| "Failed to parse manifest response")?;

        Ok(entries
            .into_iter()
            .filter(|entry| entry.entry_type == "file")
            .map(|entry| {
                let (lfs, sha256) = match entry.lfs {
                    Some(lfs) => {
                        let digest = lfs.sha256.or(lfs.oid);
                        (true, digest.map(|d| d.to_lowercase()))
                    }
                    None => (false, None),
                };
                RemoteFileRecord {
                    path: entry.path,
                    sha256,
                    size: entry.size,
                    lfs,
                }
            })
            .collect())
    }

    pub fn locator(&self) -> &RepoLocator {
        &self.locator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_model_url() {
        let locator = RepoLocator::parse("https://huggingface.co/K3NK/loras-WAN").unwrap();
        assert_eq!(locator.repo_id, "K3NK/loras-WAN");
        assert_eq!(locator.revision, "main");
        assert_eq!(locator.kind, RepoKind::Model);
    }

    #[test]
    fn test_parse_tree_url_with_revision() {
        let locator =
            RepoLocator::parse("https://huggingface.co/user/repo/tree/dev/").unwrap();
        assert_eq!(locator.repo_id, "user/repo");
        assert_eq!(locator.revision, "dev");
    }

    #[test]
    fn test_parse_dataset_and_space_urls() {
        let dataset =
            RepoLocator::parse("https://huggingface.co/datasets/user/repo/tree/main").unwrap();
        assert_eq!(dataset.kind, RepoKind::Dataset);
        assert_eq!(dataset.repo_id, "user/repo");

        let space = RepoLocator::parse("https://huggingface.co/spaces/user/repo").unwrap();
        assert_eq!(space.kind, RepoKind::Space);
    }

    #[test]
    fn test_parse_blob_url() {
        let locator =
            RepoLocator::parse("https://huggingface.co/user/repo/blob/v2").unwrap();
        assert_eq!(locator.revision, "v2");
    }

    #[test]
    fn test_parse_rejects_non_hub_url() {
        assert!(RepoLocator::parse("https://example.com/user/repo").is_err());
        assert!(RepoLocator::parse("https://huggingface.co/justuser").is_err());
    }

    #[test]
    fn test_download_and_view_urls() {
        let locator = RepoLocator::new("user/repo", "main", RepoKind::Model);
        assert_eq!(
            locator.download_url("loras/style.safetensors"),
            "https://huggingface.co/user/repo/resolve/main/loras/style.safetensors"
        );
        assert_eq!(
            locator.view_url("loras/style.safetensors"),
            "https://huggingface.co/user/repo/blob/main/loras/style.safetensors"
        );
    }

    #[test]
    fn test_urls_percent_encode_segments() {
        let locator = RepoLocator::new("user/repo", "main", RepoKind::Dataset);
        assert_eq!(
            locator.download_url("my file.safetensors"),
            "https://huggingface.co/datasets/user/repo/resolve/main/my%20file.safetensors"
        );
    }

    #[test]
    fn test_tree_api_url_per_kind() {
        let model = RepoLocator::new("user/repo", "main", RepoKind::Model);
        assert_eq!(
            model.tree_api_url(),
            "https://huggingface.co/api/models/user/repo/tree/main?recursive=true"
        );

        let dataset = RepoLocator::new("user/repo", "dev", RepoKind::Dataset);
        assert_eq!(
            dataset.tree_api_url(),
            "https://huggingface.co/api/datasets/user/repo/tree/dev?recursive=true"
        );
    }
}
