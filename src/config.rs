//! Persisted user configuration: which directories to scan and how

use crate::scanner::ScanMode;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_VERSION: u32 = 2;

/// One configured scan root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub path: PathBuf,
    /// Friendly name; defaults to the directory's file name
    #[serde(default)]
    pub name: String,
    pub scan_mode: ScanMode,
    pub extensions: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub added: DateTime<Utc>,
}

fn default_enabled() -> bool {
    true
}

impl DirectoryConfig {
    pub fn new(path: PathBuf, scan_mode: ScanMode) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            scan_mode,
            extensions: scan_mode.default_extensions(),
            enabled: true,
            added: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub version: u32,
    /// Scan roots in priority order: on cross-directory conflicts the first
    /// configured directory wins
    #[serde(default)]
    pub directories: Vec<DirectoryConfig>,
}

impl Config {
    /// Load from the default platform config path; a missing or unreadable
    /// file yields the default config with a warning
    pub fn load() -> Self {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| toml::from_str::<Config>(&raw).map_err(anyhow::Error::from))
        {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{} Could not load config: {}", "Warning:".yellow(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path =
            default_config_path().with_context(|| "Could not determine config directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let mut config = self.clone();
        config.version = CONFIG_VERSION;
        let raw = toml::to_string_pretty(&config)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Add or update a scan root. Re-adding an existing path updates its
    /// mode/extensions and re-enables it.
    pub fn add_directory(
        &mut self,
        path: &Path,
        scan_mode: ScanMode,
        extensions: Option<Vec<String>>,
    ) -> &DirectoryConfig {
        let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if let Some(i) = self.directories.iter().position(|d| d.path == resolved) {
            let dir = &mut self.directories[i];
            dir.scan_mode = scan_mode;
            if let Some(exts) = extensions {
                dir.extensions = exts;
            }
            dir.enabled = true;
            return &self.directories[i];
        }

        let mut dir = DirectoryConfig::new(resolved, scan_mode);
        if let Some(exts) = extensions {
            dir.extensions = exts;
        }
        self.directories.push(dir);
        self.directories.last().expect("just pushed")
    }

    /// Remove a scan root; returns whether anything was removed
    pub fn remove_directory(&mut self, path: &Path) -> bool {
        let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let before = self.directories.len();
        self.directories.retain(|d| d.path != resolved);
        self.directories.len() < before
    }

    pub fn enabled_directories(&self) -> Vec<&DirectoryConfig> {
        self.directories.iter().filter(|d| d.enabled).collect()
    }

    pub fn set_directory_enabled(&mut self, path: &Path, enabled: bool) -> bool {
        let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        for dir in &mut self.directories {
            if dir.path == resolved {
                dir.enabled = enabled;
                return true;
            }
        }
        false
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "repocheck")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
