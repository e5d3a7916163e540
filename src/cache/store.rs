//! SQLite-backed hash cache, one database per scan root

use crate::cache::entry::{system_time_to_secs_nsecs, CacheEntry};
use crate::records::LocalFileRecord;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const SCHEMA_VERSION: i32 = 1;

/// Persistent cache of resolved local file records keyed by absolute path
///
/// Bound to a single scan root at open time. If the persisted state was
/// written for a different root or an older schema, it is purged before use;
/// a cache is never partially reused across roots.
pub struct HashStore {
    db: Connection,
    db_path: PathBuf,
}

impl HashStore {
    /// Open the cache for a scan root at the default per-root database path
    pub fn for_root(root: &Path) -> Result<Self> {
        let db_path = default_db_path(root)?;
        Self::open(&db_path, root)
    }

    /// Open a cache database bound to `scope`
    pub fn open(db_path: &Path, scope: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        match Self::try_open(db_path, scope) {
            Ok(store) => Ok(store),
            // A corrupt database must never fail a scan: back it up,
            // recreate, and start from an empty cache
            Err(e) => {
                eprintln!(
                    "Warning: Failed to open cache database: {}. Attempting recovery...",
                    e
                );

                let backup_path = db_path.with_extension("db.backup");
                let _ = std::fs::copy(db_path, &backup_path);
                let _ = std::fs::remove_file(db_path);

                Self::try_open(db_path, scope)
                    .with_context(|| "Failed to recreate cache database after recovery")
            }
        }
    }

    fn try_open(db_path: &Path, scope: &Path) -> Result<Self> {
        let db = open_connection(db_path)?;
        let mut store = Self {
            db,
            db_path: db_path.to_path_buf(),
        };
        store.init_schema(scope)?;
        Ok(store)
    }

    /// Create tables if missing, then purge everything if the recorded schema
    /// version or bound scope does not match
    fn init_schema(&mut self, scope: &Path) -> Result<()> {
        let tx = self
            .db
            .transaction()
            .with_context(|| "Failed to start schema transaction")?;

        tx.execute(
            "CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .with_context(|| "Failed to create meta table")?;

        tx.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                path TEXT PRIMARY KEY,
                mtime_secs INTEGER NOT NULL,
                mtime_nsecs INTEGER NOT NULL,
                size INTEGER NOT NULL,
                record TEXT,
                updated_at INTEGER NOT NULL
            )",
            [],
        )
        .with_context(|| "Failed to create entries table")?;

        let stored_version: Option<i32> = tx
            .query_row("SELECT value FROM meta WHERE key = 'schema_version'", [], |row| {
                row.get::<_, String>(0)
            })
            .optional()?
            .and_then(|v| v.parse().ok());

        let stored_scope: Option<String> = tx
            .query_row("SELECT value FROM meta WHERE key = 'scope'", [], |row| {
                row.get(0)
            })
            .optional()?;

        let scope_str = normalize_path(scope);
        let stale = stored_version != Some(SCHEMA_VERSION)
            || stored_scope.as_deref() != Some(scope_str.as_str());

        if stale {
            tx.execute("DELETE FROM entries", [])?;
            tx.execute("DELETE FROM meta", [])?;
            tx.execute(
                "INSERT INTO meta (key, value) VALUES ('schema_version', ?1)",
                [SCHEMA_VERSION.to_string()],
            )?;
            tx.execute(
                "INSERT INTO meta (key, value) VALUES ('scope', ?1)",
                [scope_str],
            )?;
            tx.execute(
                "INSERT INTO meta (key, value) VALUES ('created_at', ?1)",
                [chrono::Utc::now().to_rfc3339()],
            )?;
        }

        tx.commit()
            .with_context(|| "Failed to commit schema transaction")?;
        Ok(())
    }

    /// Look up the cached entry for a path. O(1) via the primary key.
    ///
    /// An unreadable row is reported as a miss, not an error the caller has
    /// to distinguish.
    pub fn lookup(&self, path: &Path) -> Result<Option<CacheEntry>> {
        let path_str = normalize_path(path);

        let row: Option<(i64, i64, u64, Option<String>)> = self
            .db
            .query_row(
                "SELECT mtime_secs, mtime_nsecs, size, record FROM entries WHERE path = ?1",
                [&path_str],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .with_context(|| format!("Failed to read cache entry: {}", path_str))?;

        let Some((mtime_secs, mtime_nsecs, size, record_json)) = row else {
            return Ok(None);
        };

        let record = match record_json {
            Some(json) => match serde_json::from_str::<LocalFileRecord>(&json) {
                Ok(rec) => Some(rec),
                // Undeserializable payload: treat the whole entry as absent
                Err(_) => return Ok(None),
            },
            None => None,
        };

        Ok(Some(CacheEntry {
            mtime_secs,
            mtime_nsecs,
            size,
            record,
        }))
    }

    /// Insert or overwrite the entry for a path
    pub fn upsert(
        &mut self,
        path: &Path,
        mtime: SystemTime,
        size: u64,
        record: Option<&LocalFileRecord>,
    ) -> Result<()> {
        let tx = self
            .db
            .transaction()
            .with_context(|| "Failed to start upsert transaction")?;
        upsert_in(&tx, path, mtime, size, record)?;
        tx.commit().with_context(|| "Failed to commit upsert")?;
        Ok(())
    }

    /// Write a batch of entries in one transaction (partial-write safety for
    /// the results of a parallel hashing pass)
    pub fn upsert_batch(
        &mut self,
        items: &[(PathBuf, SystemTime, u64, Option<LocalFileRecord>)],
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let tx = self
            .db
            .transaction()
            .with_context(|| "Failed to start batch transaction")?;
        for (path, mtime, size, record) in items {
            upsert_in(&tx, path, *mtime, *size, record.as_ref())?;
        }
        tx.commit().with_context(|| "Failed to commit batch")?;
        Ok(())
    }

    /// Delete every entry whose path is not in `live`
    ///
    /// Called once per scan after discovery, so entries for deleted or moved
    /// files do not accumulate. Returns the number of pruned entries.
    pub fn prune_except(&mut self, live: &HashSet<PathBuf>) -> Result<usize> {
        let live_strs: HashSet<String> = live.iter().map(|p| normalize_path(p)).collect();

        let stale: Vec<String> = {
            let mut stmt = self.db.prepare("SELECT path FROM entries")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

            let mut stale = Vec::new();
            for row in rows {
                let path = row?;
                if !live_strs.contains(&path) {
                    stale.push(path);
                }
            }
            stale
        };

        if stale.is_empty() {
            return Ok(0);
        }

        let tx = self
            .db
            .transaction()
            .with_context(|| "Failed to start prune transaction")?;
        {
            let mut delete_stmt = tx.prepare("DELETE FROM entries WHERE path = ?1")?;
            for path in &stale {
                delete_stmt.execute([path])?;
            }
        }
        tx.commit().with_context(|| "Failed to commit prune")?;

        Ok(stale.len())
    }

    /// Drop all entries (forced rescan)
    pub fn clear(&mut self) -> Result<()> {
        self.db.execute("DELETE FROM entries", [])?;
        Ok(())
    }

    /// Number of entries currently persisted
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn open_connection(db_path: &Path) -> Result<Connection> {
    let db = Connection::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    // WAL allows readers while a writer is active
    db.pragma_update(None, "journal_mode", "WAL")
        .with_context(|| "Failed to enable WAL mode")?;
    db.busy_timeout(std::time::Duration::from_secs(30))
        .with_context(|| "Failed to set busy timeout")?;

    Ok(db)
}

fn upsert_in(
    tx: &rusqlite::Transaction<'_>,
    path: &Path,
    mtime: SystemTime,
    size: u64,
    record: Option<&LocalFileRecord>,
) -> Result<()> {
    let path_str = normalize_path(path);
    let (mtime_secs, mtime_nsecs) = system_time_to_secs_nsecs(mtime);
    let record_json = match record {
        Some(rec) => Some(serde_json::to_string(rec)?),
        None => None,
    };
    let now = chrono::Utc::now().timestamp();

    // SQLite INTEGER is 8 bytes; cap pathological sizes at i64::MAX
    let size_i64 = if size > i64::MAX as u64 {
        i64::MAX
    } else {
        size as i64
    };

    tx.execute(
        "INSERT INTO entries (path, mtime_secs, mtime_nsecs, size, record, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(path) DO UPDATE SET
            mtime_secs = ?2,
            mtime_nsecs = ?3,
            size = ?4,
            record = ?5,
            updated_at = ?6",
        params![path_str, mtime_secs, mtime_nsecs, size_i64, record_json, now],
    )?;

    Ok(())
}

/// Default database location for a scan root: one file per root under the
/// platform cache directory, named by a digest of the normalized root path
fn default_db_path(root: &Path) -> Result<PathBuf> {
    let cache_dir = match directories::ProjectDirs::from("", "", "repocheck") {
        Some(dirs) => dirs.cache_dir().to_path_buf(),
        None => PathBuf::from(".repocheck-cache"),
    };

    let mut hasher = Sha256::new();
    hasher.update(normalize_path(root).as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    Ok(cache_dir.join(format!("scan-{}.db", &digest[..16])))
}

/// Normalize path for consistent storage and lookup
/// On Windows, converts to lowercase for case-insensitive matching
fn normalize_path(path: &Path) -> String {
    #[cfg(windows)]
    {
        path.to_string_lossy().to_lowercase().replace('\\', "/")
    }
    #[cfg(not(windows))]
    {
        path.to_string_lossy().replace('\\', "/")
    }
}
