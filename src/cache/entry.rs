//! Cache entry validity checks

use crate::records::LocalFileRecord;
use std::time::{SystemTime, UNIX_EPOCH};

/// One persisted cache record for a file path
///
/// `record` is `None` when the last resolution attempt failed (unparseable
/// sidecar, hash I/O error). The failure is remembered so an unchanged broken
/// file is not re-attempted every scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub mtime_secs: i64,
    pub mtime_nsecs: i64,
    pub size: u64,
    pub record: Option<LocalFileRecord>,
}

impl CacheEntry {
    /// A hit requires exact equality of both mtime and size against the
    /// file's current stat. Any difference, including decreases, is stale.
    pub fn is_hit(&self, mtime: SystemTime, size: u64) -> bool {
        let (secs, nsecs) = system_time_to_secs_nsecs(mtime);
        self.size == size && self.mtime_secs == secs && self.mtime_nsecs == nsecs
    }
}

/// Convert SystemTime to (seconds, nanoseconds) since the epoch
pub fn system_time_to_secs_nsecs(time: SystemTime) -> (i64, i64) {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => (duration.as_secs() as i64, duration.subsec_nanos() as i64),
        Err(_) => (0, 0), // Shouldn't happen for mtime, but handle gracefully
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry_at(mtime: SystemTime, size: u64) -> CacheEntry {
        let (secs, nsecs) = system_time_to_secs_nsecs(mtime);
        CacheEntry {
            mtime_secs: secs,
            mtime_nsecs: nsecs,
            size,
            record: None,
        }
    }

    #[test]
    fn test_hit_requires_exact_match() {
        let now = SystemTime::now();
        let entry = entry_at(now, 100);
        assert!(entry.is_hit(now, 100));
    }

    #[test]
    fn test_size_change_alone_invalidates() {
        // Same mtime, smaller size: still stale
        let now = SystemTime::now();
        let entry = entry_at(now, 100);
        assert!(!entry.is_hit(now, 99));
        assert!(!entry.is_hit(now, 101));
    }

    #[test]
    fn test_mtime_change_invalidates() {
        let now = SystemTime::now();
        let entry = entry_at(now, 100);
        assert!(!entry.is_hit(now + Duration::from_secs(1), 100));
    }
}
