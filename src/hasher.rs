//! Streaming content hashing for local model files

use anyhow::{Context, Result};
use memmap2::MmapOptions;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const MEMMAP_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB
const BUFFER_SIZE: usize = 8 * 1024 * 1024; // 8MB

/// Digest and size produced by hashing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedFile {
    /// Lowercase hex sha256 of the file content
    pub sha256: String,
    pub size: u64,
}

/// Computes a content digest for a file path
///
/// Stateless; failures are per-file and must not abort a scan. The trait seam
/// exists so callers can substitute an instrumented hasher in tests.
pub trait ContentHasher: Send + Sync {
    fn hash(&self, path: &Path) -> Result<HashedFile>;
}

/// Default hasher: sha256 streamed in bounded chunks, memory-mapped for
/// large files. sha256 because that is the digest the hub's LFS manifest
/// entries carry, so local digests are directly comparable.
#[derive(Debug, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn hash(&self, path: &Path) -> Result<HashedFile> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to get metadata: {}", path.display()))?;
        let file_size = metadata.len();

        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

        // Memory map large files; the hasher still walks the mapping, the
        // whole file is never copied into an owned buffer
        if file_size >= MEMMAP_THRESHOLD {
            let mmap = unsafe {
                MmapOptions::new()
                    .map(&file)
                    .with_context(|| format!("Failed to memory map file: {}", path.display()))?
            };

            let mut hasher = Sha256::new();
            hasher.update(&mmap[..]);
            return Ok(HashedFile {
                sha256: format!("{:x}", hasher.finalize()),
                size: file_size,
            });
        }

        let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;

            if bytes_read == 0 {
                break;
            }

            hasher.update(&buffer[..bytes_read]);
        }

        Ok(HashedFile {
            sha256: format!("{:x}", hasher.finalize()),
            size: file_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hash_known_content() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.bin");
        fs::write(&file_path, "hello world").unwrap();

        let hashed = Sha256Hasher.hash(&file_path).unwrap();
        assert_eq!(
            hashed.sha256,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(hashed.size, 11);
    }

    #[test]
    fn test_hash_is_lowercase_hex() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.bin");
        fs::write(&file_path, [0u8; 4096]).unwrap();

        let hashed = Sha256Hasher.hash(&file_path).unwrap();
        assert_eq!(hashed.sha256.len(), 64);
        assert!(hashed
            .sha256
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_hash_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = Sha256Hasher.hash(&temp_dir.path().join("nope.bin"));
        assert!(result.is_err());
    }
}
