//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei file e le utilità sui file.
//!
//! ## Responsabilità:
//! - Enumerazione ricorsiva di tutti i file sotto una directory radice
//! - Limite configurabile di listing di directory concorrenti
//! - Protezione dai cicli tramite identità delle directory (device + inode)
//! - Utilità per dimensioni file e formattazione human-readable
//!
//! ## Strategia di enumerazione:
//! - Coda FIFO di directory da visitare (nessuna ricorsione)
//! - Al massimo `concurrency` listing in volo con `FuturesUnordered`
//! - I symlink non vengono seguiti: ogni entry non-directory è un file
//! - Un errore di listing su qualunque directory fa fallire l'intera enumerazione
//! - Il risultato viene restituito solo a traversal completo, ordinato per path
//!
//! ## Esempio:
//! ```ignore
//! let files = FileManager::enumerate(Path::new("/path/to/project"), 16).await?;
//! for file in files {
//!     // process file
//! }
//! ```

use crate::error::ConvertError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashSet, VecDeque};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

#[cfg(unix)]
type DirectoryId = (u64, u64);

#[cfg(not(unix))]
type DirectoryId = PathBuf;

/// Result of listing a single directory
struct DirectoryListing {
    id: DirectoryId,
    path: PathBuf,
    subdirectories: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Enumerate every non-directory entry reachable from `root`.
    ///
    /// Fails as soon as any directory, the root included, cannot be listed.
    pub async fn enumerate(root: &Path, concurrency: usize) -> Result<Vec<PathBuf>, ConvertError> {
        let root = fs::canonicalize(root)
            .await
            .map_err(|e| ConvertError::enumeration(root, e))?;
        let concurrency = concurrency.max(1);

        let mut pending = VecDeque::from([root]);
        let mut in_flight = FuturesUnordered::new();
        let mut visited: HashSet<DirectoryId> = HashSet::new();
        let mut files = Vec::new();

        loop {
            while in_flight.len() < concurrency {
                match pending.pop_front() {
                    Some(dir) => in_flight.push(Self::list_directory(dir)),
                    None => break,
                }
            }

            let Some(listing) = in_flight.next().await else {
                break;
            };
            let listing = listing?;

            if !visited.insert(listing.id.clone()) {
                warn!("Directory already visited, not descending again: {}", listing.path.display());
                continue;
            }

            debug!(
                "Listed {}: {} files, {} subdirectories",
                listing.path.display(),
                listing.files.len(),
                listing.subdirectories.len()
            );

            files.extend(listing.files);
            pending.extend(listing.subdirectories);
        }

        files.sort();
        Ok(files)
    }

    /// List one directory, splitting its entries into subdirectories and files
    async fn list_directory(path: PathBuf) -> Result<DirectoryListing, ConvertError> {
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| ConvertError::enumeration(&path, e))?;
        let id = Self::directory_id(&path, &metadata);

        let mut entries = fs::read_dir(&path)
            .await
            .map_err(|e| ConvertError::enumeration(&path, e))?;

        let mut subdirectories = Vec::new();
        let mut files = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ConvertError::enumeration(&path, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ConvertError::enumeration(&path, e))?;

            if file_type.is_dir() {
                subdirectories.push(entry.path());
            } else {
                files.push(entry.path());
            }
        }

        Ok(DirectoryListing {
            id,
            path,
            subdirectories,
            files,
        })
    }

    #[cfg(unix)]
    fn directory_id(_path: &Path, metadata: &Metadata) -> DirectoryId {
        use std::os::unix::fs::MetadataExt;
        (metadata.dev(), metadata.ino())
    }

    #[cfg(not(unix))]
    fn directory_id(path: &Path, _metadata: &Metadata) -> DirectoryId {
        path.to_path_buf()
    }

    /// Size of a file in bytes
    pub async fn file_size(path: &Path) -> Result<u64, ConvertError> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"x").unwrap();
    }

    #[tokio::test]
    async fn test_enumerate_nested_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();

        touch(&root.join("a.png"));
        touch(&root.join("docs/readme.txt"));
        touch(&root.join("docs/img/b.jpg"));
        touch(&root.join("docs/img/deep/er/c.JPEG"));
        std::fs::create_dir_all(root.join("empty/also_empty")).unwrap();

        let files = FileManager::enumerate(&root, 2).await.unwrap();

        let mut expected = vec![
            root.join("a.png"),
            root.join("docs/readme.txt"),
            root.join("docs/img/b.jpg"),
            root.join("docs/img/deep/er/c.JPEG"),
        ];
        expected.sort();
        assert_eq!(files, expected);
        assert!(files.iter().all(|f| f.is_absolute()));
    }

    #[tokio::test]
    async fn test_enumerate_empty_tree() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("a/b/c")).unwrap();

        let files = FileManager::enumerate(temp_dir.path(), 16).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_enumerate_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        let result = FileManager::enumerate(&missing, 4).await;
        assert!(matches!(result, Err(ConvertError::Enumeration { .. })));
    }

    #[tokio::test]
    async fn test_enumerate_file_as_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain.txt");
        touch(&file);

        let result = FileManager::enumerate(&file, 4).await;
        assert!(matches!(result, Err(ConvertError::Enumeration { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_enumerate_does_not_follow_symlink_cycles() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        touch(&root.join("sub/photo.png"));
        std::os::unix::fs::symlink(&root, root.join("sub/loop")).unwrap();

        let files = FileManager::enumerate(&root, 4).await.unwrap();

        assert_eq!(files, vec![root.join("sub/loop"), root.join("sub/photo.png")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_enumerate_unreadable_subdirectory_fails() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = temp_dir.path().join("locked");
        touch(&locked.join("secret.png"));
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits, nothing to assert in that case
        let readable = std::fs::read_dir(&locked).is_ok();
        let result = FileManager::enumerate(temp_dir.path(), 4).await;

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert!(matches!(result, Err(ConvertError::Enumeration { .. })));
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(2048), "2.00 KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_calculate_reduction() {
        assert_eq!(FileManager::calculate_reduction(0, 10), 0.0);
        assert_eq!(FileManager::calculate_reduction(200, 50), 75.0);
    }
}
