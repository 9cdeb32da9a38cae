//! # Path Resolution Module
//!
//! Centralizza la logica di calcolo dei path di output: stessa directory,
//! stesso nome base, estensione sostituita.

use crate::error::ConvertError;
use std::path::{Path, PathBuf};

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Calcola il path di output: `dir/stem.<target_extension>`
    pub fn target_path(input_path: &Path, target_extension: &str) -> Result<PathBuf, ConvertError> {
        let file_stem = input_path.file_stem().ok_or_else(|| {
            ConvertError::Validation(format!("Invalid file name: {}", input_path.display()))
        })?;

        let mut filename = file_stem.to_os_string();
        filename.push(".");
        filename.push(target_extension);

        Ok(input_path.with_file_name(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_path_same_directory() {
        let target = PathResolver::target_path(Path::new("/photos/2023/IMG_001.JPG"), "webp").unwrap();
        assert_eq!(target, PathBuf::from("/photos/2023/IMG_001.webp"));
    }

    #[test]
    fn test_target_path_keeps_inner_dots() {
        let target = PathResolver::target_path(Path::new("/a/logo.v2.final.png"), "webp").unwrap();
        assert_eq!(target, PathBuf::from("/a/logo.v2.final.webp"));
    }

    #[test]
    fn test_target_path_without_name_fails() {
        assert!(PathResolver::target_path(Path::new("/"), "webp").is_err());
    }
}
