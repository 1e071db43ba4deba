//! Ad inventory scanner.
//!
//! Walks the configured ads directory and builds the list of spot files
//! that the ad-break inserter rotates through. Order is plain filesystem
//! traversal order, which is not guaranteed stable across platforms; sort
//! the result if reproducible rotation across hosts matters.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A single playable ad spot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdInventoryItem {
    /// Display title (file stem).
    pub title: String,
    /// Absolute path to the media file.
    pub file_path: PathBuf,
}

/// Scan `dir` recursively for ad files with one of the given extensions.
///
/// Extensions are configured with a leading dot (".mp4") and matched
/// case-insensitively. A missing directory yields an empty inventory
/// with a warning, never an error — ad insertion is optional.
pub fn scan_inventory(dir: &Path, formats: &[String]) -> Vec<AdInventoryItem> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "ads directory does not exist");
        return Vec::new();
    }

    let wanted: Vec<String> = formats
        .iter()
        .map(|f| f.trim_start_matches('.').to_lowercase())
        .collect();

    let mut inventory = Vec::new();
    collect_files(dir, &wanted, &mut inventory);
    info!(count = inventory.len(), dir = %dir.display(), "scanned ad inventory");
    inventory
}

fn collect_files(dir: &Path, wanted: &[String], out: &mut Vec<AdInventoryItem>) {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read ads directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, wanted, out);
            continue;
        }
        let ext = match path.extension() {
            Some(e) => e.to_string_lossy().to_lowercase(),
            None => continue,
        };
        if !wanted.iter().any(|w| *w == ext) {
            continue;
        }
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        out.push(AdInventoryItem {
            title,
            file_path: path,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn missing_directory_yields_empty_inventory() {
        let inv = scan_inventory(Path::new("/nonexistent/ads"), &[".mp4".into()]);
        assert!(inv.is_empty());
    }

    #[test]
    fn scans_matching_extensions_recursively() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("cola.mp4"));
        touch(&dir.path().join("notes.txt"));
        fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested/cars.mkv"));

        let mut inv = scan_inventory(dir.path(), &[".mp4".into(), ".mkv".into()]);
        inv.sort_by(|a, b| a.title.cmp(&b.title));

        assert_eq!(inv.len(), 2);
        assert_eq!(inv[0].title, "cars");
        assert_eq!(inv[1].title, "cola");
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("SHOUTY.MP4"));

        let inv = scan_inventory(dir.path(), &[".mp4".into()]);
        assert_eq!(inv.len(), 1);
        assert_eq!(inv[0].title, "SHOUTY");
    }

    #[test]
    fn formats_without_leading_dot_also_match() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("promo.webm"));

        let inv = scan_inventory(dir.path(), &["webm".into()]);
        assert_eq!(inv.len(), 1);
    }
}
