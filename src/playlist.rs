//! Playlist compilation: flatten a block sequence into the newline-
//! delimited concat playlist the stream publisher consumes.
//!
//! Validation is deliberately asymmetric by block kind: a show whose path
//! is missing on disk is dropped, while an ad break is always kept even if
//! every ad file is missing (downstream relies on breaks never
//! disappearing — see DESIGN.md before changing this).

use crate::error::Result;
use crate::schedule::Block;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Escape a path for the concat directive format: a single quote becomes
/// `'\''` so the path round-trips through the quoted syntax unchanged.
pub fn escape_path(path: &str) -> String {
    path.replace('\'', "'\\''")
}

/// Check every referenced file on disk.
///
/// Returns `(missing_paths, filtered_blocks)`:
/// - Show with a set-but-missing path: reported and dropped.
/// - Show with no path: nothing to validate, kept.
/// - AdBreak: missing ad paths reported, block always kept.
pub fn validate_blocks(blocks: Vec<Block>) -> (Vec<String>, Vec<Block>) {
    let mut missing = Vec::new();
    let mut filtered = Vec::new();

    for block in blocks {
        match &block {
            Block::Show(show) => {
                if let Some(path) = &show.file_path {
                    if !Path::new(path).exists() {
                        warn!(path = %path, title = %show.title, "media file not found");
                        missing.push(path.clone());
                        continue;
                    }
                }
                filtered.push(block);
            }
            Block::AdBreak(ab) => {
                for ad in &ab.ads {
                    if !ad.file_path.exists() {
                        missing.push(ad.file_path.display().to_string());
                    }
                }
                filtered.push(block);
            }
        }
    }

    (missing, filtered)
}

/// Render blocks as concat directives, one `file '<path>'` line per
/// existing file reference, ending with a trailing newline.
pub fn to_concat(blocks: &[Block]) -> String {
    let mut lines = Vec::new();

    for block in blocks {
        match block {
            Block::Show(show) => {
                if let Some(path) = &show.file_path {
                    lines.push(format!("file '{}'", escape_path(path)));
                }
            }
            Block::AdBreak(ab) => {
                for ad in &ab.ads {
                    lines.push(format!(
                        "file '{}'",
                        escape_path(&ad.file_path.to_string_lossy())
                    ));
                }
            }
        }
    }

    lines.join("\n") + "\n"
}

/// Validate, render and write the playlist artifact for a channel,
/// overwriting any previous generation. Missing files are warned about
/// with a sample; the partial playlist is still written.
pub fn write_playlist(
    blocks: Vec<Block>,
    channel_id: &str,
    playlists_dir: &Path,
    validate: bool,
) -> Result<PathBuf> {
    let blocks = if validate {
        let (missing, filtered) = validate_blocks(blocks);
        if !missing.is_empty() {
            let sample: Vec<&String> = missing.iter().take(5).collect();
            warn!(
                count = missing.len(),
                sample = ?sample,
                "missing media files, playlist may be incomplete"
            );
        }
        filtered
    } else {
        blocks
    };

    fs::create_dir_all(playlists_dir)?;
    let path = playlists_dir.join(format!("{channel_id}.txt"));
    let content = to_concat(&blocks);
    fs::write(&path, &content)?;
    info!(
        path = %path.display(),
        lines = content.trim_end().lines().filter(|l| !l.is_empty()).count(),
        "wrote playlist"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::AdInventoryItem;
    use crate::schedule::{AdBreakBlock, ShowBlock};
    use std::fs::File;

    fn show(title: &str, file_path: Option<String>) -> Block {
        Block::Show(ShowBlock {
            start_min: 0,
            end_min: 30,
            title: title.to_string(),
            item_id: title.to_string(),
            category: "movies".to_string(),
            file_path,
            run_minutes: 30,
        })
    }

    fn ad_break(paths: &[&Path]) -> Block {
        Block::AdBreak(AdBreakBlock {
            ads: paths
                .iter()
                .map(|p| AdInventoryItem {
                    title: "spot".to_string(),
                    file_path: p.to_path_buf(),
                })
                .collect(),
        })
    }

    /// Inverse of `escape_path`, used to verify the round-trip rule.
    fn unescape_path(escaped: &str) -> String {
        escaped.replace("'\\''", "'")
    }

    #[test]
    fn escape_round_trips_quoted_paths() {
        let original = "/media/rock 'n' roll.mkv";
        let escaped = escape_path(original);
        assert_eq!(escaped, "/media/rock '\\''n'\\'' roll.mkv");
        assert_eq!(unescape_path(&escaped), original);
    }

    #[test]
    fn show_with_missing_file_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.mkv");
        File::create(&real).unwrap();

        let blocks = vec![
            show("real", Some(real.to_string_lossy().to_string())),
            show("gone", Some("/nope/gone.mkv".to_string())),
        ];
        let (missing, filtered) = validate_blocks(blocks);

        assert_eq!(missing, vec!["/nope/gone.mkv".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].as_show().unwrap().title, "real");
    }

    #[test]
    fn pathless_show_is_kept() {
        let (missing, filtered) = validate_blocks(vec![show("mystery", None)]);
        assert!(missing.is_empty());
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn ad_break_survives_even_with_all_files_missing() {
        let blocks = vec![ad_break(&[
            Path::new("/nope/a.mp4"),
            Path::new("/nope/b.mp4"),
        ])];
        let (missing, filtered) = validate_blocks(blocks);
        // Both reported, block kept regardless.
        assert_eq!(missing.len(), 2);
        assert_eq!(filtered.len(), 1);
        assert!(!filtered[0].is_show());
    }

    #[test]
    fn concat_renders_shows_and_ads_in_order() {
        let blocks = vec![
            show("a", Some("/media/a.mkv".to_string())),
            ad_break(&[Path::new("/ads/x.mp4")]),
            show("b", None),
            show("c", Some("/media/c.mkv".to_string())),
        ];
        let rendered = to_concat(&blocks);
        assert_eq!(
            rendered,
            "file '/media/a.mkv'\nfile '/ads/x.mp4'\nfile '/media/c.mkv'\n"
        );
    }

    #[test]
    fn concat_always_ends_with_newline() {
        assert!(to_concat(&[]).ends_with('\n'));
        assert!(to_concat(&[show("a", Some("/m/a.mkv".to_string()))]).ends_with('\n'));
    }

    #[test]
    fn write_playlist_overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("a.mkv");
        File::create(&media).unwrap();
        let media_path = media.to_string_lossy().to_string();

        let first = write_playlist(
            vec![show("a", Some(media_path.clone()))],
            "retro",
            dir.path(),
            true,
        )
        .unwrap();
        let second = write_playlist(vec![show("a", None)], "retro", dir.path(), true).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&second).unwrap(), "\n");
    }

    #[test]
    fn write_playlist_writes_partial_output_despite_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("keep.mkv");
        File::create(&media).unwrap();

        let blocks = vec![
            show("keep", Some(media.to_string_lossy().to_string())),
            show("gone", Some("/nope/gone.mkv".to_string())),
        ];
        let path = write_playlist(blocks, "retro", dir.path(), true).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("keep.mkv"));
        assert!(!content.contains("gone.mkv"));
    }
}
