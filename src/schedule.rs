//! Compiled schedule model and persistence.
//!
//! A day's schedule is an ordered sequence of blocks: shows with clock
//! bounds, and ad breaks without (an ad break is a playback unit, not a
//! clock unit). Schedules are written once per channel per day and
//! superseded by the next generation, never edited in place.

use crate::error::{Error, Result};
use crate::inventory::AdInventoryItem;
use crate::timeutil::minutes_to_hms;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One unit of the compiled schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Show(ShowBlock),
    AdBreak(AdBreakBlock),
}

impl Block {
    pub fn as_show(&self) -> Option<&ShowBlock> {
        match self {
            Block::Show(s) => Some(s),
            Block::AdBreak(_) => None,
        }
    }

    pub fn is_show(&self) -> bool {
        matches!(self, Block::Show(_))
    }
}

/// A single piece of content placed on the clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowBlock {
    /// Minutes since midnight, half-open range [start_min, end_min).
    pub start_min: u32,
    pub end_min: u32,
    pub title: String,
    /// Catalog id of the source item.
    pub item_id: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Scheduled minutes, `end_min - start_min`. May be shorter than the
    /// item's nominal runtime when clipped at the slot end; the underlying
    /// media is not trimmed, downstream cuts or accepts the overrun.
    pub run_minutes: u32,
}

impl ShowBlock {
    /// Scheduled content seconds.
    pub fn run_seconds(&self) -> u64 {
        u64::from(self.run_minutes) * 60
    }

    /// "HH:MM:SS" presentation of the start bound.
    pub fn start_time(&self) -> String {
        minutes_to_hms(self.start_min)
    }

    /// "HH:MM:SS" presentation of the end bound (may be "24:00:00").
    pub fn end_time(&self) -> String {
        minutes_to_hms(self.end_min)
    }
}

/// A break of one or more ads. Contributes nothing to the cumulative
/// content-time counter and carries no clock bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdBreakBlock {
    pub ads: Vec<AdInventoryItem>,
}

/// A channel's compiled day, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub date: NaiveDate,
    pub channel_id: String,
    pub blocks: Vec<Block>,
}

impl Schedule {
    /// Artifact path for a `(channel, date)` pair.
    pub fn path_for(schedules_dir: &Path, channel_id: &str, date: NaiveDate) -> PathBuf {
        schedules_dir.join(format!("{}_{}.json", channel_id, date))
    }

    /// Persist as pretty JSON, creating the directory as needed.
    pub fn save(&self, schedules_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(schedules_dir)?;
        let path = Self::path_for(schedules_dir, &self.channel_id, self.date);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        info!(path = %path.display(), blocks = self.blocks.len(), "saved schedule");
        Ok(path)
    }

    /// Load a previously persisted schedule.
    pub fn load(schedules_dir: &Path, channel_id: &str, date: NaiveDate) -> Result<Schedule> {
        let path = Self::path_for(schedules_dir, channel_id, date);
        if !path.exists() {
            return Err(Error::ScheduleNotFound(path));
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(start_min: u32, end_min: u32, title: &str) -> ShowBlock {
        ShowBlock {
            start_min,
            end_min,
            title: title.to_string(),
            item_id: format!("id-{title}"),
            category: "movies".to_string(),
            file_path: Some(format!("/media/{title}.mkv")),
            run_minutes: end_min - start_min,
        }
    }

    #[test]
    fn show_block_time_display() {
        let b = show(360, 400, "a");
        assert_eq!(b.start_time(), "06:00:00");
        assert_eq!(b.end_time(), "06:40:00");
        assert_eq!(b.run_seconds(), 2400);
    }

    #[test]
    fn block_kind_tags_in_json() {
        let blocks = vec![
            Block::Show(show(0, 30, "a")),
            Block::AdBreak(AdBreakBlock { ads: vec![] }),
        ];
        let json = serde_json::to_string(&blocks).unwrap();
        assert!(json.contains("\"type\":\"show\""));
        assert!(json.contains("\"type\":\"ad_break\""));
    }

    #[test]
    fn schedule_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let schedule = Schedule {
            date,
            channel_id: "retro".to_string(),
            blocks: vec![
                Block::Show(show(360, 400, "morning")),
                Block::AdBreak(AdBreakBlock {
                    ads: vec![AdInventoryItem {
                        title: "cola".to_string(),
                        file_path: "/ads/cola.mp4".into(),
                    }],
                }),
                Block::Show(show(400, 440, "next")),
            ],
        };

        let path = schedule.save(dir.path()).unwrap();
        assert_eq!(path, Schedule::path_for(dir.path(), "retro", date));

        let loaded = Schedule::load(dir.path(), "retro", date).unwrap();
        assert_eq!(loaded.channel_id, "retro");
        assert_eq!(loaded.blocks.len(), 3);
        let first = loaded.blocks[0].as_show().unwrap();
        assert_eq!(first.title, "morning");
        assert_eq!(first.start_min, 360);
        assert!(!loaded.blocks[1].is_show());
    }

    #[test]
    fn load_missing_schedule_errors() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert!(matches!(
            Schedule::load(dir.path(), "ghost", date),
            Err(Error::ScheduleNotFound(_))
        ));
    }
}
