//! Channel configuration: loading, validation, defaults.
//!
//! Configuration is a single JSON document with `channels`, `media_server`
//! and `ads` sections. Structural problems (missing fields, malformed time
//! ranges) are fatal at load time so that no channel starts from a half
//! valid config.

use crate::error::{Error, Result};
use crate::timeutil::parse_time_range;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Ad-break frequency applied when a slot does not set its own.
pub const DEFAULT_AD_FREQUENCY_SECS: u32 = 900;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub channels: Vec<ChannelConfig>,
    pub media_server: MediaServerConfig,
    pub ads: AdsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaServerConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub id: String,
    pub name: String,
    /// Ordered slot list covering the channel's day.
    pub schedule: Vec<SlotEntry>,
    #[serde(default)]
    pub ad_rotation: AdRotation,
}

impl ChannelConfig {
    /// Parse the raw slot entries into minute-offset slot windows.
    pub fn slots(&self) -> Result<Vec<SlotConfig>> {
        self.schedule.iter().map(SlotEntry::parse).collect()
    }
}

/// A slot as written in the config file ("time" is "HH:MM-HH:MM").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotEntry {
    pub time: String,
    pub category: String,
    #[serde(default = "default_ad_frequency")]
    pub ad_frequency: u32,
}

fn default_ad_frequency() -> u32 {
    DEFAULT_AD_FREQUENCY_SECS
}

impl SlotEntry {
    fn parse(&self) -> Result<SlotConfig> {
        let (start_min, end_min) = parse_time_range(&self.time)?;
        if self.ad_frequency == 0 {
            return Err(Error::Config(format!(
                "slot '{}' has a zero ad_frequency",
                self.time
            )));
        }
        Ok(SlotConfig {
            start_min,
            end_min,
            category: self.category.clone(),
            ad_frequency_secs: self.ad_frequency,
        })
    }
}

/// A parsed slot window. Immutable for the whole generation pass.
/// Windows within one channel are assumed non-overlapping (caller
/// responsibility, not enforced here).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConfig {
    pub start_min: u32,
    pub end_min: u32,
    pub category: String,
    pub ad_frequency_secs: u32,
}

impl SlotConfig {
    /// Whether a minute-of-day falls inside this window.
    pub fn contains(&self, minute: u32) -> bool {
        self.start_min <= minute && minute < self.end_min
    }
}

/// How ads are picked for each break.
///
/// Only round-robin is implemented; `weighted` is accepted in config but
/// falls back to round-robin with a warning at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationStrategy {
    RoundRobin,
    Weighted,
}

impl Default for RotationStrategy {
    fn default() -> Self {
        RotationStrategy::RoundRobin
    }
}

impl fmt::Display for RotationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationStrategy::RoundRobin => write!(f, "round-robin"),
            RotationStrategy::Weighted => write!(f, "weighted"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdRotation {
    #[serde(default)]
    pub strategy: RotationStrategy,
    #[serde(default = "default_ads_per_break")]
    pub ads_per_break: usize,
}

fn default_ads_per_break() -> usize {
    2
}

impl Default for AdRotation {
    fn default() -> Self {
        AdRotation {
            strategy: RotationStrategy::RoundRobin,
            ads_per_break: default_ads_per_break(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdsConfig {
    #[serde(default = "default_ads_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

fn default_ads_dir() -> PathBuf {
    PathBuf::from("/ads")
}

fn default_formats() -> Vec<String> {
    vec![".mp4".to_string(), ".mkv".to_string()]
}

impl Config {
    /// Load and validate config from a JSON file, applying env overrides
    /// (`MEDIA_SERVER_URL`, `MEDIA_SERVER_API_KEY`).
    pub fn load(path: &Path) -> Result<Config> {
        let data = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read '{}': {}", path.display(), e)))?;
        let mut config: Config = serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("malformed '{}': {}", path.display(), e)))?;

        if let Ok(url) = env::var("MEDIA_SERVER_URL") {
            config.media_server.url = url;
        }
        if let Ok(key) = env::var("MEDIA_SERVER_API_KEY") {
            config.media_server.api_key = key;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(Error::Config("no channels defined".to_string()));
        }
        for ch in &self.channels {
            if ch.id.is_empty() {
                return Err(Error::Config(format!(
                    "channel '{}' has an empty id",
                    ch.name
                )));
            }
            if ch.schedule.is_empty() {
                return Err(Error::Config(format!(
                    "channel '{}' has an empty schedule",
                    ch.id
                )));
            }
            // Surfaces malformed time ranges with the offending value.
            ch.slots()?;
        }
        Ok(())
    }

    /// Look up a channel by id.
    pub fn channel(&self, id: &str) -> Result<&ChannelConfig> {
        self.channels
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::UnknownChannel(id.to_string()))
    }
}

/// Base directory for config, schedules and playlists:
/// `CONFIG_DIR` env var, else the per-user config dir, else the cwd.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = env::var("CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|d| d.join("telecast"))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_json() -> String {
        r#"{
            "channels": [
                {
                    "id": "retro",
                    "name": "Retro TV",
                    "schedule": [
                        {"time": "06:00-12:00", "category": "kids", "ad_frequency": 600},
                        {"time": "12:00-24:00", "category": "movies"}
                    ]
                }
            ],
            "media_server": {"url": "http://media:8096", "api_key": "k"},
            "ads": {"directory": "/tmp/ads"}
        }"#
        .to_string()
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn load_applies_defaults() {
        let f = write_config(&sample_json());
        let config = Config::load(f.path()).unwrap();

        let ch = &config.channels[0];
        assert_eq!(ch.ad_rotation.strategy, RotationStrategy::RoundRobin);
        assert_eq!(ch.ad_rotation.ads_per_break, 2);
        assert_eq!(config.ads.formats, vec![".mp4", ".mkv"]);

        let slots = ch.slots().unwrap();
        assert_eq!(slots[0].start_min, 360);
        assert_eq!(slots[0].end_min, 720);
        assert_eq!(slots[0].ad_frequency_secs, 600);
        assert_eq!(slots[1].ad_frequency_secs, DEFAULT_AD_FREQUENCY_SECS);
    }

    #[test]
    fn load_rejects_malformed_time_range() {
        let bad = sample_json().replace("06:00-12:00", "late-morning");
        let f = write_config(&bad);
        let err = Config::load(f.path()).unwrap_err();
        // The offending value must appear in the error.
        assert!(err.to_string().contains("late-morning"));
    }

    #[test]
    fn load_rejects_zero_ad_frequency() {
        // Zero would divide-by-zero in the break-boundary arithmetic, so
        // it must never get past load.
        let bad = sample_json().replace("\"ad_frequency\": 600", "\"ad_frequency\": 0");
        let f = write_config(&bad);
        let err = Config::load(f.path()).unwrap_err();
        assert!(err.to_string().contains("zero ad_frequency"));
        assert!(err.to_string().contains("06:00-12:00"));
    }

    #[test]
    fn load_rejects_missing_channels() {
        let f = write_config(
            r#"{"channels": [], "media_server": {"url": "http://x"}, "ads": {}}"#,
        );
        assert!(Config::load(f.path()).is_err());
    }

    #[test]
    fn load_rejects_missing_file() {
        assert!(Config::load(Path::new("/definitely/not/here.json")).is_err());
    }

    #[test]
    fn channel_lookup() {
        let f = write_config(&sample_json());
        let config = Config::load(f.path()).unwrap();
        assert!(config.channel("retro").is_ok());
        assert!(matches!(
            config.channel("ghost"),
            Err(Error::UnknownChannel(_))
        ));
    }

    #[test]
    fn slot_contains_is_half_open() {
        let slot = SlotConfig {
            start_min: 360,
            end_min: 480,
            category: "kids".into(),
            ad_frequency_secs: 900,
        };
        assert!(slot.contains(360));
        assert!(slot.contains(479));
        assert!(!slot.contains(480));
        assert!(!slot.contains(0));
    }

    #[test]
    fn rotation_strategy_parses_kebab_case() {
        let rr: RotationStrategy = serde_json::from_str("\"round-robin\"").unwrap();
        assert_eq!(rr, RotationStrategy::RoundRobin);
        let w: RotationStrategy = serde_json::from_str("\"weighted\"").unwrap();
        assert_eq!(w, RotationStrategy::Weighted);
        assert!(serde_json::from_str::<RotationStrategy>("\"bogus\"").is_err());
    }
}
