//! Per-channel compilation pipeline: fill slots, insert ad breaks,
//! persist the schedule, compile the playlist.
//!
//! One invocation covers one channel for one day and runs to completion
//! or fails as a unit; the caller isolates failures so other channels in
//! the same process are unaffected. Rotation and cumulative-time state
//! are created fresh inside each pass.

use crate::ad_break::insert_breaks;
use crate::catalog::Catalog;
use crate::config::ChannelConfig;
use crate::error::{Error, Result};
use crate::generator::ScheduleGenerator;
use crate::inventory::AdInventoryItem;
use crate::playlist::write_playlist;
use crate::schedule::Schedule;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

/// Artifacts and counts produced by one compilation pass.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    pub schedule_path: PathBuf,
    pub playlist_path: PathBuf,
    pub show_blocks: usize,
    pub ad_breaks: usize,
}

/// Compile one channel's day under `base_dir` (which receives the
/// `schedules/` and `playlists/` artifacts).
pub fn compile_channel<C: Catalog>(
    channel: &ChannelConfig,
    catalog: &C,
    inventory: &[AdInventoryItem],
    date: NaiveDate,
    base_dir: &Path,
    rng: &mut fastrand::Rng,
    validate: bool,
) -> Result<CompileOutcome> {
    let shows = ScheduleGenerator::new(catalog, channel).generate(rng)?;
    if shows.is_empty() {
        return Err(Error::EmptySchedule(channel.id.clone()));
    }

    let slots = channel.slots()?;
    let blocks = insert_breaks(shows, &slots, inventory, &channel.ad_rotation);
    let show_blocks = blocks.iter().filter(|b| b.is_show()).count();
    let ad_breaks = blocks.len() - show_blocks;

    let schedule = Schedule {
        date,
        channel_id: channel.id.clone(),
        blocks,
    };
    let schedule_path = schedule.save(&base_dir.join("schedules"))?;
    let playlist_path = write_playlist(
        schedule.blocks,
        &channel.id,
        &base_dir.join("playlists"),
        validate,
    )?;

    info!(
        channel = %channel.id,
        %date,
        show_blocks,
        ad_breaks,
        "compiled channel schedule"
    );
    Ok(CompileOutcome {
        schedule_path,
        playlist_path,
        show_blocks,
        ad_breaks,
    })
}
