//! Ad-break insertion.
//!
//! Walks a day's show blocks and injects ad breaks whenever the cumulative
//! content time crosses a multiple of the governing slot's frequency. The
//! counter measures content seconds only: ad breaks themselves add nothing
//! to it, so break spacing tracks content time rather than stream time.
//! Both the counter and the rotation cursor live inside one `insert_breaks`
//! call; each channel/day starts from zero.

use crate::config::{AdRotation, RotationStrategy, SlotConfig, DEFAULT_AD_FREQUENCY_SECS};
use crate::inventory::AdInventoryItem;
use crate::schedule::{AdBreakBlock, Block, ShowBlock};
use tracing::warn;

/// Frequency governing a block that starts at `start_min`. Pure linear
/// scan over the slot windows; unmatched blocks get the default.
pub fn slot_frequency(start_min: u32, slots: &[SlotConfig]) -> u32 {
    slots
        .iter()
        .find(|s| s.contains(start_min))
        .map(|s| s.ad_frequency_secs)
        .unwrap_or(DEFAULT_AD_FREQUENCY_SECS)
}

/// Select `count` ads starting at `cursor`, wrapping at the inventory end.
fn round_robin(inventory: &[AdInventoryItem], count: usize, cursor: usize) -> Vec<AdInventoryItem> {
    if inventory.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|i| inventory[(cursor + i) % inventory.len()].clone())
        .collect()
}

/// Interleave ad breaks into a day's show blocks.
///
/// With an empty inventory this is a no-op: the shows pass through with no
/// fabricated breaks. The `weighted` strategy is accepted but not
/// implemented; it falls back to round-robin with a warning.
pub fn insert_breaks(
    shows: Vec<ShowBlock>,
    slots: &[SlotConfig],
    inventory: &[AdInventoryItem],
    rotation: &AdRotation,
) -> Vec<Block> {
    if inventory.is_empty() {
        return shows.into_iter().map(Block::Show).collect();
    }

    if rotation.strategy != RotationStrategy::RoundRobin {
        warn!(
            strategy = %rotation.strategy,
            "rotation strategy not implemented, falling back to round-robin"
        );
    }

    let ads_per_break = rotation.ads_per_break;
    let mut result = Vec::with_capacity(shows.len());
    let mut cumulative_secs: u64 = 0;
    let mut cursor: usize = 0;

    for show in shows {
        let frequency = u64::from(slot_frequency(show.start_min, slots));
        let block_secs = show.run_seconds();

        // One break per frequency boundary this block carries us across,
        // placed before the block. The block's own slot frequency governs
        // the boundary check.
        let before = cumulative_secs / frequency;
        let after = (cumulative_secs + block_secs) / frequency;
        for _ in before..after {
            let ads = round_robin(inventory, ads_per_break, cursor);
            cursor += ads_per_break;
            if !ads.is_empty() {
                result.push(Block::AdBreak(AdBreakBlock { ads }));
            }
        }

        cumulative_secs += block_secs;
        result.push(Block::Show(show));
    }

    result
}
