//! Slot filler: turns per-slot category config into a gapless sequence of
//! show blocks covering each slot's window.
//!
//! Items are shuffled once per slot (seedable rng, so tests assert
//! coverage and membership rather than exact order) and consumed
//! cyclically until the window is full. The last placement is clipped at
//! the slot end; the media itself is not trimmed.

use crate::catalog::{Catalog, CatalogItem};
use crate::config::{ChannelConfig, SlotConfig};
use crate::error::Result;
use crate::schedule::ShowBlock;
use tracing::warn;

/// Fill one slot window exactly, `[slot.start_min, slot.end_min)`.
///
/// Returns an empty sequence when there are no items; the caller logs and
/// accepts the gap rather than padding with dead air.
pub fn fill_slot(
    slot: &SlotConfig,
    items: &[CatalogItem],
    rng: &mut fastrand::Rng,
) -> Vec<ShowBlock> {
    if items.is_empty() {
        return Vec::new();
    }

    let mut pool: Vec<&CatalogItem> = items.iter().collect();
    rng.shuffle(&mut pool);

    let mut blocks = Vec::new();
    let mut current_min = slot.start_min;
    let mut index = 0usize;

    while current_min < slot.end_min {
        let item = pool[index % pool.len()];
        index += 1;

        let end_this = (current_min + item.run_minutes()).min(slot.end_min);
        blocks.push(ShowBlock {
            start_min: current_min,
            end_min: end_this,
            title: item.name.clone(),
            item_id: item.id.clone(),
            category: slot.category.clone(),
            file_path: item.file_path.clone(),
            run_minutes: end_this - current_min,
        });
        current_min = end_this;
    }

    blocks
}

/// Generates a channel's show blocks for one day from the catalog.
pub struct ScheduleGenerator<'a, C: Catalog> {
    catalog: &'a C,
    channel: &'a ChannelConfig,
}

impl<'a, C: Catalog> ScheduleGenerator<'a, C> {
    pub fn new(catalog: &'a C, channel: &'a ChannelConfig) -> Self {
        ScheduleGenerator { catalog, channel }
    }

    /// Fill every configured slot, then resolve missing file paths.
    ///
    /// An empty category skips that slot with a warning (the schedule
    /// proceeds with a gap); a failed category fetch fails the channel.
    pub fn generate(&self, rng: &mut fastrand::Rng) -> Result<Vec<ShowBlock>> {
        let mut blocks = Vec::new();

        for slot in self.channel.slots()? {
            let items = self.catalog.items_by_category(&slot.category)?;
            if items.is_empty() {
                warn!(
                    channel = %self.channel.id,
                    category = %slot.category,
                    "no items for category, slot skipped"
                );
                continue;
            }
            blocks.extend(fill_slot(&slot, &items, rng));
        }

        self.resolve_paths(&mut blocks);
        Ok(blocks)
    }

    /// Best-effort second lookup for blocks the initial fetch left
    /// pathless. Attempted once per block; failures leave the path unset
    /// and never abort the compilation.
    fn resolve_paths(&self, blocks: &mut [ShowBlock]) {
        for block in blocks.iter_mut().filter(|b| b.file_path.is_none()) {
            match self.catalog.file_path(&block.item_id) {
                Ok(Some(path)) => block.file_path = Some(path),
                Ok(None) => {
                    warn!(item = %block.item_id, title = %block.title, "no file path for item");
                }
                Err(e) => {
                    warn!(item = %block.item_id, error = %e, "file path lookup failed");
                }
            }
        }
    }
}
