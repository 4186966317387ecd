//! Dungeon instances owning puzzles.

use dungeon_puzzle_core::ItemMetaData;

/// Dungeon instance a puzzle belongs to.
///
/// The metadata of the item used to enter the dungeon (the "pass") carries
/// the percentages that scale spawned monsters.
#[derive(Clone, Debug, Default)]
pub struct Dungeon {
    name: String,
    item_meta: ItemMetaData,
}

impl Dungeon {
    /// Creates a dungeon entered with an item carrying `item_meta`.
    #[must_use]
    pub fn new(name: impl Into<String>, item_meta: ItemMetaData) -> Self {
        Self {
            name: name.into(),
            item_meta,
        }
    }

    /// Name of the dungeon.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Metadata of the entry item.
    #[must_use]
    pub const fn item_meta(&self) -> &ItemMetaData {
        &self.item_meta
    }
}
