//! Puzzles and the script callbacks they dispatch.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use dungeon_puzzle_core::Placement;
use dungeon_puzzle_world::{CreatureDb, Dungeon, PuzzlePlace, Region, SharedRng};

use crate::{lock, MonsterGroup};

/// Script driving a puzzle's progression.
///
/// Callbacks run synchronously on the thread that triggered them. No group
/// or puzzle lock is held while they run, so scripts may freely query the
/// group and the puzzle again.
pub trait PuzzleScript: Send + Sync {
    /// Called once a group has created all of its members.
    fn on_group_allocated(&self, puzzle: &Puzzle, group: &MonsterGroup);

    /// Called after a member died and the group's remaining count was lowered.
    fn on_member_died(&self, puzzle: &Puzzle, group: &MonsterGroup);
}

/// Dungeon sub-objective owning a region, its scaling source, and a script.
pub struct Puzzle {
    name: String,
    region: Mutex<Region>,
    dungeon: Dungeon,
    creatures: Arc<CreatureDb>,
    script: Arc<dyn PuzzleScript>,
    rng: SharedRng,
}

impl Puzzle {
    /// Creates a puzzle. Groups only keep weak references to it.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        region: Region,
        dungeon: Dungeon,
        creatures: Arc<CreatureDb>,
        script: Arc<dyn PuzzleScript>,
        rng: SharedRng,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            region: Mutex::new(region),
            dungeon,
            creatures,
            script,
            rng,
        })
    }

    /// Name of the puzzle.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exclusive access to the puzzle's region.
    pub fn region(&self) -> MutexGuard<'_, Region> {
        lock(&self.region)
    }

    /// Dungeon the puzzle belongs to.
    #[must_use]
    pub const fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    /// Factory used to instantiate group members.
    #[must_use]
    pub fn creatures(&self) -> &CreatureDb {
        &self.creatures
    }

    /// Script receiving the puzzle's callbacks.
    #[must_use]
    pub fn script(&self) -> &dyn PuzzleScript {
        self.script.as_ref()
    }

    /// Random source shared by everything inside the puzzle.
    #[must_use]
    pub const fn rng(&self) -> &SharedRng {
        &self.rng
    }

    /// Creates an empty monster group spawning at `place`.
    #[must_use]
    pub fn monster_group(
        self: &Arc<Self>,
        name: impl Into<String>,
        place: Arc<PuzzlePlace>,
        placement: Placement,
    ) -> Arc<MonsterGroup> {
        MonsterGroup::new(name, self, place, placement)
    }
}

impl fmt::Debug for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Puzzle")
            .field("name", &self.name)
            .field("dungeon", &self.dungeon.name())
            .finish_non_exhaustive()
    }
}
