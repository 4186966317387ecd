//! Puzzle script driven by scenario files.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use dungeon_puzzle_system_puzzle::{MonsterGroup, Puzzle, PuzzleScript};
use dungeon_puzzle_world::PuzzlePlace;
use tracing::info;

/// Opens lock places once the group guarding them is cleared.
#[derive(Debug, Default)]
pub(crate) struct ScenarioScript {
    unlocks: BTreeMap<String, Vec<Arc<PuzzlePlace>>>,
    allocations: AtomicUsize,
    deaths: AtomicUsize,
    unlocked: Mutex<Vec<String>>,
}

impl ScenarioScript {
    /// Creates a script that opens `places` when the group named `group` is cleared.
    pub(crate) fn with_unlocks(
        unlocks: impl IntoIterator<Item = (String, Vec<Arc<PuzzlePlace>>)>,
    ) -> Self {
        Self {
            unlocks: unlocks.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Number of allocation callbacks received.
    pub(crate) fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Acquire)
    }

    /// Number of member death callbacks received.
    pub(crate) fn deaths(&self) -> usize {
        self.deaths.load(Ordering::Acquire)
    }

    /// Names of the places opened so far, in opening order.
    pub(crate) fn unlocked(&self) -> Vec<String> {
        self.unlocked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PuzzleScript for ScenarioScript {
    fn on_group_allocated(&self, puzzle: &Puzzle, group: &MonsterGroup) {
        let _ = self.allocations.fetch_add(1, Ordering::AcqRel);
        info!(puzzle = %puzzle.name(), group = %group.name(), count = group.count(), "group ready");
    }

    fn on_member_died(&self, puzzle: &Puzzle, group: &MonsterGroup) {
        let _ = self.deaths.fetch_add(1, Ordering::AcqRel);
        if group.remaining() != 0 {
            return;
        }

        // Concurrent deaths may all observe zero; `unlock` opens each place once.
        for place in self.unlocks.get(group.name()).into_iter().flatten() {
            if place.unlock() {
                info!(puzzle = %puzzle.name(), group = %group.name(), place = %place.name(), "place unlocked");
                self.unlocked
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(place.name().to_owned());
            }
        }
    }
}
