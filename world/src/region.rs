//! Live regions creatures are spawned into.

use std::{collections::BTreeMap, sync::Arc};

use dungeon_puzzle_core::{ActorId, RegionId};
use glam::IVec2;
use thiserror::Error;
use tracing::debug;

use crate::{Creature, Location};

/// Reasons a region rejects a spawn.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegionError {
    /// The coordinate lies outside the region bounds.
    #[error("position ({x}, {y}) is outside region {}", .region.get())]
    OutOfBounds {
        /// Region that rejected the spawn.
        region: RegionId,
        /// Requested horizontal coordinate.
        x: i32,
        /// Requested vertical coordinate.
        y: i32,
    },
    /// Dead creatures cannot enter the world.
    #[error("creature {} is dead and cannot be spawned", .actor.get())]
    DeadCreature {
        /// Creature that was rejected.
        actor: ActorId,
    },
}

/// Bounded area holding the creatures currently active in the world.
#[derive(Debug)]
pub struct Region {
    id: RegionId,
    size: IVec2,
    creatures: BTreeMap<ActorId, Arc<Creature>>,
}

impl Region {
    /// Creates an empty region spanning `0..size.x` by `0..size.y`.
    #[must_use]
    pub fn new(id: RegionId, size: IVec2) -> Self {
        Self {
            id,
            size: size.max(IVec2::ZERO),
            creatures: BTreeMap::new(),
        }
    }

    /// Identifier of the region.
    #[must_use]
    pub const fn id(&self) -> RegionId {
        self.id
    }

    /// Reports whether the coordinate lies inside the region.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (0..self.size.x).contains(&x) && (0..self.size.y).contains(&y)
    }

    /// Places the creature at the coordinate and activates it in the region.
    ///
    /// Spawning a creature that is already present moves it instead of
    /// duplicating it.
    pub fn spawn(&mut self, creature: &Arc<Creature>, x: i32, y: i32) -> Result<(), RegionError> {
        if !creature.is_alive() {
            return Err(RegionError::DeadCreature {
                actor: creature.id(),
            });
        }
        if !self.contains(x, y) {
            return Err(RegionError::OutOfBounds {
                region: self.id,
                x,
                y,
            });
        }

        creature.set_location(Location {
            region: self.id,
            x,
            y,
        });
        if self
            .creatures
            .insert(creature.id(), Arc::clone(creature))
            .is_some()
        {
            debug!(actor = creature.id().get(), x, y, "creature repositioned");
        }
        Ok(())
    }

    /// Looks up a creature in the region.
    #[must_use]
    pub fn creature(&self, actor: ActorId) -> Option<&Arc<Creature>> {
        self.creatures.get(&actor)
    }

    /// Iterator over the creatures in identifier order.
    pub fn creatures(&self) -> impl Iterator<Item = &Arc<Creature>> {
        self.creatures.values()
    }

    /// Iterator over the creatures that are still alive.
    pub fn living(&self) -> impl Iterator<Item = &Arc<Creature>> {
        self.creatures.values().filter(|creature| creature.is_alive())
    }

    /// Number of creatures in the region, dead or alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    /// Reports whether no creature was spawned into the region.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }
}
