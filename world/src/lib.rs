#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for dungeon puzzles.
//!
//! The world owns the entities puzzle systems operate on: [`Creature`]
//! instances built from a [`CreatureDb`], the [`Region`] they live in, the
//! [`PuzzlePlace`] areas they spawn at, and the [`Dungeon`] whose metadata
//! scales them. Creatures are shared behind `Arc` so that deaths can be
//! raised from any thread.

use std::sync::{Mutex, MutexGuard, PoisonError};

mod creature;
mod dungeon;
mod place;
mod region;
mod rng;
mod templates;

pub use creature::{AiController, Creature, CreatureStates, DeathHook, Location, StatMods};
pub use dungeon::Dungeon;
pub use place::PuzzlePlace;
pub use region::{Region, RegionError};
pub use rng::SharedRng;
pub use templates::{CreatureDb, CreatureTemplate, TemplateError};

/// Locks the mutex, recovering the guard if another thread panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
