#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Dungeon puzzle system coordinating monster groups.
//!
//! A [`Puzzle`] owns the region, the dungeon, and the [`PuzzleScript`] that
//! decides progression. [`MonsterGroup`] values are cohorts of creatures the
//! script uses as objectives: they are allocated from a group configuration,
//! spawned at a puzzle place with dungeon scaling applied, counted down as
//! members die on arbitrary threads, and used to carry lock keys as drops.

use std::sync::{Mutex, MutexGuard, PoisonError};

mod monster_group;
mod puzzle;
mod scaling;

pub use monster_group::{GroupError, MonsterGroup};
pub use puzzle::{Puzzle, PuzzleScript};
pub use scaling::apply_dungeon_scaling;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
