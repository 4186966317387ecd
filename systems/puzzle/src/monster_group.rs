//! Monster groups used as puzzle objectives.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, OnceLock, Weak,
    },
};

use dungeon_puzzle_core::{
    degree_to_byte, ActorId, Event, GroupConfig, Item, Placement, AI_WAKE_UP_DELAY,
};
use dungeon_puzzle_world::{
    Creature, CreatureStates, PuzzlePlace, RegionError, SharedRng, TemplateError,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{apply_dungeon_scaling, Puzzle};

/// Failures surfaced by monster group operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupError {
    /// The group already has members; a cohort is allocated exactly once.
    #[error("monster group `{group}` is already allocated")]
    AlreadyAllocated {
        /// Name of the group.
        group: String,
    },
    /// The owning puzzle was discarded while the group was still in use.
    #[error("puzzle owning monster group `{group}` no longer exists")]
    PuzzleDiscarded {
        /// Name of the group.
        group: String,
    },
    /// A member could not be instantiated.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// The region refused to spawn a member.
    #[error(transparent)]
    Region(#[from] RegionError),
}

struct Member {
    creature: Arc<Creature>,
    dead: AtomicBool,
}

/// Members and their alive counter, published together by `allocate`.
struct Cohort {
    members: Vec<Member>,
    remaining: AtomicUsize,
}

/// Named cohort of monsters tracked together for one puzzle objective.
///
/// Membership is fixed by [`MonsterGroup::allocate`]. The remaining-alive
/// counter is the only state mutated from death notifications and is safe to
/// update from any thread; every other operation is expected to be driven
/// from the puzzle's control context.
pub struct MonsterGroup {
    name: String,
    puzzle: Weak<Puzzle>,
    place: Arc<PuzzlePlace>,
    placement: Placement,
    rng: SharedRng,
    cohort: OnceLock<Cohort>,
}

impl MonsterGroup {
    /// Creates an empty group belonging to `puzzle` that spawns at `place`.
    ///
    /// The group draws positions and loot targets from the puzzle's random source.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        puzzle: &Arc<Puzzle>,
        place: Arc<PuzzlePlace>,
        placement: Placement,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            puzzle: Arc::downgrade(puzzle),
            place,
            placement,
            rng: puzzle.rng().clone(),
            cohort: OnceLock::new(),
        })
    }

    /// Name of the group.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Place the group spawns at.
    #[must_use]
    pub fn place(&self) -> &Arc<PuzzlePlace> {
        &self.place
    }

    /// Policy used to position members inside the place.
    #[must_use]
    pub const fn placement(&self) -> Placement {
        self.placement
    }

    /// Owning puzzle, if it still exists.
    #[must_use]
    pub fn puzzle(&self) -> Option<Arc<Puzzle>> {
        self.puzzle.upgrade()
    }

    /// Reports whether [`MonsterGroup::allocate`] completed.
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.cohort.get().is_some()
    }

    /// Number of members.
    #[must_use]
    pub fn count(&self) -> usize {
        self.member_slice().len()
    }

    /// Number of members that have not died yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cohort
            .get()
            .map_or(0, |cohort| cohort.remaining.load(Ordering::Acquire))
    }

    /// Reports whether the group was allocated and every member died.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.is_allocated() && self.remaining() == 0
    }

    /// Members in allocation order.
    pub fn members(&self) -> impl ExactSizeIterator<Item = &Arc<Creature>> {
        self.member_slice().iter().map(|member| &member.creature)
    }

    fn member_slice(&self) -> &[Member] {
        self.cohort
            .get()
            .map(|cohort| cohort.members.as_slice())
            .unwrap_or_default()
    }

    fn live_puzzle(&self) -> Result<Arc<Puzzle>, GroupError> {
        self.puzzle.upgrade().ok_or_else(|| GroupError::PuzzleDiscarded {
            group: self.name.clone(),
        })
    }

    /// Creates the members described by `config` and notifies the puzzle script.
    ///
    /// Every member is flagged as spawned instant content and subscribed to
    /// this group's death accounting. Template failures abort the call before
    /// the group changes; the script observes the complete member list.
    pub fn allocate(self: &Arc<Self>, config: &GroupConfig) -> Result<(), GroupError> {
        let puzzle = self.live_puzzle()?;
        if self.is_allocated() {
            return Err(GroupError::AlreadyAllocated {
                group: self.name.clone(),
            });
        }

        // Amounts come from configuration; grow as templates resolve.
        let mut members = Vec::new();
        for entry in config.iter() {
            for _ in 0..entry.amount {
                let creature = puzzle.creatures().create(entry.template)?;
                creature.insert_states(CreatureStates::SPAWNED | CreatureStates::INSTANT_NPC);

                let group = Arc::downgrade(self);
                let index = members.len();
                creature.subscribe_death(Arc::new(move |_: &Creature, killer: Option<ActorId>| {
                    if let Some(group) = group.upgrade() {
                        group.on_member_death(index, killer);
                    }
                }));

                members.push(Member {
                    creature,
                    dead: AtomicBool::new(false),
                });
            }
        }

        let count = members.len();
        let cohort = Cohort {
            members,
            remaining: AtomicUsize::new(count),
        };
        if self.cohort.set(cohort).is_err() {
            return Err(GroupError::AlreadyAllocated {
                group: self.name.clone(),
            });
        }
        debug!(group = %self.name, puzzle = %puzzle.name(), count, "monster group allocated");

        puzzle.script().on_group_allocated(&puzzle, self);
        Ok(())
    }

    /// Spawns every member into the puzzle's region and applies dungeon scaling.
    ///
    /// Positions are drawn and validated against the region before any member
    /// moves, so a dead member or an out-of-bounds position leaves the whole
    /// group unspawned. Each spawned member yields [`Event::CreatureSpawned`]
    /// and [`Event::StatsUpdated`], plus [`Event::AiActivated`] when it has an
    /// AI, which wakes up after [`AI_WAKE_UP_DELAY`].
    ///
    /// Calling this twice repositions the members and stacks a second set of
    /// scaling modifiers on top of the first.
    pub fn spawn(&self, out: &mut Vec<Event>) -> Result<(), GroupError> {
        let puzzle = self.live_puzzle()?;
        let anchor = self.place.world_anchor();
        let meta = puzzle.dungeon().item_meta();
        let mut region = puzzle.region();

        let mut placements = Vec::with_capacity(self.count());
        for member in self.member_slice() {
            if !member.creature.is_alive() {
                return Err(RegionError::DeadCreature {
                    actor: member.creature.id(),
                }
                .into());
            }
            let position = self
                .rng
                .with(|rng| self.place.position(self.placement, rng));
            let x = anchor.x.saturating_add(position.x);
            let y = anchor.y.saturating_add(position.y);
            if !region.contains(x, y) {
                return Err(RegionError::OutOfBounds {
                    region: region.id(),
                    x,
                    y,
                }
                .into());
            }
            placements.push((&member.creature, x, y, degree_to_byte(position.degrees)));
        }

        for (creature, x, y, direction) in placements {
            creature.set_direction(direction);
            region.spawn(creature, x, y)?;
            out.push(Event::CreatureSpawned {
                actor: creature.id(),
                region: region.id(),
                x,
                y,
                direction,
            });

            apply_dungeon_scaling(creature, meta);
            out.push(Event::StatsUpdated {
                actor: creature.id(),
                snapshot: creature.stat_snapshot(),
            });

            if let Some(ai) = creature.ai() {
                ai.activate(AI_WAKE_UP_DELAY);
                out.push(Event::AiActivated {
                    actor: creature.id(),
                    delay: AI_WAKE_UP_DELAY,
                });
            }
        }

        debug!(group = %self.name, place = %self.place.name(), "monster group spawned");
        Ok(())
    }

    fn on_member_death(&self, index: usize, killer: Option<ActorId>) {
        let Some(cohort) = self.cohort.get() else {
            return;
        };
        let Some(member) = cohort.members.get(index) else {
            return;
        };
        if member.dead.swap(true, Ordering::AcqRel) {
            debug!(group = %self.name, actor = member.creature.id().get(), "duplicate death ignored");
            return;
        }

        let decremented = cohort
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| {
                remaining.checked_sub(1)
            });
        match decremented {
            Ok(1) => info!(group = %self.name, "monster group cleared"),
            Ok(_) => {}
            Err(_) => {
                warn!(group = %self.name, "death reported while no member was counted alive");
                return;
            }
        }
        debug!(
            group = %self.name,
            actor = member.creature.id().get(),
            killer = ?killer.map(|killer| killer.get()),
            "group member died"
        );

        if let Some(puzzle) = self.puzzle.upgrade() {
            puzzle.script().on_member_died(&puzzle, self);
        }
    }

    /// Appends `item` to the drops of one member chosen uniformly at random.
    ///
    /// Returns the chosen member, or `None` when the group has no members.
    pub fn add_drop(&self, item: Item) -> Option<ActorId> {
        let members = self.member_slice();
        let member = members.get(self.rng.index(members.len())?)?;
        debug!(group = %self.name, actor = member.creature.id().get(), item = item.id().get(), "drop added");
        member.creature.add_drop(item);
        Some(member.creature.id())
    }

    /// Gives the key of `lock_place` to a random member of the group.
    ///
    /// Places that are not locks and empty groups are reported as warnings and
    /// leave every drop list untouched.
    pub fn add_key_for_lock(&self, lock_place: &PuzzlePlace) -> Option<ActorId> {
        let Some(key) = lock_place.key() else {
            warn!(
                group = %self.name,
                place = %lock_place.name(),
                "place is not a lock, key not added"
            );
            return None;
        };

        if self.count() == 0 {
            warn!(
                group = %self.name,
                place = %lock_place.name(),
                "no monsters in group, key not added"
            );
            return None;
        }

        self.add_drop(key.clone())
    }
}

impl fmt::Debug for MonsterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonsterGroup")
            .field("name", &self.name)
            .field("place", &self.place.name())
            .field("placement", &self.placement)
            .field("count", &self.count())
            .field("remaining", &self.remaining())
            .finish_non_exhaustive()
    }
}
