#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the dungeon puzzle engine.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! puzzle systems, and adapters. Creatures are addressed by [`ActorId`],
//! allocated from [`TemplateId`] entries of a [`GroupConfig`], positioned
//! according to a [`Placement`] policy, and buffed with [`StatModifier`]
//! values. Systems report observable side effects by appending [`Event`]
//! values to caller-provided buffers so adapters can forward them to
//! observers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod metadata;

pub use metadata::{ItemMetaData, MetaDataError, MetaValue};

/// Grace period before a freshly spawned creature's AI starts acting.
pub const AI_WAKE_UP_DELAY: Duration = Duration::from_millis(1000);

/// Duration attached to dungeon scaling modifiers, long enough to outlive the group.
pub const SCALING_MOD_DURATION: u32 = 100_000;

/// Unique identifier assigned to a creature instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Identifier of a creature template (race) in the creature database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(u32);

impl TemplateId {
    /// Creates a new template identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the template identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of an item class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates a new item identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the item identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a live region creatures can be spawned into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(u32);

impl RegionId {
    /// Creates a new region identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the region identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Item that can be carried in a creature's drop list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
}

impl Item {
    /// Creates a new item of the provided class.
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Class identifier of the item.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Human readable name of the item.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Attribute adjusted by a [`StatModifier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    /// Bonus added to maximum life.
    LifeMaxMod,
    /// Bonus added to defense.
    DefenseMod,
    /// Bonus added to protection, expressed in percent.
    ProtectionMod,
    /// Bonus added to strength.
    StrMod,
    /// Bonus added to intelligence.
    IntMod,
    /// Bonus added to dexterity.
    DexMod,
    /// Bonus added to will.
    WillMod,
    /// Bonus added to luck.
    LuckMod,
    /// Bonus added to minimum attack.
    AttackMinMod,
    /// Bonus added to maximum attack.
    AttackMaxMod,
}

/// Origin of a stat modifier, used to scope removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatModSource {
    /// Modifier granted by a skill or dungeon effect.
    Skill,
    /// Modifier granted by equipment.
    Equipment,
}

/// Named, sourced, time-bounded additive adjustment to a base attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatModifier {
    /// Attribute receiving the bonus.
    pub stat: Stat,
    /// Additive bonus value.
    pub value: f32,
    /// Origin of the modifier.
    pub source: StatModSource,
    /// Lifetime of the modifier in seconds.
    pub duration: u32,
}

/// Base attributes a creature template is instantiated with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStats {
    /// Base maximum life.
    pub life: f32,
    /// Base defense.
    pub defense: f32,
    /// Base protection in percent.
    pub protection: f32,
    /// Base strength.
    pub strength: f32,
    /// Base intelligence.
    pub intelligence: f32,
    /// Base dexterity.
    pub dexterity: f32,
    /// Base will.
    pub will: f32,
    /// Base luck.
    pub luck: f32,
    /// Base minimum attack.
    pub attack_min: f32,
    /// Base maximum attack.
    pub attack_max: f32,
}

/// Effective attribute values broadcast to observers after stat changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatSnapshot {
    /// Current life.
    pub life: f32,
    /// Maximum life including modifiers.
    pub life_max: f32,
    /// Defense including modifiers.
    pub defense: f32,
    /// Protection including modifiers.
    pub protection: f32,
    /// Strength including modifiers.
    pub strength: f32,
    /// Intelligence including modifiers.
    pub intelligence: f32,
    /// Dexterity including modifiers.
    pub dexterity: f32,
    /// Will including modifiers.
    pub will: f32,
    /// Luck including modifiers.
    pub luck: f32,
    /// Minimum attack including modifiers.
    pub attack_min: f32,
    /// Maximum attack including modifiers.
    pub attack_max: f32,
}

/// Policy deciding where inside a place each creature is spawned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    /// Uniformly random point inside the place with a random facing.
    #[default]
    Random,
    /// Fixed point at the center of the place.
    Center,
    /// Fixed point near the first (south-west) corner.
    Corner1,
    /// Fixed point near the second (south-east) corner.
    Corner2,
    /// Fixed point near the third (north-east) corner.
    Corner3,
    /// Fixed point near the fourth (north-west) corner.
    Corner4,
}

/// Concrete spawn coordinate relative to a place's world anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpawnPosition {
    /// Horizontal offset from the anchor.
    pub x: i32,
    /// Vertical offset from the anchor.
    pub y: i32,
    /// Facing in degrees, `0..360`.
    pub degrees: u16,
}

/// Converts a facing in degrees into the byte direction used by creatures.
///
/// Full turns wrap, so `360` maps back to `0`.
#[must_use]
pub const fn degree_to_byte(degrees: u16) -> u8 {
    let wrapped = (degrees % 360) as u32;
    (wrapped * 255 / 360) as u8
}

/// Single `(template, amount)` entry of a group configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    /// Template to instantiate.
    pub template: TemplateId,
    /// Number of creatures to instantiate from the template.
    pub amount: u32,
}

impl GroupEntry {
    /// Creates a new group entry.
    #[must_use]
    pub const fn new(template: TemplateId, amount: u32) -> Self {
        Self { template, amount }
    }
}

/// Ordered description of the creatures a monster group allocates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupConfig {
    entries: Vec<GroupEntry>,
}

impl GroupConfig {
    /// Creates a configuration from the provided entries, preserving their order.
    #[must_use]
    pub fn new(entries: Vec<GroupEntry>) -> Self {
        Self { entries }
    }

    /// Iterator over the configured entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupEntry> {
        self.entries.iter()
    }

    /// Total number of creatures described by the configuration.
    #[must_use]
    pub fn total_amount(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.amount as usize)
            .sum()
    }
}

impl FromIterator<GroupEntry> for GroupConfig {
    fn from_iter<I: IntoIterator<Item = GroupEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Observable side effects produced while spawning monster groups.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a creature entered a region.
    CreatureSpawned {
        /// Creature that was spawned.
        actor: ActorId,
        /// Region the creature now lives in.
        region: RegionId,
        /// Absolute horizontal coordinate.
        x: i32,
        /// Absolute vertical coordinate.
        y: i32,
        /// Byte direction the creature faces.
        direction: u8,
    },
    /// Carries a refreshed stat snapshot that observers should display.
    StatsUpdated {
        /// Creature whose stats changed.
        actor: ActorId,
        /// Effective attribute values after the change.
        snapshot: StatSnapshot,
    },
    /// Reports that a creature's AI was scheduled to wake up.
    AiActivated {
        /// Creature whose AI was activated.
        actor: ActorId,
        /// Delay before the AI starts acting.
        delay: Duration,
    },
}
