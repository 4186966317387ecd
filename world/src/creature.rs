//! Creatures spawned by puzzle systems.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use bitflags::bitflags;
use dungeon_puzzle_core::{
    ActorId, BaseStats, Item, RegionId, Stat, StatModSource, StatModifier, StatSnapshot,
    TemplateId,
};

use crate::lock;

bitflags! {
    /// Lifecycle flags carried by a creature.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CreatureStates: u32 {
        /// The creature is owned by a spawner and counts as spawned content.
        const SPAWNED = 1 << 0;
        /// The creature was created on demand rather than loaded with the region.
        const INSTANT_NPC = 1 << 1;
        /// The creature died.
        const DEAD = 1 << 2;
    }
}

/// Callback invoked once when a creature dies, receiving the creature and its killer.
pub type DeathHook = Arc<dyn Fn(&Creature, Option<ActorId>) + Send + Sync>;

/// Additive stat modifiers applied on top of a creature's base attributes.
#[derive(Clone, Debug, Default)]
pub struct StatMods {
    entries: Vec<StatModifier>,
}

impl StatMods {
    /// Adds a modifier for the stat.
    pub fn add(&mut self, stat: Stat, value: f32, source: StatModSource, duration: u32) {
        self.entries.push(StatModifier {
            stat,
            value,
            source,
            duration,
        });
    }

    /// Sum of every modifier affecting the stat.
    #[must_use]
    pub fn total(&self, stat: Stat) -> f32 {
        self.entries
            .iter()
            .filter(|entry| entry.stat == stat)
            .map(|entry| entry.value)
            .sum()
    }

    /// Iterator over the modifiers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &StatModifier> {
        self.entries.iter()
    }

    /// Number of modifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no modifiers are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Handle to a creature's AI, which stays dormant until activated.
#[derive(Debug, Default)]
pub struct AiController {
    active: AtomicBool,
    delay_ms: AtomicU64,
}

impl AiController {
    /// Schedules the AI to start acting after the delay.
    pub fn activate(&self, delay: Duration) {
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.delay_ms.store(delay_ms, Ordering::Release);
        self.active.store(true, Ordering::Release);
    }

    /// Reports whether the AI has been activated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Delay requested by the most recent activation, if any.
    #[must_use]
    pub fn activation_delay(&self) -> Option<Duration> {
        self.is_active()
            .then(|| Duration::from_millis(self.delay_ms.load(Ordering::Acquire)))
    }
}

/// Position of a spawned creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// Region containing the creature.
    pub region: RegionId,
    /// Absolute horizontal coordinate.
    pub x: i32,
    /// Absolute vertical coordinate.
    pub y: i32,
}

#[derive(Debug)]
struct CreatureState {
    flags: CreatureStates,
    direction: u8,
    location: Option<Location>,
    life: f32,
    stat_mods: StatMods,
    drops: Vec<Item>,
}

/// Spawnable creature with attributes, modifiers, drops and a death notification.
pub struct Creature {
    id: ActorId,
    template: TemplateId,
    name: String,
    base: BaseStats,
    ai: Option<AiController>,
    alive: AtomicBool,
    death_hooks: Mutex<Vec<DeathHook>>,
    state: Mutex<CreatureState>,
}

impl Creature {
    pub(crate) fn new(
        id: ActorId,
        template: TemplateId,
        name: String,
        base: BaseStats,
        has_ai: bool,
    ) -> Self {
        Self {
            id,
            template,
            name,
            base,
            ai: has_ai.then(AiController::default),
            alive: AtomicBool::new(true),
            death_hooks: Mutex::new(Vec::new()),
            state: Mutex::new(CreatureState {
                flags: CreatureStates::empty(),
                direction: 0,
                location: None,
                life: base.life,
                stat_mods: StatMods::default(),
                drops: Vec::new(),
            }),
        }
    }

    /// Identifier of the creature.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Template the creature was instantiated from.
    #[must_use]
    pub const fn template(&self) -> TemplateId {
        self.template
    }

    /// Display name of the creature.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base attributes before modifiers.
    #[must_use]
    pub const fn base_stats(&self) -> &BaseStats {
        &self.base
    }

    /// AI handle, if the creature has one.
    #[must_use]
    pub fn ai(&self) -> Option<&AiController> {
        self.ai.as_ref()
    }

    /// Current state flags.
    #[must_use]
    pub fn states(&self) -> CreatureStates {
        lock(&self.state).flags
    }

    /// Adds the flags to the creature's state.
    pub fn insert_states(&self, flags: CreatureStates) {
        lock(&self.state).flags.insert(flags);
    }

    /// Byte direction the creature faces.
    #[must_use]
    pub fn direction(&self) -> u8 {
        lock(&self.state).direction
    }

    /// Turns the creature to face the byte direction.
    pub fn set_direction(&self, direction: u8) {
        lock(&self.state).direction = direction;
    }

    /// Location of the creature once spawned.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        lock(&self.state).location
    }

    pub(crate) fn set_location(&self, location: Location) {
        lock(&self.state).location = Some(location);
    }

    /// Adds a stat modifier.
    pub fn add_stat_mod(&self, stat: Stat, value: f32, source: StatModSource, duration: u32) {
        lock(&self.state)
            .stat_mods
            .add(stat, value, source, duration);
    }

    /// Copy of the creature's current stat modifiers.
    #[must_use]
    pub fn stat_mods(&self) -> StatMods {
        lock(&self.state).stat_mods.clone()
    }

    /// Current life.
    #[must_use]
    pub fn life(&self) -> f32 {
        lock(&self.state).life
    }

    /// Maximum life including modifiers.
    #[must_use]
    pub fn life_max(&self) -> f32 {
        self.base.life + lock(&self.state).stat_mods.total(Stat::LifeMaxMod)
    }

    /// Restores life to its maximum.
    pub fn full_life_heal(&self) {
        let mut state = lock(&self.state);
        state.life = self.base.life + state.stat_mods.total(Stat::LifeMaxMod);
    }

    /// Effective attributes, as broadcast to observers.
    #[must_use]
    pub fn stat_snapshot(&self) -> StatSnapshot {
        let state = lock(&self.state);
        let mods = &state.stat_mods;
        let base = &self.base;
        StatSnapshot {
            life: state.life,
            life_max: base.life + mods.total(Stat::LifeMaxMod),
            defense: base.defense + mods.total(Stat::DefenseMod),
            protection: base.protection + mods.total(Stat::ProtectionMod),
            strength: base.strength + mods.total(Stat::StrMod),
            intelligence: base.intelligence + mods.total(Stat::IntMod),
            dexterity: base.dexterity + mods.total(Stat::DexMod),
            will: base.will + mods.total(Stat::WillMod),
            luck: base.luck + mods.total(Stat::LuckMod),
            attack_min: base.attack_min + mods.total(Stat::AttackMinMod),
            attack_max: base.attack_max + mods.total(Stat::AttackMaxMod),
        }
    }

    /// Appends an item to the creature's drop list.
    pub fn add_drop(&self, item: Item) {
        lock(&self.state).drops.push(item);
    }

    /// Copy of the items the creature drops on death.
    #[must_use]
    pub fn drops(&self) -> Vec<Item> {
        lock(&self.state).drops.clone()
    }

    /// Registers a callback raised when the creature dies.
    pub fn subscribe_death(&self, hook: DeathHook) {
        lock(&self.death_hooks).push(hook);
    }

    /// Reports whether the creature is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Kills the creature, notifying death subscribers.
    ///
    /// Only the first call has an effect; it returns `true`. Subscribers run on
    /// the calling thread without any creature lock held.
    pub fn kill(&self, killer: Option<ActorId>) -> bool {
        if !self.alive.swap(false, Ordering::AcqRel) {
            return false;
        }

        {
            let mut state = lock(&self.state);
            state.life = 0.0;
            state.flags.insert(CreatureStates::DEAD);
        }

        let hooks: Vec<DeathHook> = lock(&self.death_hooks).clone();
        for hook in hooks {
            hook(self, killer);
        }
        true
    }
}

impl fmt::Debug for Creature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Creature")
            .field("id", &self.id)
            .field("template", &self.template)
            .field("name", &self.name)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}
