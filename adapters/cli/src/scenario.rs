//! Scenario files describing one puzzle, its places and the groups it spawns.

use std::{collections::BTreeMap, fmt, fs, path::Path, sync::Arc, thread};

use anyhow::{bail, Context, Result};
use dungeon_puzzle_core::{ActorId, GroupConfig, Item, ItemMetaData, Placement, RegionId};
use dungeon_puzzle_system_puzzle::{MonsterGroup, Puzzle};
use dungeon_puzzle_world::{
    Creature, CreatureDb, CreatureTemplate, Dungeon, PuzzlePlace, Region, SharedRng,
};
use glam::IVec2;
use serde::Deserialize;
use tracing::{debug, info};

use crate::script::ScenarioScript;

/// Parsed scenario file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    name: String,
    #[serde(default)]
    seed: u64,
    dungeon: DungeonConfig,
    region: RegionConfig,
    #[serde(default)]
    templates: Vec<CreatureTemplate>,
    #[serde(default)]
    places: Vec<PlaceConfig>,
    #[serde(default)]
    groups: Vec<GroupPlanConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DungeonConfig {
    name: String,
    /// Item metadata in `KEY:TYPE:VALUE;` form.
    #[serde(default)]
    item_meta: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegionConfig {
    id: RegionId,
    size: [i32; 2],
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlaceConfig {
    name: String,
    anchor: [i32; 2],
    extent: [i32; 2],
    /// Turns the place into a lock opened by this key.
    #[serde(default)]
    key: Option<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupPlanConfig {
    name: String,
    place: String,
    #[serde(default)]
    placement: Placement,
    monsters: GroupConfig,
    /// Lock places whose key one of the members carries.
    #[serde(default)]
    keys_for: Vec<String>,
    /// Lock places opened once every member died.
    #[serde(default)]
    unlocks: Vec<String>,
}

impl Scenario {
    /// Reads and parses the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse scenario at {}", path.display()))
    }

    /// Parses scenario TOML.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid scenario toml")
    }

    /// Seed declared by the scenario.
    pub(crate) const fn seed(&self) -> u64 {
        self.seed
    }

    /// Resolves every name in the scenario and creates the puzzle and its groups.
    pub(crate) fn build(self, seed: u64) -> Result<Session> {
        let Self {
            name,
            seed: _,
            dungeon,
            region,
            templates,
            places,
            groups,
        } = self;

        let meta: ItemMetaData = dungeon
            .item_meta
            .parse()
            .with_context(|| format!("invalid item metadata for dungeon `{}`", dungeon.name))?;
        let creatures = CreatureDb::from_templates(templates).context("invalid creature templates")?;

        let mut resolved = BTreeMap::new();
        for place in places {
            let anchor = IVec2::from_array(place.anchor);
            let extent = IVec2::from_array(place.extent);
            let built = match place.key {
                Some(key) => PuzzlePlace::new_lock(place.name.clone(), anchor, extent, key),
                None => PuzzlePlace::new(place.name.clone(), anchor, extent),
            };
            if resolved.insert(place.name.clone(), Arc::new(built)).is_some() {
                bail!("duplicate place `{}`", place.name);
            }
        }
        let lookup = |place: &str| -> Result<Arc<PuzzlePlace>> {
            resolved
                .get(place)
                .cloned()
                .with_context(|| format!("unknown place `{place}`"))
        };

        let mut unlocks = BTreeMap::new();
        for group in &groups {
            let mut opened = Vec::with_capacity(group.unlocks.len());
            for place in &group.unlocks {
                let place = lookup(place)?;
                if !place.is_lock() {
                    bail!(
                        "group `{}` unlocks `{}`, which is not a lock",
                        group.name,
                        place.name()
                    );
                }
                opened.push(place);
            }
            if unlocks.insert(group.name.clone(), opened).is_some() {
                bail!("duplicate group `{}`", group.name);
            }
        }

        let script = Arc::new(ScenarioScript::with_unlocks(unlocks));
        let puzzle = Puzzle::new(
            name,
            Region::new(region.id, IVec2::from_array(region.size)),
            Dungeon::new(dungeon.name, meta),
            Arc::new(creatures),
            script.clone(),
            SharedRng::seeded(seed),
        );

        let mut plans = Vec::with_capacity(groups.len());
        for group in groups {
            let place = lookup(&group.place)
                .with_context(|| format!("group `{}` spawns at an unknown place", group.name))?;
            let keys_for = group
                .keys_for
                .iter()
                .map(|place| lookup(place))
                .collect::<Result<Vec<_>>>()?;
            plans.push(GroupPlan {
                group: puzzle.monster_group(group.name, place, group.placement),
                monsters: group.monsters,
                keys_for,
            });
        }

        Ok(Session {
            puzzle,
            script,
            plans,
        })
    }
}

struct GroupPlan {
    group: Arc<MonsterGroup>,
    monsters: GroupConfig,
    keys_for: Vec<Arc<PuzzlePlace>>,
}

/// Puzzle built from a scenario, ready to be played once.
pub(crate) struct Session {
    puzzle: Arc<Puzzle>,
    script: Arc<ScenarioScript>,
    plans: Vec<GroupPlan>,
}

impl Session {
    /// Allocates and spawns every group, hands out lock keys, then kills every monster.
    ///
    /// With `kill_threads` each monster dies on its own thread.
    pub(crate) fn run(&self, kill_threads: bool) -> Result<Report> {
        let mut events = Vec::new();
        for plan in &self.plans {
            let group = &plan.group;
            group
                .allocate(&plan.monsters)
                .with_context(|| format!("failed to allocate group `{}`", group.name()))?;
            for lock in &plan.keys_for {
                if let Some(carrier) = group.add_key_for_lock(lock) {
                    debug!(group = %group.name(), place = %lock.name(), carrier = carrier.get(), "key assigned");
                }
            }
            group
                .spawn(&mut events)
                .with_context(|| format!("failed to spawn group `{}`", group.name()))?;
        }
        info!(puzzle = %self.puzzle.name(), events = events.len(), "puzzle spawned");

        let creatures: Vec<Arc<Creature>> = self
            .plans
            .iter()
            .flat_map(|plan| plan.group.members().cloned())
            .collect();
        if kill_threads {
            thread::scope(|scope| {
                for creature in &creatures {
                    let _ = scope.spawn(move || creature.kill(None));
                }
            });
        } else {
            for creature in &creatures {
                let _ = creature.kill(None);
            }
        }

        let groups = self
            .plans
            .iter()
            .map(|plan| GroupReport {
                name: plan.group.name().to_owned(),
                place: plan.group.place().name().to_owned(),
                placement: plan.group.placement(),
                count: plan.group.count(),
                remaining: plan.group.remaining(),
                drops: plan
                    .group
                    .members()
                    .flat_map(|creature| {
                        creature
                            .drops()
                            .into_iter()
                            .map(move |item| (creature.id(), item))
                    })
                    .collect(),
            })
            .collect();

        Ok(Report {
            puzzle: self.puzzle.name().to_owned(),
            events: events.len(),
            allocations: self.script.allocations(),
            deaths: self.script.deaths(),
            groups,
            unlocked: self.script.unlocked(),
        })
    }
}

/// Outcome of a scenario run.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Report {
    puzzle: String,
    events: usize,
    allocations: usize,
    deaths: usize,
    groups: Vec<GroupReport>,
    unlocked: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
struct GroupReport {
    name: String,
    place: String,
    placement: Placement,
    count: usize,
    remaining: usize,
    drops: Vec<(ActorId, Item)>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "puzzle {}: {} events, {} groups allocated, {} deaths",
            self.puzzle, self.events, self.allocations, self.deaths
        )?;
        for group in &self.groups {
            writeln!(
                f,
                "group {} at {} ({:?}): {} members, {} remaining",
                group.name, group.place, group.placement, group.count, group.remaining
            )?;
            for (actor, item) in &group.drops {
                writeln!(f, "  {} dropped by actor {}", item.name(), actor.get())?;
            }
        }
        for place in &self.unlocked {
            writeln!(f, "{place} unlocked")?;
        }
        Ok(())
    }
}
