//! Dungeon-driven stat scaling applied to spawned monsters.

use dungeon_puzzle_core::{ItemMetaData, Stat, StatModSource, SCALING_MOD_DURATION};
use dungeon_puzzle_world::Creature;

const HEALTH: &str = "Health";
const DEFENSE: &str = "Defense";
const PROTECTION: &str = "Protection";
const ATTACK: &str = "Attack";

/// Buffs `creature` with the percentages found in the dungeon item metadata.
///
/// `Health`, `Defense` and `Attack` scale each attribute's own base value by
/// `percentage / 100`, computed in integer arithmetic, so `150` grants `+1x`
/// and `99` grants nothing. `Protection` is added as-is. The one `Attack`
/// percentage drives all seven offensive attributes. Health scaling is
/// followed by a full heal so the creature starts at its new maximum.
pub fn apply_dungeon_scaling(creature: &Creature, meta: &ItemMetaData) {
    let base = *creature.base_stats();

    if let Some(percentage) = meta.get_short(HEALTH) {
        add(creature, Stat::LifeMaxMod, scaled(base.life, percentage));
        creature.full_life_heal();
    }

    if let Some(percentage) = meta.get_short(DEFENSE) {
        add(creature, Stat::DefenseMod, scaled(base.defense, percentage));
    }

    if let Some(percentage) = meta.get_short(PROTECTION) {
        add(creature, Stat::ProtectionMod, f32::from(percentage));
    }

    if let Some(percentage) = meta.get_short(ATTACK) {
        let offense = [
            (Stat::StrMod, base.strength),
            (Stat::IntMod, base.intelligence),
            (Stat::DexMod, base.dexterity),
            (Stat::LuckMod, base.luck),
            (Stat::WillMod, base.will),
            (Stat::AttackMinMod, base.attack_min),
            (Stat::AttackMaxMod, base.attack_max),
        ];
        for (stat, value) in offense {
            add(creature, stat, scaled(value, percentage));
        }
    }
}

fn add(creature: &Creature, stat: Stat, value: f32) {
    creature.add_stat_mod(stat, value, StatModSource::Skill, SCALING_MOD_DURATION);
}

fn scaled(base: f32, percentage: i16) -> f32 {
    base * f32::from(percentage / 100)
}
