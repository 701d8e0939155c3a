//! Shared combat math for the duel engine and the predictor.
//!
//! These pure functions calculate combat outcomes without side effects.
//! Every random draw goes through [`roll`], a single uniform `f64` in `[0, 1)`;
//! integer rolls and picks are derived from it with `floor(roll * n)`.

use super::constants::*;
use rand::Rng;

/// Draw one uniform float in `[0, 1)`.
pub fn roll(rng: &mut impl Rng) -> f64 {
    rng.gen::<f64>()
}

/// Returns true with probability `p`.
pub fn chance(p: f64, rng: &mut impl Rng) -> bool {
    roll(rng) < p
}

/// Roll an integer in `0..sides`.
pub fn roll_die(sides: u32, rng: &mut impl Rng) -> i32 {
    if sides == 0 {
        return 0;
    }
    ((roll(rng) * sides as f64).floor() as i32).min(sides as i32 - 1)
}

/// Pick a uniformly random index into a collection of `len` items.
pub fn pick_index(len: usize, rng: &mut impl Rng) -> usize {
    ((roll(rng) * len as f64).floor() as usize).min(len.saturating_sub(1))
}

/// Chance that the defender dodges an incoming attack.
///
/// `0.10 + (defender - (attacker - blind_penalty)) * 0.02`, never below 0.05.
pub fn dodge_chance(defender_agility: u32, attacker_agility: u32, attacker_blinded: bool) -> f64 {
    let penalty = if attacker_blinded {
        BLIND_AGILITY_PENALTY
    } else {
        0
    };
    let effective_attacker = attacker_agility as i64 - penalty;
    let skew = defender_agility as i64 - effective_attacker;
    (DODGE_BASE_CHANCE + skew as f64 * DODGE_PER_AGILITY_POINT).max(DODGE_FLOOR)
}

/// Roll whether an attack is dodged.
pub fn roll_dodge(dodge_chance: f64, rng: &mut impl Rng) -> bool {
    chance(dodge_chance, rng)
}

/// Base swing damage: `power + d5 + weapon bonus`.
pub fn roll_base_damage(power: u32, weapon_bonus: i32, rng: &mut impl Rng) -> i32 {
    power as i32 + roll_die(DAMAGE_VARIANCE_SIDES, rng) + weapon_bonus
}

/// Crit chance for an attacker.
pub fn crit_chance(has_critical_trait: bool) -> f64 {
    if has_critical_trait {
        CRIT_CHANCE_TRAIT
    } else {
        CRIT_CHANCE_BASE
    }
}

/// Roll for a critical hit.
pub fn roll_crit(crit_chance: f64, rng: &mut impl Rng) -> bool {
    chance(crit_chance, rng)
}

/// Thrown weapon damage: `(power + bonus) * 1.05`, floored.
pub fn throw_damage(power: u32, weapon_bonus: i32) -> i32 {
    ((power as i32 + weapon_bonus) * THROW_DAMAGE_PERCENT / 100).max(0)
}

/// Total reduction percentage from armor and a successful shield block.
pub fn reduction_percent(armored: bool, blocked: bool) -> i32 {
    let mut total = 0;
    if armored {
        total += ARMOR_REDUCTION_PERCENT;
    }
    if blocked {
        total += SHIELD_BLOCK_PERCENT;
    }
    total.min(100)
}

/// Apply a reduction percentage to damage, flooring to an integer.
pub fn apply_reduction(damage: i32, reduction_percent: i32) -> i32 {
    (damage.max(0) * (100 - reduction_percent) / 100).max(0)
}

/// Rage mode attackers hit for 70% of their post-reduction damage.
pub fn apply_rage_penalty(damage: i32) -> i32 {
    damage.max(0) * RAGE_DAMAGE_PERCENT / 100
}

/// Amount of damage a guardian shield soaks up: 15% of the hit, capped at the shield's HP.
pub fn guardian_absorb(damage: i32, shield_hp: i32) -> i32 {
    if shield_hp <= 0 || damage <= 0 {
        return 0;
    }
    (damage * GUARDIAN_ABSORB_PERCENT / 100).min(shield_hp)
}

/// Damage returned to the attacker by thorns.
pub fn thorns_reflection(hp_damage: i32) -> i32 {
    if hp_damage > 0 {
        hp_damage * THORNS_REFLECT_PERCENT / 100
    } else {
        0
    }
}

/// Max HP for a vitality score.
pub fn max_hp_for_vitality(vitality: u32) -> i32 {
    BASE_HP + vitality as i32 * HP_PER_VITALITY
}
