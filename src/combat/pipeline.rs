//! Hit/damage pipeline: dodge, damage roll, crit, reduction, rage penalty,
//! guardian absorption and HP loss.

use rand::Rng;

use super::engine::DuelContext;
use super::events::{CombatEvent, EventSink};
use super::registry::{RangeClass, TraitKind};
use super::types::Side;
use crate::core::combat_math::*;
use crate::core::constants::CRIT_MULTIPLIER;

/// Damage of a single melee swing, before guardian absorption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SwingDamage {
    pub damage: i32,
    pub crit: bool,
    pub blocked: bool,
}

impl<R: Rng, S: EventSink> DuelContext<'_, R, S> {
    /// Roll whether `attacker` connects. A blinded attacker spends one blind
    /// stack on this roll whatever the result.
    pub(crate) fn roll_hit(&mut self, attacker: Side) -> bool {
        let (att, def) = self.pair_mut(attacker);
        let blinded = att.blind_stacks > 0;
        let dodge = dodge_chance(def.stats.agility, att.stats.agility, blinded);
        if blinded {
            att.blind_stacks -= 1;
        }
        !roll_dodge(dodge, &mut *self.rng)
    }

    /// Apply armor and shield block for damage aimed at `defender`.
    ///
    /// The block roll only happens when the defender holds a shield.
    pub(crate) fn reduce_damage(&mut self, defender: Side, damage: i32) -> (i32, bool) {
        let registry = self.registry;
        let target = self.fighter(defender);
        let armored = target.has_trait(TraitKind::Armored);
        let shield = target
            .held_weapon(registry)
            .filter(|w| w.range_class == RangeClass::Shield);
        let blocked = match shield {
            Some(w) => {
                let block = w.block_chance();
                self.chance(block)
            }
            None => false,
        };
        (
            apply_reduction(damage, reduction_percent(armored, blocked)),
            blocked,
        )
    }

    /// Full swing damage for `attacker` against its opponent.
    pub(crate) fn swing_damage(&mut self, attacker: Side) -> SwingDamage {
        let registry = self.registry;
        let att = self.fighter(attacker);
        let power = att.stats.power;
        let bonus = att.held_weapon(registry).map_or(0, |w| w.damage_bonus);
        let crit_p = crit_chance(att.has_trait(TraitKind::CriticalStrike));

        let mut damage = roll_base_damage(power, bonus, &mut *self.rng);
        let crit = roll_crit(crit_p, &mut *self.rng);
        if crit {
            damage *= CRIT_MULTIPLIER;
        }
        let (mut damage, blocked) = self.reduce_damage(attacker.opponent(), damage);
        if self.fighter(attacker).rage.active {
            damage = apply_rage_penalty(damage);
        }
        SwingDamage {
            damage,
            crit,
            blocked,
        }
    }

    /// Guardian shield soaks its share, the rest comes off HP.
    /// Returns the HP actually lost.
    pub(crate) fn land_damage(&mut self, defender: Side, damage: i32) -> i32 {
        let target = self.fighter_mut(defender);
        let absorbed = guardian_absorb(damage, target.guardian_hp);
        target.guardian_hp -= absorbed;
        let remaining = target.guardian_hp;
        let hp_damage = (damage - absorbed).max(0);
        target.take_damage(hp_damage);
        if absorbed > 0 {
            self.emit(CombatEvent::ShieldAbsorbed {
                side: defender,
                absorbed,
                remaining,
            });
        }
        hp_damage
    }

    /// Thorns return a share of HP damage to the attacker.
    pub(crate) fn reflect_thorns(&mut self, attacker: Side, hp_damage: i32) {
        let defender = attacker.opponent();
        if !self.fighter(defender).has_trait(TraitKind::Thorns) {
            return;
        }
        let reflected = thorns_reflection(hp_damage);
        if reflected > 0 {
            self.fighter_mut(attacker).take_damage(reflected);
            self.emit(CombatEvent::DamageReflected {
                from: defender,
                to: attacker,
                damage: reflected,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::registry::Registry;
    use crate::combat::types::{Combatant, CombatantProfile, Stats};
    use crate::test_support::{context as ctx, ScriptedRng};

    fn fighters(registry: &Registry, a_traits: &[&str], b_traits: &[&str]) -> [Combatant; 2] {
        let a = CombatantProfile::new(1, "a", Stats::new(20, 5, 10, 10)).with_traits(a_traits);
        let b = CombatantProfile::new(2, "b", Stats::new(20, 5, 10, 10)).with_traits(b_traits);
        [
            Combatant::from_profile(&a, registry).expect("valid"),
            Combatant::from_profile(&b, registry).expect("valid"),
        ]
    }

    #[test]
    fn test_roll_hit_consumes_blind_stack_on_miss_and_hit() {
        let registry = Registry::default();
        let mut f = fighters(&registry, &[], &[]);
        f[0].blind_stacks = 2;
        let mut rng = ScriptedRng::new(&[0.0, 0.99]);
        let mut sink = Vec::new();
        let mut c = ctx(f, &registry, &mut rng, &mut sink);
        assert!(!c.roll_hit(Side::A)); // 0.0 < dodge chance
        assert_eq!(c.fighter(Side::A).blind_stacks, 1);
        assert!(c.roll_hit(Side::A));
        assert_eq!(c.fighter(Side::A).blind_stacks, 0);
    }

    #[test]
    fn test_shield_block_halves_damage() {
        let registry = Registry::default();
        let base = fighters(&registry, &[], &[]);

        // Unblocked: defender has no shield, so no block roll
        let mut rng = ScriptedRng::constant(0.0);
        let mut sink = Vec::new();
        let mut c = ctx(base.clone(), &registry, &mut rng, &mut sink);
        let (unblocked, was_blocked) = c.reduce_damage(Side::B, 25);
        assert_eq!(unblocked, 25);
        assert!(!was_blocked);

        // Buckler (block 0.30) with a forced block roll
        let mut shielded = base;
        shielded[1].equipped = Some("buckler".to_string());
        let mut rng = ScriptedRng::constant(0.0);
        let mut sink = Vec::new();
        let mut c = ctx(shielded, &registry, &mut rng, &mut sink);
        let (blocked, was_blocked) = c.reduce_damage(Side::B, 25);
        assert!(was_blocked);
        assert_eq!(blocked, 25 / 2);
        assert_eq!(unblocked - blocked, 25 - 25 / 2);
    }

    #[test]
    fn test_failed_block_roll_takes_full_damage() {
        let registry = Registry::default();
        let mut f = fighters(&registry, &[], &[]);
        f[1].equipped = Some("buckler".to_string());
        let mut rng = ScriptedRng::constant(0.5);
        let mut sink = Vec::new();
        let mut c = ctx(f, &registry, &mut rng, &mut sink);
        assert_eq!(c.reduce_damage(Side::B, 25), (25, false));
    }

    #[test]
    fn test_armor_and_block_stack() {
        let registry = Registry::default();
        let mut f = fighters(&registry, &[], &["armored"]);
        f[1].equipped = Some("buckler".to_string());
        let mut rng = ScriptedRng::constant(0.0);
        let mut sink = Vec::new();
        let mut c = ctx(f, &registry, &mut rng, &mut sink);
        // 100 * (1 - 0.6)
        assert_eq!(c.reduce_damage(Side::B, 100).0, 40);
    }

    #[test]
    fn test_swing_damage_with_crit_and_weapon() {
        let registry = Registry::default();
        let mut f = fighters(&registry, &[], &[]);
        f[0].equipped = Some("axe".to_string());
        // d5 roll 0.5 -> 2, crit roll 0.05 < 0.10
        let mut rng = ScriptedRng::new(&[0.5, 0.05]);
        let mut sink = Vec::new();
        let mut c = ctx(f, &registry, &mut rng, &mut sink);
        let swing = c.swing_damage(Side::A);
        assert!(swing.crit);
        assert!(!swing.blocked);
        assert_eq!(swing.damage, (20 + 2 + 7) * 2);
    }

    #[test]
    fn test_critical_strike_trait_raises_crit_chance() {
        let registry = Registry::default();
        let f = fighters(&registry, &["critical_strike"], &[]);
        // crit roll of 0.2 only crits with the trait
        let mut rng = ScriptedRng::new(&[0.0, 0.2]);
        let mut sink = Vec::new();
        let mut c = ctx(f, &registry, &mut rng, &mut sink);
        let swing = c.swing_damage(Side::A);
        assert!(swing.crit);
        assert_eq!(swing.damage, 40);
    }

    #[test]
    fn test_rage_penalty_after_reduction() {
        let registry = Registry::default();
        let mut f = fighters(&registry, &[], &["armored"]);
        f[0].rage.active = true;
        let mut rng = ScriptedRng::new(&[0.0, 0.9]);
        let mut sink = Vec::new();
        let mut c = ctx(f, &registry, &mut rng, &mut sink);
        // 20 -> armor 18 -> rage 12
        assert_eq!(c.swing_damage(Side::A).damage, 12);
    }

    #[test]
    fn test_guardian_absorbs_before_hp() {
        let registry = Registry::default();
        let f = fighters(&registry, &[], &["guardian"]);
        let shield = f[1].guardian_hp;
        let hp = f[1].hp;
        let mut rng = ScriptedRng::constant(0.0);
        let mut sink = Vec::new();
        let mut c = ctx(f, &registry, &mut rng, &mut sink);
        let hp_damage = c.land_damage(Side::B, 100);
        assert_eq!(hp_damage, 85);
        assert_eq!(c.fighter(Side::B).hp, hp - 85);
        assert_eq!(c.fighter(Side::B).guardian_hp, shield - 15);
        assert_eq!(
            sink,
            vec![CombatEvent::ShieldAbsorbed {
                side: Side::B,
                absorbed: 15,
                remaining: shield - 15
            }]
        );
    }

    #[test]
    fn test_depleted_guardian_absorbs_only_remaining() {
        let registry = Registry::default();
        let mut f = fighters(&registry, &[], &["guardian"]);
        f[1].guardian_hp = 3;
        let mut rng = ScriptedRng::constant(0.0);
        let mut sink = Vec::new();
        let mut c = ctx(f, &registry, &mut rng, &mut sink);
        assert_eq!(c.land_damage(Side::B, 100), 97);
        assert_eq!(c.fighter(Side::B).guardian_hp, 0);
        assert_eq!(c.land_damage(Side::B, 100), 100);
    }

    #[test]
    fn test_thorns_reflect_to_attacker() {
        let registry = Registry::default();
        let f = fighters(&registry, &[], &["thorns"]);
        let hp = f[0].hp;
        let mut rng = ScriptedRng::constant(0.0);
        let mut sink = Vec::new();
        let mut c = ctx(f, &registry, &mut rng, &mut sink);
        c.reflect_thorns(Side::A, 40);
        assert_eq!(c.fighter(Side::A).hp, hp - 4);
        assert_eq!(
            sink,
            vec![CombatEvent::DamageReflected {
                from: Side::B,
                to: Side::A,
                damage: 4
            }]
        );
    }
}
