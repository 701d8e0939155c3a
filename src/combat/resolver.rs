//! Action resolver for a combatant whose primary meter filled.
//!
//! A turn is exactly one action: draw a weapon, throw the held weapon, or
//! attack (which a long-weapon defender may pre-empt with a range counter).

use rand::Rng;

use super::engine::DuelContext;
use super::events::{CombatEvent, CounterTrigger, EventSink};
use super::registry::RangeClass;
use super::types::Side;
use crate::core::combat_math::throw_damage;
use crate::core::constants::*;

impl<R: Rng, S: EventSink> DuelContext<'_, R, S> {
    /// Resolve one primary turn for `actor`. Stun is handled by the loop.
    pub(crate) fn take_turn(&mut self, actor: Side) {
        if self.try_draw(actor) {
            return;
        }
        if self.fighter(actor).equipped.is_some() && self.chance(THROW_CHANCE) {
            self.throw_weapon(actor);
            return;
        }
        if self.range_counter(actor) {
            return;
        }
        self.melee(actor);
    }

    /// Unarmed with something in the pack: 30% to pull a random weapon.
    fn try_draw(&mut self, actor: Side) -> bool {
        let fighter = self.fighter(actor);
        if fighter.equipped.is_some() || fighter.inventory.is_empty() {
            return false;
        }
        if !self.chance(DRAW_CHANCE) {
            return false;
        }
        let len = self.fighter(actor).inventory.len();
        let index = self.pick_index(len);
        if let Some(weapon) = self.fighter_mut(actor).equip_from_inventory(index) {
            self.emit(CombatEvent::WeaponDrawn {
                side: actor,
                weapon,
            });
        }
        true
    }

    /// The held weapon leaves play whether or not it connects.
    fn throw_weapon(&mut self, actor: Side) {
        let target = actor.opponent();
        let Some(weapon) = self.fighter_mut(actor).consume_equipped() else {
            return;
        };
        let bonus = self.registry.weapon_bonus(&weapon);
        let power = self.fighter(actor).stats.power;

        if !self.roll_hit(actor) {
            self.emit(CombatEvent::WeaponThrown {
                attacker: actor,
                weapon,
                hit: false,
                damage: 0,
            });
            self.after_attack(actor, target, false, true);
            return;
        }

        let (damage, _) = self.reduce_damage(target, throw_damage(power, bonus));
        self.emit(CombatEvent::WeaponThrown {
            attacker: actor,
            weapon,
            hit: true,
            damage,
        });
        let hp_damage = self.land_damage(target, damage);
        if self.is_over() {
            return;
        }
        self.reflect_thorns(actor, hp_damage);
        if self.is_over() {
            return;
        }
        self.after_attack(actor, target, true, true);
    }

    /// Short weapon against a long weapon: the defender may strike first and
    /// cancel the attack. Returns true if the counter fired.
    fn range_counter(&mut self, actor: Side) -> bool {
        let registry = self.registry;
        let target = actor.opponent();
        let attacker_weapon = self.fighter(actor).held_weapon(registry);
        let defender_weapon = self.fighter(target).held_weapon(registry);
        let counter_p = match (attacker_weapon, defender_weapon) {
            (Some(a), Some(d))
                if a.range_class == RangeClass::Short && d.range_class == RangeClass::Long =>
            {
                d.counter_chance()
            }
            _ => return false,
        };
        if !self.chance(counter_p) {
            return false;
        }
        self.counter_attack(target, actor, CounterTrigger::Range);
        true
    }

    /// One swing, two in rage mode.
    fn melee(&mut self, actor: Side) {
        let registry = self.registry;
        let target = actor.opponent();
        let swings = if self.fighter(actor).rage.active {
            RAGE_SWINGS
        } else {
            1
        };

        for _ in 0..swings {
            if self.is_over() {
                return;
            }
            let weapon = self.fighter(actor).held_weapon(registry);

            if !self.roll_hit(actor) {
                self.emit(CombatEvent::Dodge {
                    attacker: actor,
                    defender: target,
                });
                self.after_attack(actor, target, false, true);
                continue;
            }

            let swing = self.swing_damage(actor);
            self.emit(CombatEvent::Attack {
                attacker: actor,
                defender: target,
                damage: swing.damage,
                crit: swing.crit,
                blocked: swing.blocked,
            });
            let hp_damage = self.land_damage(target, swing.damage);
            if self.is_over() {
                return;
            }
            self.reflect_thorns(actor, hp_damage);
            if self.is_over() {
                return;
            }
            self.after_attack(actor, target, true, true);
            if self.is_over() {
                return;
            }

            self.check_durability(actor);

            if let Some(w) = weapon {
                let stun_p = w.stun_chance();
                if !self.fighter(actor).rage.active && stun_p > 0.0 && self.chance(stun_p) {
                    self.fighter_mut(target).stunned = true;
                    self.emit(CombatEvent::Stunned { side: target });
                }
            }
        }
    }

    /// Landed swings may shake the held weapon loose back into the pack.
    fn check_durability(&mut self, actor: Side) {
        let registry = self.registry;
        let Some(drop_p) = self
            .fighter(actor)
            .held_weapon(registry)
            .map(|w| w.range_class.drop_chance())
        else {
            return;
        };
        if self.chance(drop_p) {
            if let Some(weapon) = self.fighter_mut(actor).sheathe() {
                self.emit(CombatEvent::WeaponDropped {
                    side: actor,
                    weapon,
                });
            }
        }
    }
}
