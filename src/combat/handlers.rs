//! Reactive rules that run after every attack, hit or miss, and the
//! counter-attack routine they can trigger.

use rand::Rng;

use super::engine::DuelContext;
use super::events::{CombatEvent, CounterTrigger, EventSink};
use super::registry::TraitKind;
use super::types::Side;
use crate::core::constants::*;

impl<R: Rng, S: EventSink> DuelContext<'_, R, S> {
    /// Status handlers for an attack by `source` on `victim`.
    ///
    /// `hit` is whether damage landed. `allow_counter` is false while
    /// resolving a counter-attack so counters never chain.
    pub(crate) fn after_attack(&mut self, source: Side, victim: Side, hit: bool, allow_counter: bool) {
        if self.is_over() {
            return;
        }
        self.steal_weapon(source, victim);
        self.stack_rage(source, victim, hit);

        if allow_counter
            && self.fighter(victim).has_trait(TraitKind::CounterAttack)
            && self.chance(REACTIVE_COUNTER_CHANCE)
        {
            self.counter_attack(victim, source, CounterTrigger::Reactive);
        }
    }

    /// An unarmed victim snatches the weapon out of the source's hand.
    fn steal_weapon(&mut self, source: Side, victim: Side) {
        let (src, vic) = self.pair_mut(source);
        if vic.equipped.is_some() {
            return;
        }
        let Some(weapon) = src.equipped.take() else {
            return;
        };
        vic.equipped = Some(weapon.clone());
        self.emit(CombatEvent::WeaponStolen {
            from: source,
            to: victim,
            weapon,
        });
    }

    fn stack_rage(&mut self, source: Side, victim: Side, hit: bool) {
        if !hit {
            return;
        }
        let (src, vic) = self.pair_mut(source);
        src.rage.hits_taken = 0;
        if !vic.has_trait(TraitKind::Rage) {
            return;
        }
        vic.rage.hits_taken += 1;
        if vic.rage.hits_taken >= RAGE_HITS_TO_TRIGGER && !vic.rage.active {
            vic.rage.active = true;
            tracing::debug!(combatant = vic.id, "rage activated");
            self.emit(CombatEvent::RageActivated { side: victim });
        }
    }

    /// Raw power through reduction only, straight onto HP: no dodge, no crit,
    /// no rage penalty, no guardian shield.
    pub(crate) fn counter_attack(&mut self, counterer: Side, target: Side, trigger: CounterTrigger) {
        let power = self.fighter(counterer).stats.power as i32;
        let (damage, _) = self.reduce_damage(target, power);
        self.emit(CombatEvent::CounterAttack {
            attacker: counterer,
            defender: target,
            damage,
            trigger,
        });
        self.fighter_mut(target).take_damage(damage);
        if self.is_over() {
            return;
        }
        self.after_attack(counterer, target, damage > 0, false);
    }
}
