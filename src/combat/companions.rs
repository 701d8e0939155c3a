//! Secondary-meter actions for companion traits.

use rand::Rng;

use super::engine::DuelContext;
use super::events::{CombatEvent, EventSink, SabotageEffect};
use super::registry::CompanionKind;
use super::types::Side;
use crate::core::constants::*;

impl<R: Rng, S: EventSink> DuelContext<'_, R, S> {
    /// Resolve one full companion meter for `owner`.
    pub(crate) fn companion_act(&mut self, owner: Side, kind: CompanionKind) {
        tracing::trace!(%owner, %kind, "companion acts");
        match kind {
            CompanionKind::Sidekick => self.sidekick_strike(owner),
            CompanionKind::Swarm => self.swarm_strike(owner),
            CompanionKind::Saboteur => self.sabotage(owner),
        }
    }

    /// `base + roll(0..sides)` through reduction. No dodge check.
    fn flat_damage(&mut self, target: Side, (base, sides): (i32, u32)) -> i32 {
        let raw = base + self.roll_die(sides);
        self.reduce_damage(target, raw).0
    }

    fn sidekick_strike(&mut self, owner: Side) {
        let target = owner.opponent();
        let damage = self.flat_damage(target, SIDEKICK_DAMAGE);
        self.emit(CombatEvent::CompanionStrike {
            owner,
            companion: CompanionKind::Sidekick,
            damage,
        });
        self.land_damage(target, damage);
        self.after_attack(owner, target, damage > 0, true);
    }

    fn swarm_strike(&mut self, owner: Side) {
        let target = owner.opponent();
        let damage = self.flat_damage(target, SWARM_DAMAGE);
        self.emit(CombatEvent::CompanionStrike {
            owner,
            companion: CompanionKind::Swarm,
            damage,
        });
        self.land_damage(target, damage);
        if self.is_over() {
            return;
        }
        if self.chance(SWARM_BLIND_CHANCE) {
            let victim = self.fighter_mut(target);
            victim.blind_stacks += 1;
            let stacks = victim.blind_stacks;
            self.emit(CombatEvent::Blinded {
                side: target,
                stacks,
            });
        }
        self.after_attack(owner, target, damage > 0, true);
    }

    /// Disarm a held weapon (50%), otherwise swap in a random pack weapon,
    /// otherwise take a small swipe at the target.
    fn sabotage(&mut self, owner: Side) {
        let target = owner.opponent();

        if self.fighter(target).equipped.is_some() && self.chance(SABOTAGE_DISARM_CHANCE) {
            if let Some(weapon) = self.fighter_mut(target).sheathe() {
                self.emit(CombatEvent::Sabotage {
                    owner,
                    effect: SabotageEffect::Disarmed { weapon },
                });
            }
            self.after_attack(owner, target, false, true);
            return;
        }

        let pack = self.fighter(target).inventory.len();
        if pack > 0 {
            let index = self.pick_index(pack);
            let from = self.fighter(target).equipped.clone();
            if let Some(to) = self.fighter_mut(target).equip_from_inventory(index) {
                self.emit(CombatEvent::Sabotage {
                    owner,
                    effect: SabotageEffect::Swapped { from, to },
                });
            }
            self.after_attack(owner, target, false, true);
            return;
        }

        let damage = self.flat_damage(target, SABOTAGE_FALLBACK_DAMAGE);
        self.emit(CombatEvent::Sabotage {
            owner,
            effect: SabotageEffect::Struck { damage },
        });
        self.land_damage(target, damage);
        self.after_attack(owner, target, damage > 0, true);
    }
}
