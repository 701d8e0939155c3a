//! Discrete outcome events emitted while a duel resolves.
//!
//! Events are a pure side channel: the engine makes the same decisions and
//! consumes the same random draws whether or not anyone is listening.

use serde::{Deserialize, Serialize};

use super::registry::CompanionKind;
use super::types::Side;

/// What a counter-attack was triggered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterTrigger {
    /// Short weapon swung at a long weapon
    Range,
    /// The counter-attack trait fired
    Reactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SabotageEffect {
    Disarmed { weapon: String },
    Swapped { from: Option<String>, to: String },
    Struck { damage: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    /// A stunned combatant lost its turn.
    TurnSkipped { side: Side },
    WeaponDrawn { side: Side, weapon: String },
    /// Thrown weapons leave play whether they hit or not.
    WeaponThrown {
        attacker: Side,
        weapon: String,
        hit: bool,
        damage: i32,
    },
    Attack {
        attacker: Side,
        defender: Side,
        damage: i32,
        crit: bool,
        blocked: bool,
    },
    Dodge { attacker: Side, defender: Side },
    CounterAttack {
        attacker: Side,
        defender: Side,
        damage: i32,
        trigger: CounterTrigger,
    },
    /// Guardian shield soaked part of a hit.
    ShieldAbsorbed {
        side: Side,
        absorbed: i32,
        remaining: i32,
    },
    DamageReflected { from: Side, to: Side, damage: i32 },
    WeaponDropped { side: Side, weapon: String },
    WeaponStolen { from: Side, to: Side, weapon: String },
    Stunned { side: Side },
    RageActivated { side: Side },
    Blinded { side: Side, stacks: u32 },
    CompanionStrike {
        owner: Side,
        companion: CompanionKind,
        damage: i32,
    },
    Sabotage { owner: Side, effect: SabotageEffect },
    Death { side: Side },
}

/// Receives events as the duel resolves.
pub trait EventSink {
    fn emit(&mut self, event: CombatEvent);
}

/// Discards every event. Used for batch and predictive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: CombatEvent) {}
}

impl EventSink for Vec<CombatEvent> {
    fn emit(&mut self, event: CombatEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: CombatEvent) {
        (**self).emit(event);
    }
}
