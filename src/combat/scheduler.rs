//! Energy/turn scheduler.
//!
//! Every combatant has a primary action meter and one extra meter per
//! companion trait. Meters fill at a rate derived from speed; the first full
//! meter in fixed priority order is drained and resolved, one per loop
//! iteration. Priority: A primary, B primary, A companions, B companions.

use serde::{Deserialize, Serialize};

use super::registry::{CompanionKind, Registry, TraitKind};
use super::types::{Combatant, Side};
use crate::core::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeterKind {
    Primary,
    Companion(CompanionKind),
}

/// A meter at or above the threshold, ready to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyMeter {
    pub side: Side,
    pub meter: MeterKind,
}

/// Speed after buffs: doubled by adrenaline while under 20% HP.
pub fn effective_speed(combatant: &Combatant) -> f64 {
    let speed = combatant.stats.speed as f64;
    if combatant.has_trait(TraitKind::Adrenaline) && combatant.is_critically_wounded() {
        speed * ADRENALINE_SPEED_MULTIPLIER
    } else {
        speed
    }
}

/// Primary meter gain per tick.
pub fn primary_rate(combatant: &Combatant) -> f64 {
    effective_speed(combatant) / METER_SCALING_FACTOR
}

/// Companion meter gain per tick.
pub fn companion_rate(combatant: &Combatant, kind: CompanionKind, registry: &Registry) -> f64 {
    effective_speed(combatant) * registry.companion_multiplier(kind) / METER_SCALING_FACTOR
}

/// First full meter in priority order, without ticking.
pub fn find_ready(fighters: &[Combatant; 2]) -> Option<ReadyMeter> {
    for side in [Side::A, Side::B] {
        if fighters[side.index()].meter >= METER_THRESHOLD {
            return Some(ReadyMeter {
                side,
                meter: MeterKind::Primary,
            });
        }
    }
    for side in [Side::A, Side::B] {
        let ready = fighters[side.index()]
            .companion_meters
            .iter()
            .find(|m| m.value >= METER_THRESHOLD);
        if let Some(m) = ready {
            return Some(ReadyMeter {
                side,
                meter: MeterKind::Companion(m.kind),
            });
        }
    }
    None
}

/// Advance every meter by `ticks` ticks.
pub fn tick(fighters: &mut [Combatant; 2], registry: &Registry, ticks: f64) {
    for fighter in fighters.iter_mut() {
        fighter.meter += primary_rate(fighter) * ticks;
        let speed = effective_speed(fighter);
        for m in fighter.companion_meters.iter_mut() {
            m.value +=
                speed * registry.companion_multiplier(m.kind) / METER_SCALING_FACTOR * ticks;
        }
    }
}

/// Whole ticks until the soonest meter fills, `None` if nothing is moving.
fn ticks_until_ready(fighters: &[Combatant; 2], registry: &Registry) -> Option<f64> {
    let mut soonest: Option<f64> = None;
    let mut consider = |value: f64, rate: f64| {
        if rate > 0.0 {
            let needed = ((METER_THRESHOLD - value) / rate).ceil().max(1.0);
            soonest = Some(soonest.map_or(needed, |s: f64| s.min(needed)));
        }
    };
    for fighter in fighters {
        consider(fighter.meter, primary_rate(fighter));
        for m in &fighter.companion_meters {
            consider(m.value, companion_rate(fighter, m.kind, registry));
        }
    }
    soonest
}

/// Tick until some meter is full and return it.
///
/// Ticks are applied in one batch equal to the minimum number of whole ticks
/// any meter needs, which is the same as ticking one at a time. Returns
/// `None` only if no meter has a positive rate.
pub fn next_ready(fighters: &mut [Combatant; 2], registry: &Registry) -> Option<ReadyMeter> {
    loop {
        if let Some(ready) = find_ready(fighters) {
            return Some(ready);
        }
        let ticks = ticks_until_ready(fighters, registry)?;
        tick(fighters, registry, ticks);
    }
}

/// Subtract the threshold from the meter that acted, keeping any overflow.
pub fn drain(fighters: &mut [Combatant; 2], ready: ReadyMeter) {
    let fighter = &mut fighters[ready.side.index()];
    match ready.meter {
        MeterKind::Primary => fighter.meter -= METER_THRESHOLD,
        MeterKind::Companion(kind) => {
            if let Some(m) = fighter.companion_meters.iter_mut().find(|m| m.kind == kind) {
                m.value -= METER_THRESHOLD;
            }
        }
    }
}
