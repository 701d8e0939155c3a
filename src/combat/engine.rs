//! Combat loop: drives scheduler, resolver and handlers until someone falls.
//!
//! One duel is a plain sequential state machine. [`Duel::run`] takes the RNG
//! and an [`EventSink`] from the caller, so the same loop serves animated
//! playback (record every event), batch runs ([`NullSink`]) and tests
//! (scripted RNG).

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::DuelError;
use super::events::{CombatEvent, EventSink, NullSink};
use super::registry::Registry;
use super::scheduler::{self, MeterKind};
use super::types::{Combatant, CombatantProfile, Side};
use crate::core::combat_math;
use crate::core::constants::*;

/// How a duel treats its safety cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelMode {
    /// The cap should never be reached; hitting it is logged as an error.
    Exact,
    /// Batch/predictive runs where hitting the cap is an expected fallback.
    Approximate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelConfig {
    /// Maximum resolved meters before the duel is called on HP.
    pub safety_cap: u32,
    pub mode: DuelMode,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            safety_cap: EXACT_SAFETY_CAP,
            mode: DuelMode::Exact,
        }
    }
}

impl DuelConfig {
    pub fn approximate(safety_cap: u32) -> Self {
        Self {
            safety_cap,
            mode: DuelMode::Approximate,
        }
    }
}

/// Final result of one duel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelOutcome {
    pub winner: Side,
    pub loser: Side,
    pub winner_id: u64,
    pub loser_id: u64,
    /// Reported HP per side (index 0 = A), clamped at zero.
    pub final_hp: [i32; 2],
    /// Number of meters resolved.
    pub resolutions: u32,
    /// The safety cap ended the duel and the winner was chosen on HP.
    pub capped: bool,
    /// End-of-duel snapshot of both combatants.
    pub combatants: [Combatant; 2],
}

impl DuelOutcome {
    pub fn combatant(&self, side: Side) -> &Combatant {
        &self.combatants[side.index()]
    }

    pub fn winner_hp(&self) -> i32 {
        self.final_hp[self.winner.index()]
    }

    pub fn loser_hp(&self) -> i32 {
        self.final_hp[self.loser.index()]
    }
}

/// Mutable state threaded through every resolution step of a running duel.
pub(crate) struct DuelContext<'a, R: Rng, S: EventSink> {
    pub(crate) fighters: [Combatant; 2],
    pub(crate) registry: &'a Registry,
    pub(crate) rng: &'a mut R,
    pub(crate) sink: &'a mut S,
}

impl<R: Rng, S: EventSink> DuelContext<'_, R, S> {
    pub(crate) fn fighter(&self, side: Side) -> &Combatant {
        &self.fighters[side.index()]
    }

    pub(crate) fn fighter_mut(&mut self, side: Side) -> &mut Combatant {
        &mut self.fighters[side.index()]
    }

    /// Mutable access to both fighters, `side` first.
    pub(crate) fn pair_mut(&mut self, side: Side) -> (&mut Combatant, &mut Combatant) {
        let [a, b] = &mut self.fighters;
        match side {
            Side::A => (a, b),
            Side::B => (b, a),
        }
    }

    /// Once either fighter is down nothing else resolves.
    pub(crate) fn is_over(&self) -> bool {
        self.fighters.iter().any(|f| !f.is_alive())
    }

    pub(crate) fn emit(&mut self, event: CombatEvent) {
        self.sink.emit(event);
    }

    pub(crate) fn chance(&mut self, p: f64) -> bool {
        combat_math::chance(p, &mut *self.rng)
    }

    pub(crate) fn roll_die(&mut self, sides: u32) -> i32 {
        combat_math::roll_die(sides, &mut *self.rng)
    }

    pub(crate) fn pick_index(&mut self, len: usize) -> usize {
        combat_math::pick_index(len, &mut *self.rng)
    }
}

/// A validated duel, ready to run.
#[derive(Debug, Clone)]
pub struct Duel<'r> {
    fighters: [Combatant; 2],
    registry: &'r Registry,
    config: DuelConfig,
}

impl<'r> Duel<'r> {
    /// Build both combatants from their profiles and validate the matchup.
    pub fn new(
        a: &CombatantProfile,
        b: &CombatantProfile,
        registry: &'r Registry,
    ) -> Result<Self, DuelError> {
        let a = Combatant::from_profile(a, registry)?;
        let b = Combatant::from_profile(b, registry)?;
        Self::from_combatants(a, b, registry)
    }

    /// Start from already-built combatants, e.g. a mid-fight snapshot.
    ///
    /// Runs the same checks as [`Duel::new`] since the fields are public.
    pub fn from_combatants(
        a: Combatant,
        b: Combatant,
        registry: &'r Registry,
    ) -> Result<Self, DuelError> {
        registry.validate()?;
        a.validate()?;
        b.validate()?;
        if a.id == b.id {
            return Err(DuelError::DuplicateCombatant { id: a.id });
        }
        if a.stats.speed == 0 && b.stats.speed == 0 {
            return Err(DuelError::Immobile);
        }
        Ok(Self {
            fighters: [a, b],
            registry,
            config: DuelConfig::default(),
        })
    }

    pub fn with_config(mut self, config: DuelConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the duel to completion.
    pub fn run<R: Rng, S: EventSink>(self, rng: &mut R, sink: &mut S) -> DuelOutcome {
        let config = self.config;
        let mut ctx = DuelContext {
            fighters: self.fighters,
            registry: self.registry,
            rng,
            sink,
        };

        tracing::debug!(
            a = ctx.fighters[0].id,
            b = ctx.fighters[1].id,
            a_hp = ctx.fighters[0].hp,
            b_hp = ctx.fighters[1].hp,
            "duel started"
        );

        let mut resolutions = 0u32;
        let capped = loop {
            if ctx.is_over() {
                break false;
            }
            if resolutions >= config.safety_cap {
                match config.mode {
                    DuelMode::Exact => tracing::error!(
                        cap = config.safety_cap,
                        "exact duel hit its safety cap; deciding on HP"
                    ),
                    DuelMode::Approximate => {
                        tracing::debug!(cap = config.safety_cap, "duel capped; deciding on HP")
                    }
                }
                break true;
            }
            let Some(ready) = scheduler::next_ready(&mut ctx.fighters, ctx.registry) else {
                tracing::error!("no meter can fill; deciding on HP");
                break true;
            };
            scheduler::drain(&mut ctx.fighters, ready);
            resolutions += 1;
            tracing::debug!(side = %ready.side, meter = ?ready.meter, resolutions, "meter resolved");

            match ready.meter {
                MeterKind::Primary => {
                    let actor = ctx.fighter_mut(ready.side);
                    if actor.stunned {
                        actor.stunned = false;
                        ctx.emit(CombatEvent::TurnSkipped { side: ready.side });
                    } else {
                        ctx.take_turn(ready.side);
                    }
                }
                MeterKind::Companion(kind) => ctx.companion_act(ready.side, kind),
            }
        };

        // Greater HP wins; on a tie A wins. Without the cap exactly one side is down.
        let winner = if ctx.fighters[1].hp > ctx.fighters[0].hp {
            Side::B
        } else {
            Side::A
        };
        let loser = winner.opponent();
        if !ctx.fighter(loser).is_alive() {
            ctx.emit(CombatEvent::Death { side: loser });
        }

        let fighters = ctx.fighters;
        tracing::debug!(
            winner = fighters[winner.index()].id,
            resolutions,
            capped,
            "duel finished"
        );

        DuelOutcome {
            winner,
            loser,
            winner_id: fighters[winner.index()].id,
            loser_id: fighters[loser.index()].id,
            final_hp: [fighters[0].reported_hp(), fighters[1].reported_hp()],
            resolutions,
            capped,
            combatants: fighters,
        }
    }
}

/// Resolve a duel and return only the outcome.
pub fn resolve_duel<R: Rng>(
    a: &CombatantProfile,
    b: &CombatantProfile,
    registry: &Registry,
    rng: &mut R,
) -> Result<DuelOutcome, DuelError> {
    Ok(Duel::new(a, b, registry)?.run(rng, &mut NullSink))
}

/// Resolve a duel and return the outcome plus every event in order.
pub fn resolve_duel_with_events<R: Rng>(
    a: &CombatantProfile,
    b: &CombatantProfile,
    registry: &Registry,
    rng: &mut R,
) -> Result<(DuelOutcome, Vec<CombatEvent>), DuelError> {
    let mut events = Vec::new();
    let outcome = Duel::new(a, b, registry)?.run(rng, &mut events);
    Ok((outcome, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::registry::{RangeClass, WeaponDef};
    use crate::combat::types::Stats;
    use crate::test_support::ScriptedRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn plain(id: u64, power: u32, vitality: u32, agility: u32, speed: u32) -> CombatantProfile {
        CombatantProfile::new(id, "mob", Stats::new(power, vitality, agility, speed))
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let registry = Registry::default();
        let a = plain(1, 5, 5, 5, 5);
        assert!(matches!(
            Duel::new(&a, &a, &registry),
            Err(DuelError::DuplicateCombatant { id: 1 })
        ));
    }

    #[test]
    fn test_immobile_matchup_rejected() {
        let registry = Registry::default();
        let result = Duel::new(&plain(1, 5, 5, 5, 0), &plain(2, 5, 5, 5, 0), &registry);
        assert!(matches!(result, Err(DuelError::Immobile)));
    }

    #[test]
    fn test_snapshot_start_is_validated() {
        let registry = Registry::default();
        let mut a = Combatant::from_profile(&plain(1, 5, 5, 5, 5).with_weapons(&["axe"]), &registry)
            .expect("valid");
        let b = Combatant::from_profile(&plain(2, 5, 5, 5, 5), &registry).expect("valid");
        a.equipped = Some("axe".to_string());
        assert!(matches!(
            Duel::from_combatants(a.clone(), b.clone(), &registry),
            Err(DuelError::WeaponHeldAndStored { id: 1, .. })
        ));

        a.inventory.clear();
        a.stats.power = MAX_STAT + 1;
        assert!(matches!(
            Duel::from_combatants(a.clone(), b.clone(), &registry),
            Err(DuelError::StatOutOfRange { id: 1, stat: "power", .. })
        ));

        a.stats.power = 5;
        let bad = Registry::empty().with_weapon("doom", WeaponDef::new(30_000_000, RangeClass::Short));
        assert!(matches!(
            Duel::from_combatants(a, b, &bad),
            Err(DuelError::InvalidBonus { .. })
        ));
    }

    #[test]
    fn test_oversized_bonus_fails_before_the_loop() {
        let registry = Registry::from_json(
            r#"{ "weapons": { "doom": { "damage_bonus": 30000000, "range_class": "short" } } }"#,
        );
        assert!(matches!(registry, Err(DuelError::InvalidBonus { .. })));

        let mut registry = Registry::default();
        registry.weapons.insert(
            "doom".to_string(),
            WeaponDef::new(30_000_000, RangeClass::Short),
        );
        let a = plain(1, 5, 5, 5, 5).with_weapons(&["doom"]);
        let b = plain(2, 5, 5, 5, 5);
        assert!(matches!(
            resolve_duel(&a, &b, &registry, &mut ChaCha8Rng::seed_from_u64(1)),
            Err(DuelError::InvalidBonus { .. })
        ));
    }

    #[test]
    fn test_guaranteed_win() {
        let registry = Registry::default();
        let a = plain(1, 9999, 10, 0, 50);
        let b = plain(2, 0, 1, 0, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let outcome = resolve_duel(&a, &b, &registry, &mut rng).expect("valid duel");
        assert_eq!(outcome.winner, Side::A);
        assert_eq!(outcome.winner_id, 1);
        assert_eq!(outcome.final_hp[1], 0);
        assert_eq!(outcome.final_hp[0], 200);
        assert!(!outcome.capped);
        assert!(outcome.resolutions < 50);
    }

    #[test]
    fn test_mirror_match_is_deterministic_per_seed() {
        let registry = Registry::default();
        let a = plain(1, 12, 8, 10, 10);
        let b = plain(2, 12, 8, 10, 10);
        for seed in 0..20 {
            let (first, first_events) = resolve_duel_with_events(
                &a,
                &b,
                &registry,
                &mut ChaCha8Rng::seed_from_u64(seed),
            )
            .expect("valid duel");
            let (second, second_events) = resolve_duel_with_events(
                &a,
                &b,
                &registry,
                &mut ChaCha8Rng::seed_from_u64(seed),
            )
            .expect("valid duel");
            assert_eq!(first.winner, second.winner);
            assert_eq!(first.final_hp, second.final_hp);
            assert_eq!(first_events, second_events);
        }
    }

    #[test]
    fn test_event_recording_does_not_change_outcome() {
        let registry = Registry::default();
        let a = plain(1, 10, 5, 6, 9).with_traits(&["rage", "swarm"]).with_weapons(&["sword"]);
        let b = plain(2, 9, 6, 8, 8)
            .with_traits(&["counter_attack", "guardian"])
            .with_weapons(&["spear", "buckler"]);
        for seed in 0..20 {
            let quiet = resolve_duel(&a, &b, &registry, &mut ChaCha8Rng::seed_from_u64(seed))
                .expect("valid duel");
            let (loud, _) =
                resolve_duel_with_events(&a, &b, &registry, &mut ChaCha8Rng::seed_from_u64(seed))
                    .expect("valid duel");
            assert_eq!(quiet, loud);
        }
    }

    #[test]
    fn test_exactly_one_survivor() {
        let registry = Registry::default();
        let a = plain(1, 8, 3, 5, 7).with_traits(&["thorns", "sidekick"]);
        let b = plain(2, 7, 4, 6, 6).with_traits(&["armored", "saboteur"]);
        for seed in 0..50 {
            let outcome = resolve_duel(&a, &b, &registry, &mut ChaCha8Rng::seed_from_u64(seed))
                .expect("valid duel");
            assert!(!outcome.capped);
            assert!(outcome.winner_hp() > 0);
            assert_eq!(outcome.loser_hp(), 0);
            assert_ne!(outcome.winner, outcome.loser);
        }
    }

    #[test]
    fn test_death_event_is_last() {
        let registry = Registry::default();
        let (outcome, events) = resolve_duel_with_events(
            &plain(1, 20, 2, 5, 10),
            &plain(2, 20, 2, 5, 10),
            &registry,
            &mut ChaCha8Rng::seed_from_u64(3),
        )
        .expect("valid duel");
        assert_eq!(
            events.last(),
            Some(&CombatEvent::Death {
                side: outcome.loser
            })
        );
        let deaths = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::Death { .. }))
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_cap_decides_on_hp() {
        let registry = Registry::default();
        // Zero power on both sides still chips with the d5, so a tiny cap is
        // what ends this one.
        let a = plain(1, 0, 100, 0, 10);
        let b = plain(2, 0, 50, 0, 10);
        let outcome = Duel::new(&a, &b, &registry)
            .expect("valid duel")
            .with_config(DuelConfig::approximate(4))
            .run(&mut ChaCha8Rng::seed_from_u64(1), &mut NullSink);
        assert!(outcome.capped);
        assert_eq!(outcome.resolutions, 4);
        // A started with 1100 HP vs 600 and four swings cannot close the gap
        assert_eq!(outcome.winner, Side::A);
    }

    #[test]
    fn test_cap_tie_goes_to_a() {
        let registry = Registry::default();
        let a = plain(1, 5, 5, 5, 5);
        let b = plain(2, 5, 5, 5, 5);
        let outcome = Duel::new(&a, &b, &registry)
            .expect("valid duel")
            .with_config(DuelConfig::approximate(0))
            .run(&mut ChaCha8Rng::seed_from_u64(1), &mut NullSink);
        assert!(outcome.capped);
        assert_eq!(outcome.resolutions, 0);
        assert_eq!(outcome.winner, Side::A);
    }

    #[test]
    fn test_stunned_turn_is_skipped() {
        let registry = Registry::default();
        let mut a = Combatant::from_profile(&plain(1, 10, 5, 5, 10), &registry).expect("valid");
        let b = Combatant::from_profile(&plain(2, 10, 5, 5, 1), &registry).expect("valid");
        a.stunned = true;
        let mut events = Vec::new();
        // Cap of one: only A's first primary turn resolves
        let outcome = Duel::from_combatants(a, b, &registry)
            .expect("valid duel")
            .with_config(DuelConfig::approximate(1))
            .run(&mut ScriptedRng::constant(0.0), &mut events);
        assert_eq!(events, vec![CombatEvent::TurnSkipped { side: Side::A }]);
        let a_after = outcome.combatant(Side::A);
        assert!(!a_after.stunned);
        assert!(a_after.meter < METER_THRESHOLD);
        assert!((a_after.meter - 0.0).abs() < 1e-9);
    }
}
