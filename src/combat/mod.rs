//! Duel engine: combatant model, registry tables and the combat loop.

mod companions;
pub mod engine;
pub mod error;
pub mod events;
mod handlers;
mod pipeline;
pub mod registry;
mod resolver;
pub mod scheduler;
pub mod types;

pub use engine::{resolve_duel, resolve_duel_with_events, Duel, DuelConfig, DuelMode, DuelOutcome};
pub use error::DuelError;
pub use events::{CombatEvent, CounterTrigger, EventSink, NullSink, SabotageEffect};
pub use registry::{
    CompanionKind, RangeClass, Registry, StatBonus, TraitDef, TraitKind, WeaponDef, WeaponEffects,
};
pub use scheduler::{MeterKind, ReadyMeter};
pub use types::{
    Combatant, CombatantProfile, CompanionMeter, RageState, Side, StatKind, Stats,
};
