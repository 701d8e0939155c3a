use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use super::error::DuelError;
use super::registry::{CompanionKind, Registry, TraitKind, WeaponDef};
use crate::core::combat_math::max_hp_for_vitality;
use crate::core::constants::*;

/// One of the two seats in a duel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatKind {
    Power,
    Vitality,
    Agility,
    Speed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub power: u32,
    pub vitality: u32,
    pub agility: u32,
    pub speed: u32,
}

impl Stats {
    pub fn new(power: u32, vitality: u32, agility: u32, speed: u32) -> Self {
        Self {
            power,
            vitality,
            agility,
            speed,
        }
    }

    /// Every stat must stay at or below `MAX_STAT` so HP math fits in `i32`.
    pub fn check_range(&self, id: u64) -> Result<(), DuelError> {
        let checks = [
            ("power", self.power),
            ("vitality", self.vitality),
            ("agility", self.agility),
            ("speed", self.speed),
        ];
        for (stat, value) in checks {
            if value > MAX_STAT {
                return Err(DuelError::StatOutOfRange {
                    id,
                    stat,
                    value,
                    max: MAX_STAT,
                });
            }
        }
        Ok(())
    }
}

/// A fighter as it is stored between duels.
///
/// Trait and weapon names are free-form strings here; they are resolved
/// against the registry when the duel starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantProfile {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub stats: Stats,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub weapons: Vec<String>,
}

impl CombatantProfile {
    pub fn new(id: u64, name: &str, stats: Stats) -> Self {
        Self {
            id,
            name: name.to_string(),
            stats,
            traits: Vec::new(),
            weapons: Vec::new(),
        }
    }

    pub fn with_traits(mut self, traits: &[&str]) -> Self {
        self.traits = traits.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_weapons(mut self, weapons: &[&str]) -> Self {
        self.weapons = weapons.iter().map(|w| w.to_string()).collect();
        self
    }
}

/// Rage stacking state. `active` never goes back to false within a duel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RageState {
    pub active: bool,
    pub hits_taken: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompanionMeter {
    pub kind: CompanionKind,
    pub value: f64,
}

/// Per-duel fighter state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: u64,
    pub name: String,
    pub stats: Stats,
    pub max_hp: i32,
    /// May dip below zero on the killing blow; reported as 0.
    pub hp: i32,
    pub traits: BTreeSet<TraitKind>,
    /// Weapons owned but not held.
    pub inventory: Vec<String>,
    pub equipped: Option<String>,
    pub stunned: bool,
    pub rage: RageState,
    pub blind_stacks: u32,
    pub guardian_hp: i32,
    pub meter: f64,
    /// Sorted by companion priority.
    pub companion_meters: Vec<CompanionMeter>,
}

impl Combatant {
    /// Build fresh duel state from a profile: full HP, weapons sheathed,
    /// counters zeroed.
    ///
    /// Unknown traits and weapons are dropped rather than rejected.
    pub fn from_profile(profile: &CombatantProfile, registry: &Registry) -> Result<Self, DuelError> {
        let stats = profile.stats;
        stats.check_range(profile.id)?;

        let mut traits = BTreeSet::new();
        for name in &profile.traits {
            match TraitKind::from_str(name) {
                Ok(kind) if registry.knows_trait(kind) => {
                    traits.insert(kind);
                }
                Ok(kind) => {
                    tracing::warn!(combatant = profile.id, %kind, "trait not in registry, ignoring");
                }
                Err(_) => {
                    tracing::warn!(combatant = profile.id, name = %name, "unknown trait, ignoring");
                }
            }
        }

        let inventory: Vec<String> = profile
            .weapons
            .iter()
            .filter(|w| {
                let known = registry.weapon(w).is_some();
                if !known {
                    tracing::warn!(combatant = profile.id, weapon = %w, "unknown weapon, ignoring");
                }
                known
            })
            .cloned()
            .collect();

        let companion_meters = traits
            .iter()
            .filter_map(|t| t.companion())
            .map(|kind| CompanionMeter { kind, value: 0.0 })
            .collect();

        let max_hp = max_hp_for_vitality(stats.vitality);
        let guardian_hp = if traits.contains(&TraitKind::Guardian) {
            max_hp * GUARDIAN_SHIELD_PERCENT / 100
        } else {
            0
        };

        Ok(Self {
            id: profile.id,
            name: profile.name.clone(),
            stats,
            max_hp,
            hp: max_hp,
            traits,
            inventory,
            equipped: None,
            stunned: false,
            rage: RageState::default(),
            blind_stacks: 0,
            guardian_hp,
            meter: 0.0,
            companion_meters,
        })
    }

    /// Checks for state built by hand rather than through `from_profile`.
    pub fn validate(&self) -> Result<(), DuelError> {
        self.stats.check_range(self.id)?;
        if let Some(held) = &self.equipped {
            if self.inventory.contains(held) {
                return Err(DuelError::WeaponHeldAndStored {
                    id: self.id,
                    weapon: held.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn has_trait(&self, kind: TraitKind) -> bool {
        self.traits.contains(&kind)
    }

    /// HP reported to callers, never below zero.
    pub fn reported_hp(&self) -> i32 {
        self.hp.max(0)
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.hp -= amount.max(0);
    }

    /// Definition of the held weapon. Unknown names count as unarmed.
    pub fn held_weapon<'r>(&self, registry: &'r Registry) -> Option<&'r WeaponDef> {
        self.equipped.as_deref().and_then(|w| registry.weapon(w))
    }

    /// Weapons in play for this combatant, held or stored.
    pub fn weapon_count(&self) -> usize {
        self.inventory.len() + usize::from(self.equipped.is_some())
    }

    /// Move the held weapon back into the inventory.
    pub fn sheathe(&mut self) -> Option<String> {
        let weapon = self.equipped.take()?;
        self.inventory.push(weapon.clone());
        Some(weapon)
    }

    /// Take the inventory weapon at `index` into hand. Any held weapon goes
    /// back into the inventory first.
    pub fn equip_from_inventory(&mut self, index: usize) -> Option<String> {
        if index >= self.inventory.len() {
            return None;
        }
        let weapon = self.inventory.remove(index);
        if let Some(old) = self.equipped.replace(weapon.clone()) {
            self.inventory.push(old);
        }
        Some(weapon)
    }

    /// Remove the held weapon from play entirely.
    pub fn consume_equipped(&mut self) -> Option<String> {
        self.equipped.take()
    }

    /// Below 20% of max HP, used by the adrenaline speed burst.
    pub fn is_critically_wounded(&self) -> bool {
        (self.hp as f64) < self.max_hp as f64 * ADRENALINE_HP_FRACTION
    }
}
