// Scheduler
pub const METER_THRESHOLD: f64 = 100.0;
pub const METER_SCALING_FACTOR: f64 = 10.0;
pub const ADRENALINE_HP_FRACTION: f64 = 0.20;
pub const ADRENALINE_SPEED_MULTIPLIER: f64 = 2.0;

// Companion meter multipliers relative to the owner's speed
pub const SIDEKICK_METER_MULTIPLIER: f64 = 0.4;
pub const SWARM_METER_MULTIPLIER: f64 = 1.5;
pub const SABOTEUR_METER_MULTIPLIER: f64 = 1.75;

// Combatant construction
pub const BASE_HP: i32 = 100;
pub const HP_PER_VITALITY: i32 = 10;
pub const MAX_STAT: u32 = 10_000;
pub const GUARDIAN_SHIELD_PERCENT: i32 = 25;

// Action resolver
pub const DRAW_CHANCE: f64 = 0.30;
pub const THROW_CHANCE: f64 = 0.20;
pub const THROW_DAMAGE_PERCENT: i32 = 105;
pub const DEFAULT_COUNTER_CHANCE: f64 = 0.25;
pub const RAGE_SWINGS: u32 = 2;

// Weapon durability: chance to lose grip after a landed swing
pub const DROP_CHANCE_SHORT: f64 = 0.05;
pub const DROP_CHANCE_LONG: f64 = 0.15;
pub const DROP_CHANCE_SHIELD: f64 = 0.10;

// Hit/damage pipeline
pub const DODGE_BASE_CHANCE: f64 = 0.10;
pub const DODGE_PER_AGILITY_POINT: f64 = 0.02;
pub const DODGE_FLOOR: f64 = 0.05;
pub const BLIND_AGILITY_PENALTY: i64 = 5;
pub const DAMAGE_VARIANCE_SIDES: u32 = 5; // 0..=4
pub const CRIT_CHANCE_BASE: f64 = 0.10;
pub const CRIT_CHANCE_TRAIT: f64 = 0.33;
pub const CRIT_MULTIPLIER: i32 = 2;
pub const ARMOR_REDUCTION_PERCENT: i32 = 10;
pub const SHIELD_BLOCK_PERCENT: i32 = 50;
pub const RAGE_DAMAGE_PERCENT: i32 = 70;
pub const GUARDIAN_ABSORB_PERCENT: i32 = 15;
pub const THORNS_REFLECT_PERCENT: i32 = 10;

// Status handlers
pub const RAGE_HITS_TO_TRIGGER: u32 = 3;
pub const REACTIVE_COUNTER_CHANCE: f64 = 0.10;

// Companion actions: (base, random sides)
pub const SIDEKICK_DAMAGE: (i32, u32) = (5, 5);
pub const SWARM_DAMAGE: (i32, u32) = (2, 2);
pub const SABOTAGE_FALLBACK_DAMAGE: (i32, u32) = (2, 2);
pub const SWARM_BLIND_CHANCE: f64 = 0.30;
pub const SABOTAGE_DISARM_CHANCE: f64 = 0.50;

// Loop caps
pub const EXACT_SAFETY_CAP: u32 = 100_000;
pub const PREDICTOR_SAFETY_CAP: u32 = 1_000;
pub const DEFAULT_PREDICTOR_TRIALS: u32 = 200;
