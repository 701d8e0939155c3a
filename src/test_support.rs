//! Scripted random source for forcing exact combat rolls in unit tests.

use rand::RngCore;

use crate::combat::engine::DuelContext;
use crate::combat::events::CombatEvent;
use crate::combat::registry::Registry;
use crate::combat::types::Combatant;

/// Replays a fixed list of `[0, 1)` draws, cycling when it runs out.
///
/// The engine only ever draws `rng.gen::<f64>()`, which reads the top 53 bits
/// of `next_u64`, so each scripted value comes back out unchanged.
pub struct ScriptedRng {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(draws: &[f64]) -> Self {
        assert!(!draws.is_empty(), "ScriptedRng needs at least one draw");
        Self {
            draws: draws.to_vec(),
            cursor: 0,
        }
    }

    /// Every draw returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(&[value])
    }

    /// How many draws have been consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    fn next_draw(&mut self) -> f64 {
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        value
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let draw = self.next_draw().clamp(0.0, 1.0 - f64::EPSILON);
        ((draw * (1u64 << 53) as f64) as u64) << 11
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// A duel context over a scripted RNG that records every event.
pub(crate) fn context<'a>(
    fighters: [Combatant; 2],
    registry: &'a Registry,
    rng: &'a mut ScriptedRng,
    sink: &'a mut Vec<CombatEvent>,
) -> DuelContext<'a, ScriptedRng, Vec<CombatEvent>> {
    DuelContext {
        fighters,
        registry,
        rng,
        sink,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_scripted_draws_round_trip() {
        let mut rng = ScriptedRng::new(&[0.0, 0.25, 0.5, 0.75]);
        assert_eq!(rng.gen::<f64>(), 0.0);
        assert_eq!(rng.gen::<f64>(), 0.25);
        assert_eq!(rng.gen::<f64>(), 0.5);
        assert_eq!(rng.gen::<f64>(), 0.75);
        // Cycles back to the start
        assert_eq!(rng.gen::<f64>(), 0.0);
        assert_eq!(rng.consumed(), 5);
    }
}
