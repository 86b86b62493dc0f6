use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::{
    codec::encode_roll_result,
    protocol::{DiceRequest, DiceRoll, ServiceKind},
};
use tracing::debug;

use crate::serve::{Step, Worker};

/// Owns the only random source in the system.
#[derive(Debug)]
pub struct DiceWorker<R = StdRng> {
    rng: R,
}

impl DiceWorker<StdRng> {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> DiceWorker<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Uniform in `1..=faces` (a zero-faced die rolls 0), then the modifier is
    /// applied as-is: results below 1 or above `faces` are kept.
    pub fn roll(&mut self, roll: DiceRoll) -> i64 {
        let base = match roll.faces() {
            0 => 0,
            faces => i64::from(self.rng.gen_range(1..=faces)),
        };
        match roll.modifier() {
            Some(modifier) => modifier.operator.apply(base, modifier.value),
            None => base,
        }
    }
}

impl<R: Rng + Send> Worker for DiceWorker<R> {
    type Request = DiceRequest;

    fn kind(&self) -> ServiceKind {
        ServiceKind::Dice
    }

    fn handle(&mut self, request: DiceRequest) -> Step {
        match request {
            DiceRequest::Roll(roll) => {
                let result = self.roll(roll);
                debug!(faces = roll.faces(), result, "rolled");
                Step::Reply(encode_roll_result(result))
            }
            DiceRequest::Shutdown => Step::Shutdown(Vec::new()),
        }
    }
}

#[cfg(test)]
#[path = "tests/dice_tests.rs"]
mod tests;
