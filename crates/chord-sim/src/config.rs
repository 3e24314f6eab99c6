//! Session configuration.

use chord_ring::{MAX_BITS, MIN_BITS};
use serde::Deserialize;

use crate::error::SimError;

/// Parameters for a new [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Initial ring parameter M.
    pub bits: u8,
    /// Largest M the session accepts.
    ///
    /// Defaults to 9, which keeps `2^M` small enough to draw. May be raised
    /// up to the algorithmic ceiling [`MAX_BITS`].
    pub max_bits: u8,
    /// Seed for random identifier selection. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            bits: 5,
            max_bits: 9,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Check that `max_bits` and `bits` are usable together.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(MIN_BITS..=MAX_BITS).contains(&self.max_bits) {
            return Err(SimError::Config(format!(
                "max_bits={} outside {MIN_BITS}..={MAX_BITS}",
                self.max_bits
            )));
        }
        if self.bits > self.max_bits {
            return Err(SimError::Config(format!(
                "bits={} exceeds max_bits={}",
                self.bits, self.max_bits
            )));
        }
        Ok(())
    }
}
