//! Error types for the simulation session.

use chord_ring::RingError;

/// Errors produced by a [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A ring operation failed; the session is unchanged.
    #[error(transparent)]
    Ring(#[from] RingError),

    /// The session configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}
