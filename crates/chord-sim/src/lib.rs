//! Chord simulation session.
//!
//! This crate provides:
//!
//! - [`Simulation`] — owns one ring and its routing state, applies every
//!   membership change as a single rebuild, and produces [`RingSnapshot`]s.
//! - [`SimConfig`] — initial M, the accepted M ceiling and the RNG seed.
//!
//! [`RingSnapshot`]: chord_types::RingSnapshot

mod config;
mod error;
mod state;


pub use config::SimConfig;
pub use error::SimError;
pub use state::Simulation;
