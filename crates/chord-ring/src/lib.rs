//! Core data structures of the Chord distributed hash table.
//!
//! Everything here is a pure function over an explicit [`RingState`]:
//!
//! - [`IdentifierSpace`] — modular arithmetic over `[0, 2^M)`.
//! - [`RingState`] — the set of active node identifiers.
//! - [`build_finger_table`] — a member's power-of-two routing table.
//! - [`assign_keys`] — the arc of identifiers a member owns.
//! - [`rebuild`] — both of the above for every member, as one [`Topology`].
//! - [`lookup`] — the hop path of a greedy finger-table query.
//!
//! Nothing is recomputed implicitly. Callers mutate a `RingState`, call
//! `rebuild`, and only then route queries against the new `Topology`.

mod error;
mod finger;
mod keys;
mod lookup;
mod rebuild;
mod ring;
mod space;

pub use error::RingError;
pub use finger::build_finger_table;
pub use keys::assign_keys;
pub use lookup::lookup;
pub use rebuild::{Topology, rebuild};
pub use ring::RingState;
pub use space::{IdentifierSpace, MAX_BITS, MIN_BITS};
