//! Hit-event rules for Gravitas.
//!
//! Rules here react to host events rather than ticks. The only rule so far
//! is the mace bonus: fall distance accumulated by the simulation is spent
//! as extra damage when the attacker lands a hit with the weapon.

pub mod error;
pub mod mace;

pub use error::{MechError, MechResult};
pub use mace::{DamageTier, MaceRule, MaceStrike, TierShare};
