//! Core types for Gravitas: the contracts a host game engine exposes to the
//! gravity simulation, and the value types that flow across them.
//!
//! The simulation never talks to an engine directly. Everything it needs
//! (entity enumeration, kinematic snapshots, block lookup, durable
//! properties, and impulse/damage/effect mutators) goes through the traits in
//! [`host`]. [`MemoryWorld`] is a complete in-process implementation used by
//! tests and the command-line runner.

/// Block positions and block types.
pub mod block;
/// Explicit "feature absent" values for optional entity accessors.
pub mod capability;
/// Entity identifiers, kinds, and world regions.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Collaborator traits implemented by a host engine.
pub mod host;
/// Pure vector and rotation helpers.
pub mod math;
/// Per-tick kinematic snapshots of a single entity.
pub mod snapshot;
/// In-memory reference host.
pub mod world;

/// Re-export block types.
pub use block::{Block, BlockPos};
/// Re-export capability type.
pub use capability::Capability;
/// Re-export core entity types.
pub use entity::{EntityId, EntityKind, RegionId};
/// Re-export error types.
pub use error::{HostError, HostResult};
/// Re-export host traits and command types.
pub use host::{
    BlockSource, EntityCommands, EntityQuery, HitEvent, Host, Knockback, PropertyStore,
    StatusEffect,
};
/// Re-export math types.
pub use math::{Rotation, Vec2, Vec3};
/// Re-export snapshot types.
pub use snapshot::{EffectKind, EntitySnapshot, EquipmentSlot, ItemType, MotionFlags};
/// Re-export the in-memory host.
pub use world::{EntityRecord, HostCommand, MemoryWorld};
