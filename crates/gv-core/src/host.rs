//! The capabilities a host engine lends to the simulation.
//!
//! A host implements the four narrow traits below; anything implementing all
//! of them is a [`Host`]. The simulation only ever holds a `&mut dyn Host`
//! for the duration of a callback, so entities stay owned by the engine.

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockPos};
use crate::entity::{EntityId, RegionId};
use crate::error::HostResult;
use crate::snapshot::{EffectKind, EntitySnapshot};

/// Durable property holding an entity's persisted gravity value.
pub const GRAVITY_PROPERTY: &str = "sert:gravity";
/// Durable property holding the distance fallen in the current fall.
pub const FALL_DISTANCE_PROPERTY: &str = "fall_distance";

/// An instantaneous impulse, in the engine's knockback form.
///
/// The horizontal direction `(x, z)` is scaled by `horizontal_strength`;
/// `vertical` is applied as-is (positive = up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Knockback {
    /// Horizontal direction, x component.
    pub x: f64,
    /// Horizontal direction, z component.
    pub z: f64,
    /// Scale applied to the horizontal direction.
    pub horizontal_strength: f64,
    /// Vertical impulse.
    pub vertical: f64,
}

impl Knockback {
    /// Create a knockback from direction, horizontal strength, and vertical impulse.
    pub const fn new(x: f64, z: f64, horizontal_strength: f64, vertical: f64) -> Self {
        Self {
            x,
            z,
            horizontal_strength,
            vertical,
        }
    }

    /// A purely vertical impulse.
    pub const fn vertical(vertical: f64) -> Self {
        Self::new(0.0, 0.0, 0.0, vertical)
    }
}

/// A timed status effect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Which effect.
    pub effect: EffectKind,
    /// Duration in ticks.
    pub duration_ticks: u32,
    /// 0-based amplifier.
    pub amplifier: u32,
    /// Whether the host should render particles.
    pub show_particles: bool,
}

/// A melee hit reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitEvent {
    /// The entity that dealt the hit.
    pub attacker: EntityId,
    /// The entity that was hit.
    pub victim: EntityId,
}

/// Entity enumeration and per-tick snapshots.
pub trait EntityQuery {
    /// All regions currently being simulated.
    fn regions(&self) -> Vec<RegionId>;

    /// Live entities in `region`, in the host's enumeration order.
    fn entities_in(&self, region: &RegionId) -> Vec<EntityId>;

    /// A snapshot of the entity, or `None` if it no longer exists.
    fn entity(&self, id: EntityId) -> Option<EntitySnapshot>;

    /// Return `true` if the entity still exists.
    fn is_valid(&self, id: EntityId) -> bool {
        self.entity(id).is_some()
    }
}

/// Block lookup.
pub trait BlockSource {
    /// The block at an absolute position; unloaded positions read as air.
    fn block_at(&self, region: &RegionId, pos: BlockPos) -> Block;
}

/// Durable numeric properties scoped to an entity.
pub trait PropertyStore {
    /// Read a property.
    fn property(&self, id: EntityId, key: &str) -> Option<f64>;

    /// Write a property; `None` removes it.
    fn set_property(&mut self, id: EntityId, key: &str, value: Option<f64>);
}

/// Mutators the simulation drives entities with.
pub trait EntityCommands {
    /// Apply an instantaneous impulse.
    fn apply_knockback(&mut self, id: EntityId, knockback: Knockback) -> HostResult<()>;

    /// Deal damage.
    fn apply_damage(&mut self, id: EntityId, amount: f64) -> HostResult<()>;

    /// Apply a timed status effect.
    fn add_effect(&mut self, id: EntityId, effect: StatusEffect) -> HostResult<()>;

    /// Play an animation on the entity.
    fn play_animation(&mut self, id: EntityId, animation: &str) -> HostResult<()>;

    /// Play a sound at the entity.
    fn play_sound(&mut self, id: EntityId, sound: &str) -> HostResult<()>;
}

/// Everything the simulation needs from an engine.
pub trait Host: EntityQuery + BlockSource + PropertyStore + EntityCommands {}

impl<T> Host for T where T: EntityQuery + BlockSource + PropertyStore + EntityCommands + ?Sized {}
