use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::Capability;
use crate::entity::{EntityId, EntityKind, RegionId};
use crate::math::{Rotation, Vec2, Vec3};

/// Boolean movement state reported by the host each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionFlags {
    /// Standing on a block.
    pub on_ground: bool,
    /// Jump input held.
    pub jumping: bool,
    /// Sprinting.
    pub sprinting: bool,
    /// Sneaking.
    pub sneaking: bool,
    /// In water.
    pub swimming: bool,
    /// Creative/ability flight.
    pub flying: bool,
    /// Elytra gliding.
    pub gliding: bool,
    /// On a ladder or vine.
    pub climbing: bool,
}

/// A status effect, named the way the host names it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Faster horizontal movement.
    Speed,
    /// Slower horizontal movement.
    Slowness,
    /// Higher jumps.
    JumpBoost,
    /// Reduced fall speed; applied cosmetically by the simulation.
    SlowFalling,
    /// Any other host effect.
    Other(String),
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Speed => write!(f, "speed"),
            Self::Slowness => write!(f, "slowness"),
            Self::JumpBoost => write!(f, "jump_boost"),
            Self::SlowFalling => write!(f, "slow_falling"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// An item type id such as `minecraft:mace`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemType(pub String);

impl ItemType {
    /// Flight-enabling chest equipment.
    pub const ELYTRA: &'static str = "minecraft:elytra";
    /// The fall-damage weapon.
    pub const MACE: &'static str = "minecraft:mace";

    /// Create an item type from its id.
    pub fn new(type_id: impl Into<String>) -> Self {
        Self(type_id.into())
    }

    /// Return `true` if this item has the given type id.
    pub fn is(&self, type_id: &str) -> bool {
        self.0 == type_id
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Equipment slots the simulation looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    /// Chest armour slot.
    Chest,
    /// Selected hotbar item.
    MainHand,
}

/// Everything the simulation reads about one entity in one tick.
///
/// Optional accessors are [`Capability`] values: an entity kind that has no
/// input, effect list, or inventory reports them as unavailable.
#[derive(Debug, Clone)]
pub struct EntitySnapshot {
    /// The entity's id.
    pub id: EntityId,
    /// The entity's kind.
    pub kind: EntityKind,
    /// The region the entity is in.
    pub region: RegionId,
    /// Feet position.
    pub location: Vec3,
    /// Orientation in degrees.
    pub rotation: Rotation,
    /// Unit vector the entity is looking along.
    pub view_direction: Vec3,
    /// Movement state flags.
    pub flags: MotionFlags,
    /// Movement input, for entities driven by input.
    pub movement: Capability<Vec2>,
    /// Active effect amplifiers (0-based), keyed by effect.
    pub effects: Capability<HashMap<EffectKind, u32>>,
    /// Equipped items by slot.
    pub equipment: Capability<HashMap<EquipmentSlot, ItemType>>,
}

impl EntitySnapshot {
    /// A snapshot with no optional capabilities and all flags cleared.
    pub fn new(id: EntityId, kind: EntityKind, region: RegionId, location: Vec3) -> Self {
        Self {
            id,
            kind,
            region,
            location,
            rotation: Rotation::default(),
            view_direction: Vec3::new(0.0, 0.0, 1.0),
            flags: MotionFlags::default(),
            movement: Capability::Unavailable,
            effects: Capability::Unavailable,
            equipment: Capability::Unavailable,
        }
    }

    /// Effect level: amplifier + 1 when the effect is active, otherwise 0.
    pub fn effect_level(&self, effect: &EffectKind) -> u32 {
        match &self.effects {
            Capability::Available(effects) => effects.get(effect).map_or(0, |amp| amp + 1),
            Capability::Unavailable => 0,
        }
    }

    /// The item in `slot`, if the entity has equipment at all.
    pub fn equipped(&self, slot: EquipmentSlot) -> Capability<Option<&ItemType>> {
        self.equipment.as_ref().map(|items| items.get(&slot))
    }

    /// Return `true` if `slot` holds an item with the given type id.
    pub fn has_equipped(&self, slot: EquipmentSlot, type_id: &str) -> bool {
        matches!(self.equipped(slot), Capability::Available(Some(item)) if item.is(type_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> EntitySnapshot {
        EntitySnapshot::new(
            EntityId::new(),
            EntityKind::Player,
            RegionId::new("overworld"),
            Vec3::ZERO,
        )
    }

    #[test]
    fn effect_level_defaults_to_zero() {
        let mut snap = snapshot();
        assert_eq!(snap.effect_level(&EffectKind::Speed), 0);
        snap.effects = Capability::Available(HashMap::from([(EffectKind::Speed, 1)]));
        assert_eq!(snap.effect_level(&EffectKind::Speed), 2);
        assert_eq!(snap.effect_level(&EffectKind::Slowness), 0);
    }

    #[test]
    fn equipment_lookup() {
        let mut snap = snapshot();
        assert_eq!(snap.equipped(EquipmentSlot::Chest), Capability::Unavailable);
        assert!(!snap.has_equipped(EquipmentSlot::Chest, ItemType::ELYTRA));

        snap.equipment = Capability::Available(HashMap::from([(
            EquipmentSlot::Chest,
            ItemType::new(ItemType::ELYTRA),
        )]));
        assert!(snap.has_equipped(EquipmentSlot::Chest, ItemType::ELYTRA));
        assert_eq!(snap.equipped(EquipmentSlot::MainHand), Capability::Available(None));
    }

    #[test]
    fn effect_names() {
        assert_eq!(EffectKind::JumpBoost.to_string(), "jump_boost");
        assert_eq!(EffectKind::Other("haste".into()).to_string(), "haste");
    }
}
