use std::collections::{HashMap, HashSet};

use crate::block::{Block, BlockPos};
use crate::capability::Capability;
use crate::entity::{EntityId, EntityKind, RegionId};
use crate::error::{HostError, HostResult};
use crate::host::{BlockSource, EntityCommands, EntityQuery, Knockback, PropertyStore, StatusEffect};
use crate::math::{Rotation, Vec2, Vec3, direction_from_rotation};
use crate::snapshot::{EffectKind, EntitySnapshot, EquipmentSlot, ItemType, MotionFlags};

/// Downward acceleration the engine applies per tick when nothing overrides it.
pub const ENGINE_GRAVITY: f64 = 0.08;
/// Vertical velocity retained each tick in free fall.
pub const ENGINE_AIR_DRAG: f64 = 0.98;
/// Vertical velocity the engine gives a jump.
pub const ENGINE_JUMP_VELOCITY: f64 = 0.42;

const GROUND_FRICTION: f64 = 0.6;
const AIR_FRICTION: f64 = 0.91;
const DEFAULT_HEALTH: f64 = 20.0;

/// Full state of one entity inside a [`MemoryWorld`].
#[derive(Debug, Clone)]
pub struct EntityRecord {
    /// The entity's id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Kind of entity.
    pub kind: EntityKind,
    /// Region it lives in.
    pub region: RegionId,
    /// Feet position.
    pub location: Vec3,
    /// Velocity in blocks per tick.
    pub velocity: Vec3,
    /// Orientation.
    pub rotation: Rotation,
    /// Movement flags.
    pub flags: MotionFlags,
    /// Movement input; `None` means the entity has no input capability.
    pub movement: Option<Vec2>,
    /// Active effects; `None` means the entity has no effect list.
    pub effects: Option<HashMap<EffectKind, u32>>,
    /// Equipment; `None` means the entity has no inventory.
    pub equipment: Option<HashMap<EquipmentSlot, ItemType>>,
    /// Remaining health.
    pub health: f64,
}

impl EntityRecord {
    /// A player with input, effects, and equipment capabilities.
    pub fn player(name: impl Into<String>, region: RegionId, location: Vec3) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            kind: EntityKind::Player,
            region,
            location,
            velocity: Vec3::ZERO,
            rotation: Rotation::default(),
            flags: MotionFlags {
                on_ground: true,
                ..MotionFlags::default()
            },
            movement: Some(Vec2::default()),
            effects: Some(HashMap::new()),
            equipment: Some(HashMap::new()),
            health: DEFAULT_HEALTH,
        }
    }

    /// A non-player entity with effects but no input or inventory.
    pub fn mob(type_id: impl Into<String>, region: RegionId, location: Vec3) -> Self {
        let type_id = type_id.into();
        Self {
            id: EntityId::new(),
            name: type_id.clone(),
            kind: EntityKind::Mob(type_id),
            region,
            location,
            velocity: Vec3::ZERO,
            rotation: Rotation::default(),
            flags: MotionFlags {
                on_ground: true,
                ..MotionFlags::default()
            },
            movement: None,
            effects: Some(HashMap::new()),
            equipment: None,
            health: DEFAULT_HEALTH,
        }
    }

    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: self.kind.clone(),
            region: self.region.clone(),
            location: self.location,
            rotation: self.rotation,
            view_direction: direction_from_rotation(self.rotation),
            flags: self.flags,
            movement: self.movement.into(),
            effects: Capability::from(self.effects.clone()),
            equipment: Capability::from(self.equipment.clone()),
        }
    }
}

/// A mutation the simulation asked the host to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// An impulse was applied.
    Knockback {
        /// Target entity.
        entity: EntityId,
        /// The impulse.
        knockback: Knockback,
    },
    /// Damage was dealt.
    Damage {
        /// Target entity.
        entity: EntityId,
        /// Damage amount.
        amount: f64,
    },
    /// A status effect was applied.
    Effect {
        /// Target entity.
        entity: EntityId,
        /// The effect.
        effect: StatusEffect,
    },
    /// An animation was played.
    Animation {
        /// Target entity.
        entity: EntityId,
        /// Animation name.
        name: String,
    },
    /// A sound was played.
    Sound {
        /// Target entity.
        entity: EntityId,
        /// Sound name.
        name: String,
    },
}

impl HostCommand {
    /// The entity this command targeted.
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Knockback { entity, .. }
            | Self::Damage { entity, .. }
            | Self::Effect { entity, .. }
            | Self::Animation { entity, .. }
            | Self::Sound { entity, .. } => *entity,
        }
    }
}

/// An in-process host: entities, blocks, durable properties, and a log of
/// every command the simulation issued.
///
/// [`MemoryWorld::step`] advances a minimal kinematic model so that impulses
/// have visible consequences; it is not meant to match any engine exactly.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    regions: Vec<RegionId>,
    entities: HashMap<EntityId, EntityRecord>,
    order: Vec<EntityId>,
    blocks: HashMap<(RegionId, BlockPos), Block>,
    properties: HashMap<(EntityId, String), f64>,
    pending_impulses: HashMap<EntityId, Vec3>,
    rejected_effects: HashSet<EntityId>,
    commands: Vec<HostCommand>,
}

impl MemoryWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a region. Regions are enumerated in registration order.
    pub fn add_region(&mut self, region: RegionId) {
        if !self.regions.contains(&region) {
            self.regions.push(region);
        }
    }

    /// Add an entity, registering its region if needed.
    pub fn spawn(&mut self, record: EntityRecord) -> EntityId {
        let id = record.id;
        self.add_region(record.region.clone());
        if !self.entities.contains_key(&id) {
            self.order.push(id);
        }
        self.entities.insert(id, record);
        id
    }

    /// Remove an entity. Its durable properties are dropped with it.
    pub fn despawn(&mut self, id: EntityId) -> Option<EntityRecord> {
        self.order.retain(|e| *e != id);
        self.properties.retain(|(owner, _), _| *owner != id);
        self.pending_impulses.remove(&id);
        self.entities.remove(&id)
    }

    /// Look up an entity record.
    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(&id)
    }

    /// Look up an entity record mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.entities.get_mut(&id)
    }

    /// Find an entity by display name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        let lower = name.to_lowercase();
        self.order
            .iter()
            .copied()
            .find(|id| self.entities.get(id).is_some_and(|e| e.name.to_lowercase() == lower))
    }

    /// All entities in spawn order.
    pub fn records(&self) -> impl Iterator<Item = &EntityRecord> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// Place a block.
    pub fn set_block(&mut self, region: &RegionId, pos: BlockPos, block: Block) {
        if block.is_air() {
            self.blocks.remove(&(region.clone(), pos));
        } else {
            self.blocks.insert((region.clone(), pos), block);
        }
    }

    /// Fill a square horizontal layer centred on the origin.
    pub fn fill_layer(&mut self, region: &RegionId, y: i32, half_extent: i32, block: &Block) {
        for x in -half_extent..=half_extent {
            for z in -half_extent..=half_extent {
                self.set_block(region, BlockPos::new(x, y, z), block.clone());
            }
        }
    }

    /// Make the host reject status effects for an entity.
    pub fn reject_effects_for(&mut self, id: EntityId) {
        self.rejected_effects.insert(id);
    }

    /// Every command issued so far, in order.
    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    /// Commands that targeted one entity.
    pub fn commands_for(&self, id: EntityId) -> Vec<&HostCommand> {
        self.commands.iter().filter(|c| c.entity() == id).collect()
    }

    /// Knockbacks applied to one entity, in order.
    pub fn knockbacks_for(&self, id: EntityId) -> Vec<Knockback> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                HostCommand::Knockback { entity, knockback } if *entity == id => Some(*knockback),
                _ => None,
            })
            .collect()
    }

    /// Forget all recorded commands.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Advance every entity by one tick.
    ///
    /// Entities that received an impulse this tick take it as their new
    /// velocity; the rest fall under engine gravity. An entity moving down
    /// into a non-air block lands on top of it.
    pub fn step(&mut self) {
        let impulses = std::mem::take(&mut self.pending_impulses);
        for id in self.order.clone() {
            let Some(record) = self.entities.get(&id) else {
                continue;
            };
            let region = record.region.clone();
            let flags = record.flags;
            let mut velocity = match impulses.get(&id) {
                Some(impulse) => *impulse,
                None => {
                    let friction = if flags.on_ground {
                        GROUND_FRICTION
                    } else {
                        AIR_FRICTION
                    };
                    Vec3::new(
                        record.velocity.x * friction,
                        (record.velocity.y - ENGINE_GRAVITY) * ENGINE_AIR_DRAG,
                        record.velocity.z * friction,
                    )
                }
            };
            if flags.jumping && flags.on_ground {
                velocity.y = velocity.y.max(ENGINE_JUMP_VELOCITY);
            }

            let mut next = record.location + velocity;
            let feet = BlockPos::containing(next);
            let landed = velocity.y <= 0.0 && !self.block_at(&region, feet).is_air();
            if landed {
                next.y = f64::from(feet.y) + 1.0;
                velocity.y = 0.0;
            }

            if let Some(record) = self.entities.get_mut(&id) {
                record.location = next;
                record.velocity = velocity;
                record.flags.on_ground = landed;
            }
        }
    }

    fn record_command(&mut self, command: HostCommand) {
        self.commands.push(command);
    }

    fn require(&self, id: EntityId) -> HostResult<()> {
        if self.entities.contains_key(&id) {
            Ok(())
        } else {
            Err(HostError::EntityNotFound(id))
        }
    }
}

impl EntityQuery for MemoryWorld {
    fn regions(&self) -> Vec<RegionId> {
        self.regions.clone()
    }

    fn entities_in(&self, region: &RegionId) -> Vec<EntityId> {
        self.records()
            .filter(|e| &e.region == region)
            .map(|e| e.id)
            .collect()
    }

    fn entity(&self, id: EntityId) -> Option<EntitySnapshot> {
        self.entities.get(&id).map(EntityRecord::snapshot)
    }
}

impl BlockSource for MemoryWorld {
    fn block_at(&self, region: &RegionId, pos: BlockPos) -> Block {
        self.blocks
            .get(&(region.clone(), pos))
            .cloned()
            .unwrap_or_default()
    }
}

impl PropertyStore for MemoryWorld {
    fn property(&self, id: EntityId, key: &str) -> Option<f64> {
        self.properties.get(&(id, key.to_string())).copied()
    }

    fn set_property(&mut self, id: EntityId, key: &str, value: Option<f64>) {
        match value {
            Some(v) => {
                self.properties.insert((id, key.to_string()), v);
            }
            None => {
                self.properties.remove(&(id, key.to_string()));
            }
        }
    }
}

impl EntityCommands for MemoryWorld {
    fn apply_knockback(&mut self, id: EntityId, knockback: Knockback) -> HostResult<()> {
        self.require(id)?;
        let impulse = Vec3::new(
            knockback.x * knockback.horizontal_strength,
            knockback.vertical,
            knockback.z * knockback.horizontal_strength,
        );
        let pending = self.pending_impulses.entry(id).or_default();
        *pending = *pending + impulse;
        self.record_command(HostCommand::Knockback {
            entity: id,
            knockback,
        });
        Ok(())
    }

    fn apply_damage(&mut self, id: EntityId, amount: f64) -> HostResult<()> {
        let record = self
            .entities
            .get_mut(&id)
            .ok_or(HostError::EntityNotFound(id))?;
        record.health = (record.health - amount).max(0.0);
        self.record_command(HostCommand::Damage { entity: id, amount });
        Ok(())
    }

    fn add_effect(&mut self, id: EntityId, effect: StatusEffect) -> HostResult<()> {
        self.require(id)?;
        if self.rejected_effects.contains(&id) {
            return Err(HostError::EffectRejected {
                entity: id,
                effect: effect.effect,
                reason: "effects disabled for entity".into(),
            });
        }
        self.record_command(HostCommand::Effect { entity: id, effect });
        Ok(())
    }

    fn play_animation(&mut self, id: EntityId, animation: &str) -> HostResult<()> {
        self.require(id)?;
        self.record_command(HostCommand::Animation {
            entity: id,
            name: animation.to_string(),
        });
        Ok(())
    }

    fn play_sound(&mut self, id: EntityId, sound: &str) -> HostResult<()> {
        self.require(id)?;
        self.record_command(HostCommand::Sound {
            entity: id,
            name: sound.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overworld() -> RegionId {
        RegionId::new("overworld")
    }

    fn world_with_floor() -> MemoryWorld {
        let mut world = MemoryWorld::new();
        world.fill_layer(&overworld(), -1, 4, &Block::Other("minecraft:stone".into()));
        world
    }

    #[test]
    fn spawn_and_enumerate() {
        let mut world = MemoryWorld::new();
        let a = world.spawn(EntityRecord::player("Alex", overworld(), Vec3::ZERO));
        let b = world.spawn(EntityRecord::mob("minecraft:pig", overworld(), Vec3::ZERO));
        world.spawn(EntityRecord::player("Nether", RegionId::new("nether"), Vec3::ZERO));

        assert_eq!(world.regions().len(), 2);
        assert_eq!(world.entities_in(&overworld()), vec![a, b]);
        assert_eq!(world.find_by_name("alex"), Some(a));
    }

    #[test]
    fn snapshot_reports_capabilities() {
        let mut world = MemoryWorld::new();
        let player = world.spawn(EntityRecord::player("Alex", overworld(), Vec3::ZERO));
        let pig = world.spawn(EntityRecord::mob("minecraft:pig", overworld(), Vec3::ZERO));

        let snap = world.entity(player).unwrap();
        assert!(snap.movement.is_available());
        assert!(snap.equipment.is_available());

        let snap = world.entity(pig).unwrap();
        assert!(!snap.movement.is_available());
        assert!(!snap.equipment.is_available());
    }

    #[test]
    fn despawn_invalidates_and_drops_properties() {
        let mut world = MemoryWorld::new();
        let id = world.spawn(EntityRecord::player("Alex", overworld(), Vec3::ZERO));
        world.set_property(id, "k", Some(1.0));
        world.despawn(id);
        assert!(!world.is_valid(id));
        assert_eq!(world.property(id, "k"), None);
        assert!(world.apply_knockback(id, Knockback::vertical(1.0)).is_err());
    }

    #[test]
    fn unplaced_blocks_are_air() {
        let world = world_with_floor();
        assert!(world.block_at(&overworld(), BlockPos::new(0, 0, 0)).is_air());
        assert!(!world.block_at(&overworld(), BlockPos::new(0, -1, 0)).is_air());
    }

    #[test]
    fn standing_entity_stays_grounded() {
        let mut world = world_with_floor();
        let id = world.spawn(EntityRecord::player("Alex", overworld(), Vec3::ZERO));
        world.step();
        let record = world.get(id).unwrap();
        assert!(record.flags.on_ground);
        assert!(record.location.y.abs() < 1e-9);
    }

    #[test]
    fn impulse_replaces_velocity() {
        let mut world = world_with_floor();
        let id = world.spawn(EntityRecord::player("Alex", overworld(), Vec3::ZERO));
        world.apply_knockback(id, Knockback::new(1.0, 0.0, 0.5, 0.3)).unwrap();
        world.step();
        let record = world.get(id).unwrap();
        assert!(!record.flags.on_ground);
        assert!((record.location.y - 0.3).abs() < 1e-9);
        assert!((record.location.x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn falling_entity_lands_on_floor() {
        let mut world = world_with_floor();
        let mut record = EntityRecord::player("Alex", overworld(), Vec3::new(0.5, 3.0, 0.5));
        record.flags.on_ground = false;
        let id = world.spawn(record);
        for _ in 0..40 {
            world.step();
        }
        let record = world.get(id).unwrap();
        assert!(record.flags.on_ground);
        assert!(record.location.y.abs() < 1e-9);
    }

    #[test]
    fn rejected_effects_error() {
        let mut world = MemoryWorld::new();
        let id = world.spawn(EntityRecord::player("Alex", overworld(), Vec3::ZERO));
        world.reject_effects_for(id);
        let effect = StatusEffect {
            effect: EffectKind::SlowFalling,
            duration_ticks: 1,
            amplifier: 1,
            show_particles: false,
        };
        assert!(matches!(
            world.add_effect(id, effect),
            Err(HostError::EffectRejected { .. })
        ));
        assert!(world.commands().is_empty());
    }

    #[test]
    fn damage_reduces_health_and_logs() {
        let mut world = MemoryWorld::new();
        let id = world.spawn(EntityRecord::mob("minecraft:zombie", overworld(), Vec3::ZERO));
        world.apply_damage(id, 24.0).unwrap();
        assert!(world.get(id).unwrap().health.abs() < f64::EPSILON);
        assert_eq!(
            world.commands_for(id),
            vec![&HostCommand::Damage {
                entity: id,
                amount: 24.0
            }]
        );
    }
}
