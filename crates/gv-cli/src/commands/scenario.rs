use std::collections::{HashMap, HashSet};
use std::path::Path;

use gv_core::{
    Block, BlockPos, EffectKind, EntityId, EntityKind, EntityRecord, EquipmentSlot, HitEvent,
    ItemType, MemoryWorld, MotionFlags, RegionId, Rotation, Vec2, Vec3,
};
use gv_mechanics::MaceRule;
use gv_simulation::{SimConfig, Simulation};
use serde::Deserialize;

/// A JSON description of a world and what happens in it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config: SimConfig,
    #[serde(default)]
    pub mace: Option<MaceRule>,
    #[serde(default)]
    pub floors: Vec<FloorSpec>,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub region_gravity: Vec<RegionGravitySpec>,
    #[serde(default)]
    pub hits: Vec<HitSpec>,
}

/// A square layer of blocks centred on the origin.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FloorSpec {
    pub region: String,
    pub y: i32,
    #[serde(default = "default_half_extent")]
    pub half_extent: i32,
    #[serde(default = "default_floor_block")]
    pub block: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockSpec {
    pub region: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub block: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySpec {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: EntityKind,
    pub region: String,
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub airborne: bool,
    #[serde(default)]
    pub flags: Option<MotionFlags>,
    #[serde(default)]
    pub movement: Option<Vec2>,
    #[serde(default)]
    pub effects: HashMap<String, u32>,
    #[serde(default)]
    pub equipment: HashMap<EquipmentSlot, ItemType>,
    /// Durable gravity property.
    #[serde(default)]
    pub gravity: Option<f64>,
    /// Session-only override.
    #[serde(default)]
    pub temporary_gravity: Option<f64>,
    /// Ticks on which the jump input is held.
    #[serde(default)]
    pub jump_at: Vec<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionGravitySpec {
    pub region: String,
    pub gravity: f64,
}

/// A melee hit delivered after the given tick.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HitSpec {
    pub tick: u64,
    pub attacker: String,
    pub victim: String,
}

fn default_half_extent() -> i32 {
    8
}

fn default_floor_block() -> String {
    "minecraft:stone".to_string()
}

fn default_kind() -> EntityKind {
    EntityKind::Player
}

/// An entity the runner tracks by its scenario name.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: EntityId,
    pub name: String,
    pub jump_at: HashSet<u64>,
}

/// A loaded scenario, ready to run.
pub struct Prepared {
    pub title: String,
    pub sim: Simulation<MemoryWorld>,
    pub actors: Vec<Actor>,
    pub hits: Vec<(u64, HitEvent)>,
}

/// Read and parse a scenario file.
pub fn load(path: &Path) -> Result<Scenario, String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&source).map_err(|e| format!("invalid scenario {}: {e}", path.display()))
}

/// Parse an effect name the way the host spells it.
pub fn effect_kind(name: &str) -> EffectKind {
    match name.strip_prefix("minecraft:").unwrap_or(name) {
        "speed" => EffectKind::Speed,
        "slowness" => EffectKind::Slowness,
        "jump_boost" => EffectKind::JumpBoost,
        "slow_falling" => EffectKind::SlowFalling,
        other => EffectKind::Other(other.to_string()),
    }
}

impl Scenario {
    /// Build the world and simulation this scenario describes.
    pub fn prepare(self, fallback_title: &str) -> Result<Prepared, String> {
        let mut world = MemoryWorld::new();

        for floor in &self.floors {
            let region = RegionId::new(floor.region.as_str());
            world.add_region(region.clone());
            let block = Block::from_type_id(&floor.block);
            world.fill_layer(&region, floor.y, floor.half_extent, &block);
        }
        for spec in &self.blocks {
            let region = RegionId::new(spec.region.as_str());
            world.add_region(region.clone());
            let pos = BlockPos::new(spec.x, spec.y, spec.z);
            world.set_block(&region, pos, Block::from_type_id(&spec.block));
        }

        let mut actors = Vec::with_capacity(self.entities.len());
        let mut overrides = Vec::new();
        for spec in self.entities {
            if actors.iter().any(|a: &Actor| a.name == spec.name) {
                return Err(format!("duplicate entity name '{}'", spec.name));
            }
            let region = RegionId::new(spec.region.as_str());
            world.add_region(region.clone());

            let mut record = match &spec.kind {
                EntityKind::Player => EntityRecord::player(&spec.name, region, spec.position),
                EntityKind::Mob(type_id) => {
                    let mut record = EntityRecord::mob(type_id, region, spec.position);
                    record.name = spec.name.clone();
                    record
                }
            };
            record.rotation = spec.rotation;
            if let Some(flags) = spec.flags {
                record.flags = flags;
            }
            if spec.airborne {
                record.flags.on_ground = false;
            }
            if spec.movement.is_some() {
                record.movement = spec.movement;
            }
            if let Some(effects) = record.effects.as_mut() {
                effects.extend(spec.effects.iter().map(|(k, v)| (effect_kind(k), *v)));
            }
            if !spec.equipment.is_empty() {
                record
                    .equipment
                    .get_or_insert_with(HashMap::new)
                    .extend(spec.equipment);
            }

            let id = world.spawn(record);
            overrides.push((id, spec.name.clone(), spec.gravity, spec.temporary_gravity));
            actors.push(Actor {
                id,
                name: spec.name,
                jump_at: spec.jump_at.into_iter().collect(),
            });
        }

        let find = |name: &str| {
            actors
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.id)
                .ok_or_else(|| format!("unknown entity '{name}'"))
        };
        let mut hits = Vec::with_capacity(self.hits.len());
        for hit in &self.hits {
            let event = HitEvent {
                attacker: find(&hit.attacker)?,
                victim: find(&hit.victim)?,
            };
            hits.push((hit.tick, event));
        }

        let mut sim = Simulation::new(world, self.config);
        if let Some(rule) = self.mace {
            rule.validate().map_err(|e| format!("invalid mace rule: {e}"))?;
            sim = sim.with_mace_rule(rule);
        }

        for spec in &self.region_gravity {
            sim.assign_region_gravity(&RegionId::new(spec.region.as_str()), spec.gravity)
                .map_err(|e| format!("region '{}': {e}", spec.region))?;
        }
        for (id, name, durable, temporary) in overrides {
            if let Some(value) = durable {
                sim.set_gravity(id, value)
                    .map_err(|e| format!("entity '{name}': {e}"))?;
            }
            if let Some(value) = temporary {
                sim.set_temporary_gravity(id, value)
                    .map_err(|e| format!("entity '{name}': {e}"))?;
            }
        }

        Ok(Prepared {
            title: self.name.unwrap_or_else(|| fallback_title.to_string()),
            sim,
            actors,
            hits,
        })
    }
}
