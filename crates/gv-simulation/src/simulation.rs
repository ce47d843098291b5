use gv_core::{EntityId, HitEvent, Host, RegionId};
use gv_mechanics::{MaceRule, MaceStrike};
use log::debug;

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::driver::GravitySystem;
use crate::error::{SimError, SimResult};
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::gravity;

/// The top-level simulation orchestrator.
///
/// Owns the host, clock, event log and the gravity driver. Drives the tick
/// loop and routes host hit events to the mace rule.
pub struct Simulation<H: Host> {
    host: H,
    clock: SimClock,
    config: SimConfig,
    events: EventLog,
    gravity: GravitySystem,
    mace: MaceRule,
}

impl<H: Host> std::fmt::Debug for Simulation<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.clock.tick())
            .field("tracked", &self.gravity.registry().len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl<H: Host> Simulation<H> {
    /// Create a new simulation over a host.
    pub fn new(host: H, config: SimConfig) -> Self {
        let events = EventLog::new(config.max_events);
        Self {
            host,
            clock: SimClock::new(),
            config,
            events,
            gravity: GravitySystem::new(),
            mace: MaceRule::default(),
        }
    }

    /// Replace the mace rule.
    pub fn with_mace_rule(mut self, rule: MaceRule) -> Self {
        self.mace = rule;
        self
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self) {
        self.clock.advance();

        let mut ctx = SimContext {
            host: &mut self.host,
            clock: &self.clock,
            config: &self.config,
            events: &mut self.events,
        };
        self.gravity.tick(&mut ctx);
    }

    /// Advance the simulation by `n` ticks.
    pub fn run(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Effective gravity for an entity.
    pub fn gravity(&self, id: EntityId) -> f64 {
        gravity::get(
            &self.host,
            self.gravity.state(id),
            id,
            self.config.standard_gravity,
        )
    }

    /// Persist a gravity value on an entity.
    pub fn set_gravity(&mut self, id: EntityId, value: f64) -> SimResult<()> {
        self.require(id)?;
        gravity::set_persisted(&mut self.host, id, value)?;
        self.record_gravity_change(id, value, true);
        Ok(())
    }

    /// Set a session-only gravity override on an entity.
    pub fn set_temporary_gravity(&mut self, id: EntityId, value: f64) -> SimResult<()> {
        self.require(id)?;
        self.gravity.set_temporary_gravity(id, value)?;
        self.record_gravity_change(id, value, false);
        Ok(())
    }

    /// Drop an entity's session-only override. Returns `false` if none was set.
    pub fn clear_temporary_gravity(&mut self, id: EntityId) -> bool {
        self.gravity.clear_temporary_gravity(id)
    }

    /// Persist a gravity value on every player currently in `region`.
    ///
    /// Returns the number of players updated. An invalid value is rejected
    /// before any player is touched.
    pub fn assign_region_gravity(&mut self, region: &RegionId, value: f64) -> SimResult<usize> {
        if !gravity::can_set(value) {
            return Err(SimError::InvalidGravityValue { value });
        }
        let players: Vec<EntityId> = self
            .host
            .entities_in(region)
            .into_iter()
            .filter(|id| self.host.entity(*id).is_some_and(|e| e.kind.is_player()))
            .collect();
        for id in &players {
            gravity::set_persisted(&mut self.host, *id, value)?;
            self.record_gravity_change(*id, value, true);
        }
        debug!("region {region}: gravity {value} assigned to {} players", players.len());
        Ok(players.len())
    }

    /// Route a melee hit through the mace rule.
    ///
    /// When the rule fires, an airborne attacker starts a new fall episode
    /// from its current height.
    pub fn handle_hit(&mut self, hit: HitEvent) -> Option<MaceStrike> {
        let strike = self.mace.on_hit(&mut self.host, hit)?;
        let airborne = self
            .host
            .entity(hit.attacker)
            .filter(|a| !a.flags.on_ground);
        if let Some(attacker) = airborne {
            self.gravity.restart_fall(hit.attacker, attacker.location.y);
        }
        self.events.push(SimEvent::new(
            self.clock.tick(),
            SimEventKind::MaceStrike {
                attacker: strike.attacker,
                victim: strike.victim,
                fall_distance: strike.fall_distance,
                damage: strike.damage,
            },
            format!(
                "mace strike after {:.2} blocks: {:.1} bonus damage",
                strike.fall_distance, strike.damage
            ),
        ));
        Some(strike)
    }

    /// Cancel an entity's jump sequence. Returns `false` if none was running.
    pub fn cancel_jump(&mut self, id: EntityId) -> bool {
        self.gravity.cancel_jump(id)
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The gravity driver.
    pub fn gravity_system(&self) -> &GravitySystem {
        &self.gravity
    }

    /// The simulation clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The configuration this simulation runs with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The mace rule in effect.
    pub fn mace_rule(&self) -> &MaceRule {
        &self.mace
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Extract the host, ending the session. Session-only state is dropped.
    pub fn into_host(self) -> H {
        self.host
    }

    /// The current tick.
    pub fn current_tick(&self) -> u64 {
        self.clock.tick()
    }

    fn require(&self, id: EntityId) -> SimResult<()> {
        if self.host.is_valid(id) {
            Ok(())
        } else {
            Err(SimError::EntityNotFound(id))
        }
    }

    fn record_gravity_change(&mut self, id: EntityId, value: f64, persisted: bool) {
        let scope = if persisted { "persisted" } else { "temporary" };
        self.events.push(SimEvent::new(
            self.clock.tick(),
            SimEventKind::GravityChanged {
                entity: id,
                value,
                persisted,
            },
            format!("{scope} gravity set to {value}"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use gv_core::host::{FALL_DISTANCE_PROPERTY, GRAVITY_PROPERTY};
    use gv_core::{
        Block, EffectKind, EntityRecord, EquipmentSlot, HostCommand, ItemType, MemoryWorld,
        PropertyStore, Vec2, Vec3,
    };

    use super::*;
    use crate::event::JumpEnd;
    use crate::state::JumpPhase;

    fn overworld() -> RegionId {
        RegionId::new("overworld")
    }

    fn stone() -> Block {
        Block::Other("minecraft:stone".into())
    }

    /// A world with a stone floor whose top surface is at y = 64.
    fn floored_world() -> MemoryWorld {
        let mut world = MemoryWorld::new();
        world.fill_layer(&overworld(), 63, 8, &stone());
        world
    }

    fn spawn_player(world: &mut MemoryWorld, y: f64, on_ground: bool) -> EntityId {
        let mut record = EntityRecord::player("Alex", overworld(), Vec3::new(0.5, y, 0.5));
        record.flags.on_ground = on_ground;
        world.spawn(record)
    }

    fn step(sim: &mut Simulation<MemoryWorld>, ticks: u32) {
        for _ in 0..ticks {
            sim.tick();
            sim.host_mut().step();
        }
    }

    fn has_event(sim: &Simulation<MemoryWorld>, pred: impl Fn(&SimEventKind) -> bool) -> bool {
        sim.events().events().iter().any(|e| pred(&e.kind))
    }

    #[test]
    fn standard_gravity_applies_nothing() {
        let mut world = MemoryWorld::new();
        let id = spawn_player(&mut world, 80.0, false);
        let mut sim = Simulation::new(world, SimConfig::default());

        sim.run(5);
        assert!(sim.host().knockbacks_for(id).is_empty());
        assert!(sim.gravity_system().state(id).is_none());
    }

    #[test]
    fn near_standard_gravity_is_left_alone() {
        let mut world = MemoryWorld::new();
        let id = spawn_player(&mut world, 80.0, false);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 9.80005).unwrap();

        sim.run(3);
        assert!(sim.host().knockbacks_for(id).is_empty());
    }

    #[test]
    fn low_gravity_fall_is_driven() {
        let mut world = MemoryWorld::new();
        let id = spawn_player(&mut world, 80.0, false);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 5.0).unwrap();

        step(&mut sim, 3);
        let state = sim.gravity_system().state(id).unwrap();
        assert!(state.fall_velocity < 0.0);
        assert_eq!(state.jump_start_y, Some(80.0));
        assert_eq!(sim.host().knockbacks_for(id).len(), 3);
        assert!(sim.host().property(id, FALL_DISTANCE_PROPERTY).unwrap() > 0.0);
    }

    #[test]
    fn deferred_slow_fall_effect_is_applied() {
        let mut world = MemoryWorld::new();
        let id = spawn_player(&mut world, 80.0, false);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 5.0).unwrap();

        sim.run(3);
        let effects: Vec<_> = sim
            .host()
            .commands_for(id)
            .into_iter()
            .filter_map(|c| match c {
                HostCommand::Effect { effect, .. } => Some(effect.clone()),
                _ => None,
            })
            .collect();
        // Scheduled on tick 1, due on tick 3.
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].effect, EffectKind::SlowFalling);
        assert_eq!(effects[0].amplifier, 1);
        assert!(!effects[0].show_particles);
    }

    #[test]
    fn failed_effect_is_contained() {
        let mut world = MemoryWorld::new();
        let id = spawn_player(&mut world, 80.0, false);
        world.reject_effects_for(id);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 5.0).unwrap();

        sim.run(4);
        assert!(has_event(&sim, |k| matches!(k, SimEventKind::EffectFailed { .. })));
        let state = sim.gravity_system().state(id).unwrap();
        // Four airborne ticks at g=5 with the steep divisor.
        assert!((state.fall_velocity - (-4.0 * 5.0 / 50.0)).abs() < 1e-9);
    }

    #[test]
    fn landing_resets_fall_state() {
        let mut world = floored_world();
        let id = spawn_player(&mut world, 66.0, false);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 5.0).unwrap();

        step(&mut sim, 200);
        assert!(sim.host().get(id).unwrap().flags.on_ground);
        let landed = sim.events().events().iter().find_map(|e| match e.kind {
            SimEventKind::Landed { fall_distance, .. } => Some(fall_distance),
            _ => None,
        });
        assert!(landed.is_some_and(|d| d > 1.0));
        assert_eq!(sim.host().property(id, FALL_DISTANCE_PROPERTY), Some(0.0));
        let state = sim.gravity_system().state(id).unwrap();
        assert_eq!(state.fall_velocity, 0.0);
        assert!(state.jump_start_y.is_none());
        assert!(state.is_armed());
    }

    #[test]
    fn jump_runs_as_scheduled_steps() {
        let mut world = floored_world();
        let id = spawn_player(&mut world, 64.0, true);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 5.0).unwrap();

        step(&mut sim, 1);
        assert!(sim.gravity_system().state(id).unwrap().is_armed());

        sim.host_mut().get_mut(id).unwrap().flags.jumping = true;
        step(&mut sim, 1);
        assert!(has_event(&sim, |k| matches!(k, SimEventKind::JumpStarted { .. })));
        assert!(!sim.host().get(id).unwrap().flags.on_ground);

        sim.host_mut().get_mut(id).unwrap().flags.jumping = false;
        step(&mut sim, 1);
        let state = sim.gravity_system().state(id).unwrap();
        assert!(matches!(state.jump, JumpPhase::Running { step: 1, .. }));
    }

    #[test]
    fn returning_to_standard_cancels_jump() {
        let mut world = floored_world();
        let id = spawn_player(&mut world, 64.0, true);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_temporary_gravity(id, 5.0).unwrap();

        step(&mut sim, 1);
        sim.host_mut().get_mut(id).unwrap().flags.jumping = true;
        step(&mut sim, 1);
        assert!(sim.gravity_system().state(id).unwrap().pending_jump().is_some());

        assert!(sim.clear_temporary_gravity(id));
        step(&mut sim, 1);
        assert!(sim.gravity_system().state(id).unwrap().pending_jump().is_none());
        assert!(sim.gravity_system().scheduler().is_empty());
        assert!(has_event(&sim, |k| matches!(
            k,
            SimEventKind::JumpEnded {
                reason: JumpEnd::Cancelled,
                ..
            }
        )));
    }

    #[test]
    fn explicit_cancel_is_idempotent() {
        let mut world = floored_world();
        let id = spawn_player(&mut world, 64.0, true);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 5.0).unwrap();
        step(&mut sim, 1);
        sim.host_mut().get_mut(id).unwrap().flags.jumping = true;
        sim.tick();

        assert!(sim.cancel_jump(id));
        assert!(!sim.cancel_jump(id));
        assert!(sim.gravity_system().scheduler().is_empty());
    }

    #[test]
    fn flight_item_exempts_player() {
        let mut world = MemoryWorld::new();
        let mut record = EntityRecord::player("Alex", overworld(), Vec3::new(0.5, 80.0, 0.5));
        record.flags.on_ground = false;
        if let Some(equipment) = record.equipment.as_mut() {
            equipment.insert(EquipmentSlot::Chest, ItemType::new(ItemType::ELYTRA));
        }
        let id = world.spawn(record);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 2.0).unwrap();

        sim.run(3);
        assert!(sim.host().knockbacks_for(id).is_empty());
    }

    #[test]
    fn swimming_mob_is_exempt_but_walking_mob_is_not() {
        let mut world = MemoryWorld::new();
        let mut fish = EntityRecord::mob("minecraft:cod", overworld(), Vec3::new(0.5, 80.0, 0.5));
        fish.flags.on_ground = false;
        fish.flags.swimming = true;
        let mut zombie =
            EntityRecord::mob("minecraft:zombie", overworld(), Vec3::new(3.5, 80.0, 0.5));
        zombie.flags.on_ground = false;
        let fish = world.spawn(fish);
        let zombie = world.spawn(zombie);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(fish, 2.0).unwrap();
        sim.set_gravity(zombie, 2.0).unwrap();

        sim.run(1);
        assert!(sim.host().knockbacks_for(fish).is_empty());
        let kb = sim.host().knockbacks_for(zombie);
        assert_eq!(kb.len(), 1);
        assert_eq!((kb[0].x, kb[0].z), (0.0, 0.0));
    }

    #[test]
    fn walls_cancel_horizontal_steering() {
        let mut world = MemoryWorld::new();
        let id = spawn_player(&mut world, 80.0, false);
        if let Some(record) = world.get_mut(id) {
            record.movement = Some(Vec2::new(0.0, 1.0));
        }
        world.set_block(&overworld(), gv_core::BlockPos::new(1, 80, 0), stone());
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 5.0).unwrap();

        sim.run(1);
        let kb = sim.host().knockbacks_for(id);
        assert_eq!(kb.len(), 1);
        assert_eq!((kb[0].x, kb[0].z), (0.0, 0.0));
    }

    #[test]
    fn open_air_keeps_horizontal_steering() {
        let mut world = MemoryWorld::new();
        let id = spawn_player(&mut world, 80.0, false);
        if let Some(record) = world.get_mut(id) {
            record.movement = Some(Vec2::new(0.0, 1.0));
        }
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 5.0).unwrap();

        sim.run(1);
        let kb = sim.host().knockbacks_for(id);
        assert!((kb[0].z - 1.0).abs() < 1e-9);
        assert!((kb[0].horizontal_strength - 0.18).abs() < 1e-9);
    }

    #[test]
    fn invalid_gravity_is_rejected_without_change() {
        let mut world = MemoryWorld::new();
        let id = spawn_player(&mut world, 64.0, true);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 3.0).unwrap();

        for bad in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                sim.set_gravity(id, bad),
                Err(SimError::InvalidGravityValue { .. })
            ));
            assert!(sim.set_temporary_gravity(id, bad).is_err());
        }
        assert_eq!(sim.gravity(id), 3.0);
        assert!(matches!(
            sim.set_gravity(EntityId::new(), 3.0),
            Err(SimError::EntityNotFound(_))
        ));
    }

    #[test]
    fn temporary_gravity_does_not_survive_session() {
        let mut world = MemoryWorld::new();
        let id = spawn_player(&mut world, 64.0, true);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 3.7).unwrap();
        sim.set_temporary_gravity(id, 5.0).unwrap();
        assert_eq!(sim.gravity(id), 5.0);

        let world = sim.into_host();
        assert_eq!(world.property(id, GRAVITY_PROPERTY), Some(3.7));
        let sim = Simulation::new(world, SimConfig::default());
        assert_eq!(sim.gravity(id), 3.7);
    }

    #[test]
    fn region_gravity_targets_players_only() {
        let mut world = MemoryWorld::new();
        let player = spawn_player(&mut world, 64.0, true);
        let zombie = world.spawn(EntityRecord::mob("minecraft:zombie", overworld(), Vec3::ZERO));
        let elsewhere = world.spawn(EntityRecord::player(
            "Sam",
            RegionId::new("moon"),
            Vec3::ZERO,
        ));
        let mut sim = Simulation::new(world, SimConfig::default());

        assert_eq!(sim.assign_region_gravity(&overworld(), 1.6).unwrap(), 1);
        assert_eq!(sim.gravity(player), 1.6);
        assert_eq!(sim.gravity(zombie), 9.8);
        assert_eq!(sim.gravity(elsewhere), 9.8);
        assert!(sim.assign_region_gravity(&overworld(), -1.0).is_err());
        assert_eq!(sim.gravity(player), 1.6);
    }

    #[test]
    fn mace_hit_spends_fall_and_restarts_episode() {
        let mut world = MemoryWorld::new();
        let attacker = spawn_player(&mut world, 80.0, false);
        if let Some(equipment) = world.get_mut(attacker).and_then(|r| r.equipment.as_mut()) {
            equipment.insert(EquipmentSlot::MainHand, ItemType::new(ItemType::MACE));
        }
        let victim = world.spawn(EntityRecord::mob("minecraft:zombie", overworld(), Vec3::ZERO));
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(attacker, 5.0).unwrap();
        step(&mut sim, 2);
        sim.host_mut().set_property(attacker, FALL_DISTANCE_PROPERTY, Some(4.5));

        let strike = sim.handle_hit(HitEvent { attacker, victim }).unwrap();
        assert!((strike.damage - 24.0).abs() < 1e-9);
        assert_eq!(sim.host().property(attacker, FALL_DISTANCE_PROPERTY), Some(0.0));
        let y = sim.host().get(attacker).unwrap().location.y;
        assert_eq!(sim.gravity_system().state(attacker).unwrap().jump_start_y, Some(y));
        assert!(has_event(&sim, |k| matches!(k, SimEventKind::MaceStrike { .. })));
    }

    #[test]
    fn grabbing_a_ladder_ends_the_fall_episode() {
        let mut world = MemoryWorld::new();
        let id = spawn_player(&mut world, 80.0, false);
        if let Some(equipment) = world.get_mut(id).and_then(|r| r.equipment.as_mut()) {
            equipment.insert(EquipmentSlot::MainHand, ItemType::new(ItemType::MACE));
        }
        let victim = world.spawn(EntityRecord::mob("minecraft:zombie", overworld(), Vec3::ZERO));
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 5.0).unwrap();

        sim.tick();
        if let Some(record) = sim.host_mut().get_mut(id) {
            record.location.y = 76.0;
        }
        sim.tick();
        assert_eq!(sim.host().property(id, FALL_DISTANCE_PROPERTY), Some(4.0));

        if let Some(record) = sim.host_mut().get_mut(id) {
            record.flags.climbing = true;
        }
        sim.tick();
        assert_eq!(sim.host().property(id, FALL_DISTANCE_PROPERTY), Some(0.0));
        assert!(sim.gravity_system().state(id).unwrap().jump_start_y.is_none());

        if let Some(record) = sim.host_mut().get_mut(id) {
            record.flags.climbing = false;
            record.flags.on_ground = true;
        }
        sim.tick();
        assert_eq!(sim.host().property(id, FALL_DISTANCE_PROPERTY), Some(0.0));
        assert!(sim.gravity_system().state(id).unwrap().jump_start_y.is_none());
        assert!(!has_event(&sim, |k| matches!(k, SimEventKind::Landed { .. })));

        let strike = sim.handle_hit(HitEvent { attacker: id, victim }).unwrap();
        assert_eq!(strike.damage, 0.0);
    }

    #[test]
    fn landing_on_a_ladder_base_reports_the_fall() {
        let mut world = MemoryWorld::new();
        let id = spawn_player(&mut world, 80.0, false);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 5.0).unwrap();

        sim.tick();
        if let Some(record) = sim.host_mut().get_mut(id) {
            record.location.y = 77.0;
        }
        sim.tick();
        if let Some(record) = sim.host_mut().get_mut(id) {
            record.flags.on_ground = true;
            record.flags.climbing = true;
        }
        sim.tick();

        let landed = sim.events().events().iter().find_map(|e| match e.kind {
            SimEventKind::Landed { fall_distance, .. } => Some(fall_distance),
            _ => None,
        });
        assert_eq!(landed, Some(3.0));
        assert_eq!(sim.host().property(id, FALL_DISTANCE_PROPERTY), Some(0.0));
    }

    #[test]
    fn despawned_entities_are_pruned() {
        let mut world = MemoryWorld::new();
        let id = spawn_player(&mut world, 80.0, false);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.set_gravity(id, 5.0).unwrap();
        sim.tick();
        assert!(sim.gravity_system().state(id).is_some());

        sim.host_mut().despawn(id);
        sim.run(5);
        assert!(sim.gravity_system().state(id).is_none());
        assert!(sim.gravity_system().registry().is_empty());
    }
}
