use gv_core::host::FALL_DISTANCE_PROPERTY;
use gv_core::{EffectKind, EntityId, EntitySnapshot, EquipmentSlot, StatusEffect};
use log::{debug, warn};

use crate::config::SimConfig;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::SimEventKind;
use crate::fall;
use crate::gravity;
use crate::jump;
use crate::probe::EnvironmentProbe;
use crate::scheduler::{TaskHandle, TickScheduler};
use crate::state::{EntityGravityState, JumpPhase, StateRegistry};
use crate::vector;

/// Deferred work the gravity system schedules for itself.
///
/// Tasks carry only entity ids; the entity is looked up again when the task
/// runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GravityTask {
    /// Run one step of a jump sequence.
    JumpStep {
        /// The jumping entity.
        entity: EntityId,
        /// The step to run.
        step: u32,
    },
    /// Apply the cosmetic slow-fall effect.
    SlowFall {
        /// The falling entity.
        entity: EntityId,
    },
}

/// Per-tick driver: runs due tasks, then simulates every live entity in
/// every region, then forgets entities the host no longer has.
#[derive(Debug, Default)]
pub struct GravitySystem {
    registry: StateRegistry,
    scheduler: TickScheduler<GravityTask>,
}

impl GravitySystem {
    /// Create a system with no tracked entities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-entity state.
    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    /// Pending deferred tasks.
    pub fn scheduler(&self) -> &TickScheduler<GravityTask> {
        &self.scheduler
    }

    /// State for an entity, if it has been simulated.
    pub fn state(&self, id: EntityId) -> Option<&EntityGravityState> {
        self.registry.get(id)
    }

    /// Set the session-only gravity override for an entity.
    pub fn set_temporary_gravity(&mut self, id: EntityId, value: f64) -> SimResult<()> {
        if !gravity::can_set(value) {
            return Err(SimError::InvalidGravityValue { value });
        }
        gravity::set_temporary(self.registry.entry(id), value)
    }

    /// Drop the session-only override. Returns `false` if none was set.
    pub fn clear_temporary_gravity(&mut self, id: EntityId) -> bool {
        match self.registry.get_mut(id) {
            Some(state) if state.temporary_gravity.is_some() => {
                gravity::clear_temporary(state);
                true
            }
            _ => false,
        }
    }

    /// Cancel the entity's jump sequence, if one is running.
    pub fn cancel_jump(&mut self, id: EntityId) -> bool {
        match self.registry.get_mut(id) {
            Some(state) => jump::cancel(state, &mut self.scheduler),
            None => false,
        }
    }

    /// Start a new fall episode at height `y`.
    pub fn restart_fall(&mut self, id: EntityId, y: f64) {
        if let Some(state) = self.registry.get_mut(id) {
            state.jump_start_y = Some(y);
        }
    }

    fn run_task(&mut self, ctx: &mut SimContext<'_>, handle: TaskHandle, task: GravityTask) {
        match task {
            GravityTask::JumpStep { entity, step } => {
                let Some(state) = self.registry.get_mut(entity) else {
                    return;
                };
                let current =
                    matches!(state.jump, JumpPhase::Running { handle: h, .. } if h == handle);
                if current {
                    jump::advance(ctx, state, &mut self.scheduler, entity, step);
                }
            }
            GravityTask::SlowFall { entity } => apply_slow_fall(ctx, entity),
        }
    }

    fn simulate(&mut self, ctx: &mut SimContext<'_>, id: EntityId) {
        let Some(snapshot) = ctx.host.entity(id) else {
            self.forget(id);
            return;
        };

        if is_exempt(&snapshot, ctx.config) {
            if let Some(state) = self.registry.get_mut(id) {
                state.fall_velocity = 0.0;
            }
            return;
        }

        let standard = ctx.config.standard_gravity;
        let g = gravity::get(&*ctx.host, self.registry.get(id), id, standard);
        if ctx.config.is_standard_gravity(g) {
            if let Some(state) = self.registry.get_mut(id) {
                if jump::cancel(state, &mut self.scheduler) {
                    jump::report_cancelled(ctx, id);
                }
                state.fall_velocity = 0.0;
                state.airborne_last_tick = false;
            }
            return;
        }

        let now = ctx.tick();
        let state = self.registry.entry(id);
        let mut vector = vector::compute(ctx, state, &mut self.scheduler, &snapshot, g);

        let heading = vector.horizontal();
        if EnvironmentProbe::new(&*ctx.host, &snapshot).hemmed_in(heading) {
            vector.clear_horizontal();
        }

        let flags = snapshot.flags;
        if !flags.on_ground && !flags.climbing && !flags.swimming {
            fall::apply(ctx, state, &mut self.scheduler, &snapshot, &vector, g);
            state.airborne_last_tick = true;
            return;
        }

        state.fall_velocity = 0.0;
        if state.jump_started_at != Some(now) && jump::cancel(state, &mut self.scheduler) {
            jump::report_cancelled(ctx, id);
        }
        let was_airborne = std::mem::replace(&mut state.airborne_last_tick, false);
        if was_airborne {
            self.end_fall(ctx, id, flags.on_ground);
        }
    }

    /// Close the fall episode of an entity that stopped being airborne.
    ///
    /// Grabbing a climbable ends the episode the same way touching the
    /// ground does; only a ground contact reports a landing.
    fn end_fall(&mut self, ctx: &mut SimContext<'_>, id: EntityId, landed: bool) {
        let fall_distance = ctx.host.property(id, FALL_DISTANCE_PROPERTY).unwrap_or(0.0);
        ctx.host.set_property(id, FALL_DISTANCE_PROPERTY, Some(0.0));
        if let Some(state) = self.registry.get_mut(id) {
            state.jump_start_y = None;
        }
        if !landed {
            debug!("entity {id} caught a climbable after falling {fall_distance:.2}");
            return;
        }
        debug!("entity {id} landed after falling {fall_distance:.2}");
        ctx.emit(
            SimEventKind::Landed {
                entity: id,
                fall_distance,
            },
            format!("landed after falling {fall_distance:.2} blocks"),
        );
    }

    fn forget(&mut self, id: EntityId) {
        if let Some(mut state) = self.registry.remove(id) {
            jump::cancel(&mut state, &mut self.scheduler);
        }
    }

    /// Run one driver pass: due tasks, every entity in every region, then
    /// pruning.
    pub fn tick(&mut self, ctx: &mut SimContext<'_>) {
        for (handle, task) in self.scheduler.drain_due(ctx.tick()) {
            self.run_task(ctx, handle, task);
        }

        for region in ctx.host.regions() {
            for id in ctx.host.entities_in(&region) {
                self.simulate(ctx, id);
            }
        }

        self.prune(ctx);
    }

    fn prune(&mut self, ctx: &SimContext<'_>) {
        for (id, mut state) in self.registry.prune(|id| ctx.host.is_valid(id)) {
            jump::cancel(&mut state, &mut self.scheduler);
            debug!("entity {id} gone; state dropped");
        }
    }
}

/// Swimming entities, and players that fly, glide, or wear the flight item,
/// are left to the host's own physics.
fn is_exempt(snapshot: &EntitySnapshot, config: &SimConfig) -> bool {
    let flags = snapshot.flags;
    if flags.swimming {
        return true;
    }
    snapshot.kind.is_player()
        && (flags.flying
            || flags.gliding
            || snapshot.has_equipped(EquipmentSlot::Chest, &config.flight_item))
}

fn apply_slow_fall(ctx: &mut SimContext<'_>, entity: EntityId) {
    if !ctx.host.is_valid(entity) {
        return;
    }
    let effect = StatusEffect {
        effect: EffectKind::SlowFalling,
        duration_ticks: ctx.config.slow_fall_duration_ticks,
        amplifier: ctx.config.slow_fall_amplifier,
        show_particles: false,
    };
    if let Err(e) = ctx.host.add_effect(entity, effect) {
        warn!("entity {entity} slow-fall effect failed: {e}");
        ctx.emit(
            SimEventKind::EffectFailed {
                entity,
                reason: e.to_string(),
            },
            format!("slow-fall effect failed: {e}"),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use gv_core::{Capability, EntityKind, ItemType, RegionId, Vec3};

    use super::*;

    fn snapshot(kind: EntityKind) -> EntitySnapshot {
        EntitySnapshot::new(EntityId::new(), kind, RegionId::new("overworld"), Vec3::ZERO)
    }

    #[test]
    fn exemptions() {
        let config = SimConfig::default();

        let walker = snapshot(EntityKind::Player);
        assert!(!is_exempt(&walker, &config));

        let mut swimmer = snapshot(EntityKind::Mob("minecraft:cod".into()));
        swimmer.flags.swimming = true;
        assert!(is_exempt(&swimmer, &config));

        let mut glider = snapshot(EntityKind::Player);
        glider.flags.gliding = true;
        assert!(is_exempt(&glider, &config));

        let mut winged = snapshot(EntityKind::Player);
        winged.equipment = Capability::Available(HashMap::from([(
            EquipmentSlot::Chest,
            ItemType::new(ItemType::ELYTRA),
        )]));
        assert!(is_exempt(&winged, &config));
    }

    #[test]
    fn flying_mobs_are_simulated() {
        let config = SimConfig::default();
        let mut phantom = snapshot(EntityKind::Mob("minecraft:phantom".into()));
        phantom.flags.flying = true;
        assert!(!is_exempt(&phantom, &config));
    }

    #[test]
    fn temporary_override_requires_valid_value() {
        let mut system = GravitySystem::new();
        let id = EntityId::new();
        assert!(system.set_temporary_gravity(id, -1.0).is_err());
        assert!(system.state(id).is_none());
        system.set_temporary_gravity(id, 2.0).unwrap();
        assert!(system.clear_temporary_gravity(id));
        assert!(!system.clear_temporary_gravity(id));
    }
}
