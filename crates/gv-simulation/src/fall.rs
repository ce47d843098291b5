//! Fall-effect applier.
//!
//! Applies the airborne part of a tick: the scaled impulse, fall
//! acceleration, fall distance bookkeeping, and the deferred cosmetic
//! slow-fall effect. A bounce surface below a fast-falling entity replaces
//! all of that with a single upward impulse.

use gv_core::host::FALL_DISTANCE_PROPERTY;
use gv_core::{EntitySnapshot, Knockback};
use log::{debug, warn};

use crate::context::SimContext;
use crate::driver::GravityTask;
use crate::event::SimEventKind;
use crate::probe::EnvironmentProbe;
use crate::scheduler::TickScheduler;
use crate::state::EntityGravityState;
use crate::vector::GravityVector;

/// What one airborne tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FallOutcome {
    /// The entity bounced with the given upward impulse.
    Bounced(f64),
    /// The entity kept falling; carries the recorded fall distance.
    Falling(f64),
}

/// Apply one airborne tick to an entity.
pub fn apply(
    ctx: &mut SimContext<'_>,
    state: &mut EntityGravityState,
    scheduler: &mut TickScheduler<GravityTask>,
    snapshot: &EntitySnapshot,
    vector: &GravityVector,
    gravity: f64,
) -> FallOutcome {
    let id = snapshot.id;
    let config = ctx.config;
    let on_bounce_surface = EnvironmentProbe::new(&*ctx.host, snapshot)
        .below()
        .is_bounce_surface();

    if on_bounce_surface && state.fall_velocity < config.bounce_threshold {
        let up = state.fall_velocity.abs() * config.bounce_retention;
        let knockback = Knockback::new(vector.x, vector.z, vector.horizontal_power, up);
        if let Err(e) = ctx.host.apply_knockback(id, knockback) {
            warn!("entity {id} bounce rejected: {e}");
        }
        state.fall_velocity = up;
        debug!("entity {id} bounced with impulse {up:.3}");
        ctx.emit(
            SimEventKind::Bounced {
                entity: id,
                impulse: up,
            },
            format!("bounced with impulse {up:.3}"),
        );
        return FallOutcome::Bounced(up);
    }

    let divisor = if on_bounce_surface {
        config.gentle_fall_divisor
    } else {
        config.steep_fall_divisor
    };
    let vertical = (vector.y * 2.0 + state.fall_velocity.min(0.0)) / config.knockback_divisor;
    let knockback = Knockback::new(vector.x, vector.z, vector.horizontal_power, vertical);
    if let Err(e) = ctx.host.apply_knockback(id, knockback) {
        warn!("entity {id} fall impulse rejected: {e}");
    }
    state.fall_velocity -= gravity / divisor;

    let start_y = *state.jump_start_y.get_or_insert(snapshot.location.y);
    let recorded = ctx.host.property(id, FALL_DISTANCE_PROPERTY).unwrap_or(0.0);
    let fall_distance = recorded.max((start_y - snapshot.location.y).max(0.0));
    ctx.host.set_property(id, FALL_DISTANCE_PROPERTY, Some(fall_distance));

    scheduler.schedule(
        ctx.tick(),
        config.slow_fall_delay_ticks,
        GravityTask::SlowFall { entity: id },
    );

    FallOutcome::Falling(fall_distance)
}
