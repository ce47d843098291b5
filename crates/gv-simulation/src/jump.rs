//! Jump sequencer.
//!
//! A jump is a short run of scheduled steps, one per tick. Each step applies
//! a sine-shaped slice of the jump impulse, so the arc ramps up and back
//! down over the window instead of arriving in a single kick. A sequence
//! stops early when the entity lands or runs into a block; starting a new
//! sequence always cancels the one in flight.

use std::f64::consts::PI;

use gv_core::{EffectKind, EntityId, EntitySnapshot, Knockback};
use log::{debug, warn};

use crate::config::SimConfig;
use crate::context::SimContext;
use crate::driver::GravityTask;
use crate::event::{JumpEnd, SimEventKind};
use crate::probe::EnvironmentProbe;
use crate::scheduler::TickScheduler;
use crate::state::{EntityGravityState, JumpPhase};
use crate::vector::steering_direction;

const LINE_BASE_LENGTH: f64 = 18.0;
const LINE_STANDARD_GRAVITY: f64 = 9.8;
const LINE_TAPER: f64 = 6.0;
const LINE_SCALE: f64 = 5.0;
const MIN_GRAVITY_MOD: f64 = 0.1;
const MIN_GRAVITY_DIVISOR: f64 = 0.005;

/// Multiplier from the jump boost effect level.
pub fn jump_boost_factor(level: u32) -> f64 {
    f64::from(level) * 0.2 + 1.0
}

/// The queued impulses that shape the first ticks of a jump.
///
/// Lower gravity yields a longer, stronger line. Every element is negative
/// (it is added to the downward vertical power) and the magnitude tapers
/// towards the back of the queue.
pub fn jump_line(gravity: f64, jump_boost_level: u32) -> Vec<f64> {
    let length = (LINE_BASE_LENGTH + LINE_STANDARD_GRAVITY - gravity)
        .floor()
        .max(0.0) as usize;
    let gravity_mod = ((LINE_STANDARD_GRAVITY - gravity) / 10.0 + 1.0).max(MIN_GRAVITY_MOD);
    let divisor = gravity.min(1.0).max(MIN_GRAVITY_DIVISOR);
    let boost = jump_boost_factor(jump_boost_level);
    (0..length)
        .map(|i| {
            let remaining = (length - i) as f64;
            (remaining / LINE_TAPER) * -gravity_mod * LINE_SCALE * boost / divisor
        })
        .collect()
}

/// Peak per-step impulse for a jump under `gravity`.
pub fn per_tick_impulse(gravity: f64, jump_boost_level: u32, config: &SimConfig) -> f64 {
    let height = config.base_jump_height * jump_boost_factor(jump_boost_level);
    (2.0 * gravity * height).sqrt() / f64::from(config.jump_ticks.max(1))
}

/// Impulse applied at `step` of a `ticks`-long sequence.
pub fn step_impulse(peak: f64, step: u32, ticks: u32) -> f64 {
    peak * (f64::from(step) / f64::from(ticks.max(1)) * PI).sin()
}

/// Start a jump sequence, replacing any sequence already in flight.
pub fn start(
    ctx: &mut SimContext<'_>,
    state: &mut EntityGravityState,
    scheduler: &mut TickScheduler<GravityTask>,
    snapshot: &EntitySnapshot,
    gravity: f64,
) {
    cancel(state, scheduler);

    let level = snapshot.effect_level(&EffectKind::JumpBoost);
    let now = ctx.tick();
    let start_y = snapshot.location.y;

    state.set_gravity_line(jump_line(gravity, level));
    state.jump_start_y = Some(start_y);
    state.jump_started_at = Some(now);
    let handle = scheduler.schedule(
        now,
        1,
        GravityTask::JumpStep {
            entity: snapshot.id,
            step: 0,
        },
    );
    state.jump = JumpPhase::Running {
        step: 0,
        handle,
        impulse: per_tick_impulse(gravity, level, ctx.config),
    };

    debug!("entity {} jump started at y={start_y:.2} ({handle})", snapshot.id);
    ctx.emit(
        SimEventKind::JumpStarted {
            entity: snapshot.id,
            start_y,
        },
        format!("jump started at y={start_y:.2}"),
    );
}

/// Cancel the sequence in flight, if any. Returns `true` if one was running.
///
/// Safe to call any number of times.
pub fn cancel(
    state: &mut EntityGravityState,
    scheduler: &mut TickScheduler<GravityTask>,
) -> bool {
    match state.jump {
        JumpPhase::Running { handle, .. } => {
            scheduler.cancel(handle);
            state.jump = JumpPhase::Idle;
            state.jump_started_at = None;
            true
        }
        JumpPhase::Idle | JumpPhase::Armed => false,
    }
}

/// Record that a running sequence was cancelled.
pub fn report_cancelled(ctx: &mut SimContext<'_>, entity: EntityId) {
    debug!("entity {entity} jump cancelled");
    ctx.emit(
        SimEventKind::JumpEnded {
            entity,
            reason: JumpEnd::Cancelled,
        },
        "jump cancelled",
    );
}

/// Run step `step` of the sequence and schedule the next one.
pub fn advance(
    ctx: &mut SimContext<'_>,
    state: &mut EntityGravityState,
    scheduler: &mut TickScheduler<GravityTask>,
    entity: EntityId,
    step: u32,
) {
    let JumpPhase::Running { impulse, .. } = state.jump else {
        return;
    };
    let Some(snapshot) = ctx.host.entity(entity) else {
        state.jump = JumpPhase::Idle;
        state.jump_started_at = None;
        return;
    };

    let ticks = ctx.config.jump_ticks;
    let stop = {
        let probe = EnvironmentProbe::new(&*ctx.host, &snapshot);
        if snapshot.flags.on_ground {
            Some(JumpEnd::Landed)
        } else if step >= ticks {
            Some(JumpEnd::Completed)
        } else if probe.blocked_above() {
            Some(JumpEnd::ObstructedAbove)
        } else if probe.blocked_ahead(steering_direction(&snapshot)) {
            Some(JumpEnd::ObstructedAhead)
        } else {
            None
        }
    };
    if let Some(reason) = stop {
        finish(ctx, state, entity, reason);
        return;
    }

    let lift = step_impulse(impulse, step, ticks);
    if let Err(e) = ctx.host.apply_knockback(entity, Knockback::vertical(lift)) {
        warn!("entity {entity} jump impulse rejected: {e}");
        finish(ctx, state, entity, JumpEnd::ImpulseRejected);
        return;
    }

    let next = step + 1;
    let handle = scheduler.schedule(
        ctx.tick(),
        1,
        GravityTask::JumpStep {
            entity,
            step: next,
        },
    );
    state.jump = JumpPhase::Running {
        step: next,
        handle,
        impulse,
    };
}

fn finish(
    ctx: &mut SimContext<'_>,
    state: &mut EntityGravityState,
    entity: EntityId,
    reason: JumpEnd,
) {
    state.jump = JumpPhase::Idle;
    state.jump_started_at = None;
    debug!("entity {entity} jump ended: {reason}");
    ctx.emit(
        SimEventKind::JumpEnded { entity, reason },
        format!("jump ended: {reason}"),
    );
}
