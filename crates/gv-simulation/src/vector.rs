//! Gravity vector engine.
//!
//! Turns an entity's gravity value, jump state, and movement input into the
//! single impulse the host applies this tick.

use gv_core::math::lateral_direction;
use gv_core::{EffectKind, EntitySnapshot, Vec3};

use crate::context::SimContext;
use crate::driver::GravityTask;
use crate::jump;
use crate::scheduler::TickScheduler;
use crate::state::{EntityGravityState, JumpPhase};

const BASE_HORIZONTAL_POWER: f64 = 0.18;
const SPRINT_BONUS: f64 = 0.2;
const SNEAK_PENALTY: f64 = 0.1;
const EFFECT_LEVEL_STEP: f64 = 0.2;

/// The per-tick impulse for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GravityVector {
    /// Horizontal steering, x component.
    pub x: f64,
    /// Vertical component; negative is downward.
    pub y: f64,
    /// Horizontal steering, z component.
    pub z: f64,
    /// Scale applied to the horizontal components.
    pub horizontal_power: f64,
}

impl GravityVector {
    /// The horizontal part as a vector.
    pub fn horizontal(&self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }

    /// Drop horizontal steering.
    pub fn clear_horizontal(&mut self) {
        self.x = 0.0;
        self.z = 0.0;
    }
}

/// Horizontal impulse scale from speed effects and sprint/sneak state.
pub fn horizontal_power(snapshot: &EntitySnapshot) -> f64 {
    let speed = f64::from(snapshot.effect_level(&EffectKind::Speed));
    let slowness = f64::from(snapshot.effect_level(&EffectKind::Slowness));
    let mut gait = BASE_HORIZONTAL_POWER;
    if snapshot.flags.sprinting {
        gait += SPRINT_BONUS;
    }
    if snapshot.flags.sneaking {
        gait -= SNEAK_PENALTY;
    }
    ((speed - slowness) * EFFECT_LEVEL_STEP + 1.0) * gait
}

/// Direction a player is steering in, from view direction and movement
/// input. Zero for non-players and entities without input.
pub fn steering_direction(snapshot: &EntitySnapshot) -> Vec3 {
    if !snapshot.kind.is_player() {
        return Vec3::ZERO;
    }
    let Some(input) = snapshot.movement.as_ref().available().copied() else {
        return Vec3::ZERO;
    };
    let view = snapshot.view_direction;
    let lateral = lateral_direction(snapshot.rotation);
    Vec3::new(
        view.x * input.y - lateral.x * input.x,
        0.0,
        view.z * input.y - lateral.z * input.x,
    )
}

/// Compute this tick's vector, starting or re-arming a jump as a side effect.
pub fn compute(
    ctx: &mut SimContext<'_>,
    state: &mut EntityGravityState,
    scheduler: &mut TickScheduler<GravityTask>,
    snapshot: &EntitySnapshot,
    gravity: f64,
) -> GravityVector {
    let mut vertical = gravity / 2.0;

    if snapshot.flags.jumping && state.is_armed() {
        jump::start(ctx, state, scheduler, snapshot, gravity);
    } else if snapshot.flags.on_ground {
        if jump::cancel(state, scheduler) {
            jump::report_cancelled(ctx, snapshot.id);
        }
        state.jump = JumpPhase::Armed;
    }

    vertical += state.consume_gravity_line();

    let steering = steering_direction(snapshot);
    GravityVector {
        x: steering.x,
        y: vertical * Vec3::DOWN.y,
        z: steering.z,
        horizontal_power: horizontal_power(snapshot),
    }
}
