use gv_core::ItemType;
use serde::{Deserialize, Serialize};

/// Configuration for a simulation run.
///
/// Every field has a default, so a partial JSON object deserializes into a
/// complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Gravity an entity has when nothing overrides it.
    pub standard_gravity: f64,
    /// Entities within this distance of standard gravity are left to the host.
    pub standard_tolerance: f64,
    /// Fall velocity below which a bounce surface bounces the entity.
    pub bounce_threshold: f64,
    /// Share of fall speed kept as upward impulse on a bounce.
    pub bounce_retention: f64,
    /// Gravity divisor for fall acceleration just above a bounce surface.
    pub gentle_fall_divisor: f64,
    /// Gravity divisor for fall acceleration everywhere else.
    pub steep_fall_divisor: f64,
    /// Divisor scaling the computed vertical power into a knockback impulse.
    pub knockback_divisor: f64,
    /// Length of a jump sequence in ticks.
    pub jump_ticks: u32,
    /// Jump height in blocks before jump boost.
    pub base_jump_height: f64,
    /// Delay before the cosmetic slow-fall effect is applied.
    pub slow_fall_delay_ticks: u64,
    /// Duration of the cosmetic slow-fall effect.
    pub slow_fall_duration_ticks: u32,
    /// Amplifier of the cosmetic slow-fall effect.
    pub slow_fall_amplifier: u32,
    /// Chest item that lets a player glide, exempting it from the simulation.
    pub flight_item: String,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            standard_gravity: 9.8,
            standard_tolerance: 1e-4,
            bounce_threshold: -1.0,
            bounce_retention: 0.8,
            gentle_fall_divisor: 100.0,
            steep_fall_divisor: 50.0,
            knockback_divisor: 40.0,
            jump_ticks: 20,
            base_jump_height: 1.25,
            slow_fall_delay_ticks: 2,
            slow_fall_duration_ticks: 1,
            slow_fall_amplifier: 1,
            flight_item: ItemType::ELYTRA.to_string(),
            max_events: 0,
        }
    }
}

impl SimConfig {
    /// Set the gravity treated as "no override".
    pub fn with_standard_gravity(mut self, gravity: f64) -> Self {
        self.standard_gravity = gravity;
        self
    }

    /// Set the jump sequence length in ticks.
    pub fn with_jump_ticks(mut self, ticks: u32) -> Self {
        self.jump_ticks = ticks;
        self
    }

    /// Set the delay before the cosmetic slow-fall effect.
    pub fn with_slow_fall_delay(mut self, ticks: u64) -> Self {
        self.slow_fall_delay_ticks = ticks;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Return `true` if `gravity` is close enough to standard to leave alone.
    pub fn is_standard_gravity(&self, gravity: f64) -> bool {
        (gravity - self.standard_gravity).abs() < self.standard_tolerance
    }
}
