//! Tick-based gravity simulation for Gravitas.
//!
//! Replaces a host engine's fixed downward acceleration with a per-entity
//! gravity value. Each tick the [`driver::GravitySystem`] walks every live
//! entity, derives a single impulse from its gravity, jump state, and
//! movement input, and hands it back to the host. Simulation state (fall
//! velocity, queued jump impulses, pending callbacks) is kept in a registry
//! keyed by entity id, never on the entities themselves.

/// Simulation clock for tracking ticks.
pub mod clock;
/// Configuration types for simulation runs.
pub mod config;
/// Mutable context passed to the driver each tick.
pub mod context;
/// Per-tick simulation driver.
pub mod driver;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Fall-effect applier: impulses, fall velocity, bounce, fall distance.
pub mod fall;
/// Gravity value store.
pub mod gravity;
/// Jump sequencer.
pub mod jump;
/// Block probes relative to an entity.
pub mod probe;
/// Delayed callbacks with cancellable handles.
pub mod scheduler;
/// Top-level simulation orchestrator.
pub mod simulation;
/// Per-entity simulation state registry.
pub mod state;
/// Gravity vector engine.
pub mod vector;

/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-export of [`config::SimConfig`].
pub use config::SimConfig;
/// Re-export of [`context::SimContext`].
pub use context::SimContext;
/// Re-exports of [`driver::GravitySystem`] and [`driver::GravityTask`].
pub use driver::{GravitySystem, GravityTask};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], and [`event::SimEventKind`].
pub use event::{EventLog, JumpEnd, SimEvent, SimEventKind};
/// Re-exports of the scheduler types.
pub use scheduler::{TaskHandle, TickScheduler};
/// Re-export of [`simulation::Simulation`].
pub use simulation::Simulation;
/// Re-exports of the state types.
pub use state::{EntityGravityState, JumpPhase, StateRegistry};
/// Re-export of [`vector::GravityVector`].
pub use vector::GravityVector;
