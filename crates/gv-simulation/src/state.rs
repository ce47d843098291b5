use std::collections::{HashMap, VecDeque};

use gv_core::EntityId;

use crate::scheduler::TaskHandle;

/// Where an entity is in its jump cycle.
///
/// `Armed` is entered on ground contact and is the only phase from which a
/// jump can start. A finished or cancelled sequence returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum JumpPhase {
    /// Not armed and no sequence in flight.
    #[default]
    Idle,
    /// Grounded since the last jump; the next jump input starts a sequence.
    Armed,
    /// A sequence is in flight.
    Running {
        /// The step the pending callback will execute.
        step: u32,
        /// The pending callback.
        handle: TaskHandle,
        /// Peak vertical impulse of this sequence.
        impulse: f64,
    },
}

/// Simulation state for a single entity.
#[derive(Debug, Clone, Default)]
pub struct EntityGravityState {
    /// Session-only gravity override.
    pub temporary_gravity: Option<f64>,
    /// Pending vertical impulse contributions, front first.
    pub gravity_line: VecDeque<f64>,
    /// Accumulated fall speed; negative is downward.
    pub fall_velocity: f64,
    /// Height the current jump or fall started from.
    pub jump_start_y: Option<f64>,
    /// Jump cycle phase.
    pub jump: JumpPhase,
    /// Tick the current sequence started on.
    pub jump_started_at: Option<u64>,
    /// Whether the entity was simulated as airborne on its last tick.
    pub airborne_last_tick: bool,
}

impl EntityGravityState {
    /// Return `true` if a jump can start.
    pub fn is_armed(&self) -> bool {
        self.jump == JumpPhase::Armed
    }

    /// The pending jump callback, if a sequence is in flight.
    pub fn pending_jump(&self) -> Option<TaskHandle> {
        match self.jump {
            JumpPhase::Running { handle, .. } => Some(handle),
            JumpPhase::Idle | JumpPhase::Armed => None,
        }
    }

    /// Replace the gravity line wholesale.
    pub fn set_gravity_line(&mut self, line: impl IntoIterator<Item = f64>) {
        self.gravity_line = line.into_iter().collect();
    }

    /// Pop the front of the gravity line; an empty line contributes zero.
    pub fn consume_gravity_line(&mut self) -> f64 {
        self.gravity_line.pop_front().unwrap_or(0.0)
    }
}

/// Per-entity state keyed by entity id.
///
/// Entries are created lazily the first time an entity is simulated and
/// dropped once the host reports the entity gone.
#[derive(Debug, Default)]
pub struct StateRegistry {
    states: HashMap<EntityId, EntityGravityState>,
}

impl StateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// State for an entity, if tracked.
    pub fn get(&self, id: EntityId) -> Option<&EntityGravityState> {
        self.states.get(&id)
    }

    /// Mutable state for an entity, if tracked.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityGravityState> {
        self.states.get_mut(&id)
    }

    /// State for an entity, created on first use.
    pub fn entry(&mut self, id: EntityId) -> &mut EntityGravityState {
        self.states.entry(id).or_default()
    }

    /// Stop tracking an entity.
    pub fn remove(&mut self, id: EntityId) -> Option<EntityGravityState> {
        self.states.remove(&id)
    }

    /// Remove every entry whose entity fails `is_alive`, returning them.
    pub fn prune(
        &mut self,
        mut is_alive: impl FnMut(EntityId) -> bool,
    ) -> Vec<(EntityId, EntityGravityState)> {
        let dead: Vec<EntityId> = self
            .states
            .keys()
            .copied()
            .filter(|id| !is_alive(*id))
            .collect();
        dead.into_iter()
            .filter_map(|id| self.states.remove(&id).map(|state| (id, state)))
            .collect()
    }

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Return `true` if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_gravity_line_contributes_zero() {
        let mut state = EntityGravityState::default();
        assert_eq!(state.consume_gravity_line(), 0.0);
    }

    #[test]
    fn gravity_line_is_fifo_and_replaced_wholesale() {
        let mut state = EntityGravityState::default();
        state.set_gravity_line([1.0, 2.0, 3.0]);
        assert_eq!(state.consume_gravity_line(), 1.0);
        state.set_gravity_line([9.0]);
        assert_eq!(state.consume_gravity_line(), 9.0);
        assert!(state.gravity_line.is_empty());
    }

    #[test]
    fn entry_is_lazy() {
        let mut registry = StateRegistry::new();
        let id = EntityId::new();
        assert!(registry.get(id).is_none());
        registry.entry(id).fall_velocity = -2.0;
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id).unwrap().fall_velocity, -2.0);
    }

    #[test]
    fn prune_removes_dead_entities() {
        let mut registry = StateRegistry::new();
        let alive = EntityId::new();
        let dead = EntityId::new();
        registry.entry(alive);
        registry.entry(dead);

        let removed = registry.prune(|id| id == alive);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].0, dead);
        assert!(registry.get(alive).is_some());
        assert!(registry.get(dead).is_none());
    }

    #[test]
    fn phase_reports_pending_handle() {
        let mut state = EntityGravityState::default();
        assert!(!state.is_armed());
        state.jump = JumpPhase::Armed;
        assert!(state.is_armed());
        assert!(state.pending_jump().is_none());
    }
}
