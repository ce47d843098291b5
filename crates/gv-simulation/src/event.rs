use std::fmt;

use gv_core::EntityId;

/// Why a jump sequence stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpEnd {
    /// All steps ran.
    Completed,
    /// The entity touched the ground.
    Landed,
    /// A block sits above the entity's head.
    ObstructedAbove,
    /// A block sits in the direction of movement.
    ObstructedAhead,
    /// The host could not apply the impulse.
    ImpulseRejected,
    /// The entity was grounded or its gravity returned to standard.
    Cancelled,
}

impl fmt::Display for JumpEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Landed => write!(f, "landed"),
            Self::ObstructedAbove => write!(f, "blocked overhead"),
            Self::ObstructedAhead => write!(f, "blocked ahead"),
            Self::ImpulseRejected => write!(f, "impulse rejected"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEventKind {
    // Gravity
    /// An entity's gravity value was set.
    GravityChanged {
        /// The entity.
        entity: EntityId,
        /// The new value.
        value: f64,
        /// `true` for the durable value, `false` for the session override.
        persisted: bool,
    },

    // Jumping
    /// A jump sequence began.
    JumpStarted {
        /// The jumping entity.
        entity: EntityId,
        /// Height the jump started from.
        start_y: f64,
    },
    /// A jump sequence stopped before or at its last step.
    JumpEnded {
        /// The entity.
        entity: EntityId,
        /// Why it stopped.
        reason: JumpEnd,
    },

    // Falling
    /// A bounce surface turned a fall into an upward impulse.
    Bounced {
        /// The entity.
        entity: EntityId,
        /// Upward impulse applied.
        impulse: f64,
    },
    /// An airborne entity touched the ground.
    Landed {
        /// The entity.
        entity: EntityId,
        /// Fall distance recorded when it landed.
        fall_distance: f64,
    },
    /// The deferred cosmetic effect could not be applied.
    EffectFailed {
        /// The entity.
        entity: EntityId,
        /// The host's error message.
        reason: String,
    },

    // Combat
    /// A mace hit converted fall distance into bonus damage.
    MaceStrike {
        /// The attacker.
        attacker: EntityId,
        /// The victim.
        victim: EntityId,
        /// Fall distance consumed.
        fall_distance: f64,
        /// Bonus damage dealt.
        damage: f64,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::GravityChanged { entity, .. }
            | Self::JumpStarted { entity, .. }
            | Self::JumpEnded { entity, .. }
            | Self::Bounced { entity, .. }
            | Self::Landed { entity, .. }
            | Self::EffectFailed { entity, .. } => *entity == id,
            Self::MaceStrike {
                attacker, victim, ..
            } => *attacker == id || *victim == id,
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all events involving the given entity.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
