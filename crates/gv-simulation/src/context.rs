use gv_core::Host;

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::event::{EventLog, SimEvent, SimEventKind};

/// Mutable context passed to the gravity driver and its helpers during a tick.
pub struct SimContext<'a> {
    /// The host engine.
    pub host: &'a mut dyn Host,
    /// The simulation clock.
    pub clock: &'a SimClock,
    /// Tunables for this run.
    pub config: &'a SimConfig,
    /// The event log.
    pub events: &'a mut EventLog,
}

impl SimContext<'_> {
    /// Emit a simulation event at the current tick.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events
            .push(SimEvent::new(self.clock.tick(), kind, description));
    }

    /// The current tick.
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }
}
