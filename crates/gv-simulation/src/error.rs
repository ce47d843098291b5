use gv_core::{EntityId, HostError};

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors surfaced to callers of the simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A gravity setter was given a value that is not finite and positive.
    #[error("invalid gravity value {value}: must be finite and greater than zero")]
    InvalidGravityValue {
        /// The rejected value.
        value: f64,
    },

    /// The entity does not exist in the host.
    #[error("entity not found in simulation: {0}")]
    EntityNotFound(EntityId),

    /// A host call failed.
    #[error("host error: {0}")]
    Host(#[from] HostError),
}
