use crate::entity::EntityId;
use crate::snapshot::EffectKind;

/// Alias for `Result<T, HostError>`.
pub type HostResult<T> = Result<T, HostError>;

/// Errors a host reports back from a mutator call.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The entity no longer exists.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The host refused to apply a status effect.
    #[error("effect {effect} rejected for {entity}: {reason}")]
    EffectRejected {
        /// The entity the effect targeted.
        entity: EntityId,
        /// The rejected effect.
        effect: EffectKind,
        /// Host-provided explanation.
        reason: String,
    },
}
