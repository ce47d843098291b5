//! Error types for hit-event rules.

/// Errors raised while building a rule.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// The fall threshold is negative or not finite.
    #[error("invalid fall threshold {0}: must be finite and non-negative")]
    InvalidThreshold(f64),

    /// The damage tier table is malformed.
    #[error("invalid damage tiers: {0}")]
    InvalidTiers(String),
}

/// Convenience result type for rule construction.
pub type MechResult<T> = Result<T, MechError>;
