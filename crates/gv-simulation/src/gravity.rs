//! Gravity value store.
//!
//! An entity's effective gravity is its session override if set, else its
//! durable property if set, else standard gravity. Both setters validate
//! with [`can_set`] and leave state untouched on failure. Stored values that
//! fail validation (written by something else) are ignored on read, so the
//! effective value is always finite and positive.

use gv_core::host::GRAVITY_PROPERTY;
use gv_core::{EntityId, PropertyStore};

use crate::error::{SimError, SimResult};
use crate::state::EntityGravityState;

/// Return `true` if `value` is an acceptable gravity value.
pub fn can_set(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn validate(value: f64) -> SimResult<f64> {
    if can_set(value) {
        Ok(value)
    } else {
        Err(SimError::InvalidGravityValue { value })
    }
}

/// Effective gravity for an entity.
pub fn get<P: PropertyStore + ?Sized>(
    props: &P,
    state: Option<&EntityGravityState>,
    id: EntityId,
    standard: f64,
) -> f64 {
    state
        .and_then(|s| s.temporary_gravity)
        .filter(|v| can_set(*v))
        .or_else(|| props.property(id, GRAVITY_PROPERTY).filter(|v| can_set(*v)))
        .unwrap_or(standard)
}

/// Write the durable gravity value.
pub fn set_persisted<P: PropertyStore + ?Sized>(
    props: &mut P,
    id: EntityId,
    value: f64,
) -> SimResult<()> {
    let value = validate(value)?;
    props.set_property(id, GRAVITY_PROPERTY, Some(value));
    Ok(())
}

/// Write the session-only override.
pub fn set_temporary(state: &mut EntityGravityState, value: f64) -> SimResult<()> {
    state.temporary_gravity = Some(validate(value)?);
    Ok(())
}

/// Drop the session-only override.
pub fn clear_temporary(state: &mut EntityGravityState) {
    state.temporary_gravity = None;
}
