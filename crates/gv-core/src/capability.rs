/// The result of asking an entity for an accessor it may not expose.
///
/// An entity without an inventory, input, or effect list reports
/// [`Capability::Unavailable`]; callers fall back to a neutral default instead
/// of treating it as a failure.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Capability<T> {
    /// The accessor exists and produced a value.
    Available(T),
    /// The entity does not expose this accessor.
    #[default]
    Unavailable,
}

impl<T> Capability<T> {
    /// Return `true` if the value is present.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Borrow the inner value.
    pub fn as_ref(&self) -> Capability<&T> {
        match self {
            Self::Available(value) => Capability::Available(value),
            Self::Unavailable => Capability::Unavailable,
        }
    }

    /// Convert into an `Option`, dropping the distinction.
    pub fn available(self) -> Option<T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable => None,
        }
    }

    /// Return the value, or `default` when unavailable.
    pub fn unwrap_or(self, default: T) -> T {
        self.available().unwrap_or(default)
    }

    /// Map the inner value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Capability<U> {
        match self {
            Self::Available(value) => Capability::Available(f(value)),
            Self::Unavailable => Capability::Unavailable,
        }
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unavailable, Self::Available)
    }
}
