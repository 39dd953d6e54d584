/// What a driver does when a field being read is absent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MissingFieldPolicy {
    /// Scalars decode to `T::default()`, objects are left untouched and
    /// optional or polymorphic handles become `None`.
    #[default]
    Default,
    /// Fail with [`CodecError::MissingField`](crate::CodecError::MissingField).
    Error,
}

/// Runtime options of a [`FormatDriver`](crate::FormatDriver).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    pub missing_fields: MissingFieldPolicy,
}

impl DriverOptions {
    /// Lenient reads, see [`MissingFieldPolicy::Default`].
    #[inline]
    pub const fn new() -> Self {
        Self {
            missing_fields: MissingFieldPolicy::Default,
        }
    }

    /// Strict reads, see [`MissingFieldPolicy::Error`].
    #[inline]
    pub const fn strict() -> Self {
        Self::new().with_missing_fields(MissingFieldPolicy::Error)
    }

    #[inline]
    pub const fn with_missing_fields(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_fields = policy;
        self
    }
}
