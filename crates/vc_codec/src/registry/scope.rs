use core::fmt;

use crate::hash::{FixedHashState, HashMap};
use crate::registry::HandlerEntry;
use crate::{CodecError, TypeTag};

// -----------------------------------------------------------------------------
// RegistryScope

/// The [`HandlerEntry`] table of one (base, driver) pair, keyed by [`TypeTag`].
pub struct RegistryScope<B: ?Sized, D> {
    entries: HashMap<TypeTag, HandlerEntry<B, D>>,
}

impl<B: ?Sized, D> RegistryScope<B, D> {
    /// Creates an empty scope.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: HashMap::with_hasher(FixedHashState),
        }
    }

    /// Inserts `entry` unless its tag is taken.
    ///
    /// - Returns `Ok(true)` if the entry was inserted.
    /// - Returns `Ok(false)` if the same concrete type already owns the tag,
    ///   leaving the scope unchanged.
    /// - Returns [`CodecError::DuplicateTag`] if another type owns the tag.
    pub fn try_insert(&mut self, entry: HandlerEntry<B, D>) -> Result<bool, CodecError> {
        match self.entries.get(entry.tag()) {
            Some(existing) if existing.type_id() == entry.type_id() => Ok(false),
            Some(existing) => {
                log::warn!(
                    "type tag `{}` of `{}` is already used by `{}`",
                    entry.tag(),
                    entry.type_name(),
                    existing.type_name(),
                );
                Err(CodecError::DuplicateTag {
                    tag: entry.tag(),
                    base: core::any::type_name::<B>(),
                    driver: core::any::type_name::<D>(),
                })
            }
            None => {
                self.entries.insert(entry.tag(), entry);
                Ok(true)
            }
        }
    }

    /// Returns a copy of the entry registered for `tag`.
    #[inline]
    pub fn get(&self, tag: &str) -> Option<HandlerEntry<B, D>> {
        self.entries.get(tag).copied()
    }

    #[inline]
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// An iterator visiting all tags in arbitrary order.
    #[inline]
    pub fn tags(&self) -> impl ExactSizeIterator<Item = TypeTag> + '_ {
        self.entries.keys().copied()
    }

    /// An iterator visiting all entries in arbitrary order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &HandlerEntry<B, D>> {
        self.entries.values()
    }
}

impl<B: ?Sized, D> Default for RegistryScope<B, D> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ?Sized, D> fmt::Debug for RegistryScope<B, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
