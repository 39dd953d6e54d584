use core::any::{Any, TypeId};
use core::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::hash::{FixedHashState, HashMap};
use crate::registry::{HandlerEntry, RegistryScope};
use crate::{Codec, CodecError, FormatDriver, Polymorphic, Tagged, TypeTag, Upcast};

type ScopeKey = (TypeId, TypeId);
type ErasedScope = Box<dyn Any + Send + Sync>;

// -----------------------------------------------------------------------------
// TypeRegistry

/// The polymorphic registry.
///
/// Holds one [`RegistryScope`] per (base, driver) pair, created lazily by the
/// first registration for that pair. Each scope maps a [`TypeTag`] to the
/// [`HandlerEntry`] of one concrete type.
///
/// A registry is an ordinary value: build one, register the types, then hand
/// it to drivers (usually through a [`TypeRegistryArc`]). Tests can use a fresh
/// instance each. A process-wide instance is available through
/// [`global`](crate::global).
///
/// # Example
///
/// ```
/// use vc_codec::registry::TypeRegistry;
/// use vc_codec::{Codec, CodecError, FormatDriver, JsonDriver, Tagged};
///
/// #[derive(Default)]
/// struct Foo {
///     x: i32,
/// }
///
/// impl Tagged for Foo {
///     const TYPE_TAG: &'static str = "Foo";
/// }
///
/// impl<D: FormatDriver> Codec<D> for Foo {
///     fn encode(&self, driver: &mut D) -> Result<(), CodecError> {
///         driver.write_value("x", &self.x)
///     }
///     fn decode(&mut self, driver: &mut D) -> Result<(), CodecError> {
///         driver.read_into("x", &mut self.x)
///     }
/// }
///
/// let mut registry = TypeRegistry::new();
///
/// assert!(registry.register::<Foo, Foo, JsonDriver>().unwrap());
/// // Registering the same triple again does nothing.
/// assert!(!registry.register::<Foo, Foo, JsonDriver>().unwrap());
///
/// assert!(registry.contains::<Foo, JsonDriver>("Foo"));
/// assert_eq!(registry.scope::<Foo, JsonDriver>().unwrap().len(), 1);
/// ```
pub struct TypeRegistry {
    scopes: HashMap<ScopeKey, ErasedScope>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a empty [`TypeRegistry`].
    #[inline]
    pub const fn new() -> Self {
        Self {
            scopes: HashMap::with_hasher(FixedHashState),
        }
    }

    #[inline(always)]
    fn key<B: ?Sized + 'static, D: 'static>() -> ScopeKey {
        (TypeId::of::<B>(), TypeId::of::<D>())
    }

    /// Registers concrete type `T` under base `B` for driver `D`.
    ///
    /// - Returns `Ok(true)` if a new entry was inserted.
    /// - Returns `Ok(false)` if this exact triple was registered before;
    ///   the existing entry is kept and lookups are unaffected.
    /// - Returns [`CodecError::DuplicateTag`] if a different type of the
    ///   same scope already uses `T::TYPE_TAG`.
    pub fn register<B, T, D>(&mut self) -> Result<bool, CodecError>
    where
        B: ?Sized + Polymorphic,
        T: Tagged + Codec<D> + Default + Upcast<B>,
        D: FormatDriver,
    {
        let inserted = self.scope_mut::<B, D>().try_insert(HandlerEntry::of::<T>())?;
        if inserted {
            log::debug!(
                "registered `{}` as `{}` for base `{}` in driver `{}`",
                core::any::type_name::<T>(),
                T::TYPE_TAG,
                core::any::type_name::<B>(),
                core::any::type_name::<D>(),
            );
        }
        Ok(inserted)
    }

    /// Returns the scope of (`B`, `D`), creating it if needed.
    pub fn scope_mut<B: ?Sized + 'static, D: 'static>(&mut self) -> &mut RegistryScope<B, D> {
        self.scopes
            .entry(Self::key::<B, D>())
            .or_insert_with(|| -> ErasedScope { Box::new(RegistryScope::<B, D>::new()) })
            .downcast_mut::<RegistryScope<B, D>>()
            .unwrap_or_else(|| unreachable!("scope keys are derived from their own type"))
    }

    /// Returns the scope of (`B`, `D`) if anything was registered into it.
    pub fn scope<B: ?Sized + 'static, D: 'static>(&self) -> Option<&RegistryScope<B, D>> {
        self.scopes
            .get(&Self::key::<B, D>())
            .and_then(|scope| scope.downcast_ref::<RegistryScope<B, D>>())
    }

    /// Returns a copy of the entry registered for `tag` in (`B`, `D`).
    ///
    /// Fails with [`CodecError::UnregisteredType`] if there is none.
    pub fn handler<B: ?Sized + 'static, D: 'static>(
        &self,
        tag: &str,
    ) -> Result<HandlerEntry<B, D>, CodecError> {
        self.scope::<B, D>()
            .and_then(|scope| scope.get(tag))
            .ok_or_else(|| CodecError::UnregisteredType {
                tag: tag.to_owned(),
                base: core::any::type_name::<B>(),
                driver: core::any::type_name::<D>(),
            })
    }

    /// Whether `tag` is registered in (`B`, `D`).
    #[inline]
    pub fn contains<B: ?Sized + 'static, D: 'static>(&self, tag: &str) -> bool {
        self.scope::<B, D>().is_some_and(|scope| scope.contains(tag))
    }

    /// Returns the tags registered in (`B`, `D`), sorted.
    pub fn tags<B: ?Sized + 'static, D: 'static>(&self) -> Vec<TypeTag> {
        let mut tags: Vec<TypeTag> = self
            .scope::<B, D>()
            .map(|scope| scope.tags().collect())
            .unwrap_or_default();
        tags.sort_unstable();
        tags
    }

    /// Number of (base, driver) scopes.
    #[inline]
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Runs every registration submitted with
    /// [`register_polymorphic!`](crate::register_polymorphic).
    ///
    /// This method is equivalent to calling [`register`](Self::register) for
    /// each submitted triple. Repeated calls are cheap and will not insert
    /// duplicates.
    ///
    /// A conflicting tag does not stop the pass: every other triple is still
    /// registered, each conflict is logged, and the first one is returned
    /// as [`CodecError::DuplicateTag`] once the pass is done. The entry that
    /// was inserted first keeps the tag.
    ///
    /// Returns the number of newly inserted entries. Without the
    /// `auto_register` feature nothing is collected and this returns `Ok(0)`.
    pub fn auto_register(&mut self) -> Result<usize, CodecError> {
        #[cfg(feature = "auto_register")]
        {
            let mut inserted = 0;
            let mut first_error = None;
            for registration in inventory::iter::<crate::__macro_exports::AutoRegistration> {
                match (registration.0)(self) {
                    Ok(true) => inserted += 1,
                    Ok(false) => {}
                    Err(e) => {
                        log::warn!("skipped auto registration: {e}");
                        first_error.get_or_insert(e);
                    }
                }
            }
            log::debug!("auto registration inserted {inserted} entries");
            match first_error {
                Some(e) => Err(e),
                None => Ok(inserted),
            }
        }

        #[cfg(not(feature = "auto_register"))]
        {
            Ok(0)
        }
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("scopes", &self.scopes.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryArc

/// A shared, lockable [`TypeRegistry`].
///
/// Drivers hold a clone and take a short read lock for each lookup. Writes are
/// expected to finish before sessions start on other threads; the lock keeps
/// a late registration race-free, it does not order it.
#[derive(Clone, Default)]
pub struct TypeRegistryArc {
    /// The wrapped [`TypeRegistry`].
    pub internal: Arc<RwLock<TypeRegistry>>,
}

impl TypeRegistryArc {
    /// Wraps an already populated registry.
    #[inline]
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`TypeRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`TypeRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<TypeRegistry> for TypeRegistryArc {
    #[inline]
    fn from(registry: TypeRegistry) -> Self {
        Self::new(registry)
    }
}

impl fmt::Debug for TypeRegistryArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.read(), f)
    }
}

// -----------------------------------------------------------------------------
// Tests
