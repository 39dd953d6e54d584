use core::any::TypeId;
use core::fmt;

use crate::{Codec, CodecError, ErasedRef, FormatDriver, Tagged, TypeTag, Upcast};

// -----------------------------------------------------------------------------
// HandlerEntry

/// The encode/decode pair of one concrete type, seen through base `B`
/// by driver `D`.
///
/// Internally stores function pointers generated for a specific type `T`.
/// The encode function recovers `&T` from an [`ErasedRef`] (rejecting any
/// other type) and forwards to `T`'s [`Codec`]. The decode function allocates
/// `T::default()`, decodes it and hands it out as `Box<B>`.
///
/// Entries are plain data and `Copy`, so a driver can take one out of a
/// locked registry before calling it.
pub struct HandlerEntry<B: ?Sized, D> {
    tag: TypeTag,
    type_id: TypeId,
    type_name: &'static str,
    encode: fn(&mut D, ErasedRef<'_>) -> Result<(), CodecError>,
    decode: fn(&mut D) -> Result<Box<B>, CodecError>,
}

impl<B: ?Sized + 'static, D: FormatDriver> HandlerEntry<B, D> {
    /// Creates the entry of concrete type `T`.
    pub fn of<T>() -> Self
    where
        T: Tagged + Codec<D> + Default + Upcast<B>,
    {
        Self {
            tag: T::TYPE_TAG,
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            encode: |driver, value| value.downcast::<T>()?.encode(driver),
            decode: |driver| {
                let mut value = T::default();
                value.decode(driver)?;
                Ok(<T as Upcast<B>>::upcast(Box::new(value)))
            },
        }
    }
}

impl<B: ?Sized, D> HandlerEntry<B, D> {
    /// Tag of the concrete type.
    #[inline(always)]
    pub const fn tag(&self) -> TypeTag {
        self.tag
    }

    /// `TypeId` of the concrete type.
    #[inline(always)]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust name of the concrete type, for diagnostics only.
    #[inline(always)]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Encodes `value` at the driver's current path.
    ///
    /// Fails with [`CodecError::TypeMismatch`] if `value` is not the concrete
    /// type of this entry.
    #[inline]
    pub fn encode(&self, driver: &mut D, value: ErasedRef<'_>) -> Result<(), CodecError> {
        (self.encode)(driver, value)
    }

    /// Decodes a new instance from the driver's current path.
    #[inline]
    pub fn decode(&self, driver: &mut D) -> Result<Box<B>, CodecError> {
        (self.decode)(driver)
    }
}

impl<B: ?Sized, D> Clone for HandlerEntry<B, D> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized, D> Copy for HandlerEntry<B, D> {}

impl<B: ?Sized, D> fmt::Debug for HandlerEntry<B, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("tag", &self.tag)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
