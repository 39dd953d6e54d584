use core::any::Any;
use core::fmt;

use crate::{CodecError, Polymorphic, Tagged, TypeTag};

// -----------------------------------------------------------------------------
// ErasedRef

/// A type-erased borrowed value crossing the registry boundary.
///
/// The wrapper records the concrete [`TypeTag`] when the value is erased and
/// checks it, together with the `TypeId`, when the value is recovered. A
/// mismatched recovery fails with [`CodecError::TypeMismatch`] instead of
/// reinterpreting the value.
///
/// # Examples
///
/// ```
/// use vc_codec::{CodecError, ErasedRef, Tagged};
///
/// struct Foo(i32);
/// struct Bar(i32);
///
/// impl Tagged for Foo { const TYPE_TAG: &'static str = "Foo"; }
/// impl Tagged for Bar { const TYPE_TAG: &'static str = "Bar"; }
///
/// let foo = Foo(7);
/// let erased = ErasedRef::new(&foo);
///
/// assert_eq!(erased.tag(), "Foo");
/// assert_eq!(erased.downcast::<Foo>().unwrap().0, 7);
/// assert!(matches!(
///     erased.downcast::<Bar>(),
///     Err(CodecError::TypeMismatch { expected: "Bar", found: "Foo" }),
/// ));
/// ```
#[derive(Clone, Copy)]
pub struct ErasedRef<'a> {
    tag: TypeTag,
    value: &'a dyn Any,
}

impl<'a> ErasedRef<'a> {
    /// Erases `value`, recording the tag of its runtime type.
    #[inline]
    pub fn new<B: ?Sized + Polymorphic>(value: &'a B) -> Self {
        Self {
            tag: value.type_tag(),
            value: value.as_any(),
        }
    }

    /// Tag recorded at erasure time.
    #[inline]
    pub const fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Returns `true` if the erased value is a `T`.
    #[inline]
    pub fn is<T: Tagged>(&self) -> bool {
        self.tag == T::TYPE_TAG && self.value.is::<T>()
    }

    /// Recovers the concrete reference.
    ///
    /// Both the recorded tag and the `TypeId` must match `T`.
    pub fn downcast<T: Tagged>(&self) -> Result<&'a T, CodecError> {
        let mismatch = || CodecError::TypeMismatch {
            expected: T::TYPE_TAG,
            found: self.tag,
        };

        if self.tag != T::TYPE_TAG {
            return Err(mismatch());
        }
        self.value.downcast_ref::<T>().ok_or_else(mismatch)
    }
}

impl fmt::Debug for ErasedRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedRef")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
