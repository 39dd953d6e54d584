use core::any::Any;

// -----------------------------------------------------------------------------
// TypeTag

/// A stable identifier of a concrete type within one registry scope.
///
/// Tags are declared by the programmer next to the type (see [`Tagged`]) and
/// are written into documents as the polymorphic discriminator, so they must
/// not change between builds once documents have been persisted.
pub type TypeTag = &'static str;

// -----------------------------------------------------------------------------
// Tagged

/// A concrete type with a programmer-assigned [`TypeTag`].
///
/// # Examples
///
/// ```
/// use vc_codec::{Polymorphic, Tagged};
///
/// #[derive(Default)]
/// struct Circle {
///     radius: f64,
/// }
///
/// impl Tagged for Circle {
///     const TYPE_TAG: &'static str = "Circle";
/// }
///
/// let circle = Circle::default();
/// assert_eq!(circle.type_tag(), "Circle");
/// ```
pub trait Tagged: Any {
    /// The discriminator written for values of this type.
    const TYPE_TAG: TypeTag;
}

// -----------------------------------------------------------------------------
// Polymorphic

/// Runtime type identity of a value, usable through a base handle.
///
/// Implemented for every [`Tagged`] type. A base trait makes its trait
/// objects dispatchable by declaring `Polymorphic` as a supertrait:
///
/// ```
/// use vc_codec::{Polymorphic, Tagged};
///
/// trait Shape: Polymorphic {
///     fn area(&self) -> f64;
/// }
///
/// struct Square(f64);
///
/// impl Tagged for Square {
///     const TYPE_TAG: &'static str = "Square";
/// }
///
/// impl Shape for Square {
///     fn area(&self) -> f64 { self.0 * self.0 }
/// }
///
/// let shape: Box<dyn Shape> = Box::new(Square(2.0));
/// assert_eq!(shape.type_tag(), "Square");
/// assert!(shape.as_any().is::<Square>());
/// ```
pub trait Polymorphic: Any {
    /// Tag of the concrete runtime type.
    fn type_tag(&self) -> TypeTag;

    /// The value as [`Any`], carrying the concrete `TypeId`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Tagged> Polymorphic for T {
    #[inline(always)]
    fn type_tag(&self) -> TypeTag {
        T::TYPE_TAG
    }

    #[inline(always)]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

// -----------------------------------------------------------------------------
// Upcast

/// Conversion of an owned concrete value into an owned base handle.
///
/// Decoding through a base allocates the concrete type and hands it to the
/// caller as `Box<B>`. Every type is its own base; trait object bases are
/// implemented with [`impl_upcast!`](crate::impl_upcast).
pub trait Upcast<B: ?Sized> {
    fn upcast(self: Box<Self>) -> Box<B>;
}

impl<T: Tagged> Upcast<T> for T {
    #[inline(always)]
    fn upcast(self: Box<Self>) -> Box<T> {
        self
    }
}

/// Implements [`Upcast`] from each listed type to a trait object base.
///
/// # Examples
///
/// ```
/// use vc_codec::{Polymorphic, Tagged, Upcast, impl_upcast};
///
/// trait Animal: Polymorphic {}
///
/// struct Cat;
/// struct Dog;
///
/// impl Tagged for Cat { const TYPE_TAG: &'static str = "Cat"; }
/// impl Tagged for Dog { const TYPE_TAG: &'static str = "Dog"; }
/// impl Animal for Cat {}
/// impl Animal for Dog {}
///
/// impl_upcast!(dyn Animal => Cat, Dog);
///
/// let animal: Box<dyn Animal> = Box::new(Dog).upcast();
/// assert_eq!(animal.type_tag(), "Dog");
/// ```
#[macro_export]
macro_rules! impl_upcast {
    ($base:ty => $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Upcast<$base> for $ty {
                #[inline(always)]
                fn upcast(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<$base> {
                    self
                }
            }
        )+
    };
}
